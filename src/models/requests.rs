// src/models/requests.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// ---
// 1. Definição de Campos (o "formulário" que o request coleta)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Date,
    File,
    Select,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestFieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    /// Obrigatório quando (e somente quando) o tipo é `select`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl RequestFieldDef {
    /// Regra de esquema: todo campo tem name/type/required (o serde já
    /// garante a presença); `select` exige uma lista de opções não vazia.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Todo campo de request precisa de um 'name' não vazio.".to_string(),
            ));
        }

        match (self.field_type, &self.options) {
            (FieldType::Select, None) => Err(AppError::BadRequest(format!(
                "O campo '{}' é do tipo select e exige 'options'.",
                self.name
            ))),
            (FieldType::Select, Some(options)) if options.is_empty() => {
                Err(AppError::BadRequest(format!(
                    "O campo '{}' é do tipo select e exige 'options' não vazio.",
                    self.name
                )))
            }
            _ => Ok(()),
        }
    }
}

// ---
// 2. Completion Stats (contadores de cumprimento por unidade)
// ---
// Invariante: submitted + pending + overdue <= total_locations, sempre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompletionStats {
    pub total_locations: i64,
    pub submitted: i64,
    pub pending: i64,
    pub overdue: i64,
}

impl CompletionStats {
    /// Snapshot inicial, derivado UMA vez do targeting do post pai.
    pub fn initial(total_locations: i64) -> Self {
        Self {
            total_locations,
            submitted: 0,
            pending: total_locations,
            overdue: 0,
        }
    }

    /// Uma unidade respondeu: pending -> submitted. Unidades em atraso que
    /// respondem saem de overdue. Sem saldo em nenhum dos dois, nada muda
    /// (a restrição UNIQUE de submissão já impediu a duplicata).
    pub fn record_submission(&mut self) {
        if self.pending > 0 {
            self.pending -= 1;
            self.submitted += 1;
        } else if self.overdue > 0 {
            self.overdue -= 1;
            self.submitted += 1;
        }
        debug_assert!(self.holds_invariant());
    }

    /// Varredura de atraso: tudo que ainda está pendente vira overdue.
    pub fn mark_all_pending_overdue(&mut self) {
        self.overdue += self.pending;
        self.pending = 0;
        debug_assert!(self.holds_invariant());
    }

    pub fn holds_invariant(&self) -> bool {
        self.submitted >= 0
            && self.pending >= 0
            && self.overdue >= 0
            && self.submitted + self.pending + self.overdue <= self.total_locations
    }
}

// ---
// 3. O Request em si
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Active,
    Closed,
}

impl RequestStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(RequestStatus::Active),
            "closed" => Some(RequestStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataRequest {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub post_id: Uuid,
    pub title: String,
    #[schema(value_type = Vec<RequestFieldDef>)]
    pub fields: sqlx::types::Json<Vec<RequestFieldDef>>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: RequestStatus,
    #[schema(value_type = CompletionStats)]
    pub completion_stats: sqlx::types::Json<CompletionStats>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestSubmission {
    pub id: Uuid,
    pub request_id: Uuid,
    pub location_id: Uuid,
    pub submitted_by: Uuid,
    #[schema(value_type = Object)]
    pub data: sqlx::types::Json<Value>,
    pub created_at: DateTime<Utc>,
}

/// Filtro de listagem: `created` = requests que o caller abriu;
/// `assigned` = requests abertos por outros e que alcançam o caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestRoleFilter {
    Created,
    Assigned,
}

impl RequestRoleFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(RequestRoleFilter::Created),
            "assigned" => Some(RequestRoleFilter::Assigned),
            _ => None,
        }
    }
}

/// Filtro tipado para listagem de requests.
#[derive(Debug, Default, Clone)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub role: Option<RequestRoleFilter>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_field(options: Option<Vec<String>>) -> RequestFieldDef {
        RequestFieldDef {
            name: "tamanho".to_string(),
            field_type: FieldType::Select,
            required: true,
            options,
        }
    }

    #[test]
    fn select_sem_options_e_rejeitado() {
        assert!(select_field(None).validate().is_err());
        assert!(select_field(Some(vec![])).validate().is_err());
    }

    #[test]
    fn select_com_options_passa() {
        let field = select_field(Some(vec!["P".into(), "M".into(), "G".into()]));
        assert!(field.validate().is_ok());
    }

    #[test]
    fn campo_texto_nao_exige_options() {
        let field = RequestFieldDef {
            name: "observacao".to_string(),
            field_type: FieldType::Text,
            required: false,
            options: None,
        };
        assert!(field.validate().is_ok());
    }

    #[test]
    fn campo_sem_name_e_rejeitado() {
        let field = RequestFieldDef {
            name: "  ".to_string(),
            field_type: FieldType::Number,
            required: true,
            options: None,
        };
        assert!(field.validate().is_err());
    }

    #[test]
    fn campo_sem_type_nao_desserializa() {
        let result: Result<RequestFieldDef, _> =
            serde_json::from_value(serde_json::json!({"name": "x", "required": true}));
        assert!(result.is_err());
    }

    #[test]
    fn stats_iniciais_respeitam_invariante() {
        let stats = CompletionStats::initial(7);
        assert_eq!(stats.submitted, 0);
        assert_eq!(stats.overdue, 0);
        assert_eq!(stats.pending, 7);
        assert!(stats.holds_invariant());
    }

    #[test]
    fn submissao_move_pending_para_submitted() {
        let mut stats = CompletionStats::initial(3);
        stats.record_submission();
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.pending, 2);
        assert!(stats.holds_invariant());
    }

    #[test]
    fn unidades_distintas_somam_submissoes() {
        // Cada unidade que responde conta: depois de duas submissões de
        // locations diferentes, submitted = 2 (nenhuma se perde).
        let mut stats = CompletionStats::initial(3);
        stats.record_submission();
        stats.record_submission();
        assert_eq!(stats.submitted, 2);
        assert_eq!(stats.pending, 1);
        assert!(stats.holds_invariant());
    }

    #[test]
    fn submissao_apos_varredura_sai_de_overdue() {
        let mut stats = CompletionStats::initial(2);
        stats.mark_all_pending_overdue();
        assert_eq!(stats.overdue, 2);
        stats.record_submission();
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.overdue, 1);
        assert!(stats.holds_invariant());
    }

    #[test]
    fn submissao_sem_saldo_nao_estoura() {
        let mut stats = CompletionStats::initial(1);
        stats.record_submission();
        stats.record_submission();
        assert_eq!(stats.submitted, 1);
        assert!(stats.holds_invariant());
    }

    #[test]
    fn varredura_preserva_invariante() {
        let mut stats = CompletionStats::initial(5);
        stats.record_submission();
        stats.mark_all_pending_overdue();
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.overdue, 4);
        assert!(stats.holds_invariant());
    }
}
