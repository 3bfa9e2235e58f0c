// src/services/targeting.rs
//
// O avaliador de targeting: traduz o descritor de alvo de um post em
// (a) decisão de acesso na criação e (b) snapshot inicial de
// completion_stats do request vinculado.

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TenancyRepository,
    models::{posts::Targeting, requests::CompletionStats},
};

#[derive(Clone)]
pub struct TargetingService {
    tenancy_repo: TenancyRepository,
}

impl TargetingService {
    pub fn new(tenancy_repo: TenancyRepository) -> Self {
        Self { tenancy_repo }
    }

    /// Validação + autorização do targeting na criação de posts/requests.
    ///
    /// Global: nenhuma checagem adicional - qualquer unidade do tenant
    /// pode receber. Específico: a lista precisa ser não vazia e resolver
    /// para PELO MENOS UMA unidade ativa do tenant; zero acessíveis é 403.
    /// Acesso parcial conta como suficiente (tradeoff de negócio herdado,
    /// registrado em DESIGN.md).
    pub async fn authorize_targeting<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        targeting: &Targeting,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        validate_targeting_shape(targeting)?;

        if let Targeting::SpecificLocations { location_ids } = targeting {
            let accessible = self
                .tenancy_repo
                .filter_accessible_location_ids(executor, tenant_id, location_ids)
                .await?;

            evaluate_location_access(location_ids.len(), accessible.len())?;
        }

        Ok(())
    }

    /// Deriva total_locations UMA vez, na criação do request - nunca é
    /// recomputado depois. Específico: o tamanho da lista. Global: a
    /// contagem real de unidades ativas do tenant (sem placeholder).
    pub async fn resolve_total_locations<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        targeting: &Targeting,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match targeting {
            Targeting::Global => {
                self.tenancy_repo
                    .count_active_locations(executor, tenant_id)
                    .await
            }
            Targeting::SpecificLocations { location_ids } => Ok(location_ids.len() as i64),
        }
    }

    /// Snapshot inicial: submitted=0, overdue=0, pending=total.
    pub async fn initial_completion_stats<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        targeting: &Targeting,
    ) -> Result<CompletionStats, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = self
            .resolve_total_locations(executor, tenant_id, targeting)
            .await?;
        Ok(CompletionStats::initial(total))
    }
}

/// Forma do descritor: targeting específico exige lista não vazia.
pub fn validate_targeting_shape(targeting: &Targeting) -> Result<(), AppError> {
    match targeting {
        Targeting::Global => Ok(()),
        Targeting::SpecificLocations { location_ids } => {
            if location_ids.is_empty() {
                Err(AppError::BadRequest(
                    "O campo 'targeting.location_ids' não pode ser vazio.".to_string(),
                ))
            } else {
                Ok(())
            }
        }
    }
}

/// A decisão de acesso em si, separada do banco para ser testável:
/// zero unidades acessíveis é 403; qualquer acesso parcial basta.
pub fn evaluate_location_access(requested: usize, accessible: usize) -> Result<(), AppError> {
    if accessible == 0 {
        return Err(AppError::Forbidden(format!(
            "Nenhuma das {} locations do targeting é acessível neste tenant.",
            requested
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specific(n: usize) -> Targeting {
        Targeting::SpecificLocations {
            location_ids: (0..n).map(|_| Uuid::new_v4()).collect(),
        }
    }

    #[test]
    fn global_dispensa_checagem_de_lista() {
        assert!(validate_targeting_shape(&Targeting::Global).is_ok());
    }

    #[test]
    fn lista_vazia_e_bad_request() {
        let err = validate_targeting_shape(&specific(0)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn lista_nao_vazia_passa_na_forma() {
        assert!(validate_targeting_shape(&specific(3)).is_ok());
    }

    #[test]
    fn zero_acessiveis_e_forbidden() {
        let err = evaluate_location_access(2, 0).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn acesso_parcial_e_suficiente() {
        // Comportamento herdado: 1 de 3 resolvidas já autoriza.
        assert!(evaluate_location_access(3, 1).is_ok());
    }

    #[test]
    fn acesso_total_e_suficiente() {
        assert!(evaluate_location_access(3, 3).is_ok());
    }
}
