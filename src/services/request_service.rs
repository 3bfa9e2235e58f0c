// src/services/request_service.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Acquire, PgPool};
use uuid::Uuid;

use crate::{
    common::{db_utils::get_rls_connection, error::AppError},
    db::{PostRepository, RequestRepository, TenancyRepository},
    middleware::tenancy::TenantContext,
    models::requests::{
        DataRequest, RequestFieldDef, RequestFilter, RequestStatus, RequestSubmission,
    },
    services::{targeting::TargetingService, tenancy_service::require_corporate_role},
};

#[derive(Clone)]
pub struct RequestService {
    request_repo: RequestRepository,
    post_repo: PostRepository,
    tenancy_repo: TenancyRepository,
    targeting: TargetingService,
    pool: PgPool,
}

impl RequestService {
    pub fn new(
        request_repo: RequestRepository,
        post_repo: PostRepository,
        tenancy_repo: TenancyRepository,
        targeting: TargetingService,
        pool: PgPool,
    ) -> Self {
        Self {
            request_repo,
            post_repo,
            tenancy_repo,
            targeting,
            pool,
        }
    }

    /// Cria o request vinculado a um post existente. O snapshot de
    /// completion_stats é derivado AQUI, uma única vez, do targeting do
    /// post pai - não é recomputado depois.
    pub async fn create_request(
        &self,
        ctx: &TenantContext,
        post_id: Uuid,
        title: &str,
        fields: &[RequestFieldDef],
        due_date: Option<DateTime<Utc>>,
    ) -> Result<DataRequest, AppError> {
        check_create_request(ctx.role, fields)?;

        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        let post = self
            .post_repo
            .find_post(&mut *conn, ctx.tenant_id, post_id)
            .await?
            .ok_or(AppError::NotFound("Post"))?;

        // Contagem + insert na mesma transação, para o snapshot não ver
        // uma location criada no meio do caminho.
        let mut tx = conn.begin().await?;

        let stats = self
            .targeting
            .initial_completion_stats(&mut *tx, ctx.tenant_id, &post.targeting.0)
            .await?;

        let request = self
            .request_repo
            .create_request(
                &mut *tx,
                ctx.tenant_id,
                post_id,
                title,
                fields,
                due_date,
                &stats,
            )
            .await?;

        tx.commit().await?;

        Ok(request)
    }

    pub async fn list_requests(
        &self,
        ctx: &TenantContext,
        filter: &RequestFilter,
    ) -> Result<Vec<DataRequest>, AppError> {
        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        self.request_repo
            .list_requests(&mut *conn, ctx.tenant_id, ctx.user_id, filter)
            .await
    }

    /// Submissão de uma unidade. A primeira submissão por (request,
    /// location) move um pending -> submitted; repetir é idempotente
    /// (devolve a submissão existente, sem tocar nos contadores).
    pub async fn submit(
        &self,
        ctx: &TenantContext,
        request_id: Uuid,
        location_id: Uuid,
        data: &Value,
    ) -> Result<(RequestSubmission, bool), AppError> {
        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        // A leitura dos contadores e a reescrita acontecem na MESMA
        // transação, com a linha do request travada (FOR UPDATE):
        // submissões concorrentes de unidades distintas - e a varredura
        // de atraso - são serializadas pelo lock, sem update perdido.
        let mut tx = conn.begin().await?;

        let request = self
            .request_repo
            .find_request_for_update(&mut *tx, ctx.tenant_id, request_id)
            .await?
            .ok_or(AppError::NotFound("Request"))?;

        if request.status == RequestStatus::Closed {
            return Err(AppError::BadRequest(
                "Este request já foi encerrado e não aceita submissões.".to_string(),
            ));
        }

        // A location precisa ser uma unidade ativa DESTE tenant; de outro
        // tenant, ela "não existe".
        let accessible = self
            .tenancy_repo
            .filter_accessible_location_ids(&mut *tx, ctx.tenant_id, &[location_id])
            .await?;
        if accessible.is_empty() {
            return Err(AppError::NotFound("Location"));
        }

        let inserted = self
            .request_repo
            .insert_submission(&mut *tx, request_id, location_id, ctx.user_id, data)
            .await?;

        match inserted {
            Some(submission) => {
                let mut stats = request.completion_stats.0;
                stats.record_submission();
                self.request_repo
                    .update_completion_stats(&mut *tx, request_id, &stats)
                    .await?;
                tx.commit().await?;
                Ok((submission, true))
            }
            None => {
                // Perdeu a corrida (ou repetiu): devolve a linha vencedora.
                tx.commit().await?;
                let existing = self
                    .request_repo
                    .find_submission(&mut *conn, request_id, location_id)
                    .await?
                    .ok_or(AppError::NotFound("Submissão"))?;
                Ok((existing, false))
            }
        }
    }

    /// Varredura de atraso: requests ativos vencidos têm o saldo pendente
    /// movido para overdue. Invocada por um agendador externo (não há
    /// timer interno), por isso recebe o tenant direto, sem usuário;
    /// devolve quantos requests foram tocados.
    pub async fn sweep_overdue(&self, tenant_id: Uuid) -> Result<u64, AppError> {
        let mut conn = get_rls_connection(&self.pool, tenant_id, Uuid::nil()).await?;

        // Os candidatos saem travados (FOR UPDATE) até o commit: um submit
        // concorrente espera o lock e lê os contadores já varridos, em vez
        // de sobrescrevê-los com um snapshot velho.
        let mut tx = conn.begin().await?;

        let now = Utc::now();
        let candidates = self
            .request_repo
            .list_overdue_candidates(&mut *tx, tenant_id, now)
            .await?;

        let mut touched = 0u64;
        for request in candidates {
            let mut stats = request.completion_stats.0;
            stats.mark_all_pending_overdue();
            self.request_repo
                .update_completion_stats(&mut *tx, request.id, &stats)
                .await?;
            touched += 1;
        }

        tx.commit().await?;

        if touched > 0 {
            tracing::info!("Varredura de atraso: {} requests atualizados.", touched);
        }

        Ok(touched)
    }
}

/// Pré-condições da criação, na ordem do contrato: esquema de campos
/// primeiro (entrada malformada é erro do cliente, independente de quem
/// chama), papel corporate depois.
fn check_create_request(
    role: crate::models::tenancy::MembershipRole,
    fields: &[RequestFieldDef],
) -> Result<(), AppError> {
    for field in fields {
        field.validate()?;
    }
    require_corporate_role(role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{requests::FieldType, tenancy::MembershipRole};

    fn select_sem_options() -> RequestFieldDef {
        RequestFieldDef {
            name: "tamanho".to_string(),
            field_type: FieldType::Select,
            required: true,
            options: None,
        }
    }

    fn campo_texto() -> RequestFieldDef {
        RequestFieldDef {
            name: "observacao".to_string(),
            field_type: FieldType::Text,
            required: false,
            options: None,
        }
    }

    #[test]
    fn esquema_invalido_vence_o_gate_de_papel() {
        // Caller sem papel corporate E esquema quebrado: o 400 do esquema
        // sai primeiro, não o 403.
        let err =
            check_create_request(MembershipRole::FranchiseStaff, &[select_sem_options()])
                .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn esquema_valido_com_papel_errado_e_403() {
        let err =
            check_create_request(MembershipRole::FranchiseStaff, &[campo_texto()]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn esquema_valido_com_papel_corporate_passa() {
        assert!(check_create_request(MembershipRole::CorporateStaff, &[campo_texto()]).is_ok());
    }
}
