// src/db/request_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres, types::Json};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::requests::{
        CompletionStats, DataRequest, RequestFieldDef, RequestFilter, RequestRoleFilter,
        RequestSubmission,
    },
};

// Sem estado próprio: todos os métodos recebem o executor (conexão RLS ou
// transação) de quem chama.
#[derive(Clone, Default)]
pub struct RequestRepository;

impl RequestRepository {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_request<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        post_id: Uuid,
        title: &str,
        fields: &[RequestFieldDef],
        due_date: Option<DateTime<Utc>>,
        completion_stats: &CompletionStats,
    ) -> Result<DataRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, DataRequest>(
            r#"
            INSERT INTO requests (tenant_id, post_id, title, fields, due_date, completion_stats)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(post_id)
        .bind(title)
        .bind(Json(fields))
        .bind(due_date)
        .bind(Json(completion_stats))
        .fetch_one(executor)
        .await?;

        Ok(request)
    }

    /// Busca com trava de linha (FOR UPDATE): os contadores serão
    /// reescritos na mesma transação, então leitores concorrentes do
    /// snapshot esperam o commit em vez de partir de um estado velho.
    pub async fn find_request_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        request_id: Uuid,
    ) -> Result<Option<DataRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, DataRequest>(
            r#"
            SELECT * FROM requests
            WHERE tenant_id = $1 AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(tenant_id)
        .bind(request_id)
        .fetch_optional(executor)
        .await?;

        Ok(request)
    }

    /// Listagem com filtro tipado. `created`/`assigned` olham o autor do
    /// post pai: quem abriu vê os seus; o resto da rede vê o que o alcança.
    pub async fn list_requests<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
        filter: &RequestFilter,
    ) -> Result<Vec<DataRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let role = filter.role.map(|r| match r {
            RequestRoleFilter::Created => "created",
            RequestRoleFilter::Assigned => "assigned",
        });

        let requests = sqlx::query_as::<_, DataRequest>(
            r#"
            SELECT r.id, r.tenant_id, r.post_id, r.title, r.fields, r.due_date,
                   r.status, r.completion_stats, r.created_at, r.updated_at
            FROM requests r
            JOIN posts p ON p.id = r.post_id
            WHERE r.tenant_id = $1
              AND ($2::request_status IS NULL OR r.status = $2)
              AND ($3::text IS NULL
                   OR ($3 = 'created' AND p.author_user_id = $4)
                   OR ($3 = 'assigned' AND p.author_user_id <> $4))
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(filter.status)
        .bind(role)
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(requests)
    }

    /// Insere a submissão de uma unidade. ON CONFLICT DO NOTHING: sob
    /// corrida, no máximo uma linha por (request, location) vence; o
    /// perdedor recebe `None` e NÃO mexe nos contadores.
    pub async fn insert_submission<'e, E>(
        &self,
        executor: E,
        request_id: Uuid,
        location_id: Uuid,
        submitted_by: Uuid,
        data: &serde_json::Value,
    ) -> Result<Option<RequestSubmission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let submission = sqlx::query_as::<_, RequestSubmission>(
            r#"
            INSERT INTO request_submissions (request_id, location_id, submitted_by, data)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (request_id, location_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(location_id)
        .bind(submitted_by)
        .bind(Json(data))
        .fetch_optional(executor)
        .await?;

        Ok(submission)
    }

    pub async fn find_submission<'e, E>(
        &self,
        executor: E,
        request_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<RequestSubmission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let submission = sqlx::query_as::<_, RequestSubmission>(
            r#"
            SELECT * FROM request_submissions
            WHERE request_id = $1 AND location_id = $2
            "#,
        )
        .bind(request_id)
        .bind(location_id)
        .fetch_optional(executor)
        .await?;

        Ok(submission)
    }

    pub async fn update_completion_stats<'e, E>(
        &self,
        executor: E,
        request_id: Uuid,
        stats: &CompletionStats,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE requests
            SET completion_stats = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(request_id)
        .bind(Json(stats))
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Requests ativos, vencidos e ainda com pendências - os candidatos da
    /// varredura de atraso. As linhas saem travadas (FOR UPDATE) para a
    /// transação que vai reescrever os contadores.
    pub async fn list_overdue_candidates<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<DataRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let requests = sqlx::query_as::<_, DataRequest>(
            r#"
            SELECT * FROM requests
            WHERE tenant_id = $1
              AND status = 'active'
              AND due_date IS NOT NULL
              AND due_date < $2
              AND (completion_stats ->> 'pending')::bigint > 0
            FOR UPDATE
            "#,
        )
        .bind(tenant_id)
        .bind(now)
        .fetch_all(executor)
        .await?;

        Ok(requests)
    }
}
