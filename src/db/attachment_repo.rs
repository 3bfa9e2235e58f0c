// src/db/attachment_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::attachments::{Attachment, VirusScanStatus},
};

// Sem estado próprio: todos os métodos recebem o executor (conexão RLS ou
// transação) de quem chama.
#[derive(Clone, Default)]
pub struct AttachmentRepository;

impl AttachmentRepository {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_attachment<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        post_id: Option<Uuid>,
        comment_id: Option<Uuid>,
        uploaded_by: Uuid,
        filename: &str,
        original_filename: &str,
        file_size: i64,
        mime_type: &str,
        download_url: &str,
    ) -> Result<Attachment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments
                (tenant_id, post_id, comment_id, uploaded_by, filename,
                 original_filename, file_size, mime_type, download_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(post_id)
        .bind(comment_id)
        .bind(uploaded_by)
        .bind(filename)
        .bind(original_filename)
        .bind(file_size)
        .bind(mime_type)
        .bind(download_url)
        .fetch_one(executor)
        .await?;

        Ok(attachment)
    }

    pub async fn find_attachment<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        attachment_id: Uuid,
    ) -> Result<Option<Attachment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            SELECT * FROM attachments
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(attachment_id)
        .fetch_optional(executor)
        .await?;

        Ok(attachment)
    }

    /// Aplica o veredito do scanner externo. A cláusula WHERE torna a
    /// transição unidirecional: só sai de 'pending', nunca reverte.
    pub async fn set_scan_status<'e, E>(
        &self,
        executor: E,
        attachment_id: Uuid,
        status: VirusScanStatus,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE attachments
            SET virus_scan_status = $2
            WHERE id = $1 AND virus_scan_status = 'pending'
            "#,
        )
        .bind(attachment_id)
        .bind(status)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
