// src/models/attachments.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Tri-estado da verificação de vírus. As transições são unidirecionais
/// (pending -> clean | infected) e feitas por um scanner externo; este
/// código nunca reverte um estado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "virus_scan_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VirusScanStatus {
    Pending,
    Clean,
    Infected,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Pertence a no máximo um post OU um comentário; sem nenhum dos dois,
    /// o anexo é "avulso" e gateado só pela associação ao tenant.
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub uploaded_by: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub file_size: i64,
    pub mime_type: String,
    pub download_url: String,
    pub virus_scan_status: VirusScanStatus,
    pub created_at: DateTime<Utc>,
}
