// src/handlers/attachments.rs

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validate::parse_uuid_param},
    config::AppState,
    middleware::tenancy::TenantContext,
    models::attachments::Attachment,
    services::attachment_service::{DownloadOutcome, UploadFile},
};

// POST /api/uploads (multipart/form-data)
#[utoipa::path(
    post,
    path = "/api/uploads",
    tag = "Attachments",
    responses(
        (status = 201, description = "Anexo criado com virus_scan_status=pending", body = Attachment),
        (status = 400, description = "Arquivo ausente/vazio ou MIME fora da allow-list"),
        (status = 404, description = "post_id/comment_id não encontrados"),
        (status = 413, description = "Arquivo acima de 50MB")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<UploadFile> = None;
    let mut post_id: Option<Uuid> = None;
    let mut comment_id: Option<Uuid> = None;

    // O upload inteiro cabe na memória por contrato (limite de 50MB
    // checado logo depois, antes de qualquer chamada ao storage).
    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or_default() {
            "file" => {
                let original_filename = field
                    .file_name()
                    .unwrap_or("arquivo")
                    .to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await?.to_vec();
                file = Some(UploadFile {
                    data,
                    original_filename,
                    mime_type,
                });
            }
            "post_id" => {
                let value = field.text().await?;
                post_id = Some(parse_uuid_param(&value, "post_id")?);
            }
            "comment_id" => {
                let value = field.text().await?;
                comment_id = Some(parse_uuid_param(&value, "comment_id")?);
            }
            // Campos desconhecidos são ignorados.
            _ => {}
        }
    }

    let file = file.ok_or_else(|| {
        AppError::BadRequest("O campo 'file' é obrigatório no multipart.".to_string())
    })?;

    let attachment = app_state
        .attachment_service
        .upload(&ctx, file, post_id, comment_id)
        .await?;

    Ok((StatusCode::CREATED, Json(attachment)))
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(rename = "accept-pending", default)]
    pub accept_pending: bool,
}

// GET /api/attachments/{attachmentId}/download
#[utoipa::path(
    get,
    path = "/api/attachments/{attachmentId}/download",
    tag = "Attachments",
    params(
        ("attachmentId" = String, Path, description = "UUID do anexo"),
        ("accept-pending" = Option<bool>, Query, description = "Aceitar metadados enquanto o scan não termina")
    ),
    responses(
        (status = 302, description = "Redirect para URL assinada (validade <= 1h)"),
        (status = 202, description = "Scan pendente, caller optou por metadados"),
        (status = 403, description = "Arquivo infectado - download proibido para sempre"),
        (status = 404, description = "Anexo (ou pai) inacessível"),
        (status = 423, description = "Scan pendente sem accept-pending")
    ),
    security(("api_jwt" = []))
)]
pub async fn download(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    Path(attachment_id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse, AppError> {
    let attachment_id = parse_uuid_param(&attachment_id, "attachmentId")?;

    let outcome = app_state
        .attachment_service
        .download(&ctx, attachment_id, query.accept_pending)
        .await?;

    match outcome {
        DownloadOutcome::Redirect(url) => {
            Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
        }
        DownloadOutcome::Processing(attachment) => Ok((
            StatusCode::ACCEPTED,
            Json(json!({
                "data": attachment,
                "status": "processing",
            })),
        )
            .into_response()),
    }
}
