// src/handlers/internal.rs
//
// Endpoints fora da superfície pública: o callback do scanner de vírus e
// o gatilho da varredura de atraso. Ambos são chamados por processos, não
// por usuários, e se autenticam por segredo compartilhado.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{
    common::{error::AppError, validate::parse_uuid_param},
    config::AppState,
    models::attachments::VirusScanStatus,
};

const SCANNER_TOKEN_HEADER: &str = "x-scanner-token";

fn check_scanner_token(app_state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let provided = headers
        .get(SCANNER_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(token) if token == app_state.scanner_token => Ok(()),
        _ => Err(AppError::InvalidToken),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanResultPayload {
    pub attachment_id: String,
    /// clean | infected (pending não é um veredito).
    pub status: String,
}

// POST /api/internal/scan-results
#[utoipa::path(
    post,
    path = "/api/internal/scan-results",
    tag = "Internal",
    request_body = ScanResultPayload,
    responses(
        (status = 200, description = "Veredito aplicado (updated=false se a transição já ocorreu)"),
        (status = 400, description = "Status inválido"),
        (status = 401, description = "Token do scanner ausente/incorreto")
    )
)]
pub async fn scan_results(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    WithRejection(Json(payload), _): WithRejection<Json<ScanResultPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    check_scanner_token(&app_state, &headers)?;

    let attachment_id = parse_uuid_param(&payload.attachment_id, "attachmentId")?;

    let status = match payload.status.as_str() {
        "clean" => VirusScanStatus::Clean,
        "infected" => VirusScanStatus::Infected,
        other => {
            return Err(AppError::BadRequest(format!(
                "O campo 'status' não aceita o valor '{}' (use clean ou infected).",
                other
            )));
        }
    };

    let updated = app_state
        .attachment_service
        .apply_scan_result(attachment_id, status)
        .await?;

    Ok((StatusCode::OK, Json(json!({ "updated": updated }))))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverdueSweepPayload {
    pub tenant_id: String,
}

// POST /api/internal/overdue-sweep
#[utoipa::path(
    post,
    path = "/api/internal/overdue-sweep",
    tag = "Internal",
    request_body = OverdueSweepPayload,
    responses(
        (status = 200, description = "Varredura executada; devolve quantos requests mudaram"),
        (status = 401, description = "Token ausente/incorreto")
    )
)]
pub async fn overdue_sweep(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    WithRejection(Json(payload), _): WithRejection<Json<OverdueSweepPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    check_scanner_token(&app_state, &headers)?;

    let tenant_id = parse_uuid_param(&payload.tenant_id, "tenantId")?;
    let touched = app_state.request_service.sweep_overdue(tenant_id).await?;

    Ok((StatusCode::OK, Json(json!({ "touched": touched }))))
}
