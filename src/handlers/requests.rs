// src/handlers/requests.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        validate::{parse_iso_datetime, parse_uuid_param},
    },
    config::AppState,
    middleware::tenancy::TenantContext,
    models::requests::{
        DataRequest, RequestFieldDef, RequestFilter, RequestRoleFilter, RequestStatus,
    },
};

#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    pub status: Option<String>,
    pub role: Option<String>,
}

// GET /api/requests
#[utoipa::path(
    get,
    path = "/api/requests",
    tag = "Requests",
    params(
        ("status" = Option<String>, Query, description = "active | closed"),
        ("role" = Option<String>, Query, description = "created | assigned")
    ),
    responses(
        (status = 200, description = "Requests do tenant"),
        (status = 400, description = "Enum inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListRequestsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = query
        .status
        .as_deref()
        .map(|value| {
            RequestStatus::parse(value).ok_or_else(|| {
                AppError::BadRequest(
                    "O parâmetro 'status' deve ser 'active' ou 'closed'.".to_string(),
                )
            })
        })
        .transpose()?;

    let role = query
        .role
        .as_deref()
        .map(|value| {
            RequestRoleFilter::parse(value).ok_or_else(|| {
                AppError::BadRequest(
                    "O parâmetro 'role' deve ser 'created' ou 'assigned'.".to_string(),
                )
            })
        })
        .transpose()?;

    let filter = RequestFilter { status, role };
    let requests = app_state.request_service.list_requests(&ctx, &filter).await?;

    Ok((StatusCode::OK, Json(json!({ "data": requests }))))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestPayload {
    /// Post pai (dono do targeting que dimensiona os contadores).
    pub post_id: String,

    #[validate(length(min = 1, message = "O título do request é obrigatório."))]
    pub title: String,

    /// Lista ordenada de campos; select exige options.
    #[validate(length(min = 1, message = "O request precisa de ao menos um campo."))]
    pub fields: Vec<RequestFieldDef>,

    #[schema(example = "2025-07-01T18:00:00")]
    pub due_date: Option<String>,
}

// POST /api/requests
#[utoipa::path(
    post,
    path = "/api/requests",
    tag = "Requests",
    request_body = CreateRequestPayload,
    responses(
        (status = 201, description = "Request criado com completion_stats inicial", body = DataRequest),
        (status = 400, description = "Esquema de campos inválido"),
        (status = 403, description = "Papel não-corporate"),
        (status = 404, description = "Post pai não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_request(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    WithRejection(Json(payload), _): WithRejection<Json<CreateRequestPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let post_id = parse_uuid_param(&payload.post_id, "post_id")?;
    let due_date = payload
        .due_date
        .as_deref()
        .map(|value| parse_iso_datetime(value, "due_date"))
        .transpose()?;

    let request = app_state
        .request_service
        .create_request(&ctx, post_id, &payload.title, &payload.fields, due_date)
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequestPayload {
    /// Unidade que está respondendo.
    pub location_id: String,

    /// Respostas do formulário (opaco para o backend).
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Value,
}

// POST /api/requests/{requestId}/submissions
#[utoipa::path(
    post,
    path = "/api/requests/{requestId}/submissions",
    tag = "Requests",
    params(("requestId" = String, Path, description = "UUID do request")),
    request_body = SubmitRequestPayload,
    responses(
        (status = 201, description = "Primeira submissão da unidade (move pending -> submitted)"),
        (status = 200, description = "Submissão repetida (idempotente, contadores intactos)"),
        (status = 400, description = "Request encerrado ou payload inválido"),
        (status = 404, description = "Request ou location não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_request(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    Path(request_id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<SubmitRequestPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let request_id = parse_uuid_param(&request_id, "requestId")?;
    let location_id = parse_uuid_param(&payload.location_id, "location_id")?;

    let (submission, created) = app_state
        .request_service
        .submit(&ctx, request_id, location_id, &payload.data)
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(json!({ "data": submission }))))
}
