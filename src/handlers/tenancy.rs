// src/handlers/tenancy.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::TenantContext},
    models::tenancy::{Location, LocationStatus, Tenant},
};

// GET /api/tenants/current
#[utoipa::path(
    get,
    path = "/api/tenants/current",
    tag = "Tenancy",
    responses(
        (status = 200, description = "Tenant corrente do usuário", body = Tenant),
        (status = 404, description = "Nenhuma membership ativa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_current_tenant(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let tenant = app_state.tenancy_service.current_tenant(user.0.id).await?;
    Ok((StatusCode::OK, Json(tenant)))
}

#[derive(Debug, Deserialize)]
pub struct ListLocationsQuery {
    pub status: Option<String>,
}

// GET /api/locations
#[utoipa::path(
    get,
    path = "/api/locations",
    tag = "Tenancy",
    params(
        ("status" = Option<String>, Query, description = "active | inactive")
    ),
    responses(
        (status = 200, description = "Unidades do tenant"),
        (status = 400, description = "Status inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_locations(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListLocationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    // Enum de query validado antes de qualquer acesso ao banco.
    let status = query
        .status
        .as_deref()
        .map(|value| {
            LocationStatus::parse(value).ok_or_else(|| {
                AppError::BadRequest(
                    "O parâmetro 'status' deve ser 'active' ou 'inactive'.".to_string(),
                )
            })
        })
        .transpose()?;

    let locations = app_state.tenancy_service.list_locations(&ctx, status).await?;

    Ok((StatusCode::OK, Json(json!({ "data": locations }))))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationPayload {
    #[validate(length(min = 1, message = "O nome da unidade é obrigatório."))]
    #[schema(example = "Unidade Centro")]
    pub name: String,

    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,

    #[validate(length(min = 1, message = "A cidade é obrigatória."))]
    pub city: String,

    #[validate(length(min = 1, message = "O estado é obrigatório."))]
    pub state: String,

    #[validate(length(min = 1, message = "O CEP é obrigatório."))]
    pub zip_code: String,

    pub phone: Option<String>,
    pub email: Option<String>,
}

// POST /api/locations
#[utoipa::path(
    post,
    path = "/api/locations",
    tag = "Tenancy",
    request_body = CreateLocationPayload,
    responses(
        (status = 201, description = "Unidade criada", body = Location),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Papel sem permissão (exige tenant_admin ou franchise_owner)")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_location(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    WithRejection(Json(payload), _): WithRejection<Json<CreateLocationPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let location = app_state
        .tenancy_service
        .create_location(
            &ctx,
            &payload.name,
            &payload.address,
            &payload.city,
            &payload.state,
            &payload.zip_code,
            payload.phone.as_deref(),
            payload.email.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(location)))
}
