// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{auth::CurrentUser, tenancy::MembershipRole},
};

// O nome do nosso cabeçalho HTTP customizado (troca explícita de tenant)
const TENANT_ID_HEADER: &str = "x-tenant-id";

/// O contexto de tenant da requisição: quem, onde e com que papel.
/// Toda decisão de autorização a jusante é chaveada por ele.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: MembershipRole,
}

/// Resolve o tenant do caller. Com o cabeçalho X-Tenant-ID, exige uma
/// membership ATIVA naquele tenant; sem ele, cai na membership ativa mais
/// antiga (o "tenant corrente"). Membership suspensa = inexistente.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(AppError::InvalidToken)?;

    let header_value = request
        .headers()
        .get(TENANT_ID_HEADER)
        .map(|value| {
            value.to_str().map_err(|_| {
                AppError::BadRequest(
                    "Cabeçalho X-Tenant-ID contém caracteres inválidos.".to_string(),
                )
            })
        })
        .transpose()?
        .map(|value| {
            Uuid::parse_str(value).map_err(|_| {
                AppError::BadRequest("Cabeçalho X-Tenant-ID inválido (não é um UUID).".to_string())
            })
        })
        .transpose()?;

    let membership = match header_value {
        Some(tenant_id) => app_state
            .tenancy_service
            .find_active_membership(user.id, tenant_id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden(
                    "Você não possui uma membership ativa neste tenant.".to_string(),
                )
            })?,
        None => app_state
            .tenancy_service
            .resolve_active_tenant(user.id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("Você não possui nenhuma membership ativa.".to_string())
            })?,
    };

    request.extensions_mut().insert(TenantContext {
        tenant_id: membership.tenant_id,
        user_id: user.id,
        role: membership.role,
    });

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .ok_or_else(|| {
                AppError::Forbidden("Contexto de tenant não encontrado na requisição.".to_string())
            })
    }
}
