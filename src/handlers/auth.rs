// src/handlers/auth.rs

use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser, models::auth::CurrentUser};

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Perfil do usuário autenticado", body = CurrentUser),
        (status = 401, description = "Token inválido ou ausente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(user: AuthenticatedUser) -> Result<impl IntoResponse, AppError> {
    // O perfil vem do banco quando existe linha local; senão, das claims
    // do token (o auth_guard já resolveu isso).
    Ok((StatusCode::OK, Json(user.0)))
}
