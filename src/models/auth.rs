// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Representa um usuário vindo do banco de dados (espelho do provedor de auth)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Estrutura de dados ("claims") dentro do JWT emitido pelo provedor
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub email: Option<String>,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

/// O usuário autenticado da requisição corrente. Quando não há linha em
/// `users` (o provedor conhece o usuário antes da gente), o perfil vem
/// das claims do token - o contrato do GET /auth/me.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    /// "database" quando o perfil veio da tabela users, "token" no fallback.
    pub source: &'static str,
}

impl CurrentUser {
    pub fn from_row(user: User) -> Self {
        Self {
            id: user.id,
            email: Some(user.email),
            full_name: user.full_name,
            source: "database",
        }
    }

    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email.clone(),
            full_name: None,
            source: "token",
        }
    }
}
