// src/services/auth.rs

use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, CurrentUser},
};

/// A validação do token é a ÚNICA coisa que fazemos de autenticação: quem
/// emite e gerencia sessões é o provedor externo. A gente só confere a
/// assinatura e resolve o perfil.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self {
            user_repo,
            jwt_secret,
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<CurrentUser, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Linha local quando existe; senão, o perfil vem das claims
        // (o provedor pode conhecer o usuário antes do nosso banco).
        let current = match self.user_repo.find_by_id(token_data.claims.sub).await? {
            Some(user) => CurrentUser::from_row(user),
            None => CurrentUser::from_claims(&token_data.claims),
        };

        Ok(current)
    }
}
