use axum::{
    Json,
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Todo endpoint devolve o mesmo envelope: {"error": <tipo>, "message": <texto>}.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Token de autenticação inválido ou ausente")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Arquivo excede o tamanho máximo permitido")]
    FileTooLarge,

    // 423: a verificação de vírus ainda não terminou.
    #[error("Arquivo aguardando verificação de vírus")]
    ScanPending,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de armazenamento de arquivos: {0}")]
    StorageError(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Corpo JSON malformado vira 400 com o nosso envelope, nunca o corpo padrão do axum.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

// O DefaultBodyLimit estoura DENTRO do extractor de multipart: corpo
// grande demais tem que continuar saindo como 413, o resto como 400.
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::from_multipart(err.status(), err.to_string())
    }
}

impl AppError {
    fn from_multipart(status: StatusCode, detail: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::FileTooLarge
        } else {
            AppError::BadRequest(format!("Multipart inválido: {}", detail))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            // Retorna todos os detalhes da validação numa mensagem só,
            // nomeando os campos ofensores.
            AppError::ValidationError(errors) => {
                let mut parts: Vec<String> = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    parts.push(format!("{}: {}", field, messages.join(", ")));
                }
                parts.sort();
                (StatusCode::BAD_REQUEST, "Bad Request", parts.join("; "))
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            AppError::InvalidToken | AppError::JwtError(_) => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", msg),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                "Not Found",
                format!("{} não encontrado.", resource),
            ),
            AppError::FileTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "File Too Large",
                "O arquivo excede o tamanho máximo de 50MB.".to_string(),
            ),
            AppError::ScanPending => (
                StatusCode::LOCKED,
                "Locked",
                "Arquivo aguardando verificação de vírus; tente novamente.".to_string(),
            ),

            // Falhas de persistência/armazenamento viram 500 sem vazar
            // detalhe do backend para o cliente. O `tracing` loga o resto.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": kind, "message": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpo_acima_do_limite_no_multipart_e_413() {
        let err = AppError::from_multipart(
            StatusCode::PAYLOAD_TOO_LARGE,
            "length limit exceeded".to_string(),
        );
        assert!(matches!(err, AppError::FileTooLarge));
        assert_eq!(
            err.into_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn multipart_malformado_continua_400() {
        let err =
            AppError::from_multipart(StatusCode::BAD_REQUEST, "invalid boundary".to_string());
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
