// src/storage/mod.rs

pub mod s3;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::common::error::AppError;

/// Validade máxima de uma URL assinada de download: 1 hora.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Erro S3: {0}")]
    S3(String),

    #[error("Erro de credenciais: {0}")]
    Credentials(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::StorageError(err.to_string())
    }
}

/// A fronteira com o provedor de armazenamento de objetos. Durabilidade e
/// controle de acesso por URL assinada são problemas DELE, não nossos.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Grava o objeto inteiro (os uploads já chegam completos na memória).
    async fn put_object(
        &self,
        data: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Emite uma URL de download assinada com validade limitada.
    async fn presigned_download_url(
        &self,
        filename: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;

    /// URL estável (não assinada) registrada junto com o anexo.
    fn object_url(&self, filename: &str) -> String;
}
