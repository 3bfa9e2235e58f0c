// src/storage/s3.rs

use std::time::Duration;

use async_trait::async_trait;
use rusoto_core::{
    Region,
    credential::{DefaultCredentialsProvider, ProvideAwsCredentials},
};
use rusoto_s3::{
    GetObjectRequest, PutObjectRequest, S3, S3Client,
    util::{PreSignedRequest, PreSignedRequestOption},
};

use super::{StorageBackend, StorageError};

/// Backend S3-compatível (AWS ou endpoint customizado via Region::Custom).
pub struct S3Storage {
    s3: S3Client,
    region: Region,
    bucket_name: String,
    pub_url: String,
}

impl S3Storage {
    pub fn new(region: Region, bucket_name: String, pub_url: String) -> S3Storage {
        tracing::info!("✅ S3Storage inicializado para o bucket: {}", bucket_name);

        S3Storage {
            s3: S3Client::new(region.clone()),
            region,
            bucket_name,
            pub_url,
        }
    }

    /// Particiona as chaves por prefixo (ab/cd/abcd...) para não acumular
    /// milhões de objetos num único "diretório" lógico.
    fn get_key_path(filename: &str) -> String {
        if filename.len() < 4 {
            filename.to_string()
        } else {
            let prefix1 = &filename[0..2];
            let prefix2 = &filename[2..4];
            format!("{}/{}/{}", prefix1, prefix2, filename)
        }
    }
}

#[async_trait]
impl StorageBackend for S3Storage {
    async fn put_object(
        &self,
        data: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<(), StorageError> {
        tracing::debug!("S3Storage: put_object: {}", filename);

        let key = Self::get_key_path(filename);
        let put_request = PutObjectRequest {
            bucket: self.bucket_name.clone(),
            key,
            body: Some(data.into()),
            content_type: Some(content_type.to_string()),
            ..Default::default()
        };

        self.s3
            .put_object(put_request)
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        Ok(())
    }

    async fn presigned_download_url(
        &self,
        filename: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        tracing::debug!("S3Storage: presigned_download_url: {}", filename);

        let provider = DefaultCredentialsProvider::new()
            .map_err(|e| StorageError::Credentials(e.to_string()))?;
        let credentials = provider
            .credentials()
            .await
            .map_err(|e| StorageError::Credentials(e.to_string()))?;

        let request = GetObjectRequest {
            bucket: self.bucket_name.clone(),
            key: Self::get_key_path(filename),
            ..Default::default()
        };

        let url = request.get_presigned_url(
            &self.region,
            &credentials,
            &PreSignedRequestOption { expires_in },
        );

        Ok(url)
    }

    fn object_url(&self, filename: &str) -> String {
        format!("{}/{}", self.pub_url, Self::get_key_path(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chaves_sao_particionadas_por_prefixo() {
        assert_eq!(
            S3Storage::get_key_path("abcdef123.png"),
            "ab/cd/abcdef123.png"
        );
    }

    #[test]
    fn chaves_curtas_nao_sao_particionadas() {
        assert_eq!(S3Storage::get_key_path("abc"), "abc");
    }
}
