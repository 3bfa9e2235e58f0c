// src/config.rs

use std::{env, sync::Arc, time::Duration};

use rusoto_core::Region;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::{
        AttachmentRepository, PostRepository, RequestRepository, TenancyRepository, UserRepository,
    },
    services::{
        attachment_service::AttachmentService, auth::AuthService, post_service::PostService,
        request_service::RequestService, targeting::TargetingService,
        tenancy_service::TenancyService,
    },
    storage::{StorageBackend, s3::S3Storage},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    /// Segredo compartilhado dos endpoints internos (scanner e sweep).
    pub scanner_token: String,
    pub auth_service: AuthService,
    pub tenancy_service: TenancyService,
    pub post_service: PostService,
    pub request_service: RequestService,
    pub attachment_service: AttachmentService,
}

impl AppState {
    // A assinatura retorna um Result: configuração quebrada derruba o boot.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL deve ser definida"))?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET deve ser definido"))?;
        let scanner_token = env::var("SCANNER_TOKEN")
            .map_err(|_| anyhow::anyhow!("SCANNER_TOKEN deve ser definido"))?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let storage = build_storage()?;

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let tenancy_repo = TenancyRepository::new(db_pool.clone());
        let post_repo = PostRepository::new();
        let request_repo = RequestRepository::new();
        let attachment_repo = AttachmentRepository::new();

        let auth_service = AuthService::new(user_repo, jwt_secret.clone());
        let tenancy_service = TenancyService::new(tenancy_repo.clone(), db_pool.clone());
        let targeting = TargetingService::new(tenancy_repo.clone());
        let post_service =
            PostService::new(post_repo.clone(), targeting.clone(), db_pool.clone());
        let request_service = RequestService::new(
            request_repo,
            post_repo.clone(),
            tenancy_repo,
            targeting,
            db_pool.clone(),
        );
        let attachment_service =
            AttachmentService::new(attachment_repo, post_repo, storage, db_pool.clone());

        Ok(Self {
            db_pool,
            jwt_secret,
            scanner_token,
            auth_service,
            tenancy_service,
            post_service,
            request_service,
            attachment_service,
        })
    }
}

/// Backend de storage a partir do ambiente. S3_ENDPOINT presente vira uma
/// Region::Custom (MinIO e afins); ausente, usa a região da AWS.
fn build_storage() -> anyhow::Result<Arc<dyn StorageBackend>> {
    let bucket =
        env::var("S3_BUCKET").map_err(|_| anyhow::anyhow!("S3_BUCKET deve ser definido"))?;
    let pub_url = env::var("S3_PUBLIC_URL")
        .map_err(|_| anyhow::anyhow!("S3_PUBLIC_URL deve ser definida"))?;
    let region_name = env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string());

    let region = match env::var("S3_ENDPOINT") {
        Ok(endpoint) => Region::Custom {
            name: region_name,
            endpoint,
        },
        Err(_) => region_name
            .parse()
            .map_err(|_| anyhow::anyhow!("S3_REGION inválida: {}", region_name))?,
    };

    Ok(Arc::new(S3Storage::new(region, bucket, pub_url)))
}
