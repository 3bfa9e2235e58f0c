// src/common/db_utils.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Adquire uma conexão da pool e define as variáveis de sessão que as
/// políticas RLS do Postgres usam (app.tenant_id / app.user_id).
/// Os repositórios continuam filtrando por tenant_id explicitamente;
/// o RLS é a segunda camada de defesa, do lado do banco.
pub(crate) async fn get_rls_connection(
    pool: &PgPool,
    tenant_id: Uuid,
    user_id: Uuid,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    // 1. Adquire conexão
    let mut conn = pool.acquire().await?;

    // 2. Define Tenant ID (escopo de sessão da conexão)
    sqlx::query("SELECT set_config('app.tenant_id', $1, false)")
        .bind(tenant_id.to_string())
        .execute(&mut *conn)
        .await?;

    // 3. Define User ID
    sqlx::query("SELECT set_config('app.user_id', $1, false)")
        .bind(user_id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(conn)
}
