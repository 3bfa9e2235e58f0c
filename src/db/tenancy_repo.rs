// src/db/tenancy_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tenancy::{Location, LocationStatus, Membership, Tenant},
};

#[derive(Clone)]
pub struct TenancyRepository {
    pool: PgPool,
}

impl TenancyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  MEMBERSHIPS (a chave de toda autorização)
    // =========================================================================

    /// Membership ATIVA do usuário no tenant pedido. Memberships suspensas
    /// se comportam como inexistentes.
    pub async fn find_active_membership(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, user_id, tenant_id, role, status, created_at
            FROM memberships
            WHERE user_id = $1 AND tenant_id = $2 AND status = 'active'
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    /// Todas as memberships ativas do usuário, da mais antiga para a mais
    /// nova. A ordenação é o desempate documentado do "tenant corrente".
    pub async fn list_active_memberships(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Membership>, AppError> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, user_id, tenant_id, role, status, created_at
            FROM memberships
            WHERE user_id = $1 AND status = 'active'
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(memberships)
    }

    pub async fn find_tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, slug, plan, status, settings, created_at, updated_at
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    // =========================================================================
    //  LOCATIONS (as unidades físicas da rede)
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create_location<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        address: &str,
        city: &str,
        state: &str,
        zip_code: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (tenant_id, name, address, city, state, zip_code, phone, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(address)
        .bind(city)
        .bind(state)
        .bind(zip_code)
        .bind(phone)
        .bind(email)
        .fetch_one(executor)
        .await?;

        Ok(location)
    }

    pub async fn list_locations<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        status: Option<LocationStatus>,
    ) -> Result<Vec<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT *
            FROM locations
            WHERE tenant_id = $1
              AND ($2::location_status IS NULL OR status = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(locations)
    }

    /// Contagem real de unidades ativas do tenant - usada como
    /// total_locations quando o targeting é global.
    pub async fn count_active_locations<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM locations
            WHERE tenant_id = $1 AND status = 'active'
            "#,
        )
        .bind(tenant_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    /// Dos IDs listados, quais resolvem para unidades ativas DESTE tenant.
    /// IDs de outros tenants simplesmente não aparecem no resultado.
    pub async fn filter_accessible_location_ids<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        location_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM locations
            WHERE tenant_id = $1 AND status = 'active' AND id = ANY($2)
            "#,
        )
        .bind(tenant_id)
        .bind(location_ids)
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }
}
