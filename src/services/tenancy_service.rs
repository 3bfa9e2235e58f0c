// src/services/tenancy_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::get_rls_connection, error::AppError},
    db::TenancyRepository,
    middleware::tenancy::TenantContext,
    models::tenancy::{Location, LocationStatus, Membership, MembershipRole, Tenant},
};

#[derive(Clone)]
pub struct TenancyService {
    tenancy_repo: TenancyRepository,
    pool: PgPool,
}

impl TenancyService {
    pub fn new(tenancy_repo: TenancyRepository, pool: PgPool) -> Self {
        Self { tenancy_repo, pool }
    }

    /// O "tenant corrente" do usuário: a membership ativa mais antiga
    /// (desempate documentado, nada de first-row-wins implícito).
    pub async fn resolve_active_tenant(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        let memberships = self.tenancy_repo.list_active_memberships(user_id).await?;
        Ok(pick_active_membership(memberships))
    }

    pub async fn find_active_membership(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        self.tenancy_repo
            .find_active_membership(user_id, tenant_id)
            .await
    }

    /// GET /tenants/current: 404 quando o usuário não tem membership ativa.
    pub async fn current_tenant(&self, user_id: Uuid) -> Result<Tenant, AppError> {
        let membership = self
            .resolve_active_tenant(user_id)
            .await?
            .ok_or(AppError::NotFound("Tenant"))?;

        self.tenancy_repo
            .find_tenant(membership.tenant_id)
            .await?
            .ok_or(AppError::NotFound("Tenant"))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_location(
        &self,
        ctx: &TenantContext,
        name: &str,
        address: &str,
        city: &str,
        state: &str,
        zip_code: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Location, AppError> {
        // Autorização por papel: só admin da rede ou dono de franquia.
        if !ctx.role.can_manage_locations() {
            return Err(AppError::Forbidden(
                "Apenas tenant_admin ou franchise_owner podem criar locations.".to_string(),
            ));
        }

        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        self.tenancy_repo
            .create_location(
                &mut *conn,
                ctx.tenant_id,
                name,
                address,
                city,
                state,
                zip_code,
                phone,
                email,
            )
            .await
    }

    pub async fn list_locations(
        &self,
        ctx: &TenantContext,
        status: Option<LocationStatus>,
    ) -> Result<Vec<Location>, AppError> {
        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        self.tenancy_repo
            .list_locations(&mut *conn, ctx.tenant_id, status)
            .await
    }
}

/// Desempate puro e testável: memberships ativas, a mais antiga primeiro.
pub fn pick_active_membership(mut memberships: Vec<Membership>) -> Option<Membership> {
    memberships.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    memberships.into_iter().next()
}

/// Checagem de capacidade usada pelos handlers de request: papel corporate.
pub fn require_corporate_role(role: MembershipRole) -> Result<(), AppError> {
    if role.is_corporate() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Apenas papéis corporate (corporate_admin/corporate_staff/corporate_manager) podem criar requests.".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tenancy::MembershipStatus;
    use chrono::{Duration, Utc};

    fn membership(days_ago: i64) -> Membership {
        Membership {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            role: MembershipRole::TenantStaff,
            status: MembershipStatus::Active,
            created_at: Utc::now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn membership_mais_antiga_vence() {
        let old = membership(30);
        let newer = membership(5);
        let expected = old.tenant_id;

        let picked = pick_active_membership(vec![newer, old]).unwrap();
        assert_eq!(picked.tenant_id, expected);
    }

    #[test]
    fn sem_membership_nao_ha_tenant_corrente() {
        assert!(pick_active_membership(vec![]).is_none());
    }

    #[test]
    fn papel_corporate_cria_request() {
        assert!(require_corporate_role(MembershipRole::CorporateManager).is_ok());
        assert!(require_corporate_role(MembershipRole::CorporateAdmin).is_ok());
    }

    #[test]
    fn papel_de_franquia_nao_cria_request() {
        let err = require_corporate_role(MembershipRole::FranchiseOwner).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
