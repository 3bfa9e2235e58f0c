// src/services/post_service.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::get_rls_connection, error::AppError, pagination::PageParams},
    db::PostRepository,
    middleware::tenancy::TenantContext,
    models::posts::{Comment, Post, PostFilter, PostType, Reaction, ReactionType, Targeting},
    services::targeting::TargetingService,
};

/// Dados já validados para criação de post.
pub struct NewPost<'a> {
    pub title: Option<&'a str>,
    pub body: &'a str,
    pub body_rich: Option<&'a Value>,
    pub post_type: PostType,
    pub targeting: Targeting,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    targeting: TargetingService,
    pool: PgPool,
}

impl PostService {
    pub fn new(post_repo: PostRepository, targeting: TargetingService, pool: PgPool) -> Self {
        Self {
            post_repo,
            targeting,
            pool,
        }
    }

    pub async fn create_post(
        &self,
        ctx: &TenantContext,
        new_post: NewPost<'_>,
    ) -> Result<Post, AppError> {
        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        // O avaliador de targeting decide o acesso ANTES de persistir.
        self.targeting
            .authorize_targeting(&mut *conn, ctx.tenant_id, &new_post.targeting)
            .await?;

        self.post_repo
            .create_post(
                &mut *conn,
                ctx.tenant_id,
                ctx.user_id,
                new_post.title,
                new_post.body,
                new_post.body_rich,
                new_post.post_type,
                &new_post.targeting,
                new_post.due_date,
            )
            .await
    }

    /// Listagem paginada: devolve a página e o total para o envelope.
    pub async fn list_posts(
        &self,
        ctx: &TenantContext,
        filter: &PostFilter,
        page: PageParams,
    ) -> Result<(Vec<Post>, i64), AppError> {
        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        let total = self
            .post_repo
            .count_posts(&mut *conn, ctx.tenant_id, filter)
            .await?;
        let posts = self
            .post_repo
            .list_posts(&mut *conn, ctx.tenant_id, filter, page)
            .await?;

        Ok((posts, total))
    }

    /// 404 cobre tanto "não existe" quanto "existe noutro tenant" - não
    /// confirmamos existência através da fronteira de tenant.
    pub async fn get_post(&self, ctx: &TenantContext, post_id: Uuid) -> Result<Post, AppError> {
        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        self.post_repo
            .find_post(&mut *conn, ctx.tenant_id, post_id)
            .await?
            .ok_or(AppError::NotFound("Post"))
    }

    pub async fn add_comment(
        &self,
        ctx: &TenantContext,
        post_id: Uuid,
        parent_comment_id: Option<Uuid>,
        body: &str,
        body_rich: Option<&Value>,
    ) -> Result<Comment, AppError> {
        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        // O post precisa existir (e ser visível) antes de qualquer coisa.
        self.post_repo
            .find_post(&mut *conn, ctx.tenant_id, post_id)
            .await?
            .ok_or(AppError::NotFound("Post"))?;

        // Um nível de encadeamento: o pai deve ser um comentário do MESMO post.
        if let Some(parent_id) = parent_comment_id {
            let parent = self
                .post_repo
                .find_comment(&mut *conn, parent_id)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest(
                        "O campo 'parent_comment_id' não referencia um comentário existente."
                            .to_string(),
                    )
                })?;

            if parent.post_id != post_id {
                return Err(AppError::BadRequest(
                    "O campo 'parent_comment_id' referencia um comentário de outro post."
                        .to_string(),
                ));
            }
        }

        self.post_repo
            .create_comment(
                &mut *conn,
                post_id,
                parent_comment_id,
                ctx.user_id,
                body,
                body_rich,
            )
            .await
    }

    pub async fn list_comments(
        &self,
        ctx: &TenantContext,
        post_id: Uuid,
    ) -> Result<Vec<Comment>, AppError> {
        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        self.post_repo
            .find_post(&mut *conn, ctx.tenant_id, post_id)
            .await?
            .ok_or(AppError::NotFound("Post"))?;

        self.post_repo.list_comments(&mut *conn, post_id).await
    }

    /// `add` troca a reação anterior (nunca acumula); `remove` é
    /// idempotente - 200 mesmo sem reação para remover.
    pub async fn add_reaction(
        &self,
        ctx: &TenantContext,
        post_id: Uuid,
        reaction_type: ReactionType,
    ) -> Result<Reaction, AppError> {
        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        self.post_repo
            .find_post(&mut *conn, ctx.tenant_id, post_id)
            .await?
            .ok_or(AppError::NotFound("Post"))?;

        self.post_repo
            .upsert_reaction(&mut *conn, post_id, ctx.user_id, reaction_type)
            .await
    }

    pub async fn remove_reaction(
        &self,
        ctx: &TenantContext,
        post_id: Uuid,
    ) -> Result<(), AppError> {
        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        self.post_repo
            .find_post(&mut *conn, ctx.tenant_id, post_id)
            .await?
            .ok_or(AppError::NotFound("Post"))?;

        // rows_affected == 0 também é sucesso.
        self.post_repo
            .delete_reaction(&mut *conn, post_id, ctx.user_id)
            .await?;

        Ok(())
    }

    pub async fn mark_read(
        &self,
        ctx: &TenantContext,
        post_id: Uuid,
    ) -> Result<crate::models::posts::ReadReceipt, AppError> {
        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        self.post_repo
            .find_post(&mut *conn, ctx.tenant_id, post_id)
            .await?
            .ok_or(AppError::NotFound("Post"))?;

        self.post_repo
            .upsert_read_receipt(&mut *conn, post_id, ctx.user_id)
            .await
    }
}
