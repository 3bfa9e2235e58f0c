// src/db/post_repo.rs

use sqlx::{Executor, Postgres, types::Json};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    models::posts::{
        Comment, Post, PostFilter, PostType, Reaction, ReactionType, ReadReceipt, Targeting,
    },
};

// Sem estado próprio: todos os métodos recebem o executor (conexão RLS ou
// transação) de quem chama.
#[derive(Clone, Default)]
pub struct PostRepository;

impl PostRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  POSTS
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create_post<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        author_user_id: Uuid,
        title: Option<&str>,
        body: &str,
        body_rich: Option<&serde_json::Value>,
        post_type: PostType,
        targeting: &Targeting,
        due_date: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<Post, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts
                (tenant_id, author_user_id, title, body, body_rich, post_type, targeting, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(author_user_id)
        .bind(title)
        .bind(body)
        .bind(body_rich.map(Json))
        .bind(post_type)
        .bind(Json(targeting))
        .bind(due_date)
        .fetch_one(executor)
        .await?;

        Ok(post)
    }

    pub async fn find_post<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        post_id: Uuid,
    ) -> Result<Option<Post>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM posts
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(post_id)
        .fetch_optional(executor)
        .await?;

        Ok(post)
    }

    pub async fn list_posts<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        filter: &PostFilter,
        page: PageParams,
    ) -> Result<Vec<Post>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM posts
            WHERE tenant_id = $1
              AND ($2::post_type IS NULL OR post_type = $2)
              AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%' OR body ILIKE '%' || $3 || '%')
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(tenant_id)
        .bind(filter.post_type)
        .bind(filter.search.as_deref())
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(executor)
        .await?;

        Ok(posts)
    }

    /// Total para o bloco de paginação (mesmos filtros da listagem).
    pub async fn count_posts<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        filter: &PostFilter,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM posts
            WHERE tenant_id = $1
              AND ($2::post_type IS NULL OR post_type = $2)
              AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%' OR body ILIKE '%' || $3 || '%')
            "#,
        )
        .bind(tenant_id)
        .bind(filter.post_type)
        .bind(filter.search.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    // =========================================================================
    //  COMMENTS
    // =========================================================================

    pub async fn create_comment<'e, E>(
        &self,
        executor: E,
        post_id: Uuid,
        parent_comment_id: Option<Uuid>,
        author_user_id: Uuid,
        body: &str,
        body_rich: Option<&serde_json::Value>,
    ) -> Result<Comment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, parent_comment_id, author_user_id, body, body_rich)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(post_id)
        .bind(parent_comment_id)
        .bind(author_user_id)
        .bind(body)
        .bind(body_rich.map(Json))
        .fetch_one(executor)
        .await?;

        Ok(comment)
    }

    pub async fn find_comment<'e, E>(
        &self,
        executor: E,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM comments WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(executor)
        .await?;

        Ok(comment)
    }

    pub async fn list_comments<'e, E>(
        &self,
        executor: E,
        post_id: Uuid,
    ) -> Result<Vec<Comment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(executor)
        .await?;

        Ok(comments)
    }

    // =========================================================================
    //  REACTIONS / READ RECEIPTS (upserts idempotentes)
    // =========================================================================

    /// No máximo uma reação por (post, usuário): um segundo `add` com tipo
    /// diferente TROCA a reação, nunca acumula. A atomicidade fica por
    /// conta do ON CONFLICT na restrição UNIQUE.
    pub async fn upsert_reaction<'e, E>(
        &self,
        executor: E,
        post_id: Uuid,
        user_id: Uuid,
        reaction_type: ReactionType,
    ) -> Result<Reaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reaction = sqlx::query_as::<_, Reaction>(
            r#"
            INSERT INTO reactions (post_id, user_id, reaction_type)
            VALUES ($1, $2, $3)
            ON CONFLICT (post_id, user_id)
            DO UPDATE SET reaction_type = EXCLUDED.reaction_type, created_at = now()
            RETURNING *
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(reaction_type)
        .fetch_one(executor)
        .await?;

        Ok(reaction)
    }

    /// Remover reação inexistente não é erro (retorna 0 linhas afetadas).
    pub async fn delete_reaction<'e, E>(
        &self,
        executor: E,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM reactions WHERE post_id = $1 AND user_id = $2
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Recibo de leitura: upsert por (post, usuário). O GREATEST garante
    /// que read_at só anda para frente no relógio de parede.
    pub async fn upsert_read_receipt<'e, E>(
        &self,
        executor: E,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<ReadReceipt, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let receipt = sqlx::query_as::<_, ReadReceipt>(
            r#"
            INSERT INTO read_receipts (post_id, user_id, read_at)
            VALUES ($1, $2, now())
            ON CONFLICT (post_id, user_id)
            DO UPDATE SET read_at = GREATEST(read_receipts.read_at, EXCLUDED.read_at)
            RETURNING *
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(receipt)
    }
}
