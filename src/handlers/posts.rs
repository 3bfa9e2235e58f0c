// src/handlers/posts.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Pagination},
        validate::{parse_iso_datetime, parse_uuid_param},
    },
    config::AppState,
    middleware::tenancy::TenantContext,
    models::posts::{Comment, Post, PostFilter, PostType, ReactionType, Targeting},
    services::post_service::NewPost,
};

// =============================================================================
//  ÁREA 1: POSTS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    pub search: Option<String>,
}

// GET /api/posts
#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "Posts",
    params(
        ("limit" = Option<i64>, Query, description = "Tamanho da página [1,100], padrão 20"),
        ("offset" = Option<i64>, Query, description = "Deslocamento >= 0"),
        ("type" = Option<String>, Query, description = "message | announcement | request | performance_update"),
        ("search" = Option<String>, Query, description = "Busca em título e corpo")
    ),
    responses(
        (status = 200, description = "Página de posts com envelope de paginação"),
        (status = 400, description = "limit/type inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_posts(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListPostsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = parse_numeric_param(query.limit.as_deref(), "limit")?;
    let offset = parse_numeric_param(query.offset.as_deref(), "offset")?;
    let page = PageParams::from_query(limit, offset)?;

    let post_type = query
        .post_type
        .as_deref()
        .map(|value| {
            PostType::parse(value).ok_or_else(|| {
                AppError::BadRequest(format!("O parâmetro 'type' não aceita o valor '{}'.", value))
            })
        })
        .transpose()?;

    let filter = PostFilter {
        post_type,
        search: query.search.clone(),
    };

    let (posts, total) = app_state.post_service.list_posts(&ctx, &filter, page).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "data": posts,
            "pagination": Pagination::new(total, page),
        })),
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostPayload {
    #[validate(length(max = 500, message = "O título deve ter no máximo 500 caracteres."))]
    #[schema(example = "Campanha de inverno")]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "O corpo do post é obrigatório."))]
    pub body: String,

    #[schema(value_type = Option<Object>)]
    pub body_rich: Option<Value>,

    pub post_type: PostType,

    /// Ausente equivale a {"type": "global"}.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub targeting: Option<Targeting>,

    #[schema(example = "2025-07-01T18:00:00")]
    pub due_date: Option<String>,
}

// POST /api/posts
#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "Posts",
    request_body = CreatePostPayload,
    responses(
        (status = 201, description = "Post criado", body = Post),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Targeting de locations negado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_post(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    WithRejection(Json(payload), _): WithRejection<Json<CreatePostPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let due_date = payload
        .due_date
        .as_deref()
        .map(|value| parse_iso_datetime(value, "due_date"))
        .transpose()?;

    let post = app_state
        .post_service
        .create_post(
            &ctx,
            NewPost {
                title: payload.title.as_deref(),
                body: &payload.body,
                body_rich: payload.body_rich.as_ref(),
                post_type: payload.post_type,
                targeting: payload.targeting.unwrap_or_default(),
                due_date,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

// GET /api/posts/{postId}
#[utoipa::path(
    get,
    path = "/api/posts/{postId}",
    tag = "Posts",
    params(("postId" = String, Path, description = "UUID do post")),
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 400, description = "UUID malformado"),
        (status = 404, description = "Post inexistente ou de outro tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_post(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_uuid_param(&post_id, "postId")?;
    let post = app_state.post_service.get_post(&ctx, post_id).await?;
    Ok((StatusCode::OK, Json(post)))
}

// =============================================================================
//  ÁREA 2: COMENTÁRIOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentPayload {
    #[validate(length(min = 1, message = "O corpo do comentário é obrigatório."))]
    pub body: String,

    #[schema(value_type = Option<Object>)]
    pub body_rich: Option<Value>,

    /// Um nível de thread: precisa referenciar um comentário do MESMO post.
    pub parent_comment_id: Option<String>,
}

// POST /api/posts/{postId}/comments
#[utoipa::path(
    post,
    path = "/api/posts/{postId}/comments",
    tag = "Posts",
    params(("postId" = String, Path, description = "UUID do post")),
    request_body = CreateCommentPayload,
    responses(
        (status = 201, description = "Comentário criado", body = Comment),
        (status = 400, description = "Dados inválidos ou pai de outro post"),
        (status = 404, description = "Post não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_comment(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    Path(post_id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateCommentPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_uuid_param(&post_id, "postId")?;
    payload.validate()?;

    let parent_comment_id = payload
        .parent_comment_id
        .as_deref()
        .map(|value| parse_uuid_param(value, "parent_comment_id"))
        .transpose()?;

    let comment = app_state
        .post_service
        .add_comment(
            &ctx,
            post_id,
            parent_comment_id,
            &payload.body,
            payload.body_rich.as_ref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

// GET /api/posts/{postId}/comments
#[utoipa::path(
    get,
    path = "/api/posts/{postId}/comments",
    tag = "Posts",
    params(("postId" = String, Path, description = "UUID do post")),
    responses(
        (status = 200, description = "Comentários do post"),
        (status = 404, description = "Post não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_comments(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_uuid_param(&post_id, "postId")?;
    let comments = app_state.post_service.list_comments(&ctx, post_id).await?;
    Ok((StatusCode::OK, Json(json!({ "data": comments }))))
}

// =============================================================================
//  ÁREA 3: REAÇÕES E RECIBOS DE LEITURA
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReactionPayload {
    /// like | acknowledge | needs_attention (obrigatório no add)
    #[serde(rename = "type")]
    pub reaction_type: Option<ReactionType>,
    /// add | remove
    pub action: String,
}

// POST /api/posts/{postId}/reactions
#[utoipa::path(
    post,
    path = "/api/posts/{postId}/reactions",
    tag = "Posts",
    params(("postId" = String, Path, description = "UUID do post")),
    request_body = ReactionPayload,
    responses(
        (status = 200, description = "Reação aplicada/removida (remover é idempotente)"),
        (status = 400, description = "type/action inválidos"),
        (status = 404, description = "Post não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn react(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    Path(post_id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<ReactionPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_uuid_param(&post_id, "postId")?;

    match payload.action.as_str() {
        "add" => {
            let reaction_type = payload.reaction_type.ok_or_else(|| {
                AppError::BadRequest("O campo 'type' é obrigatório para action=add.".to_string())
            })?;
            let reaction = app_state
                .post_service
                .add_reaction(&ctx, post_id, reaction_type)
                .await?;
            Ok((StatusCode::OK, Json(json!({ "data": reaction }))))
        }
        "remove" => {
            app_state.post_service.remove_reaction(&ctx, post_id).await?;
            Ok((StatusCode::OK, Json(json!({ "data": null }))))
        }
        other => Err(AppError::BadRequest(format!(
            "O campo 'action' não aceita o valor '{}' (use add ou remove).",
            other
        ))),
    }
}

// POST /api/posts/{postId}/read
#[utoipa::path(
    post,
    path = "/api/posts/{postId}/read",
    tag = "Posts",
    params(("postId" = String, Path, description = "UUID do post")),
    responses(
        (status = 200, description = "Recibo de leitura registrado (upsert idempotente)"),
        (status = 404, description = "Post não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    ctx: TenantContext,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_uuid_param(&post_id, "postId")?;
    let receipt = app_state.post_service.mark_read(&ctx, post_id).await?;
    Ok((StatusCode::OK, Json(json!({ "data": receipt }))))
}

/// Parâmetros numéricos de query chegam como texto; número inválido é 400
/// nomeando o parâmetro, não um erro de desserialização genérico.
fn parse_numeric_param(value: Option<&str>, name: &str) -> Result<Option<i64>, AppError> {
    value
        .map(|raw| {
            raw.parse::<i64>().map_err(|_| {
                AppError::BadRequest(format!("O parâmetro '{}' deve ser um inteiro.", name))
            })
        })
        .transpose()
}
