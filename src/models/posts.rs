// src/models/posts.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// 1. Post (A Unidade de Comunicação)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "post_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    Message,
    Announcement,
    Request,
    PerformanceUpdate,
}

impl PostType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "message" => Some(PostType::Message),
            "announcement" => Some(PostType::Announcement),
            "request" => Some(PostType::Request),
            "performance_update" => Some(PostType::PerformanceUpdate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "post_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Active,
    Archived,
}

/// O descritor de alvo de um post: a rede toda ou uma lista de unidades.
/// "locations" é grafia alternativa aceita de "specific_locations"
/// (a criação de requests usa a forma curta).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Targeting {
    Global,
    #[serde(alias = "locations")]
    SpecificLocations { location_ids: Vec<Uuid> },
}

impl Default for Targeting {
    // Ausência de targeting equivale a global.
    fn default() -> Self {
        Targeting::Global
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub author_user_id: Uuid,
    pub title: Option<String>,
    pub body: String,
    #[schema(value_type = Option<Object>)]
    pub body_rich: Option<sqlx::types::Json<Value>>,
    pub post_type: PostType,
    #[schema(value_type = Object)]
    pub targeting: sqlx::types::Json<Targeting>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filtro tipado para listagem de posts - parâmetros explícitos no lugar
/// de query-builders encadeados.
#[derive(Debug, Default, Clone)]
pub struct PostFilter {
    pub post_type: Option<PostType>,
    pub search: Option<String>,
}

// ---
// 2. Comment (um nível de encadeamento)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub author_user_id: Uuid,
    pub body: String,
    #[schema(value_type = Option<Object>)]
    pub body_rich: Option<sqlx::types::Json<Value>>,
    pub created_at: DateTime<Utc>,
}

// ---
// 3. Reaction (no máximo uma por (post, usuário))
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reaction_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReactionType {
    Like,
    Acknowledge,
    NeedsAttention,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub reaction_type: ReactionType,
    pub created_at: DateTime<Utc>,
}

// ---
// 4. ReadReceipt (idempotente; read_at só avança)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub read_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targeting_global_serializa_com_type() {
        let json = serde_json::to_value(Targeting::Global).unwrap();
        assert_eq!(json, serde_json::json!({"type": "global"}));
    }

    #[test]
    fn targeting_specific_locations_desserializa() {
        let t: Targeting = serde_json::from_value(serde_json::json!({
            "type": "specific_locations",
            "location_ids": ["550e8400-e29b-41d4-a716-446655440000"]
        }))
        .unwrap();
        match t {
            Targeting::SpecificLocations { location_ids } => assert_eq!(location_ids.len(), 1),
            other => panic!("esperava SpecificLocations, veio {:?}", other),
        }
    }

    #[test]
    fn targeting_aceita_grafia_locations() {
        // Forma curta usada na criação de requests.
        let t: Targeting = serde_json::from_value(serde_json::json!({
            "type": "locations",
            "location_ids": ["550e8400-e29b-41d4-a716-446655440000"]
        }))
        .unwrap();
        assert!(matches!(t, Targeting::SpecificLocations { .. }));
    }

    #[test]
    fn targeting_ausente_vira_global() {
        assert_eq!(Targeting::default(), Targeting::Global);
    }

    #[test]
    fn targeting_rejeita_tipo_desconhecido() {
        let result: Result<Targeting, _> =
            serde_json::from_value(serde_json::json!({"type": "everyone"}));
        assert!(result.is_err());
    }
}
