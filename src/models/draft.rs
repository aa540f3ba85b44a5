// src/models/draft.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DraftKind {
    Anexo1,
    Anexo2,
}

/// Rascunho salvo em disco como `<id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Draft {
    pub kind: DraftKind,
    #[schema(example = "2024-02-10")]
    pub created_at: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DraftCreated {
    pub draft_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct DraftKindQuery {
    pub kind: DraftKind,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DraftAtualizado {
    pub ok: bool,
}
