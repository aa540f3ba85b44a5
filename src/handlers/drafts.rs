// src/handlers/drafts.rs

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::draft::{Draft, DraftAtualizado, DraftCreated, DraftKindQuery},
};

// POST /api/drafts?kind=anexo1|anexo2
#[utoipa::path(
    post,
    path = "/api/drafts",
    tag = "Rascunhos",
    params(DraftKindQuery),
    responses((status = 200, description = "Rascunho criado", body = DraftCreated))
)]
pub async fn create_draft(
    State(app_state): State<AppState>,
    Query(query): Query<DraftKindQuery>,
) -> Result<impl IntoResponse, AppError> {
    let draft_id = app_state.drafts.create(query.kind).await?;
    Ok((StatusCode::OK, Json(DraftCreated { draft_id })))
}

// GET /api/drafts/{id}
#[utoipa::path(
    get,
    path = "/api/drafts/{id}",
    tag = "Rascunhos",
    params(("id" = Uuid, Path, description = "ID do rascunho")),
    responses(
        (status = 200, description = "Rascunho salvo", body = Draft),
        (status = 404, description = "Rascunho não encontrado")
    )
)]
pub async fn get_draft(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let draft = app_state.drafts.get(id).await?;
    Ok((StatusCode::OK, Json(draft)))
}

// PATCH /api/drafts/{id}
#[utoipa::path(
    patch,
    path = "/api/drafts/{id}",
    tag = "Rascunhos",
    params(("id" = Uuid, Path, description = "ID do rascunho")),
    request_body(content = HashMap<String, Value>, description = "Campos a mesclar em `data` (merge raso)"),
    responses(
        (status = 200, description = "Rascunho atualizado", body = DraftAtualizado),
        (status = 404, description = "Rascunho não encontrado")
    )
)]
pub async fn patch_draft(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dados): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    app_state.drafts.patch(id, dados).await?;
    Ok((StatusCode::OK, Json(DraftAtualizado { ok: true })))
}
