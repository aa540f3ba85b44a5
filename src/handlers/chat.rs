// src/handlers/chat.rs

use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::{AppState, SessaoAtiva},
    wizard::chat::{SessaoChat, Turno},
};

/// Conversas abandonadas há mais tempo que isso são descartadas.
const VALIDADE_SESSAO: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct IniciarChatRequest {
    /// Data sugerida para o relatório (dd/mm/aaaa). Sem ela, usa a data do servidor.
    #[schema(example = "10/02/2024")]
    pub data_relatorio: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RespostaChatRequest {
    #[schema(example = "Maria da Silva")]
    pub resposta: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TurnoChatResponse {
    pub sessao_id: Uuid,
    #[serde(flatten)]
    pub turno: Turno,
}

// POST /api/anexo2/chat
#[utoipa::path(
    post,
    path = "/api/anexo2/chat",
    tag = "Assistente",
    request_body = IniciarChatRequest,
    responses((status = 201, description = "Conversa iniciada com a primeira pergunta", body = TurnoChatResponse))
)]
pub async fn iniciar_chat(
    State(app_state): State<AppState>,
    body: Option<Json<IniciarChatRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body.unwrap_or_default();
    let preset = req
        .data_relatorio
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| chrono::Local::now().date_naive().format("%d/%m/%Y").to_string());

    let mut sessao = SessaoChat::new(Some(preset), app_state.prazo_dias);
    let turno = sessao.iniciar()?;

    let sessao_id = Uuid::new_v4();
    let mut sessoes = app_state.chat_sessions.lock().await;
    let antes = sessoes.len();
    sessoes.retain(|_, s| s.criada_em.elapsed() < VALIDADE_SESSAO);
    if sessoes.len() < antes {
        tracing::debug!("Descartadas {} conversa(s) expirada(s)", antes - sessoes.len());
    }
    sessoes.insert(sessao_id, SessaoAtiva { criada_em: Instant::now(), sessao });
    drop(sessoes);
    tracing::info!("💬 Conversa {} iniciada", sessao_id);

    Ok((StatusCode::CREATED, Json(TurnoChatResponse { sessao_id, turno })))
}

// POST /api/anexo2/chat/{id}
#[utoipa::path(
    post,
    path = "/api/anexo2/chat/{id}",
    tag = "Assistente",
    params(("id" = Uuid, Path, description = "ID da conversa")),
    request_body = RespostaChatRequest,
    responses(
        (status = 200, description = "Próxima pergunta, ou o payload ao concluir", body = TurnoChatResponse),
        (status = 404, description = "Conversa não encontrada, expirada ou já concluída"),
        (status = 409, description = "Conversa já concluída")
    )
)]
pub async fn responder_chat(
    State(app_state): State<AppState>,
    Path(sessao_id): Path<Uuid>,
    Json(req): Json<RespostaChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut sessoes = app_state.chat_sessions.lock().await;
    let ativa = sessoes.get_mut(&sessao_id).ok_or(AppError::SessaoNaoEncontrada)?;
    let turno = ativa.sessao.responder(&req.resposta)?;
    // Concluída: o payload vai neste turno e a sessão sai do mapa.
    if turno.concluido {
        sessoes.remove(&sessao_id);
        tracing::info!("✅ Conversa {} concluída", sessao_id);
    }
    Ok((StatusCode::OK, Json(TurnoChatResponse { sessao_id, turno })))
}

// DELETE /api/anexo2/chat/{id}
#[utoipa::path(
    delete,
    path = "/api/anexo2/chat/{id}",
    tag = "Assistente",
    params(("id" = Uuid, Path, description = "ID da conversa")),
    responses(
        (status = 204, description = "Conversa descartada"),
        (status = 404, description = "Conversa não encontrada")
    )
)]
pub async fn encerrar_chat(
    State(app_state): State<AppState>,
    Path(sessao_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .chat_sessions
        .lock()
        .await
        .remove(&sessao_id)
        .ok_or(AppError::SessaoNaoEncontrada)?;
    Ok(StatusCode::NO_CONTENT)
}
