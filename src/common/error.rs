// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::{
    models::anexo2::{ErroCampo, PreviewAnexo2},
    wizard::chat::ErroChat,
};

// Erros do backend. As mensagens voltam em `detail`, que é o que o assistente lê.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] ValidationErrors),

    // Payload com erros de negócio (ex.: retorno antes da ida) em /generate
    #[error("Relatório com pendências")]
    RelatorioInvalido(Box<PreviewAnexo2>),

    // Problemas com o arquivo do Anexo I enviado pelo usuário
    #[error("{0}")]
    ArquivoInvalido(String),

    #[error("Passo inválido: {0}")]
    PassoInvalido(u8),

    // Nomes de campo que o formulário não conhece (ou trecho além do limite)
    #[error("Campos inválidos: {}", .0.join(", "))]
    CamposInvalidos(Vec<String>),

    #[error("Rascunho não encontrado")]
    RascunhoNaoEncontrado,

    #[error("Sessão do assistente não encontrada")]
    SessaoNaoEncontrada,

    #[error(transparent)]
    Chat(#[from] ErroChat),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::ValidationError(errors) => {
                let body = Json(json!({
                    "detail": {
                        "ok": false,
                        "errors": erros_de_validacao(&errors),
                    }
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::RelatorioInvalido(preview) => {
                let body = Json(json!({ "detail": preview }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::ArquivoInvalido(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::CamposInvalidos(ref nomes) => (
                StatusCode::BAD_REQUEST,
                format!("Campos desconhecidos ou fora do limite: {}.", nomes.join(", ")),
            ),
            AppError::PassoInvalido(_) => (
                StatusCode::BAD_REQUEST,
                "Passo inválido: use um valor entre 1 e 7.".to_string(),
            ),
            AppError::RascunhoNaoEncontrado => {
                (StatusCode::NOT_FOUND, "Rascunho não encontrado.".to_string())
            }
            AppError::SessaoNaoEncontrada => (
                StatusCode::NOT_FOUND,
                "Sessão do assistente não encontrada. Inicie uma nova conversa.".to_string(),
            ),
            AppError::Chat(ErroChat::Encerrada) => {
                (StatusCode::CONFLICT, ErroChat::Encerrada.to_string())
            }

            // Todo o resto vira 500; o detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "detail": detail }));
        (status, body).into_response()
    }
}

/// Achata os erros do `validator` em `[{field, message}]`, com o caminho
/// completo do campo (`proposto.cpf`). Ordenado pelo nome do campo.
pub fn erros_de_validacao(errors: &ValidationErrors) -> Vec<ErroCampo> {
    let mut saida = Vec::new();
    achatar("", errors, &mut saida);
    saida.sort_by(|a, b| a.field.cmp(&b.field));
    saida
}

fn achatar(prefixo: &str, errors: &ValidationErrors, saida: &mut Vec<ErroCampo>) {
    for (campo, tipo) in errors.errors() {
        let caminho = if prefixo.is_empty() {
            campo.to_string()
        } else {
            format!("{prefixo}.{campo}")
        };
        match tipo {
            ValidationErrorsKind::Field(lista) => {
                for e in lista {
                    let mensagem = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Campo inválido ({}).", e.code));
                    saida.push(ErroCampo::new(caminho.clone(), mensagem));
                }
            }
            ValidationErrorsKind::Struct(aninhado) => achatar(&caminho, aninhado, saida),
            ValidationErrorsKind::List(itens) => {
                for (indice, aninhado) in itens {
                    achatar(&format!("{caminho}.{indice}"), aninhado, saida);
                }
            }
        }
    }
}
