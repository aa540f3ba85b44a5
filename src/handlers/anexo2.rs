// src/handlers/anexo2.rs

use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        anexo1::PrefillResponse,
        anexo2::{Anexo2Payload, DataServidor, FormatoDocumento, PreviewAnexo2},
    },
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct FormatoQuery {
    /// `docx` (padrão) ou `pdf`
    #[serde(default)]
    pub format: FormatoDocumento,
}

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Sistema",
    responses((status = 200, description = "Servidor no ar", body = String))
)]
pub async fn health() -> &'static str {
    "OK"
}

// GET /api/server-date
#[utoipa::path(
    get,
    path = "/api/server-date",
    tag = "Sistema",
    responses((status = 200, description = "Data de hoje no servidor (ISO)", body = DataServidor))
)]
pub async fn server_date() -> impl IntoResponse {
    let hoje = chrono::Local::now().date_naive();
    Json(DataServidor { date: hoje.format("%Y-%m-%d").to_string() })
}

// POST /api/anexo2/preview
#[utoipa::path(
    post,
    path = "/api/anexo2/preview",
    tag = "Anexo II",
    request_body = Anexo2Payload,
    responses(
        (status = 200, description = "Pendências, flags e placeholders do relatório", body = PreviewAnexo2)
    )
)]
pub async fn preview(
    State(app_state): State<AppState>,
    Json(payload): Json<Anexo2Payload>,
) -> Result<impl IntoResponse, AppError> {
    let preview = app_state.anexo2_service.preview(payload);
    Ok((StatusCode::OK, Json(preview)))
}

// POST /api/anexo2/generate?format=docx|pdf
#[utoipa::path(
    post,
    path = "/api/anexo2/generate",
    tag = "Anexo II",
    request_body = Anexo2Payload,
    params(FormatoQuery),
    responses(
        (status = 200, description = "Documento preenchido", content_type = "application/octet-stream"),
        (status = 422, description = "Relatório com pendências (preview em `detail`)"),
        (status = 500, description = "Falha ao gerar o documento")
    )
)]
pub async fn generate(
    State(app_state): State<AppState>,
    Query(query): Query<FormatoQuery>,
    Json(payload): Json<Anexo2Payload>,
) -> Result<Response, AppError> {
    let formato = query.format;
    let bytes = app_state.anexo2_service.gerar(payload, formato).await?;

    let headers = [
        (header::CONTENT_TYPE, formato.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", formato.nome_arquivo()),
        ),
    ];
    Ok((headers, bytes).into_response())
}

// POST /api/anexo2/prefill-from-anexo1 (multipart, campo "file")
#[utoipa::path(
    post,
    path = "/api/anexo2/prefill-from-anexo1",
    tag = "Anexo II",
    request_body(content_type = "multipart/form-data", description = "Campo `file` com o Anexo I (.pdf, .docx ou .doc)"),
    responses(
        (status = 200, description = "Dados sugeridos para o Anexo II", body = PrefillResponse),
        (status = 400, description = "Arquivo ausente, vazio ou de tipo não suportado")
    )
)]
pub async fn prefill_from_anexo1(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut arquivo = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ArquivoInvalido(format!("Upload inválido: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let nome = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::ArquivoInvalido(format!("Upload inválido: {e}")))?;
        arquivo = Some((nome, bytes.to_vec()));
        break;
    }

    let Some((nome, bytes)) = arquivo else {
        return Err(AppError::ArquivoInvalido(
            "Envie o Anexo I no campo 'file'.".to_string(),
        ));
    };

    let resposta = app_state.anexo1_import.importar(nome, bytes).await?;
    Ok((StatusCode::OK, Json(resposta)))
}
