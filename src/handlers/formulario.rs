// src/handlers/formulario.rs

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    wizard::{
        formulario::FormularioAnexo2,
        passos::{self, ResultadoPasso, TOTAL_PASSOS},
    },
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PassoQuery {
    /// Passo do assistente (1 a 7)
    pub step: u8,
}

// POST /api/anexo2/form/validate?step=N
#[utoipa::path(
    post,
    path = "/api/anexo2/form/validate",
    tag = "Assistente",
    params(PassoQuery),
    request_body(
        content = BTreeMap<String, String>,
        description = "Campos do formulário em notação de caminho (ex.: `proposto.nome`, `afastamento.ida.0.data_hora`)"
    ),
    responses(
        (status = 200, description = "Resultado da validação do passo", body = ResultadoPasso),
        (status = 400, description = "Passo fora do intervalo ou campo desconhecido")
    )
)]
pub async fn validar_passo(
    State(app_state): State<AppState>,
    Query(query): Query<PassoQuery>,
    Json(campos): Json<BTreeMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    if !(1..=TOTAL_PASSOS).contains(&query.step) {
        return Err(AppError::PassoInvalido(query.step));
    }

    let mut form = FormularioAnexo2::try_from_campos(&campos, app_state.prazo_dias)
        .map_err(AppError::CamposInvalidos)?;
    form.refresh_flags();
    let resultado = passos::validar_passo(&form, query.step);
    Ok((StatusCode::OK, Json(resultado)))
}
