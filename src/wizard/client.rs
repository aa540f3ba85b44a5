// src/wizard/client.rs
//
// Cliente da API do Anexo II usado pelo assistente.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use thiserror::Error;

use crate::models::{
    anexo1::PrefillResponse,
    anexo2::{Anexo2Payload, DataServidor, FormatoDocumento, PreviewAnexo2},
};

#[derive(Debug, Error)]
pub enum ClienteError {
    #[error("Falha de comunicação com o servidor: {0}")]
    Transporte(#[from] reqwest::Error),

    #[error("{mensagem}")]
    Resposta { status: u16, mensagem: String },

    /// 422 do `/generate`: o servidor devolveu o preview com as pendências.
    #[error("Relatório com pendências")]
    Pendencias(Box<PreviewAnexo2>),
}

#[async_trait]
pub trait Anexo2Api: Send + Sync {
    async fn preview(&self, payload: &Anexo2Payload) -> Result<PreviewAnexo2, ClienteError>;

    async fn gerar(
        &self,
        payload: &Anexo2Payload,
        formato: FormatoDocumento,
    ) -> Result<Vec<u8>, ClienteError>;

    async fn prefill(&self, nome_arquivo: &str, bytes: Vec<u8>) -> Result<PrefillResponse, ClienteError>;

    /// Data do servidor em ISO.
    async fn data_servidor(&self) -> Result<String, ClienteError>;
}

pub struct HttpAnexo2Api {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAnexo2Api {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, caminho: &str) -> String {
        format!("{}{}", self.base_url, caminho)
    }
}

/// Mensagem do `detail` quando é texto; senão um texto genérico com o status.
fn mensagem_de_erro(status: u16, corpo: &str) -> String {
    serde_json::from_str::<Value>(corpo)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("Erro {status} ao falar com o servidor."))
}

async fn erro_da_resposta(resp: reqwest::Response) -> ClienteError {
    let status = resp.status().as_u16();
    let corpo = resp.text().await.unwrap_or_default();
    ClienteError::Resposta { status, mensagem: mensagem_de_erro(status, &corpo) }
}

#[async_trait]
impl Anexo2Api for HttpAnexo2Api {
    async fn preview(&self, payload: &Anexo2Payload) -> Result<PreviewAnexo2, ClienteError> {
        let resp = self
            .client
            .post(self.url("/api/anexo2/preview"))
            .json(payload)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(erro_da_resposta(resp).await);
        }
        Ok(resp.json().await?)
    }

    async fn gerar(
        &self,
        payload: &Anexo2Payload,
        formato: FormatoDocumento,
    ) -> Result<Vec<u8>, ClienteError> {
        let resp = self
            .client
            .post(self.url("/api/anexo2/generate"))
            .query(&[("format", formato.extensao())])
            .json(payload)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            let corpo: Value = resp.json().await?;
            return match corpo.get("detail").cloned().map(serde_json::from_value::<PreviewAnexo2>) {
                Some(Ok(preview)) => Err(ClienteError::Pendencias(Box::new(preview))),
                _ => Err(ClienteError::Resposta {
                    status: 422,
                    mensagem: "Revise os campos.".to_string(),
                }),
            };
        }
        if !resp.status().is_success() {
            return Err(erro_da_resposta(resp).await);
        }
        Ok(resp.bytes().await?.to_vec())
    }

    async fn prefill(&self, nome_arquivo: &str, bytes: Vec<u8>) -> Result<PrefillResponse, ClienteError> {
        let part = Part::bytes(bytes).file_name(nome_arquivo.to_string());
        let form = Form::new().part("file", part);
        let resp = self
            .client
            .post(self.url("/api/anexo2/prefill-from-anexo1"))
            .multipart(form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(erro_da_resposta(resp).await);
        }
        Ok(resp.json().await?)
    }

    async fn data_servidor(&self) -> Result<String, ClienteError> {
        let resp = self.client.get(self.url("/api/server-date")).send().await?;
        if !resp.status().is_success() {
            return Err(erro_da_resposta(resp).await);
        }
        let data: DataServidor = resp.json().await?;
        Ok(data.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn le_detail_textual() {
        assert_eq!(
            mensagem_de_erro(400, r#"{"detail": "Arquivo vazio. Verifique se o Anexo I foi exportado corretamente."}"#),
            "Arquivo vazio. Verifique se o Anexo I foi exportado corretamente."
        );
        assert_eq!(mensagem_de_erro(502, "<html>bad gateway</html>"), "Erro 502 ao falar com o servidor.");
        assert_eq!(mensagem_de_erro(422, r#"{"detail": {"ok": false}}"#), "Erro 422 ao falar com o servidor.");
    }

    #[test]
    fn base_sem_barra_final() {
        let api = HttpAnexo2Api::new("http://localhost:3000/");
        assert_eq!(api.url("/api/health"), "http://localhost:3000/api/health");
    }
}
