// src/config.rs

use std::{collections::HashMap, env, path::PathBuf, sync::Arc, time::Instant};

use anyhow::Context;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    db::DraftRepository,
    services::{
        anexo1_import::Anexo1ImportService, anexo2_service::Anexo2Service,
        document_service::DocumentService, prazo::PRAZO_RELATORIO_DIAS,
    },
    wizard::chat::SessaoChat,
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub fonts_dir: PathBuf,
    pub font_family: String,
    pub prazo_dias: u32,
    pub soffice_bin: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|chave| env::var(chave).ok())
    }

    fn from_lookup(ler: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let ou = |chave: &str, padrao: &str| {
            ler(chave)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| padrao.to_string())
        };

        let prazo_dias = match ler("PRAZO_RELATORIO_DIAS").filter(|v| !v.trim().is_empty()) {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .with_context(|| format!("PRAZO_RELATORIO_DIAS inválido: '{v}'"))?,
            None => PRAZO_RELATORIO_DIAS,
        };

        Ok(Self {
            bind_addr: ou("BIND_ADDR", "0.0.0.0:3000"),
            data_dir: PathBuf::from(ou("DATA_DIR", "./data")),
            fonts_dir: PathBuf::from(ou("FONTS_DIR", "./fonts")),
            font_family: ou("FONT_FAMILY", "Roboto"),
            prazo_dias,
            soffice_bin: ou("SOFFICE_BIN", "soffice"),
        })
    }
}

/// Conversa em andamento e quando começou.
pub struct SessaoAtiva {
    pub criada_em: Instant,
    pub sessao: SessaoChat,
}

pub type SessoesChat = Arc<Mutex<HashMap<Uuid, SessaoAtiva>>>;

#[derive(Clone)]
pub struct AppState {
    pub anexo2_service: Anexo2Service,
    pub anexo1_import: Anexo1ImportService,
    pub drafts: DraftRepository,
    /// Conversas do assistente em andamento (só em memória).
    pub chat_sessions: SessoesChat,
    pub prazo_dias: u32,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&config.data_dir)
            .await
            .with_context(|| format!("Não foi possível criar DATA_DIR em {}", config.data_dir.display()))?;
        tracing::info!("✅ Rascunhos em {}", config.data_dir.display());

        if !config.fonts_dir.is_dir() {
            // O servidor sobe; só a geração em PDF falha
            tracing::warn!(
                "⚠️ FONTS_DIR {} não existe; PDFs não poderão ser gerados",
                config.fonts_dir.display()
            );
        }

        // --- Monta o gráfico de dependências ---
        let documentos = DocumentService::new(config.fonts_dir.clone(), config.font_family.clone());
        let anexo2_service = Anexo2Service::new(documentos, config.prazo_dias);
        let anexo1_import = Anexo1ImportService::new(config.soffice_bin.clone());
        let drafts = DraftRepository::new(config.data_dir.clone());

        Ok(Self {
            anexo2_service,
            anexo1_import,
            drafts,
            chat_sessions: Arc::new(Mutex::new(HashMap::new())),
            prazo_dias: config.prazo_dias,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ambiente(pares: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let mapa: HashMap<String, String> =
            pares.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |chave| mapa.get(chave).cloned()
    }

    #[test]
    fn valores_padrao() {
        let config = Config::from_lookup(ambiente(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.font_family, "Roboto");
        assert_eq!(config.prazo_dias, 5);
        assert_eq!(config.soffice_bin, "soffice");
    }

    #[test]
    fn le_variaveis_e_acusa_numero_invalido() {
        let config = Config::from_lookup(ambiente(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("PRAZO_RELATORIO_DIAS", " 10 "),
            ("FONT_FAMILY", ""),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.prazo_dias, 10);
        assert_eq!(config.font_family, "Roboto");

        let err = Config::from_lookup(ambiente(&[("PRAZO_RELATORIO_DIAS", "cinco")])).unwrap_err();
        assert!(err.to_string().contains("PRAZO_RELATORIO_DIAS"));
    }

    #[tokio::test]
    async fn estado_cria_o_diretorio_de_dados() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().join("dados"),
            ..Config::from_lookup(ambiente(&[])).unwrap()
        };
        let state = AppState::new(&config).await.unwrap();
        assert!(config.data_dir.is_dir());
        assert_eq!(state.prazo_dias, 5);
        assert!(state.chat_sessions.lock().await.is_empty());
    }
}
