// src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;

use relatorio_viagem::{
    common::logging,
    config::{AppState, Config},
    routes,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // Sem configuração válida a aplicação não sobe.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config)
        .await
        .context("Falha ao inicializar o estado da aplicação.")?;

    let app = routes::app(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}
