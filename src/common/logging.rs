// src/common/logging.rs

use tracing_subscriber::EnvFilter;

fn filtro(padrao: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(padrao))
}

/// Inicializa o logger. `RUST_LOG` tem prioridade; sem ele usamos `info`.
pub fn init() {
    // `try_init` porque os testes podem chamar mais de uma vez
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filtro("info"))
        .with_target(false)
        .compact()
        .try_init();
}

/// Logger da CLI: só avisos, e no stderr para não misturar com a conversa.
pub fn init_cli() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filtro("warn"))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
