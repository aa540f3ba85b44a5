// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::wizard;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Relatório de Viagem (ANEXO II)",
        description = "Preview, geração e pré-preenchimento do Relatório de Viagem"
    ),
    paths(
        // --- Sistema ---
        handlers::anexo2::health,
        handlers::anexo2::server_date,

        // --- Anexo II ---
        handlers::anexo2::preview,
        handlers::anexo2::generate,
        handlers::anexo2::prefill_from_anexo1,

        // --- Rascunhos ---
        handlers::drafts::create_draft,
        handlers::drafts::get_draft,
        handlers::drafts::patch_draft,

        // --- Assistente ---
        handlers::chat::iniciar_chat,
        handlers::chat::responder_chat,
        handlers::chat::encerrar_chat,
        handlers::formulario::validar_passo,
    ),
    components(
        schemas(
            // Anexo II
            models::anexo2::Anexo2Payload,
            models::anexo2::Proposto,
            models::anexo2::Orgao,
            models::anexo2::TipoOrgao,
            models::anexo2::Afastamento,
            models::anexo2::Trecho,
            models::anexo2::Flags,
            models::anexo2::ViagemRealizada,
            models::anexo2::ErroCampo,
            models::anexo2::LinhaTrecho,
            models::anexo2::LinhasTrechos,
            models::anexo2::PreviewAnexo2,
            models::anexo2::FormatoDocumento,
            models::anexo2::DataServidor,

            // Anexo I
            models::anexo1::Anexo2Prefill,
            models::anexo1::PrefillProposto,
            models::anexo1::PrefillOrgao,
            models::anexo1::PrefillAfastamento,
            models::anexo1::PrefillTrecho,
            models::anexo1::PrefillResponse,

            // Rascunhos
            models::draft::DraftKind,
            models::draft::Draft,
            models::draft::DraftCreated,
            models::draft::DraftAtualizado,

            // Assistente
            handlers::chat::IniciarChatRequest,
            handlers::chat::RespostaChatRequest,
            handlers::chat::TurnoChatResponse,
            wizard::chat::Turno,
            wizard::chat::Pergunta,
            wizard::chat::OpcaoRapida,
            wizard::chat::TipoEntrada,
            wizard::chat::EstadoChat,
            wizard::passos::ResultadoPasso,
        )
    ),
    tags(
        (name = "Sistema", description = "Saúde e data do servidor"),
        (name = "Anexo II", description = "Preview, geração do documento e importação do Anexo I"),
        (name = "Rascunhos", description = "Rascunhos salvos em disco"),
        (name = "Assistente", description = "Conversa guiada e validação por passo do formulário"),
    )
)]
pub struct ApiDoc;
