// src/services.rs

pub mod anexo1_import;
pub mod anexo2_service;
pub mod cpf;
pub mod document_service;
pub mod placeholders;
pub mod prazo;
pub mod texto_documento;
