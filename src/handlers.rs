// src/handlers.rs

pub mod anexo2;
pub mod chat;
pub mod drafts;
pub mod formulario;
