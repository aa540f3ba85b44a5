// src/wizard.rs
//
// Lado do assistente: estado do formulário, validação por passo, chat e o
// cliente que conversa com a API.

pub mod atividades;
pub mod campos;
pub mod chat;
pub mod client;
pub mod formulario;
pub mod gerador;
pub mod passos;
pub mod resumo;
