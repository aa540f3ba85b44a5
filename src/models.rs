// src/models.rs

pub mod anexo1;
pub mod anexo2;
pub mod draft;
