// src/models/anexo1.rs
//
// Dados lidos de um Anexo I (solicitação) já preenchido, usados para
// pré-preencher o Anexo II.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::anexo2::{TipoOrgao, ViagemRealizada};

/// Campos extraídos do texto do Anexo I, antes do mapeamento.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anexo1Extraido {
    pub nome_completo: Option<String>,
    pub cpf: Option<String>,
    pub siape: Option<String>,
    pub motivo_viagem: Option<String>,
    pub ida: TrechoExtraido,
    pub retorno: TrechoExtraido,
    pub missao_inicio: Option<String>,
    pub missao_termino: Option<String>,
    pub debito_recurso: Option<String>,
}

impl Anexo1Extraido {
    pub fn vazio(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrechoExtraido {
    pub local_origem: Option<String>,
    pub local_destino: Option<String>,
    /// "dd/mm/aaaa hh:mm", como aparece no documento.
    pub data_hora: Option<String>,
}

// --- Prefill (só leva o que foi encontrado) ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Anexo2Prefill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposto: Option<PrefillProposto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afastamento: Option<PrefillAfastamento>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atividades_desenvolvidas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viagem_realizada: Option<ViagemRealizada>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PrefillProposto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub siape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orgao: Option<PrefillOrgao>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PrefillOrgao {
    pub tipo: TipoOrgao,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detalhe: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PrefillAfastamento {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ida: Option<PrefillTrecho>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retorno: Option<PrefillTrecho>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PrefillTrecho {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destino: Option<String>,
    /// "aaaa-mm-ddThh:mm"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_hora: Option<String>,
}

/// Resposta de `/api/anexo2/prefill-from-anexo1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PrefillResponse {
    pub ok: bool,
    pub prefill: Anexo2Prefill,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}
