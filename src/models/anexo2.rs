// src/models/anexo2.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::datas;
use crate::services::cpf;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TipoOrgao {
    Cchsa,
    Cavn,
    Projetos,
    Outros,
}

impl TipoOrgao {
    pub const TODOS: [TipoOrgao; 4] = [Self::Cchsa, Self::Cavn, Self::Projetos, Self::Outros];

    /// Projetos/Outros exigem o nome do projeto ou da unidade.
    pub fn exige_detalhe(&self) -> bool {
        matches!(self, Self::Projetos | Self::Outros)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cchsa => "cchsa",
            Self::Cavn => "cavn",
            Self::Projetos => "projetos",
            Self::Outros => "outros",
        }
    }

    pub fn rotulo(&self) -> &'static str {
        match self {
            Self::Cchsa => "CCHSA",
            Self::Cavn => "CAVN",
            Self::Projetos => "Projetos",
            Self::Outros => "Outros",
        }
    }

    pub fn from_valor(valor: &str) -> Option<Self> {
        Self::TODOS.into_iter().find(|t| t.as_str() == valor.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViagemRealizada {
    Sim,
    Nao,
}

impl ViagemRealizada {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sim => "sim",
            Self::Nao => "nao",
        }
    }

    pub fn from_valor(valor: &str) -> Option<Self> {
        match valor.trim() {
            "sim" => Some(Self::Sim),
            "nao" => Some(Self::Nao),
            _ => None,
        }
    }
}

// --- Payload ---

/// Corpo enviado para `/api/anexo2/preview` e `/api/anexo2/generate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Anexo2Payload {
    #[serde(default, deserialize_with = "nulo_como_vazio")]
    #[validate(custom(function = "validar_data_relatorio"))]
    #[schema(example = "2024-02-10")]
    pub data_relatorio: String,

    #[serde(default)]
    #[validate(nested)]
    pub proposto: Proposto,

    #[serde(default)]
    pub afastamento: Afastamento,

    #[serde(default, deserialize_with = "nulo_como_vazio")]
    #[validate(custom(function = "validar_atividades"))]
    pub atividades_desenvolvidas: String,

    #[serde(default)]
    #[validate(required(message = "Informe se a viagem foi realizada."))]
    pub viagem_realizada: Option<ViagemRealizada>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justificativa_prestacao_contas_fora_prazo: Option<String>,

    #[serde(default)]
    pub flags: Flags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Proposto {
    #[serde(default, deserialize_with = "nulo_como_vazio")]
    #[validate(length(min = 3, max = 120, message = "Informe o nome completo (mín. 3 caracteres)."))]
    #[schema(example = "Maria da Silva")]
    pub nome: String,

    #[serde(default, deserialize_with = "nulo_como_vazio")]
    #[validate(custom(function = "validar_cpf"))]
    #[schema(example = "52998224725")]
    pub cpf: String,

    #[serde(default, deserialize_with = "nulo_como_vazio")]
    #[validate(custom(function = "validar_siape"))]
    #[schema(example = "1234567")]
    pub siape: String,

    #[serde(default)]
    pub orgao: Orgao,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Orgao {
    #[serde(default)]
    pub tipo: Option<TipoOrgao>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detalhe: Option<String>,
}

impl Orgao {
    /// Detalhe aparado; vazio quando ausente.
    pub fn detalhe_limpo(&self) -> &str {
        self.detalhe.as_deref().map(str::trim).unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Afastamento {
    /// Aceita um objeto único ou uma lista de trechos.
    #[serde(default, deserialize_with = "um_ou_varios")]
    pub ida: Vec<Trecho>,
    #[serde(default, deserialize_with = "um_ou_varios")]
    pub retorno: Vec<Trecho>,
}

impl Afastamento {
    /// Primeiro trecho de ida com data/hora preenchida.
    pub fn primeira_ida(&self) -> Option<&str> {
        self.ida
            .iter()
            .map(|t| t.data_hora.as_str())
            .find(|d| !d.is_empty())
    }

    /// Último trecho de retorno com data/hora preenchida.
    pub fn ultimo_retorno(&self) -> Option<&str> {
        self.retorno
            .iter()
            .rev()
            .map(|t| t.data_hora.as_str())
            .find(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Trecho {
    #[serde(default, deserialize_with = "nulo_como_vazio")]
    #[schema(example = "João Pessoa/PB")]
    pub origem: String,
    #[serde(default, deserialize_with = "nulo_como_vazio")]
    #[schema(example = "Recife/PE")]
    pub destino: String,
    #[serde(default, deserialize_with = "nulo_como_vazio")]
    #[schema(example = "2024-02-01T08:00:00")]
    pub data_hora: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Flags {
    #[serde(default)]
    pub prestacao_contas_fora_prazo: bool,
}

// --- Respostas ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErroCampo {
    #[schema(example = "afastamento")]
    pub field: String,
    #[schema(example = "A data/hora de retorno não pode ser anterior à ida.")]
    pub message: String,
}

impl ErroCampo {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LinhaTrecho {
    pub origem: String,
    pub destino: String,
    pub data_hora: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LinhasTrechos {
    pub ida: Vec<LinhaTrecho>,
    pub retorno: Vec<LinhaTrecho>,
}

/// Resposta do preview. Também é o `detail` do 422 em `/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PreviewAnexo2 {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErroCampo>,
    #[serde(default)]
    pub flags: Flags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholders: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<LinhasTrechos>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormatoDocumento {
    Pdf,
    Docx,
}

impl Default for FormatoDocumento {
    fn default() -> Self {
        Self::Docx
    }
}

impl FormatoDocumento {
    pub fn extensao(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        }
    }

    pub fn nome_arquivo(&self) -> String {
        format!("anexo2_preenchido.{}", self.extensao())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DataServidor {
    #[schema(example = "2024-02-10")]
    pub date: String,
}

// ---
// Validações customizadas
// ---

fn validar_data_relatorio(valor: &str) -> Result<(), ValidationError> {
    if valor.trim().is_empty() {
        return Err(erro("required", "Informe a data do relatório."));
    }
    if datas::parse_data(valor).is_none() {
        return Err(erro("date", "Data do relatório inválida."));
    }
    Ok(())
}

fn validar_atividades(valor: &str) -> Result<(), ValidationError> {
    if valor.trim().chars().count() < 10 {
        return Err(erro(
            "length",
            "Atividades desenvolvidas muito curto. Descreva de forma objetiva.",
        ));
    }
    Ok(())
}

fn validar_cpf(valor: &str) -> Result<(), ValidationError> {
    if valor.trim().is_empty() {
        return Err(erro("required", "Informe o CPF."));
    }
    if !cpf::is_cpf(valor) {
        return Err(erro("cpf", "CPF inválido."));
    }
    Ok(())
}

fn validar_siape(valor: &str) -> Result<(), ValidationError> {
    let tamanho = valor.chars().count();
    if !valor.chars().all(|c| c.is_ascii_digit()) || !(4..=15).contains(&tamanho) {
        return Err(erro("siape", "SIAPE inválido (somente números, 4 a 15 dígitos)."));
    }
    Ok(())
}

fn erro(codigo: &'static str, mensagem: &'static str) -> ValidationError {
    let mut err = ValidationError::new(codigo);
    err.message = Some(mensagem.into());
    err
}

// ---
// Desserialização tolerante
// ---

fn nulo_como_vazio<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn um_ou_varios<'de, D>(deserializer: D) -> Result<Vec<Trecho>, D::Error>
where
    D: Deserializer<'de>,
{
    let valor = serde_json::Value::deserialize(deserializer)?;
    let itens = match valor {
        serde_json::Value::Array(lista) => lista,
        obj @ serde_json::Value::Object(_) => vec![obj],
        _ => Vec::new(),
    };
    itens
        .into_iter()
        .filter(|v| v.is_object())
        .map(|v| serde_json::from_value(v).map_err(serde::de::Error::custom))
        .collect()
}
