// src/wizard/campos.rs
//
// Esquema tipado dos campos do formulário do Anexo II.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

static PADRAO_CPF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{11}$").expect("regex CPF"));
static PADRAO_SIAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4,15}$").expect("regex SIAPE"));
static PADRAO_UF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}$").expect("regex UF"));

/// Limite de cartões de trecho por sentido.
pub const MAX_TRECHOS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentido {
    Ida,
    Retorno,
}

impl Sentido {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ida => "ida",
            Self::Retorno => "retorno",
        }
    }
}

/// Campos de um cartão de trecho.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampoTrecho {
    OrigemCidade,
    OrigemUf,
    DestinoCidade,
    DestinoUf,
    DataHora,
}

impl CampoTrecho {
    pub const TODOS: [CampoTrecho; 5] = [
        Self::OrigemCidade,
        Self::OrigemUf,
        Self::DestinoCidade,
        Self::DestinoUf,
        Self::DataHora,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrigemCidade => "origem_cidade",
            Self::OrigemUf => "origem_uf",
            Self::DestinoCidade => "destino_cidade",
            Self::DestinoUf => "destino_uf",
            Self::DataHora => "data_hora",
        }
    }

    fn rotulo_base(&self) -> &'static str {
        match self {
            Self::OrigemCidade => "Cidade de origem",
            Self::OrigemUf => "UF de origem",
            Self::DestinoCidade => "Cidade de destino",
            Self::DestinoUf => "UF de destino",
            Self::DataHora => "Data e hora",
        }
    }

    fn from_valor(valor: &str) -> Option<Self> {
        Self::TODOS.into_iter().find(|c| c.as_str() == valor)
    }
}

/// Serializado pelo nome (`"proposto.cpf"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Campo {
    /// Data exibida (dd/mm/aaaa).
    DataRelatorio,
    PropostoNome,
    PropostoCpf,
    PropostoSiape,
    OrgaoTipo,
    OrgaoDetalhe,
    Trecho { sentido: Sentido, indice: usize, campo: CampoTrecho },
    Atividades,
    FlagPrazo,
    Justificativa,
    ViagemRealizada,
}

impl Campo {
    /// Nome em notação de caminho (`proposto.orgao.tipo`, `afastamento.ida.0.origem_uf`).
    pub fn nome(&self) -> String {
        match self {
            Self::DataRelatorio => "data_relatorio".into(),
            Self::PropostoNome => "proposto.nome".into(),
            Self::PropostoCpf => "proposto.cpf".into(),
            Self::PropostoSiape => "proposto.siape".into(),
            Self::OrgaoTipo => "proposto.orgao.tipo".into(),
            Self::OrgaoDetalhe => "proposto.orgao.detalhe".into(),
            Self::Trecho { sentido, indice, campo } => {
                format!("afastamento.{}.{}.{}", sentido.as_str(), indice, campo.as_str())
            }
            Self::Atividades => "atividades_desenvolvidas".into(),
            Self::FlagPrazo => "flags.prestacao_contas_fora_prazo".into(),
            Self::Justificativa => "justificativa_prestacao_contas_fora_prazo".into(),
            Self::ViagemRealizada => "viagem_realizada".into(),
        }
    }

    pub fn from_nome(nome: &str) -> Option<Self> {
        let campo = match nome {
            "data_relatorio" => Self::DataRelatorio,
            "proposto.nome" => Self::PropostoNome,
            "proposto.cpf" => Self::PropostoCpf,
            "proposto.siape" => Self::PropostoSiape,
            "proposto.orgao.tipo" => Self::OrgaoTipo,
            "proposto.orgao.detalhe" => Self::OrgaoDetalhe,
            "atividades_desenvolvidas" => Self::Atividades,
            "flags.prestacao_contas_fora_prazo" => Self::FlagPrazo,
            "justificativa_prestacao_contas_fora_prazo" => Self::Justificativa,
            "viagem_realizada" => Self::ViagemRealizada,
            outro => {
                let mut partes = outro.split('.');
                if partes.next() != Some("afastamento") {
                    return None;
                }
                let sentido = match partes.next()? {
                    "ida" => Sentido::Ida,
                    "retorno" => Sentido::Retorno,
                    _ => return None,
                };
                let indice: usize = partes.next()?.parse().ok()?;
                if indice >= MAX_TRECHOS {
                    return None;
                }
                let campo = CampoTrecho::from_valor(partes.next()?)?;
                if partes.next().is_some() {
                    return None;
                }
                Self::Trecho { sentido, indice, campo }
            }
        };
        Some(campo)
    }

    pub fn rotulo(&self) -> String {
        match self {
            Self::DataRelatorio => "Data do relatório".into(),
            Self::PropostoNome => "Nome completo".into(),
            Self::PropostoCpf => "CPF".into(),
            Self::PropostoSiape => "SIAPE".into(),
            Self::OrgaoTipo => "Órgão".into(),
            Self::OrgaoDetalhe => "Detalhe do órgão".into(),
            Self::Trecho { sentido, indice, campo } => {
                format!("{} ({} • trecho {})", campo.rotulo_base(), sentido.as_str(), indice + 1)
            }
            Self::Atividades => "Atividades desenvolvidas".into(),
            Self::FlagPrazo => "Fora do prazo".into(),
            Self::Justificativa => "Justificativa (fora do prazo)".into(),
            Self::ViagemRealizada => "Viagem realizada?".into(),
        }
    }

    /// Passo do assistente em que o campo aparece.
    pub fn passo(&self) -> u8 {
        match self {
            Self::DataRelatorio => 1,
            Self::PropostoNome
            | Self::PropostoCpf
            | Self::PropostoSiape
            | Self::OrgaoTipo
            | Self::OrgaoDetalhe => 2,
            Self::Trecho { .. } => 3,
            Self::Atividades => 4,
            Self::FlagPrazo | Self::Justificativa => 5,
            Self::ViagemRealizada => 6,
        }
    }

    /// Obrigatório quando visível.
    pub fn obrigatorio(&self) -> bool {
        !matches!(self, Self::FlagPrazo)
    }

    /// Padrão do valor e a dica mostrada quando não confere.
    pub fn padrao(&self) -> Option<(&'static Regex, &'static str)> {
        match self {
            Self::PropostoCpf => Some((&*PADRAO_CPF, "Use 11 dígitos numéricos (somente números).")),
            Self::PropostoSiape => Some((&*PADRAO_SIAPE, "Use apenas números (4 a 15 dígitos).")),
            Self::Trecho { campo: CampoTrecho::OrigemUf | CampoTrecho::DestinoUf, .. } => {
                Some((&*PADRAO_UF, "Formato inválido."))
            }
            _ => None,
        }
    }

    /// Tamanho mínimo (campos de texto longo).
    pub fn minimo(&self) -> Option<usize> {
        match self {
            Self::Atividades | Self::Justificativa => Some(10),
            _ => None,
        }
    }
}

impl fmt::Display for Campo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nome())
    }
}

impl Serialize for Campo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.nome())
    }
}

impl<'de> Deserialize<'de> for Campo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nome = String::deserialize(deserializer)?;
        Campo::from_nome(&nome).ok_or_else(|| de::Error::custom(format!("campo desconhecido: {nome}")))
    }
}
