// src/wizard/atividades.rs
//
// Modelos de texto para "atividades desenvolvidas".

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoriaAtividade {
    Evento,
    Capacitacao,
    Reuniao,
    Visita,
}

impl CategoriaAtividade {
    pub const TODAS: [CategoriaAtividade; 4] =
        [Self::Evento, Self::Capacitacao, Self::Reuniao, Self::Visita];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Evento => "evento",
            Self::Capacitacao => "capacitacao",
            Self::Reuniao => "reuniao",
            Self::Visita => "visita",
        }
    }

    pub fn rotulo(&self) -> &'static str {
        match self {
            Self::Evento => "Evento (congresso/seminário)",
            Self::Capacitacao => "Capacitação/Curso",
            Self::Reuniao => "Reunião técnica",
            Self::Visita => "Visita técnica",
        }
    }

    pub fn from_valor(valor: &str) -> Option<Self> {
        Self::TODAS.into_iter().find(|c| c.as_str() == valor.trim())
    }

    /// Três linhas: o que foi, o que se fez e o resultado. Sem destino ou
    /// datas, usa marcadores genéricos.
    pub fn texto(&self, destino: &str, ida: &str, retorno: &str) -> String {
        let destino = if destino.trim().is_empty() { "destino" } else { destino.trim() };
        let ida = if ida.trim().is_empty() { "—" } else { ida.trim() };
        let retorno = if retorno.trim().is_empty() { "—" } else { retorno.trim() };
        let periodo = format!("em {destino}, no período de {ida} a {retorno}.");

        let (abertura, atividades, resultados) = match self {
            Self::Evento => (
                "Participação em evento técnico/científico",
                "credenciamento, participação em atividades programadas e encaminhamentos decorrentes",
                "atualização técnica e repasse das informações à unidade quando aplicável",
            ),
            Self::Capacitacao => (
                "Participação em capacitação/treinamento",
                "aulas/módulos e atividades práticas",
                "aprimoramento de competências e aplicação no trabalho",
            ),
            Self::Reuniao => (
                "Participação em reunião técnica/institucional",
                "alinhamento, discussão de demandas e definição de encaminhamentos",
                "deliberações e plano de ação para providências posteriores",
            ),
            Self::Visita => (
                "Realização de visita técnica",
                "vistoria/inspeção, coleta de informações e reuniões com responsáveis",
                "consolidação de informações e recomendações para etapas seguintes",
            ),
        };
        format!(
            "{abertura} {periodo}\nAtividades realizadas: {atividades}.\nResultados: {resultados}."
        )
    }
}

/// Texto de atividades quando a viagem não aconteceu.
pub fn texto_nao_realizada(motivo: &str) -> String {
    let motivo = motivo.trim().trim_end_matches('.');
    format!("Viagem não realizada.\nMotivo: {motivo}.")
}
