// src/services/prazo.rs
//
// Prazo da prestação de contas: o relatório deve ser emitido em até N dias
// corridos após o retorno (N = 5 pela norma).

use chrono::{Days, NaiveDate, NaiveDateTime};

use crate::common::datas;

pub const PRAZO_RELATORIO_DIAS: u32 = 5;

/// `true` quando a data do relatório passa de `retorno + dias`.
/// A hora do retorno é ignorada; no último dia do prazo ainda está no prazo.
pub fn fora_do_prazo(retorno: NaiveDateTime, data_relatorio: NaiveDate, dias: u32) -> bool {
    match retorno.date().checked_add_days(Days::new(u64::from(dias))) {
        Some(limite) => data_relatorio > limite,
        None => false,
    }
}

/// Mesma regra a partir dos textos do payload. Sem alguma das datas não há
/// como estar fora do prazo.
pub fn fora_do_prazo_texto(retorno: Option<&str>, data_relatorio: Option<&str>, dias: u32) -> Option<bool> {
    let retorno = datas::parse_data_hora(retorno?)?;
    let relatorio = datas::parse_data(data_relatorio?)?;
    Some(fora_do_prazo(retorno, relatorio, dias))
}

/// Estado do selo de prazo exibido no passo 5 e na revisão.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SituacaoPrazo {
    SemDados,
    NoPrazo,
    ForaDoPrazo,
}

impl SituacaoPrazo {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => Self::SemDados,
            Some(false) => Self::NoPrazo,
            Some(true) => Self::ForaDoPrazo,
        }
    }

    pub fn rotulo(&self) -> &'static str {
        match self {
            Self::SemDados => "Prazo: —",
            Self::NoPrazo => "Fora do prazo: NÃO",
            Self::ForaDoPrazo => "Fora do prazo: SIM",
        }
    }
}
