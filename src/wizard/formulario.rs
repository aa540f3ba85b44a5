// src/wizard/formulario.rs
//
// Estado do formulário do Anexo II e a conversão formulário <-> payload.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::{
    common::datas,
    models::{
        anexo1::{Anexo2Prefill, PrefillTrecho},
        anexo2::{
            Afastamento, Anexo2Payload, Flags, Orgao, Proposto, TipoOrgao, Trecho, ViagemRealizada,
        },
    },
    services::prazo::{self, SituacaoPrazo},
    wizard::campos::{Campo, CampoTrecho, Sentido, MAX_TRECHOS},
};

static PREFIXO_LOCAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^local\s+de\s+(origem|destino)\s*:\s*").expect("regex PREFIXO_LOCAL")
});
static CORTE_DESTINO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)\s+local\s+de\s+destino\s*:").expect("regex CORTE_DESTINO"));
static CIDADE_BARRA_UF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)/\s*([A-Za-z]{2})\s*$").expect("regex CIDADE_BARRA_UF"));
static CIDADE_BARRA_UF_NO_MEIO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-zÀ-ÿ0-9 .´’'-]+?)\s*/\s*([A-Za-z]{2})").expect("regex CIDADE_BARRA_UF_NO_MEIO")
});
static CIDADE_HIFEN_UF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)-\s*([A-Za-z]{2})\s*$").expect("regex CIDADE_HIFEN_UF"));

/// Separa "Cidade/UF" (ou "Cidade - UF", com ou sem o rótulo "Local de
/// Origem:") em cidade e UF. Sem UF reconhecível, tudo vira cidade.
pub fn split_local(valor: &str) -> (String, String) {
    let texto = PREFIXO_LOCAL.replace(valor.trim(), "");
    let mut texto = texto.trim().to_string();
    if let Some(c) = CORTE_DESTINO.captures(&texto) {
        texto = c[1].trim().to_string();
    }

    let limpar = |cidade: &str| cidade.trim().trim_end_matches([',', ' ', '\t']).to_string();
    for padrao in [&*CIDADE_BARRA_UF, &*CIDADE_BARRA_UF_NO_MEIO, &*CIDADE_HIFEN_UF] {
        if let Some(c) = padrao.captures(&texto) {
            return (limpar(&c[1]), c[2].to_uppercase());
        }
    }
    (texto, String::new())
}

/// "Cidade/UF"; sem cidade não há local.
pub fn compose_local(cidade: &str, uf: &str) -> String {
    let cidade = cidade.trim();
    let uf = uf.trim().to_uppercase();
    match (cidade.is_empty(), uf.is_empty()) {
        (true, _) => String::new(),
        (false, true) => cidade.to_string(),
        (false, false) => format!("{cidade}/{uf}"),
    }
}

/// Um trecho como aparece na tela: cidade e UF separadas, data/hora no
/// formato do input `datetime-local` (aaaa-mm-ddThh:mm).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartaoTrecho {
    pub origem_cidade: String,
    pub origem_uf: String,
    pub destino_cidade: String,
    pub destino_uf: String,
    pub data_hora: String,
}

impl CartaoTrecho {
    pub fn from_trecho(trecho: &Trecho) -> Self {
        Self::from_partes(&trecho.origem, &trecho.destino, &trecho.data_hora)
    }

    fn from_partes(origem: &str, destino: &str, data_hora: &str) -> Self {
        let (origem_cidade, origem_uf) = split_local(origem);
        let (destino_cidade, destino_uf) = split_local(destino);
        Self {
            origem_cidade,
            origem_uf,
            destino_cidade,
            destino_uf,
            data_hora: data_hora.trim().chars().take(16).collect(),
        }
    }

    pub fn origem(&self) -> String {
        compose_local(&self.origem_cidade, &self.origem_uf)
    }

    pub fn destino(&self) -> String {
        compose_local(&self.destino_cidade, &self.destino_uf)
    }

    pub fn instante(&self) -> Option<NaiveDateTime> {
        datas::parse_data_hora(&self.data_hora)
    }

    pub fn to_trecho(&self) -> Trecho {
        Trecho {
            origem: self.origem(),
            destino: self.destino(),
            data_hora: datas::normalizar_data_hora(self.data_hora.trim()),
        }
    }

    pub fn campo(&self, campo: CampoTrecho) -> &str {
        match campo {
            CampoTrecho::OrigemCidade => &self.origem_cidade,
            CampoTrecho::OrigemUf => &self.origem_uf,
            CampoTrecho::DestinoCidade => &self.destino_cidade,
            CampoTrecho::DestinoUf => &self.destino_uf,
            CampoTrecho::DataHora => &self.data_hora,
        }
    }

    fn campo_mut(&mut self, campo: CampoTrecho) -> &mut String {
        match campo {
            CampoTrecho::OrigemCidade => &mut self.origem_cidade,
            CampoTrecho::OrigemUf => &mut self.origem_uf,
            CampoTrecho::DestinoCidade => &mut self.destino_cidade,
            CampoTrecho::DestinoUf => &mut self.destino_uf,
            CampoTrecho::DataHora => &mut self.data_hora,
        }
    }
}

fn marcado(valor: &str) -> bool {
    matches!(valor.trim().to_lowercase().as_str(), "true" | "on" | "1" | "sim")
}

/// Estado completo do formulário. Sempre há ao menos um cartão de ida e um
/// de retorno.
#[derive(Debug, Clone, PartialEq)]
pub struct FormularioAnexo2 {
    /// ISO (aaaa-mm-dd); é o que vai no payload.
    pub data_relatorio: String,
    /// Texto digitado (dd/mm/aaaa).
    pub data_relatorio_exibida: String,
    pub nome: String,
    pub cpf: String,
    pub siape: String,
    pub orgao_tipo: Option<TipoOrgao>,
    pub orgao_detalhe: String,
    pub ida: Vec<CartaoTrecho>,
    pub retorno: Vec<CartaoTrecho>,
    pub atividades: String,
    pub viagem_realizada: Option<ViagemRealizada>,
    pub fora_do_prazo: bool,
    pub justificativa: String,
    pub prazo_dias: u32,
}

impl Default for FormularioAnexo2 {
    fn default() -> Self {
        Self::new(prazo::PRAZO_RELATORIO_DIAS)
    }
}

impl FormularioAnexo2 {
    pub fn new(prazo_dias: u32) -> Self {
        Self {
            data_relatorio: String::new(),
            data_relatorio_exibida: String::new(),
            nome: String::new(),
            cpf: String::new(),
            siape: String::new(),
            orgao_tipo: None,
            orgao_detalhe: String::new(),
            ida: vec![CartaoTrecho::default()],
            retorno: vec![CartaoTrecho::default()],
            atividades: String::new(),
            viagem_realizada: None,
            fora_do_prazo: false,
            justificativa: String::new(),
            prazo_dias,
        }
    }

    // --- Data do relatório ---

    /// Texto digitado pelo usuário; a data ISO acompanha quando é válida.
    pub fn definir_data_exibida(&mut self, texto: &str) {
        self.data_relatorio_exibida = texto.to_string();
        self.data_relatorio = datas::data_br_para_iso(texto).unwrap_or_default();
        self.refresh_flags();
    }

    /// Data vinda de fora (servidor, payload): atualiza as duas representações.
    pub fn definir_data_relatorio(&mut self, valor: &str) {
        self.data_relatorio = datas::data_br_para_iso(valor).unwrap_or_default();
        self.data_relatorio_exibida = if self.data_relatorio.is_empty() {
            String::new()
        } else {
            datas::formatar_data_br(&self.data_relatorio)
        };
        self.refresh_flags();
    }

    // --- Órgão ---

    pub fn definir_orgao_tipo(&mut self, tipo: Option<TipoOrgao>) {
        self.orgao_tipo = tipo;
        if !self.detalhe_visivel() {
            self.orgao_detalhe.clear();
        }
    }

    pub fn detalhe_visivel(&self) -> bool {
        self.orgao_tipo.is_some_and(|t| t.exige_detalhe())
    }

    pub fn justificativa_visivel(&self) -> bool {
        self.fora_do_prazo
    }

    // --- Trechos ---

    pub fn cartoes(&self, sentido: Sentido) -> &[CartaoTrecho] {
        match sentido {
            Sentido::Ida => &self.ida,
            Sentido::Retorno => &self.retorno,
        }
    }

    fn cartoes_mut(&mut self, sentido: Sentido) -> &mut Vec<CartaoTrecho> {
        match sentido {
            Sentido::Ida => &mut self.ida,
            Sentido::Retorno => &mut self.retorno,
        }
    }

    /// Devolve `false` quando o sentido já está no limite de cartões.
    pub fn adicionar_trecho(&mut self, sentido: Sentido, cartao: CartaoTrecho) -> bool {
        let cartoes = self.cartoes_mut(sentido);
        if cartoes.len() >= MAX_TRECHOS {
            return false;
        }
        cartoes.push(cartao);
        self.refresh_flags();
        true
    }

    /// Remove o cartão; o último cartão de cada lado não pode ser removido.
    pub fn remover_trecho(&mut self, sentido: Sentido, indice: usize) -> bool {
        let cartoes = self.cartoes_mut(sentido);
        if cartoes.len() <= 1 || indice >= cartoes.len() {
            return false;
        }
        cartoes.remove(indice);
        self.refresh_flags();
        true
    }

    /// Primeira ida e último retorno que tenham data/hora preenchida.
    pub fn limites(&self) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        let ida = self.ida.iter().find(|c| !c.data_hora.trim().is_empty());
        let retorno = self.retorno.iter().rev().find(|c| !c.data_hora.trim().is_empty());
        (ida.and_then(CartaoTrecho::instante), retorno.and_then(CartaoTrecho::instante))
    }

    // --- Prazo ---

    /// Recalcula a marcação de fora do prazo. Sem data do relatório ou sem
    /// retorno, fica desmarcada.
    pub fn refresh_flags(&mut self) {
        let (_, retorno) = self.limites();
        self.fora_do_prazo = match (retorno, datas::parse_data(&self.data_relatorio)) {
            (Some(ret), Some(rel)) => prazo::fora_do_prazo(ret, rel, self.prazo_dias),
            _ => false,
        };
    }

    pub fn situacao_prazo(&self) -> SituacaoPrazo {
        let (_, retorno) = self.limites();
        if retorno.is_some() && datas::parse_data(&self.data_relatorio).is_some() {
            SituacaoPrazo::from_flag(Some(self.fora_do_prazo))
        } else {
            SituacaoPrazo::SemDados
        }
    }

    // --- Payload ---

    pub fn to_payload(&self) -> Anexo2Payload {
        let opcional = |s: &str| Some(s.to_string()).filter(|s| !s.trim().is_empty());
        Anexo2Payload {
            data_relatorio: self.data_relatorio.clone(),
            proposto: Proposto {
                nome: self.nome.clone(),
                cpf: self.cpf.clone(),
                siape: self.siape.clone(),
                orgao: Orgao { tipo: self.orgao_tipo, detalhe: opcional(&self.orgao_detalhe) },
            },
            afastamento: Afastamento {
                ida: self.ida.iter().map(CartaoTrecho::to_trecho).collect(),
                retorno: self.retorno.iter().map(CartaoTrecho::to_trecho).collect(),
            },
            atividades_desenvolvidas: self.atividades.clone(),
            viagem_realizada: self.viagem_realizada,
            justificativa_prestacao_contas_fora_prazo: opcional(&self.justificativa),
            flags: Flags { prestacao_contas_fora_prazo: self.fora_do_prazo },
        }
    }

    /// Espelha o payload no formulário. A marcação de prazo vem do payload;
    /// quem chama decide se recalcula.
    pub fn aplicar_payload(&mut self, payload: &Anexo2Payload) {
        self.data_relatorio = datas::data_br_para_iso(&payload.data_relatorio).unwrap_or_default();
        self.data_relatorio_exibida = if self.data_relatorio.is_empty() {
            String::new()
        } else {
            datas::formatar_data_br(&self.data_relatorio)
        };

        let proposto = &payload.proposto;
        self.nome = proposto.nome.clone();
        self.cpf = proposto.cpf.clone();
        self.siape = proposto.siape.clone();
        self.orgao_tipo = proposto.orgao.tipo;
        self.orgao_detalhe = proposto.orgao.detalhe.clone().unwrap_or_default();

        self.ida = cartoes_de(&payload.afastamento.ida);
        self.retorno = cartoes_de(&payload.afastamento.retorno);

        self.atividades = payload.atividades_desenvolvidas.clone();
        self.viagem_realizada = payload.viagem_realizada;
        self.fora_do_prazo = payload.flags.prestacao_contas_fora_prazo;
        self.justificativa = payload
            .justificativa_prestacao_contas_fora_prazo
            .clone()
            .unwrap_or_default();
    }

    /// Aplica só o que veio no pré-preenchimento e recalcula o prazo.
    pub fn aplicar_prefill(&mut self, prefill: &Anexo2Prefill) {
        if let Some(proposto) = &prefill.proposto {
            if let Some(nome) = &proposto.nome {
                self.nome = nome.clone();
            }
            if let Some(cpf) = &proposto.cpf {
                self.cpf = cpf.clone();
            }
            if let Some(siape) = &proposto.siape {
                self.siape = siape.clone();
            }
            if let Some(orgao) = &proposto.orgao {
                self.orgao_tipo = Some(orgao.tipo);
                self.orgao_detalhe = orgao.detalhe.clone().unwrap_or_default();
            }
        }
        if let Some(afastamento) = &prefill.afastamento {
            let cartao = |t: &Option<PrefillTrecho>| match t {
                Some(t) => CartaoTrecho::from_partes(
                    t.origem.as_deref().unwrap_or(""),
                    t.destino.as_deref().unwrap_or(""),
                    t.data_hora.as_deref().unwrap_or(""),
                ),
                None => CartaoTrecho::default(),
            };
            self.ida = vec![cartao(&afastamento.ida)];
            self.retorno = vec![cartao(&afastamento.retorno)];
        }
        if let Some(atividades) = &prefill.atividades_desenvolvidas {
            self.atividades = atividades.clone();
        }
        if let Some(viagem) = prefill.viagem_realizada {
            self.viagem_realizada = Some(viagem);
        }
        self.definir_orgao_tipo(self.orgao_tipo);
        self.refresh_flags();
    }

    // --- Acesso por campo ---

    pub fn valor(&self, campo: Campo) -> String {
        match campo {
            Campo::DataRelatorio => self.data_relatorio_exibida.clone(),
            Campo::PropostoNome => self.nome.clone(),
            Campo::PropostoCpf => self.cpf.clone(),
            Campo::PropostoSiape => self.siape.clone(),
            Campo::OrgaoTipo => self.orgao_tipo.map(|t| t.as_str().to_string()).unwrap_or_default(),
            Campo::OrgaoDetalhe => self.orgao_detalhe.clone(),
            Campo::Trecho { sentido, indice, campo } => self
                .cartoes(sentido)
                .get(indice)
                .map(|c| c.campo(campo).to_string())
                .unwrap_or_default(),
            Campo::Atividades => self.atividades.clone(),
            Campo::FlagPrazo => self.fora_do_prazo.to_string(),
            Campo::Justificativa => self.justificativa.clone(),
            Campo::ViagemRealizada => self
                .viagem_realizada
                .map(|v| v.as_str().to_string())
                .unwrap_or_default(),
        }
    }

    /// Escreve um campo como se o usuário tivesse digitado. Não recalcula o prazo.
    pub fn definir(&mut self, campo: Campo, valor: &str) {
        match campo {
            Campo::DataRelatorio => {
                self.data_relatorio_exibida = valor.to_string();
                self.data_relatorio = datas::data_br_para_iso(valor).unwrap_or_default();
            }
            Campo::PropostoNome => self.nome = valor.to_string(),
            Campo::PropostoCpf => self.cpf = valor.to_string(),
            Campo::PropostoSiape => self.siape = valor.to_string(),
            Campo::OrgaoTipo => self.orgao_tipo = TipoOrgao::from_valor(valor),
            Campo::OrgaoDetalhe => self.orgao_detalhe = valor.to_string(),
            Campo::Trecho { sentido, indice, campo } => {
                if indice >= MAX_TRECHOS {
                    tracing::warn!("Trecho {} fora do limite de {} cartões", indice, MAX_TRECHOS);
                    return;
                }
                let cartoes = self.cartoes_mut(sentido);
                if cartoes.len() <= indice {
                    cartoes.resize(indice + 1, CartaoTrecho::default());
                }
                let valor = match campo {
                    // aceita também dd/mm/aaaa hh:mm
                    CampoTrecho::DataHora => datas::parse_data_hora_br(valor)
                        .unwrap_or_else(|| valor.trim().chars().take(16).collect()),
                    _ => valor.to_string(),
                };
                *cartoes[indice].campo_mut(campo) = valor;
            }
            Campo::Atividades => self.atividades = valor.to_string(),
            Campo::FlagPrazo => self.fora_do_prazo = marcado(valor),
            Campo::Justificativa => self.justificativa = valor.to_string(),
            Campo::ViagemRealizada => self.viagem_realizada = ViagemRealizada::from_valor(valor),
        }
    }

    /// Todos os campos, inclusive os de cada cartão de trecho.
    pub fn campos(&self) -> Vec<Campo> {
        let mut campos = vec![
            Campo::DataRelatorio,
            Campo::PropostoNome,
            Campo::PropostoCpf,
            Campo::PropostoSiape,
            Campo::OrgaoTipo,
            Campo::OrgaoDetalhe,
        ];
        for sentido in [Sentido::Ida, Sentido::Retorno] {
            for indice in 0..self.cartoes(sentido).len() {
                for campo in CampoTrecho::TODOS {
                    campos.push(Campo::Trecho { sentido, indice, campo });
                }
            }
        }
        campos.extend([
            Campo::Atividades,
            Campo::FlagPrazo,
            Campo::Justificativa,
            Campo::ViagemRealizada,
        ]);
        campos
    }

    pub fn to_campos(&self) -> BTreeMap<String, String> {
        self.campos().into_iter().map(|c| (c.nome(), self.valor(c))).collect()
    }

    /// Como `from_campos`, mas recusa nomes desconhecidos ou trechos fora do
    /// limite. Devolve os nomes recusados.
    pub fn try_from_campos(
        campos: &BTreeMap<String, String>,
        prazo_dias: u32,
    ) -> Result<Self, Vec<String>> {
        let recusados: Vec<String> = campos
            .keys()
            .filter(|nome| Campo::from_nome(nome).is_none())
            .cloned()
            .collect();
        if !recusados.is_empty() {
            return Err(recusados);
        }
        Ok(Self::from_campos(campos, prazo_dias))
    }

    /// Monta o formulário a partir de nomes em notação de caminho. Nomes
    /// desconhecidos são ignorados.
    pub fn from_campos(campos: &BTreeMap<String, String>, prazo_dias: u32) -> Self {
        let mut form = Self::new(prazo_dias);
        for (nome, valor) in campos {
            match Campo::from_nome(nome) {
                Some(campo) => form.definir(campo, valor),
                None => tracing::debug!("Campo ignorado: {}", nome),
            }
        }
        form
    }
}

fn cartoes_de(trechos: &[Trecho]) -> Vec<CartaoTrecho> {
    if trechos.is_empty() {
        return vec![CartaoTrecho::default()];
    }
    trechos.iter().map(CartaoTrecho::from_trecho).collect()
}
