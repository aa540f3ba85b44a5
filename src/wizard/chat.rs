// src/wizard/chat.rs
//
// Preenchimento guiado do Anexo II, uma pergunta por vez.
//
// Inicio → DataRelatorio → PropostoNome → PropostoCpf → PropostoSiape →
// OrgaoTipo → [OrgaoDetalhe] → IdaOrigem → IdaDestino → IdaDataHora →
// RetornoOrigem → [RetornoOrigemTexto] → RetornoDestino →
// [RetornoDestinoTexto] → RetornoDataHora → ViagemRealizada →
// (sim) AtividadesModo → AtividadesModelo | AtividadesLivre,
// (não) NaoRealizadaMotivo → [JustificativaPrazo] → Resumo → Concluido.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    common::datas,
    models::anexo2::{
        Afastamento, Anexo2Payload, Flags, Orgao, Proposto, TipoOrgao, Trecho,
        ViagemRealizada as Viagem,
    },
    services::{cpf, prazo},
    wizard::atividades::{self, CategoriaAtividade},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EstadoChat {
    Inicio,
    DataRelatorio,
    PropostoNome,
    PropostoCpf,
    PropostoSiape,
    OrgaoTipo,
    OrgaoDetalhe,
    IdaOrigem,
    IdaDestino,
    IdaDataHora,
    RetornoOrigem,
    RetornoOrigemTexto,
    RetornoDestino,
    RetornoDestinoTexto,
    RetornoDataHora,
    ViagemRealizada,
    AtividadesModo,
    AtividadesModelo,
    AtividadesLivre,
    NaoRealizadaMotivo,
    JustificativaPrazo,
    Resumo,
    Concluido,
}

impl EstadoChat {
    pub fn pode_transitar(&self, destino: EstadoChat) -> bool {
        use EstadoChat::*;
        matches!(
            (self, destino),
            (Inicio, DataRelatorio | PropostoNome)
                | (DataRelatorio, PropostoNome)
                | (PropostoNome, PropostoCpf)
                | (PropostoCpf, PropostoSiape)
                | (PropostoSiape, OrgaoTipo)
                | (OrgaoTipo, OrgaoDetalhe | IdaOrigem)
                | (OrgaoDetalhe, IdaOrigem)
                | (IdaOrigem, IdaDestino)
                | (IdaDestino, IdaDataHora)
                | (IdaDataHora, RetornoOrigem)
                | (RetornoOrigem, RetornoOrigemTexto | RetornoDestino)
                | (RetornoOrigemTexto, RetornoDestino)
                | (RetornoDestino, RetornoDestinoTexto | RetornoDataHora)
                | (RetornoDestinoTexto, RetornoDataHora)
                | (RetornoDataHora, ViagemRealizada)
                | (ViagemRealizada, AtividadesModo | NaoRealizadaMotivo)
                | (AtividadesModo, AtividadesModelo | AtividadesLivre)
                | (AtividadesModelo, AtividadesLivre)
                | (
                    AtividadesModelo | AtividadesLivre | NaoRealizadaMotivo,
                    JustificativaPrazo | Resumo
                )
                | (JustificativaPrazo, Resumo)
                | (Resumo, Concluido)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Concluido)
    }
}

impl fmt::Display for EstadoChat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Inicio => "inicio",
            Self::DataRelatorio => "data_relatorio",
            Self::PropostoNome => "proposto_nome",
            Self::PropostoCpf => "proposto_cpf",
            Self::PropostoSiape => "proposto_siape",
            Self::OrgaoTipo => "orgao_tipo",
            Self::OrgaoDetalhe => "orgao_detalhe",
            Self::IdaOrigem => "ida_origem",
            Self::IdaDestino => "ida_destino",
            Self::IdaDataHora => "ida_data_hora",
            Self::RetornoOrigem => "retorno_origem",
            Self::RetornoOrigemTexto => "retorno_origem_texto",
            Self::RetornoDestino => "retorno_destino",
            Self::RetornoDestinoTexto => "retorno_destino_texto",
            Self::RetornoDataHora => "retorno_data_hora",
            Self::ViagemRealizada => "viagem_realizada",
            Self::AtividadesModo => "atividades_modo",
            Self::AtividadesModelo => "atividades_modelo",
            Self::AtividadesLivre => "atividades_livre",
            Self::NaoRealizadaMotivo => "nao_realizada_motivo",
            Self::JustificativaPrazo => "justificativa_prazo",
            Self::Resumo => "resumo",
            Self::Concluido => "concluido",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ErroChat {
    #[error("A conversa já foi concluída. Inicie uma nova para preencher outro relatório.")]
    Encerrada,

    #[error("Transição inválida: {de} -> {para}")]
    TransicaoInvalida { de: EstadoChat, para: EstadoChat },
}

// --- Perguntas ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TipoEntrada {
    Texto,
    /// dd/mm/aaaa
    Data,
    /// dd/mm/aaaa hh:mm ou aaaa-mm-ddThh:mm
    DataHora,
    Opcoes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OpcaoRapida {
    pub rotulo: String,
    /// O que deve ser enviado como resposta.
    pub valor: String,
}

impl OpcaoRapida {
    fn new(rotulo: impl Into<String>, valor: &str) -> Self {
        Self { rotulo: rotulo.into(), valor: valor.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pergunta {
    pub estado: EstadoChat,
    pub texto: String,
    pub entrada: TipoEntrada,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opcoes: Vec<OpcaoRapida>,
}

/// O que o assistente devolve a cada resposta: avisos (erros de validação,
/// confirmações) e a próxima pergunta. Ao concluir, traz o payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Turno {
    #[serde(default)]
    pub mensagens: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pergunta: Option<Pergunta>,
    pub concluido: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Anexo2Payload>,
}

// --- Sessão ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrechoChat {
    pub origem: Option<String>,
    pub destino: Option<String>,
    /// aaaa-mm-ddThh:mm
    pub data_hora: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DadosChat {
    /// ISO
    pub data_relatorio: Option<String>,
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub siape: Option<String>,
    pub orgao_tipo: Option<TipoOrgao>,
    pub orgao_detalhe: Option<String>,
    pub ida: TrechoChat,
    pub retorno: TrechoChat,
    pub viagem_realizada: Option<Viagem>,
    pub atividades: Option<String>,
    pub justificativa: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessaoChat {
    estado: EstadoChat,
    dados: DadosChat,
    /// Data sugerida (servidor ou formulário); pula a pergunta da data.
    preset: Option<String>,
    prazo_dias: u32,
}

fn entre(valor: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&valor.trim().chars().count())
}

fn ler_data_hora(valor: &str) -> Option<String> {
    datas::parse_data_hora_br(valor).or_else(|| {
        datas::parse_data_hora(valor).map(|dt| dt.format("%Y-%m-%dT%H:%M").to_string())
    })
}

fn ou_traco(valor: &str) -> &str {
    if valor.trim().is_empty() { "—" } else { valor }
}

impl SessaoChat {
    pub fn new(preset: Option<String>, prazo_dias: u32) -> Self {
        Self {
            estado: EstadoChat::Inicio,
            dados: DadosChat::default(),
            preset: preset.and_then(|p| datas::data_br_para_iso(&p)),
            prazo_dias,
        }
    }

    pub fn estado(&self) -> EstadoChat {
        self.estado
    }

    pub fn dados(&self) -> &DadosChat {
        &self.dados
    }

    pub fn concluido(&self) -> bool {
        self.estado.is_terminal()
    }

    fn ir_para(&mut self, destino: EstadoChat) -> Result<(), ErroChat> {
        if !self.estado.pode_transitar(destino) {
            return Err(ErroChat::TransicaoInvalida { de: self.estado, para: destino });
        }
        tracing::debug!("Chat: {} -> {}", self.estado, destino);
        self.estado = destino;
        Ok(())
    }

    /// (Re)começa a conversa.
    pub fn iniciar(&mut self) -> Result<Turno, ErroChat> {
        self.estado = EstadoChat::Inicio;
        self.dados = DadosChat::default();

        match self.preset.clone() {
            Some(iso) => {
                let aviso = format!("Usar data atual: {}.", datas::formatar_data_br(&iso));
                self.dados.data_relatorio = Some(iso);
                self.ir_para(EstadoChat::PropostoNome)?;
                Ok(self.turno(vec![aviso]))
            }
            None => {
                self.ir_para(EstadoChat::DataRelatorio)?;
                Ok(self.turno(Vec::new()))
            }
        }
    }

    /// Processa a resposta à pergunta atual. Resposta inválida repete a
    /// pergunta com a mensagem do problema.
    pub fn responder(&mut self, resposta: &str) -> Result<Turno, ErroChat> {
        use EstadoChat::*;
        let resposta = resposta.trim();

        match self.estado {
            Inicio => return self.iniciar(),
            Concluido => return Err(ErroChat::Encerrada),

            DataRelatorio => {
                let Some(data) = datas::parse_data_br(resposta) else {
                    return Ok(self.repetir("Formato esperado: dd/mm/aaaa."));
                };
                self.dados.data_relatorio = Some(data.format("%Y-%m-%d").to_string());
                self.ir_para(PropostoNome)?;
            }

            PropostoNome => {
                if !entre(resposta, 3, 120) {
                    return Ok(self.repetir("Nome inválido. Informe o nome completo (mín. 3 caracteres)."));
                }
                self.dados.nome = Some(resposta.to_string());
                self.ir_para(PropostoCpf)?;
            }
            PropostoCpf => {
                let digitos = cpf::only_digits(resposta);
                if digitos.len() != 11 {
                    return Ok(self.repetir("CPF deve ter 11 dígitos (somente números)."));
                }
                if !cpf::is_cpf(&digitos) {
                    return Ok(self.repetir("CPF inválido (dígitos verificadores não conferem)."));
                }
                self.dados.cpf = Some(digitos);
                self.ir_para(PropostoSiape)?;
            }
            PropostoSiape => {
                let digitos = cpf::only_digits(resposta);
                if !(4..=15).contains(&digitos.len()) {
                    return Ok(self.repetir("SIAPE inválido (somente números, 4 a 15 dígitos)."));
                }
                self.dados.siape = Some(digitos);
                self.ir_para(OrgaoTipo)?;
            }
            OrgaoTipo => {
                let Some(tipo) = TipoOrgao::from_valor(resposta) else {
                    return Ok(self.repetir("Escolha uma das opções."));
                };
                self.dados.orgao_tipo = Some(tipo);
                if tipo.exige_detalhe() {
                    self.ir_para(OrgaoDetalhe)?;
                } else {
                    self.dados.orgao_detalhe = None;
                    self.ir_para(IdaOrigem)?;
                }
            }
            OrgaoDetalhe => {
                if !entre(resposta, 2, 120) {
                    return Ok(self.repetir("Detalhe obrigatório para Projetos/Outros."));
                }
                self.dados.orgao_detalhe = Some(resposta.to_string());
                self.ir_para(IdaOrigem)?;
            }

            IdaOrigem => {
                if !entre(resposta, 2, 80) {
                    return Ok(self.repetir("Origem inválida."));
                }
                self.dados.ida.origem = Some(resposta.to_string());
                self.ir_para(IdaDestino)?;
            }
            IdaDestino => {
                if !entre(resposta, 2, 80) {
                    return Ok(self.repetir("Destino inválido."));
                }
                self.dados.ida.destino = Some(resposta.to_string());
                self.ir_para(IdaDataHora)?;
            }
            IdaDataHora => {
                let Some(dh) = ler_data_hora(resposta) else {
                    return Ok(self.repetir("Formato esperado: dd/mm/aaaa hh:mm."));
                };
                self.dados.ida.data_hora = Some(dh);
                self.ir_para(RetornoOrigem)?;
            }

            RetornoOrigem => match resposta {
                "usar" => match self.dados.ida.destino.clone() {
                    Some(destino) => {
                        self.dados.retorno.origem = Some(destino);
                        self.ir_para(RetornoDestino)?;
                    }
                    None => self.ir_para(RetornoOrigemTexto)?,
                },
                "manual" => self.ir_para(RetornoOrigemTexto)?,
                _ => return Ok(self.repetir("Escolha uma das opções.")),
            },
            RetornoOrigemTexto => {
                if !entre(resposta, 2, 80) {
                    return Ok(self.repetir("Origem inválida."));
                }
                self.dados.retorno.origem = Some(resposta.to_string());
                self.ir_para(RetornoDestino)?;
            }
            RetornoDestino => match resposta {
                "usar" => match self.dados.ida.origem.clone() {
                    Some(origem) => {
                        self.dados.retorno.destino = Some(origem);
                        self.ir_para(RetornoDataHora)?;
                    }
                    None => self.ir_para(RetornoDestinoTexto)?,
                },
                "manual" => self.ir_para(RetornoDestinoTexto)?,
                _ => return Ok(self.repetir("Escolha uma das opções.")),
            },
            RetornoDestinoTexto => {
                if !entre(resposta, 2, 80) {
                    return Ok(self.repetir("Destino inválido."));
                }
                self.dados.retorno.destino = Some(resposta.to_string());
                self.ir_para(RetornoDataHora)?;
            }
            RetornoDataHora => {
                let Some(dh) = ler_data_hora(resposta) else {
                    return Ok(self.repetir("Formato esperado: dd/mm/aaaa hh:mm."));
                };
                let ida = self.dados.ida.data_hora.as_deref().and_then(datas::parse_data_hora);
                if let (Some(ida), Some(ret)) = (ida, datas::parse_data_hora(&dh)) {
                    if ret < ida {
                        return Ok(self.repetir(
                            "O retorno não pode ser anterior à ida. Informe novamente a data/hora do retorno.",
                        ));
                    }
                }
                self.dados.retorno.data_hora = Some(dh);
                self.ir_para(ViagemRealizada)?;
            }

            ViagemRealizada => {
                let Some(viagem) = Viagem::from_valor(resposta) else {
                    return Ok(self.repetir("Escolha uma das opções."));
                };
                self.dados.viagem_realizada = Some(viagem);
                match viagem {
                    Viagem::Sim => self.ir_para(AtividadesModo)?,
                    Viagem::Nao => self.ir_para(NaoRealizadaMotivo)?,
                }
            }
            AtividadesModo => match resposta {
                "modelo" => self.ir_para(AtividadesModelo)?,
                "livre" => self.ir_para(AtividadesLivre)?,
                _ => return Ok(self.repetir("Escolha uma das opções.")),
            },
            AtividadesModelo => {
                if resposta == "sem_modelo" {
                    self.ir_para(AtividadesLivre)?;
                } else {
                    let Some(categoria) = CategoriaAtividade::from_valor(resposta) else {
                        return Ok(self.repetir("Escolha uma das opções."));
                    };
                    self.dados.atividades = Some(self.texto_modelo(categoria));
                    self.depois_das_atividades()?;
                }
            }
            AtividadesLivre => {
                if !entre(resposta, 10, 4000) {
                    return Ok(self.repetir("Texto curto. Informe pelo menos 10 caracteres."));
                }
                self.dados.atividades = Some(resposta.to_string());
                self.depois_das_atividades()?;
            }
            NaoRealizadaMotivo => {
                if !entre(resposta, 10, 2000) {
                    return Ok(self.repetir("Texto curto. Informe pelo menos 10 caracteres."));
                }
                self.dados.atividades = Some(atividades::texto_nao_realizada(resposta));
                self.depois_das_atividades()?;
            }
            JustificativaPrazo => {
                if !entre(resposta, 10, 2000) {
                    return Ok(self.repetir("Justificativa curta. Informe pelo menos 10 caracteres."));
                }
                self.dados.justificativa = Some(resposta.to_string());
                self.ir_para(Resumo)?;
            }

            Resumo => {
                if resposta != "aplicar" {
                    return Ok(self.repetir("Escolha uma das opções."));
                }
                self.ir_para(Concluido)?;
                tracing::info!("💬 Chat do Anexo II concluído");
            }
        }
        Ok(self.turno(Vec::new()))
    }

    fn depois_das_atividades(&mut self) -> Result<(), ErroChat> {
        if self.fora_do_prazo() {
            self.ir_para(EstadoChat::JustificativaPrazo)
        } else {
            self.ir_para(EstadoChat::Resumo)
        }
    }

    fn texto_modelo(&self, categoria: CategoriaAtividade) -> String {
        let data = |t: &Option<String>| t.as_deref().map(datas::formatar_data_br).unwrap_or_default();
        categoria.texto(
            self.dados.ida.destino.as_deref().unwrap_or(""),
            &data(&self.dados.ida.data_hora),
            &data(&self.dados.retorno.data_hora),
        )
    }

    fn repetir(&self, mensagem: &str) -> Turno {
        self.turno(vec![mensagem.to_string()])
    }

    fn turno(&self, mensagens: Vec<String>) -> Turno {
        let concluido = self.concluido();
        Turno {
            mensagens,
            pergunta: self.pergunta(),
            concluido,
            payload: concluido.then(|| self.payload()),
        }
    }

    /// Relatório emitido mais de N dias depois do retorno.
    pub fn fora_do_prazo(&self) -> bool {
        prazo::fora_do_prazo_texto(
            self.dados.retorno.data_hora.as_deref(),
            self.dados.data_relatorio.as_deref(),
            self.prazo_dias,
        )
        .unwrap_or(false)
    }

    /// Pergunta do estado atual.
    pub fn pergunta(&self) -> Option<Pergunta> {
        use EstadoChat::*;
        let texto = |estado, t: &str| Pergunta {
            estado,
            texto: t.to_string(),
            entrada: TipoEntrada::Texto,
            opcoes: Vec::new(),
        };
        let opcoes = |estado, t: String, opcoes: Vec<OpcaoRapida>| Pergunta {
            estado,
            texto: t,
            entrada: TipoEntrada::Opcoes,
            opcoes,
        };
        let d = &self.dados;

        let pergunta = match self.estado {
            Inicio | Concluido => return None,
            DataRelatorio => Pergunta {
                entrada: TipoEntrada::Data,
                ..texto(
                    DataRelatorio,
                    "Olá. Vou preencher o Relatório de Viagem (ANEXO II) com você. \
                     Qual a data de emissão do relatório?",
                )
            },
            PropostoNome => texto(PropostoNome, "Seu nome completo (sem abreviações)."),
            PropostoCpf => texto(PropostoCpf, "CPF do proposto (somente números)."),
            PropostoSiape => texto(PropostoSiape, "SIAPE do proposto (somente números)."),
            OrgaoTipo => opcoes(
                OrgaoTipo,
                "Órgão de exercício do proposto:".into(),
                TipoOrgao::TODOS
                    .iter()
                    .map(|t| OpcaoRapida::new(t.rotulo(), t.as_str()))
                    .collect(),
            ),
            OrgaoDetalhe => texto(
                OrgaoDetalhe,
                "Informe o nome do projeto/unidade (obrigatório para Projetos/Outros).",
            ),
            IdaOrigem => texto(IdaOrigem, "Origem da ida (cidade/UF)."),
            IdaDestino => texto(IdaDestino, "Destino da ida (cidade/UF)."),
            IdaDataHora => Pergunta {
                entrada: TipoEntrada::DataHora,
                ..texto(IdaDataHora, "Data e hora da ida.")
            },
            RetornoOrigem => opcoes(
                RetornoOrigem,
                "Origem do retorno (normalmente o destino da ida). Confirmar?".into(),
                vec![
                    OpcaoRapida::new(
                        format!("Usar “{}”", d.ida.destino.as_deref().unwrap_or("destino da ida")),
                        "usar",
                    ),
                    OpcaoRapida::new("Informar manualmente", "manual"),
                ],
            ),
            RetornoOrigemTexto => texto(RetornoOrigemTexto, "Digite a origem do retorno (cidade/UF)."),
            RetornoDestino => opcoes(
                RetornoDestino,
                "Destino do retorno (normalmente a origem da ida). Confirmar?".into(),
                vec![
                    OpcaoRapida::new(
                        format!("Usar “{}”", d.ida.origem.as_deref().unwrap_or("origem da ida")),
                        "usar",
                    ),
                    OpcaoRapida::new("Informar manualmente", "manual"),
                ],
            ),
            RetornoDestinoTexto => texto(RetornoDestinoTexto, "Digite o destino do retorno (cidade/UF)."),
            RetornoDataHora => Pergunta {
                entrada: TipoEntrada::DataHora,
                ..texto(RetornoDataHora, "Data e hora do retorno.")
            },
            ViagemRealizada => opcoes(
                ViagemRealizada,
                "A viagem foi realizada?".into(),
                vec![OpcaoRapida::new("SIM", "sim"), OpcaoRapida::new("NÃO", "nao")],
            ),
            AtividadesModo => opcoes(
                AtividadesModo,
                "Quer que eu monte um texto objetivo a partir de um modelo?".into(),
                vec![
                    OpcaoRapida::new("Sim (modelo)", "modelo"),
                    OpcaoRapida::new("Não, vou escrever", "livre"),
                ],
            ),
            AtividadesModelo => opcoes(
                AtividadesModelo,
                "Qual o tipo principal de atividade?".into(),
                CategoriaAtividade::TODAS
                    .iter()
                    .map(|c| OpcaoRapida::new(c.rotulo(), c.as_str()))
                    .chain([OpcaoRapida::new("Sem modelo", "sem_modelo")])
                    .collect(),
            ),
            AtividadesLivre => texto(
                AtividadesLivre,
                "Descreva as atividades desenvolvidas (objetivo e direto).",
            ),
            NaoRealizadaMotivo => texto(
                NaoRealizadaMotivo,
                "Viagem não realizada. Informe, de forma objetiva, o motivo.",
            ),
            JustificativaPrazo => texto(
                JustificativaPrazo,
                &format!(
                    "Relatório fora do prazo (mais de {} dias após retorno). \
                     Informe uma justificativa objetiva.",
                    self.prazo_dias
                ),
            ),
            Resumo => opcoes(
                Resumo,
                self.texto_resumo(),
                vec![OpcaoRapida::new("Aplicar e revisar", "aplicar")],
            ),
        };
        Some(pergunta)
    }

    /// Payload com um trecho de ida e um de retorno. A justificativa só vai
    /// quando o relatório está fora do prazo.
    pub fn payload(&self) -> Anexo2Payload {
        let d = &self.dados;
        let fora = self.fora_do_prazo();
        let trecho = |t: &TrechoChat| Trecho {
            origem: t.origem.clone().unwrap_or_default(),
            destino: t.destino.clone().unwrap_or_default(),
            data_hora: t
                .data_hora
                .as_deref()
                .map(datas::normalizar_data_hora)
                .unwrap_or_default(),
        };

        Anexo2Payload {
            data_relatorio: d.data_relatorio.clone().unwrap_or_default(),
            proposto: Proposto {
                nome: d.nome.clone().unwrap_or_default(),
                cpf: d.cpf.clone().unwrap_or_default(),
                siape: d.siape.clone().unwrap_or_default(),
                orgao: Orgao { tipo: d.orgao_tipo, detalhe: d.orgao_detalhe.clone() },
            },
            afastamento: Afastamento {
                ida: vec![trecho(&d.ida)],
                retorno: vec![trecho(&d.retorno)],
            },
            atividades_desenvolvidas: d.atividades.clone().unwrap_or_default(),
            viagem_realizada: d.viagem_realizada,
            justificativa_prestacao_contas_fora_prazo: fora
                .then(|| d.justificativa.clone().unwrap_or_default()),
            flags: Flags { prestacao_contas_fora_prazo: fora },
        }
    }

    pub fn texto_resumo(&self) -> String {
        let p = self.payload();
        let ida = p.afastamento.ida.first().cloned().unwrap_or_default();
        let retorno = p.afastamento.retorno.first().cloned().unwrap_or_default();
        let data_hora = |v: &str| {
            let f = datas::formatar_data_hora_opt(Some(v));
            if f.is_empty() { "—".to_string() } else { f }
        };
        let data_relatorio = if p.data_relatorio.is_empty() {
            "—".to_string()
        } else {
            datas::formatar_data_br(&p.data_relatorio)
        };
        let orgao = match (p.proposto.orgao.tipo, p.proposto.orgao.detalhe.as_deref()) {
            (Some(t), Some(det)) => format!("{} ({})", t.as_str(), det),
            (Some(t), None) => t.as_str().to_string(),
            (None, _) => "—".to_string(),
        };

        format!(
            "Resumo:\n\
             • Proposto: {} | CPF: {} | SIAPE: {}\n\
             • Órgão: {}\n\
             • Data do relatório: {}\n\
             • Ida: {} → {} | {}\n\
             • Retorno: {} → {} | {}\n\
             • Viagem realizada: {}\n\
             \n\
             Ao aplicar, eu preencho o formulário manual e te levo para o início para revisão.",
            ou_traco(&p.proposto.nome),
            cpf::mascarar(&p.proposto.cpf),
            ou_traco(&p.proposto.siape),
            orgao,
            data_relatorio,
            ou_traco(&ida.origem),
            ou_traco(&ida.destino),
            data_hora(&ida.data_hora),
            ou_traco(&retorno.origem),
            ou_traco(&retorno.destino),
            data_hora(&retorno.data_hora),
            ou_traco(p.viagem_realizada.map(|v| v.as_str()).unwrap_or("")),
        )
    }
}
