// src/services/anexo1_import.rs
//
// Lê um Anexo I preenchido (PDF/DOCX/DOC) e monta o pré-preenchimento do
// Anexo II. Só vai para o prefill o que foi de fato encontrado no texto.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    common::{datas, error::AppError},
    models::{
        anexo1::{
            Anexo1Extraido, Anexo2Prefill, PrefillAfastamento, PrefillOrgao, PrefillProposto,
            PrefillResponse, PrefillTrecho, TrechoExtraido,
        },
        anexo2::{TipoOrgao, ViagemRealizada},
    },
    services::{
        cpf::only_digits,
        texto_documento::{self, TipoArquivo},
    },
};

fn re(padrao: &str) -> Regex {
    Regex::new(padrao).unwrap_or_else(|e| panic!("regex do Anexo I inválida ({padrao}): {e}"))
}

// Blocos do formulário (do título da seção até o título seguinte)
static BLOCO_IDENTIFICACAO: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?is)IDENTIFICAÇ[ÃA]O\s*(.*?)DESCRIÇ[ÃA]O DO MOTIVO DA VIAGEM:"));
static BLOCO_MOTIVO: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?is)DESCRIÇ[ÃA]O DO MOTIVO DA VIAGEM:\s*(.*?)DESTINO\s*\(Ida\):"));
static BLOCO_IDA: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?is)DESTINO\s*\(Ida\):\s*(.*?)DESTINO\s*\(Retorno\):"));
static BLOCO_RETORNO: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?is)DESTINO\s*\(Retorno\):\s*(.*?)DATA/HORA DA MISS[ÃA]O:"));
static BLOCO_MISSAO: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?is)DATA/HORA DA MISS[ÃA]O:\s*(.*?)D[ÉE]BITO DO RECURSO:"));
static BLOCO_DEBITO: LazyLock<Regex> = LazyLock::new(|| re(r"(?is)D[ÉE]BITO DO RECURSO:\s*(.*)$"));

// Campos da identificação (uma linha cada)
static NOME: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)Nome completo:\s*(.+)"));
static CPF: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)CPF:\s*([0-9.\-]{11,14}|\d{11})"));
static SIAPE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)Siape:\s*(\d+)"));

static TRECHO: LazyLock<Regex> = LazyLock::new(|| {
    re(concat!(
        r"(?is)Local\s+de\s+Origem:\s*(?P<origem>.*?)\s*",
        r"Local\s+de\s+Destino:\s*(?P<destino>.*?)\s*",
        r"Data\s*/?\s*Hora:\s*(?P<datahora>[0-3]\d/[0-1]\d/\d{4}\s+\d{2}:\d{2})"
    ))
});
static ORIGEM_LINHA: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)Local\s+de\s+Origem:\s*(.+)"));
static DESTINO_LINHA: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)Local\s+de\s+Destino:\s*(.+)"));
static DATA_HORA: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?is)Data\s*/?\s*Hora:\s*([0-3]\d/[0-1]\d/\d{4}\s+\d{2}:\d{2})"));

static MISSAO_INICIO: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?is)Data/Hora In[ií]cio:\s*([0-3]\d/[0-1]\d/\d{4}\s+\d{2}:\d{2})"));
static MISSAO_TERMINO: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?is)Data/Hora T[eé]rmino:\s*([0-3]\d/[0-1]\d/\d{4}\s+\d{2}:\d{2})"));

// Débito do recurso: caixa marcada com X
static DEBITO_CCHSA: LazyLock<Regex> = LazyLock::new(|| re(r"\(\s*[xX]\s*\)\s*CCHSA\b"));
static DEBITO_CAVN: LazyLock<Regex> = LazyLock::new(|| re(r"\(\s*[xX]\s*\)\s*CAVN\b"));
static DEBITO_PROJETO: LazyLock<Regex> = LazyLock::new(|| re(r"\(\s*[xX]\s*\)\s*PROJETO\b"));
static DEBITO_OUTROS_MARCADO: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\(\s*[xX]\s*\)\s*Outros:\s*(.+)"));
static DEBITO_OUTROS: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)Outros:[ \t]*(.+)"));

static CERQUILHAS_FINAIS: LazyLock<Regex> = LazyLock::new(|| re(r"\s*#+\s*$"));

/// Primeiro grupo do padrão, sem espaços nas pontas; vazio conta como ausente.
fn capturar(padrao: &Regex, texto: &str) -> Option<String> {
    padrao
        .captures(texto)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn bloco<'a>(padrao: &Regex, texto: &'a str) -> &'a str {
    padrao
        .captures(texto)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or("")
}

fn extrair_trecho(bloco: &str) -> TrechoExtraido {
    if let Some(c) = TRECHO.captures(bloco) {
        let campo = |nome: &str| {
            c.name(nome)
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        };
        return TrechoExtraido {
            local_origem: campo("origem"),
            local_destino: campo("destino"),
            data_hora: campo("datahora"),
        };
    }
    // Layout fora do padrão: cada rótulo isolado
    TrechoExtraido {
        local_origem: capturar(&ORIGEM_LINHA, bloco),
        local_destino: capturar(&DESTINO_LINHA, bloco),
        data_hora: capturar(&DATA_HORA, bloco),
    }
}

/// "CCHSA", "CAVN", "PROJETO" ou "OUTROS[: detalhe]", conforme a caixa marcada.
fn extrair_debito(bloco: &str) -> Option<String> {
    if DEBITO_CCHSA.is_match(bloco) {
        return Some("CCHSA".into());
    }
    if DEBITO_CAVN.is_match(bloco) {
        return Some("CAVN".into());
    }
    if DEBITO_PROJETO.is_match(bloco) {
        return Some("PROJETO".into());
    }
    if let Some(c) = DEBITO_OUTROS_MARCADO.captures(bloco) {
        let valor = c.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        return Some(if valor.is_empty() { "OUTROS".into() } else { format!("OUTROS: {valor}") });
    }
    capturar(&DEBITO_OUTROS, bloco).map(|v| format!("OUTROS: {v}"))
}

/// Extrai os campos do texto já normalizado.
pub fn extrair_campos(texto: &str) -> Anexo1Extraido {
    let identificacao = bloco(&BLOCO_IDENTIFICACAO, texto);
    let missao = bloco(&BLOCO_MISSAO, texto);

    Anexo1Extraido {
        nome_completo: capturar(&NOME, identificacao),
        cpf: capturar(&CPF, identificacao),
        siape: capturar(&SIAPE, identificacao),
        motivo_viagem: Some(bloco(&BLOCO_MOTIVO, texto).to_string()).filter(|s| !s.is_empty()),
        ida: extrair_trecho(bloco(&BLOCO_IDA, texto)),
        retorno: extrair_trecho(bloco(&BLOCO_RETORNO, texto)),
        missao_inicio: capturar(&MISSAO_INICIO, missao),
        missao_termino: capturar(&MISSAO_TERMINO, missao),
        debito_recurso: extrair_debito(bloco(&BLOCO_DEBITO, texto)),
    }
}

fn mapear_orgao(debito: Option<&str>) -> Option<PrefillOrgao> {
    let debito = debito?;
    let maiusculo = debito.to_uppercase();
    let tipo = if maiusculo.starts_with("CCHSA") {
        TipoOrgao::Cchsa
    } else if maiusculo.starts_with("CAVN") {
        TipoOrgao::Cavn
    } else if maiusculo.starts_with("PROJETO") {
        TipoOrgao::Projetos
    } else if maiusculo.starts_with("OUTROS") {
        let detalhe = debito
            .split_once(':')
            .map(|(_, d)| d.trim().to_string())
            .filter(|d| !d.is_empty());
        return Some(PrefillOrgao { tipo: TipoOrgao::Outros, detalhe });
    } else {
        return None;
    };
    Some(PrefillOrgao { tipo, detalhe: None })
}

fn digitos(valor: Option<&str>) -> Option<String> {
    valor.map(only_digits).filter(|d| !d.is_empty())
}

fn trecho_prefill(trecho: &TrechoExtraido, reserva: Option<&str>) -> Option<PrefillTrecho> {
    let data_hora = trecho
        .data_hora
        .as_deref()
        .and_then(datas::parse_data_hora_br)
        .or_else(|| reserva.and_then(datas::parse_data_hora_br));
    let t = PrefillTrecho {
        origem: trecho.local_origem.clone(),
        destino: trecho.local_destino.clone(),
        data_hora,
    };
    (t != PrefillTrecho::default()).then_some(t)
}

/// Converte o que foi extraído no formato do payload do Anexo II.
/// Datas sem hora do trecho caem para o início/término da missão.
pub fn montar_prefill(extraido: &Anexo1Extraido) -> Anexo2Prefill {
    let proposto = PrefillProposto {
        nome: extraido.nome_completo.clone(),
        cpf: digitos(extraido.cpf.as_deref()),
        siape: digitos(extraido.siape.as_deref()),
        orgao: mapear_orgao(extraido.debito_recurso.as_deref()),
    };
    let afastamento = PrefillAfastamento {
        ida: trecho_prefill(&extraido.ida, extraido.missao_inicio.as_deref()),
        retorno: trecho_prefill(&extraido.retorno, extraido.missao_termino.as_deref()),
    };
    let atividades = extraido
        .motivo_viagem
        .as_deref()
        .map(|m| CERQUILHAS_FINAIS.replace(m, "").trim().to_string())
        .filter(|m| !m.is_empty());

    Anexo2Prefill {
        proposto: (proposto != PrefillProposto::default()).then_some(proposto),
        afastamento: (afastamento != PrefillAfastamento::default()).then_some(afastamento),
        atividades_desenvolvidas: atividades,
        // O Anexo I não diz se a viagem aconteceu; assume-se que sim
        viagem_realizada: Some(ViagemRealizada::Sim),
    }
}

/// Avisos para o usuário revisar o que não veio do documento.
pub fn avisos(prefill: &Anexo2Prefill) -> Vec<String> {
    let mut avisos = Vec::new();
    let proposto = prefill.proposto.clone().unwrap_or_default();
    let afastamento = prefill.afastamento.clone().unwrap_or_default();

    if proposto.nome.is_none() {
        avisos.push("Nome do proposto não identificado no Anexo I.");
    }
    if proposto.cpf.is_none() {
        avisos.push("CPF não identificado ou ilegível no Anexo I.");
    }
    if proposto.siape.is_none() {
        avisos.push("SIAPE não encontrado no Anexo I.");
    }
    match &proposto.orgao {
        None => avisos.push("Órgão (débito do recurso) não localizado; selecione manualmente."),
        Some(orgao) if orgao.tipo.exige_detalhe() && orgao.detalhe.is_none() => {
            avisos.push("Detalhe do órgão para Projetos/Outros não foi identificado.")
        }
        Some(_) => {}
    }

    let ida = afastamento.ida.unwrap_or_default();
    let retorno = afastamento.retorno.unwrap_or_default();
    if ida.origem.is_none() || ida.destino.is_none() {
        avisos.push("Trecho de ida incompleto; revise origem/destino.");
    }
    if retorno.origem.is_none() || retorno.destino.is_none() {
        avisos.push("Trecho de retorno incompleto; revise origem/destino.");
    }
    if ida.data_hora.is_none() || retorno.data_hora.is_none() {
        avisos.push("Datas/horários não foram lidos; informe manualmente.");
    }
    if prefill.atividades_desenvolvidas.is_none() {
        avisos.push("Motivo/atividades não encontrados; escreva o relatório.");
    }

    avisos.into_iter().map(String::from).collect()
}

#[derive(Clone)]
pub struct Anexo1ImportService {
    soffice_bin: String,
}

impl Anexo1ImportService {
    pub fn new(soffice_bin: String) -> Self {
        Self { soffice_bin }
    }

    pub async fn importar(&self, nome_arquivo: Option<String>, bytes: Vec<u8>) -> Result<PrefillResponse, AppError> {
        let nome = nome_arquivo.filter(|n| !n.trim().is_empty()).ok_or_else(|| {
            AppError::ArquivoInvalido("Envie o arquivo do Anexo I preenchido em PDF, DOC ou DOCX.".into())
        })?;
        let tipo = TipoArquivo::from_nome(&nome).ok_or_else(|| {
            AppError::ArquivoInvalido("Formato não suportado. Use PDF, DOC ou DOCX do Anexo I.".into())
        })?;
        if bytes.is_empty() {
            return Err(AppError::ArquivoInvalido(
                "Arquivo vazio. Verifique se o Anexo I foi exportado corretamente.".into(),
            ));
        }

        let texto = match texto_documento::extrair_texto(tipo, bytes, &self.soffice_bin).await {
            Ok(texto) => texto,
            Err(e @ AppError::ArquivoInvalido(_)) => return Err(e),
            Err(e) => {
                tracing::error!("Falha ao extrair texto do Anexo I {}: {}", nome, e);
                return Err(AppError::ArquivoInvalido(
                    "Não foi possível extrair dados do Anexo I. Confirme se o arquivo está legível.".into(),
                ));
            }
        };

        let extraido = extrair_campos(&texto);
        if extraido.vazio() {
            return Err(AppError::ArquivoInvalido("Não foi possível interpretar o documento.".into()));
        }

        let prefill = montar_prefill(&extraido);
        let warnings = avisos(&prefill);
        tracing::info!("📥 Anexo I importado ({}), {} aviso(s)", nome, warnings.len());

        Ok(PrefillResponse { ok: true, prefill, warnings, filename: Some(nome) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANEXO1: &str = "ANEXO I
SOLICITAÇÃO DE DIÁRIAS
IDENTIFICAÇÃO
Nome completo: Maria da Silva
Cargo ou Função que Ocupa: Professora
CPF: 529.982.247-25 RG: 1234567
Data de Nascimento: 01/01/1980 Siape: 1234567
DESCRIÇÃO DO MOTIVO DA VIAGEM:
Participar do congresso de extensão rural. ###
DESTINO (Ida):
Local de Origem: Bananeiras/PB Local de Destino: Recife/PE Data/Hora: 05/03/2024 08:00
DESTINO (Retorno):
Local de Origem: Recife/PE
Local de Destino: Bananeiras/PB
Data/Hora:
DATA/HORA DA MISSÃO:
Data/Hora Início: 05/03/2024 08:00 Data/Hora Término: 08/03/2024 18:30
DÉBITO DO RECURSO:
( ) CCHSA ( ) CAVN ( ) PROJETO (X) Outros: Reitoria";

    #[test]
    fn extrai_campos_do_texto() {
        let e = extrair_campos(ANEXO1);
        assert_eq!(e.nome_completo.as_deref(), Some("Maria da Silva"));
        assert_eq!(e.cpf.as_deref(), Some("529.982.247-25"));
        assert_eq!(e.siape.as_deref(), Some("1234567"));
        assert_eq!(e.ida.local_origem.as_deref(), Some("Bananeiras/PB"));
        assert_eq!(e.ida.local_destino.as_deref(), Some("Recife/PE"));
        assert_eq!(e.ida.data_hora.as_deref(), Some("05/03/2024 08:00"));
        assert_eq!(e.retorno.local_origem.as_deref(), Some("Recife/PE"));
        assert_eq!(e.retorno.data_hora, None);
        assert_eq!(e.missao_termino.as_deref(), Some("08/03/2024 18:30"));
        assert_eq!(e.debito_recurso.as_deref(), Some("OUTROS: Reitoria"));
    }

    #[test]
    fn monta_prefill_com_reserva_da_missao() {
        let prefill = montar_prefill(&extrair_campos(ANEXO1));
        let proposto = prefill.proposto.clone().unwrap();
        assert_eq!(proposto.cpf.as_deref(), Some("52998224725"));
        assert_eq!(
            proposto.orgao,
            Some(PrefillOrgao { tipo: TipoOrgao::Outros, detalhe: Some("Reitoria".into()) })
        );

        let afast = prefill.afastamento.clone().unwrap();
        assert_eq!(afast.ida.unwrap().data_hora.as_deref(), Some("2024-03-05T08:00"));
        // sem data no trecho de retorno: usa o término da missão
        assert_eq!(afast.retorno.unwrap().data_hora.as_deref(), Some("2024-03-08T18:30"));

        assert_eq!(
            prefill.atividades_desenvolvidas.as_deref(),
            Some("Participar do congresso de extensão rural.")
        );
        assert_eq!(prefill.viagem_realizada, Some(ViagemRealizada::Sim));
        assert!(avisos(&prefill).is_empty());
    }

    #[test]
    fn mapeia_debito_do_recurso() {
        assert_eq!(extrair_debito("(X) CCHSA ( ) CAVN").as_deref(), Some("CCHSA"));
        assert_eq!(extrair_debito("( ) CCHSA ( x ) CAVN").as_deref(), Some("CAVN"));
        assert_eq!(extrair_debito("(X) PROJETO").as_deref(), Some("PROJETO"));
        assert_eq!(extrair_debito("( ) CCHSA"), None);

        assert_eq!(mapear_orgao(Some("PROJETO")).map(|o| o.tipo), Some(TipoOrgao::Projetos));
        assert_eq!(mapear_orgao(Some("OUTROS")).and_then(|o| o.detalhe), None);
        assert_eq!(mapear_orgao(Some("Reitoria")), None);
    }

    #[test]
    fn avisa_o_que_faltou() {
        let prefill = montar_prefill(&extrair_campos("IDENTIFICAÇÃO\nNome completo: José\nDESCRIÇÃO DO MOTIVO DA VIAGEM:\n"));
        let avisos = avisos(&prefill);
        assert!(avisos.contains(&"CPF não identificado ou ilegível no Anexo I.".to_string()));
        assert!(avisos.contains(&"Órgão (débito do recurso) não localizado; selecione manualmente.".to_string()));
        assert!(avisos.contains(&"Datas/horários não foram lidos; informe manualmente.".to_string()));
        assert!(avisos.contains(&"Motivo/atividades não encontrados; escreva o relatório.".to_string()));
        assert!(!avisos.iter().any(|a| a.starts_with("Nome")));
    }

    #[tokio::test]
    async fn rejeita_arquivo_sem_nome_formato_ou_conteudo() {
        let service = Anexo1ImportService::new("soffice".into());

        let err = service.importar(None, vec![1]).await.unwrap_err();
        assert!(matches!(err, AppError::ArquivoInvalido(m) if m.starts_with("Envie o arquivo")));

        let err = service.importar(Some("anexo1.odt".into()), vec![1]).await.unwrap_err();
        assert!(matches!(err, AppError::ArquivoInvalido(m) if m.starts_with("Formato não suportado")));

        let err = service.importar(Some("anexo1.pdf".into()), vec![]).await.unwrap_err();
        assert!(matches!(err, AppError::ArquivoInvalido(m) if m.starts_with("Arquivo vazio")));
    }
}
