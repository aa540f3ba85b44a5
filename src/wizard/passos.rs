// src/wizard/passos.rs
//
// Validação por passo do assistente e o painel de pendências.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::datas,
    models::anexo2::{Anexo2Payload, ViagemRealizada},
    services::{cpf, prazo},
    wizard::{
        campos::{Campo, CampoTrecho, Sentido},
        formulario::FormularioAnexo2,
    },
};

pub const TOTAL_PASSOS: u8 = 7;

pub const TITULOS: [&str; TOTAL_PASSOS as usize] = [
    "Data do relatório",
    "Proposto",
    "Afastamento",
    "Atividades",
    "Prazo",
    "Confirmação",
    "Revisão",
];

pub fn titulo(passo: u8) -> &'static str {
    TITULOS
        .get(usize::from(passo.saturating_sub(1)))
        .copied()
        .unwrap_or("")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResultadoPasso {
    pub ok: bool,
    #[serde(default)]
    pub mensagens: Vec<String>,
    /// Primeiro campo inválido (ou o primeiro faltando).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "proposto.cpf")]
    pub foco: Option<Campo>,
    /// Primeiro campo obrigatório vazio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "proposto.nome")]
    pub popup: Option<Campo>,
}

impl ResultadoPasso {
    fn ok() -> Self {
        Self { ok: true, mensagens: Vec::new(), foco: None, popup: None }
    }

    fn falha(mensagem: impl Into<String>, foco: Option<Campo>) -> Self {
        Self { ok: false, mensagens: vec![mensagem.into()], foco, popup: None }
    }
}

/// Campos do passo que estão na tela. O detalhe do órgão só aparece para
/// Projetos/Outros e a justificativa só quando fora do prazo.
pub fn campos_visiveis(form: &FormularioAnexo2, passo: u8) -> Vec<Campo> {
    form.campos()
        .into_iter()
        .filter(|c| c.passo() == passo)
        .filter(|c| match c {
            Campo::OrgaoDetalhe => form.detalhe_visivel(),
            Campo::Justificativa => form.justificativa_visivel(),
            _ => true,
        })
        .collect()
}

/// Problema de formato do campo, quando há.
fn problema(campo: Campo, valor: &str) -> Option<String> {
    if let Some((padrao, dica)) = campo.padrao() {
        if !padrao.is_match(valor) {
            return Some(dica.to_string());
        }
    }
    match campo {
        Campo::PropostoCpf if !cpf::is_cpf(valor) => {
            return Some("CPF inválido (dígitos não conferem).".into());
        }
        Campo::DataRelatorio if datas::parse_data_br(valor).is_none() => {
            return Some("use o formato dd/mm/aaaa.".into());
        }
        Campo::Trecho { campo: CampoTrecho::DataHora, .. } if datas::parse_data_hora(valor).is_none() => {
            return Some("data/hora inválida.".into());
        }
        _ => {}
    }
    match campo.minimo() {
        Some(min) if valor.chars().count() < min => Some(format!("mínimo de {min} caracteres.")),
        _ => None,
    }
}

pub fn validar_passo(form: &FormularioAnexo2, passo: u8) -> ResultadoPasso {
    let mut faltando: Vec<Campo> = Vec::new();
    let mut invalidos: Vec<(Campo, String)> = Vec::new();

    for campo in campos_visiveis(form, passo) {
        let valor = form.valor(campo);
        let valor = valor.trim();
        if valor.is_empty() {
            if campo.obrigatorio() {
                faltando.push(campo);
            }
            continue;
        }
        if let Some(dica) = problema(campo, valor) {
            invalidos.push((campo, dica));
        }
    }

    if !faltando.is_empty() || !invalidos.is_empty() {
        let mut mensagens = Vec::new();
        if !faltando.is_empty() {
            let rotulos: Vec<String> = faltando.iter().map(Campo::rotulo).collect();
            mensagens.push(format!("Preencha os campos obrigatórios: {}.", rotulos.join(", ")));
        }
        if !invalidos.is_empty() {
            let itens: Vec<String> = invalidos
                .iter()
                .map(|(c, dica)| format!("{} — {}", c.rotulo(), dica))
                .collect();
            mensagens.push(format!("Revise os campos: {}.", itens.join(" | ")));
        }
        let popup = faltando.first().copied();
        let foco = invalidos.first().map(|(c, _)| *c).or(popup);
        return ResultadoPasso { ok: false, mensagens, foco, popup };
    }

    match passo {
        3 => {
            if let (Some(ida), Some(retorno)) = form.limites() {
                if retorno < ida {
                    let indice = form.retorno.len().saturating_sub(1);
                    return ResultadoPasso::falha(
                        "A data/hora de retorno não pode ser anterior à ida.",
                        Some(Campo::Trecho {
                            sentido: Sentido::Retorno,
                            indice,
                            campo: CampoTrecho::DataHora,
                        }),
                    );
                }
            }
        }
        5 => {
            if form.fora_do_prazo && form.justificativa.trim().chars().count() < 10 {
                return ResultadoPasso::falha(
                    "Prestação de contas fora do prazo. Informe a justificativa.",
                    Some(Campo::Justificativa),
                );
            }
        }
        _ => {}
    }
    ResultadoPasso::ok()
}

/// Primeiro passo (de 1 a 6) que não passa na validação.
pub fn primeiro_passo_invalido(form: &FormularioAnexo2) -> Option<(u8, ResultadoPasso)> {
    (1..TOTAL_PASSOS)
        .map(|p| (p, validar_passo(form, p)))
        .find(|(_, r)| !r.ok)
}

// --- Painel de pendências ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pendencia {
    pub mensagem: String,
    pub campos: Vec<String>,
}

impl Pendencia {
    fn new(mensagem: impl Into<String>, campos: &[&str]) -> Self {
        Self {
            mensagem: mensagem.into(),
            campos: campos.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Regras de negócio conferidas no cliente sobre o payload completo.
pub fn validar_payload(payload: &Anexo2Payload, prazo_dias: u32) -> Vec<Pendencia> {
    let mut pendencias = Vec::new();
    let afastamento = &payload.afastamento;

    let ida = afastamento.primeira_ida().and_then(datas::parse_data_hora);
    let retorno = afastamento.ultimo_retorno().and_then(datas::parse_data_hora);
    if let (Some(ida), Some(retorno)) = (ida, retorno) {
        if retorno < ida {
            pendencias.push(Pendencia::new(
                "Retorno não pode ser anterior à ida.",
                &["afastamento.ida.data_hora", "afastamento.retorno.data_hora"],
            ));
        }
    }

    let fora = prazo::fora_do_prazo_texto(
        afastamento.ultimo_retorno(),
        Some(payload.data_relatorio.as_str()),
        prazo_dias,
    )
    .unwrap_or(false);
    let justificativa = payload
        .justificativa_prestacao_contas_fora_prazo
        .as_deref()
        .map(str::trim)
        .unwrap_or("");
    if fora && justificativa.chars().count() < 10 {
        pendencias.push(Pendencia::new(
            format!(
                "Relatório fora do prazo (mais de {prazo_dias} dias após o retorno). Informe a justificativa."
            ),
            &[
                "data_relatorio",
                "justificativa_prestacao_contas_fora_prazo",
                "afastamento.retorno.data_hora",
            ],
        ));
    }

    let atividades_curtas = payload.atividades_desenvolvidas.trim().chars().count() < 10;
    if payload.viagem_realizada == Some(ViagemRealizada::Nao) && atividades_curtas {
        pendencias.push(Pendencia::new(
            "Viagem marcada como NÃO realizada, mas falta descrição/motivo em 'atividades_desenvolvidas'.",
            &["viagem_realizada", "atividades_desenvolvidas"],
        ));
    }
    if atividades_curtas {
        pendencias.push(Pendencia::new(
            "Atividades desenvolvidas muito curto. Descreva de forma objetiva.",
            &["atividades_desenvolvidas"],
        ));
    }

    let cpf_informado = payload.proposto.cpf.trim();
    if !cpf_informado.is_empty() && !cpf::is_cpf(cpf_informado) {
        pendencias.push(Pendencia::new("CPF inválido.", &["proposto.cpf"]));
    }

    let orgao = &payload.proposto.orgao;
    if orgao.tipo.is_some_and(|t| t.exige_detalhe()) && orgao.detalhe_limpo().chars().count() < 2 {
        pendencias.push(Pendencia::new(
            "Informe o detalhe do órgão para Projetos/Outros.",
            &["proposto.orgao.detalhe"],
        ));
    }

    pendencias
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::anexo2::TipoOrgao;
    use crate::wizard::formulario::CartaoTrecho;

    fn form_valido() -> FormularioAnexo2 {
        let mut form = FormularioAnexo2::default();
        form.definir_data_exibida("10/03/2024");
        form.nome = "Maria da Silva".into();
        form.cpf = "52998224725".into();
        form.siape = "1234567".into();
        form.definir_orgao_tipo(Some(TipoOrgao::Cchsa));
        form.ida = vec![CartaoTrecho {
            origem_cidade: "Bananeiras".into(),
            origem_uf: "PB".into(),
            destino_cidade: "Recife".into(),
            destino_uf: "PE".into(),
            data_hora: "2024-03-05T08:00".into(),
        }];
        form.retorno = vec![CartaoTrecho {
            origem_cidade: "Recife".into(),
            origem_uf: "PE".into(),
            destino_cidade: "Bananeiras".into(),
            destino_uf: "PB".into(),
            data_hora: "2024-03-07T18:00".into(),
        }];
        form.atividades = "Reunião técnica com a equipe do projeto.".into();
        form.viagem_realizada = Some(ViagemRealizada::Sim);
        form.refresh_flags();
        form
    }

    #[test]
    fn formulario_valido_passa_em_todos_os_passos() {
        let form = form_valido();
        assert_eq!(primeiro_passo_invalido(&form), None);
        assert_eq!(titulo(7), "Revisão");
        assert_eq!(titulo(0), "Data do relatório");
    }

    #[test]
    fn faltando_e_invalidos_no_passo_dois() {
        let mut form = form_valido();
        form.nome.clear();
        form.cpf = "5299822472".into();
        form.siape = "12".into();

        let r = validar_passo(&form, 2);
        assert!(!r.ok);
        assert_eq!(r.mensagens[0], "Preencha os campos obrigatórios: Nome completo.");
        assert_eq!(
            r.mensagens[1],
            "Revise os campos: CPF — Use 11 dígitos numéricos (somente números). \
             | SIAPE — Use apenas números (4 a 15 dígitos)."
        );
        assert_eq!(r.popup, Some(Campo::PropostoNome));
        assert_eq!(r.foco, Some(Campo::PropostoCpf));
    }

    #[test]
    fn cpf_com_digitos_errados() {
        let mut form = form_valido();
        form.cpf = "52998224724".into();
        let r = validar_passo(&form, 2);
        assert_eq!(r.mensagens, vec!["Revise os campos: CPF — CPF inválido (dígitos não conferem).".to_string()]);
    }

    #[test]
    fn detalhe_do_orgao_so_conta_quando_visivel() {
        let mut form = form_valido();
        assert!(!campos_visiveis(&form, 2).contains(&Campo::OrgaoDetalhe));

        form.definir_orgao_tipo(Some(TipoOrgao::Outros));
        let r = validar_passo(&form, 2);
        assert_eq!(r.popup, Some(Campo::OrgaoDetalhe));
    }

    #[test]
    fn data_do_relatorio_inexistente() {
        let mut form = form_valido();
        form.definir_data_exibida("30/02/2024");
        let r = validar_passo(&form, 1);
        assert_eq!(r.mensagens, vec!["Revise os campos: Data do relatório — use o formato dd/mm/aaaa.".to_string()]);
    }

    #[test]
    fn retorno_antes_da_ida() {
        let mut form = form_valido();
        form.retorno[0].data_hora = "2024-03-04T18:00".into();
        let r = validar_passo(&form, 3);
        assert_eq!(r.mensagens, vec!["A data/hora de retorno não pode ser anterior à ida.".to_string()]);
        assert_eq!(primeiro_passo_invalido(&form).map(|(p, _)| p), Some(3));
    }

    #[test]
    fn uf_invalida_no_cartao() {
        let mut form = form_valido();
        form.ida[0].destino_uf = "PER".into();
        let r = validar_passo(&form, 3);
        assert_eq!(
            r.foco,
            Some(Campo::Trecho { sentido: Sentido::Ida, indice: 0, campo: CampoTrecho::DestinoUf })
        );
    }

    #[test]
    fn justificativa_exigida_quando_fora_do_prazo() {
        let mut form = form_valido();
        form.definir_data_exibida("20/03/2024");
        assert!(form.fora_do_prazo);
        let r = validar_passo(&form, 5);
        assert_eq!(r.popup, Some(Campo::Justificativa));

        form.justificativa = "curta".into();
        let r = validar_passo(&form, 5);
        assert_eq!(
            r.mensagens,
            vec!["Revise os campos: Justificativa (fora do prazo) — mínimo de 10 caracteres.".to_string()]
        );

        form.justificativa = "Atraso na entrega dos comprovantes.".into();
        assert!(validar_passo(&form, 5).ok);
    }

    #[test]
    fn painel_de_pendencias() {
        let mut payload = form_valido().to_payload();
        assert!(validar_payload(&payload, 5).is_empty());

        payload.data_relatorio = "2024-03-20".into();
        payload.viagem_realizada = Some(ViagemRealizada::Nao);
        payload.atividades_desenvolvidas = "".into();
        payload.proposto.cpf = "11111111111".into();
        payload.proposto.orgao.tipo = Some(TipoOrgao::Projetos);

        let mensagens: Vec<String> = validar_payload(&payload, 5).into_iter().map(|p| p.mensagem).collect();
        assert_eq!(
            mensagens,
            vec![
                "Relatório fora do prazo (mais de 5 dias após o retorno). Informe a justificativa.",
                "Viagem marcada como NÃO realizada, mas falta descrição/motivo em 'atividades_desenvolvidas'.",
                "Atividades desenvolvidas muito curto. Descreva de forma objetiva.",
                "CPF inválido.",
                "Informe o detalhe do órgão para Projetos/Outros.",
            ]
        );
    }

    #[test]
    fn pendencias_marcam_os_campos_envolvidos() {
        let mut payload = form_valido().to_payload();
        payload.data_relatorio = "2024-03-20".into();
        payload.viagem_realizada = Some(ViagemRealizada::Nao);
        payload.atividades_desenvolvidas = "curto".into();

        let pendencias = validar_payload(&payload, 5);
        assert_eq!(
            pendencias[0].campos,
            vec![
                "data_relatorio",
                "justificativa_prestacao_contas_fora_prazo",
                "afastamento.retorno.data_hora",
            ]
        );
        assert_eq!(pendencias[1].campos, vec!["viagem_realizada", "atividades_desenvolvidas"]);
        assert_eq!(pendencias[2].campos, vec!["atividades_desenvolvidas"]);
        assert_eq!(pendencias.len(), 3);
    }

    #[test]
    fn detalhe_do_orgao_com_um_caractere_e_pendencia() {
        let mut payload = form_valido().to_payload();
        payload.proposto.orgao.tipo = Some(TipoOrgao::Outros);
        payload.proposto.orgao.detalhe = Some("X".into());
        let pendencias = validar_payload(&payload, 5);
        assert_eq!(pendencias.len(), 1);
        assert_eq!(pendencias[0].campos, vec!["proposto.orgao.detalhe"]);

        payload.proposto.orgao.detalhe = Some("Reitoria".into());
        assert!(validar_payload(&payload, 5).is_empty());
    }
}
