// src/services/placeholders.rs
//
// Valores que vão para o documento final. Chaves iguais às do modelo oficial
// do ANEXO II, todas como texto.

use std::collections::BTreeMap;

use crate::common::datas;
use crate::models::anexo2::{
    Anexo2Payload, Flags, LinhaTrecho, LinhasTrechos, TipoOrgao, Trecho, ViagemRealizada,
};

fn x(marcado: bool) -> String {
    if marcado { "X".to_string() } else { String::new() }
}

fn coluna<F>(trechos: &[Trecho], campo: F) -> String
where
    F: Fn(&Trecho) -> String,
{
    trechos.iter().map(campo).collect::<Vec<_>>().join("\n")
}

pub fn montar_placeholders(payload: &Anexo2Payload, flags: &Flags) -> BTreeMap<String, String> {
    let proposto = &payload.proposto;
    let tipo = proposto.orgao.tipo;
    let detalhe = proposto.orgao.detalhe_limpo().to_string();
    let afast = &payload.afastamento;

    let justificativa = if flags.prestacao_contas_fora_prazo {
        payload
            .justificativa_prestacao_contas_fora_prazo
            .clone()
            .unwrap_or_default()
    } else {
        String::new()
    };

    let pares = [
        ("data_relatorio", datas::formatar_data_br(&payload.data_relatorio)),
        ("nome", proposto.nome.clone()),
        ("cpf", proposto.cpf.clone()),
        ("siape", proposto.siape.clone()),
        ("chk_orgao_cchsa", x(tipo == Some(TipoOrgao::Cchsa))),
        ("chk_orgao_cavn", x(tipo == Some(TipoOrgao::Cavn))),
        ("chk_orgao_projetos", x(tipo == Some(TipoOrgao::Projetos))),
        ("chk_orgao_outros", x(tipo == Some(TipoOrgao::Outros))),
        (
            "orgao_projetos",
            if tipo == Some(TipoOrgao::Projetos) { detalhe.clone() } else { String::new() },
        ),
        (
            "orgao_outros",
            if tipo == Some(TipoOrgao::Outros) { detalhe } else { String::new() },
        ),
        ("ida_origem", coluna(&afast.ida, |t| t.origem.clone())),
        ("ida_destino", coluna(&afast.ida, |t| t.destino.clone())),
        (
            "ida_data_hora",
            coluna(&afast.ida, |t| datas::formatar_data_hora_opt(Some(&t.data_hora))),
        ),
        ("retorno_origem", coluna(&afast.retorno, |t| t.origem.clone())),
        ("retorno_destino", coluna(&afast.retorno, |t| t.destino.clone())),
        (
            "retorno_data_hora",
            coluna(&afast.retorno, |t| datas::formatar_data_hora_opt(Some(&t.data_hora))),
        ),
        ("atividades_desenvolvidas", payload.atividades_desenvolvidas.clone()),
        ("justificativa_prestacao_contas_fora_prazo", justificativa),
        (
            "chk_viagem_realizada_sim",
            x(payload.viagem_realizada == Some(ViagemRealizada::Sim)),
        ),
        (
            "chk_viagem_realizada_nao",
            x(payload.viagem_realizada == Some(ViagemRealizada::Nao)),
        ),
    ];

    pares.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Uma linha da tabela do documento por trecho.
pub fn montar_linhas(ida: &[Trecho], retorno: &[Trecho]) -> LinhasTrechos {
    let linha = |t: &Trecho| LinhaTrecho {
        origem: t.origem.clone(),
        destino: t.destino.clone(),
        data_hora: datas::formatar_data_hora_opt(Some(&t.data_hora)),
    };
    LinhasTrechos {
        ida: ida.iter().map(linha).collect(),
        retorno: retorno.iter().map(linha).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::anexo2::{Afastamento, Orgao, Proposto};

    fn trecho(o: &str, d: &str, dh: &str) -> Trecho {
        Trecho { origem: o.into(), destino: d.into(), data_hora: dh.into() }
    }

    #[test]
    fn marca_orgao_e_junta_trechos_por_linha() {
        let payload = Anexo2Payload {
            data_relatorio: "2024-02-10".into(),
            proposto: Proposto {
                nome: "Maria".into(),
                cpf: "52998224725".into(),
                siape: "1234567".into(),
                orgao: Orgao { tipo: Some(TipoOrgao::Projetos), detalhe: Some("  PIBIC ".into()) },
            },
            afastamento: Afastamento {
                ida: vec![
                    trecho("João Pessoa/PB", "Recife/PE", "2024-02-01T08:00:00"),
                    trecho("Recife/PE", "Natal/RN", "2024-02-02T09:15:00"),
                ],
                retorno: vec![trecho("Natal/RN", "João Pessoa/PB", "2024-02-04T18:00:00")],
            },
            atividades_desenvolvidas: "Reunião técnica".into(),
            viagem_realizada: Some(ViagemRealizada::Sim),
            justificativa_prestacao_contas_fora_prazo: Some("atraso".into()),
            flags: Flags::default(),
        };

        let ph = montar_placeholders(&payload, &payload.flags);
        assert_eq!(ph["data_relatorio"], "10/02/2024");
        assert_eq!(ph["chk_orgao_projetos"], "X");
        assert_eq!(ph["chk_orgao_cchsa"], "");
        assert_eq!(ph["orgao_projetos"], "PIBIC");
        assert_eq!(ph["orgao_outros"], "");
        assert_eq!(ph["ida_destino"], "Recife/PE\nNatal/RN");
        assert_eq!(ph["ida_data_hora"], "01/02/2024 08:00\n02/02/2024 09:15");
        assert_eq!(ph["chk_viagem_realizada_sim"], "X");
        // justificativa só aparece quando fora do prazo
        assert_eq!(ph["justificativa_prestacao_contas_fora_prazo"], "");

        let linhas = montar_linhas(&payload.afastamento.ida, &payload.afastamento.retorno);
        assert_eq!(linhas.ida.len(), 2);
        assert_eq!(linhas.retorno[0].data_hora, "04/02/2024 18:00");
    }
}
