// src/wizard/resumo.rs
//
// Texto do passo de revisão.

use crate::{
    common::datas,
    models::anexo2::{Anexo2Payload, Trecho},
    wizard::formulario::FormularioAnexo2,
};

fn ou_traco(valor: &str) -> &str {
    if valor.trim().is_empty() { "—" } else { valor }
}

fn linhas_trechos(trechos: &[Trecho]) -> Vec<String> {
    let validos: Vec<&Trecho> = trechos
        .iter()
        .filter(|t| !(t.origem.is_empty() && t.destino.is_empty() && t.data_hora.is_empty()))
        .collect();
    if validos.is_empty() {
        return vec!["—".to_string()];
    }
    validos
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let dh = datas::formatar_data_hora_opt(Some(t.data_hora.as_str()));
            format!(
                "{}) {} → {} | {}",
                i + 1,
                ou_traco(&t.origem),
                ou_traco(&t.destino),
                ou_traco(&dh)
            )
        })
        .collect()
}

/// Resumo legível do payload, na ordem dos passos.
pub fn texto_revisao(p: &Anexo2Payload) -> String {
    let data = if p.data_relatorio.is_empty() {
        String::new()
    } else {
        datas::formatar_data_br(&p.data_relatorio)
    };
    let orgao = &p.proposto.orgao;
    let orgao = match (orgao.tipo, orgao.detalhe_limpo()) {
        (Some(t), "") => t.as_str().to_string(),
        (Some(t), det) => format!("{} ({})", t.as_str(), det),
        (None, _) => "—".to_string(),
    };

    let mut linhas = vec![
        "Resumo amigável:".to_string(),
        String::new(),
        format!(
            "• Proposto: {} | CPF: {} | SIAPE: {}",
            ou_traco(&p.proposto.nome),
            ou_traco(&p.proposto.cpf),
            ou_traco(&p.proposto.siape)
        ),
        format!("• Órgão: {orgao}"),
        String::new(),
        format!("Relatório: {}", ou_traco(&data)),
        String::new(),
        "Afastamento:".to_string(),
        "• Ida:".to_string(),
    ];
    linhas.extend(linhas_trechos(&p.afastamento.ida).into_iter().map(|l| format!("  {l}")));
    linhas.push("• Retorno:".to_string());
    linhas.extend(linhas_trechos(&p.afastamento.retorno).into_iter().map(|l| format!("  {l}")));

    let fora = if p.flags.prestacao_contas_fora_prazo { "SIM" } else { "NÃO" };
    linhas.extend([
        String::new(),
        "Atividades:".to_string(),
        format!("• {}", ou_traco(&p.atividades_desenvolvidas)),
        String::new(),
        "Prazo/justificativa:".to_string(),
        format!("• Fora do prazo: {fora}"),
        format!(
            "• Justificativa: {}",
            ou_traco(p.justificativa_prestacao_contas_fora_prazo.as_deref().unwrap_or(""))
        ),
        String::new(),
        format!(
            "Viagem realizada: {}",
            ou_traco(p.viagem_realizada.map(|v| v.as_str()).unwrap_or(""))
        ),
    ]);
    linhas.join("\n")
}

/// Selo exibido ao lado da revisão.
pub fn selo(form: &FormularioAnexo2) -> &'static str {
    if form.fora_do_prazo {
        "Atenção: fora do prazo"
    } else {
        "Pronto para gerar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::anexo2::{TipoOrgao, ViagemRealizada};

    #[test]
    fn revisao_lista_trechos_e_prazo() {
        let mut payload = Anexo2Payload::default();
        payload.data_relatorio = "2024-03-14".into();
        payload.proposto.nome = "Maria da Silva".into();
        payload.proposto.orgao.tipo = Some(TipoOrgao::Outros);
        payload.proposto.orgao.detalhe = Some("Reitoria".into());
        payload.afastamento.ida = vec![
            Trecho {
                origem: "Bananeiras/PB".into(),
                destino: "João Pessoa/PB".into(),
                data_hora: "2024-03-05T06:00:00".into(),
            },
            Trecho { origem: "João Pessoa/PB".into(), destino: "Recife/PE".into(), data_hora: "".into() },
        ];
        payload.viagem_realizada = Some(ViagemRealizada::Sim);
        payload.flags.prestacao_contas_fora_prazo = true;

        let texto = texto_revisao(&payload);
        assert!(texto.starts_with("Resumo amigável:\n\n• Proposto: Maria da Silva | CPF: — | SIAPE: —"));
        assert!(texto.contains("• Órgão: outros (Reitoria)"));
        assert!(texto.contains("Relatório: 14/03/2024"));
        assert!(texto.contains("  1) Bananeiras/PB → João Pessoa/PB | 05/03/2024 06:00"));
        assert!(texto.contains("  2) João Pessoa/PB → Recife/PE | —"));
        assert!(texto.contains("• Retorno:\n  —"));
        assert!(texto.contains("• Fora do prazo: SIM"));
        assert!(texto.ends_with("Viagem realizada: sim"));
    }

    #[test]
    fn selo_segue_o_prazo() {
        let mut form = FormularioAnexo2::default();
        assert_eq!(selo(&form), "Pronto para gerar");
        form.fora_do_prazo = true;
        assert_eq!(selo(&form), "Atenção: fora do prazo");
    }
}
