// src/services/anexo2_service.rs

use validator::Validate;

use crate::{
    common::{datas, error::{erros_de_validacao, AppError}},
    models::anexo2::{Anexo2Payload, ErroCampo, FormatoDocumento, PreviewAnexo2},
    services::{
        document_service::DocumentService,
        placeholders::{montar_linhas, montar_placeholders},
        prazo,
    },
};

#[derive(Clone)]
pub struct Anexo2Service {
    documentos: DocumentService,
    prazo_dias: u32,
}

impl Anexo2Service {
    pub fn new(documentos: DocumentService, prazo_dias: u32) -> Self {
        Self { documentos, prazo_dias }
    }

    /// Valida o payload e, se estiver tudo certo, devolve os valores que vão
    /// para o documento. Erros são coletados, nunca lançados.
    pub fn preview(&self, mut payload: Anexo2Payload) -> PreviewAnexo2 {
        let mut errors = Vec::new();
        let afast = &payload.afastamento;

        // 1. Trechos
        if afast.ida.is_empty() {
            errors.push(ErroCampo::new("afastamento.ida", "Informe ao menos um trecho de ida."));
        }
        if afast.retorno.is_empty() {
            errors.push(ErroCampo::new(
                "afastamento.retorno",
                "Informe ao menos um trecho de retorno.",
            ));
        }
        if afast.ida.iter().any(|t| t.data_hora.trim().is_empty()) {
            errors.push(ErroCampo::new(
                "afastamento.ida",
                "Informe datas/horas válidas para todos os trechos de ida.",
            ));
        }
        if afast.retorno.iter().any(|t| t.data_hora.trim().is_empty()) {
            errors.push(ErroCampo::new(
                "afastamento.retorno",
                "Informe datas/horas válidas para todos os trechos de retorno.",
            ));
        }

        // Primeira ida x último retorno
        let ida_texto = afast.ida.first().map(|t| t.data_hora.trim()).filter(|s| !s.is_empty());
        let ret_texto = afast.retorno.last().map(|t| t.data_hora.trim()).filter(|s| !s.is_empty());
        let ida = ida_texto.map(datas::parse_data_hora);
        let ret = ret_texto.map(datas::parse_data_hora);

        let (ida, ret) = match (ida, ret) {
            (Some(None), _) | (_, Some(None)) => {
                errors.push(ErroCampo::new(
                    "afastamento",
                    "Informe datas/horas válidas para ida e retorno.",
                ));
                (None, None)
            }
            (ida, ret) => (ida.flatten(), ret.flatten()),
        };

        if let (Some(ida), Some(ret)) = (ida, ret) {
            if ret < ida {
                errors.push(ErroCampo::new(
                    "afastamento",
                    "A data/hora de retorno não pode ser anterior à ida.",
                ));
            }
        }

        // 2. Prazo: relatório até retorno + N dias
        let data_relatorio = datas::parse_data(&payload.data_relatorio);
        if let (Some(ret), Some(rel)) = (ret, data_relatorio) {
            payload.flags.prestacao_contas_fora_prazo = prazo::fora_do_prazo(ret, rel, self.prazo_dias);
        }

        let justificativa = payload
            .justificativa_prestacao_contas_fora_prazo
            .as_deref()
            .map(str::trim)
            .unwrap_or("");
        if payload.flags.prestacao_contas_fora_prazo && justificativa.is_empty() {
            errors.push(ErroCampo::new(
                "justificativa_prestacao_contas_fora_prazo",
                "Prestação de contas fora do prazo. Informe a justificativa.",
            ));
        }

        // 3. Consistência do órgão
        match payload.proposto.orgao.tipo {
            None => errors.push(ErroCampo::new("proposto.orgao.tipo", "Selecione o órgão.")),
            Some(tipo) if tipo.exige_detalhe() && payload.proposto.orgao.detalhe_limpo().chars().count() < 2 => {
                errors.push(ErroCampo::new(
                    "proposto.orgao.detalhe",
                    "Informe o detalhe do órgão para Projetos/Outros.",
                ));
            }
            Some(_) => {}
        }

        // 4. Regras por campo (validator)
        if let Err(e) = payload.validate() {
            errors.extend(erros_de_validacao(&e));
        }

        let flags = payload.flags;
        if !errors.is_empty() {
            tracing::debug!("Preview do Anexo II com {} pendência(s)", errors.len());
            return PreviewAnexo2 { ok: false, errors, flags, placeholders: None, rows: None };
        }

        let rows = montar_linhas(&payload.afastamento.ida, &payload.afastamento.retorno);
        let placeholders = montar_placeholders(&payload, &flags);
        PreviewAnexo2 {
            ok: true,
            errors: Vec::new(),
            flags,
            placeholders: Some(placeholders),
            rows: Some(rows),
        }
    }

    /// Valida de novo (o backend não confia no preview do cliente) e gera o arquivo.
    pub async fn gerar(
        &self,
        payload: Anexo2Payload,
        formato: FormatoDocumento,
    ) -> Result<Vec<u8>, AppError> {
        let preview = self.preview(payload);
        if !preview.ok {
            return Err(AppError::RelatorioInvalido(Box::new(preview)));
        }
        let (Some(placeholders), Some(rows)) = (preview.placeholders, preview.rows) else {
            return Err(anyhow::anyhow!("preview ok sem placeholders").into());
        };

        let bytes = self.documentos.gerar(formato, placeholders, rows).await?;
        tracing::info!("📄 Anexo II gerado ({}, {} bytes)", formato.extensao(), bytes.len());
        Ok(bytes)
    }
}
