// src/wizard/gerador.rs
//
// Navegação entre passos, importação do Anexo I e geração do documento.

use thiserror::Error;

use crate::{
    models::anexo2::{Anexo2Payload, ErroCampo, FormatoDocumento, PreviewAnexo2},
    wizard::{
        client::{Anexo2Api, ClienteError},
        formulario::FormularioAnexo2,
        passos::{self, Pendencia, ResultadoPasso, TOTAL_PASSOS},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusWizard {
    Rascunho,
    Validando,
    CorrecaoNecessaria,
    Gerando,
    Gerado,
    Erro,
}

impl StatusWizard {
    pub fn rotulo(&self) -> &'static str {
        match self {
            Self::Rascunho => "Rascunho",
            Self::Validando => "Validando...",
            Self::CorrecaoNecessaria => "Correção necessária",
            Self::Gerando => "Gerando...",
            Self::Gerado => "Gerado com sucesso",
            Self::Erro => "Erro",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Documento {
    pub nome_arquivo: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ErroGeracao {
    /// Algum passo não passou na validação local.
    #[error("{}", .resultado.mensagens.join(" "))]
    Passo { passo: u8, resultado: ResultadoPasso },

    /// O servidor apontou pendências.
    #[error("{}", .mensagens.join(" "))]
    Pendencias { passo: u8, mensagens: Vec<String> },

    #[error("{0}")]
    Falha(&'static str),
}

/// Passo onde o primeiro erro do servidor deve ser corrigido.
pub fn passo_do_erro(erros: &[ErroCampo]) -> u8 {
    match erros.first().map(|e| e.field.as_str()) {
        Some(f) if f.starts_with("afastamento") => 3,
        Some(f) if f.starts_with("justificativa") => 5,
        _ => 2,
    }
}

pub struct Wizard {
    pub form: FormularioAnexo2,
    passo: u8,
    status: StatusWizard,
    /// Textos de ajuda (importação, data do servidor).
    pub avisos: Vec<String>,
    pub pendencias: Vec<Pendencia>,
}

impl Wizard {
    pub fn new(prazo_dias: u32) -> Self {
        Self {
            form: FormularioAnexo2::new(prazo_dias),
            passo: 1,
            status: StatusWizard::Rascunho,
            avisos: Vec::new(),
            pendencias: Vec::new(),
        }
    }

    pub fn passo(&self) -> u8 {
        self.passo
    }

    pub fn status(&self) -> StatusWizard {
        self.status
    }

    pub fn ir_para_passo(&mut self, passo: u8) {
        self.passo = passo.clamp(1, TOTAL_PASSOS);
    }

    /// Valida o passo atual e só avança se estiver tudo certo.
    pub fn avancar(&mut self) -> ResultadoPasso {
        self.form.refresh_flags();
        let resultado = passos::validar_passo(&self.form, self.passo);
        if resultado.ok && self.passo < TOTAL_PASSOS {
            self.passo += 1;
        }
        resultado
    }

    pub fn voltar(&mut self) {
        self.ir_para_passo(self.passo.saturating_sub(1));
    }

    /// Preenche a data do relatório com a data do servidor, se ainda estiver
    /// vazia. Sem servidor, usa a data local.
    pub async fn definir_data_do_servidor(&mut self, api: &dyn Anexo2Api) {
        if !self.form.data_relatorio.is_empty() {
            return;
        }
        match api.data_servidor().await {
            Ok(data) => self.form.definir_data_relatorio(&data),
            Err(e) => tracing::warn!("Data do servidor indisponível: {}", e),
        }
        if self.form.data_relatorio.is_empty() {
            let hoje = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
            self.form.definir_data_relatorio(&hoje);
        }
    }

    /// Envia o Anexo I e aplica o pré-preenchimento no formulário.
    pub async fn importar_anexo1(
        &mut self,
        api: &dyn Anexo2Api,
        nome_arquivo: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ClienteError> {
        let resposta = api.prefill(nome_arquivo, bytes).await?;
        self.form.aplicar_prefill(&resposta.prefill);

        let origem = resposta.filename.as_deref().unwrap_or(nome_arquivo);
        self.avisos = vec![
            format!("Dados importados de {origem}."),
            "Revise os campos antes de gerar o relatório.".to_string(),
        ];
        self.avisos.extend(resposta.warnings);
        self.pendencias = passos::validar_payload(&self.form.to_payload(), self.form.prazo_dias);
        tracing::info!("📥 Anexo I importado ({} aviso(s))", self.avisos.len() - 2);
        Ok(())
    }

    /// Aplica o resultado do chat e volta para o início para revisão.
    pub fn aplicar_chat(&mut self, payload: &Anexo2Payload) {
        self.form.aplicar_payload(payload);
        self.form.definir_orgao_tipo(self.form.orgao_tipo);
        self.form.refresh_flags();
        self.passo = 1;
        self.status = StatusWizard::Rascunho;
        self.pendencias = passos::validar_payload(payload, self.form.prazo_dias);
    }

    fn pendencias_do_servidor(&mut self, preview: &PreviewAnexo2) -> ErroGeracao {
        let passo = passo_do_erro(&preview.errors);
        let mut mensagens: Vec<String> = preview.errors.iter().map(|e| e.message.clone()).collect();
        if mensagens.is_empty() {
            mensagens.push("Revise os campos.".to_string());
        }
        self.passo = passo;
        self.status = StatusWizard::CorrecaoNecessaria;
        ErroGeracao::Pendencias { passo, mensagens }
    }

    /// Valida todos os passos, confere no servidor e gera o documento.
    pub async fn gerar(
        &mut self,
        api: &dyn Anexo2Api,
        formato: FormatoDocumento,
    ) -> Result<Documento, ErroGeracao> {
        self.form.refresh_flags();
        if let Some((passo, resultado)) = passos::primeiro_passo_invalido(&self.form) {
            self.passo = passo;
            self.status = StatusWizard::CorrecaoNecessaria;
            return Err(ErroGeracao::Passo { passo, resultado });
        }

        let payload = self.form.to_payload();

        self.status = StatusWizard::Validando;
        let preview = match api.preview(&payload).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Preview falhou: {}", e);
                self.status = StatusWizard::Erro;
                return Err(ErroGeracao::Falha("Falha ao validar os dados."));
            }
        };
        if !preview.ok {
            return Err(self.pendencias_do_servidor(&preview));
        }

        self.status = StatusWizard::Gerando;
        match api.gerar(&payload, formato).await {
            Ok(bytes) => {
                self.status = StatusWizard::Gerado;
                tracing::info!("📄 Documento gerado ({} bytes)", bytes.len());
                Ok(Documento { nome_arquivo: formato.nome_arquivo(), bytes })
            }
            Err(ClienteError::Pendencias(preview)) => Err(self.pendencias_do_servidor(&preview)),
            Err(e) => {
                tracing::warn!("Geração falhou: {}", e);
                self.status = StatusWizard::Erro;
                Err(ErroGeracao::Falha("Falha ao gerar o documento."))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::models::{
        anexo1::{Anexo2Prefill, PrefillProposto, PrefillResponse},
        anexo2::{Flags, TipoOrgao, ViagemRealizada},
    };
    use crate::wizard::formulario::CartaoTrecho;

    #[derive(Default)]
    struct ApiFalsa {
        preview: Option<PreviewAnexo2>,
        gerar_falha: bool,
        data: Option<String>,
        chamadas: Mutex<Vec<&'static str>>,
    }

    impl ApiFalsa {
        fn registrar(&self, nome: &'static str) {
            self.chamadas.lock().unwrap().push(nome);
        }
    }

    fn falha_de_rede() -> ClienteError {
        ClienteError::Resposta { status: 503, mensagem: "indisponível".into() }
    }

    #[async_trait]
    impl Anexo2Api for ApiFalsa {
        async fn preview(&self, _: &Anexo2Payload) -> Result<PreviewAnexo2, ClienteError> {
            self.registrar("preview");
            self.preview.clone().ok_or_else(falha_de_rede)
        }

        async fn gerar(&self, _: &Anexo2Payload, _: FormatoDocumento) -> Result<Vec<u8>, ClienteError> {
            self.registrar("gerar");
            if self.gerar_falha {
                return Err(falha_de_rede());
            }
            Ok(b"PK".to_vec())
        }

        async fn prefill(&self, nome: &str, _: Vec<u8>) -> Result<PrefillResponse, ClienteError> {
            self.registrar("prefill");
            Ok(PrefillResponse {
                ok: true,
                prefill: Anexo2Prefill {
                    proposto: Some(PrefillProposto {
                        nome: Some("José Souza".into()),
                        cpf: Some("11111111111".into()),
                        ..Default::default()
                    }),
                    viagem_realizada: Some(ViagemRealizada::Sim),
                    ..Default::default()
                },
                warnings: vec!["Não encontrei o SIAPE no documento.".into()],
                filename: Some(nome.to_string()),
            })
        }

        async fn data_servidor(&self) -> Result<String, ClienteError> {
            self.registrar("data");
            self.data.clone().ok_or_else(falha_de_rede)
        }
    }

    fn preview_ok() -> PreviewAnexo2 {
        PreviewAnexo2 { ok: true, errors: vec![], flags: Flags::default(), placeholders: None, rows: None }
    }

    fn wizard_preenchido() -> Wizard {
        let mut w = Wizard::new(5);
        let f = &mut w.form;
        f.definir_data_exibida("10/03/2024");
        f.nome = "Maria da Silva".into();
        f.cpf = "52998224725".into();
        f.siape = "1234567".into();
        f.definir_orgao_tipo(Some(TipoOrgao::Cavn));
        f.ida = vec![CartaoTrecho {
            origem_cidade: "Bananeiras".into(),
            origem_uf: "PB".into(),
            destino_cidade: "Recife".into(),
            destino_uf: "PE".into(),
            data_hora: "2024-03-05T08:00".into(),
        }];
        f.retorno = vec![CartaoTrecho {
            origem_cidade: "Recife".into(),
            origem_uf: "PE".into(),
            destino_cidade: "Bananeiras".into(),
            destino_uf: "PB".into(),
            data_hora: "2024-03-07T18:00".into(),
        }];
        f.atividades = "Reunião técnica com a equipe do projeto.".into();
        f.viagem_realizada = Some(ViagemRealizada::Sim);
        w
    }

    #[tokio::test]
    async fn gera_quando_tudo_confere() {
        let api = ApiFalsa { preview: Some(preview_ok()), ..Default::default() };
        let mut w = wizard_preenchido();

        let doc = w.gerar(&api, FormatoDocumento::Docx).await.unwrap();
        assert_eq!(doc.nome_arquivo, "anexo2_preenchido.docx");
        assert_eq!(doc.bytes, b"PK");
        assert_eq!(w.status(), StatusWizard::Gerado);
        assert_eq!(*api.chamadas.lock().unwrap(), vec!["preview", "gerar"]);
    }

    #[tokio::test]
    async fn passo_invalido_nao_chama_o_servidor() {
        let api = ApiFalsa { preview: Some(preview_ok()), ..Default::default() };
        let mut w = wizard_preenchido();
        w.form.atividades = "curto".into();
        w.ir_para_passo(7);

        let err = w.gerar(&api, FormatoDocumento::Pdf).await.unwrap_err();
        assert!(matches!(err, ErroGeracao::Passo { passo: 4, .. }));
        assert_eq!(w.passo(), 4);
        assert_eq!(w.status().rotulo(), "Correção necessária");
        assert!(api.chamadas.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn pendencias_do_servidor_levam_ao_passo_certo() {
        let preview = PreviewAnexo2 {
            ok: false,
            errors: vec![ErroCampo::new("afastamento", "A data/hora de retorno não pode ser anterior à ida.")],
            flags: Flags::default(),
            placeholders: None,
            rows: None,
        };
        let api = ApiFalsa { preview: Some(preview), ..Default::default() };
        let mut w = wizard_preenchido();

        let err = w.gerar(&api, FormatoDocumento::Docx).await.unwrap_err();
        match err {
            ErroGeracao::Pendencias { passo, mensagens } => {
                assert_eq!(passo, 3);
                assert_eq!(mensagens, vec!["A data/hora de retorno não pode ser anterior à ida.".to_string()]);
            }
            outro => panic!("inesperado: {outro:?}"),
        }
        assert_eq!(w.passo(), 3);
        assert_eq!(*api.chamadas.lock().unwrap(), vec!["preview"]);
    }

    #[tokio::test]
    async fn falhas_de_transporte_viram_mensagens_fixas() {
        let mut w = wizard_preenchido();
        let sem_preview = ApiFalsa::default();
        let err = w.gerar(&sem_preview, FormatoDocumento::Docx).await.unwrap_err();
        assert_eq!(err.to_string(), "Falha ao validar os dados.");
        assert_eq!(w.status(), StatusWizard::Erro);

        let gerar_quebra = ApiFalsa { preview: Some(preview_ok()), gerar_falha: true, ..Default::default() };
        let err = w.gerar(&gerar_quebra, FormatoDocumento::Docx).await.unwrap_err();
        assert_eq!(err.to_string(), "Falha ao gerar o documento.");
    }

    #[test]
    fn roteamento_pelo_primeiro_erro() {
        assert_eq!(passo_do_erro(&[ErroCampo::new("afastamento.ida", "x")]), 3);
        assert_eq!(
            passo_do_erro(&[ErroCampo::new("justificativa_prestacao_contas_fora_prazo", "x")]),
            5
        );
        assert_eq!(passo_do_erro(&[ErroCampo::new("proposto.cpf", "x")]), 2);
        assert_eq!(passo_do_erro(&[]), 2);
    }

    #[tokio::test]
    async fn importacao_aplica_prefill_e_lista_pendencias() {
        let api = ApiFalsa::default();
        let mut w = wizard_preenchido();
        w.importar_anexo1(&api, "anexo1.pdf", b"%PDF".to_vec()).await.unwrap();

        assert_eq!(w.form.nome, "José Souza");
        assert_eq!(w.form.siape, "1234567");
        assert_eq!(
            w.avisos,
            vec![
                "Dados importados de anexo1.pdf.".to_string(),
                "Revise os campos antes de gerar o relatório.".to_string(),
                "Não encontrei o SIAPE no documento.".to_string(),
            ]
        );
        assert!(w.pendencias.iter().any(|p| p.mensagem == "CPF inválido."));
    }

    #[tokio::test]
    async fn data_do_servidor_com_alternativa_local() {
        let api = ApiFalsa { data: Some("2024-03-12".into()), ..Default::default() };
        let mut w = Wizard::new(5);
        w.definir_data_do_servidor(&api).await;
        assert_eq!(w.form.data_relatorio_exibida, "12/03/2024");

        // já preenchida: não consulta de novo
        w.definir_data_do_servidor(&api).await;
        assert_eq!(api.chamadas.lock().unwrap().len(), 1);

        let mut offline = Wizard::new(5);
        offline.definir_data_do_servidor(&ApiFalsa::default()).await;
        assert_eq!(offline.form.data_relatorio, chrono::Local::now().date_naive().to_string());
    }

    #[test]
    fn navegacao_respeita_validacao() {
        let mut w = Wizard::new(5);
        assert!(!w.avancar().ok);
        assert_eq!(w.passo(), 1);

        let mut w = wizard_preenchido();
        for esperado in 2..=7 {
            assert!(w.avancar().ok);
            assert_eq!(w.passo(), esperado);
        }
        assert!(w.avancar().ok);
        assert_eq!(w.passo(), 7);
        w.voltar();
        assert_eq!(w.passo(), 6);
    }

    #[test]
    fn aplicar_chat_volta_ao_inicio() {
        let mut w = Wizard::new(5);
        w.ir_para_passo(6);
        let payload = wizard_preenchido().form.to_payload();
        w.aplicar_chat(&payload);
        assert_eq!(w.passo(), 1);
        assert_eq!(w.form.nome, "Maria da Silva");
        assert!(w.pendencias.is_empty());
    }
}
