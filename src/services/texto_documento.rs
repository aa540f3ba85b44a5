// src/services/texto_documento.rs
//
// Extração de texto puro de PDF, DOCX e DOC (este último convertido pelo
// LibreOffice em modo headless).

use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::common::error::AppError;

static TAG_XML: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("regex TAG_XML"));
static ESPACOS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").expect("regex ESPACOS"));
static LINHAS_VAZIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("regex LINHAS_VAZIAS"));
static FIM_DE_PARAGRAFO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</w:p>|<w:br/>|<w:cr/>").expect("regex FIM_DE_PARAGRAFO"));
static FIM_DE_CELULA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</w:tc>|<w:tab/>").expect("regex FIM_DE_CELULA"));
static ENTIDADE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[xX]([0-9A-Fa-f]+)|#([0-9]+)|(lt|gt|quot|apos|amp));").expect("regex ENTIDADE")
});

const ERRO_PDF: &str = "Falha ao ler PDF. Certifique-se de que é um PDF com texto.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipoArquivo {
    Pdf,
    Docx,
    Doc,
}

impl TipoArquivo {
    /// Pela extensão do nome do arquivo, sem diferenciar maiúsculas.
    pub fn from_nome(nome: &str) -> Option<Self> {
        let ext = Path::new(nome).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            _ => None,
        }
    }
}

/// CR vira quebra de linha, espaços repetidos colapsam, linhas em branco somem.
pub fn normalizar_texto(texto: &str) -> String {
    let texto = texto.replace('\r', "\n");
    let texto = ESPACOS.replace_all(&texto, " ");
    let texto = LINHAS_VAZIAS.replace_all(&texto, "\n");
    texto.trim().to_string()
}

pub async fn extrair_texto(tipo: TipoArquivo, bytes: Vec<u8>, soffice: &str) -> Result<String, AppError> {
    let texto = match tipo {
        // pdf-extract pode entrar em pânico com PDFs malformados
        TipoArquivo::Pdf => tokio::task::spawn_blocking(move || texto_pdf(&bytes))
            .await
            .map_err(|e| {
                tracing::warn!("Leitura do PDF abortada: {}", e);
                AppError::ArquivoInvalido(ERRO_PDF.into())
            })??,
        TipoArquivo::Docx => tokio::task::spawn_blocking(move || texto_docx(&bytes))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de leitura do DOCX: {}", e))??,
        TipoArquivo::Doc => {
            let convertido = converter_doc(&bytes, soffice).await?;
            tokio::task::spawn_blocking(move || texto_docx(&convertido))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de leitura do DOC: {}", e))??
        }
    };
    Ok(normalizar_texto(&texto))
}

fn texto_pdf(bytes: &[u8]) -> Result<String, AppError> {
    let erro = || AppError::ArquivoInvalido(ERRO_PDF.into());
    let texto = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        tracing::warn!("pdf-extract falhou: {}", e);
        erro()
    })?;
    if texto.trim().is_empty() {
        // PDF escaneado (só imagem)
        return Err(erro());
    }
    Ok(texto)
}

pub fn texto_docx(bytes: &[u8]) -> Result<String, AppError> {
    let erro = || AppError::ArquivoInvalido("Falha ao ler DOCX.".into());
    let mut arquivo = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|_| erro())?;
    let mut xml = String::new();
    arquivo
        .by_name("word/document.xml")
        .map_err(|_| erro())?
        .read_to_string(&mut xml)
        .map_err(|_| erro())?;

    let texto = texto_de_document_xml(&xml);
    if texto.trim().is_empty() {
        return Err(AppError::ArquivoInvalido("DOCX sem texto legível.".into()));
    }
    Ok(texto)
}

/// Parágrafos viram linhas; células da mesma linha de tabela ficam separadas por espaço.
fn texto_de_document_xml(xml: &str) -> String {
    let xml = FIM_DE_PARAGRAFO.replace_all(xml, "\n");
    let xml = FIM_DE_CELULA.replace_all(&xml, " ");
    let xml = xml.replace("</w:tr>", "\n");
    let texto = TAG_XML.replace_all(&xml, "");
    decodificar_entidades(&texto)
}

/// Entidades nomeadas do XML e referências numéricas (`&#233;`, `&#xE9;`),
/// numa única passada. Referência inválida fica como está.
fn decodificar_entidades(texto: &str) -> String {
    ENTIDADE
        .replace_all(texto, |c: &regex::Captures| {
            let caractere = if let Some(hex) = c.get(1) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = c.get(2) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match c.get(3).map(|m| m.as_str()) {
                    Some("lt") => Some('<'),
                    Some("gt") => Some('>'),
                    Some("quot") => Some('"'),
                    Some("apos") => Some('\''),
                    Some("amp") => Some('&'),
                    _ => None,
                }
            };
            caractere.map(String::from).unwrap_or_else(|| c[0].to_string())
        })
        .into_owned()
}

async fn converter_doc(bytes: &[u8], soffice: &str) -> Result<Vec<u8>, AppError> {
    let erro = || {
        AppError::ArquivoInvalido("Falha ao converter DOC para DOCX. Verifique o arquivo enviado.".into())
    };

    // O diretório é apagado quando `dir` sai de escopo
    let dir = tempfile::tempdir()?;
    let entrada = dir.path().join("anexo1.doc");
    tokio::fs::write(&entrada, bytes).await?;

    let status = tokio::process::Command::new(soffice)
        .arg("--headless")
        .arg("--convert-to")
        .arg("docx")
        .arg("--outdir")
        .arg(dir.path())
        .arg(&entrada)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await
        .map_err(|e| {
            tracing::warn!("Não foi possível executar {}: {}", soffice, e);
            erro()
        })?;

    let saida = dir.path().join("anexo1.docx");
    if !status.success() || !saida.exists() {
        return Err(erro());
    }
    Ok(tokio::fs::read(&saida).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_com(document_xml: &str) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn tipo_pela_extensao() {
        assert_eq!(TipoArquivo::from_nome("anexo1.PDF"), Some(TipoArquivo::Pdf));
        assert_eq!(TipoArquivo::from_nome("a.b.docx"), Some(TipoArquivo::Docx));
        assert_eq!(TipoArquivo::from_nome("velho.doc"), Some(TipoArquivo::Doc));
        assert_eq!(TipoArquivo::from_nome("planilha.xlsx"), None);
        assert_eq!(TipoArquivo::from_nome("sem_extensao"), None);
    }

    #[test]
    fn normaliza_espacos_e_linhas() {
        assert_eq!(normalizar_texto("  a \t b\r\n\n\nc  "), "a b\nc");
    }

    #[test]
    fn le_paragrafos_e_tabelas_do_docx() {
        let xml = concat!(
            "<w:document><w:body>",
            "<w:p><w:r><w:t>Nome completo: Ana &amp; Souza</w:t></w:r></w:p>",
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>CPF:</w:t></w:r></w:p></w:tc>",
            "<w:tc><w:p><w:r><w:t>529.982.247-25</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
            "</w:body></w:document>"
        );
        let texto = normalizar_texto(&texto_docx(&docx_com(xml)).unwrap());
        assert!(texto.contains("Nome completo: Ana & Souza"));
        assert!(texto.contains("CPF:"));
        assert!(texto.contains("529.982.247-25"));
    }

    #[test]
    fn decodifica_referencias_numericas_uma_vez() {
        assert_eq!(decodificar_entidades("Jo&#227;o Pessoa/PB"), "João Pessoa/PB");
        assert_eq!(decodificar_entidades("IDENTIFICA&#xC7;&#xC3;O"), "IDENTIFICAÇÃO");
        assert_eq!(decodificar_entidades("&amp;lt; &quot;x&quot;"), "&lt; \"x\"");
        assert_eq!(decodificar_entidades("&#xFFFFFFF; &nbsp;"), "&#xFFFFFFF; &nbsp;");
    }

    #[test]
    fn docx_vazio_ou_corrompido() {
        let err = texto_docx(&docx_com("<w:document><w:body/></w:document>")).unwrap_err();
        assert!(matches!(err, AppError::ArquivoInvalido(m) if m == "DOCX sem texto legível."));

        let err = texto_docx(b"nao sou um zip").unwrap_err();
        assert!(matches!(err, AppError::ArquivoInvalido(m) if m == "Falha ao ler DOCX."));
    }

    #[tokio::test]
    async fn pdf_invalido_vira_erro_de_arquivo() {
        let err = extrair_texto(TipoArquivo::Pdf, b"%PDF-lixo".to_vec(), "soffice")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ArquivoInvalido(_)));
    }

    #[tokio::test]
    async fn doc_sem_soffice_falha_na_conversao() {
        let err = extrair_texto(TipoArquivo::Doc, b"x".to_vec(), "/nao/existe/soffice")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ArquivoInvalido(m) if m.contains("converter DOC")));
    }
}
