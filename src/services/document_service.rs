// src/services/document_service.rs

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::PathBuf;

use genpdf::{elements, style, Element};
use zip::write::SimpleFileOptions;

use crate::{
    common::error::AppError,
    models::anexo2::{FormatoDocumento, LinhasTrechos},
};

/// Bloco de conteúdo do relatório, independente do formato de saída.
#[derive(Debug, Clone, PartialEq)]
pub enum Bloco {
    Titulo(String),
    Secao(String),
    Linha(String),
    /// Texto livre; quebras de linha são preservadas.
    Texto(String),
    Tabela { cabecalho: Vec<String>, linhas: Vec<Vec<String>> },
    Espaco,
}

/// Monta o relatório na ordem do formulário oficial.
pub fn montar_blocos(ph: &BTreeMap<String, String>, rows: &LinhasTrechos) -> Vec<Bloco> {
    let v = |k: &str| ph.get(k).cloned().unwrap_or_default();
    let chk = |k: &str| if v(k).is_empty() { "( )" } else { "(X)" };

    let mut linhas_trechos = Vec::new();
    for (i, l) in rows.ida.iter().enumerate() {
        linhas_trechos.push(vec![
            format!("Ida {}", i + 1),
            l.origem.clone(),
            l.destino.clone(),
            l.data_hora.clone(),
        ]);
    }
    for (i, l) in rows.retorno.iter().enumerate() {
        linhas_trechos.push(vec![
            format!("Retorno {}", i + 1),
            l.origem.clone(),
            l.destino.clone(),
            l.data_hora.clone(),
        ]);
    }

    let mut blocos = vec![
        Bloco::Titulo("ANEXO II - RELATÓRIO DE VIAGEM".into()),
        Bloco::Espaco,
        Bloco::Secao("1. IDENTIFICAÇÃO DO PROPOSTO".into()),
        Bloco::Linha(format!("Nome: {}", v("nome"))),
        Bloco::Linha(format!("CPF: {}    SIAPE: {}", v("cpf"), v("siape"))),
        Bloco::Linha(format!(
            "Órgão: {} CCHSA  {} CAVN  {} Projetos: {}  {} Outros: {}",
            chk("chk_orgao_cchsa"),
            chk("chk_orgao_cavn"),
            chk("chk_orgao_projetos"),
            v("orgao_projetos"),
            chk("chk_orgao_outros"),
            v("orgao_outros"),
        )),
        Bloco::Espaco,
        Bloco::Secao("2. AFASTAMENTO".into()),
        Bloco::Tabela {
            cabecalho: vec![
                "Trecho".into(),
                "Local de Origem".into(),
                "Local de Destino".into(),
                "Data/Hora".into(),
            ],
            linhas: linhas_trechos,
        },
        Bloco::Espaco,
        Bloco::Secao("3. ATIVIDADES DESENVOLVIDAS".into()),
        Bloco::Texto(v("atividades_desenvolvidas")),
        Bloco::Espaco,
        Bloco::Secao("4. VIAGEM REALIZADA".into()),
        Bloco::Linha(format!(
            "{} SIM    {} NÃO",
            chk("chk_viagem_realizada_sim"),
            chk("chk_viagem_realizada_nao")
        )),
    ];

    let justificativa = v("justificativa_prestacao_contas_fora_prazo");
    if !justificativa.is_empty() {
        blocos.push(Bloco::Espaco);
        blocos.push(Bloco::Secao("5. JUSTIFICATIVA (PRESTAÇÃO DE CONTAS FORA DO PRAZO)".into()));
        blocos.push(Bloco::Texto(justificativa));
    }

    blocos.push(Bloco::Espaco);
    blocos.push(Bloco::Linha(format!("Data: {}", v("data_relatorio"))));
    blocos.push(Bloco::Espaco);
    blocos.push(Bloco::Linha("________________________________________".into()));
    blocos.push(Bloco::Linha("Assinatura do proposto".into()));
    blocos
}

#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: PathBuf,
    font_family: String,
}

impl DocumentService {
    pub fn new(fonts_dir: PathBuf, font_family: String) -> Self {
        Self { fonts_dir, font_family }
    }

    pub async fn gerar(
        &self,
        formato: FormatoDocumento,
        placeholders: BTreeMap<String, String>,
        rows: LinhasTrechos,
    ) -> Result<Vec<u8>, AppError> {
        let blocos = montar_blocos(&placeholders, &rows);
        let service = self.clone();

        // Renderização é CPU pura; não prende o runtime
        tokio::task::spawn_blocking(move || match formato {
            FormatoDocumento::Pdf => service.render_pdf(&blocos),
            FormatoDocumento::Docx => render_docx(&blocos),
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de renderização: {}", e))?
    }

    fn render_pdf(&self, blocos: &[Bloco]) -> Result<Vec<u8>, AppError> {
        // Carrega a fonte da pasta configurada (ex.: ./fonts/Roboto-Regular.ttf)
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None)
            .map_err(|_| {
                AppError::FontNotFound(format!(
                    "Fonte {} não encontrada em {}",
                    self.font_family,
                    self.fonts_dir.display()
                ))
            })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title("Relatório de Viagem - Anexo II");
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        let negrito = style::Style::new().bold();
        for bloco in blocos {
            match bloco {
                Bloco::Titulo(t) => {
                    let mut p = elements::Paragraph::new(t.as_str());
                    p.set_alignment(genpdf::Alignment::Center);
                    doc.push(p.styled(style::Style::new().bold().with_font_size(16)));
                }
                Bloco::Secao(t) => {
                    doc.push(elements::Paragraph::new(t.as_str()).styled(negrito.with_font_size(12)));
                }
                Bloco::Linha(t) => doc.push(elements::Paragraph::new(t.as_str())),
                Bloco::Texto(t) => doc.push(texto_multilinha(t)),
                Bloco::Espaco => doc.push(elements::Break::new(1)),
                Bloco::Tabela { cabecalho, linhas } => {
                    // Pesos das colunas: Trecho (1), Origem (2), Destino (2), Data/Hora (2)
                    let mut table = elements::TableLayout::new(vec![1, 2, 2, 2]);
                    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

                    let mut row = table.row();
                    for c in cabecalho {
                        row = row.element(elements::Paragraph::new(c.as_str()).styled(negrito));
                    }
                    row.push().map_err(erro_pdf)?;

                    for linha in linhas {
                        let mut row = table.row();
                        for c in linha {
                            row = row.element(elements::Paragraph::new(c.as_str()));
                        }
                        row.push().map_err(erro_pdf)?;
                    }
                    doc.push(table);
                }
            }
        }

        // Renderiza para Buffer (Memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(erro_pdf)?;
        Ok(buffer)
    }
}

fn texto_multilinha(texto: &str) -> elements::LinearLayout {
    let mut layout = elements::LinearLayout::vertical();
    for linha in texto.lines() {
        layout.push(elements::Paragraph::new(linha));
    }
    layout
}

fn erro_pdf(e: genpdf::error::Error) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

// ---
// DOCX: pacote OOXML mínimo (content types, rels e document.xml)
// ---

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

pub fn render_docx(blocos: &[Bloco]) -> Result<Vec<u8>, AppError> {
    let mut corpo = String::new();
    for bloco in blocos {
        match bloco {
            Bloco::Titulo(t) => corpo.push_str(&paragrafo(t, true, Some("center"), Some(32))),
            Bloco::Secao(t) => corpo.push_str(&paragrafo(t, true, None, Some(24))),
            Bloco::Linha(t) | Bloco::Texto(t) => corpo.push_str(&paragrafo(t, false, None, None)),
            Bloco::Espaco => corpo.push_str("<w:p/>"),
            Bloco::Tabela { cabecalho, linhas } => corpo.push_str(&tabela(cabecalho, linhas)),
        }
    }

    let document = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body>{}<w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/>",
            "<w:pgMar w:top=\"1134\" w:right=\"1134\" w:bottom=\"1134\" w:left=\"1134\" w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/>",
            "</w:sectPr></w:body></w:document>"
        ),
        corpo
    );

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opcoes = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (nome, conteudo) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", RELS),
        ("word/document.xml", document.as_str()),
    ] {
        zip.start_file(nome, opcoes).map_err(erro_zip)?;
        zip.write_all(conteudo.as_bytes())?;
    }
    let cursor = zip.finish().map_err(erro_zip)?;
    Ok(cursor.into_inner())
}

fn erro_zip(e: zip::result::ZipError) -> AppError {
    AppError::InternalServerError(anyhow::Error::new(e))
}

/// Escapa para XML e descarta caracteres de controle que o XML 1.0 não aceita.
fn escapar_xml(texto: &str) -> String {
    texto
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect::<String>()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Um `<w:p>`; quebras de linha viram `<w:br/>` dentro do mesmo run.
fn paragrafo(texto: &str, negrito: bool, alinhamento: Option<&str>, tamanho: Option<u32>) -> String {
    let mut ppr = String::new();
    if let Some(a) = alinhamento {
        ppr = format!("<w:pPr><w:jc w:val=\"{a}\"/></w:pPr>");
    }
    let mut rpr = String::new();
    if negrito {
        rpr.push_str("<w:b/>");
    }
    if let Some(t) = tamanho {
        rpr.push_str(&format!("<w:sz w:val=\"{t}\"/>"));
    }
    let rpr = if rpr.is_empty() { rpr } else { format!("<w:rPr>{rpr}</w:rPr>") };

    let partes: Vec<String> = texto
        .split('\n')
        .map(|l| format!("<w:t xml:space=\"preserve\">{}</w:t>", escapar_xml(l)))
        .collect();
    format!("<w:p>{ppr}<w:r>{rpr}{}</w:r></w:p>", partes.join("<w:br/>"))
}

fn tabela(cabecalho: &[String], linhas: &[Vec<String>]) -> String {
    let celula = |t: &str, negrito: bool| format!("<w:tc>{}</w:tc>", paragrafo(t, negrito, None, None));
    let linha = |cels: &[String], negrito: bool| {
        let conteudo: String = cels.iter().map(|c| celula(c, negrito)).collect();
        format!("<w:tr>{conteudo}</w:tr>")
    };

    let mut xml = String::from(concat!(
        "<w:tbl><w:tblPr><w:tblW w:w=\"5000\" w:type=\"pct\"/><w:tblBorders>",
        "<w:top w:val=\"single\" w:sz=\"4\"/><w:left w:val=\"single\" w:sz=\"4\"/>",
        "<w:bottom w:val=\"single\" w:sz=\"4\"/><w:right w:val=\"single\" w:sz=\"4\"/>",
        "<w:insideH w:val=\"single\" w:sz=\"4\"/><w:insideV w:val=\"single\" w:sz=\"4\"/>",
        "</w:tblBorders></w:tblPr>"
    ));
    xml.push_str(&linha(cabecalho, true));
    for l in linhas {
        xml.push_str(&linha(l, false));
    }
    xml.push_str("</w:tbl>");
    xml
}
