// src/bin/anexo2-cli.rs
//
// Assistente de linha de comando: conversa guiada, importação do Anexo I e
// geração do documento pelo servidor.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};

use relatorio_viagem::{
    common::logging,
    models::anexo2::{Anexo2Payload, FormatoDocumento},
    services::prazo::PRAZO_RELATORIO_DIAS,
    wizard::{
        chat::{SessaoChat, Turno},
        client::{Anexo2Api, HttpAnexo2Api},
        gerador::{ErroGeracao, Wizard},
        passos, resumo,
    },
};

#[derive(Parser, Debug)]
#[command(name = "anexo2-cli")]
#[command(version, about = "Preenche o Relatório de Viagem (ANEXO II)")]
struct Args {
    /// Endereço do servidor
    #[arg(long, global = true, env = "ANEXO2_SERVIDOR", default_value = "http://127.0.0.1:3000")]
    servidor: String,

    /// Dias após o retorno para entregar o relatório
    #[arg(long, global = true, default_value_t = PRAZO_RELATORIO_DIAS)]
    prazo_dias: u32,

    #[command(subcommand)]
    comando: Comando,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Formato {
    Docx,
    Pdf,
}

impl From<Formato> for FormatoDocumento {
    fn from(f: Formato) -> Self {
        match f {
            Formato::Docx => FormatoDocumento::Docx,
            Formato::Pdf => FormatoDocumento::Pdf,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Comando {
    /// Conversa guiada; ao final mostra o payload ou gera o documento
    Chat {
        /// Data do relatório (dd/mm/aaaa); sem ela pergunta ou usa a do servidor
        #[arg(long)]
        data: Option<String>,
        /// Gera o documento ao concluir
        #[arg(long)]
        saida: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "docx")]
        formato: Formato,
    },
    /// Confere um payload JSON sem falar com o servidor
    Validar { payload: PathBuf },
    /// Gera o documento a partir de um payload JSON
    Gerar {
        payload: PathBuf,
        #[arg(long, value_enum, default_value = "docx")]
        formato: Formato,
        /// Arquivo de saída (padrão: anexo2_preenchido.<ext>)
        #[arg(long)]
        saida: Option<PathBuf>,
    },
    /// Lê o Anexo I e mostra os dados sugeridos para o Anexo II
    Importar { arquivo: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_cli();
    let args = Args::parse();
    let api = HttpAnexo2Api::new(&args.servidor);

    match args.comando {
        Comando::Chat { data, saida, formato } => {
            let payload = conversar(&api, data, args.prazo_dias).await?;
            match saida {
                Some(saida) => gerar(&api, &payload, formato.into(), args.prazo_dias, Some(saida)).await?,
                None => println!("{}", serde_json::to_string_pretty(&payload)?),
            }
        }
        Comando::Validar { payload } => {
            let payload = ler_payload(&payload).await?;
            let pendencias = passos::validar_payload(&payload, args.prazo_dias);
            if pendencias.is_empty() {
                println!("✅ Nenhuma pendência.");
            } else {
                for p in &pendencias {
                    println!("• {} ({})", p.mensagem, p.campos.join(", "));
                }
                bail!("{} pendência(s)", pendencias.len());
            }
        }
        Comando::Gerar { payload, formato, saida } => {
            let payload = ler_payload(&payload).await?;
            gerar(&api, &payload, formato.into(), args.prazo_dias, saida).await?;
        }
        Comando::Importar { arquivo } => {
            let bytes = tokio::fs::read(&arquivo)
                .await
                .with_context(|| format!("Não foi possível ler {}", arquivo.display()))?;
            let nome = arquivo
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "anexo1".to_string());

            let mut wizard = Wizard::new(args.prazo_dias);
            wizard.importar_anexo1(&api, &nome, bytes).await?;
            for aviso in &wizard.avisos {
                eprintln!("• {aviso}");
            }
            println!("{}", resumo::texto_revisao(&wizard.form.to_payload()));
        }
    }
    Ok(())
}

async fn ler_payload(caminho: &Path) -> anyhow::Result<Anexo2Payload> {
    let texto = tokio::fs::read_to_string(caminho)
        .await
        .with_context(|| format!("Não foi possível ler {}", caminho.display()))?;
    serde_json::from_str(&texto).context("Payload JSON inválido")
}

fn mostrar(turno: &Turno) {
    for m in &turno.mensagens {
        println!("  {m}");
    }
    if let Some(pergunta) = &turno.pergunta {
        println!("\n{}", pergunta.texto);
        for opcao in &pergunta.opcoes {
            println!("  [{}] {}", opcao.valor, opcao.rotulo);
        }
    }
}

async fn conversar(
    api: &dyn Anexo2Api,
    data: Option<String>,
    prazo_dias: u32,
) -> anyhow::Result<Anexo2Payload> {
    // Sem data explícita, tenta a do servidor; offline, pergunta.
    let preset = match data {
        Some(d) => Some(d),
        None => api
            .data_servidor()
            .await
            .ok()
            .and_then(|iso| chrono::NaiveDate::parse_from_str(&iso, "%Y-%m-%d").ok())
            .map(|d| d.format("%d/%m/%Y").to_string()),
    };

    let mut sessao = SessaoChat::new(preset, prazo_dias);
    let mut turno = sessao.iniciar()?;
    let mut linhas = BufReader::new(tokio::io::stdin()).lines();

    loop {
        mostrar(&turno);
        if let Some(payload) = turno.payload.take() {
            return Ok(payload);
        }
        let Some(linha) = linhas.next_line().await? else {
            bail!("Conversa interrompida antes de concluir.");
        };
        turno = sessao.responder(&linha)?;
    }
}

async fn gerar(
    api: &dyn Anexo2Api,
    payload: &Anexo2Payload,
    formato: FormatoDocumento,
    prazo_dias: u32,
    saida: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut wizard = Wizard::new(prazo_dias);
    wizard.aplicar_chat(payload);

    match wizard.gerar(api, formato).await {
        Ok(documento) => {
            let destino = saida.unwrap_or_else(|| PathBuf::from(&documento.nome_arquivo));
            tokio::fs::write(&destino, &documento.bytes)
                .await
                .with_context(|| format!("Não foi possível gravar {}", destino.display()))?;
            println!("✅ {} ({})", destino.display(), wizard.status().rotulo());
            Ok(())
        }
        Err(ErroGeracao::Passo { passo, resultado }) => {
            eprintln!("Passo {} ({}):", passo, passos::titulo(passo));
            for m in &resultado.mensagens {
                eprintln!("  {m}");
            }
            bail!("{}", wizard.status().rotulo())
        }
        Err(e) => bail!("{e}"),
    }
}
