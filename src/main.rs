//! # Vorlage CLI
//!
//! Usage:
//!   vorlage job.json -o angebot.pdf
//!   echo '{ ... }' | vorlage -o angebot.pdf
//!   vorlage job.json --config render.json
//!   vorlage --example > job.json
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vorlage::config::RenderConfig;
use vorlage::error::VorlageError;
use vorlage::fetch::HttpFetcher;

#[derive(Parser, Debug)]
#[command(name = "vorlage")]
#[command(version, about = "Render a document template with business data to PDF", long_about = None)]
struct Cli {
    /// Render job (JSON). Reads stdin when omitted.
    #[arg(value_name = "JOB")]
    input: Option<PathBuf>,

    /// Output PDF path
    #[arg(short, long, value_name = "FILE", default_value = "output.pdf")]
    output: PathBuf,

    /// Renderer configuration (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a sample render job and exit
    #[arg(long)]
    example: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.example {
        print!("{}", example_job_json());
        return ExitCode::SUCCESS;
    }

    match run(&cli).await {
        Ok(written) => {
            eprintln!("✓ Written {} bytes to {}", written, cli.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<usize, VorlageError> {
    let config = match &cli.config {
        Some(path) => RenderConfig::from_path(path)?,
        None => RenderConfig::default(),
    };

    let input = match &cli.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let fetcher = HttpFetcher::new(&config)?;
    let pdf = vorlage::render_json(&input, &fetcher, &config).await?;
    fs::write(&cli.output, &pdf)?;
    Ok(pdf.len())
}

fn example_job_json() -> &'static str {
    r##"{
  "template": {
    "id": "relocato-angebot",
    "companyType": "relocato",
    "templateType": "quote",
    "name": "Umzugsangebot",
    "pageSettings": {
      "format": "A4",
      "orientation": "portrait",
      "margins": { "top": 20, "right": 20, "bottom": 20, "left": 20 }
    },
    "contentBlocks": [
      {
        "id": "kopf",
        "blockType": "header",
        "position": 0,
        "pageNumber": 1,
        "xPosition": 20,
        "yPosition": 20,
        "settings": { "font": { "size": 18, "weight": "bold" } },
        "content": { "text": "Angebot {{quoteNumber}}" }
      },
      {
        "id": "firma",
        "blockType": "company_info",
        "position": 1,
        "pageNumber": 1,
        "xPosition": 120,
        "yPosition": 35,
        "width": 70,
        "content": { "data": { "website": false } }
      },
      {
        "id": "kunde",
        "blockType": "customer_info",
        "position": 2,
        "pageNumber": 1,
        "xPosition": 20,
        "yPosition": 45,
        "content": {}
      },
      {
        "id": "anrede",
        "blockType": "custom",
        "position": 3,
        "pageNumber": 1,
        "xPosition": 20,
        "yPosition": 85,
        "width": 170,
        "content": { "text": "Sehr geehrte/r {{customer.name}}, vielen Dank für Ihre Anfrage vom {{date}}. Gerne bieten wir Ihnen folgende Leistungen an:" }
      },
      {
        "id": "preise",
        "blockType": "pricing_table",
        "position": 4,
        "pageNumber": 1,
        "xPosition": 20,
        "yPosition": 105,
        "width": 170,
        "content": {
          "items": [
            { "description": "Umzug 3-Zimmer-Wohnung", "quantity": 1, "price": 1200 },
            { "description": "Verpackungsmaterial", "quantity": 1, "price": 85.5 },
            { "description": "Klaviertransport", "price": 350 }
          ]
        }
      },
      {
        "id": "unterschrift",
        "blockType": "signature",
        "position": 5,
        "pageNumber": 1,
        "xPosition": 20,
        "yPosition": 200,
        "width": 170,
        "content": { "leftLabel": "Ort, Datum", "rightLabel": "Auftraggeber" }
      },
      {
        "id": "fuss",
        "blockType": "footer",
        "position": 6,
        "pageNumber": 1,
        "content": { "text": "Relocato GmbH · Musterstraße 1 · 10115 Berlin" }
      },
      {
        "id": "agb",
        "blockType": "terms",
        "position": 0,
        "pageNumber": 2,
        "xPosition": 20,
        "yPosition": 20,
        "width": 170,
        "content": { "text": "Das Angebot ist gültig bis {{quoteValidUntil}}. Es gelten unsere allgemeinen Geschäftsbedingungen." }
      }
    ]
  },
  "company": {
    "name": "Relocato GmbH",
    "address": "Musterstraße 1, 10115 Berlin",
    "phone": "030 1234567",
    "email": "info@relocato.de"
  },
  "customer": {
    "name": "Erika Mustermann",
    "address": "Beispielweg 5, 20095 Hamburg",
    "email": "erika@example.com"
  },
  "quote": {
    "id": "A-2026-0042",
    "price": 1635.5
  }
}
"##
}
