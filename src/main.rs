//! SeqImprove CLI
//!
//! Parses annotated descriptions and annotates them through the extraction
//! service.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seqimprove::annotations::{Annotation, AnnotationStore};
use seqimprove::config::Config;
use seqimprove::extract::HttpExtractionProvider;
use seqimprove::record::{DescriptionDocument, SequenceRecord};
use seqimprove::sync::MergeOutcome;
use seqimprove::Session;

#[derive(Parser)]
#[command(name = "seqimprove", version, about = "Annotate sequence record descriptions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a decorated description into plain text and annotations
    Parse {
        /// File holding the decorated description
        file: PathBuf,
    },
    /// Fetch text annotations for a description and merge them
    Annotate {
        /// File holding the decorated description
        file: PathBuf,
        /// Activate every annotation after merging
        #[arg(long)]
        activate: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotationView<'a> {
    id: &'a str,
    display_id: &'a str,
    label: &'a str,
    mentions: &'a [seqimprove::annotations::Mention],
}

impl<'a> From<&'a Annotation> for AnnotationView<'a> {
    fn from(annotation: &'a Annotation) -> Self {
        Self {
            id: &annotation.id,
            display_id: annotation.display_id(),
            label: &annotation.label,
            mentions: &annotation.mentions,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DescriptionView<'a> {
    plain_text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rich_text: Option<&'a str>,
    annotations: Vec<AnnotationView<'a>>,
}

fn views(store: &AnnotationStore) -> Vec<AnnotationView<'_>> {
    store.annotations().iter().map(AnnotationView::from).collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "seqimprove=debug".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    let cli = Cli::parse();

    match cli.command {
        Command::Parse { file } => {
            let description = read_description(&file)?;
            let pattern = config.annotations.markup_pattern()?;
            let store = AnnotationStore::parse(&description, &pattern)?;

            let view = DescriptionView {
                plain_text: store.plain_text(),
                rich_text: None,
                annotations: views(&store),
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Annotate { file, activate } => {
            let description = read_description(&file)?;
            let provider = HttpExtractionProvider::new(&config.extraction)?;

            let mut record = SequenceRecord::new(format!("file://{}", file.display()));
            record.set_rich_description(description);
            let mut session = Session::from_config(record, &config.annotations)?;

            tracing::info!("Annotating {} via {}", file.display(), provider.base_url());
            if let MergeOutcome::Applied(report) = session.load_text_annotations(&provider).await? {
                tracing::info!(
                    "{} annotations added, {} mentions added, {} dropped",
                    report.annotations_added,
                    report.mentions_added,
                    report.mentions_dropped
                );
            }

            if activate {
                session.activate_all_text()?;
            }

            let view = DescriptionView {
                plain_text: session.text_annotations().plain_text(),
                rich_text: session.record().rich_description(),
                annotations: views(session.text_annotations()),
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }

    Ok(())
}

fn read_description(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
