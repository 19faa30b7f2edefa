//! dost-engine - batch payload generation
//!
//! Reads a JSON array of task requests, resolves and validates each one
//! against the curriculum snapshot, and prints the pipeline report as JSON on
//! stdout. Logs go to stderr (or the configured log file).

use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dost_common::config::{self, LoggingConfig};
use dost_common::CurriculumTree;
use dost_engine::dispatch::HttpResourceSink;
use dost_engine::validation::HttpPortionValidator;
use dost_engine::{AcceptAllValidator, MergePolicy, Pipeline, PipelineConfig, PortionValidator};

/// Command-line arguments for dost-engine
#[derive(Parser, Debug)]
#[command(name = "dost-engine")]
#[command(about = "Resolve task requests against the curriculum and build creation payloads")]
#[command(version)]
struct Args {
    /// Request batch (JSON array or single object); `-` reads stdin
    #[arg(short, long)]
    requests: String,

    /// Curriculum snapshot (JSON)
    #[arg(short, long)]
    tree: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Student id injected into every payload
    #[arg(long, env = "DOST_STUDENT_ID")]
    student_id: Option<String>,

    /// per-request, extractor-marked or by-subject
    #[arg(long)]
    merge_policy: Option<MergePolicy>,

    /// Validator endpoint; without one every resolution is accepted
    #[arg(long, env = "DOST_VALIDATOR_URL")]
    validator_url: Option<String>,

    /// Send the payloads to the resource API after building them
    #[arg(long)]
    dispatch: bool,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = config::load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&toml_config.logging)?;

    info!("Starting dost-engine v{}", env!("CARGO_PKG_VERSION"));

    let tree_path = config::resolve_tree_path(args.tree.as_deref(), &toml_config)?;
    let tree = Arc::new(
        CurriculumTree::load(&tree_path)
            .with_context(|| format!("Failed to load curriculum from {}", tree_path.display()))?,
    );
    let stats = tree.stats();
    info!(
        streams = stats.streams,
        subjects = stats.subjects,
        chapters = stats.chapters,
        concepts = stats.concepts,
        "Curriculum loaded from {}",
        tree_path.display()
    );

    let mut pipeline_config = PipelineConfig::from_toml(&toml_config)?;
    if let Some(policy) = args.merge_policy {
        pipeline_config.merge_policy = policy;
    }
    if args.student_id.is_some() {
        pipeline_config.student_id = args.student_id.clone();
    }

    let validator_url = args.validator_url.clone().or_else(|| toml_config.validation.endpoint.clone());
    let validator: Arc<dyn PortionValidator> = match validator_url {
        Some(url) => {
            info!("Validator: {}", url);
            Arc::new(HttpPortionValidator::new(
                url,
                Duration::from_secs(toml_config.validation.timeout_secs),
            )?)
        }
        None => {
            warn!("No validator configured, accepting every resolution");
            Arc::new(AcceptAllValidator)
        }
    };

    let records = read_requests(&args.requests)?;
    let pipeline = Pipeline::new(tree, validator, pipeline_config);
    let mut report = pipeline.run(records).await;

    if args.dispatch {
        let sink = HttpResourceSink::from_config(&toml_config.dispatch)
            .context("--dispatch needs a [dispatch] section with base_url")?;
        pipeline.dispatch(&sink, &mut report).await;
    }

    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}

/// Log to stderr or the configured file; RUST_LOG overrides the level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let writer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();
    Ok(())
}

/// Read the batch; a lone object is treated as a batch of one
fn read_requests(source: &str) -> Result<Vec<Value>> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read requests from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?
    };

    let batch: Value = serde_json::from_str(&content).context("Request batch is not valid JSON")?;
    match batch {
        Value::Array(records) => Ok(records),
        record @ Value::Object(_) => Ok(vec![record]),
        other => bail!("Request batch must be an array or object, got {}", other),
    }
}
