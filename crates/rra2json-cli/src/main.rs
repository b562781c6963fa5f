mod display;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rra2json_core::{Config, SinkConfig, SourceConfig};
use rra2json_extract::{Dispatcher, Outcome, detect_version};
use rra2json_store::{DocumentSource, JsonExportSource, WorkbookSource, read_export};
use rra2json_sync::{
    BugzillaClient, DirectorySink, EventBusClient, NagOutcome, Rotation, ServiceMapClient, Sink,
    nag,
};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "rra2json",
    version,
    about = "Extract Risk Rating Assessments from spreadsheets into JSON records"
)]
struct Cli {
    /// JSON configuration file. Built-in defaults apply when omitted.
    #[arg(long, global = true, env = "RRA2JSON_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse every document and deliver the records.
    Run {
        /// Document directory, overriding the configured source path.
        #[arg(long)]
        source: Option<PathBuf>,
        /// Print records to stdout instead of delivering them.
        #[arg(long)]
        dry_run: bool,
        /// File follow-up bugs for records with missing fields.
        #[arg(long)]
        nag: bool,
        #[arg(long, env = "RRA2JSON_SINK_TOKEN", hide_env_values = true)]
        sink_token: Option<String>,
        #[arg(long, env = "RRA2JSON_BUGZILLA_API_KEY", hide_env_values = true)]
        bugzilla_api_key: Option<String>,
    },
    /// Print the detected template version of every document.
    Detect {
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Parse one JSON export and print its record.
    Show {
        file: PathBuf,
        /// Print a text card instead of JSON.
        #[arg(long)]
        card: bool,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// The configured source, with its directory replaced by `--source` if given.
/// Without any configured source, `--source` names a JSON export directory.
fn open_source(
    config: &Config,
    dir: Option<PathBuf>,
) -> anyhow::Result<Box<dyn DocumentSource>> {
    let source: Box<dyn DocumentSource> = match (&config.source, dir) {
        (Some(SourceConfig::Workbooks { .. }), Some(dir)) => Box::new(WorkbookSource::new(dir)),
        (Some(SourceConfig::Workbooks { path }), None) => Box::new(WorkbookSource::new(path)),
        (_, Some(dir)) => Box::new(JsonExportSource::new(dir)),
        (Some(SourceConfig::Json { path }), None) => Box::new(JsonExportSource::new(path)),
        (None, None) => bail!("no document source: pass --source or configure \"source\""),
    };
    Ok(source)
}

fn build_sink(config: &Config, token: Option<String>) -> anyhow::Result<Box<dyn Sink>> {
    let sink: Box<dyn Sink> = match &config.sink {
        Some(SinkConfig::ServiceMap { url, token: file_token }) => {
            Box::new(ServiceMapClient::new(url, token.or_else(|| file_token.clone())))
        }
        Some(SinkConfig::EventBus { url }) => Box::new(EventBusClient::new(url)),
        Some(SinkConfig::Directory { path }) => Box::new(DirectorySink::new(path)),
        None => bail!("no sink configured; use --dry-run to print records instead"),
    };
    Ok(sink)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Records go to stdout; keep logs off it.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    info!("rra2json v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run {
            source,
            dry_run,
            nag: file_bugs,
            sink_token,
            bugzilla_api_key,
        } => {
            let books = open_source(&config, source)?
                .open_all()
                .context("opening documents")?;
            let report = Dispatcher::from_config(&config).run_batch(&books, Utc::now());

            if dry_run {
                for record in report.records() {
                    println!("{}", serde_json::to_string_pretty(record)?);
                }
            } else {
                let sink = build_sink(&config, sink_token)?;
                let (mut delivered, mut failed) = (0usize, 0usize);
                for record in report.records() {
                    match sink.deliver(record).await {
                        Ok(d) => {
                            delivered += 1;
                            info!(to = %d.target, source = %record.source, "delivered");
                        }
                        Err(e) => {
                            failed += 1;
                            error!(sink = sink.name(), source = %record.source, error = %e, "delivery failed");
                        }
                    }
                }
                info!(sink = sink.name(), delivered, failed, "delivery complete");
            }

            if file_bugs {
                let Some(bz) = &config.bugzilla else {
                    bail!("--nag needs a \"bugzilla\" section in the config");
                };
                let client =
                    BugzillaClient::new(&bz.url, bugzilla_api_key.or_else(|| bz.api_key.clone()));
                let mut rotation = Rotation::new(bz.assignees.clone());
                for record in report.records() {
                    match nag(&client, bz, &mut rotation, record).await {
                        Ok(NagOutcome::Filed(id)) => {
                            info!(bug = id, service = %record.service(), "filed follow-up bug")
                        }
                        Ok(NagOutcome::Updated(id)) => {
                            info!(bug = id, service = %record.service(), "updated open follow-up bug")
                        }
                        Ok(NagOutcome::Complete) => {}
                        Err(e) => {
                            warn!(service = %record.service(), error = %e, "could not file follow-up bug")
                        }
                    }
                }
            }

            // stdout carries the records under --dry-run.
            eprint!("{}", display::render_batch_report(&report));
        }
        Command::Detect { source } => {
            let books = open_source(&config, source)?
                .open_all()
                .context("opening documents")?;
            for book in &books {
                println!(
                    "{:<26} {:<40} {}",
                    book.id,
                    book.name,
                    display::describe_detection(&detect_version(book))
                );
            }
        }
        Command::Show { file, card } => {
            let book = read_export(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            match Dispatcher::from_config(&config).process(&book, Utc::now()) {
                Outcome::Parsed { record, .. } if card => {
                    print!("{}", display::render_record_card(&record))
                }
                Outcome::Parsed { record, .. } => {
                    println!("{}", serde_json::to_string_pretty(&record)?)
                }
                other => bail!("{}: {}", file.display(), display::describe_outcome(&other)),
            }
        }
    }
    Ok(())
}
