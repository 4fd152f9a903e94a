//! fieldops-install - Installation completion CLI
//!
//! Submits a completion form to the back-office API and prints the save
//! report, or lists the candidates for one dependent form field.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fieldops_common::config::{
    self, TomlConfig, API_TOKEN_ENV_VAR, API_URL_ENV_VAR, CONFIG_ENV_VAR,
};
use fieldops_common::events::{EventBus, FieldOpsEvent};
use fieldops_install::input;
use fieldops_install::models::{SaveReport, Severity};
use fieldops_install::resolver::{DependentSelectionResolver, OptionEntry, SelectionLevel};
use fieldops_install::services::{CompletionOrchestrator, FormSession, MediaNormalizer, SizePolicy};
use fieldops_install::RestBackend;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for fieldops-install
#[derive(Parser, Debug)]
#[command(name = "fieldops-install")]
#[command(about = "Installation job order completion for the fieldops back office")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Back-office API base URL
    #[arg(long, global = true, env = API_URL_ENV_VAR)]
    api_url: Option<String>,

    /// Back-office API bearer token
    #[arg(long, global = true, env = API_TOKEN_ENV_VAR, hide_env_values = true)]
    api_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save a completion form
    Submit {
        /// Completion form (JSON)
        #[arg(short, long)]
        form: PathBuf,

        /// Captured image for a media slot, as <kind>=<path>
        #[arg(short, long = "media", value_name = "KIND=PATH")]
        media: Vec<String>,

        /// Downsize captured images to this percentage of their dimensions
        #[arg(long)]
        resize_percent: Option<u32>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the options for one dependent field
    Options {
        /// Reference catalogs (JSON)
        #[arg(long)]
        catalogs: PathBuf,

        /// Completion form (JSON) holding the parent selections
        #[arg(short, long)]
        form: PathBuf,

        /// region, city, barangay, location, lcp, nap or port
        #[arg(short, long)]
        level: SelectionLevel,
    },

    /// Write a config file seeded with the API URL and token given
    ///
    /// Writes to --config when set, else the per-user config location.
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Config is loaded before tracing so the configured level applies.
    // init-config creates the file, so there is nothing to load yet.
    let toml_config = match args.command {
        Command::InitConfig { .. } => TomlConfig::default(),
        _ => config::load_config(args.config.as_deref())
            .context("Failed to load configuration")?,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Command::Submit {
            form,
            media,
            resize_percent,
            json,
        } => {
            let settings = config::resolve_api_settings(
                args.api_url.as_deref(),
                args.api_token.as_deref(),
                &toml_config,
            )
            .context("Back-office API is not configured")?;

            let policy = SizePolicy::with_override(resize_percent, &toml_config.media);

            let form = input::load_form(&form).context("Failed to load completion form")?;
            let preview_dir = toml_config
                .media
                .preview_dir
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join("fieldops-previews"));

            let mut session = FormSession::open(form, MediaNormalizer::new(policy), preview_dir)
                .context("Failed to open form session")?;
            for arg in &media {
                let (kind, path) = input::parse_media_arg(arg)?;
                let capture = input::read_capture(&path)?;
                session
                    .attach_media(kind, capture)
                    .with_context(|| format!("Failed to attach {}", kind.key()))?;
            }
            let form = session.close();

            let backend = RestBackend::new(&settings).context("Failed to create API client")?;
            let event_bus = EventBus::new(100);
            let progress = tokio::spawn(log_progress(event_bus.subscribe()));

            info!(job_id = %form.job_id, api = %settings.base_url, "Submitting completion");
            let orchestrator = CompletionOrchestrator::new(Arc::new(backend), event_bus)
                .with_ledger_concurrency(toml_config.ledger.write_concurrency);
            let result = orchestrator.submit(&form).await;
            drop(orchestrator);
            // Orchestrator (and its bus sender) dropped, so the logger ends
            let _ = progress.await;

            let report = result.context("Completion was not submitted")?;
            print_report(&report, json)?;

            Ok(if report.has_errors() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }

        Command::Options {
            catalogs,
            form,
            level,
        } => {
            let catalogs = input::load_catalogs(&catalogs).context("Failed to load catalogs")?;
            let form = input::load_form(&form).context("Failed to load completion form")?;

            let options = DependentSelectionResolver::new(&catalogs).options_for(level, &form);
            for entry in options.rendered() {
                match entry {
                    OptionEntry::Catalog(value) => println!("{}", value),
                    OptionEntry::Stale(value) => println!("{} (no longer offered)", value),
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::InitConfig { force } => {
            let path = match args.config {
                Some(path) => path,
                None => config::user_config_path()
                    .context("No per-user config directory; pass --config")?,
            };
            let seeded = TomlConfig {
                api_base_url: args.api_url,
                api_token: args.api_token,
                ..toml_config
            };
            config::init_config(&seeded, &path, force)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Log save progress until the bus closes
async fn log_progress(mut rx: broadcast::Receiver<FieldOpsEvent>) {
    loop {
        match rx.recv().await {
            Ok(FieldOpsEvent::SaveProgress {
                step, percentage, ..
            }) => {
                info!(step = %step, percentage, "Save progress");
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Progress logger lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_report(report: &SaveReport, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(report).context("Failed to serialize save report")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("Job {} ({}%, {} ms)", report.job_id, report.percentage, report.duration_ms);
    for entry in &report.entries {
        let tag = match entry.severity {
            Severity::Success => "OK  ",
            Severity::Warning => "WARN",
            Severity::Error => "FAIL",
        };
        println!("  [{}] {}", tag, entry.message);
    }
    Ok(())
}
