//! CLI binary for pdfdrop.
//!
//! A thin shim over the library crate: maps CLI flags to `ClientConfig`,
//! turns arguments into `AppEvent`s and draws presenter events on the
//! terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdfdrop::{
    App, AppEvent, ClientConfig, Dispatched, FileSummary, HttpBackend, NotificationKind,
    PdfBackend, Presenter, ResultSummary, SelectedFile, WorkflowKind, WorkflowState,
};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Terminal presenter using indicatif ───────────────────────────────────────

/// Draws workflow events on stderr: the staged file list, a spinner while a
/// request is in flight, and one coloured line per notification.
struct CliPresenter {
    /// Spinner shown while `Submitting`; `None` otherwise.
    spinner: Mutex<Option<ProgressBar>>,
    show_progress: bool,
    quiet: bool,
}

impl CliPresenter {
    fn new(show_progress: bool, quiet: bool) -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
            show_progress,
            quiet,
        })
    }

    /// Print above the spinner if one is active, so the line is not erased.
    fn println(&self, line: String) {
        if self.quiet {
            return;
        }
        match self.spinner.lock().ok().as_deref().and_then(Option::as_ref) {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    fn start_spinner(&self, workflow: WorkflowKind) {
        if !self.show_progress {
            return;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix(match workflow {
            WorkflowKind::Convert => "Converting",
            WorkflowKind::Merge => "Merging",
        });
        bar.set_message("uploading…");
        bar.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(bar);
        }
    }

    fn stop_spinner(&self) {
        let bar = self.spinner.lock().ok().and_then(|mut slot| slot.take());
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
    }
}

impl Presenter for CliPresenter {
    fn on_selection_changed(&self, workflow: WorkflowKind, files: &[FileSummary], can_submit: bool) {
        if files.is_empty() {
            return;
        }
        self.println(format!(
            "{} {} {} file(s) staged for {}",
            cyan("◆"),
            bold("Selected"),
            files.len(),
            workflow
        ));
        for (i, f) in files.iter().enumerate() {
            self.println(format!(
                "  {:>2}. {}  {}",
                i + 1,
                f.name,
                dim(&f.size_label)
            ));
        }
        if !can_submit {
            self.println(dim("  (not ready to submit yet)"));
        }
    }

    fn on_state_changed(&self, workflow: WorkflowKind, state: WorkflowState) {
        match state {
            WorkflowState::Submitting => self.start_spinner(workflow),
            _ => self.stop_spinner(),
        }
    }

    fn on_result_ready(&self, _workflow: WorkflowKind, result: &ResultSummary) {
        self.println(format!("  {}", dim(&result.info)));
    }

    fn on_notification_shown(&self, kind: NotificationKind, text: &str) {
        match kind {
            NotificationKind::Success => self.println(format!("{} {}", green("✔"), text)),
            NotificationKind::Error => self.println(format!("{} {}", red("✘"), red(text))),
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert the first page of a PDF to JPG (written to the current directory)
  pdfdrop convert report.pdf

  # Merge PDFs in the given order into ./out
  pdfdrop merge cover.pdf body.pdf appendix.pdf -o out

  # Check the backend
  pdfdrop health
  pdfdrop info --json

LIMITS:
  Only PDF files are accepted, each at most 10 MB.
  Merge needs at least 2 files.

ENVIRONMENT VARIABLES:
  PDFDROP_API_URL          Backend base URL (default http://localhost:8000)
  PDFDROP_REQUEST_TIMEOUT  Whole-request timeout in seconds (default: none)
  PDFDROP_NOTIFY_MS        Notification lifetime in milliseconds (default 5000)
  RUST_LOG                 Override log filter (e.g. pdfdrop=debug)
"#;

/// Convert PDFs to JPG or merge them, via a PDF processing service.
#[derive(Parser, Debug)]
#[command(
    name = "pdfdrop",
    version,
    about = "Convert PDFs to JPG or merge them via a PDF processing service",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Backend base URL.
    #[arg(long, global = true, env = "PDFDROP_API_URL")]
    api_url: Option<String>,

    /// Whole-request timeout in seconds.
    #[arg(long, global = true, env = "PDFDROP_REQUEST_TIMEOUT")]
    timeout: Option<u64>,

    /// Disable the spinner.
    #[arg(long, global = true, env = "PDFDROP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDFDROP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and written paths.
    #[arg(short, long, global = true, env = "PDFDROP_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert the first page of a PDF to a JPG.
    Convert {
        /// PDF to convert.
        file: PathBuf,

        /// Directory to write `converted-<ms>.jpg` into.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Merge two or more PDFs, in the order given.
    Merge {
        /// PDFs to merge.
        #[arg(num_args = 2.., required = true)]
        files: Vec<PathBuf>,

        /// Directory to write `merged-<ms>.pdf` into.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Check the backend's health endpoint.
    Health,

    /// Show the backend's service description.
    Info {
        /// Print raw JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would interleave with the spinner; keep them off
    // unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    match cli.command {
        Command::Convert { ref file, ref output } => {
            let app = App::connect(config, CliPresenter::new(show_progress, cli.quiet))
                .context("Failed to set up HTTP client")?;
            let file = SelectedFile::from_path(file).await?;

            app.dispatch(AppEvent::SelectConvert(file)).await?;
            app.dispatch(AppEvent::SubmitConvert)
                .await
                .context("Conversion failed")?;
            report_export(app.dispatch(AppEvent::ExportConvert(output.clone())).await?);
        }

        Command::Merge { ref files, ref output } => {
            let app = App::connect(config, CliPresenter::new(show_progress, cli.quiet))
                .context("Failed to set up HTTP client")?;

            let mut selected = Vec::with_capacity(files.len());
            for path in files {
                selected.push(SelectedFile::from_path(path).await?);
            }

            app.dispatch(AppEvent::SelectMerge(selected)).await?;
            app.dispatch(AppEvent::SubmitMerge)
                .await
                .context("Merge failed")?;
            report_export(app.dispatch(AppEvent::ExportMerge(output.clone())).await?);
        }

        Command::Health => {
            let backend = HttpBackend::new(config).context("Failed to set up HTTP client")?;
            let health = backend
                .health()
                .await
                .with_context(|| format!("{} is unreachable", backend.config().base_url))?;
            if health.is_healthy() {
                println!("{} {}", green("✔"), health.status);
            } else {
                println!("{} {}", red("✘"), health.status);
                anyhow::bail!("Backend reports status '{}'", health.status);
            }
        }

        Command::Info { json } => {
            let backend = HttpBackend::new(config).context("Failed to set up HTTP client")?;
            let info = backend
                .service_info()
                .await
                .context("Failed to fetch service info")?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&info).context("Failed to serialise service info")?
                );
            } else {
                println!("Service:   {}", info.message);
                println!("Version:   {}", info.version);
                println!("Docs:      {}", backend.config().docs_url());
                for (name, route) in &info.endpoints {
                    println!("  {:<12} {}", name, dim(route));
                }
            }
        }
    }

    Ok(())
}

/// Map CLI args onto `ClientConfig`, starting from the environment.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let env = ClientConfig::from_env().context("Invalid environment configuration")?;

    let mut builder = ClientConfig::builder()
        .base_url(cli.api_url.clone().unwrap_or(env.base_url))
        .max_file_bytes(env.max_file_bytes)
        .notification_lifetime_ms(env.notification_lifetime_ms);
    if let Some(secs) = cli.timeout.or(env.request_timeout_secs) {
        builder = builder.request_timeout_secs(secs);
    }

    builder.build().context("Invalid configuration")
}

fn report_export(outcome: Dispatched) {
    if let Dispatched::Exported(path) = outcome {
        // Path on stdout so it can be piped; everything else is on stderr.
        println!("{}", path.display());
    }
}
