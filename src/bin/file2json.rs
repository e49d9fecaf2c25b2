//! CLI binary for file2json.
//!
//! A thin shim over the library crate: select one file, run one conversion
//! cycle, print the key metrics and save the artifact.

use anyhow::{Context, Result};
use clap::Parser;
use file2json::selection::{is_accepted_hint, ACCEPTED_EXTENSIONS, MAX_ADVISORY_SIZE};
use file2json::{
    format_file_size, ClientConfig, ConversionClient, ConversionOutcome, Emphasis, File2JsonError,
    Phase, PickerInput, SelectedFile, SessionController, SessionObserver, Severity, Summary,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn blue(s: &str) -> String {
    format!("\x1b[34m{s}\x1b[0m")
}
fn magenta(s: &str) -> String {
    format!("\x1b[35m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

fn paint_emphasis(e: Emphasis, s: &str) -> String {
    match e {
        Emphasis::Green => green(s),
        // Orange has no basic ANSI colour; yellow is the closest.
        Emphasis::Orange | Emphasis::Yellow => yellow(s),
        Emphasis::Purple => magenta(s),
        Emphasis::Red => red(s),
        Emphasis::Blue => blue(s),
    }
}

fn paint_severity(sev: Severity, s: &str) -> String {
    match sev {
        Severity::Error => red(s),
        Severity::Warning => yellow(s),
        Severity::Info => blue(s),
        Severity::Default => dim(s),
    }
}

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Terminal observer: shows a spinner while the single request is in flight.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        Arc::new(Self { bar })
    }
}

impl SessionObserver for CliObserver {
    fn on_phase_change(&self, from: Phase, to: Phase) {
        debug!("phase {from} → {to}");
    }

    fn on_conversion_start(&self, file: &SelectedFile) {
        self.bar.set_prefix("Converting");
        self.bar.set_message(format!(
            "{} {}",
            file.name(),
            dim(&format!("({})", format_file_size(file.size())))
        ));
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_conversion_complete(&self, _file: &SelectedFile, _outcome: &ConversionOutcome) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a spreadsheet; writes budget_converted.json to the current directory
  file2json budget.xlsx

  # Save the artifact elsewhere
  file2json report.pdf -o out/

  # Machine-readable outcome and summary on stdout
  file2json --json --no-download server.log

  # Use a self-hosted service
  file2json --base-url http://localhost:5000 catalog.xml

SUPPORTED FORMATS (advisory, the service decides):
  .pdf .pptx .xlsx .xls .xlsm .csv .docx .xml .txt .log   (max 100MB)

ENVIRONMENT VARIABLES:
  FILE2JSON_BASE_URL      Conversion service base URL
  FILE2JSON_TIMEOUT       Request timeout in seconds (default: none)
  FILE2JSON_OUTPUT_DIR    Directory for the *_converted.json artifact
  RUST_LOG                Override the log filter (e.g. file2json=debug)
"#;

/// Convert a local file to JSON through the conversion service.
#[derive(Parser, Debug)]
#[command(
    name = "file2json",
    version,
    about = "Convert PDF, Office, CSV, XML, text and log files to JSON via a conversion service",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// File to convert. Only the first file is used.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory to save `<name>_converted.json` into.
    #[arg(short, long, env = "FILE2JSON_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Conversion service base URL.
    #[arg(long, env = "FILE2JSON_BASE_URL", default_value = file2json::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds. Unset means no client-side timeout.
    #[arg(long, env = "FILE2JSON_TIMEOUT")]
    timeout: Option<u64>,

    /// Do not write the artifact file.
    #[arg(long, env = "FILE2JSON_NO_DOWNLOAD")]
    no_download: bool,

    /// Do not print the converted payload.
    #[arg(long)]
    no_preview: bool,

    /// Print outcome and summary as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "FILE2JSON_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FILE2JSON_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, env = "FILE2JSON_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Keep INFO lines out of the way of the spinner.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build client ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let client = ConversionClient::new(&config).context("Failed to create HTTP client")?;
    let mut session = SessionController::new(client);
    if show_progress {
        session = session.with_observer(CliObserver::new());
    }

    // ── Select ───────────────────────────────────────────────────────────
    if cli.files.len() > 1 {
        warn!(
            "{} files given; only '{}' will be converted",
            cli.files.len(),
            cli.files[0].display()
        );
    }
    let file = SelectedFile::from_path(&cli.files[0]).context("Cannot select file")?;
    if !is_accepted_hint(file.name()) && !cli.quiet {
        eprintln!(
            "{} '{}' is not one of {}; the service may reject it",
            yellow("⚠"),
            file.name(),
            ACCEPTED_EXTENSIONS.join(" ")
        );
    }
    if file.size() > MAX_ADVISORY_SIZE && !cli.quiet {
        eprintln!(
            "{} '{}' is {}, above the advertised 100MB limit",
            yellow("⚠"),
            file.name(),
            format_file_size(file.size())
        );
    }
    session.handle_picker(PickerInput::new(vec![file]));

    // ── Convert ──────────────────────────────────────────────────────────
    session.convert().await;

    let Some(outcome) = session.state().outcome().cloned() else {
        anyhow::bail!("Conversion did not produce an outcome");
    };
    let summary = session.summary().unwrap_or_default();

    if cli.json {
        let doc = serde_json::json!({
            "file": session.state().selected_file().map(|f| f.name()),
            "outcome": outcome,
            "summary": summary,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&doc).context("Failed to serialise output")?
        );
    } else {
        print_outcome(&session, &outcome, &summary, &cli);
    }

    // ── Export ───────────────────────────────────────────────────────────
    if outcome.is_success() && !cli.no_download {
        match session.export_artifact(&cli.output_dir) {
            Ok(path) => {
                if !cli.quiet {
                    eprintln!("{} saved {}", green("✔"), bold(&path.display().to_string()));
                }
            }
            Err(File2JsonError::NothingToExport) => {
                if !cli.quiet {
                    eprintln!("{} service returned no data; nothing saved", dim("·"));
                }
            }
            Err(e) => return Err(e).context("Failed to save artifact"),
        }
    }

    session.reset();

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder().base_url(&cli.base_url);
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }
    builder.build().context("Invalid configuration")
}

/// Human-readable rendering of one result.
fn print_outcome<C: file2json::Converter>(
    session: &SessionController<C>,
    outcome: &ConversionOutcome,
    summary: &Summary,
    cli: &Cli,
) {
    match outcome {
        ConversionOutcome::Success { message, payload } => {
            let name = session
                .state()
                .selected_file()
                .map(|f| f.name().to_string())
                .unwrap_or_default();
            eprintln!("{} {}  {}", green("✔"), bold(message), dim(&name));

            for m in &summary.metrics {
                eprintln!(
                    "  {:<14} {}",
                    dim(m.label),
                    paint_emphasis(m.emphasis, &bold(&m.display_value()))
                );
            }
            if !summary.categories.is_empty() {
                eprintln!("  {}", dim("Log levels"));
                for c in &summary.categories {
                    eprintln!(
                        "    {:<12} {}",
                        paint_severity(c.severity, &c.name),
                        file2json::summary::coerce_to_string(&c.count)
                    );
                }
            }

            if !cli.no_preview {
                match serde_json::to_string_pretty(payload) {
                    Ok(text) => println!("{text}"),
                    Err(e) => warn!("Could not render payload: {e}"),
                }
            }
        }
        ConversionOutcome::Failure {
            message,
            error_detail,
        } => {
            eprintln!("{} {}", red("✘"), bold(message));
            if let Some(detail) = error_detail {
                eprintln!("  {}", red(detail));
            }
        }
    }
}
