//! CLI binary for pdf-ocr-web.
//!
//! A thin shim over the library crate: maps CLI flags to a `Frontend`,
//! replays the upload page's events, and prints what the page would show.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_ocr_web::keys::{MISTRAL_KEY, OPENAI_KEY};
use pdf_ocr_web::{
    ClientConfig, EventOutcome, FileKeyStore, Frontend, HttpTransport, KeyStore, MarkdownRenderer,
    MemoryKeyStore, PageObserver, UiEvent, UploadFile,
};
use std::io;
use std::path::{Path, PathBuf};
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

// ── Terminal observer ────────────────────────────────────────────────────────

/// Prints each status line as it is logged and shows a spinner while the
/// page's loading indicator is visible.
struct CliObserver {
    quiet: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliObserver {
    fn new(quiet: bool) -> Arc<Self> {
        Arc::new(Self {
            quiet,
            spinner: Mutex::new(None),
        })
    }

    fn print(&self, line: String) {
        match self.spinner.lock().ok().and_then(|s| s.clone()) {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }
}

impl PageObserver for CliObserver {
    fn on_status_line(&self, line: &str) {
        if !self.quiet {
            self.print(dim(line.trim_matches('\n')));
        }
    }

    fn on_error(&self, message: &str) {
        self.print(format!("{} {}", red("✗"), red(message)));
    }

    fn on_loader(&self, visible: bool) {
        let Ok(mut slot) = self.spinner.lock() else {
            return;
        };
        if visible && !self.quiet {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg}  ⏱ {elapsed_precise}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
            );
            bar.set_message("서버에서 처리 중…");
            bar.enable_steady_tick(Duration::from_millis(80));
            *slot = Some(bar);
        } else if let Some(bar) = slot.take() {
            bar.finish_and_clear();
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert two PDFs on a local server
  ocr-web a.pdf b.pdf

  # Use spelling correction and save an HTML preview report
  ocr-web --use-openai --report preview.html scan.pdf

  # Save the returned archives and verify every preview image loads
  ocr-web --download-dir out/ --check-images scan.pdf

  # Machine-readable summary
  ocr-web --json scan.pdf > outcome.json

KEYS:
  Keys are read from --keys-file (a JSON object with "mistral_api_key" and
  "openai_api_key"), then overridden by --mistral-api-key / --openai-api-key
  or their environment variables. Missing keys are sent as empty strings and
  the server falls back to its own configuration.

ENVIRONMENT VARIABLES:
  OCR_WEB_BASE_URL   Server origin (default http://127.0.0.1:5001)
  OCR_WEB_KEYS_FILE  Saved key file
  MISTRAL_API_KEY    Primary OCR key
  OPENAI_API_KEY     Spelling-correction key
"#;

/// Upload PDFs to the OCR web service and show the results.
#[derive(Parser, Debug)]
#[command(
    name = "ocr-web",
    version,
    about = "Upload PDFs to the OCR web service and preview the Markdown it returns",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files to upload.
    files: Vec<PathBuf>,

    /// Server origin.
    #[arg(long, env = "OCR_WEB_BASE_URL", default_value = pdf_ocr_web::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// JSON file holding saved API keys.
    #[arg(long, env = "OCR_WEB_KEYS_FILE")]
    keys_file: Option<PathBuf>,

    /// Primary (OCR) API key.
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    mistral_api_key: Option<String>,

    /// Secondary (spelling-correction) API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Ask the server to run spelling correction.
    #[arg(long, env = "OCR_WEB_USE_OPENAI")]
    use_openai: bool,

    /// Give up on the request after this many seconds.
    #[arg(long, env = "OCR_WEB_TIMEOUT")]
    timeout: Option<u64>,

    /// Write an HTML snapshot of the page to this file.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Expand every preview in the report.
    #[arg(long)]
    expand: bool,

    /// Show previews as raw Markdown instead of rendering them.
    #[arg(long)]
    raw_preview: bool,

    /// Save every returned archive into this directory.
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Try to load every preview thumbnail and flag the broken ones.
    #[arg(long)]
    check_images: bool,

    /// Print the outcome as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OCR_WEB_VERBOSE")]
    verbose: bool,

    /// Suppress status lines; errors are still shown.
    #[arg(short, long, env = "OCR_WEB_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Status lines are already echoed by the observer, so library INFO logs
    // are only shown in verbose mode.
    let filter = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build the front end ──────────────────────────────────────────────
    let mut builder = ClientConfig::builder().base_url(cli.base_url.clone());
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    let config = builder.build().context("Invalid configuration")?;
    let base_href = config.base_url.to_string();

    let keys = load_keys(&cli)?;
    let transport = HttpTransport::new(config).context("Failed to create HTTP client")?;
    let renderer: Option<Arc<dyn MarkdownRenderer>> = if cli.raw_preview {
        None
    } else {
        Some(Arc::new(pdf_ocr_web::CommonMarkRenderer))
    };

    let mut frontend = Frontend::new(transport, Arc::new(keys))
        .with_renderer(renderer)
        .with_observer(CliObserver::new(cli.quiet || cli.json));

    // ── Replay the page's events ─────────────────────────────────────────
    let mut files = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        files.push(
            UploadFile::from_path(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        );
    }
    frontend.handle(UiEvent::SelectFiles(files)).await;
    frontend.handle(UiEvent::SetUseOpenAi(cli.use_openai)).await;

    let EventOutcome::Submitted(result) = frontend.handle(UiEvent::Submit).await else {
        anyhow::bail!("submit event was not handled");
    };

    if let Ok(ref outcome) = result {
        if cli.check_images {
            let issues = frontend.check_thumbnails().await;
            if !cli.quiet && !cli.json {
                eprintln!("   {} broken thumbnail(s)", issues.len());
            }
        }

        if let Some(ref dir) = cli.download_dir {
            save_downloads(&frontend, dir).await?;
        }

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(outcome).context("Failed to serialise outcome")?
            );
        } else if !cli.quiet {
            for link in frontend.page().downloads() {
                let source = link
                    .original_filename
                    .as_deref()
                    .map(|n| format!("  {}", dim(&format!("({n})"))))
                    .unwrap_or_default();
                eprintln!("{} {}  {}{}", green("✔"), bold(&link.label), link.href, source);
            }
        }
    }

    // ── Report ───────────────────────────────────────────────────────────
    if let Some(ref path) = cli.report {
        if cli.expand {
            for i in 0..frontend.page().previews().len() {
                frontend.handle(UiEvent::TogglePreview(i)).await;
            }
        }
        tokio::fs::write(path, frontend.page().to_html(Some(base_href.as_str())))
            .await
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        if !cli.quiet {
            eprintln!("   report → {}", bold(&path.display().to_string()));
        }
    }

    result.map(|_| ()).map_err(|e| anyhow::anyhow!(e))
}

/// Merge the key file with explicit flags; flags win.
fn load_keys(cli: &Cli) -> Result<MemoryKeyStore> {
    let file = match cli.keys_file {
        Some(ref path) => Some(
            FileKeyStore::load(path)
                .with_context(|| format!("Failed to load keys from {}", path.display()))?,
        ),
        None => None,
    };
    let saved = |name: &str| file.as_ref().and_then(|f| f.get(name));

    let mut keys = MemoryKeyStore::new();
    if let Some(v) = cli.mistral_api_key.clone().or_else(|| saved(MISTRAL_KEY)) {
        keys = keys.with(MISTRAL_KEY, v);
    }
    if let Some(v) = cli.openai_api_key.clone().or_else(|| saved(OPENAI_KEY)) {
        keys = keys.with(OPENAI_KEY, v);
    }
    Ok(keys)
}

/// Fetch every download link into `dir`, named after its archive.
async fn save_downloads(frontend: &Frontend<HttpTransport>, dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let links: Vec<String> = frontend
        .page()
        .downloads()
        .iter()
        .map(|l| l.href.clone())
        .collect();
    let bodies = frontend.transport().fetch_all(&links).await;

    for (link, body) in frontend.page().downloads().iter().zip(bodies) {
        let Some(file_name) = link.local_file_name() else {
            tracing::warn!("Refusing to save unsafe archive name {:?}", link.zip_filename);
            eprintln!(
                "   {} {}: not a plain file name, skipped",
                red("✗"),
                link.zip_filename
            );
            continue;
        };
        match body {
            Ok(bytes) => {
                let target = dir.join(file_name);
                tokio::fs::write(&target, &bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                eprintln!("   {} {}", green("↓"), target.display());
            }
            Err(reason) => {
                eprintln!("   {} {}: {}", red("✗"), link.zip_filename, reason);
            }
        }
    }
    Ok(())
}
