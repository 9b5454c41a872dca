//! CLI binary for plantdoc.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalysisConfig`, drives an `AnalysisSession` over each image and prints
//! the rendered report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use plantdoc::{
    display, render, write_output, AnalysisConfig, AnalysisOutput, AnalysisProgressCallback,
    AnalysisSession, ProgressCallback, RenderOutcome,
};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

/// Status-line styling; plain text when `colored` is false.
#[derive(Clone, Copy)]
struct Style {
    colored: bool,
}

impl Style {
    fn paint(self, code: &str, s: &str) -> String {
        if self.colored {
            format!("\x1b[{code}m{s}\x1b[0m")
        } else {
            s.to_string()
        }
    }
    fn green(self, s: &str) -> String {
        self.paint("32", s)
    }
    fn red(self, s: &str) -> String {
        self.paint("31", s)
    }
    fn dim(self, s: &str) -> String {
        self.paint("2", s)
    }
    fn bold(self, s: &str) -> String {
        self.paint("1", s)
    }
}

/// `NO_COLOR` disables colour when set to any non-empty value.
fn no_color_env(value: Option<&std::ffi::OsStr>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Shows the loading view as a spinner while a request is in flight.
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn finish(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_analysis_start(&self, mime_type: &str, encoded_len: usize) {
        let (message, detail) = match render(None, true) {
            RenderOutcome::Loading { message, detail } => (message, detail),
            _ => return,
        };

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix(message);
        bar.set_message(format!(
            "{detail} ({mime_type}, {} KiB)",
            encoded_len / 1024
        ));
        bar.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn on_analysis_complete(&self, _report_len: usize) {
        self.finish();
    }

    fn on_analysis_error(&self, _error: &str) {
        self.finish();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Diagnose one photo
  plantdoc leaf.jpg

  # Several photos, one after the other
  plantdoc tomato.png rose.jpg

  # HTML fragment to a file
  plantdoc --format html leaf.jpg -o report.html

  # Structured output (raw report, parsed document, token usage)
  plantdoc --format json leaf.jpg > report.json

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY      Google Gemini API key
  API_KEY             Fallback API key variable
  PLANTDOC_API_KEY    Same as --api-key
  PLANTDOC_MODEL      Same as --model
  RUST_LOG            Override log filter (e.g. plantdoc=debug)

ACCEPTED IMAGES:
  PNG, JPEG, GIF, WebP up to 10 MB (see --max-image-bytes)
"#;

/// Diagnose plant health from photos using a multimodal LLM.
#[derive(Parser, Debug)]
#[command(
    name = "plantdoc",
    version,
    about = "Diagnose plant diseases and health from a photo using Gemini",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image files to analyze (PNG, JPEG, GIF, WebP).
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Write output to this file instead of stdout.
    #[arg(short, long, env = "PLANTDOC_OUTPUT")]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(long, env = "PLANTDOC_FORMAT", value_enum, default_value = "terminal")]
    format: FormatArg,

    /// Gemini API key. Defaults to GEMINI_API_KEY, then API_KEY.
    #[arg(long, env = "PLANTDOC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model ID.
    #[arg(long, env = "PLANTDOC_MODEL", default_value = plantdoc::config::DEFAULT_MODEL)]
    model: String,

    /// API base URL (scheme and host).
    #[arg(long, env = "PLANTDOC_BASE_URL", default_value = plantdoc::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "PLANTDOC_TEMPERATURE", default_value_t = 0.5)]
    temperature: f32,

    /// Nucleus sampling cutoff (0.0–1.0).
    #[arg(long, env = "PLANTDOC_TOP_P", default_value_t = 0.9)]
    top_p: f32,

    /// Top-k sampling cutoff.
    #[arg(long, env = "PLANTDOC_TOP_K", default_value_t = 40)]
    top_k: u32,

    /// Path to a text file containing a custom system instruction.
    #[arg(long, env = "PLANTDOC_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "PLANTDOC_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Largest accepted image, in bytes.
    #[arg(long, env = "PLANTDOC_MAX_IMAGE_BYTES",
          default_value_t = plantdoc::config::DEFAULT_MAX_IMAGE_BYTES)]
    max_image_bytes: u64,

    /// Disable ANSI colours (also set by a non-empty NO_COLOR).
    #[arg(long)]
    no_color: bool,

    /// Disable the loading spinner.
    #[arg(long, env = "PLANTDOC_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PLANTDOC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the report.
    #[arg(short, long, env = "PLANTDOC_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    /// Styled text for the terminal.
    Terminal,
    /// HTML fragment.
    Html,
    /// JSON `AnalysisOutput`.
    Json,
    /// The raw model text.
    Markdown,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the spinner is active.
    let show_progress = !cli.quiet && !cli.no_progress && io::stderr().is_terminal();
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn AnalysisProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;

    // ── Run analyses ─────────────────────────────────────────────────────
    let no_color = cli.no_color || no_color_env(std::env::var_os("NO_COLOR").as_deref());
    let colored = !no_color && cli.output.is_none() && io::stdout().is_terminal();
    let style = Style {
        colored: !no_color && io::stderr().is_terminal(),
    };
    let mut session = AnalysisSession::new(config);
    let mut rendered: Vec<String> = Vec::new();
    let mut outputs: Vec<AnalysisOutput> = Vec::new();
    let mut failures = 0usize;

    for path in &cli.images {
        if !cli.quiet && cli.images.len() > 1 {
            eprintln!("{} {}", style.bold("◆"), path.display());
        }

        let analyzed = match session.select(path).await.map(|_| ()) {
            Ok(()) => session.analyze().await.map(|_| ()),
            Err(e) => Err(e),
        };
        if analyzed.is_err() {
            failures += 1;
            if let Some(alert) = session.alert() {
                eprintln!("{} {}", style.red("✗ Error:"), alert);
            }
            session.dismiss_alert();
            continue;
        }

        if let Some(output) = session.output() {
            if !cli.quiet {
                eprintln!(
                    "{} {}  {}",
                    style.green("✓"),
                    path.display(),
                    style.dim(&format!(
                        "{} tokens in / {} out, {}ms",
                        output.stats.input_tokens,
                        output.stats.output_tokens,
                        output.stats.inference_duration_ms
                    )),
                );
            }
            match cli.format {
                FormatArg::Terminal => rendered.push(display::to_terminal(&session.view(), colored)),
                FormatArg::Html => rendered.push(display::to_html(&session.view())),
                FormatArg::Markdown => rendered.push(ensure_newline(&output.report)),
                FormatArg::Json => outputs.push(output.clone()),
            }
        }
    }

    let text = if cli.format == FormatArg::Json {
        let json = if outputs.len() == 1 {
            serde_json::to_string_pretty(&outputs[0])
        } else {
            serde_json::to_string_pretty(&outputs)
        };
        ensure_newline(&json.context("Failed to serialise output")?)
    } else {
        rendered.join("\n")
    };

    // ── Emit ─────────────────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        write_output(output_path, &text)
            .await
            .context("Failed to write output")?;
        if !cli.quiet {
            eprintln!(
                "{}  →  {}",
                style.green("✔"),
                style.bold(&output_path.display().to_string())
            );
        }
    } else if !text.is_empty() {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
    }

    if failures > 0 {
        anyhow::bail!("{failures}/{} images failed", cli.images.len());
    }
    Ok(())
}

/// Map CLI args to `AnalysisConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AnalysisConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut builder = AnalysisConfig::builder()
        .model(&cli.model)
        .base_url(&cli.base_url)
        .temperature(cli.temperature)
        .top_p(cli.top_p)
        .top_k(cli.top_k)
        .api_timeout_secs(cli.api_timeout)
        .max_image_bytes(cli.max_image_bytes);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn ensure_newline(s: &str) -> String {
    if s.ends_with('\n') {
        s.to_string()
    } else {
        format!("{s}\n")
    }
}
