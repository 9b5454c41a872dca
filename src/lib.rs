//! # plantdoc
//!
//! Diagnose plant health from a photo with a multimodal LLM, and render the
//! diagnosis as a structured document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image file
//!  │
//!  ├─ 1. Input   read the file, check size and container (PNG/JPEG/GIF/WebP)
//!  ├─ 2. Encode  bytes → base64 payload
//!  ├─ 3. Infer   one Gemini generateContent call (no retry)
//!  └─ 4. Render  report text → Document (headings, grouped lists, paragraphs)
//! ```
//!
//! The renderer ([`report::render`]) is a pure function and can be used on
//! its own for any text in the same lightweight Markdown dialect.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plantdoc::{analyze_file, display, AnalysisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key from GEMINI_API_KEY (or API_KEY)
//!     let config = AnalysisConfig::default();
//!     let output = analyze_file("leaf.jpg", &config).await?;
//!     print!("{}", display::to_terminal(&output.outcome(), true));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `plantdoc` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod display;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod report;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze_bytes, analyze_file, analyze_file_sync, write_output};
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::{ErrorKind, PlantDocError};
pub use output::{AnalysisOutput, AnalysisStats, ImageInfo};
pub use pipeline::encode::{encode_bytes, encode_file, EncodedImage};
pub use pipeline::llm::{analyze, GeminiClient, InferenceReply, PlantAnalyzer};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{render, Document, DocumentNode, LineKind, ListItem, RenderOutcome};
pub use session::AnalysisSession;
