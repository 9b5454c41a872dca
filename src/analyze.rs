//! One-shot analysis entry points.
//!
//! These wire the pipeline together: load → encode → infer → render. Use
//! [`crate::session::AnalysisSession`] instead when the caller keeps a current
//! selection and report around between actions.

use crate::config::AnalysisConfig;
use crate::error::PlantDocError;
use crate::output::{AnalysisOutput, AnalysisStats, ImageInfo};
use crate::pipeline::encode;
use crate::pipeline::input::{self, SelectedImage};
use crate::pipeline::llm::{GeminiClient, PlantAnalyzer};
use crate::report::Document;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Analyze an image file.
///
/// # Errors
/// - file errors from [`input::load_image`] (`FileNotFound`, `ReadError`,
///   `EncodingError`, `UnsupportedImage`, `ImageTooLarge`)
/// - `ConfigurationError` when no API key is available, before any request
/// - `AuthError` / `ServiceError` from the service
pub async fn analyze_file(
    path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, PlantDocError> {
    let start = Instant::now();
    let path = path.as_ref();
    info!("Starting analysis: {}", path.display());

    let image = match input::load_image(path, config.max_image_bytes).await {
        Ok(img) => img,
        Err(e) => {
            notify_error(config, &e);
            return Err(e);
        }
    };
    let load_ms = start.elapsed().as_millis() as u64;

    let mut output = analyze_image(&image, config).await?;
    output.stats.load_duration_ms = load_ms;
    output.stats.total_duration_ms = start.elapsed().as_millis() as u64;
    Ok(output)
}

/// Analyze an image held in memory.
///
/// `mime_type` is sent as given when present; otherwise it is sniffed from
/// the bytes. Empty and oversized buffers are rejected either way.
pub async fn analyze_bytes(
    bytes: &[u8],
    mime_type: Option<&str>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, PlantDocError> {
    let label = Path::new("<memory>");
    let checked = match mime_type {
        Some(mime) => input::check_size(label, bytes, config.max_image_bytes).map(|()| mime.to_string()),
        None => input::validate_image(label, bytes, config.max_image_bytes),
    };
    let mime_type = match checked {
        Ok(m) => m,
        Err(e) => {
            notify_error(config, &e);
            return Err(e);
        }
    };

    let image = SelectedImage {
        path: label.to_path_buf(),
        bytes: bytes.to_vec(),
        mime_type,
    };
    let mut output = analyze_image(&image, config).await?;
    output.image.path = None;
    Ok(output)
}

/// Synchronous wrapper around [`analyze_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_file_sync(
    path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, PlantDocError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PlantDocError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze_file(path, config))
}

/// Write rendered output to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn write_output(path: impl AsRef<Path>, contents: &str) -> Result<(), PlantDocError> {
    let path = path.as_ref();
    let fail = |source| PlantDocError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(fail)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents).await.map_err(fail)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(fail)?;
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Encode, infer and render an already-loaded image.
pub(crate) async fn analyze_image(
    image: &SelectedImage,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, PlantDocError> {
    let result = run_inference(image, config).await;
    if let Err(ref e) = result {
        notify_error(config, e);
    }
    result
}

async fn run_inference(image: &SelectedImage, config: &AnalysisConfig) -> Result<AnalysisOutput, PlantDocError> {
    let encoded = encode::encode_image(image)?;
    let analyzer = resolve_analyzer(config)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_start(&encoded.mime_type, encoded.data.len());
    }

    let infer_start = Instant::now();
    let reply = analyzer.analyze(&encoded).await?;
    let inference_ms = infer_start.elapsed().as_millis() as u64;

    info!(
        "Analysis complete: {} bytes of report in {}ms",
        reply.text.len(),
        inference_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_complete(reply.text.len());
    }

    Ok(AnalysisOutput {
        document: Document::parse(&reply.text),
        image: ImageInfo {
            path: Some(image.path.clone()),
            mime_type: encoded.mime_type,
            size_bytes: image.size(),
            encoded_len: encoded.data.len(),
        },
        stats: AnalysisStats {
            input_tokens: reply.input_tokens,
            output_tokens: reply.output_tokens,
            load_duration_ms: 0,
            inference_duration_ms: inference_ms,
            total_duration_ms: inference_ms,
        },
        report: reply.text,
    })
}

/// Use the injected analyzer if any, otherwise build the Gemini client.
fn resolve_analyzer(config: &AnalysisConfig) -> Result<Arc<dyn PlantAnalyzer>, PlantDocError> {
    if let Some(ref analyzer) = config.analyzer {
        return Ok(Arc::clone(analyzer));
    }
    Ok(Arc::new(GeminiClient::new(config)?))
}

fn notify_error(config: &AnalysisConfig, error: &PlantDocError) {
    warn!("Analysis failed: {}", error);
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_error(&error.to_string());
    }
}
