//! Result types returned by [`crate::analyze`].

use crate::report::{render, Document, RenderOutcome};
use serde::Serialize;
use std::path::PathBuf;

/// Everything produced by one analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    /// The raw model text, exactly as returned.
    pub report: String,
    /// `report` parsed into nodes.
    pub document: Document,
    pub image: ImageInfo,
    pub stats: AnalysisStats,
}

impl AnalysisOutput {
    /// The report view for the display layer.
    pub fn outcome(&self) -> RenderOutcome {
        render(Some(&self.report), false)
    }
}

/// What was sent.
#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    /// Source file, when the image came from disk.
    pub path: Option<PathBuf>,
    pub mime_type: String,
    pub size_bytes: u64,
    pub encoded_len: usize,
}

/// Timing and token usage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStats {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub load_duration_ms: u64,
    pub inference_duration_ms: u64,
    pub total_duration_ms: u64,
}
