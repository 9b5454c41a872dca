//! Interactive analysis session: one selection, one report, one alert.
//!
//! Mirrors what a front-end keeps between user actions:
//!
//! ```text
//! select(path) ──▶ analyze() ──▶ view()
//!      ▲               │
//!      └── clear() ◀───┘
//! ```
//!
//! `analyze` borrows the session mutably, so a second request cannot start
//! while one is in flight, and the selection cannot change underneath it.

use crate::analyze::analyze_image;
use crate::config::AnalysisConfig;
use crate::error::PlantDocError;
use crate::output::AnalysisOutput;
use crate::pipeline::input::{self, SelectedImage};
use crate::report::{render, RenderOutcome};
use std::path::Path;
use tracing::debug;

/// State of one user's analysis.
#[derive(Debug)]
pub struct AnalysisSession {
    config: AnalysisConfig,
    selection: Option<SelectedImage>,
    output: Option<AnalysisOutput>,
    alert: Option<String>,
}

impl AnalysisSession {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            selection: None,
            output: None,
            alert: None,
        }
    }

    /// Select a new image, replacing (and dropping) any previous one.
    ///
    /// Clears the previous report and alert. On failure the old selection is
    /// already gone and the error is also stored as the alert.
    pub async fn select(&mut self, path: impl AsRef<Path>) -> Result<&SelectedImage, PlantDocError> {
        self.reset();
        match input::load_image(path, self.config.max_image_bytes).await {
            Ok(image) => {
                debug!("Selected {}", image.path.display());
                Ok(self.selection.insert(image))
            }
            Err(e) => {
                self.alert = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Drop the selection, report and alert.
    pub fn clear(&mut self) {
        self.reset();
    }

    /// Analyze the current selection.
    ///
    /// Clears the previous report and alert first. On failure the user-facing
    /// message is stored as the alert and the error is returned.
    pub async fn analyze(&mut self) -> Result<&AnalysisOutput, PlantDocError> {
        self.output = None;
        self.alert = None;

        let Some(image) = self.selection.as_ref() else {
            let e = PlantDocError::NoImageSelected;
            self.alert = Some(e.user_message());
            return Err(e);
        };

        match analyze_image(image, &self.config).await {
            Ok(out) => Ok(self.output.insert(out)),
            Err(e) => {
                self.alert = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// What the display layer should show right now.
    pub fn view(&self) -> RenderOutcome {
        render(self.output.as_ref().map(|o| o.report.as_str()), false)
    }

    pub fn selection(&self) -> Option<&SelectedImage> {
        self.selection.as_ref()
    }

    pub fn output(&self) -> Option<&AnalysisOutput> {
        self.output.as_ref()
    }

    /// The pending error message, if any.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    fn reset(&mut self) {
        self.selection = None;
        self.output = None;
        self.alert = None;
    }
}
