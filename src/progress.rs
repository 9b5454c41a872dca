//! Progress-callback trait for analysis events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to learn when a
//! request goes out and when it comes back. The CLI uses it to show the
//! loading view (see [`crate::report::render`] with `is_loading = true`) while
//! the request is in flight.
//!
//! # Example
//!
//! ```rust
//! use plantdoc::{AnalysisConfig, AnalysisProgressCallback};
//! use std::sync::Arc;
//!
//! struct Log;
//!
//! impl AnalysisProgressCallback for Log {
//!     fn on_analysis_complete(&self, report_len: usize) {
//!         eprintln!("report: {report_len} bytes");
//!     }
//! }
//!
//! let config = AnalysisConfig::builder()
//!     .progress_callback(Arc::new(Log) as Arc<dyn AnalysisProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the analysis pipeline at its I/O boundaries.
///
/// All methods default to no-ops.
pub trait AnalysisProgressCallback: Send + Sync {
    /// The image is encoded and the inference request is about to be sent.
    ///
    /// # Arguments
    /// * `mime_type`     — detected media type of the image
    /// * `encoded_len`   — length of the base64 payload
    fn on_analysis_start(&self, mime_type: &str, encoded_len: usize) {
        let _ = (mime_type, encoded_len);
    }

    /// The service answered with a report of `report_len` bytes.
    fn on_analysis_complete(&self, report_len: usize) {
        let _ = report_len;
    }

    /// Loading, encoding or inference failed.
    fn on_analysis_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        report_len: AtomicUsize,
        errors: Mutex<Vec<String>>,
    }

    impl AnalysisProgressCallback for TrackingCallback {
        fn on_analysis_start(&self, _mime_type: &str, _encoded_len: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_analysis_complete(&self, report_len: usize) {
            self.report_len.store(report_len, Ordering::SeqCst);
        }

        fn on_analysis_error(&self, error: &str) {
            self.errors.lock().unwrap().push(error.to_string());
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_analysis_start("image/png", 12);
        cb.on_analysis_complete(42);
        cb.on_analysis_error("some error");
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_analysis_start("image/jpeg", 100);
        tracker.on_analysis_complete(250);
        tracker.on_analysis_error("timeout");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.report_len.load(Ordering::SeqCst), 250);
        assert_eq!(*tracker.errors.lock().unwrap(), vec!["timeout".to_string()]);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_analysis_start("image/gif", 1);
    }
}
