//! Delivery of finished captures
//!
//! [`DeliveryPipeline::deliver`] runs four steps, each independent of the
//! others' failures:
//!
//! 1. Save to the local folder (when one is set)
//! 2. Upload over FTP (when enabled and a host is set)
//! 3. Copy the final location to the clipboard (when there is one)
//! 4. Show a notification (when enabled)
//!
//! The upload URL takes precedence over the local path as final location.

use std::{path::Path, sync::Arc};

use crate::{
    config::{FtpSettings, Settings},
    error::{DeliveryError, DeliveryResult},
    model::{CaptureArtifact, DeliveryOutcome},
};

pub mod ftp;
pub mod local;
pub mod mock;
pub mod sinks;

pub use ftp::{FtpTransport, SuppaFtpTransport, remote_url};
pub use local::{FsLocalStore, LocalStore};
pub use mock::{FtpFailure, MemoryClipboard, MockFtpTransport, RecordedUpload, RecordingNotifier};
#[cfg(feature = "desktop")]
pub use sinks::{DesktopNotifier, SystemClipboard};
pub use sinks::{Clipboard, LogClipboard, LogNotifier, Notifier};

/// Local store, FTP transport and sinks used for delivery
#[derive(Clone)]
pub struct DeliveryPipeline {
    local:     Arc<dyn LocalStore>,
    ftp:       Arc<dyn FtpTransport>,
    clipboard: Arc<dyn Clipboard>,
    notifier:  Arc<dyn Notifier>,
}

impl DeliveryPipeline {
    /// Creates a pipeline over the given services
    pub fn new(
        local: Arc<dyn LocalStore>,
        ftp: Arc<dyn FtpTransport>,
        clipboard: Arc<dyn Clipboard>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            local,
            ftp,
            clipboard,
            notifier,
        }
    }

    /// Delivers a capture according to the settings
    ///
    /// Never fails: every step's error is logged and the remaining steps
    /// still run. The local save completes before the upload starts.
    pub async fn deliver(&self, artifact: &CaptureArtifact, settings: &Settings) -> DeliveryOutcome {
        let mut outcome = DeliveryOutcome::default();

        match settings.local_save_dir() {
            Some(dir) => {
                let saved = self.local.save(Path::new(dir), &artifact.filename, &artifact.bytes).await;
                record("local save", saved, |path| {
                    tracing::info!(path = %path.display(), "Saved capture locally");
                    outcome.record_local(path);
                });
            }
            None => tracing::debug!("No local save folder set, skipping local save"),
        }

        if settings.ftp.is_configured() {
            let uploaded = self
                .ftp
                .upload(&settings.ftp, &artifact.filename, &artifact.bytes)
                .await
                .map(|()| remote_url(&settings.ftp, &artifact.filename));
            record("ftp upload", uploaded, |url| {
                tracing::info!(url = %url, "Uploaded capture");
                outcome.record_remote(url);
            });
        }

        if let Some(location) = &outcome.final_location {
            self.clipboard.write_text(location);
        }

        if settings.ui.show_notifications {
            self.notifier.show(&outcome.notification());
        }

        tracing::info!(status = ?outcome.status(), "Delivery finished");
        outcome
    }

    /// Checks that the FTP server accepts the configured credentials
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::FtpAuth`] - Login was rejected
    /// - [`DeliveryError::FtpNetwork`] - No host is set or the server is
    ///   unreachable
    pub async fn test_ftp_connection(&self, settings: &FtpSettings) -> DeliveryResult<()> {
        if settings.host.trim().is_empty() {
            return Err(DeliveryError::FtpNetwork {
                host:   String::new(),
                reason: "no FTP host configured".to_string(),
            });
        }

        let result = self.ftp.test_connection(settings).await;
        match &result {
            Ok(()) => tracing::info!(host = %settings.host, "FTP connection test succeeded"),
            Err(e) => tracing::error!(host = %settings.host, "FTP connection test failed: {}", e),
        }
        result
    }
}

/// Applies a step's value to the outcome, or logs its error and moves on
fn record<T>(step: &str, result: DeliveryResult<T>, apply: impl FnOnce(T)) {
    match result {
        Ok(value) => apply(value),
        Err(e) => tracing::warn!(step, hint = e.remediation_hint(), "Delivery step failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::model::DeliveryStatus;

    struct Harness {
        pipeline:  DeliveryPipeline,
        ftp:       Arc<MockFtpTransport>,
        clipboard: Arc<MemoryClipboard>,
        notifier:  Arc<RecordingNotifier>,
    }

    fn harness(ftp: MockFtpTransport) -> Harness {
        let ftp = Arc::new(ftp);
        let clipboard = Arc::new(MemoryClipboard::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let pipeline =
            DeliveryPipeline::new(Arc::new(FsLocalStore::new()), ftp.clone(), clipboard.clone(), notifier.clone());
        Harness {
            pipeline,
            ftp,
            clipboard,
            notifier,
        }
    }

    fn artifact() -> CaptureArtifact {
        CaptureArtifact {
            bytes:    vec![1, 2, 3],
            filename: "screenshot_2025-08-07_14-30-52.png".to_string(),
            width:    10,
            height:   10,
        }
    }

    fn settings(local: &str, ftp_enabled: bool) -> Settings {
        let mut settings = Settings::default();
        settings.local_save_path = local.to_string();
        settings.ftp = FtpSettings {
            enabled: ftp_enabled,
            host: "ftp.example.com".to_string(),
            remote_path: "shots".to_string(),
            base_url: "https://cdn.example.com".to_string(),
            ..Default::default()
        };
        settings
    }

    #[tokio::test]
    async fn test_local_only() {
        let temp = TempDir::new().unwrap();
        let h = harness(MockFtpTransport::new());

        let outcome = h.pipeline.deliver(&artifact(), &settings(&temp.path().display().to_string(), false)).await;

        let expected = temp.path().join("screenshot_2025-08-07_14-30-52.png");
        assert_eq!(outcome.local_path.as_deref(), Some(expected.as_path()));
        assert_eq!(outcome.status(), DeliveryStatus::SavedLocally);
        assert_eq!(h.clipboard.text(), outcome.final_location);
        assert_eq!(h.notifier.shown()[0].body, "Screenshot saved to local folder");
        assert_eq!(h.ftp.call_count(), 0);
    }

    #[tokio::test]
    async fn test_remote_url_wins() {
        let temp = TempDir::new().unwrap();
        let h = harness(MockFtpTransport::new());

        let outcome = h.pipeline.deliver(&artifact(), &settings(&temp.path().display().to_string(), true)).await;

        let url = "https://cdn.example.com/shots/screenshot_2025-08-07_14-30-52.png";
        assert!(outcome.local_path.is_some());
        assert_eq!(outcome.final_location.as_deref(), Some(url));
        assert_eq!(h.clipboard.history(), vec![url.to_string()]);
        assert_eq!(h.notifier.shown()[0].body, "Screenshot uploaded and URL copied to clipboard");
        assert_eq!(h.ftp.uploads()[0].bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_local_location() {
        let temp = TempDir::new().unwrap();
        let h = harness(MockFtpTransport::new().with_failure(FtpFailure::Auth));

        let outcome = h.pipeline.deliver(&artifact(), &settings(&temp.path().display().to_string(), true)).await;

        assert_eq!(outcome.status(), DeliveryStatus::SavedLocally);
        assert_eq!(outcome.remote_url, None);
        assert_eq!(h.clipboard.text(), outcome.final_location);
    }

    #[tokio::test]
    async fn test_nothing_configured_completes() {
        let h = harness(MockFtpTransport::new());

        let outcome = h.pipeline.deliver(&artifact(), &settings("  ", false)).await;

        assert!(!outcome.succeeded());
        assert_eq!(h.clipboard.text(), None);
        assert_eq!(h.notifier.shown()[0].body, "Screenshot capture completed");
        assert_eq!(h.notifier.shown()[0].title, "Screenshot");
    }

    #[tokio::test]
    async fn test_notifications_can_be_disabled() {
        let temp = TempDir::new().unwrap();
        let h = harness(MockFtpTransport::new());
        let mut settings = settings(&temp.path().display().to_string(), false);
        settings.ui.show_notifications = false;

        let outcome = h.pipeline.deliver(&artifact(), &settings).await;

        assert!(outcome.succeeded());
        assert!(h.notifier.shown().is_empty());
    }

    #[tokio::test]
    async fn test_ftp_enabled_without_host_is_skipped() {
        let h = harness(MockFtpTransport::new());
        let mut settings = settings("", true);
        settings.ftp.host = String::new();

        h.pipeline.deliver(&artifact(), &settings).await;
        assert_eq!(h.ftp.call_count(), 0);
    }

    #[tokio::test]
    async fn test_connection_errors_surface() {
        let h = harness(MockFtpTransport::new().with_failure(FtpFailure::Network));
        let ftp = settings("", true).ftp;

        let result = h.pipeline.test_ftp_connection(&ftp).await;
        assert!(matches!(result, Err(DeliveryError::FtpNetwork { .. })));

        let empty = FtpSettings::default();
        let result = h.pipeline.test_ftp_connection(&empty).await;
        assert!(matches!(result, Err(DeliveryError::FtpNetwork { .. })));
        assert_eq!(h.ftp.call_count(), 1);
    }
}
