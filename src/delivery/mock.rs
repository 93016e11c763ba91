//! In-memory delivery doubles
//!
//! Used by tests and by the CLI when uploads are not wanted.

use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use super::{Clipboard, FtpTransport, Notifier};
use crate::{
    config::FtpSettings,
    error::{DeliveryError, DeliveryResult},
    model::Notification,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A file received by [`MockFtpTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    /// Host it was sent to
    pub host:        String,
    /// Remote directory
    pub remote_path: String,
    /// File name
    pub filename:    String,
    /// File contents
    pub bytes:       Vec<u8>,
}

/// Failure a [`MockFtpTransport`] should simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpFailure {
    /// Reject the login
    Auth,
    /// Drop the connection
    Network,
}

/// FTP transport that records uploads instead of sending them
#[derive(Debug, Default)]
pub struct MockFtpTransport {
    failure: Option<FtpFailure>,
    uploads: Mutex<Vec<RecordedUpload>>,
    calls:   AtomicUsize,
}

impl MockFtpTransport {
    /// Creates a transport accepting every upload
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail the given way
    pub fn with_failure(mut self, failure: FtpFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Uploads received so far
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        lock(&self.uploads).clone()
    }

    /// Number of upload and connection-test calls, failed ones included
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, settings: &FtpSettings) -> DeliveryResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(FtpFailure::Auth) => Err(DeliveryError::FtpAuth {
                host:   settings.host.clone(),
                reason: "530 Login incorrect.".to_string(),
            }),
            Some(FtpFailure::Network) => Err(DeliveryError::FtpNetwork {
                host:   settings.host.clone(),
                reason: "Connection refused".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FtpTransport for MockFtpTransport {
    async fn upload(&self, settings: &FtpSettings, filename: &str, bytes: &[u8]) -> DeliveryResult<()> {
        self.check(settings)?;
        lock(&self.uploads).push(RecordedUpload {
            host:        settings.host.clone(),
            remote_path: settings.remote_path.clone(),
            filename:    filename.to_string(),
            bytes:       bytes.to_vec(),
        });
        Ok(())
    }

    async fn test_connection(&self, settings: &FtpSettings) -> DeliveryResult<()> {
        self.check(settings)
    }
}

/// Clipboard keeping every text written to it
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    history: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    /// Creates an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// The current contents
    pub fn text(&self) -> Option<String> {
        lock(&self.history).last().cloned()
    }

    /// Every text written, oldest first
    pub fn history(&self) -> Vec<String> {
        lock(&self.history).clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) {
        lock(&self.history).push(text.to_string());
    }
}

/// Notifier keeping every notification shown
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Creates an empty notifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications shown so far
    pub fn shown(&self) -> Vec<Notification> {
        lock(&self.shown).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, notification: &Notification) {
        lock(&self.shown).push(notification.clone());
    }
}
