//! Shared test utilities for integration tests
//!
//! [`Harness`] wires a [`CaptureOrchestrator`] to the mock backend, scripted
//! selection surfaces and in-memory delivery doubles, keeping handles to each
//! so tests can inspect what happened.

#![allow(dead_code)]

use std::sync::Arc;

use shotpipe::{
    capture::MockBackend,
    config::{FtpSettings, Settings, StaticSettings},
    delivery::{DeliveryPipeline, FsLocalStore, MemoryClipboard, MockFtpTransport, RecordingNotifier},
    model::{Bounds, Display},
    orchestrator::CaptureOrchestrator,
    selection::ScriptedSurfaceFactory,
};
use tempfile::TempDir;

/// Single small display, so rendering stays cheap
pub fn small_display() -> Display {
    Display::new(0, Bounds::new(0, 0, 400, 300), true)
}

/// Settings saving into `dir` with FTP disabled
pub fn local_settings(dir: &TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.local_save_path = dir.path().display().to_string();
    settings.ftp = FtpSettings::default();
    settings
}

/// Settings with FTP enabled towards the example CDN
pub fn ftp_settings(local: Option<&TempDir>) -> Settings {
    let mut settings = Settings::default();
    settings.local_save_path = local
        .map(|dir| dir.path().display().to_string())
        .unwrap_or_default();
    settings.ftp = FtpSettings {
        enabled: true,
        host: "ftp.example.com".to_string(),
        username: "uploader".to_string(),
        password: "secret".to_string(),
        remote_path: "shots".to_string(),
        base_url: "https://cdn.example.com".to_string(),
        ..Default::default()
    };
    settings
}

/// An orchestrator plus handles to every double behind it
pub struct Harness {
    pub orchestrator: CaptureOrchestrator,
    pub backend:      Arc<MockBackend>,
    pub surfaces:     Arc<ScriptedSurfaceFactory>,
    pub ftp:          Arc<MockFtpTransport>,
    pub clipboard:    Arc<MemoryClipboard>,
    pub notifier:     Arc<RecordingNotifier>,
}

impl Harness {
    /// Builds a harness on a single 400x300 display
    pub fn new(settings: Settings) -> Self {
        Self::with_parts(
            MockBackend::new().with_displays(vec![small_display()]),
            ScriptedSurfaceFactory::new(),
            MockFtpTransport::new(),
            settings,
        )
    }

    /// Builds a harness from explicit doubles
    pub fn with_parts(
        backend: MockBackend,
        surfaces: ScriptedSurfaceFactory,
        ftp: MockFtpTransport,
        settings: Settings,
    ) -> Self {
        let backend = Arc::new(backend);
        let surfaces = Arc::new(surfaces);
        let ftp = Arc::new(ftp);
        let clipboard = Arc::new(MemoryClipboard::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let delivery = DeliveryPipeline::new(
            Arc::new(FsLocalStore::new()),
            ftp.clone(),
            clipboard.clone(),
            notifier.clone(),
        );
        let orchestrator = CaptureOrchestrator::new(
            backend.clone(),
            surfaces.clone(),
            delivery,
            Arc::new(StaticSettings(settings)),
        );

        Self {
            orchestrator,
            backend,
            surfaces,
            ftp,
            clipboard,
            notifier,
        }
    }

    /// Bodies of every notification shown
    pub fn notification_bodies(&self) -> Vec<String> {
        self.notifier.shown().into_iter().map(|n| n.body).collect()
    }
}

/// Files written into a directory
pub fn files_in(dir: &TempDir) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = std::fs::read_dir(dir.path())
        .map(|entries| entries.filter_map(|e| e.ok().map(|e| e.path())).collect())
        .unwrap_or_default();
    files.sort();
    files
}
