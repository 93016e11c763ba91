//! shotpipe: Command-line front end for the capture pipeline
//!
//! Runs trigger actions headlessly. Region actions replay a scripted drag
//! given with `--select`; without it the selector is dismissed.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shotpipe::{
    capture::FrameSource,
    config::{JsonSettingsStore, SETTINGS_ENV, Settings, SettingsProvider},
    delivery::{Clipboard, DeliveryPipeline, FsLocalStore, Notifier, SuppaFtpTransport},
    model::{CaptureAction, Point, SelectionRect},
    orchestrator::{CaptureOrchestrator, TriggerOutcome},
    selection::{ScriptedSurfaceFactory, SelectionEvent, drag},
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "shotpipe")]
#[command(about = "Capture, select and deliver screenshots")]
struct Cli {
    /// Settings file (defaults to <config dir>/shotpipe/settings.json)
    #[arg(long, global = true, env = SETTINGS_ENV)]
    settings: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one capture action and deliver the result
    Capture {
        /// Action name, e.g. screenshotWithSelection or fullscreenScreenshot
        action: CaptureAction,
        /// Region to drag on the frame, as X,Y,W,H in pixels
        #[arg(long, value_parser = parse_selection)]
        select: Option<SelectionRect>,
    },
    /// List active displays as JSON
    Displays,
    /// Check the configured FTP server and credentials
    TestFtp,
    /// Print the effective settings
    Settings {
        /// Print the JSON schema instead
        #[arg(long)]
        schema: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respects RUST_LOG environment variable
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shotpipe=info"));
    let logs = fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr);
    if cli.log_json {
        logs.json().init();
    } else {
        logs.init();
    }
    let settings_path = cli.settings.unwrap_or_else(JsonSettingsStore::default_path);
    let store = Arc::new(
        JsonSettingsStore::load(&settings_path)
            .with_context(|| format!("loading settings from {}", settings_path.display()))?,
    );

    match cli.command {
        Commands::Capture { action, select } => capture(store, action, select).await,
        Commands::Displays => displays().await,
        Commands::TestFtp => test_ftp(store).await,
        Commands::Settings { schema } => print_settings(store.as_ref(), schema),
    }
}

async fn capture(
    store: Arc<JsonSettingsStore>,
    action: CaptureAction,
    select: Option<SelectionRect>,
) -> Result<()> {
    let script = match select {
        Some(rect) => drag(
            Point::new(rect.x, rect.y),
            Point::new(rect.x + rect.width, rect.y + rect.height),
        ),
        None => vec![SelectionEvent::Escape],
    };
    if select.is_some() && !action.uses_selection() {
        warn!("--select is ignored for {}", action);
    }

    let orchestrator = CaptureOrchestrator::new(
        create_backend()?,
        Arc::new(ScriptedSurfaceFactory::with_script(script)),
        create_pipeline(),
        store,
    );

    match orchestrator.trigger(action).await? {
        TriggerOutcome::Delivered(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.succeeded() {
                warn!("Capture was not saved anywhere; set localSavePath or enable FTP");
            }
        }
        TriggerOutcome::Cancelled => println!("Selection cancelled"),
        TriggerOutcome::RecordingUnsupported { mode } => {
            anyhow::bail!("{} capture needs screen recording, which is not supported", mode)
        }
    }
    Ok(())
}

async fn displays() -> Result<()> {
    let backend = create_backend()?;
    let displays = backend.displays().await?;
    println!("{}", serde_json::to_string_pretty(&displays)?);
    Ok(())
}

async fn test_ftp(store: Arc<JsonSettingsStore>) -> Result<()> {
    let settings = store.settings();
    let pipeline = create_pipeline();

    if let Err(e) = pipeline.test_ftp_connection(&settings.ftp).await {
        anyhow::bail!("{}\n  hint: {}", e, e.remediation_hint());
    }
    println!("✓ Connected to {} as {}", settings.ftp.address(), settings.ftp.username);
    Ok(())
}

fn print_settings(store: &JsonSettingsStore, schema: bool) -> Result<()> {
    if schema {
        let schema = schemars::schema_for!(Settings);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let mut settings = store.settings();
    if !settings.ftp.password.is_empty() {
        settings.ftp.password = "<redacted>".to_string();
    }
    for (accelerator, actions) in settings.shortcut_conflicts() {
        warn!("Shortcut {} is bound to {:?}", accelerator, actions);
    }

    info!("Settings file: {}", store.path().display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// The screen backend compiled into this binary
///
/// Without `xcap-backend` there is no real screen to read. Refusing here
/// keeps synthetic frames out of the user's save folder, FTP server and
/// clipboard.
fn create_backend() -> Result<Arc<dyn FrameSource>> {
    #[cfg(feature = "xcap-backend")]
    {
        Ok(Arc::new(shotpipe::capture::XcapBackend::new()))
    }

    #[cfg(not(feature = "xcap-backend"))]
    {
        anyhow::bail!(
            "shotpipe was built without a screen capture backend; rebuild with `--features xcap-backend`"
        )
    }
}

fn create_pipeline() -> DeliveryPipeline {
    #[cfg(feature = "desktop")]
    let (clipboard, notifier): (Arc<dyn Clipboard>, Arc<dyn Notifier>) = (
        Arc::new(shotpipe::delivery::SystemClipboard::new()),
        Arc::new(shotpipe::delivery::DesktopNotifier::default()),
    );

    #[cfg(not(feature = "desktop"))]
    let (clipboard, notifier): (Arc<dyn Clipboard>, Arc<dyn Notifier>) = (
        Arc::new(shotpipe::delivery::LogClipboard),
        Arc::new(shotpipe::delivery::LogNotifier),
    );

    DeliveryPipeline::new(Arc::new(FsLocalStore::new()), Arc::new(SuppaFtpTransport::new()), clipboard, notifier)
}

fn parse_selection(value: &str) -> Result<SelectionRect, String> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("expected X,Y,W,H numbers: {}", e))?;

    match parts.as_slice() {
        [x, y, width, height] if *width >= 0.0 && *height >= 0.0 => Ok(SelectionRect {
            x:      *x,
            y:      *y,
            width:  *width,
            height: *height,
        }),
        [_, _, _, _] => Err("width and height must not be negative".to_string()),
        _ => Err(format!("expected 4 values X,Y,W,H, got {}", parts.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        let rect = parse_selection("10, 20, 300, 200").unwrap();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (10.0, 20.0, 300.0, 200.0));

        assert!(parse_selection("10,20,300").is_err());
        assert!(parse_selection("10,20,-5,200").is_err());
        assert!(parse_selection("a,b,c,d").is_err());
    }

    #[cfg(not(feature = "xcap-backend"))]
    #[test]
    fn test_capture_refused_without_screen_backend() {
        let err = create_backend().err().expect("no backend compiled in");
        assert!(err.to_string().contains("xcap-backend"));
    }
}
