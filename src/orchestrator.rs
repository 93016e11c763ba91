//! Trigger actions end to end
//!
//! [`CaptureOrchestrator::trigger`] runs one action:
//!
//! ```text
//! resolve display ─► acquire frame ─► [select ─► crop] ─► encode ─► deliver
//! ```
//!
//! Region actions go through the selector; fullscreen actions deliver the
//! whole frame. Video actions stop before delivery with
//! [`TriggerOutcome::RecordingUnsupported`].

use std::sync::Arc;

use tracing::Instrument;

use crate::{
    capture::{Frame, FrameAcquirer, FrameSource, crop_frame},
    config::SettingsProvider,
    delivery::DeliveryPipeline,
    error::{CaptureError, CaptureResult, DeliveryResult},
    model::{CaptureAction, CaptureArtifact, CaptureMode, DeliveryOutcome},
    selection::{RegionSelector, SelectionOutcome, SurfaceFactory},
    util::{encode::encode_png, filename::screenshot_filename_now},
};

/// How a trigger ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The capture went through the delivery pipeline
    Delivered(DeliveryOutcome),
    /// The user dismissed the selector; nothing was delivered
    Cancelled,
    /// The action needs screen recording, which is not available
    RecordingUnsupported {
        /// Mode of the action
        mode: CaptureMode,
    },
}

/// Owns every service a trigger needs
pub struct CaptureOrchestrator {
    acquirer: FrameAcquirer,
    selector: RegionSelector,
    delivery: DeliveryPipeline,
    settings: Arc<dyn SettingsProvider>,
}

impl CaptureOrchestrator {
    /// Wires the orchestrator from its services
    pub fn new(
        source: Arc<dyn FrameSource>,
        surfaces: Arc<dyn SurfaceFactory>,
        delivery: DeliveryPipeline,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            acquirer: FrameAcquirer::new(source),
            selector: RegionSelector::new(surfaces),
            delivery,
            settings,
        }
    }

    /// Frame acquirer, for listing displays
    pub fn acquirer(&self) -> &FrameAcquirer {
        &self.acquirer
    }

    /// Runs one trigger action
    ///
    /// # Errors
    ///
    /// - [`CaptureError::NoDisplays`] - No display to capture
    /// - [`CaptureError::DisplayNotFound`] - The display vanished before capture
    /// - [`CaptureError::SelectorBusy`] - A selection session is already open
    /// - [`CaptureError::EncodingFailed`] - The PNG could not be produced
    /// - Any capture failure from the backend
    ///
    /// Delivery problems are not errors; they show up in the
    /// [`DeliveryOutcome`].
    pub async fn trigger(&self, action: CaptureAction) -> CaptureResult<TriggerOutcome> {
        let span = tracing::info_span!("capture", action = %action);
        let result = self.run(action).instrument(span.clone()).await;

        if let Err(e) = &result {
            span.in_scope(|| tracing::error!(hint = e.remediation_hint(), "Capture failed: {}", e));
        }
        result
    }

    async fn run(&self, action: CaptureAction) -> CaptureResult<TriggerOutcome> {
        let mode = action.mode();
        let active = self.acquirer.active_display().await?;

        if action == CaptureAction::FullscreenVideo {
            tracing::warn!(display_id = active.id, "Screen recording is not supported");
            return Ok(TriggerOutcome::RecordingUnsupported { mode });
        }

        let frame = self.acquirer.acquire(&active).await?;

        let frame = if action.uses_selection() {
            match self.selector.run(frame, mode).await? {
                SelectionOutcome::Cancelled => return Ok(TriggerOutcome::Cancelled),
                SelectionOutcome::Selected { .. } if mode == CaptureMode::Video => {
                    tracing::warn!("Screen recording is not supported");
                    return Ok(TriggerOutcome::RecordingUnsupported { mode });
                }
                SelectionOutcome::Selected { rect, frame, .. } => crop_frame(&frame, &rect),
            }
        } else {
            frame
        };

        if mode == CaptureMode::ScreenshotWithEditor {
            tracing::debug!("Image editor unavailable, delivering the unedited capture");
        }

        let artifact = encode_artifact(frame).await?;
        let settings = self.settings.settings();
        let outcome = self.delivery.deliver(&artifact, &settings).await;

        Ok(TriggerOutcome::Delivered(outcome))
    }

    /// Tests the FTP connection from the current settings
    pub async fn test_ftp_connection(&self) -> DeliveryResult<()> {
        let settings = self.settings.settings();
        self.delivery.test_ftp_connection(&settings.ftp).await
    }
}

/// Encodes a frame as a timestamped PNG artifact off the async runtime
async fn encode_artifact(frame: Frame) -> CaptureResult<CaptureArtifact> {
    let filename = screenshot_filename_now();
    let (width, height) = (frame.width(), frame.height());

    let bytes = tokio::task::spawn_blocking(move || encode_png(frame.image()))
        .await
        .map_err(|e| CaptureError::EncodingFailed {
            format: "png".to_string(),
            reason: format!("encoder task failed: {}", e),
        })??;

    tracing::debug!("Encoded {}x{} capture as {} ({} bytes)", width, height, filename, bytes.len());
    Ok(CaptureArtifact {
        bytes,
        filename,
        width,
        height,
    })
}
