//! Integration tests for region selection sessions
//!
//! Drives [`RegionSelector`] over scripted surfaces and checks both the
//! outcome and what the surface was asked to draw.

mod common;

use std::{sync::Arc, time::Duration};

use common::{Harness, files_in, local_settings, small_display};
use shotpipe::{
    capture::{Frame, ImageBuffer, MockBackend},
    delivery::MockFtpTransport,
    error::CaptureError,
    model::{CaptureAction, CaptureMode, Point, SelectionRect},
    orchestrator::TriggerOutcome,
    selection::{
        RegionSelector, ScriptedSurfaceFactory, SelectionEvent, SelectionOutcome, drag, render::ACCENT,
    },
};
use tempfile::TempDir;

fn frame() -> Frame {
    Frame::new(ImageBuffer::from_test_pattern(400, 300), small_display())
}

#[tokio::test]
async fn test_drags_in_all_four_directions() {
    let anchor = Point::new(200.0, 150.0);
    let ends = [
        Point::new(320.0, 230.0),
        Point::new(80.0, 230.0),
        Point::new(320.0, 70.0),
        Point::new(80.0, 70.0),
    ];

    for end in ends {
        let factory = Arc::new(ScriptedSurfaceFactory::with_script(drag(anchor, end)));
        let selector = RegionSelector::new(factory.clone());

        let outcome = selector.run(frame(), CaptureMode::Screenshot).await.unwrap();

        let SelectionOutcome::Selected { rect, .. } = outcome else {
            panic!("Expected a selection for drag to {:?}", end);
        };
        assert_eq!(
            rect,
            SelectionRect {
                x:      anchor.x.min(end.x),
                y:      anchor.y.min(end.y),
                width:  120.0,
                height: 80.0,
            }
        );
    }
}

#[tokio::test]
async fn test_views_follow_the_drag() {
    let factory = Arc::new(ScriptedSurfaceFactory::with_script(drag(
        Point::new(100.0, 100.0),
        Point::new(200.0, 160.0),
    )));
    let selector = RegionSelector::new(factory.clone());

    selector.run(frame(), CaptureMode::Screenshot).await.unwrap();

    let log = factory.log();
    let labels: Vec<Option<String>> = log
        .presented
        .iter()
        .map(|view| view.size_label.as_ref().map(|label| label.text.clone()))
        .collect();

    assert_eq!(
        labels,
        vec![
            None,
            None,
            Some("50 × 30".to_string()),
            Some("100 × 60".to_string()),
            Some("100 × 60".to_string()),
        ]
    );
    assert!(log.presented.iter().all(|view| view.caption == "Select area to capture"));
    assert!(log.presented.iter().all(|view| view.hint == "Drag to select • ESC to cancel"));
    assert!(log.presented.iter().all(|view| view.dimensions == (400, 300)));

    // Final view outlines the selection
    let last = log.last_view.unwrap();
    assert_eq!(*last.image.get_pixel(150, 100), ACCENT);
}

#[tokio::test]
async fn test_retry_after_undersized_release() {
    let mut events = drag(Point::new(50.0, 50.0), Point::new(55.0, 55.0));
    events.extend(drag(Point::new(50.0, 50.0), Point::new(150.0, 150.0)));
    let factory = Arc::new(ScriptedSurfaceFactory::with_script(events));
    let selector = RegionSelector::new(factory.clone());

    let outcome = selector.run(frame(), CaptureMode::Screenshot).await.unwrap();

    match outcome {
        SelectionOutcome::Selected { rect, .. } => assert_eq!(rect.width, 100.0),
        other => panic!("Expected Selected, got {:?}", other),
    }
    assert_eq!(factory.log().opened.len(), 1);
}

#[tokio::test]
async fn test_overlapping_region_triggers() {
    let dir = TempDir::new().unwrap();
    let surfaces = ScriptedSurfaceFactory::new().with_event_delay(Duration::from_millis(150));
    surfaces.push_script(drag(Point::new(10.0, 10.0), Point::new(110.0, 110.0)));
    let h = Arc::new(Harness::with_parts(
        MockBackend::new().with_displays(vec![small_display()]),
        surfaces,
        MockFtpTransport::new(),
        local_settings(&dir),
    ));

    let first = {
        let h = h.clone();
        tokio::spawn(async move { h.orchestrator.trigger(CaptureAction::RegionScreenshot).await })
    };
    tokio::time::sleep(Duration::from_millis(60)).await;

    let second = h.orchestrator.trigger(CaptureAction::RegionScreenshotWithEditor).await;
    assert!(matches!(second, Err(CaptureError::SelectorBusy)));

    let first = first.await.unwrap().unwrap();
    assert!(matches!(first, TriggerOutcome::Delivered(_)));
    assert_eq!(files_in(&dir).len(), 1);
}

#[tokio::test]
async fn test_surface_open_failure_surfaces() {
    let h = Harness::with_parts(
        MockBackend::new().with_displays(vec![small_display()]),
        ScriptedSurfaceFactory::new().failing_open("no compositor"),
        MockFtpTransport::new(),
        shotpipe::config::Settings::default(),
    );

    let result = h.orchestrator.trigger(CaptureAction::RegionScreenshot).await;

    assert!(matches!(result, Err(CaptureError::SurfaceUnavailable { .. })));
}

#[tokio::test]
async fn test_surface_disappearing_cancels() {
    let factory = Arc::new(ScriptedSurfaceFactory::with_script(vec![
        SelectionEvent::PointerDown(Point::new(10.0, 10.0)),
        SelectionEvent::PointerMove(Point::new(90.0, 90.0)),
    ]));
    let selector = RegionSelector::new(factory.clone());

    let outcome = selector.run(frame(), CaptureMode::Video).await.unwrap();

    assert_eq!(outcome, SelectionOutcome::Cancelled);
    assert_eq!(factory.log().closed, 1);
    assert_eq!(factory.log().presented[0].caption, "Select area to record");
}
