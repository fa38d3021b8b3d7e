// This is free and unencumbered software released into the public domain.

use live_camera_module::shared::{
    CameraError, CameraEvent, CameraFacing, CameraPreviewScreen, ManualClock, PreviewConfig, Size,
    SurfaceListener,
    drivers::simulated::{DeviceCall, SimulatedHost, SimulatedSurface},
};
use std::{sync::mpsc::sync_channel, time::Duration};

use CameraFacing::*;

fn tail(calls: &[DeviceCall], n: usize) -> &[DeviceCall] {
    &calls[calls.len().saturating_sub(n)..]
}

#[test]
fn full_lifecycle_stops_then_releases_once() {
    let host = SimulatedHost::with_facings(&[Back, Front]);
    let journal = host.journal();
    let mut screen = CameraPreviewScreen::new(Box::new(host), PreviewConfig::default());
    let surface = SimulatedSurface::new(42);

    screen.on_surface_available(&surface, 1080, 1920).unwrap();
    screen.on_surface_size_changed(&surface, 1920, 1080);
    screen.on_surface_updated(&surface);
    assert!(screen.capture_configuration().is_some());
    assert!(screen.on_surface_destroyed(&surface));
    assert!(screen.capture_configuration().is_none());
    assert!(screen.camera().is_none());
    drop(screen);

    let calls = journal.calls();
    assert_eq!(calls[0], DeviceCall::Open(1));
    assert_eq!(calls[1], DeviceCall::GetParameters);
    assert!(matches!(calls[2], DeviceCall::SetParameters(_)));
    assert_eq!(calls[3], DeviceCall::SetPreviewSurface(42));
    assert_eq!(calls[4], DeviceCall::StartPreview);
    assert_eq!(tail(&calls, 2), &[DeviceCall::StopPreview, DeviceCall::Release]);
    assert_eq!(journal.count(&DeviceCall::StopPreview), 1);
    assert_eq!(journal.count(&DeviceCall::Release), 1);
}

#[test]
fn bind_failure_is_swallowed_and_camera_still_released() {
    let host = SimulatedHost::with_facings(&[Front]).with_bind_failure();
    let journal = host.journal();
    let (events_tx, events_rx) = sync_channel(8);
    let mut screen =
        CameraPreviewScreen::new(Box::new(host), PreviewConfig::default()).with_events(events_tx);
    let surface = SimulatedSurface::new(1);

    screen.on_surface_available(&surface, 640, 480).unwrap();
    assert!(!screen.is_previewing());
    assert!(screen.camera().is_some());
    assert_eq!(journal.count(&DeviceCall::StartPreview), 0);
    assert!(matches!(events_rx.try_recv(), Ok(CameraEvent::Warning { .. })));

    assert!(screen.on_surface_destroyed(&surface));
    assert_eq!(
        tail(&journal.calls(), 2),
        &[DeviceCall::StopPreview, DeviceCall::Release]
    );
    assert_eq!(journal.count(&DeviceCall::Release), 1);
}

#[test]
fn rear_only_device_list_is_fatal() {
    let host = SimulatedHost::with_facings(&[Back]);
    let journal = host.journal();
    let mut screen = CameraPreviewScreen::new(Box::new(host), PreviewConfig::default());

    let err = screen
        .on_surface_available(&SimulatedSurface::new(1), 640, 480)
        .unwrap_err();
    assert!(matches!(err, CameraError::NoFacingCamera(Front)));
    assert!(journal.calls().is_empty());
    assert!(screen.on_surface_destroyed(&SimulatedSurface::new(1)));
}

#[test]
fn fatal_error_after_open_releases_device() {
    let host = SimulatedHost::with_facings(&[Front]).with_parameters_failure();
    let journal = host.journal();
    let mut screen = CameraPreviewScreen::new(Box::new(host), PreviewConfig::default());

    let err = screen
        .on_surface_available(&SimulatedSurface::new(1), 640, 480)
        .unwrap_err();
    assert!(matches!(err, CameraError::DriverError { .. }));
    assert!(screen.camera().is_none());
    assert_eq!(
        journal.calls(),
        vec![
            DeviceCall::Open(0),
            DeviceCall::GetParameters,
            DeviceCall::StopPreview,
            DeviceCall::Release,
        ]
    );
}

#[test]
fn second_surface_releases_previous_camera_first() {
    let host = SimulatedHost::with_facings(&[Front]);
    let journal = host.journal();
    let mut screen = CameraPreviewScreen::new(Box::new(host), PreviewConfig::default());

    screen
        .on_surface_available(&SimulatedSurface::new(1), 640, 480)
        .unwrap();
    screen
        .on_surface_available(&SimulatedSurface::new(2), 640, 480)
        .unwrap();

    let calls = journal.calls();
    let second_open = calls
        .iter()
        .rposition(|c| *c == DeviceCall::Open(0))
        .unwrap();
    assert!(second_open > 0);
    assert_eq!(
        &calls[second_open - 2..second_open],
        &[DeviceCall::StopPreview, DeviceCall::Release]
    );
    assert_eq!(journal.count(&DeviceCall::Release), 1);
}

#[test]
fn rotation_is_270_for_any_requested_size() {
    for (w, h) in [(320, 240), (1920, 1080), (176, 144), (4000, 3000)] {
        let host = SimulatedHost::with_facings(&[Front]);
        let journal = host.journal();
        let mut screen = CameraPreviewScreen::new(Box::new(host), PreviewConfig::new(w, h, 30));
        screen
            .on_surface_available(&SimulatedSurface::new(1), w, h)
            .unwrap();

        let applied = journal
            .calls()
            .into_iter()
            .find_map(|c| match c {
                DeviceCall::SetParameters(p) => Some(p),
                _ => None,
            })
            .unwrap();
        assert_eq!(applied.rotation, 270);
        assert_eq!(screen.capture_configuration().unwrap().rotation, 270);
    }
}

#[test]
fn resolved_sizes_fall_back_to_nearest() {
    let host = SimulatedHost::with_facings(&[Front]);
    let mut screen = CameraPreviewScreen::new(Box::new(host), PreviewConfig::new(300, 200, 24));
    screen
        .on_surface_available(&SimulatedSurface::new(1), 300, 200)
        .unwrap();

    let capture = screen.capture_configuration().unwrap();
    assert_eq!(capture.preview_size, Size::new(320, 240));
    assert_eq!(capture.picture_size, Size::new(320, 240));
    // Nearest fixed range to 24fps among 15 and 30 is 30.
    assert_eq!(capture.fps_thousandths, 30_000);
}

#[test]
fn fps_is_logged_once_per_window() {
    let host = SimulatedHost::with_facings(&[Front]);
    let clock = ManualClock::default();
    let (events_tx, events_rx) = sync_channel(64);
    let mut screen = CameraPreviewScreen::with_clock(
        Box::new(host),
        PreviewConfig::default(),
        Box::new(clock.clone()),
    )
    .with_events(events_tx);
    let surface = SimulatedSurface::new(1);
    screen.on_surface_available(&surface, 320, 240).unwrap();

    let mut samples = Vec::new();
    for _ in 0..300 {
        clock.advance(Duration::from_millis(100));
        screen.on_surface_updated(&surface);
        while let Ok(event) = events_rx.try_recv() {
            if let CameraEvent::FrameRate { sample, .. } = event {
                samples.push(sample);
            }
        }
    }

    // 30s of frames at 10fps: one sample every 5s.
    assert_eq!(samples.len(), 6);
    for sample in samples {
        assert_eq!(sample.frames, 50);
        assert!(sample.elapsed >= Duration::from_millis(5_000));
        assert!((sample.fps - 10.0).abs() < 1e-9);
    }
}

#[test]
fn dropping_the_screen_releases_the_camera() {
    let host = SimulatedHost::with_facings(&[Front]);
    let journal = host.journal();
    {
        let mut screen = CameraPreviewScreen::new(Box::new(host), PreviewConfig::default());
        screen
            .on_surface_available(&SimulatedSurface::new(1), 640, 480)
            .unwrap();
    }
    assert_eq!(journal.count(&DeviceCall::Release), 1);
}

#[test]
fn invalid_config_is_rejected_before_opening() {
    let host = SimulatedHost::with_facings(&[Front]);
    let journal = host.journal();
    let mut screen =
        CameraPreviewScreen::new(Box::new(host), PreviewConfig::default().with_rotation(45));
    let err = screen
        .on_surface_available(&SimulatedSurface::new(1), 640, 480)
        .unwrap_err();
    assert!(matches!(err, CameraError::InvalidConfig(_)));
    assert!(journal.calls().is_empty());
}
