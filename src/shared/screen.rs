// This is free and unencumbered software released into the public domain.

use crate::shared::{
    CameraBackend, CameraError, CameraEvent, CameraHost, CameraInfo, CaptureConfiguration, Clock,
    FrameRateCounter, OpenCamera, PreviewConfig, PreviewSurface, SurfaceListener, SystemClock,
    emit, select_camera,
};
use std::sync::mpsc::SyncSender;

/// Streams the preview of the first camera with the configured facing into a
/// host surface for as long as that surface exists.
pub struct CameraPreviewScreen {
    host: Box<dyn CameraHost>,
    config: PreviewConfig,
    camera: Option<OpenCamera>,
    capture: Option<CaptureConfiguration>,
    previewing: bool,
    counter: FrameRateCounter,
    clock: Box<dyn Clock>,
    events_tx: Option<SyncSender<CameraEvent>>,
}

impl core::fmt::Debug for CameraPreviewScreen {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CameraPreviewScreen")
            .field("backend", &self.host.backend())
            .field("config", &self.config)
            .field("camera", &self.camera)
            .field("capture", &self.capture)
            .field("previewing", &self.previewing)
            .finish()
    }
}

impl CameraPreviewScreen {
    pub fn new(host: Box<dyn CameraHost>, config: PreviewConfig) -> Self {
        Self::with_clock(host, config, Box::new(SystemClock))
    }

    pub fn with_clock(
        host: Box<dyn CameraHost>,
        config: PreviewConfig,
        clock: Box<dyn Clock>,
    ) -> Self {
        let counter = FrameRateCounter::new(config.fps_window, clock.now());
        Self {
            host,
            config,
            camera: None,
            capture: None,
            previewing: false,
            counter,
            clock,
            events_tx: None,
        }
    }

    pub fn with_events(mut self, events_tx: SyncSender<CameraEvent>) -> Self {
        self.events_tx = Some(events_tx);
        self
    }

    pub fn backend(&self) -> CameraBackend {
        self.host.backend()
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// The camera currently held, if any.
    pub fn camera(&self) -> Option<&CameraInfo> {
        self.camera.as_ref().map(OpenCamera::info)
    }

    /// The capture settings resolved on the last surface-available.
    pub fn capture_configuration(&self) -> Option<&CaptureConfiguration> {
        self.capture.as_ref()
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing
    }

    pub fn counter(&self) -> &FrameRateCounter {
        &self.counter
    }

    fn find_camera(&self) -> Result<CameraInfo, CameraError> {
        let count = self.host.number_of_cameras()?;
        tracing::debug!(count, "number of cameras");

        let mut cameras = Vec::with_capacity(count);
        for index in 0..count {
            let info = self.host.camera_info(index)?;
            tracing::debug!(
                index,
                id = %info.id,
                facing = %info.facing,
                orientation = info.orientation,
                "probed camera info"
            );
            let found = info.facing == self.config.facing;
            cameras.push(info);
            if found {
                break;
            }
        }

        let index = select_camera(&cameras, self.config.facing)?;
        cameras
            .into_iter()
            .find(|info| info.index == index)
            .ok_or(CameraError::NoCamera(index))
    }

    fn open_camera(&mut self) -> Result<OpenCamera, CameraError> {
        let info = self.find_camera()?;
        let device = self.host.open(info.index)?;
        tracing::info!(
            backend = %self.host.name(),
            camera = %info.id,
            name = %info.name,
            "opened camera"
        );
        Ok(OpenCamera::new(info, device))
    }

    fn release_camera(&mut self) {
        if let Some(camera) = self.camera.take() {
            camera.close();
            if self.previewing {
                emit(self.events_tx.as_ref(), CameraEvent::Stopped {
                    backend: self.host.backend(),
                });
            }
        }
        self.capture = None;
        self.previewing = false;
    }
}

impl SurfaceListener for CameraPreviewScreen {
    fn on_surface_available(
        &mut self,
        surface: &dyn PreviewSurface,
        width: u32,
        height: u32,
    ) -> Result<(), CameraError> {
        tracing::debug!(surface = surface.id(), width, height, "surface available");

        // Only one camera handle may be held at a time.
        self.release_camera();
        self.config.validate()?;

        // The guard releases the device if anything below fails.
        let mut camera = self.open_camera()?;

        let mut params = camera.device().parameters()?;
        let capture = CaptureConfiguration::negotiate(
            &mut params,
            self.config.desired_size(),
            self.config.desired_fps_thousandths(),
            self.config.rotation,
        );
        camera.device_mut().set_parameters(&params)?;

        tracing::info!(
            preview = %capture.preview_facts(),
            picture = %capture.picture_facts(),
            rotation = capture.rotation,
            "camera config"
        );

        let backend = self.host.backend();
        match camera.device_mut().set_preview_surface(surface) {
            Ok(()) => {
                camera.device_mut().start_preview()?;
                self.previewing = true;
                emit(self.events_tx.as_ref(), CameraEvent::Started { backend });
            },
            Err(err) => {
                // No recovery: the screen stays up without a preview.
                tracing::warn!(error = %err, surface = surface.id(), "failed to bind preview surface");
                emit(self.events_tx.as_ref(), CameraEvent::Warning {
                    backend,
                    message: format!("preview not started: {err}"),
                });
            },
        }

        self.capture = Some(capture);
        self.camera = Some(camera);
        Ok(())
    }

    fn on_surface_size_changed(&mut self, surface: &dyn PreviewSurface, width: u32, height: u32) {
        // The camera scales into the surface on its own.
        tracing::trace!(surface = surface.id(), width, height, "surface size changed");
    }

    fn on_surface_updated(&mut self, surface: &dyn PreviewSurface) {
        let now = self.clock.now();
        if let Some(sample) = self.counter.record_frame(now) {
            tracing::info!(
                frames = sample.frames,
                elapsed_ms = sample.elapsed.as_millis() as u64,
                fps = sample.fps,
                "preview frame rate over {}s",
                self.counter.window().as_secs_f64()
            );
            emit(self.events_tx.as_ref(), CameraEvent::FrameRate {
                backend: self.host.backend(),
                sample,
            });
        }
        tracing::trace!(surface = surface.id(), ts = ?now, "surface updated");
    }

    fn on_surface_destroyed(&mut self, surface: &dyn PreviewSurface) -> bool {
        tracing::debug!(surface = surface.id(), "surface destroyed");
        self.release_camera();
        true
    }
}

impl Drop for CameraPreviewScreen {
    fn drop(&mut self) {
        self.release_camera();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{
        CameraFacing, ManualClock, Size,
        drivers::simulated::{DeviceCall, SimulatedHost, SimulatedSurface},
    };
    use core::time::Duration;
    use std::sync::mpsc::sync_channel;

    #[test]
    fn test_selects_first_front_camera() {
        use CameraFacing::*;
        let host = SimulatedHost::with_facings(&[Back, Front, Front]);
        let journal = host.journal();
        let mut screen = CameraPreviewScreen::new(Box::new(host), PreviewConfig::default());

        screen
            .on_surface_available(&SimulatedSurface::new(1), 1080, 1920)
            .unwrap();

        assert_eq!(screen.camera().map(|c| c.index), Some(1));
        assert_eq!(journal.calls().first(), Some(&DeviceCall::Open(1)));
        assert!(screen.is_previewing());
    }

    #[test]
    fn test_no_front_camera_is_fatal() {
        let host = SimulatedHost::with_facings(&[CameraFacing::Back]);
        let journal = host.journal();
        let mut screen = CameraPreviewScreen::new(Box::new(host), PreviewConfig::default());

        let err = screen
            .on_surface_available(&SimulatedSurface::new(1), 640, 480)
            .unwrap_err();

        assert!(matches!(err, CameraError::NoFacingCamera(CameraFacing::Front)));
        assert!(journal.calls().is_empty());
        assert!(screen.camera().is_none());
    }

    #[test]
    fn test_resolved_configuration() {
        let host = SimulatedHost::with_facings(&[CameraFacing::Front]);
        let mut screen = CameraPreviewScreen::new(Box::new(host), PreviewConfig::default());
        screen
            .on_surface_available(&SimulatedSurface::new(1), 640, 480)
            .unwrap();

        let capture = screen.capture_configuration().unwrap();
        assert_eq!(capture.preview_size, Size::new(320, 240));
        assert_eq!(capture.picture_size, Size::new(320, 240));
        assert_eq!(capture.fps_thousandths, 30_000);
        assert_eq!(capture.rotation, 270);
    }

    #[test]
    fn test_fps_event_after_window() {
        let host = SimulatedHost::with_facings(&[CameraFacing::Front]);
        let clock = ManualClock::default();
        let (events_tx, events_rx) = sync_channel(16);
        let mut screen = CameraPreviewScreen::with_clock(
            Box::new(host),
            PreviewConfig::default(),
            Box::new(clock.clone()),
        )
        .with_events(events_tx);
        let surface = SimulatedSurface::new(7);
        screen.on_surface_available(&surface, 320, 240).unwrap();
        assert!(matches!(events_rx.try_recv(), Ok(CameraEvent::Started { .. })));

        for _ in 0..26 {
            clock.advance(Duration::from_millis(190));
            screen.on_surface_updated(&surface);
        }
        assert!(events_rx.try_recv().is_err());

        clock.advance(Duration::from_millis(260));
        screen.on_surface_updated(&surface);
        match events_rx.try_recv() {
            Ok(CameraEvent::FrameRate { sample, .. }) => {
                assert_eq!(sample.frames, 27);
                assert!((sample.fps - 5.4).abs() < 1e-9);
            },
            other => panic!("expected a frame-rate event, got {other:?}"),
        }
        assert_eq!(screen.counter().frames(), 0);
    }

    #[test]
    fn test_destroy_without_camera() {
        let host = SimulatedHost::with_facings(&[]);
        let mut screen = CameraPreviewScreen::new(Box::new(host), PreviewConfig::default());
        assert!(screen.on_surface_destroyed(&SimulatedSurface::new(1)));
    }
}
