// This is free and unencumbered software released into the public domain.

//! In-memory camera host with a scripted device list.
//!
//! Every device call is appended to a shared [`CallJournal`], which makes the
//! host useful for dry runs and for asserting lifecycle ordering in tests.

use crate::shared::{
    CameraBackend, CameraDevice, CameraError, CameraFacing, CameraHost, CameraInfo,
    CameraParameters, FpsRange, PixelFormat, PreviewSurface, Size, surface_as,
};
use alloc::borrow::Cow;
use core::any::Any;
use std::{
    io,
    sync::{Arc, Mutex},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceCall {
    Open(usize),
    GetParameters,
    SetParameters(CameraParameters),
    SetPreviewSurface(u64),
    StartPreview,
    StopPreview,
    Release,
}

#[derive(Clone, Debug, Default)]
pub struct CallJournal(Arc<Mutex<Vec<DeviceCall>>>);

impl CallJournal {
    fn push(&self, call: DeviceCall) {
        self.0.lock().unwrap_or_else(|p| p.into_inner()).push(call);
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.0.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn count(&self, call: &DeviceCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulatedSurface {
    pub id: u64,
}

impl SimulatedSurface {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

impl PreviewSurface for SimulatedSurface {
    fn id(&self) -> u64 {
        self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Parameters of a typical phone front camera.
pub fn typical_parameters() -> CameraParameters {
    CameraParameters {
        supported_preview_sizes: vec![
            Size::new(1920, 1080),
            Size::new(1280, 720),
            Size::new(640, 480),
            Size::new(352, 288),
            Size::new(320, 240),
            Size::new(176, 144),
        ],
        supported_picture_sizes: vec![
            Size::new(3264, 2448),
            Size::new(1600, 1200),
            Size::new(640, 480),
            Size::new(320, 240),
        ],
        supported_preview_fps_ranges: vec![
            FpsRange::fixed(15_000),
            FpsRange::new(7_000, 30_000),
            FpsRange::fixed(30_000),
        ],
        preview_size: Size::new(640, 480),
        picture_size: Size::new(3264, 2448),
        preview_fps_range: FpsRange::new(7_000, 30_000),
        preview_format: PixelFormat::Nv21,
        picture_format: PixelFormat::Jpeg,
        rotation: 0,
    }
}

#[derive(Clone, Debug)]
pub struct SimulatedHost {
    cameras: Vec<CameraInfo>,
    parameters: CameraParameters,
    fail_bind: bool,
    fail_parameters: bool,
    journal: CallJournal,
}

impl SimulatedHost {
    pub fn new(cameras: Vec<CameraInfo>) -> Self {
        Self {
            cameras,
            parameters: typical_parameters(),
            fail_bind: false,
            fail_parameters: false,
            journal: CallJournal::default(),
        }
    }

    pub fn with_facings(facings: &[CameraFacing]) -> Self {
        Self::new(
            facings
                .iter()
                .enumerate()
                .map(|(index, facing)| {
                    CameraInfo::new(index, index.to_string(), *facing)
                        .with_name(format!("Simulated {facing} camera {index}"))
                        .with_orientation(if *facing == CameraFacing::Front { 270 } else { 90 })
                })
                .collect(),
        )
    }

    pub fn with_parameters(mut self, parameters: CameraParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Makes every preview bind fail with an I/O error.
    pub fn with_bind_failure(mut self) -> Self {
        self.fail_bind = true;
        self
    }

    /// Makes reading parameters from an opened device fail.
    pub fn with_parameters_failure(mut self) -> Self {
        self.fail_parameters = true;
        self
    }

    pub fn journal(&self) -> CallJournal {
        self.journal.clone()
    }
}

impl dogma::Named for SimulatedHost {
    fn name(&self) -> Cow<'_, str> {
        "simulated".into()
    }
}

impl CameraHost for SimulatedHost {
    fn backend(&self) -> CameraBackend {
        CameraBackend::Simulated
    }

    fn number_of_cameras(&self) -> Result<usize, CameraError> {
        Ok(self.cameras.len())
    }

    fn camera_info(&self, index: usize) -> Result<CameraInfo, CameraError> {
        self.cameras
            .get(index)
            .cloned()
            .ok_or(CameraError::NoCamera(index))
    }

    fn open(&mut self, index: usize) -> Result<Box<dyn CameraDevice>, CameraError> {
        if index >= self.cameras.len() {
            return Err(CameraError::NoCamera(index));
        }
        self.journal.push(DeviceCall::Open(index));
        Ok(Box::new(SimulatedDevice {
            parameters: self.parameters.clone(),
            fail_bind: self.fail_bind,
            fail_parameters: self.fail_parameters,
            surface: None,
            journal: self.journal.clone(),
        }))
    }
}

#[derive(Debug)]
struct SimulatedDevice {
    parameters: CameraParameters,
    fail_bind: bool,
    fail_parameters: bool,
    surface: Option<u64>,
    journal: CallJournal,
}

impl CameraDevice for SimulatedDevice {
    fn parameters(&self) -> Result<CameraParameters, CameraError> {
        self.journal.push(DeviceCall::GetParameters);
        if self.fail_parameters {
            return Err(CameraError::driver(
                "reading camera parameters",
                io::Error::other("camera service died"),
            ));
        }
        Ok(self.parameters.clone())
    }

    fn set_parameters(&mut self, params: &CameraParameters) -> Result<(), CameraError> {
        self.journal.push(DeviceCall::SetParameters(params.clone()));
        self.parameters = params.clone();
        Ok(())
    }

    fn set_preview_surface(&mut self, surface: &dyn PreviewSurface) -> io::Result<()> {
        self.journal.push(DeviceCall::SetPreviewSurface(surface.id()));
        if self.fail_bind {
            return Err(io::Error::other("surface abandoned"));
        }
        let surface = surface_as::<SimulatedSurface>(surface)?;
        self.surface = Some(surface.id);
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        self.journal.push(DeviceCall::StartPreview);
        if self.surface.is_none() {
            return Err(CameraError::NotConfigured);
        }
        Ok(())
    }

    fn stop_preview(&mut self) {
        self.journal.push(DeviceCall::StopPreview);
    }

    fn release(&mut self) {
        self.journal.push(DeviceCall::Release);
        self.surface = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::OpenCamera;

    #[test]
    fn test_open_out_of_range() {
        let mut host = SimulatedHost::with_facings(&[CameraFacing::Back]);
        assert!(matches!(host.open(3), Err(CameraError::NoCamera(3))));
        assert!(host.journal().calls().is_empty());
    }

    #[test]
    fn test_open_camera_releases_once() {
        let mut host = SimulatedHost::with_facings(&[CameraFacing::Front]);
        let journal = host.journal();
        let info = host.camera_info(0).unwrap();
        let camera = OpenCamera::new(info, host.open(0).unwrap());
        camera.close();
        assert_eq!(
            journal.calls(),
            vec![DeviceCall::Open(0), DeviceCall::StopPreview, DeviceCall::Release]
        );
    }

    #[test]
    fn test_open_camera_released_on_drop() {
        let mut host = SimulatedHost::with_facings(&[CameraFacing::Front]);
        let journal = host.journal();
        {
            let info = host.camera_info(0).unwrap();
            let _camera = OpenCamera::new(info, host.open(0).unwrap());
        }
        assert_eq!(journal.count(&DeviceCall::Release), 1);
    }

    #[test]
    fn test_start_without_surface_is_not_configured() {
        let mut host = SimulatedHost::with_facings(&[CameraFacing::Front]);
        let mut device = host.open(0).unwrap();
        assert!(matches!(device.start_preview(), Err(CameraError::NotConfigured)));
    }
}
