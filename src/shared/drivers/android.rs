// This is free and unencumbered software released into the public domain.

//! Android NDK Camera2 host. Previews into the `ANativeWindow` the host
//! passes in as a [`NativeWindowSurface`].

mod camera_capture_session;
pub use camera_capture_session::*;

mod camera_device;
pub use camera_device::*;

mod camera_manager;
pub use camera_manager::*;

mod camera_metadata;
pub use camera_metadata::*;

mod camera_output_target;
pub use camera_output_target::*;

mod camera_status;
pub use camera_status::*;

mod capture_request;
pub use capture_request::*;

mod capture_session_output;
pub use capture_session_output::*;

mod capture_session_output_container;
pub use capture_session_output_container::*;

mod native_window;
pub use native_window::*;

use crate::shared::{
    CameraBackend, CameraDevice as PreviewDevice, CameraError, CameraFacing, CameraHost,
    CameraInfo, CameraParameters, FpsRange, PixelFormat, PreviewSurface, Size, surface_as,
};
use alloc::borrow::Cow;
use ndk_sys::{acamera_metadata_tag, android_get_device_api_level};
use std::io;

#[link(name = "camera2ndk")]
unsafe extern "C" {}

const LENS_FACING_FRONT: u8 = 0;
const LENS_FACING_BACK: u8 = 1;
const STREAM_CONFIGURATION_OUTPUT: i32 = 0;

pub struct Camera2Host {
    manager: CameraManager,
    camera_ids: Vec<String>,
    pub api_level: u32,
}

// SAFETY: the NDK camera manager is documented as thread-safe; the handle is
// only used through `&self`/`&mut self`.
unsafe impl Send for Camera2Host {}

impl core::fmt::Debug for Camera2Host {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Camera2Host")
            .field("camera_ids", &self.camera_ids)
            .field("api_level", &self.api_level)
            .finish()
    }
}

impl Camera2Host {
    pub fn new() -> Result<Self, CameraError> {
        let api_level = unsafe { android_get_device_api_level() } as u32;
        let manager = CameraManager::new();
        let camera_ids = manager
            .get_camera_ids()
            .map_err(|e| e.into_camera_error("listing cameras"))?;
        tracing::debug!(api_level, ?camera_ids, "camera2 host ready");
        Ok(Self {
            manager,
            camera_ids,
            api_level,
        })
    }

    fn camera_id(&self, index: usize) -> Result<&str, CameraError> {
        self.camera_ids
            .get(index)
            .map(String::as_str)
            .ok_or(CameraError::NoCamera(index))
    }
}

impl dogma::Named for Camera2Host {
    fn name(&self) -> Cow<'_, str> {
        "camera2".into()
    }
}

impl CameraHost for Camera2Host {
    fn backend(&self) -> CameraBackend {
        CameraBackend::Android
    }

    fn number_of_cameras(&self) -> Result<usize, CameraError> {
        Ok(self.camera_ids.len())
    }

    fn camera_info(&self, index: usize) -> Result<CameraInfo, CameraError> {
        let id = self.camera_id(index)?;
        let metadata = self
            .manager
            .get_characteristics(id)
            .map_err(|e| e.into_camera_error("reading camera characteristics"))?;

        let facing = match metadata
            .get_u8(acamera_metadata_tag::ACAMERA_LENS_FACING)
            .ok()
            .and_then(|v| v.first().copied())
        {
            Some(LENS_FACING_FRONT) => CameraFacing::Front,
            Some(LENS_FACING_BACK) => CameraFacing::Back,
            _ => CameraFacing::External,
        };
        let orientation = metadata
            .get_i32(acamera_metadata_tag::ACAMERA_SENSOR_ORIENTATION)
            .ok()
            .and_then(|v| v.first().copied())
            .unwrap_or(0);

        Ok(CameraInfo::new(index, id, facing).with_orientation(orientation.max(0) as u32))
    }

    fn open(&mut self, index: usize) -> Result<Box<dyn PreviewDevice>, CameraError> {
        let id = self.camera_id(index)?.to_string();
        let metadata = self
            .manager
            .get_characteristics(&id)
            .map_err(|e| e.into_camera_error("reading camera characteristics"))?;
        let parameters = read_parameters(&metadata);
        let device = self
            .manager
            .open_camera(&id)
            .map_err(|e| e.into_camera_error("opening camera"))?;
        Ok(Box::new(Camera2Device {
            device,
            parameters,
            binding: None,
            session: None,
            request: None,
        }))
    }
}

fn read_parameters(metadata: &CameraMetadata) -> CameraParameters {
    let mut preview_sizes = Vec::new();
    let mut picture_sizes = Vec::new();
    let configs = metadata
        .get_i32(acamera_metadata_tag::ACAMERA_SCALER_AVAILABLE_STREAM_CONFIGURATIONS)
        .unwrap_or_default();
    for entry in configs.chunks_exact(4) {
        let (format, width, height, direction) = (entry[0], entry[1], entry[2], entry[3]);
        if direction != STREAM_CONFIGURATION_OUTPUT || width <= 0 || height <= 0 {
            continue;
        }
        let size = Size::new(width as u32, height as u32);
        match PixelFormat::from_code(format) {
            PixelFormat::Private | PixelFormat::Yuv420 if !preview_sizes.contains(&size) => {
                preview_sizes.push(size)
            },
            PixelFormat::Jpeg if !picture_sizes.contains(&size) => picture_sizes.push(size),
            _ => {},
        }
    }

    // The NDK reports whole frames per second; parameters use thousandths.
    let fps_ranges: Vec<FpsRange> = metadata
        .get_i32(acamera_metadata_tag::ACAMERA_CONTROL_AE_AVAILABLE_TARGET_FPS_RANGES)
        .unwrap_or_default()
        .chunks_exact(2)
        .map(|r| FpsRange::new(r[0] * 1000, r[1] * 1000))
        .collect();

    CameraParameters {
        preview_size: preview_sizes.first().copied().unwrap_or_default(),
        picture_size: picture_sizes.first().copied().unwrap_or_default(),
        preview_fps_range: fps_ranges.last().copied().unwrap_or_default(),
        supported_preview_sizes: preview_sizes,
        supported_picture_sizes: picture_sizes,
        supported_preview_fps_ranges: fps_ranges,
        preview_format: PixelFormat::Private,
        picture_format: PixelFormat::Jpeg,
        rotation: 0,
    }
}

/// Session outputs bound to a preview window.
struct PreviewBinding {
    window: NativeWindow,
    _output: CaptureSessionOutput,
    outputs: CaptureSessionOutputContainer,
    target: CameraOutputTarget,
}

pub struct Camera2Device {
    device: CameraDevice,
    parameters: CameraParameters,
    binding: Option<PreviewBinding>,
    session: Option<CameraCaptureSession>,
    request: Option<CaptureRequest>,
}

// SAFETY: NDK camera objects may be used from any thread; all access goes
// through `&mut self`.
unsafe impl Send for Camera2Device {}

impl Camera2Device {
    fn bind(window: NativeWindow) -> CameraResult<PreviewBinding> {
        let output = CaptureSessionOutput::new(&window)?;
        let mut outputs = CaptureSessionOutputContainer::new()?;
        outputs.add(&output)?;
        let target = CameraOutputTarget::new(&window)?;
        Ok(PreviewBinding {
            window,
            _output: output,
            outputs,
            target,
        })
    }

    fn build_request(&self, binding: &PreviewBinding) -> CameraResult<CaptureRequest> {
        let mut request = CaptureRequest::preview(&self.device)?;
        request.add_target(&binding.target)?;
        let fps = self.parameters.preview_fps_range;
        request.set_i32(acamera_metadata_tag::ACAMERA_CONTROL_AE_TARGET_FPS_RANGE, &[
            fps.min / 1000,
            fps.max / 1000,
        ])?;
        request.set_i32(acamera_metadata_tag::ACAMERA_JPEG_ORIENTATION, &[
            self.parameters.rotation as i32,
        ])?;
        Ok(request)
    }
}

impl PreviewDevice for Camera2Device {
    fn parameters(&self) -> Result<CameraParameters, CameraError> {
        Ok(self.parameters.clone())
    }

    fn set_parameters(&mut self, params: &CameraParameters) -> Result<(), CameraError> {
        self.parameters = params.clone();
        Ok(())
    }

    fn set_preview_surface(&mut self, surface: &dyn PreviewSurface) -> io::Result<()> {
        let surface = surface_as::<NativeWindowSurface>(surface)?;
        if surface.window.is_null() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "null native window"));
        }
        self.session = None;
        self.request = None;
        let binding =
            Self::bind(surface.window.clone()).map_err(CameraStatus::into_io_error)?;
        self.binding = Some(binding);
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        let binding = self.binding.as_ref().ok_or(CameraError::NotConfigured)?;
        let request = self
            .build_request(binding)
            .map_err(|e| e.into_camera_error("building preview request"))?;
        let mut session = CameraCaptureSession::open(&self.device, &binding.outputs)
            .map_err(|e| e.into_camera_error("creating capture session"))?;
        session
            .set_repeating_request(&request)
            .map_err(|e| e.into_camera_error("starting repeating preview request"))?;
        tracing::debug!(window = ?binding.window.handle, "camera2 preview started");
        self.request = Some(request);
        self.session = Some(session);
        Ok(())
    }

    fn stop_preview(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if let Err(status) = session.stop_repeating() {
                tracing::warn!(%status, "failed to stop repeating preview request");
            }
        }
        self.session = None;
        self.request = None;
    }

    fn release(&mut self) {
        self.stop_preview();
        self.binding = None;
        self.device.close();
    }
}
