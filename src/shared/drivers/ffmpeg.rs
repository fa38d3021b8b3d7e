// This is free and unencumbered software released into the public domain.

//! Desktop camera host backed by an `ffmpeg` child process.
//!
//! The preview surface is a [`FrameSurface`]: raw RGB frames read from
//! ffmpeg's stdout are queued into the surface's dispatcher, which hands them
//! to whatever sinks the host registered.

use crate::shared::{
    CameraBackend, CameraDevice, CameraError, CameraEvent, CameraFacing, CameraHost, CameraInfo,
    CameraParameters, Dispatcher, FpsRange, Frame, FrameMsg, FrameSink, PixelFormat,
    PreviewConfig, PreviewSurface, Size, surface_as, try_send_frame,
};
use alloc::borrow::Cow;
use bytes::Bytes;
use core::any::Any;
use std::{
    env,
    io::{self, Read},
    process::{Child, Command, Stdio},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::SyncSender,
    },
    thread::JoinHandle,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

const SUPPORTED_SIZES: [Size; 6] = [
    Size::new(160, 120),
    Size::new(320, 240),
    Size::new(640, 480),
    Size::new(800, 600),
    Size::new(1280, 720),
    Size::new(1920, 1080),
];

const SUPPORTED_FPS: [i32; 4] = [15_000, 24_000, 30_000, 60_000];

/// A surface that receives decoded preview frames in-process.
pub struct FrameSurface {
    id: u64,
    dispatcher: Dispatcher,
}

impl core::fmt::Debug for FrameSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameSurface").field("id", &self.id).finish()
    }
}

impl FrameSurface {
    pub fn new(id: u64, buffer_frames: usize) -> Self {
        Self {
            id,
            dispatcher: Dispatcher::new(buffer_frames, CameraBackend::Ffmpeg),
        }
    }

    pub fn add_sink(&self, sink: FrameSink) {
        self.dispatcher.add_sink(sink);
    }

    pub fn sender(&self) -> SyncSender<FrameMsg> {
        self.dispatcher.sender()
    }

    pub fn close(&mut self) {
        self.dispatcher.stop();
    }
}

impl PreviewSurface for FrameSurface {
    fn id(&self) -> u64 {
        self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct FfmpegHost {
    config: PreviewConfig,
    devices: Vec<String>,
    events_tx: Option<SyncSender<CameraEvent>>,
}

impl FfmpegHost {
    pub fn new(config: &PreviewConfig, events_tx: Option<SyncSender<CameraEvent>>) -> Self {
        let devices = if config.devices.is_empty() {
            default_devices()
        } else {
            config.devices.clone()
        };
        Self {
            config: config.clone(),
            devices,
            events_tx,
        }
    }

    pub fn devices(&self) -> &[String] {
        &self.devices
    }
}

impl dogma::Named for FfmpegHost {
    fn name(&self) -> Cow<'_, str> {
        "ffmpeg".into()
    }
}

impl CameraHost for FfmpegHost {
    fn backend(&self) -> CameraBackend {
        CameraBackend::Ffmpeg
    }

    fn number_of_cameras(&self) -> Result<usize, CameraError> {
        Ok(self.devices.len())
    }

    fn camera_info(&self, index: usize) -> Result<CameraInfo, CameraError> {
        let device = self.devices.get(index).ok_or(CameraError::NoCamera(index))?;
        // Desktop webcams face the user.
        Ok(CameraInfo::new(index, device.clone(), CameraFacing::Front)
            .with_name(get_input_device(device)))
    }

    fn open(&mut self, index: usize) -> Result<Box<dyn CameraDevice>, CameraError> {
        let device = self.devices.get(index).ok_or(CameraError::NoCamera(index))?;
        Ok(Box::new(FfmpegCameraDevice::new(
            device.clone(),
            self.config.diagnostics,
            self.events_tx.clone(),
        )))
    }
}

pub struct FfmpegCameraDevice {
    device: String,
    diagnostics: bool,
    parameters: CameraParameters,
    child: Option<Child>,
    stop: Arc<AtomicBool>,
    reader_join: Option<JoinHandle<()>>,
    frame_tx: Option<SyncSender<FrameMsg>>,
    events_tx: Option<SyncSender<CameraEvent>>,
}

impl core::fmt::Debug for FfmpegCameraDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FfmpegCameraDevice")
            .field("device", &self.device)
            .field("parameters", &self.parameters)
            .field("child", &self.child.as_ref().map(|_| "<child>"))
            .finish()
    }
}

impl FfmpegCameraDevice {
    fn new(device: String, diagnostics: bool, events_tx: Option<SyncSender<CameraEvent>>) -> Self {
        let parameters = CameraParameters {
            supported_preview_sizes: SUPPORTED_SIZES.to_vec(),
            supported_picture_sizes: SUPPORTED_SIZES.to_vec(),
            supported_preview_fps_ranges: SUPPORTED_FPS.iter().map(|f| FpsRange::fixed(*f)).collect(),
            preview_size: Size::new(640, 480),
            picture_size: Size::new(640, 480),
            preview_fps_range: FpsRange::fixed(30_000),
            preview_format: PixelFormat::Rgb8,
            picture_format: PixelFormat::Jpeg,
            rotation: 0,
        };
        Self {
            device,
            diagnostics,
            parameters,
            child: None,
            stop: Arc::new(AtomicBool::new(false)),
            reader_join: None,
            frame_tx: None,
            events_tx,
        }
    }

    #[inline]
    fn now_ns_best_effort() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }

    fn spawn(&self) -> Result<Child, CameraError> {
        let fps = (self.parameters.preview_fps_range.max / 1000).max(1) as u32;
        spawn_reader(&self.device, self.parameters.preview_size, fps, self.diagnostics)
    }

    fn stop_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            #[cfg(unix)]
            {
                unsafe {
                    let _ = libc::kill(child.id() as i32, libc::SIGTERM);
                }
                let start = std::time::Instant::now();
                while start.elapsed() < Duration::from_millis(900) {
                    if let Ok(Some(_)) = child.try_wait() {
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(20));
                }
            }
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl CameraDevice for FfmpegCameraDevice {
    fn parameters(&self) -> Result<CameraParameters, CameraError> {
        Ok(self.parameters.clone())
    }

    fn set_parameters(&mut self, params: &CameraParameters) -> Result<(), CameraError> {
        if !self.parameters.supported_preview_sizes.contains(&params.preview_size) {
            return Err(CameraError::invalid_config(format!(
                "unsupported preview size {}",
                params.preview_size
            )));
        }
        self.parameters = params.clone();
        Ok(())
    }

    fn set_preview_surface(&mut self, surface: &dyn PreviewSurface) -> io::Result<()> {
        let surface = surface_as::<FrameSurface>(surface)?;
        self.frame_tx = Some(surface.sender());
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        if self.child.is_some() {
            return Ok(());
        }
        let frame_tx = self.frame_tx.clone().ok_or(CameraError::NotConfigured)?;

        self.stop.store(false, Ordering::Relaxed);

        let mut child = self.spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CameraError::other("ffmpeg stdout not piped"))?;

        let Size { width, height } = self.parameters.preview_size;
        let stride = width.saturating_mul(3);
        let frame_size = (stride as usize).saturating_mul(height as usize);

        let stop = Arc::clone(&self.stop);
        let events_tx = self.events_tx.clone();

        let join = std::thread::spawn(move || {
            let mut reader = io::BufReader::new(stdout);

            while !stop.load(Ordering::Relaxed) {
                let mut buf = vec![0u8; frame_size];
                match reader.read_exact(&mut buf) {
                    Ok(()) => {
                        let ts = FfmpegCameraDevice::now_ns_best_effort();
                        let frame = Frame::new_rgb8(Bytes::from(buf), width, height, stride)
                            .with_timestamp_ns(ts);
                        try_send_frame(&frame_tx, events_tx.as_ref(), CameraBackend::Ffmpeg, frame);
                    },
                    Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                        tracing::warn!("ffmpeg closed its output");
                        break;
                    },
                    Err(e) => {
                        tracing::error!(error = %e, "reading ffmpeg output failed");
                        if let Some(tx) = events_tx.as_ref() {
                            let _ = tx.try_send(CameraEvent::Error {
                                backend: CameraBackend::Ffmpeg,
                                error: CameraError::driver("ffmpeg read", e),
                            });
                        }
                        break;
                    },
                }
            }
        });

        tracing::debug!(device = %self.device, pid = child.id(), "ffmpeg preview started");
        self.reader_join = Some(join);
        self.child = Some(child);

        Ok(())
    }

    fn stop_preview(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.stop_child();
        if let Some(j) = self.reader_join.take() {
            let _ = j.join();
        }
    }

    fn release(&mut self) {
        self.stop_preview();
        self.frame_tx = None;
    }
}

impl Drop for FfmpegCameraDevice {
    fn drop(&mut self) {
        self.release();
    }
}

fn spawn_reader(device: &str, size: Size, fps: u32, diagnostics: bool) -> Result<Child, CameraError> {
    let input_device = get_input_device(device.trim());

    let mut ffargs: Vec<String> = vec![
        "-hide_banner".into(),
        "-nostdin".into(),
        "-nostats".into(),
        "-f".into(),
        ffmpeg_format().into(),
        "-loglevel".into(),
        "error".into(),
        "-video_size".into(),
        size.to_string(),
        "-framerate".into(),
        fps.to_string(),
    ];

    #[cfg(target_os = "macos")]
    {
        ffargs.push("-pixel_format".into());
        ffargs.push("0rgb".into());
    }

    ffargs.extend([
        "-i".into(),
        input_device,
        "-pix_fmt".into(),
        "rgb24".into(),
        "-f".into(),
        "rawvideo".into(),
        "pipe:1".into(),
    ]);

    let stderr = if diagnostics || env::var_os("LIVE_CAMERA_FFMPEG_STDERR").is_some() {
        Stdio::inherit()
    } else {
        Stdio::null()
    };

    tracing::trace!(args = ?ffargs, "spawning ffmpeg");
    Command::new("ffmpeg")
        .args(&ffargs)
        .stdout(Stdio::piped())
        .stderr(stderr)
        .spawn()
        .map_err(|e| CameraError::driver("spawning ffmpeg", e))
}

#[cfg(target_os = "macos")]
fn ffmpeg_format() -> &'static str {
    "avfoundation"
}

#[cfg(target_os = "linux")]
fn ffmpeg_format() -> &'static str {
    "v4l2"
}

#[cfg(target_os = "windows")]
fn ffmpeg_format() -> &'static str {
    "dshow"
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
fn ffmpeg_format() -> &'static str {
    "video4linux2"
}

#[cfg(target_os = "macos")]
fn get_input_device(device: &str) -> String {
    device.strip_prefix("avf:").unwrap_or(device).to_string()
}

#[cfg(target_os = "windows")]
fn get_input_device(device: &str) -> String {
    let d = device.strip_prefix("dshow:").unwrap_or(device);
    if d.starts_with("video=") {
        d.to_string()
    } else {
        format!("video={d}")
    }
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn get_input_device(device: &str) -> String {
    let d = device.strip_prefix("file:").unwrap_or(device);
    if !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()) {
        format!("/dev/video{d}")
    } else {
        d.to_string()
    }
}

#[cfg(target_os = "linux")]
fn default_devices() -> Vec<String> {
    let mut devices: Vec<String> = std::fs::read_dir("/dev")
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter_map(|e| e.file_name().into_string().ok())
                .filter(|name| {
                    name.strip_prefix("video")
                        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
                })
                .map(|name| format!("/dev/{name}"))
                .collect()
        })
        .unwrap_or_default();
    devices.sort();
    devices
}

#[cfg(target_os = "macos")]
fn default_devices() -> Vec<String> {
    vec!["0".into()]
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn default_devices() -> Vec<String> {
    Vec::new()
}
