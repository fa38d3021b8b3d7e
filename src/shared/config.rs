// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraError, CameraFacing, Size};
use core::time::Duration;

pub const DEFAULT_PREVIEW_WIDTH: u32 = 320;
pub const DEFAULT_PREVIEW_HEIGHT: u32 = 240;
pub const DEFAULT_PREVIEW_FPS: u32 = 30;
pub const DEFAULT_ROTATION: u32 = 270;
pub const DEFAULT_FPS_WINDOW: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct PreviewConfig {
    /// Explicit capture devices for desktop hosts; empty means autodetect.
    pub devices: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Clockwise rotation applied to captured pictures, in degrees.
    pub rotation: u32,
    pub facing: CameraFacing,
    pub fps_window: Duration,
    pub buffer_frames: usize,
    pub diagnostics: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            width: DEFAULT_PREVIEW_WIDTH,
            height: DEFAULT_PREVIEW_HEIGHT,
            fps: DEFAULT_PREVIEW_FPS,
            rotation: DEFAULT_ROTATION,
            facing: CameraFacing::Front,
            fps_window: DEFAULT_FPS_WINDOW,
            buffer_frames: 2,
            diagnostics: false,
        }
    }
}

impl PreviewConfig {
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            ..Default::default()
        }
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.devices.push(device.into());
        self
    }

    pub fn with_rotation(mut self, degrees: u32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_facing(mut self, facing: CameraFacing) -> Self {
        self.facing = facing;
        self
    }

    pub fn with_fps_window(mut self, window: Duration) -> Self {
        self.fps_window = window;
        self
    }

    pub fn with_buffer_frames(mut self, n: usize) -> Self {
        self.buffer_frames = n.max(1);
        self
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn desired_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Desired frame rate in thousandths of a frame per second.
    pub fn desired_fps_thousandths(&self) -> i32 {
        (self.fps as i32).saturating_mul(1000)
    }

    pub fn validate(&self) -> Result<(), CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::invalid_config(format!(
                "preview size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fps == 0 || self.fps > 240 {
            return Err(CameraError::invalid_config(format!(
                "frame rate must be 1-240 fps, got {}",
                self.fps
            )));
        }
        if self.rotation % 90 != 0 || self.rotation >= 360 {
            return Err(CameraError::invalid_config(format!(
                "rotation must be one of 0, 90, 180, 270, got {}",
                self.rotation
            )));
        }
        if self.fps_window.is_zero() {
            return Err(CameraError::invalid_config("fps window must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PreviewConfig::default();
        assert_eq!(config.desired_size(), Size::new(320, 240));
        assert_eq!(config.desired_fps_thousandths(), 30_000);
        assert_eq!(config.rotation, 270);
        assert_eq!(config.facing, CameraFacing::Front);
        assert_eq!(config.fps_window, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_rotation() {
        let config = PreviewConfig::default().with_rotation(45);
        assert!(matches!(config.validate(), Err(CameraError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_size_invalid() {
        let config = PreviewConfig::new(0, 240, 30);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_buffer_frames_at_least_one() {
        assert_eq!(PreviewConfig::default().with_buffer_frames(0).buffer_frames, 1);
    }
}
