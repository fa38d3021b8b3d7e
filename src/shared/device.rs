// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraDevice, CameraInfo};

/// An opened camera that is stopped and released exactly once, on
/// [`OpenCamera::close`] or on drop, whichever comes first.
pub struct OpenCamera {
    info: CameraInfo,
    device: Box<dyn CameraDevice>,
    released: bool,
}

impl core::fmt::Debug for OpenCamera {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpenCamera")
            .field("info", &self.info)
            .field("released", &self.released)
            .finish()
    }
}

impl OpenCamera {
    pub fn new(info: CameraInfo, device: Box<dyn CameraDevice>) -> Self {
        Self {
            info,
            device,
            released: false,
        }
    }

    pub fn info(&self) -> &CameraInfo {
        &self.info
    }

    pub fn device(&self) -> &dyn CameraDevice {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> &mut dyn CameraDevice {
        self.device.as_mut()
    }

    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.device.stop_preview();
        self.device.release();
        tracing::debug!(camera = %self.info.id, "camera released");
    }
}

impl Drop for OpenCamera {
    fn drop(&mut self) {
        self.shutdown();
    }
}
