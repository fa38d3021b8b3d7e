// This is free and unencumbered software released into the public domain.

use super::{CameraEvent, CameraError, CameraHost, PreviewConfig};
use std::sync::mpsc::SyncSender;

/// Opens the camera host for the current build target.
pub fn open_host(
    config: &PreviewConfig,
    events_tx: Option<SyncSender<CameraEvent>>,
) -> Result<Box<dyn CameraHost>, CameraError> {
    config.validate()?;
    cfg_if::cfg_if! {
        if #[cfg(all(feature = "android", target_os = "android"))] {
            let _ = events_tx;
            Ok(Box::new(super::drivers::android::Camera2Host::new()?))
        } else if #[cfg(feature = "ffmpeg")] {
            Ok(Box::new(super::drivers::ffmpeg::FfmpegHost::new(config, events_tx)))
        } else {
            let _ = events_tx;
            Err(CameraError::NoDriver)
        }
    }
}
