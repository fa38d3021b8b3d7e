// This is free and unencumbered software released into the public domain.

use crate::shared::CameraFacing;
use std::error::Error as StdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("no suitable camera backend available")]
    NoDriver,

    #[error("no camera device at index {0}")]
    NoCamera(usize),

    #[error("no {0}-facing camera available")]
    NoFacingCamera(CameraFacing),

    #[error("camera is not configured")]
    NotConfigured,

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("stream closed")]
    Closed,

    #[error("driver error while {context}")]
    DriverError {
        context: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("{0}")]
    Other(String),
}

impl CameraError {
    #[inline]
    pub fn driver(context: &'static str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::DriverError {
            context,
            source: Box::new(source),
        }
    }

    #[inline]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    #[inline]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_facing_camera_message() {
        let err = CameraError::NoFacingCamera(CameraFacing::Front);
        assert_eq!(err.to_string(), "no front-facing camera available");
    }

    #[test]
    fn test_driver_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe gone");
        let err = CameraError::driver("reading frames", io);
        assert_eq!(err.to_string(), "driver error while reading frames");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("pipe gone"));
    }
}
