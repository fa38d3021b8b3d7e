// This is free and unencumbered software released into the public domain.

use crate::shared::CameraError;
use derive_more::Display;
use ndk_sys::camera_status_t;

pub type CameraResult<T = ()> = core::result::Result<T, CameraStatus>;

#[derive(Clone, Copy, Debug, Display)]
#[display("camera status {}", _0.0)]
pub struct CameraStatus(pub(crate) camera_status_t);

impl core::error::Error for CameraStatus {}

impl Default for CameraStatus {
    fn default() -> Self {
        CameraStatus(camera_status_t::ACAMERA_OK)
    }
}

impl From<camera_status_t> for CameraStatus {
    fn from(input: camera_status_t) -> Self {
        Self(input)
    }
}

impl CameraStatus {
    pub(crate) fn check(status: camera_status_t) -> CameraResult {
        if status == camera_status_t::ACAMERA_OK {
            Ok(())
        } else {
            Err(status.into())
        }
    }

    pub fn into_camera_error(self, context: &'static str) -> CameraError {
        CameraError::driver(context, self)
    }

    pub fn into_io_error(self) -> std::io::Error {
        std::io::Error::other(self)
    }
}

#[cfg(all(test, target_os = "android"))]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_is_an_error() {
        let status = CameraStatus::check(camera_status_t::ACAMERA_ERROR_INVALID_PARAMETER);
        let err = status.unwrap_err().into_camera_error("setting request entry");
        assert!(matches!(err, CameraError::DriverError { .. }));
    }

    #[test]
    fn test_ok_passes() {
        assert!(CameraStatus::check(camera_status_t::ACAMERA_OK).is_ok());
    }
}
