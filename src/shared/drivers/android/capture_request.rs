// This is free and unencumbered software released into the public domain.

use super::{CameraDevice, CameraOutputTarget, CameraResult, CameraStatus};
use core::ptr::null_mut;
use ndk_sys::{
    ACameraDevice_createCaptureRequest, ACameraDevice_request_template, ACaptureRequest,
    ACaptureRequest_addTarget, ACaptureRequest_free, ACaptureRequest_setEntry_i32,
    acamera_metadata_tag,
};

#[derive(Debug)]
pub struct CaptureRequest {
    pub(crate) handle: *mut ACaptureRequest,
}

impl Drop for CaptureRequest {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACaptureRequest_free(self.handle) }
            self.handle = null_mut();
        }
    }
}

impl CaptureRequest {
    pub fn preview(device: &CameraDevice) -> CameraResult<Self> {
        let mut result = Self { handle: null_mut() };
        let status = unsafe {
            ACameraDevice_createCaptureRequest(
                device.handle,
                ACameraDevice_request_template::TEMPLATE_PREVIEW,
                &mut result.handle,
            )
        };
        tracing::trace!(?status, "ACameraDevice_createCaptureRequest");
        CameraStatus::check(status)?;
        Ok(result)
    }

    pub fn add_target(&mut self, target: &CameraOutputTarget) -> CameraResult {
        let status = unsafe { ACaptureRequest_addTarget(self.handle, target.handle) };
        CameraStatus::check(status)
    }

    pub fn set_i32(&mut self, tag: acamera_metadata_tag, values: &[i32]) -> CameraResult {
        // See: https://developer.android.com/ndk/reference/group/camera#acapturerequest_setentry_i32
        let status = unsafe {
            ACaptureRequest_setEntry_i32(self.handle, tag.0, values.len() as u32, values.as_ptr())
        };
        CameraStatus::check(status)
    }
}
