// This is free and unencumbered software released into the public domain.

use super::{CameraDevice, CameraResult, CameraStatus, CaptureRequest, CaptureSessionOutputContainer};
use core::{ffi::c_void, ptr::null_mut};
use ndk_sys::{
    ACameraCaptureSession, ACameraCaptureSession_close, ACameraCaptureSession_setRepeatingRequest,
    ACameraCaptureSession_stateCallbacks, ACameraCaptureSession_stopRepeating,
    ACameraDevice_createCaptureSession,
};

#[derive(Debug)]
pub struct CameraCaptureSession {
    handle: *mut ACameraCaptureSession,
    state_callbacks: ACameraCaptureSession_stateCallbacks,
}

impl Default for CameraCaptureSession {
    fn default() -> Self {
        unsafe extern "C" fn on_ready(_context: *mut c_void, session: *mut ACameraCaptureSession) {
            tracing::trace!(?session, "capture session ready");
        }

        unsafe extern "C" fn on_active(_context: *mut c_void, session: *mut ACameraCaptureSession) {
            tracing::trace!(?session, "capture session active");
        }

        unsafe extern "C" fn on_closed(_context: *mut c_void, session: *mut ACameraCaptureSession) {
            tracing::trace!(?session, "capture session closed");
        }

        Self {
            handle: null_mut(),
            state_callbacks: ACameraCaptureSession_stateCallbacks {
                context: null_mut(),
                onClosed: Some(on_closed),
                onReady: Some(on_ready),
                onActive: Some(on_active),
            },
        }
    }
}

impl Drop for CameraCaptureSession {
    fn drop(&mut self) {
        self.close()
    }
}

impl CameraCaptureSession {
    pub fn open(
        device: &CameraDevice,
        outputs: &CaptureSessionOutputContainer,
    ) -> CameraResult<Self> {
        let mut result = Self::default();
        let status = unsafe {
            ACameraDevice_createCaptureSession(
                device.handle,
                outputs.handle,
                &result.state_callbacks,
                &mut result.handle,
            )
        };
        tracing::trace!(?status, "ACameraDevice_createCaptureSession");
        CameraStatus::check(status)?;
        Ok(result)
    }

    /// See: https://developer.android.com/ndk/reference/group/camera#acameracapturesession_setrepeatingrequest
    pub fn set_repeating_request(&mut self, request: &CaptureRequest) -> CameraResult {
        let mut requests = request.handle;
        let status = unsafe {
            ACameraCaptureSession_setRepeatingRequest(
                self.handle,
                null_mut(),
                1,
                &mut requests,
                null_mut(),
            )
        };
        tracing::trace!(?status, "ACameraCaptureSession_setRepeatingRequest");
        CameraStatus::check(status)
    }

    /// See: https://developer.android.com/ndk/reference/group/camera#acameracapturesession_stoprepeating
    pub fn stop_repeating(&mut self) -> CameraResult {
        let status = unsafe { ACameraCaptureSession_stopRepeating(self.handle) };
        CameraStatus::check(status)
    }

    pub fn close(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACameraCaptureSession_close(self.handle) }
            self.handle = null_mut();
        }
    }
}
