// This is free and unencumbered software released into the public domain.

use core::{
    ffi::{c_int, c_void},
    ptr::null_mut,
};
use ndk_sys::{ACameraDevice, ACameraDevice_StateCallbacks, ACameraDevice_close};

/// An open NDK camera device, closed on drop.
#[derive(Debug)]
pub struct CameraDevice {
    pub(crate) handle: *mut ACameraDevice,
    pub(crate) state_callbacks: ACameraDevice_StateCallbacks,
}

impl Default for CameraDevice {
    fn default() -> Self {
        unsafe extern "C" fn on_disconnected(_context: *mut c_void, device: *mut ACameraDevice) {
            tracing::warn!(?device, "camera device disconnected");
        }

        unsafe extern "C" fn on_error(_context: *mut c_void, device: *mut ACameraDevice, error: c_int) {
            tracing::error!(?device, error, "camera device error");
        }

        Self {
            handle: null_mut(),
            state_callbacks: ACameraDevice_StateCallbacks {
                context: null_mut(),
                onDisconnected: Some(on_disconnected),
                onError: Some(on_error),
            },
        }
    }
}

impl Drop for CameraDevice {
    fn drop(&mut self) {
        self.close();
    }
}

impl CameraDevice {
    pub fn is_open(&self) -> bool {
        !self.handle.is_null()
    }

    pub fn close(&mut self) {
        if self.handle.is_null() {
            return;
        }
        // See: https://developer.android.com/ndk/reference/group/camera#acameradevice_close
        let status = unsafe { ACameraDevice_close(self.handle) };
        tracing::trace!(?status, "ACameraDevice_close");
        self.handle = null_mut();
    }
}
