// This is free and unencumbered software released into the public domain.

use crate::shared::PreviewSurface;
use core::{any::Any, ptr::null_mut};
use ndk_sys::{ANativeWindow, ANativeWindow_acquire, ANativeWindow_release};

/// A reference-counted handle to a host `ANativeWindow`.
#[derive(Debug)]
pub struct NativeWindow {
    pub(crate) handle: *mut ANativeWindow,
}

impl Drop for NativeWindow {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ANativeWindow_release(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl Clone for NativeWindow {
    fn clone(&self) -> Self {
        // SAFETY: the handle is valid for as long as we hold our reference.
        unsafe { Self::from_ptr(self.handle) }
    }
}

impl NativeWindow {
    /// Takes a new reference on `handle`.
    ///
    /// # Safety
    /// `handle` must be null or point to a live `ANativeWindow`.
    pub unsafe fn from_ptr(handle: *mut ANativeWindow) -> Self {
        if !handle.is_null() {
            unsafe { ANativeWindow_acquire(handle) };
        }
        Self { handle }
    }

    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }
}

/// The surface a host `TextureView`/`SurfaceView` hands over, as a window.
#[derive(Debug)]
pub struct NativeWindowSurface {
    id: u64,
    pub(crate) window: NativeWindow,
}

impl NativeWindowSurface {
    pub fn new(window: NativeWindow) -> Self {
        Self {
            id: window.handle as usize as u64,
            window,
        }
    }
}

impl PreviewSurface for NativeWindowSurface {
    fn id(&self) -> u64 {
        self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
