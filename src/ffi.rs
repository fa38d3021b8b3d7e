// This is free and unencumbered software released into the public domain.

// Android-only C ABI for the preview screen.
// A Java/Kotlin `TextureView.SurfaceTextureListener` (or a native activity)
// forwards its four callbacks here; the host owns dispatch.

use crate::shared::{
    CameraError, CameraPreviewScreen, PreviewConfig, SurfaceListener,
    drivers::android::{Camera2Host, NativeWindow, NativeWindowSurface},
};
use core::ffi::c_void;
use ndk_sys::ANativeWindow;

/// Error codes returned by the FFI API.
///
/// These map directly from [`CameraError`] plus a few FFI-specific cases.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LiveCameraErrorCode {
    /// No error.
    Ok = 0,
    /// No suitable driver available for the current platform.
    NoDriver = 1,
    /// No camera with the requested facing exists. Hosts treat this as fatal.
    NoFrontCamera = 2,
    /// Underlying Camera2 error.
    DriverError = 3,
    /// Invalid arguments passed via the FFI boundary.
    InvalidArgument = 4,
}

impl From<CameraError> for LiveCameraErrorCode {
    fn from(err: CameraError) -> Self {
        match err {
            CameraError::NoDriver => LiveCameraErrorCode::NoDriver,
            CameraError::NoFacingCamera(_) => LiveCameraErrorCode::NoFrontCamera,
            CameraError::InvalidConfig(_) => LiveCameraErrorCode::InvalidArgument,
            _ => LiveCameraErrorCode::DriverError,
        }
    }
}

/// Internal handle we keep on the Rust side; the host only sees a `void*`.
pub struct LiveCameraHandle {
    screen: CameraPreviewScreen,
    surface: Option<NativeWindowSurface>,
}

fn handle_mut<'a>(handle: *mut c_void) -> Option<&'a mut LiveCameraHandle> {
    if handle.is_null() {
        None
    } else {
        Some(unsafe { &mut *(handle as *mut LiveCameraHandle) })
    }
}

/// Create a preview screen with the default configuration
/// (front camera, 320x240 @ 30fps, rotation 270).
///
/// Parameters:
/// - `out_handle`: [out] pointer to receive an opaque screen handle.
#[unsafe(no_mangle)]
pub extern "C" fn live_camera_screen_new(out_handle: *mut *mut c_void) -> LiveCameraErrorCode {
    if out_handle.is_null() {
        return LiveCameraErrorCode::InvalidArgument;
    }

    let host = match Camera2Host::new() {
        Ok(host) => host,
        Err(e) => return e.into(),
    };
    let screen = CameraPreviewScreen::new(Box::new(host), PreviewConfig::default());
    let handle = Box::new(LiveCameraHandle {
        screen,
        surface: None,
    });

    unsafe {
        *out_handle = Box::into_raw(handle) as *mut c_void;
    }
    LiveCameraErrorCode::Ok
}

/// The host surface is ready.
///
/// `window` is acquired for as long as the screen uses it; the caller keeps
/// its own reference.
///
/// Return:
/// - `NoFrontCamera` when no front-facing camera exists; the host should
///   terminate the screen.
#[unsafe(no_mangle)]
pub extern "C" fn live_camera_surface_available(
    handle: *mut c_void,
    window: *mut ANativeWindow,
    width: u32,
    height: u32,
) -> LiveCameraErrorCode {
    let Some(handle) = handle_mut(handle) else {
        return LiveCameraErrorCode::InvalidArgument;
    };
    if window.is_null() {
        return LiveCameraErrorCode::InvalidArgument;
    }

    let surface = NativeWindowSurface::new(unsafe { NativeWindow::from_ptr(window) });
    if let Err(e) = handle.screen.on_surface_available(&surface, width, height) {
        handle.surface = None;
        return e.into();
    }
    handle.surface = Some(surface);
    LiveCameraErrorCode::Ok
}

#[unsafe(no_mangle)]
pub extern "C" fn live_camera_surface_size_changed(handle: *mut c_void, width: u32, height: u32) {
    if let Some(handle) = handle_mut(handle) {
        if let Some(surface) = handle.surface.as_ref() {
            handle.screen.on_surface_size_changed(surface, width, height);
        }
    }
}

/// Called once per frame drawn into the surface.
#[unsafe(no_mangle)]
pub extern "C" fn live_camera_surface_updated(handle: *mut c_void) {
    if let Some(handle) = handle_mut(handle) {
        if let Some(surface) = handle.surface.as_ref() {
            handle.screen.on_surface_updated(surface);
        }
    }
}

/// Stops the preview and releases the camera.
///
/// Returns `true` when the host may release the surface.
#[unsafe(no_mangle)]
pub extern "C" fn live_camera_surface_destroyed(handle: *mut c_void) -> bool {
    let Some(handle) = handle_mut(handle) else {
        return true;
    };
    match handle.surface.take() {
        Some(surface) => handle.screen.on_surface_destroyed(&surface),
        None => true,
    }
}

/// Free the screen handle, releasing the camera if it is still held.
///
/// After this call, the `handle` must not be used again.
#[unsafe(no_mangle)]
pub extern "C" fn live_camera_screen_free(handle: *mut c_void) {
    if handle.is_null() {
        return;
    }

    unsafe {
        drop(Box::from_raw(handle as *mut LiveCameraHandle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::CameraFacing;

    #[test]
    fn test_only_missing_facing_is_fatal() {
        assert_eq!(
            LiveCameraErrorCode::from(CameraError::NoFacingCamera(CameraFacing::Front)),
            LiveCameraErrorCode::NoFrontCamera
        );
        assert_eq!(
            LiveCameraErrorCode::from(CameraError::NoCamera(3)),
            LiveCameraErrorCode::DriverError
        );
    }
}
