// This is free and unencumbered software released into the public domain.

use crate::shared::CameraError;
use core::any::Any;

/// A rendering target owned by the host windowing layer.
///
/// Camera devices downcast the surface to the concrete type their backend
/// knows how to render into.
pub trait PreviewSurface: Any {
    fn id(&self) -> u64;
    fn as_any(&self) -> &dyn Any;
}

/// Lifecycle callbacks the host windowing layer dispatches for a surface.
///
/// Hosts call these serially: available, then any number of size-changed and
/// updated, then destroyed.
pub trait SurfaceListener {
    /// The surface is ready to be rendered into.
    fn on_surface_available(
        &mut self,
        surface: &dyn PreviewSurface,
        width: u32,
        height: u32,
    ) -> Result<(), CameraError>;

    fn on_surface_size_changed(&mut self, surface: &dyn PreviewSurface, width: u32, height: u32);

    /// A new frame has been drawn into the surface.
    fn on_surface_updated(&mut self, surface: &dyn PreviewSurface);

    /// The surface is about to go away. Returns `true` when the listener has
    /// stopped rendering into it and the host may release it.
    fn on_surface_destroyed(&mut self, surface: &dyn PreviewSurface) -> bool;
}

/// Downcasts a surface or reports which type the backend expected.
pub fn surface_as<T: PreviewSurface>(surface: &dyn PreviewSurface) -> std::io::Result<&T> {
    surface.as_any().downcast_ref::<T>().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!(
                "surface {} is not a {}",
                surface.id(),
                core::any::type_name::<T>()
            ),
        )
    })
}
