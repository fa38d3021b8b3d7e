// This is free and unencumbered software released into the public domain.

//! CLI helpers (error reporting, verbosity handling, argument parsing).
//!
//! This module must compile even when the crate feature `cli` is disabled,
//! because the library is built in non-CLI configurations.

use crate::shared::{CameraError, Size};

#[cfg(feature = "cli")]
use crate::shared::CameraEvent;

#[cfg(feature = "cli")]
use asimov_module::SysexitsError::{self, *};

#[cfg(feature = "cli")]
use clientele::StandardOptions;

#[cfg(feature = "cli")]
pub fn handle_error(err: &CameraError, flags: &StandardOptions) -> SysexitsError {
    tracing::error!(target: "live_camera_module", %err, "camera command failed");

    if flags.debug || flags.verbose >= 2 {
        tracing::debug!(target: "live_camera_module", ?err, "detailed error");
    }

    report_error(err, flags);
    map_error_to_sysexit(err)
}

#[cfg(feature = "cli")]
pub fn info_user(flags: &StandardOptions, msg: &str) {
    if flags.debug || flags.verbose >= 1 {
        eprintln!("INFO: {msg}");
    }

    tracing::info!(target: "live_camera_module", "{msg}");
}

#[cfg(feature = "cli")]
pub fn warn_user(flags: &StandardOptions, msg: &str) {
    if flags.debug || flags.verbose >= 1 {
        eprintln!("WARN: {msg}");
    }

    tracing::warn!(target: "live_camera_module", "{msg}");
}

/// Reports a screen event the way the user asked to see it.
#[cfg(feature = "cli")]
pub fn report_event(flags: &StandardOptions, event: &CameraEvent) {
    match event {
        CameraEvent::FrameRate { sample, .. } => info_user(
            flags,
            &format!(
                "{} frames in {:.1}s, fps={:.1}",
                sample.frames,
                sample.elapsed.as_secs_f64(),
                sample.fps
            ),
        ),
        CameraEvent::Warning { message, .. } => warn_user(flags, message),
        CameraEvent::Error { error, .. } => warn_user(flags, &error.to_string()),
        CameraEvent::Started { backend } => info_user(flags, &format!("{backend} preview started")),
        CameraEvent::Stopped { backend } => info_user(flags, &format!("{backend} preview stopped")),
        CameraEvent::FrameDropped { .. } => {
            if flags.debug || flags.verbose >= 3 {
                eprintln!("DEBUG: frame dropped");
            }
        },
    }
}

#[cfg(feature = "cli")]
fn report_error(err: &CameraError, flags: &StandardOptions) {
    use std::error::Error as _;
    use std::io::Write;

    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "ERROR: {err}");

    if flags.debug || flags.verbose >= 2 {
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = writeln!(stderr, "  Caused by: {}", cause);
            source = cause.source();
        }
    }
}

#[cfg(feature = "cli")]
pub fn map_error_to_sysexit(err: &CameraError) -> SysexitsError {
    match err {
        CameraError::NoDriver => EX_UNAVAILABLE,
        CameraError::NoCamera(_) => EX_USAGE,
        CameraError::NoFacingCamera(_) => EX_UNAVAILABLE,
        CameraError::NotConfigured => EX_CONFIG,
        CameraError::InvalidConfig(_) => EX_USAGE,
        CameraError::Unsupported(_) => EX_UNAVAILABLE,
        CameraError::Closed => EX_IOERR,
        CameraError::DriverError { .. } => EX_SOFTWARE,
        CameraError::Other(_) => EX_SOFTWARE,
    }
}

/// Parses `WIDTHxHEIGHT`, e.g. `320x240`.
pub fn parse_dimensions(input: &str) -> Result<Size, CameraError> {
    let (w, h) = input
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| {
            CameraError::invalid_config(format!("expected WIDTHxHEIGHT, got {input:?}"))
        })?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|e| CameraError::invalid_config(format!("invalid width {w:?}: {e}")))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|e| CameraError::invalid_config(format!("invalid height {h:?}: {e}")))?;
    if width == 0 || height == 0 {
        return Err(CameraError::invalid_config("dimensions must be non-zero"));
    }
    Ok(Size::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("320x240").unwrap(), Size::new(320, 240));
        assert_eq!(parse_dimensions(" 1280X720 ").unwrap(), Size::new(1280, 720));
    }

    #[test]
    fn test_parse_dimensions_rejects_garbage() {
        assert!(parse_dimensions("320").is_err());
        assert!(parse_dimensions("0x240").is_err());
        assert!(parse_dimensions("axb").is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_missing_front_camera_is_unavailable() {
        let err = CameraError::NoFacingCamera(crate::shared::CameraFacing::Front);
        assert!(matches!(map_error_to_sysexit(&err), EX_UNAVAILABLE));
    }
}
