// This is free and unencumbered software released into the public domain.

use crate::shared::PixelFormat;
use derive_more::Display;

#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash)]
#[display("{width}x{height}")]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn distance(&self, other: &Size) -> u64 {
        self.width.abs_diff(other.width) as u64 + self.height.abs_diff(other.height) as u64
    }
}

/// Preview frame-rate range in thousandths of a frame per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FpsRange {
    pub min: i32,
    pub max: i32,
}

impl FpsRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(thousandths: i32) -> Self {
        Self::new(thousandths, thousandths)
    }

    pub const fn is_fixed(&self) -> bool {
        self.min == self.max
    }
}

/// Capture parameters as negotiated with a camera device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraParameters {
    pub supported_preview_sizes: Vec<Size>,
    pub supported_picture_sizes: Vec<Size>,
    pub supported_preview_fps_ranges: Vec<FpsRange>,
    pub preview_size: Size,
    pub picture_size: Size,
    pub preview_fps_range: FpsRange,
    pub preview_format: PixelFormat,
    pub picture_format: PixelFormat,
    pub rotation: u32,
}

impl Default for CameraParameters {
    fn default() -> Self {
        Self {
            supported_preview_sizes: Vec::new(),
            supported_picture_sizes: Vec::new(),
            supported_preview_fps_ranges: Vec::new(),
            preview_size: Size::default(),
            picture_size: Size::default(),
            preview_fps_range: FpsRange::default(),
            preview_format: PixelFormat::Nv21,
            picture_format: PixelFormat::Jpeg,
            rotation: 0,
        }
    }
}

fn nearest_size(supported: &[Size], desired: Size) -> Option<Size> {
    // Ties resolve to the earliest entry.
    supported
        .iter()
        .copied()
        .min_by_key(|size| size.distance(&desired))
}

impl CameraParameters {
    /// Picks the supported preview size closest to `desired` and applies it.
    pub fn choose_preview_size(&mut self, desired: Size) -> Size {
        match nearest_size(&self.supported_preview_sizes, desired) {
            Some(size) => {
                if size != desired {
                    tracing::warn!(%desired, chosen = %size, "unable to set preview size");
                }
                self.preview_size = size;
            },
            None => {
                tracing::warn!(%desired, current = %self.preview_size, "no supported preview sizes");
            },
        }
        self.preview_size
    }

    /// Picks the supported picture size closest to `desired` and applies it.
    pub fn choose_picture_size(&mut self, desired: Size) -> Size {
        match nearest_size(&self.supported_picture_sizes, desired) {
            Some(size) => {
                if size != desired {
                    tracing::warn!(%desired, chosen = %size, "unable to set picture size");
                }
                self.picture_size = size;
            },
            None => {
                tracing::warn!(%desired, current = %self.picture_size, "no supported picture sizes");
            },
        }
        self.picture_size
    }

    /// Attempts to lock the preview to a fixed frame rate.
    ///
    /// Returns the resulting rate in thousandths of fps. When no fixed range
    /// is supported the current range is left alone and a best guess of the
    /// effective rate is returned.
    pub fn choose_fixed_preview_fps(&mut self, desired_thousandths: i32) -> i32 {
        let nearest = self
            .supported_preview_fps_ranges
            .iter()
            .filter(|range| range.is_fixed())
            .min_by_key(|range| range.min.abs_diff(desired_thousandths))
            .copied();

        if let Some(range) = nearest {
            if range.min != desired_thousandths {
                tracing::warn!(
                    desired = desired_thousandths,
                    chosen = range.min,
                    "no exact fixed preview fps range"
                );
            }
            self.preview_fps_range = range;
            return range.min;
        }

        let current = self.preview_fps_range;
        let guess = if current.is_fixed() {
            current.min
        } else {
            current.max / 2
        };
        tracing::warn!(
            min = current.min,
            max = current.max,
            guess,
            "no fixed preview fps range, keeping current"
        );
        guess
    }
}

/// The capture settings resolved for one preview session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureConfiguration {
    pub preview_size: Size,
    pub picture_size: Size,
    pub fps_thousandths: i32,
    pub rotation: u32,
    pub preview_format: PixelFormat,
    pub picture_format: PixelFormat,
}

impl CaptureConfiguration {
    /// Negotiates sizes, frame rate, and rotation against `params`, leaving
    /// the chosen values applied to `params`.
    pub fn negotiate(
        params: &mut CameraParameters,
        desired_size: Size,
        desired_fps_thousandths: i32,
        rotation: u32,
    ) -> Self {
        let preview_size = params.choose_preview_size(desired_size);
        let picture_size = params.choose_picture_size(desired_size);
        let fps_thousandths = params.choose_fixed_preview_fps(desired_fps_thousandths);
        params.rotation = rotation;
        Self {
            preview_size,
            picture_size,
            fps_thousandths,
            rotation,
            preview_format: params.preview_format,
            picture_format: params.picture_format,
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps_thousandths as f32 / 1000.0
    }

    pub fn preview_facts(&self) -> String {
        format!(
            "{} @{:.1}fps PreviewFormat: {}",
            self.preview_size,
            self.fps(),
            self.preview_format
        )
    }

    pub fn picture_facts(&self) -> String {
        format!(
            "{} @{:.1}fps PictureFormat: {}",
            self.picture_size,
            self.fps(),
            self.picture_format
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params() -> CameraParameters {
        CameraParameters {
            supported_preview_sizes: vec![
                Size::new(1280, 720),
                Size::new(640, 480),
                Size::new(352, 288),
                Size::new(320, 240),
            ],
            supported_picture_sizes: vec![Size::new(2048, 1536), Size::new(640, 480)],
            supported_preview_fps_ranges: vec![
                FpsRange::new(7_500, 30_000),
                FpsRange::fixed(15_000),
                FpsRange::fixed(24_000),
            ],
            preview_size: Size::new(640, 480),
            picture_size: Size::new(2048, 1536),
            preview_fps_range: FpsRange::new(7_500, 30_000),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_preview_size_wins() {
        let mut p = params();
        assert_eq!(p.choose_preview_size(Size::new(320, 240)), Size::new(320, 240));
        assert_eq!(p.preview_size, Size::new(320, 240));
    }

    #[test]
    fn test_nearest_picture_size() {
        let mut p = params();
        assert_eq!(p.choose_picture_size(Size::new(320, 240)), Size::new(640, 480));
    }

    #[test]
    fn test_empty_size_list_keeps_current() {
        let mut p = CameraParameters {
            preview_size: Size::new(176, 144),
            ..Default::default()
        };
        assert_eq!(p.choose_preview_size(Size::new(320, 240)), Size::new(176, 144));
    }

    #[test]
    fn test_ties_prefer_earliest() {
        let mut p = CameraParameters {
            supported_preview_sizes: vec![Size::new(330, 240), Size::new(310, 240)],
            ..Default::default()
        };
        assert_eq!(p.choose_preview_size(Size::new(320, 240)), Size::new(330, 240));
    }

    #[test]
    fn test_nearest_fixed_fps() {
        let mut p = params();
        assert_eq!(p.choose_fixed_preview_fps(30_000), 24_000);
        assert_eq!(p.preview_fps_range, FpsRange::fixed(24_000));
    }

    #[test]
    fn test_exact_fixed_fps() {
        let mut p = params();
        p.supported_preview_fps_ranges.push(FpsRange::fixed(30_000));
        assert_eq!(p.choose_fixed_preview_fps(30_000), 30_000);
    }

    #[test]
    fn test_variable_range_guess() {
        let mut p = params();
        p.supported_preview_fps_ranges.retain(|r| !r.is_fixed());
        assert_eq!(p.choose_fixed_preview_fps(30_000), 15_000);
        assert_eq!(p.preview_fps_range, FpsRange::new(7_500, 30_000));
    }

    #[test]
    fn test_negotiate_applies_rotation_and_formats_facts() {
        let mut p = params();
        p.supported_preview_fps_ranges.push(FpsRange::fixed(30_000));
        let config = CaptureConfiguration::negotiate(&mut p, Size::new(320, 240), 30_000, 270);
        assert_eq!(config.rotation, 270);
        assert_eq!(p.rotation, 270);
        assert_eq!(config.preview_facts(), "320x240 @30.0fps PreviewFormat: NV21");
        assert_eq!(config.picture_facts(), "640x480 @30.0fps PictureFormat: JPEG");
    }

    proptest! {
        #[test]
        fn prop_rotation_independent_of_size(w in 1u32..4000, h in 1u32..4000) {
            let mut p = params();
            let config = CaptureConfiguration::negotiate(&mut p, Size::new(w, h), 30_000, 270);
            prop_assert_eq!(config.rotation, 270);
        }

        #[test]
        fn prop_chosen_size_is_supported_and_nearest(w in 1u32..4000, h in 1u32..4000) {
            let mut p = params();
            let desired = Size::new(w, h);
            let chosen = p.choose_preview_size(desired);
            prop_assert!(p.supported_preview_sizes.contains(&chosen));
            for size in &p.supported_preview_sizes {
                prop_assert!(chosen.distance(&desired) <= size.distance(&desired));
            }
        }
    }
}
