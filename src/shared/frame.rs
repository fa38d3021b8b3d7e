// This is free and unencumbered software released into the public domain.

use bytes::Bytes;
use derive_more::Display;

/// Pixel layout of preview frames and still pictures.
///
/// Numeric codes follow the Android `ImageFormat` constants so that NDK
/// metadata can be mapped without a lookup table on the caller side.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum PixelFormat {
    #[display("RGB_888")]
    Rgb8,
    #[display("BGRA_8888")]
    Bgra8,
    #[display("NV21")]
    Nv21,
    #[display("YV12")]
    Yv12,
    #[display("YUV_420_888")]
    Yuv420,
    #[display("JPEG")]
    Jpeg,
    #[display("PRIVATE")]
    Private,
    #[display("0x{_0:x}")]
    Other(i32),
}

impl PixelFormat {
    pub fn from_code(code: i32) -> Self {
        match code {
            0x3 => Self::Rgb8,
            0x5 => Self::Bgra8,
            0x11 => Self::Nv21,
            0x23 => Self::Yuv420,
            0x22 => Self::Private,
            0x100 => Self::Jpeg,
            0x3231_5659 => Self::Yv12,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Rgb8 => 0x3,
            Self::Bgra8 => 0x5,
            Self::Nv21 => 0x11,
            Self::Yuv420 => 0x23,
            Self::Private => 0x22,
            Self::Jpeg => 0x100,
            Self::Yv12 => 0x3231_5659,
            Self::Other(code) => code,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub pixel_format: PixelFormat,
    pub timestamp_ns: u64,
}

impl Frame {
    pub fn new_rgb8(data: Bytes, width: u32, height: u32, stride: u32) -> Self {
        Self {
            data,
            width,
            height,
            stride,
            pixel_format: PixelFormat::Rgb8,
            timestamp_ns: 0,
        }
    }

    pub fn with_timestamp_ns(mut self, timestamp_ns: u64) -> Self {
        self.timestamp_ns = timestamp_ns;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_codes() {
        assert_eq!(PixelFormat::from_code(17), PixelFormat::Nv21);
        assert_eq!(PixelFormat::from_code(256), PixelFormat::Jpeg);
        assert_eq!(PixelFormat::from_code(0x7f), PixelFormat::Other(0x7f));
        assert_eq!(PixelFormat::Nv21.to_string(), "NV21");
        assert_eq!(PixelFormat::Other(0x7f).to_string(), "0x7f");
    }
}
