// This is free and unencumbered software released into the public domain.

mod camera_info;
pub use camera_info::*;

mod config;
pub use config::*;

mod device;
pub use device::*;

mod driver;
pub use driver::*;

pub mod drivers {
    #[cfg(all(feature = "android", target_os = "android"))]
    pub mod android;

    #[cfg(feature = "ffmpeg")]
    pub mod ffmpeg;

    pub mod simulated;
}

mod error;
pub use error::*;

mod fps;
pub use fps::*;

mod frame;
pub use frame::*;

mod open;
pub use open::*;

mod parameters;
pub use parameters::*;

mod screen;
pub use screen::*;

mod surface;
pub use surface::*;
