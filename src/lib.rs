// This is free and unencumbered software released into the public domain.

//! Live camera preview: binds a front-facing camera's preview stream to a
//! host-owned display surface and logs frame-rate diagnostics.

#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod cli;
pub mod shared;

#[cfg(all(feature = "android", target_os = "android"))]
pub mod ffi;
