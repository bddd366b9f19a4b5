//! # Duck v1beta1
//!
//! Narrow status types kept for older API versions.

mod addressable;
mod status;

pub use addressable::Addressable;
pub use status::Status;
