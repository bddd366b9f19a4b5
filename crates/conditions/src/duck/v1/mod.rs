//! # Duck v1
//!
//! Native status types.

mod addressable;
mod kresource;
mod status;

pub use addressable::Addressable;
pub use kresource::KResource;
pub use status::Status;
