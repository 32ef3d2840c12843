//! Utility functions shared by the index and matching code.
//!
//! ## Modules
//!
//! - [`encoding`] - Little-endian word I/O with bounded reads
//! - [`progress`] - Progress bars (no-op without the `progress` feature)

pub mod encoding;
pub mod progress;

pub use encoding::*;
pub use progress::*;
