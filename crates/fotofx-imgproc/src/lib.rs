#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// image basic operations module.
pub mod core;

/// image enhancement module.
pub mod enhance;

/// frequency domain filtering module.
pub mod fft;

/// image filtering module.
pub mod filter;

/// border handling for neighbourhood operations.
pub mod padding;

/// module containing parallization utilities.
pub mod parallel;

/// operations to threshold images.
pub mod threshold;
