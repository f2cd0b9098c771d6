#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! Filters read and write `Image<u8, 3>` and `u8` in `[0, 255]` is the canonical
//! pixel domain: every primitive rounds and saturates back to 8 bits.
//! The frequency domain blur is the exception, it runs on `f32` samples scaled
//! to `[0, 1]` and is converted back at the end of [`simple::fft_blur`].

/// the cartoon pipeline filters.
pub mod cartoon;

/// conversion of decoded buffers into filter inputs.
pub mod convert;

/// error types for the filters.
pub mod error;

/// the closed set of filters and their parameters.
pub mod kind;

/// the filter lookup table.
pub mod registry;

/// fixed kernel filters and parameterised blurs.
pub mod simple;

pub use crate::convert::rgb_image_from_raw;
pub use crate::error::FilterError;
pub use crate::kind::{FilterKind, ParamKind, ParamSpec};
pub use crate::registry::FilterRegistry;
