#![deny(missing_docs)]
//! Image types used across the fotofx filter pipeline

/// image representation for the filter pipeline.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
