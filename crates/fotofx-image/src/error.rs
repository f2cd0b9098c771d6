/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images that must agree in size do not.
    #[error("Image size mismatch: {0}x{1} vs {2}x{3}")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a pixel value cannot be cast to the target type.
    #[error("Failed to cast pixel value to {0}")]
    CastError(String),

    /// Error when a kernel is not square with an odd side length.
    #[error("Kernel must be square with an odd side, got {0}x{1}")]
    InvalidKernelSize(usize, usize),

    /// Error when a window or block size parameter is not usable.
    #[error("Invalid window size {0}: {1}")]
    InvalidWindowSize(usize, &'static str),
}
