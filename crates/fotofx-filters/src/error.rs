use fotofx_image::ImageError;
use fotofx_imgproc::fft::FftError;

/// An error type for the filters module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// A filter parameter is missing, malformed or out of range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The image cannot be processed by the filters.
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// A numerical step failed and could not be clamped.
    #[error("Computation failed: {0}")]
    Computation(String),

    /// No filter is registered under the given name.
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    /// Error from an image primitive.
    #[error("Image operation failed. {0}")]
    Image(#[from] ImageError),
}

impl From<FftError> for FilterError {
    fn from(err: FftError) -> Self {
        match err {
            FftError::InvalidIntensity(_) => FilterError::InvalidParameter {
                name: "intensity",
                reason: err.to_string(),
            },
            FftError::NonFiniteKernel(_) => FilterError::Computation(err.to_string()),
            FftError::Image(e) => FilterError::Image(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fft_errors_map_to_filter_errors() {
        assert!(matches!(
            FilterError::from(FftError::InvalidIntensity(-1.0)),
            FilterError::InvalidParameter {
                name: "intensity",
                ..
            }
        ));
        assert!(matches!(
            FilterError::from(FftError::NonFiniteKernel(1e9)),
            FilterError::Computation(_)
        ));
        assert_eq!(
            FilterError::from(FftError::Image(ImageError::InvalidChannelShape(4, 3))),
            FilterError::Image(ImageError::InvalidChannelShape(4, 3))
        );
    }
}
