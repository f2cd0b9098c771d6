use fotofx_image::{Image, ImageSize};

use crate::FilterError;

/// Build an RGB image from a decoded buffer whose channel count is only known at runtime.
///
/// # Errors
///
/// [`FilterError::UnsupportedImage`] unless the buffer holds exactly three
/// channels over a non empty area, [`FilterError::Image`] if the buffer length
/// does not match the size.
///
/// # Examples
///
/// ```
/// use fotofx_image::ImageSize;
/// use fotofx_filters::rgb_image_from_raw;
///
/// let size = ImageSize { width: 2, height: 1 };
/// let image = rgb_image_from_raw(size, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
/// assert_eq!(image.pixel(1, 0), &[4, 5, 6]);
///
/// assert!(rgb_image_from_raw(size, 4, vec![0; 8]).is_err());
/// ```
pub fn rgb_image_from_raw(
    size: ImageSize,
    channels: usize,
    data: Vec<u8>,
) -> Result<Image<u8, 3>, FilterError> {
    if channels != 3 {
        return Err(FilterError::UnsupportedImage(format!(
            "expected 3 color channels, got {channels}"
        )));
    }

    if size.is_empty() {
        return Err(FilterError::UnsupportedImage(format!(
            "image has zero area ({size})"
        )));
    }

    Ok(Image::new(size, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fotofx_image::ImageError;

    #[test]
    fn rejects_other_layouts() {
        let size = ImageSize {
            width: 2,
            height: 2,
        };
        assert!(matches!(
            rgb_image_from_raw(size, 1, vec![0; 4]),
            Err(FilterError::UnsupportedImage(_))
        ));
        assert!(matches!(
            rgb_image_from_raw([0, 3].into(), 3, vec![]),
            Err(FilterError::UnsupportedImage(_))
        ));
        assert_eq!(
            rgb_image_from_raw(size, 3, vec![0; 11]),
            Err(FilterError::Image(ImageError::InvalidChannelShape(11, 12)))
        );
    }
}
