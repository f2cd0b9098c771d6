use fotofx_image::{Image, ImageError};
use rayon::prelude::*;

use crate::parallel;

/// Perform a bitwise AND operation between two images using a mask.
///
/// The mask is a binary image where the value 0 is considered as False
/// and any other value is considered as True. Masked out pixels are set to zero.
///
/// # Arguments
///
/// * `src1` - The first input image.
/// * `src2` - The second input image.
/// * `dst` - The output image.
/// * `mask` - The binary mask to apply to the image.
///
/// # Example
///
/// ```
/// use fotofx_image::{Image, ImageSize};
/// use fotofx_imgproc::core::bitwise_and;
///
/// let image = Image::<u8, 3>::new(
///    ImageSize {
///        width: 2,
///        height: 2,
///    },
///    vec![0, 1, 2, 253, 254, 255, 128, 129, 130, 64, 65, 66],
/// ).unwrap();
///
/// let mask = Image::<u8, 1>::new(
///    ImageSize {
///        width: 2,
///        height: 2,
///    },
///    vec![255, 0, 255, 0],
/// ).unwrap();
///
/// let mut output = Image::<u8, 3>::from_size_val(image.size(), 0).unwrap();
///
/// bitwise_and(&image, &image, &mut output, &mask).unwrap();
///
/// assert_eq!(output.as_slice(), &[0, 1, 2, 0, 0, 0, 128, 129, 130, 0, 0, 0]);
/// ```
pub fn bitwise_and<const CHANNELS: usize>(
    src1: &Image<u8, CHANNELS>,
    src2: &Image<u8, CHANNELS>,
    dst: &mut Image<u8, CHANNELS>,
    mask: &Image<u8, 1>,
) -> Result<(), ImageError> {
    if src1.size() != src2.size() {
        return Err(ImageError::InvalidImageSize(
            src1.width(),
            src1.height(),
            src2.width(),
            src2.height(),
        ));
    }

    if src1.size() != mask.size() {
        return Err(ImageError::InvalidImageSize(
            src1.width(),
            src1.height(),
            mask.width(),
            mask.height(),
        ));
    }

    if src1.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src1.width(),
            src1.height(),
            dst.width(),
            dst.height(),
        ));
    }

    // apply the mask to the image
    dst.as_slice_mut()
        .par_chunks_exact_mut(CHANNELS)
        .zip(src1.as_slice().par_chunks_exact(CHANNELS))
        .zip(src2.as_slice().par_chunks_exact(CHANNELS))
        .zip(mask.as_slice().par_iter())
        .for_each(|(((out, inp1), inp2), &msk)| {
            for c in 0..CHANNELS {
                out[c] = if msk != 0 { inp1[c] & inp2[c] } else { 0 };
            }
        });

    Ok(())
}

/// Divide two images element wise and scale the quotient.
///
/// Each output value is `round(src1 * scale / src2)` saturated to `[0, 255]`.
/// A zero divisor yields `255` when the dividend is positive and `0` when it is zero.
///
/// # Arguments
///
/// * `src1` - The dividend image.
/// * `src2` - The divisor image.
/// * `dst` - The output image.
/// * `scale` - The factor applied to the quotient.
///
/// # Example
///
/// ```
/// use fotofx_image::{Image, ImageSize};
/// use fotofx_imgproc::core::divide_scale;
///
/// let size = ImageSize { width: 4, height: 1 };
/// let num = Image::<u8, 1>::new(size, vec![10, 10, 0, 200]).unwrap();
/// let den = Image::<u8, 1>::new(size, vec![10, 0, 0, 100]).unwrap();
/// let mut out = Image::<u8, 1>::from_size_val(size, 1).unwrap();
///
/// divide_scale(&num, &den, &mut out, 250.0).unwrap();
/// assert_eq!(out.as_slice(), &[250, 255, 0, 255]);
/// ```
pub fn divide_scale<const C: usize>(
    src1: &Image<u8, C>,
    src2: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    scale: f32,
) -> Result<(), ImageError> {
    if src1.size() != src2.size() {
        return Err(ImageError::InvalidImageSize(
            src1.width(),
            src1.height(),
            src2.width(),
            src2.height(),
        ));
    }

    if src1.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src1.width(),
            src1.height(),
            dst.width(),
            dst.height(),
        ));
    }

    parallel::par_iter_rows_val_two(src1, src2, dst, |&num, &den, out| {
        *out = if den == 0 {
            if num > 0 {
                u8::MAX
            } else {
                0
            }
        } else {
            (num as f32 * scale / den as f32).round().clamp(0.0, 255.0) as u8
        };
    });

    Ok(())
}

/// Invert an 8 bit image, `dst = 255 - src`.
pub fn invert<const C: usize>(src: &Image<u8, C>, dst: &mut Image<u8, C>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |&v, out| *out = u8::MAX - v);

    Ok(())
}

#[cfg(test)]
mod tests {
    use fotofx_image::{Image, ImageError, ImageSize};

    #[test]
    fn test_bitwise_and() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0, 1, 2, 253, 254, 255, 128, 129, 130, 64, 65, 66],
        )?;

        let mask = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![255, 0, 255, 0],
        )?;

        let mut output = Image::<u8, 3>::from_size_val(image.size(), 7)?;

        super::bitwise_and(&image, &image, &mut output, &mask)?;

        assert_eq!(output.size().width, 2);
        assert_eq!(output.size().height, 2);
        assert_eq!(output.num_channels(), 3);

        assert_eq!(
            output.as_slice(),
            vec![0, 1, 2, 0, 0, 0, 128, 129, 130, 0, 0, 0]
        );
        Ok(())
    }

    #[test]
    fn test_bitwise_and_two_sources() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 1,
            height: 1,
        };
        let a = Image::<u8, 3>::new(size, vec![0b1100, 255, 7])?;
        let b = Image::<u8, 3>::new(size, vec![0b1010, 15, 0])?;
        let mask = Image::<u8, 1>::new(size, vec![1])?;
        let mut output = Image::<u8, 3>::from_size_val(size, 0)?;

        super::bitwise_and(&a, &b, &mut output, &mask)?;
        assert_eq!(output.as_slice(), &[0b1000, 15, 0]);

        let small = Image::<u8, 1>::from_size_val([2, 1].into(), 1)?;
        assert_eq!(
            super::bitwise_and(&a, &b, &mut output, &small),
            Err(ImageError::InvalidImageSize(1, 1, 2, 1))
        );
        Ok(())
    }

    #[test]
    fn test_divide_scale() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 1,
        };
        let num = Image::<u8, 1>::new(size, vec![1, 100, 3])?;
        let den = Image::<u8, 1>::new(size, vec![3, 200, 2])?;
        let mut out = Image::<u8, 1>::from_size_val(size, 0)?;

        super::divide_scale(&num, &den, &mut out, 250.0)?;
        // 83.33, 125 and 375 saturated
        assert_eq!(out.as_slice(), &[83, 125, 255]);

        Ok(())
    }

    #[test]
    fn test_invert() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([3, 1].into(), vec![0, 100, 255])?;
        let mut out = image.clone();
        super::invert(&image, &mut out)?;
        assert_eq!(out.as_slice(), &[255, 155, 0]);
        Ok(())
    }
}
