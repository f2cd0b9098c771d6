use num_traits::Zero;
use std::cmp::PartialOrd;

use fotofx_image::{Image, ImageError};

use crate::{padding::PaddingMode, parallel};

/// Apply a binary threshold to an image.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output image of an arbitrary number of channels and type.
/// * `threshold` - The threshold value. Must be the same type as the image.
/// * `max_value` - The maximum value to use when the input value is greater than the threshold.
///
/// # Returns
///
/// The thresholded image with the same number of channels as the input image.
///
/// # Examples
///
/// ```
/// use fotofx_image::{Image, ImageSize};
/// use fotofx_imgproc::threshold::threshold_binary;
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_binary(&image, &mut thresholded, 100, 255).unwrap();
/// assert_eq!(thresholded.as_slice(), &[0, 255, 0, 255, 255, 255]);
/// ```
pub fn threshold_binary<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    threshold: T,
    max_value: T,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + PartialOrd + Zero,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    // run the thresholding operation in parallel
    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = if *src_pixel > threshold {
            max_value
        } else {
            T::zero()
        };
    });

    Ok(())
}

/// Apply an adaptive threshold against the local mean.
///
/// The local mean is the `block_size x block_size` box average around each pixel,
/// rounded to the nearest integer, with the border replicated. A pixel is set to
/// `max_value` when `src - mean > -c` and to zero otherwise.
///
/// # Arguments
///
/// * `src` - The grayscale input image.
/// * `dst` - The grayscale output image.
/// * `max_value` - The value written for pixels passing the test.
/// * `block_size` - The odd side of the averaging window, at least 3.
/// * `c` - The constant subtracted from the mean.
///
/// # Examples
///
/// ```
/// use fotofx_image::{Image, ImageSize};
/// use fotofx_imgproc::threshold::adaptive_threshold_mean;
///
/// let image = Image::<u8, 1>::from_size_val(ImageSize { width: 4, height: 4 }, 90).unwrap();
/// let mut mask = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// adaptive_threshold_mean(&image, &mut mask, 255, 9, 9).unwrap();
/// assert!(mask.as_slice().iter().all(|&v| v == 255));
/// ```
pub fn adaptive_threshold_mean(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    max_value: u8,
    block_size: usize,
    c: i32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if block_size % 2 == 0 || block_size < 3 {
        return Err(ImageError::InvalidWindowSize(
            block_size,
            "must be odd and at least 3",
        ));
    }

    let (width, height) = (src.width(), src.height());
    let radius = (block_size / 2) as isize;
    let area = (block_size * block_size) as f32;
    let pad = PaddingMode::Replicate;
    let src_data = src.as_slice();

    parallel::par_rows_mut(dst, |y, row| {
        // vertical window sums for every column of this row
        let mut col_sums = vec![0u32; width];
        for dy in -radius..=radius {
            let sy = pad.map_index(y as isize + dy, height);
            let src_row = &src_data[sy * width..(sy + 1) * width];
            for (acc, &v) in col_sums.iter_mut().zip(src_row.iter()) {
                *acc += v as u32;
            }
        }

        let mut sum: u32 = (-radius..=radius)
            .map(|dx| col_sums[pad.map_index(dx, width)])
            .sum();

        for x in 0..width {
            let mean = (sum as f32 / area).round() as i32;
            let value = src_data[y * width + x] as i32;
            row[x] = if value - mean > -c { max_value } else { 0 };

            sum -= col_sums[pad.map_index(x as isize - radius, width)];
            sum += col_sums[pad.map_index(x as isize + radius + 1, width)];
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use fotofx_image::{Image, ImageError, ImageSize};

    #[test]
    fn threshold_binary() -> Result<(), ImageError> {
        let data = vec![100u8, 200, 50, 150, 200, 250];
        let data_expected = [0u8, 255, 0, 255, 255, 255];
        let image = Image::<_, 1>::new(
            ImageSize {
                width: 2,
                height: 3,
            },
            data,
        )?;

        let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0)?;

        super::threshold_binary(&image, &mut thresholded, 100, 255)?;

        assert_eq!(thresholded.num_channels(), 1);
        assert_eq!(thresholded.size().width, 2);
        assert_eq!(thresholded.size().height, 3);

        assert_eq!(thresholded.as_slice(), data_expected);

        Ok(())
    }

    #[test]
    fn adaptive_threshold_mean_dark_spot() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 5,
            height: 5,
        };
        let mut data = vec![100u8; 25];
        data[12] = 20;
        let image = Image::<u8, 1>::new(size, data)?;
        let mut mask = Image::<u8, 1>::from_size_val(size, 7)?;

        super::adaptive_threshold_mean(&image, &mut mask, 255, 3, 9)?;

        // the spot sits far below its local mean, its neighbours barely above theirs
        for (i, &v) in mask.as_slice().iter().enumerate() {
            let expected = if i == 12 { 0 } else { 255 };
            assert_eq!(v, expected, "index {i}");
        }

        Ok(())
    }

    #[test]
    fn adaptive_threshold_mean_margin() -> Result<(), ImageError> {
        // a bright spot lifts the mean of its neighbours by 10, past the margin of 9
        let size = ImageSize {
            width: 3,
            height: 3,
        };
        let image = Image::<u8, 1>::new(size, vec![0, 0, 0, 0, 90, 0, 0, 0, 0])?;
        let mut mask = Image::<u8, 1>::from_size_val(size, 0)?;

        super::adaptive_threshold_mean(&image, &mut mask, 255, 3, 9)?;
        assert_eq!(mask.get([1, 1, 0]), Some(&255));
        assert_eq!(mask.get([0, 1, 0]), Some(&0));

        super::adaptive_threshold_mean(&image, &mut mask, 255, 3, 11)?;
        assert_eq!(mask.get([0, 1, 0]), Some(&255));

        Ok(())
    }

    #[test]
    fn adaptive_threshold_rejects_even_block() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([3, 3].into(), 0)?;
        let mut mask = image.clone();
        assert!(super::adaptive_threshold_mean(&image, &mut mask, 255, 4, 9).is_err());
        Ok(())
    }
}
