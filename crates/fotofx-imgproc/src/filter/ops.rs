use fotofx_image::{Image, ImageError};

use super::{kernels, separable_filter, FloatConversion};
use crate::{padding::PaddingMode, parallel};

fn check_same_size<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &Image<T2, C2>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

/// Blur an image using a gaussian blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel (kernel_x, kernel_y), both odd.
/// * `sigma` - The sigma of the gaussian kernel, xy-ordered.
/// * `padding` - How samples outside the image are read.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn gaussian_blur<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_size: (usize, usize),
    sigma: (f32, f32),
    padding: PaddingMode,
) -> Result<(), ImageError>
where
    T: FloatConversion + Send + Sync,
{
    let kernel_x = kernels::gaussian_kernel_1d(kernel_size.0, sigma.0);
    let kernel_y = kernels::gaussian_kernel_1d(kernel_size.1, sigma.1);
    separable_filter(src, dst, &kernel_x, &kernel_y, padding)
}

/// Blur an image with a median filter.
///
/// Each output sample is the median of the `kernel_size x kernel_size` window
/// around it, computed per channel with a sliding histogram. The border is replicated.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The odd window side.
///
/// # Examples
///
/// ```
/// use fotofx_image::{Image, ImageSize};
/// use fotofx_imgproc::filter::median_blur;
///
/// let src = Image::<u8, 1>::new(
///     ImageSize { width: 3, height: 3 },
///     vec![0, 0, 0, 0, 255, 0, 0, 0, 0],
/// ).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0).unwrap();
///
/// median_blur(&src, &mut dst, 3).unwrap();
/// assert_eq!(dst.as_slice(), &[0; 9]);
/// ```
pub fn median_blur<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel_size: usize,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;

    if kernel_size % 2 == 0 {
        return Err(ImageError::InvalidWindowSize(kernel_size, "must be odd"));
    }

    let (width, height) = (src.width(), src.height());
    let radius = (kernel_size / 2) as isize;
    let median_rank = (kernel_size * kernel_size / 2) as u32;
    let pad = PaddingMode::Replicate;

    parallel::par_rows_mut(dst, |y, row| {
        let rows: Vec<usize> = (-radius..=radius)
            .map(|dy| pad.map_index(y as isize + dy, height))
            .collect();

        for ch in 0..C {
            let mut hist = [0u32; 256];
            let add_column = |hist: &mut [u32; 256], x: isize, delta: i32| {
                let x = pad.map_index(x, width);
                for &sy in rows.iter() {
                    let v = src.pixel(x, sy)[ch] as usize;
                    hist[v] = (hist[v] as i32 + delta) as u32;
                }
            };

            for dx in -radius..=radius {
                add_column(&mut hist, dx, 1);
            }

            for x in 0..width {
                let mut cumulative = 0u32;
                let mut median = 0u8;
                for (value, &count) in hist.iter().enumerate() {
                    cumulative += count;
                    if cumulative > median_rank {
                        median = value as u8;
                        break;
                    }
                }
                row[x * C + ch] = median;

                add_column(&mut hist, x as isize - radius, -1);
                add_column(&mut hist, x as isize + radius + 1, 1);
            }
        }
    });

    Ok(())
}

/// Smooth an image with an edge preserving bilateral filter.
///
/// The window is the disc of radius `diameter / 2`. Each neighbour is weighted by
/// `exp(-r^2 / (2 sigma_space^2))` for its distance and by
/// `exp(-d^2 / (2 sigma_color^2))` where `d` is the sum over channels of the
/// absolute intensity difference to the centre pixel. Reads outside the image
/// are mirrored (reflect 101).
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `diameter` - Diameter of the pixel neighbourhood.
/// * `sigma_color` - Spread of the range weight.
/// * `sigma_space` - Spread of the spatial weight.
pub fn bilateral_filter<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    diameter: usize,
    sigma_color: f32,
    sigma_space: f32,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;

    if diameter == 0 {
        return Err(ImageError::InvalidWindowSize(diameter, "must be positive"));
    }

    let radius = (diameter / 2) as isize;
    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let space_coeff = -0.5 / (sigma_space * sigma_space);

    // the spatial weights only depend on the offset
    let mut space_taps = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f32;
            if r2.sqrt() > radius as f32 {
                continue;
            }
            space_taps.push((dx, dy, (r2 * space_coeff).exp()));
        }
    }

    // the range weight only depends on the summed absolute difference
    let color_weights: Vec<f32> = (0..=255 * C)
        .map(|d| ((d * d) as f32 * color_coeff).exp())
        .collect();

    let (width, height) = (src.width(), src.height());
    let pad = PaddingMode::Reflect101;

    parallel::par_rows_mut(dst, |y, row| {
        for x in 0..width {
            let center = src.pixel(x, y);
            let mut sum = [0.0f32; C];
            let mut wsum = 0.0f32;

            for &(dx, dy, space_w) in space_taps.iter() {
                let sx = pad.map_index(x as isize + dx, width);
                let sy = pad.map_index(y as isize + dy, height);
                let pixel = src.pixel(sx, sy);

                let diff: usize = pixel
                    .iter()
                    .zip(center.iter())
                    .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs() as usize)
                    .sum();
                let w = space_w * color_weights[diff];

                for (s, &v) in sum.iter_mut().zip(pixel.iter()) {
                    *s += v as f32 * w;
                }
                wsum += w;
            }

            for (ch, &s) in sum.iter().enumerate() {
                row[x * C + ch] = (s / wsum).round().clamp(0.0, 255.0) as u8;
            }
        }
    });

    Ok(())
}

/// Compute the aperture 3 laplacian of a grayscale image.
///
/// The response of [`kernels::LAPLACIAN_3`] is saturated to `[0, 255]`, so
/// negative responses become zero. Reads outside the image are mirrored (reflect 101).
pub fn laplacian(src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    check_same_size(src, dst)?;

    let (width, height) = (src.width(), src.height());
    let pad = PaddingMode::Reflect101;
    let src_data = src.as_slice();

    parallel::par_rows_mut(dst, |y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            let mut acc = 0i32;
            for dy in 0..3 {
                let sy = pad.map_index(y as isize + dy as isize - 1, height);
                for dx in 0..3 {
                    let w = kernels::LAPLACIAN_3[dy * 3 + dx] as i32;
                    if w == 0 {
                        continue;
                    }
                    let sx = pad.map_index(x as isize + dx as isize - 1, width);
                    acc += w * src_data[sy * width + sx] as i32;
                }
            }
            *out = acc.clamp(0, 255) as u8;
        }
    });

    Ok(())
}
