use fotofx_image::{Image, ImageError};

use super::kernels::{Kernel, ScaledKernel};
use crate::parallel;

/// Convolve an image with an arbitrary odd square kernel.
///
/// For every pixel `(x, y)` at least `offset = side / 2` pixels away from each
/// border, every channel accumulates `src[x + a - offset, y + b - offset] * kernel[a][b]`
/// where `a` walks the x axis and `b` the y axis. The sum is truncated toward zero
/// and saturated to `[0, 255]`. No normalisation is applied.
///
/// Pixels closer than `offset` to a border are written as zero, they are not
/// padded nor copied from the source. An image smaller than the kernel comes out black.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel` - The convolution kernel.
///
/// # Examples
///
/// ```
/// use fotofx_image::{Image, ImageSize};
/// use fotofx_imgproc::filter::{apply_kernel, kernels::Kernel};
///
/// let src = Image::<u8, 3>::from_size_val(ImageSize { width: 3, height: 3 }, 10).unwrap();
/// let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0).unwrap();
/// let kernel = Kernel::new(3, vec![1.0; 9]).unwrap();
///
/// apply_kernel(&src, &mut dst, &kernel).unwrap();
/// assert_eq!(dst.pixel(1, 1), &[90, 90, 90]);
/// assert_eq!(dst.pixel(0, 0), &[0, 0, 0]);
/// ```
pub fn apply_kernel<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel: &Kernel,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let offset = kernel.offset();
    let (width, height) = (src.width(), src.height());

    parallel::par_rows_mut(dst, |y, row| {
        row.fill(0);
        if y < offset || y + offset >= height {
            return;
        }
        for x in offset..width.saturating_sub(offset) {
            let mut acc = [0.0f32; C];
            for a in 0..kernel.side() {
                for b in 0..kernel.side() {
                    let w = kernel.at(a, b);
                    let pixel = src.pixel(x + a - offset, y + b - offset);
                    for (acc_val, &v) in acc.iter_mut().zip(pixel.iter()) {
                        *acc_val += v as f32 * w;
                    }
                }
            }
            for (ch, &acc_val) in acc.iter().enumerate() {
                row[x * C + ch] = acc_val.trunc().clamp(0.0, 255.0) as u8;
            }
        }
    });

    Ok(())
}

/// Filter an image with a fixed kernel carrying its own scale and offset.
///
/// Interior pixels get `round(sum / scale + offset)` saturated to `[0, 255]`.
/// The first kernel row weighs the image row below the pixel and the last row
/// the one above, columns run left to right.
/// The `side / 2` wide border is copied unchanged from the source.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel` - One of the fixed kernels in [`super::kernels`].
pub fn filter_scaled<const C: usize, const N: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel: &ScaledKernel<N>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if kernel.side % 2 == 0 || kernel.side * kernel.side != N {
        return Err(ImageError::InvalidKernelSize(kernel.side, N / kernel.side.max(1)));
    }

    let half = kernel.side / 2;
    let (width, height) = (src.width(), src.height());
    let row_stride = width * C;

    parallel::par_rows_mut(dst, |y, row| {
        let src_row = &src.as_slice()[y * row_stride..(y + 1) * row_stride];
        if y < half || y + half >= height {
            row.copy_from_slice(src_row);
            return;
        }
        for x in 0..width {
            if x < half || x + half >= width {
                row[x * C..(x + 1) * C].copy_from_slice(src.pixel(x, y));
                continue;
            }
            let mut acc = [0.0f32; C];
            for dy in 0..kernel.side {
                for dx in 0..kernel.side {
                    let w = kernel.weights[(kernel.side - 1 - dy) * kernel.side + dx];
                    if w == 0.0 {
                        continue;
                    }
                    let pixel = src.pixel(x + dx - half, y + dy - half);
                    for (acc_val, &v) in acc.iter_mut().zip(pixel.iter()) {
                        *acc_val += v as f32 * w;
                    }
                }
            }
            for (ch, &acc_val) in acc.iter().enumerate() {
                let v = acc_val / kernel.scale + kernel.offset;
                row[x * C + ch] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    });

    Ok(())
}
