use fotofx_image::{Image, ImageError};
use rayon::prelude::*;

use crate::padding::PaddingMode;

/// Trait for floating point casting
pub trait FloatConversion: Copy {
    /// Convert the type to f32
    fn to_f32(&self) -> f32;
    /// Convert the type from f32, saturating where the type is bounded
    fn from_f32(val: f32) -> Self;
}

impl FloatConversion for f32 {
    fn to_f32(&self) -> f32 {
        *self
    }

    fn from_f32(val: f32) -> Self {
        val
    }
}

impl FloatConversion for u8 {
    fn to_f32(&self) -> f32 {
        *self as f32
    }

    fn from_f32(val: f32) -> Self {
        val.round().clamp(0.0, 255.0) as u8
    }
}

/// Apply a separable filter to an image.
///
/// The horizontal kernel runs first into an `f32` buffer, the vertical kernel
/// then writes into `dst`. Reads outside the image follow `padding`.
/// The kernels are used as given, no normalisation is applied.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel, odd length.
/// * `kernel_y` - The vertical kernel, odd length.
/// * `padding` - How samples outside the image are read.
pub fn separable_filter<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
    padding: PaddingMode,
) -> Result<(), ImageError>
where
    T: FloatConversion + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if kernel_x.len() % 2 == 0 || kernel_y.len() % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(kernel_x.len(), kernel_y.len()));
    }

    if src.size().is_empty() {
        return Ok(());
    }

    let (rows, cols) = (src.rows(), src.cols());
    let half_x = (kernel_x.len() / 2) as isize;
    let half_y = (kernel_y.len() / 2) as isize;
    let src_data = src.as_slice();

    // precompute the column lookups once, they are shared by every row
    let cols_map: Vec<Vec<usize>> = (0..cols)
        .map(|c| {
            (0..kernel_x.len())
                .map(|k| padding.map_index(c as isize + k as isize - half_x, cols))
                .collect()
        })
        .collect();

    let mut temp = vec![0.0f32; src_data.len()];

    // horizontal pass
    temp.par_chunks_exact_mut(cols * C)
        .enumerate()
        .for_each(|(r, row_temp)| {
            let row_offset = r * cols * C;
            for (c, taps) in cols_map.iter().enumerate() {
                let mut acc = [0.0f32; C];
                for (&k, &x) in kernel_x.iter().zip(taps.iter()) {
                    let idx = row_offset + x * C;
                    for (ch, acc_val) in acc.iter_mut().enumerate() {
                        *acc_val += src_data[idx + ch].to_f32() * k;
                    }
                }
                row_temp[c * C..(c + 1) * C].copy_from_slice(&acc);
            }
        });

    // vertical pass
    dst.as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .enumerate()
        .for_each(|(r, row_dst)| {
            let rows_map: Vec<usize> = (0..kernel_y.len())
                .map(|k| padding.map_index(r as isize + k as isize - half_y, rows))
                .collect();
            for c in 0..cols {
                let mut acc = [0.0f32; C];
                for (&k, &y) in kernel_y.iter().zip(rows_map.iter()) {
                    let idx = (y * cols + c) * C;
                    for (ch, acc_val) in acc.iter_mut().enumerate() {
                        *acc_val += temp[idx + ch] * k;
                    }
                }
                for (ch, &acc_val) in acc.iter().enumerate() {
                    row_dst[c * C + ch] = T::from_f32(acc_val);
                }
            }
        });

    Ok(())
}
