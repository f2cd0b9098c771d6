use fotofx_image::{Image, ImageError};
use rayon::prelude::*;

use crate::color::gray_from_rgb;

/// Number of passes of the recursive edge preserving filter.
const DOMAIN_TRANSFORM_ITERATIONS: i32 = 3;

/// Gain applied to the extracted detail layer.
const DETAIL_FACTOR: f32 = 3.0;

/// Enhance the fine detail of an RGB image.
///
/// The luminance `L` in `[0, 1]` is smoothed with an edge preserving recursive
/// domain transform filter, giving a base layer `B`. The detail layer `L - B` is
/// amplified three times and every color channel is shifted by the resulting
/// luminance change `L' - L`, then rounded and saturated.
///
/// # Arguments
///
/// * `src` - The source RGB image.
/// * `dst` - The destination RGB image.
/// * `sigma_s` - Spatial extent of the smoothing, in pixels.
/// * `sigma_r` - Range extent of the smoothing, on the `[0, 1]` luminance scale.
///
/// # Examples
///
/// ```
/// use fotofx_image::{Image, ImageSize};
/// use fotofx_imgproc::enhance::detail_enhance;
///
/// let src = Image::<u8, 3>::from_size_val(ImageSize { width: 8, height: 6 }, 90).unwrap();
/// let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0).unwrap();
///
/// detail_enhance(&src, &mut dst, 5.0, 0.5).unwrap();
/// assert_eq!(dst.as_slice(), src.as_slice());
/// ```
pub fn detail_enhance(
    src: &Image<u8, 3>,
    dst: &mut Image<u8, 3>,
    sigma_s: f32,
    sigma_r: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if src.size().is_empty() {
        return Ok(());
    }

    let rgb = src.cast_and_scale::<f32>(1.0 / 255.0)?;
    let mut luma = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    gray_from_rgb(&rgb, &mut luma)?;

    let base = domain_transform_filter(&luma, sigma_s, sigma_r);

    dst.as_slice_mut()
        .par_chunks_exact_mut(3)
        .zip(src.as_slice().par_chunks_exact(3))
        .zip(luma.as_slice().par_iter().zip(base.par_iter()))
        .for_each(|((out, inp), (&l, &b))| {
            let enhanced = b + DETAIL_FACTOR * (l - b);
            let shift = (enhanced - l) * 255.0;
            for (o, &v) in out.iter_mut().zip(inp.iter()) {
                *o = (v as f32 + shift).round().clamp(0.0, 255.0) as u8;
            }
        });

    Ok(())
}

/// Recursive domain transform filter of a single channel image.
///
/// Returns the filtered samples in row-major order.
fn domain_transform_filter(src: &Image<f32, 1>, sigma_s: f32, sigma_r: f32) -> Vec<f32> {
    let (width, height) = (src.width(), src.height());
    let data = src.as_slice();
    let ratio = sigma_s / sigma_r;

    // domain distances to the left and upper neighbour
    let mut dist_x = vec![1.0f32; data.len()];
    let mut dist_y = vec![1.0f32; data.len()];
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            if x > 0 {
                dist_x[idx] += ratio * (data[idx] - data[idx - 1]).abs();
            }
            if y > 0 {
                dist_y[idx] += ratio * (data[idx] - data[idx - width]).abs();
            }
        }
    }

    let mut out = data.to_vec();
    let n = DOMAIN_TRANSFORM_ITERATIONS;
    let denom = (4f32.powi(n) - 1.0).sqrt();

    for i in 0..n {
        let sigma_h = sigma_s * 3f32.sqrt() * 2f32.powi(n - i - 1) / denom;
        let a = (-(2f32.sqrt()) / sigma_h).exp();

        recursive_pass_rows(&mut out, &dist_x, width, a);
        recursive_pass_cols(&mut out, &dist_y, width, height, a);
    }

    out
}

/// Left to right then right to left recursion along every row.
fn recursive_pass_rows(out: &mut [f32], dist: &[f32], width: usize, a: f32) {
    out.par_chunks_exact_mut(width)
        .zip(dist.par_chunks_exact(width))
        .for_each(|(row, dist_row)| {
            for x in 1..width {
                let v = a.powf(dist_row[x]);
                row[x] += v * (row[x - 1] - row[x]);
            }
            for x in (0..width.saturating_sub(1)).rev() {
                let v = a.powf(dist_row[x + 1]);
                row[x] += v * (row[x + 1] - row[x]);
            }
        });
}

/// Top to bottom then bottom to top recursion along every column.
fn recursive_pass_cols(out: &mut [f32], dist: &[f32], width: usize, height: usize, a: f32) {
    for y in 1..height {
        let (prev, cur) = out.split_at_mut(y * width);
        let prev = &prev[(y - 1) * width..];
        let dist_row = &dist[y * width..(y + 1) * width];
        for x in 0..width {
            let v = a.powf(dist_row[x]);
            cur[x] += v * (prev[x] - cur[x]);
        }
    }
    for y in (0..height.saturating_sub(1)).rev() {
        let (cur, next) = out.split_at_mut((y + 1) * width);
        let cur = &mut cur[y * width..];
        let dist_row = &dist[(y + 1) * width..(y + 2) * width];
        for x in 0..width {
            let v = a.powf(dist_row[x]);
            cur[x] += v * (next[x] - cur[x]);
        }
    }
}
