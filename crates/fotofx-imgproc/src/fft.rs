use std::sync::Arc;

use fotofx_image::{Image, ImageError, ImageSize};
use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::color::gray_from_rgb;

/// Number of samples of the 1D gaussian bump.
const BUMP_SAMPLES: usize = 30;

/// The bump is sampled evenly on `[-BUMP_EXTENT, BUMP_EXTENT]`.
const BUMP_EXTENT: f32 = 10.0;

/// An error type for the frequency domain operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FftError {
    /// The blur intensity is negative or not finite.
    #[error("Blur intensity must be finite and non negative, got {0}")]
    InvalidIntensity(f32),

    /// The blur kernel could not be normalised.
    #[error("Blur kernel integral is zero or not finite for intensity {0}")]
    NonFiniteKernel(f32),

    /// Error from an image primitive.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Sample the normalised 1D bump `exp(-intensity * t^2)`.
///
/// The samples are divided by their trapezoidal integral with unit spacing.
pub fn gaussian_bump(intensity: f32) -> Result<Vec<f32>, FftError> {
    if !intensity.is_finite() || intensity < 0.0 {
        return Err(FftError::InvalidIntensity(intensity));
    }

    let step = 2.0 * BUMP_EXTENT / (BUMP_SAMPLES - 1) as f32;
    let mut bump: Vec<f32> = (0..BUMP_SAMPLES)
        .map(|i| {
            let t = -BUMP_EXTENT + i as f32 * step;
            (-intensity * t * t).exp()
        })
        .collect();

    let ends = 0.5 * (bump[0] + bump[BUMP_SAMPLES - 1]);
    let integral = bump.iter().sum::<f32>() - ends;
    if integral == 0.0 || !integral.is_finite() {
        return Err(FftError::NonFiniteKernel(intensity));
    }

    bump.iter_mut().for_each(|v| *v /= integral);
    Ok(bump)
}

/// Row and column transforms planned for one image size.
struct Fft2d {
    size: ImageSize,
    rows: Arc<dyn Fft<f32>>,
    cols: Arc<dyn Fft<f32>>,
}

impl Fft2d {
    fn new(planner: &mut FftPlanner<f32>, size: ImageSize, inverse: bool) -> Self {
        let (rows, cols) = if inverse {
            (
                planner.plan_fft_inverse(size.width),
                planner.plan_fft_inverse(size.height),
            )
        } else {
            (
                planner.plan_fft_forward(size.width),
                planner.plan_fft_forward(size.height),
            )
        };
        Self { size, rows, cols }
    }

    /// Transform a row-major `H x W` buffer in place, unnormalised.
    fn process(&self, buffer: &mut [Complex<f32>]) {
        let (width, height) = (self.size.width, self.size.height);

        buffer
            .par_chunks_exact_mut(width)
            .for_each(|row| self.rows.process(row));

        let mut transposed = transpose(buffer, width, height);
        transposed
            .par_chunks_exact_mut(height)
            .for_each(|col| self.cols.process(col));

        buffer.copy_from_slice(&transpose(&transposed, height, width));
    }
}

fn transpose(src: &[Complex<f32>], width: usize, height: usize) -> Vec<Complex<f32>> {
    let mut dst = vec![Complex::new(0.0, 0.0); src.len()];
    for y in 0..height {
        for x in 0..width {
            dst[x * height + y] = src[y * width + x];
        }
    }
    dst
}

/// Blur an image through frequency domain convolution with a gaussian.
///
/// The kernel is the outer product of [`gaussian_bump`] with itself, zero padded
/// (or truncated for images smaller than 30 pixels) to the image size with its
/// first sample at the origin. Every channel is transformed, multiplied by the kernel
/// spectrum and transformed back, keeping the real part. The convolution is circular
/// and the kernel is not re-centred, so the content shifts by about half the kernel.
///
/// A higher `intensity` gives a narrower bump and therefore less blur.
/// The operation is linear and keeps the value scale of `src`.
///
/// # Errors
///
/// [`FftError::InvalidIntensity`] for a negative or non finite intensity and
/// [`FftError::NonFiniteKernel`] when the bump cannot be normalised.
///
/// # Examples
///
/// ```
/// use fotofx_image::{Image, ImageSize};
/// use fotofx_imgproc::fft::gaussian_blur_fft;
///
/// let image = Image::<f32, 3>::from_size_val(ImageSize { width: 7, height: 5 }, 0.5).unwrap();
/// let blurred = gaussian_blur_fft(&image, 1.0).unwrap();
/// assert_eq!(blurred.size(), image.size());
/// ```
pub fn gaussian_blur_fft<const C: usize>(
    src: &Image<f32, C>,
    intensity: f32,
) -> Result<Image<f32, C>, FftError> {
    let bump = gaussian_bump(intensity)?;

    let size = src.size();
    if size.is_empty() {
        return Ok(src.clone());
    }
    let (width, height) = (size.width, size.height);

    let mut planner = FftPlanner::<f32>::new();
    let forward = Fft2d::new(&mut planner, size, false);
    let inverse = Fft2d::new(&mut planner, size, true);

    let mut kernel_ft = vec![Complex::new(0.0, 0.0); width * height];
    for (y, &by) in bump.iter().enumerate().take(height) {
        for (x, &bx) in bump.iter().enumerate().take(width) {
            kernel_ft[y * width + x] = Complex::new(by * bx, 0.0);
        }
    }
    forward.process(&mut kernel_ft);

    let norm = (width * height) as f32;
    let mut out = vec![0.0f32; src.as_slice().len()];

    for ch in 0..C {
        let mut channel: Vec<Complex<f32>> = src
            .as_slice()
            .iter()
            .skip(ch)
            .step_by(C)
            .map(|&v| Complex::new(v, 0.0))
            .collect();

        forward.process(&mut channel);
        channel
            .par_iter_mut()
            .zip(kernel_ft.par_iter())
            .for_each(|(v, &k)| *v *= k);
        inverse.process(&mut channel);

        for (o, v) in out.iter_mut().skip(ch).step_by(C).zip(channel.iter()) {
            *o = v.re / norm;
        }
    }

    Ok(Image::new(size, out)?)
}

/// Log power spectrum of an RGB image.
///
/// The image is reduced to its luminance, transformed, and the zero frequency is
/// shifted to the centre `(W / 2, H / 2)`. Each output sample is `ln(|F|^2 + 1)`.
pub fn log_power_spectrum(src: &Image<f32, 3>) -> Result<Image<f32, 1>, FftError> {
    let size = src.size();
    let mut gray = Image::<f32, 1>::from_size_val(size, 0.0)?;
    if size.is_empty() {
        return Ok(gray);
    }
    gray_from_rgb(src, &mut gray)?;

    let (width, height) = (size.width, size.height);
    let mut planner = FftPlanner::<f32>::new();
    let forward = Fft2d::new(&mut planner, size, false);

    let mut spectrum: Vec<Complex<f32>> = gray
        .as_slice()
        .iter()
        .map(|&v| Complex::new(v, 0.0))
        .collect();
    forward.process(&mut spectrum);

    let mut out = vec![0.0f32; width * height];
    for y in 0..height {
        let sy = (y + height - height / 2) % height;
        for x in 0..width {
            let sx = (x + width - width / 2) % width;
            out[y * width + x] = (spectrum[sy * width + sx].norm_sqr() + 1.0).ln();
        }
    }

    Ok(Image::new(size, out)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_bump_normalised() -> Result<(), FftError> {
        let bump = gaussian_bump(0.5)?;
        assert_eq!(bump.len(), BUMP_SAMPLES);

        let trapz = bump.iter().sum::<f32>() - 0.5 * (bump[0] + bump[BUMP_SAMPLES - 1]);
        approx::assert_relative_eq!(trapz, 1.0, epsilon = 1e-5);
        approx::assert_relative_eq!(bump[14], bump[15], epsilon = 1e-6);

        // a wider bump at lower intensity
        let wide = gaussian_bump(0.01)?;
        assert!(wide[5] > bump[5]);

        Ok(())
    }

    #[test]
    fn test_gaussian_bump_errors() {
        assert_eq!(gaussian_bump(-1.0), Err(FftError::InvalidIntensity(-1.0)));
        assert!(matches!(
            gaussian_bump(f32::NAN),
            Err(FftError::InvalidIntensity(_))
        ));
        assert_eq!(
            gaussian_bump(1.0e6),
            Err(FftError::NonFiniteKernel(1.0e6))
        );
    }

    #[test]
    fn test_blur_fft_shape_preserving() -> Result<(), FftError> {
        for (width, height) in [(7, 5), (5, 7), (1, 1), (33, 31)] {
            let size = ImageSize { width, height };
            let data = (0..width * height * 3).map(|i| (i % 17) as f32).collect();
            let image = Image::<f32, 3>::new(size, data)?;

            let blurred = gaussian_blur_fft(&image, 0.2)?;
            assert_eq!(blurred.size(), size);
            assert_eq!(blurred.num_channels(), 3);
            assert!(blurred.as_slice().iter().all(|v| v.is_finite()));
        }

        Ok(())
    }

    #[test]
    fn test_blur_fft_flat_image() -> Result<(), FftError> {
        let size = ImageSize {
            width: 32,
            height: 31,
        };
        let image = Image::<f32, 1>::from_size_val(size, 1.0)?;
        let blurred = gaussian_blur_fft(&image, 1.0)?;

        for &v in blurred.as_slice() {
            approx::assert_relative_eq!(v, 1.0, epsilon = 1e-4);
        }

        Ok(())
    }

    #[test]
    fn test_blur_fft_impulse_not_recentred() -> Result<(), FftError> {
        let size = ImageSize {
            width: 40,
            height: 40,
        };
        let mut data = vec![0.0f32; 40 * 40];
        data[0] = 1.0;
        let image = Image::<f32, 1>::new(size, data)?;

        let blurred = gaussian_blur_fft(&image, 0.5)?;
        let bump = gaussian_bump(0.5)?;

        // the response of an impulse at the origin is the kernel itself
        let peak = blurred.get([14, 15, 0]).copied().unwrap_or_default();
        approx::assert_relative_eq!(peak, bump[14] * bump[15], epsilon = 1e-5);
        assert!(peak > blurred.as_slice()[0]);
        approx::assert_relative_eq!(
            blurred.get([35, 35, 0]).copied().unwrap_or_default(),
            0.0,
            epsilon = 1e-5
        );

        Ok(())
    }

    #[test]
    fn test_blur_fft_higher_intensity_blurs_less() -> Result<(), FftError> {
        let size = ImageSize {
            width: 40,
            height: 40,
        };
        let mut data = vec![0.0f32; 40 * 40];
        data[0] = 1.0;
        let image = Image::<f32, 1>::new(size, data)?;

        let peak_and_spread = |intensity: f32| -> Result<(f32, usize), FftError> {
            let blurred = gaussian_blur_fft(&image, intensity)?;
            let peak = blurred.as_slice().iter().copied().fold(0.0f32, f32::max);
            let spread = blurred.as_slice().iter().filter(|&&v| v > 1e-3).count();
            Ok((peak, spread))
        };

        let (soft_peak, soft_spread) = peak_and_spread(0.05)?;
        let (sharp_peak, sharp_spread) = peak_and_spread(2.0)?;

        assert!(sharp_peak > soft_peak);
        assert!(sharp_spread < soft_spread);

        Ok(())
    }

    #[test]
    fn test_log_power_spectrum_flat() -> Result<(), FftError> {
        let size = ImageSize {
            width: 6,
            height: 5,
        };
        let image = Image::<f32, 3>::from_size_val(size, 1.0)?;
        let spectrum = log_power_spectrum(&image)?;
        assert_eq!(spectrum.size(), size);

        // all the energy sits in the shifted zero frequency
        let dc = (30.0f32 * 30.0 + 1.0).ln();
        for y in 0..size.height {
            for x in 0..size.width {
                let v = spectrum.get([y, x, 0]).copied().unwrap_or_default();
                let expected = if (x, y) == (3, 2) { dc } else { 0.0 };
                approx::assert_relative_eq!(v, expected, epsilon = 1e-3);
            }
        }

        Ok(())
    }
}
