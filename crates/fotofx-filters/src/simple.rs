//! Fixed kernel filters and the parameterised blurs.

use fotofx_image::Image;
use fotofx_imgproc::{
    fft::gaussian_blur_fft,
    filter::{apply_kernel, filter_scaled, gaussian_blur, kernels, Kernel},
    padding::PaddingMode,
};

use crate::FilterError;

/// Filter an RGB image with one of the built-in scaled kernels.
pub fn kernel_filter<const N: usize>(
    src: &Image<u8, 3>,
    kernel: &kernels::ScaledKernel<N>,
) -> Result<Image<u8, 3>, FilterError> {
    let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0)?;
    filter_scaled(src, &mut dst, kernel)?;
    Ok(dst)
}

/// Gaussian blur with `sigma = radius`.
///
/// The kernel covers three sigmas on each side and the border is replicated.
pub fn gaussian(src: &Image<u8, 3>, radius: u32) -> Result<Image<u8, 3>, FilterError> {
    if radius == 0 {
        return Err(FilterError::InvalidParameter {
            name: "radius",
            reason: "must be positive".to_string(),
        });
    }

    let sigma = radius as f32;
    let size = kernels::gaussian_size_from_sigma(sigma);

    let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0)?;
    gaussian_blur(
        src,
        &mut dst,
        (size, size),
        (sigma, sigma),
        PaddingMode::Replicate,
    )?;
    Ok(dst)
}

/// Convolve an RGB image with a caller supplied kernel.
///
/// Pixels closer than `side / 2` to the border come out black.
pub fn convolve(src: &Image<u8, 3>, kernel: &Kernel) -> Result<Image<u8, 3>, FilterError> {
    let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0)?;
    apply_kernel(src, &mut dst, kernel)?;
    Ok(dst)
}

/// Frequency domain gaussian blur of an RGB image.
///
/// The image is blurred on the `[0, 1]` scale and saturated back to 8 bits.
/// A higher `intensity` blurs less.
pub fn fft_blur(src: &Image<u8, 3>, intensity: f32) -> Result<Image<u8, 3>, FilterError> {
    let scaled = src.cast_and_scale::<f32>(1.0 / 255.0)?;
    let blurred = gaussian_blur_fft(&scaled, intensity)?;

    let data = blurred
        .as_slice()
        .iter()
        .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
        .collect();

    Ok(Image::new(src.size(), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fotofx_image::ImageSize;

    #[test]
    fn gaussian_keeps_flat_image() -> Result<(), FilterError> {
        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 9,
                height: 4,
            },
            66,
        )?;
        for radius in [1, 10] {
            let out = gaussian(&image, radius)?;
            assert_eq!(out.as_slice(), image.as_slice());
        }
        assert!(gaussian(&image, 0).is_err());
        Ok(())
    }

    #[test]
    fn gaussian_spreads_a_dot() -> Result<(), FilterError> {
        let size = ImageSize {
            width: 9,
            height: 9,
        };
        let mut data = vec![0u8; 9 * 9 * 3];
        data[(4 * 9 + 4) * 3..(4 * 9 + 5) * 3].copy_from_slice(&[255, 255, 255]);
        let image = Image::<u8, 3>::new(size, data)?;

        let out = gaussian(&image, 1)?;
        let centre = out.pixel(4, 4)[0];
        let side = out.pixel(5, 4)[0];
        assert!(centre < 255 && centre > side && side > 0);
        assert_eq!(out.pixel(3, 4), out.pixel(5, 4));

        Ok(())
    }

    #[test]
    fn convolve_identity_interior() -> Result<(), FilterError> {
        let size = ImageSize {
            width: 4,
            height: 4,
        };
        let image = Image::<u8, 3>::new(size, (0..48).collect())?;
        let identity = Kernel::new(1, vec![1.0])?;
        assert_eq!(convolve(&image, &identity)?, image);
        Ok(())
    }

    #[test]
    fn fft_blur_keeps_shape_and_maps_errors() -> Result<(), FilterError> {
        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 13,
                height: 7,
            },
            100,
        )?;
        let out = fft_blur(&image, 0.5)?;
        assert_eq!(out.size(), image.size());

        // the kernel integrates to one, so a flat image keeps its level
        let size = ImageSize {
            width: 32,
            height: 32,
        };
        let flat = fft_blur(&Image::<u8, 3>::from_size_val(size, 100)?, 0.5)?;
        let mean = flat.as_slice().iter().map(|&v| v as f32).sum::<f32>()
            / flat.as_slice().len() as f32;
        approx::assert_relative_eq!(mean, 100.0, epsilon = 0.5);

        assert!(matches!(
            fft_blur(&image, -2.0),
            Err(FilterError::InvalidParameter { .. })
        ));
        assert!(matches!(
            fft_blur(&image, 1.0e6),
            Err(FilterError::Computation(_))
        ));

        Ok(())
    }
}
