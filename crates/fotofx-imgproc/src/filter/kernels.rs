use fotofx_image::ImageError;

/// A square convolution kernel with an odd side length.
///
/// Weights are stored row-major, `weights[a * side + b]` being cell `(a, b)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    side: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Create a kernel from row-major weights.
    ///
    /// # Errors
    ///
    /// The side must be odd and `weights.len()` must equal `side * side`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fotofx_imgproc::filter::kernels::Kernel;
    ///
    /// let kernel = Kernel::new(3, vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
    /// assert_eq!(kernel.offset(), 1);
    /// assert!(Kernel::new(2, vec![1.0; 4]).is_err());
    /// ```
    pub fn new(side: usize, weights: Vec<f32>) -> Result<Self, ImageError> {
        if side % 2 == 0 || weights.len() != side * side {
            return Err(ImageError::InvalidKernelSize(side, weights.len() / side.max(1)));
        }
        Ok(Self { side, weights })
    }

    /// Side length of the kernel.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Distance from the centre cell to the kernel edge, `side / 2`.
    pub fn offset(&self) -> usize {
        self.side / 2
    }

    /// Weight of the cell `(a, b)`.
    #[inline]
    pub fn at(&self, a: usize, b: usize) -> f32 {
        self.weights[a * self.side + b]
    }
}

/// A fixed kernel with the scale and offset applied after accumulation.
///
/// The filtered value is `sum / scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledKernel<const N: usize> {
    /// Side length of the kernel.
    pub side: usize,
    /// Row-major weights.
    pub weights: [f32; N],
    /// Divisor applied to the weighted sum.
    pub scale: f32,
    /// Value added after scaling.
    pub offset: f32,
}

/// 5x5 ring blur.
pub const BLUR: ScaledKernel<25> = ScaledKernel {
    side: 5,
    #[rustfmt::skip]
    weights: [
        1.0, 1.0, 1.0, 1.0, 1.0,
        1.0, 0.0, 0.0, 0.0, 1.0,
        1.0, 0.0, 0.0, 0.0, 1.0,
        1.0, 0.0, 0.0, 0.0, 1.0,
        1.0, 1.0, 1.0, 1.0, 1.0,
    ],
    scale: 16.0,
    offset: 0.0,
};

/// Contour tracing, edges dark on a white background.
pub const CONTOUR: ScaledKernel<9> = ScaledKernel {
    side: 3,
    weights: [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0],
    scale: 1.0,
    offset: 255.0,
};

/// Mild detail boost.
pub const DETAIL: ScaledKernel<9> = ScaledKernel {
    side: 3,
    weights: [0.0, -1.0, 0.0, -1.0, 10.0, -1.0, 0.0, -1.0, 0.0],
    scale: 6.0,
    offset: 0.0,
};

/// Edge enhancement.
pub const EDGE_ENHANCE: ScaledKernel<9> = ScaledKernel {
    side: 3,
    weights: [-1.0, -1.0, -1.0, -1.0, 10.0, -1.0, -1.0, -1.0, -1.0],
    scale: 2.0,
    offset: 0.0,
};

/// Stronger edge enhancement.
pub const EDGE_ENHANCE_MORE: ScaledKernel<9> = ScaledKernel {
    side: 3,
    weights: [-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0],
    scale: 1.0,
    offset: 0.0,
};

/// Emboss around mid gray.
pub const EMBOSS: ScaledKernel<9> = ScaledKernel {
    side: 3,
    weights: [-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
    scale: 1.0,
    offset: 128.0,
};

/// Edge detection, edges bright on a black background.
pub const FIND_EDGES: ScaledKernel<9> = ScaledKernel {
    side: 3,
    weights: [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0],
    scale: 1.0,
    offset: 0.0,
};

/// 3x3 smoothing.
pub const SMOOTH: ScaledKernel<9> = ScaledKernel {
    side: 3,
    weights: [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0],
    scale: 13.0,
    offset: 0.0,
};

/// 5x5 smoothing.
pub const SMOOTH_MORE: ScaledKernel<25> = ScaledKernel {
    side: 5,
    #[rustfmt::skip]
    weights: [
        1.0, 1.0, 1.0, 1.0, 1.0,
        1.0, 5.0, 5.0, 5.0, 1.0,
        1.0, 5.0, 44.0, 5.0, 1.0,
        1.0, 5.0, 5.0, 5.0, 1.0,
        1.0, 1.0, 1.0, 1.0, 1.0,
    ],
    scale: 100.0,
    offset: 0.0,
};

/// Sharpening.
pub const SHARPEN: ScaledKernel<9> = ScaledKernel {
    side: 3,
    weights: [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0],
    scale: 16.0,
    offset: 0.0,
};

/// Aperture 3 laplacian, the sum of the second order sobel derivatives.
pub const LAPLACIAN_3: [f32; 9] = [2.0, 0.0, 2.0, 0.0, -8.0, 0.0, 2.0, 0.0, 2.0];

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A normalised vector of the kernel.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mean = (kernel_size as f32 - 1.0) / 2.0;
    let sigma_sq = sigma * sigma;

    let mut kernel: Vec<f32> = (0..kernel_size)
        .map(|i| {
            let x = i as f32 - mean;
            (-(x * x) / (2.0 * sigma_sq)).exp()
        })
        .collect();

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Sigma implied by a kernel size when none is given.
///
/// Uses `0.3 * ((kernel_size - 1) * 0.5 - 1) + 0.8`, so a 25 tap kernel gets `4.1`.
pub fn gaussian_sigma_from_size(kernel_size: usize) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Kernel size covering three sigmas on each side of the centre.
pub fn gaussian_size_from_sigma(sigma: f32) -> usize {
    2 * (3.0 * sigma).ceil().max(0.0) as usize + 1
}
