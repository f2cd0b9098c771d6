//! The cartoon pipeline filters.
//!
//! Every filter reads an RGB8 image and returns a new RGB8 image of the same size.

use fotofx_image::Image;
use fotofx_imgproc::{
    color::{gray_from_rgb_u8, rgb_from_gray},
    core::{bitwise_and, divide_scale, invert},
    enhance,
    filter::{bilateral_filter, gaussian_blur, kernels, laplacian, median_blur},
    padding::PaddingMode,
    threshold::{adaptive_threshold_mean, threshold_binary},
};

use crate::FilterError;

/// Spatial extent of the detail enhancement.
pub const DETAIL_SIGMA_S: f32 = 5.0;

/// Range extent of the detail enhancement.
pub const DETAIL_SIGMA_R: f32 = 0.5;

/// Side of the gaussian kernel used by the pencil sketch.
pub const SKETCH_BLUR_SIZE: usize = 25;

/// Scale applied to the gray over blur quotient.
pub const SKETCH_SCALE: f32 = 250.0;

/// Diameter of the bilateral neighbourhood.
pub const BILATERAL_DIAMETER: usize = 5;

/// Range sigma of the bilateral filter.
pub const BILATERAL_SIGMA_COLOR: f32 = 50.0;

/// Spatial sigma of the bilateral filter.
pub const BILATERAL_SIGMA_SPACE: f32 = 5.0;

/// Median window applied before the laplacian.
pub const EDGES_MEDIAN_SIZE: usize = 25;

/// Inverted laplacian values at or above this level become white.
pub const EDGES_THRESHOLD: u8 = 150;

/// Settings of the adaptive edge mask shared by the masked filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeMaskParams {
    /// Median window applied to the gray image.
    pub median_size: usize,
    /// Side of the local mean window.
    pub block_size: usize,
    /// Margin below the local mean still counted as foreground.
    pub c: i32,
}

impl Default for EdgeMaskParams {
    fn default() -> Self {
        Self {
            median_size: 3,
            block_size: 9,
            c: 9,
        }
    }
}

fn gray_of(src: &Image<u8, 3>) -> Result<Image<u8, 1>, FilterError> {
    let mut gray = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    gray_from_rgb_u8(src, &mut gray)?;
    Ok(gray)
}

fn to_rgb(gray: &Image<u8, 1>) -> Result<Image<u8, 3>, FilterError> {
    let mut rgb = Image::<u8, 3>::from_size_val(gray.size(), 0)?;
    rgb_from_gray(gray, &mut rgb)?;
    Ok(rgb)
}

/// Binary mask of the image structure.
///
/// The gray image is median blurred and thresholded against its local mean,
/// giving 255 on flat or bright areas and 0 on dark detail lines.
pub fn edge_mask(src: &Image<u8, 3>, params: &EdgeMaskParams) -> Result<Image<u8, 1>, FilterError> {
    let gray = gray_of(src)?;

    let mut smoothed = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    median_blur(&gray, &mut smoothed, params.median_size)?;

    let mut mask = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    adaptive_threshold_mean(&smoothed, &mut mask, 255, params.block_size, params.c)?;

    Ok(mask)
}

fn masked(color: &Image<u8, 3>, mask: &Image<u8, 1>) -> Result<Image<u8, 3>, FilterError> {
    let mut out = Image::<u8, 3>::from_size_val(color.size(), 0)?;
    bitwise_and(color, color, &mut out, mask)?;
    Ok(out)
}

/// Detail enhanced colors kept where the edge mask is set, black elsewhere.
pub fn detail_enhance(src: &Image<u8, 3>) -> Result<Image<u8, 3>, FilterError> {
    let mask = edge_mask(src, &EdgeMaskParams::default())?;

    let mut color = Image::<u8, 3>::from_size_val(src.size(), 0)?;
    enhance::detail_enhance(src, &mut color, DETAIL_SIGMA_S, DETAIL_SIGMA_R)?;

    masked(&color, &mask)
}

/// Gray image divided by its heavy gaussian blur, scaled by 250.
///
/// Flat areas come out at 250 and edges brighten toward white.
/// The single channel result is replicated into the three output channels.
pub fn pencil_sketch(src: &Image<u8, 3>) -> Result<Image<u8, 3>, FilterError> {
    let gray = gray_of(src)?;

    let sigma = kernels::gaussian_sigma_from_size(SKETCH_BLUR_SIZE);
    let mut blurred = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    gaussian_blur(
        &gray,
        &mut blurred,
        (SKETCH_BLUR_SIZE, SKETCH_BLUR_SIZE),
        (sigma, sigma),
        PaddingMode::Reflect101,
    )?;

    let mut sketch = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    divide_scale(&gray, &blurred, &mut sketch, SKETCH_SCALE)?;

    to_rgb(&sketch)
}

/// Bilateral smoothed colors kept where the edge mask is set, black elsewhere.
pub fn bilateral(src: &Image<u8, 3>) -> Result<Image<u8, 3>, FilterError> {
    let mask = edge_mask(src, &EdgeMaskParams::default())?;

    let mut color = Image::<u8, 3>::from_size_val(src.size(), 0)?;
    bilateral_filter(
        src,
        &mut color,
        BILATERAL_DIAMETER,
        BILATERAL_SIGMA_COLOR,
        BILATERAL_SIGMA_SPACE,
    )?;

    masked(&color, &mask)
}

/// Black and white edge drawing.
///
/// The gray image is median blurred with a 25 wide window, its laplacian is
/// inverted and thresholded so that values of at least 150 become white.
pub fn pencil_edges(src: &Image<u8, 3>) -> Result<Image<u8, 3>, FilterError> {
    let gray = gray_of(src)?;

    let mut smoothed = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    median_blur(&gray, &mut smoothed, EDGES_MEDIAN_SIZE)?;

    let mut edges = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    laplacian(&smoothed, &mut edges)?;

    let mut inverted = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    invert(&edges, &mut inverted)?;

    let mut binary = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    threshold_binary(&inverted, &mut binary, EDGES_THRESHOLD - 1, 255)?;

    to_rgb(&binary)
}

/// The fixed cartoon chain.
///
/// Pencil sketch, detail enhance, bilateral and pencil edges run in this order,
/// each stage reading the previous stage's output.
pub fn cartoon(src: &Image<u8, 3>) -> Result<Image<u8, 3>, FilterError> {
    let sketch = pencil_sketch(src)?;
    log::trace!("cartoon: pencil sketch done");

    let detailed = detail_enhance(&sketch)?;
    log::trace!("cartoon: detail enhance done");

    let smoothed = bilateral(&detailed)?;
    log::trace!("cartoon: bilateral done");

    let out = pencil_edges(&smoothed)?;
    log::trace!("cartoon: pencil edges done");

    Ok(out)
}
