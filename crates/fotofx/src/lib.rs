#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use fotofx_image as image;

#[doc(inline)]
pub use fotofx_imgproc as imgproc;

#[doc(inline)]
pub use fotofx_filters as filters;
