use std::fmt;
use std::time::Instant;

use fotofx_image::Image;
use fotofx_imgproc::filter::kernels;
use serde::Serialize;

use crate::{cartoon, simple, FilterError};

/// Numeric type of a filter parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// A whole number.
    Integer,
    /// A real number.
    Float,
}

/// Description of the single numeric parameter a filter accepts.
///
/// The shell uses it to prompt for a value before invoking the filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    /// Name shown to the user.
    pub name: &'static str,
    /// Numeric type of the value.
    pub kind: ParamKind,
    /// Smallest accepted value, inclusive.
    pub min: f32,
    /// Largest accepted value, inclusive.
    pub max: f32,
}

impl ParamSpec {
    /// Check a value against the declared type and range.
    ///
    /// # Examples
    ///
    /// ```
    /// use fotofx_filters::{FilterKind, FilterError};
    ///
    /// let spec = FilterKind::Gaussian.param_spec().unwrap();
    /// assert_eq!(spec.validate(4.0), Ok(4.0));
    /// assert!(matches!(spec.validate(11.0), Err(FilterError::InvalidParameter { .. })));
    /// assert!(matches!(spec.validate(2.5), Err(FilterError::InvalidParameter { .. })));
    /// ```
    pub fn validate(&self, value: f32) -> Result<f32, FilterError> {
        if !value.is_finite() {
            return Err(self.invalid(format!("{value} is not a finite number")));
        }

        if self.kind == ParamKind::Integer && value.fract() != 0.0 {
            return Err(self.invalid(format!("{value} is not an integer")));
        }

        if value < self.min || value > self.max {
            return Err(self.invalid(format!(
                "{value} is outside [{}, {}]",
                self.min, self.max
            )));
        }

        Ok(value)
    }

    fn invalid(&self, reason: String) -> FilterError {
        FilterError::InvalidParameter {
            name: self.name,
            reason,
        }
    }
}

/// Gaussian radius accepted by the `gaussian` filter.
const GAUSSIAN_RADIUS: ParamSpec = ParamSpec {
    name: "radius",
    kind: ParamKind::Integer,
    min: 1.0,
    max: 10.0,
};

/// The closed set of filters offered to the shell.
///
/// Serialises to the display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterKind {
    /// Detail enhancement masked by the adaptive edge mask.
    #[serde(rename = "Detail Enhance")]
    DetailEnhance,
    /// Gray divided by its own heavy blur.
    #[serde(rename = "Pencil Sketch")]
    PencilSketch,
    /// Bilateral smoothing masked by the adaptive edge mask.
    #[serde(rename = "Bilateral")]
    Bilateral,
    /// Thresholded inverted laplacian of the heavily median blurred gray.
    #[serde(rename = "Pencil Edges")]
    PencilEdges,
    /// Pencil sketch, detail enhance, bilateral then pencil edges.
    #[serde(rename = "Cartoon")]
    Cartoon,
    /// 5x5 ring blur.
    #[serde(rename = "blur")]
    Blur,
    /// Gaussian blur with an integer radius.
    #[serde(rename = "gaussian")]
    Gaussian,
    /// Sharpening kernel.
    #[serde(rename = "sharpen")]
    Sharpen,
    /// 3x3 smoothing kernel.
    #[serde(rename = "smooth")]
    Smooth,
    /// 5x5 smoothing kernel.
    #[serde(rename = "smooth more")]
    SmoothMore,
    /// Contour tracing kernel.
    #[serde(rename = "contour")]
    Contour,
    /// Detail kernel.
    #[serde(rename = "detail")]
    Detail,
    /// Edge enhancement kernel.
    #[serde(rename = "edge enhance")]
    EdgeEnhance,
    /// Stronger edge enhancement kernel.
    #[serde(rename = "edge enhance more")]
    EdgeEnhanceMore,
    /// Emboss kernel.
    #[serde(rename = "emboss")]
    Emboss,
    /// Edge detection kernel.
    #[serde(rename = "find edges")]
    FindEdges,
}

impl FilterKind {
    /// Every filter, in display order.
    pub const ALL: [FilterKind; 16] = [
        FilterKind::DetailEnhance,
        FilterKind::PencilSketch,
        FilterKind::Bilateral,
        FilterKind::PencilEdges,
        FilterKind::Cartoon,
        FilterKind::Blur,
        FilterKind::Gaussian,
        FilterKind::Sharpen,
        FilterKind::Smooth,
        FilterKind::SmoothMore,
        FilterKind::Contour,
        FilterKind::Detail,
        FilterKind::EdgeEnhance,
        FilterKind::EdgeEnhanceMore,
        FilterKind::Emboss,
        FilterKind::FindEdges,
    ];

    /// The display name, unique among filters.
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::DetailEnhance => "Detail Enhance",
            FilterKind::PencilSketch => "Pencil Sketch",
            FilterKind::Bilateral => "Bilateral",
            FilterKind::PencilEdges => "Pencil Edges",
            FilterKind::Cartoon => "Cartoon",
            FilterKind::Blur => "blur",
            FilterKind::Gaussian => "gaussian",
            FilterKind::Sharpen => "sharpen",
            FilterKind::Smooth => "smooth",
            FilterKind::SmoothMore => "smooth more",
            FilterKind::Contour => "contour",
            FilterKind::Detail => "detail",
            FilterKind::EdgeEnhance => "edge enhance",
            FilterKind::EdgeEnhanceMore => "edge enhance more",
            FilterKind::Emboss => "emboss",
            FilterKind::FindEdges => "find edges",
        }
    }

    /// Look a filter up by its display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// The parameter the filter requires, if any.
    pub fn param_spec(&self) -> Option<ParamSpec> {
        match self {
            FilterKind::Gaussian => Some(GAUSSIAN_RADIUS),
            _ => None,
        }
    }

    /// Apply the filter to an RGB image.
    ///
    /// `params` holds the value described by [`FilterKind::param_spec`] for
    /// filters that take one and must be empty otherwise.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnsupportedImage`] for an empty image and
    /// [`FilterError::InvalidParameter`] for a missing, extra or invalid parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use fotofx_image::{Image, ImageSize};
    /// use fotofx_filters::FilterKind;
    ///
    /// let image = Image::<u8, 3>::from_size_val(ImageSize { width: 8, height: 8 }, 40).unwrap();
    ///
    /// let sketch = FilterKind::PencilSketch.apply(&image, &[]).unwrap();
    /// assert!(sketch.as_slice().iter().all(|&v| v == 250));
    ///
    /// assert!(FilterKind::Gaussian.apply(&image, &[]).is_err());
    /// ```
    pub fn apply(&self, src: &Image<u8, 3>, params: &[f32]) -> Result<Image<u8, 3>, FilterError> {
        if src.size().is_empty() {
            return Err(FilterError::UnsupportedImage(format!(
                "image has zero area ({})",
                src.size()
            )));
        }

        let param = self.check_params(params)?;

        log::debug!("Starting {} filter on {} image", self.name(), src.size());
        let start = Instant::now();

        let out = match self {
            FilterKind::DetailEnhance => cartoon::detail_enhance(src)?,
            FilterKind::PencilSketch => cartoon::pencil_sketch(src)?,
            FilterKind::Bilateral => cartoon::bilateral(src)?,
            FilterKind::PencilEdges => cartoon::pencil_edges(src)?,
            FilterKind::Cartoon => cartoon::cartoon(src)?,
            FilterKind::Blur => simple::kernel_filter(src, &kernels::BLUR)?,
            FilterKind::Gaussian => simple::gaussian(src, param.unwrap_or(1.0) as u32)?,
            FilterKind::Sharpen => simple::kernel_filter(src, &kernels::SHARPEN)?,
            FilterKind::Smooth => simple::kernel_filter(src, &kernels::SMOOTH)?,
            FilterKind::SmoothMore => simple::kernel_filter(src, &kernels::SMOOTH_MORE)?,
            FilterKind::Contour => simple::kernel_filter(src, &kernels::CONTOUR)?,
            FilterKind::Detail => simple::kernel_filter(src, &kernels::DETAIL)?,
            FilterKind::EdgeEnhance => simple::kernel_filter(src, &kernels::EDGE_ENHANCE)?,
            FilterKind::EdgeEnhanceMore => {
                simple::kernel_filter(src, &kernels::EDGE_ENHANCE_MORE)?
            }
            FilterKind::Emboss => simple::kernel_filter(src, &kernels::EMBOSS)?,
            FilterKind::FindEdges => simple::kernel_filter(src, &kernels::FIND_EDGES)?,
        };

        log::debug!(
            "Completed {} filter in {:?}",
            self.name(),
            start.elapsed()
        );

        Ok(out)
    }

    /// Check the parameter list against the declared parameter and return it.
    fn check_params(&self, params: &[f32]) -> Result<Option<f32>, FilterError> {
        match (self.param_spec(), params) {
            (None, []) => Ok(None),
            (None, _) => Err(FilterError::InvalidParameter {
                name: "params",
                reason: format!("{} takes no parameter, got {}", self.name(), params.len()),
            }),
            (Some(spec), [value]) => spec.validate(*value).map(Some),
            (Some(spec), []) => Err(FilterError::InvalidParameter {
                name: spec.name,
                reason: "missing".to_string(),
            }),
            (Some(spec), _) => Err(FilterError::InvalidParameter {
                name: spec.name,
                reason: format!("expected one value, got {}", params.len()),
            }),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fotofx_image::ImageSize;

    #[test]
    fn names_are_unique_and_round_trip() {
        let mut names: Vec<_> = FilterKind::ALL.iter().map(|k| k.name()).collect();
        for kind in FilterKind::ALL {
            assert_eq!(FilterKind::from_name(kind.name()), Some(kind));
            assert_eq!(kind.to_string(), kind.name());
        }
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FilterKind::ALL.len());
        assert_eq!(FilterKind::from_name("gotham"), None);
    }

    #[test]
    fn serializes_to_display_name() -> Result<(), serde_json::Error> {
        assert_eq!(
            serde_json::to_string(&FilterKind::EdgeEnhanceMore)?,
            "\"edge enhance more\""
        );

        let spec = serde_json::to_value(GAUSSIAN_RADIUS)?;
        assert_eq!(spec["name"], "radius");
        assert_eq!(spec["kind"], "integer");
        assert_eq!(spec["max"], 10.0);

        Ok(())
    }

    #[test]
    fn only_gaussian_takes_a_parameter() {
        for kind in FilterKind::ALL {
            assert_eq!(kind.param_spec().is_some(), kind == FilterKind::Gaussian);
        }
    }

    #[test]
    fn validate_rejects_bad_values() {
        let float = ParamSpec {
            name: "amount",
            kind: ParamKind::Float,
            min: 0.0,
            max: 1.0,
        };
        assert_eq!(float.validate(0.5), Ok(0.5));
        assert!(float.validate(f32::NAN).is_err());
        assert!(float.validate(f32::INFINITY).is_err());
        assert!(float.validate(-0.1).is_err());

        assert_eq!(GAUSSIAN_RADIUS.validate(1.0), Ok(1.0));
        assert_eq!(GAUSSIAN_RADIUS.validate(10.0), Ok(10.0));
        assert!(GAUSSIAN_RADIUS.validate(0.0).is_err());
        assert!(GAUSSIAN_RADIUS.validate(1.5).is_err());
    }

    #[test]
    fn apply_checks_params_and_image() -> Result<(), FilterError> {
        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            10,
        )?;

        assert_eq!(
            FilterKind::Gaussian.apply(&image, &[]),
            Err(FilterError::InvalidParameter {
                name: "radius",
                reason: "missing".to_string()
            })
        );
        assert!(matches!(
            FilterKind::Gaussian.apply(&image, &[11.0]),
            Err(FilterError::InvalidParameter { name: "radius", .. })
        ));
        assert!(matches!(
            FilterKind::Blur.apply(&image, &[1.0]),
            Err(FilterError::InvalidParameter { name: "params", .. })
        ));

        let out = FilterKind::Gaussian.apply(&image, &[3.0])?;
        assert_eq!(out.size(), image.size());

        let empty = Image::<u8, 3>::new(
            ImageSize {
                width: 0,
                height: 5,
            },
            vec![],
        )?;
        for kind in FilterKind::ALL {
            let params: &[f32] = if kind.param_spec().is_some() { &[2.0] } else { &[] };
            assert!(matches!(
                kind.apply(&empty, params),
                Err(FilterError::UnsupportedImage(_))
            ));
        }

        Ok(())
    }
}
