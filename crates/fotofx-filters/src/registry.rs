use std::collections::HashMap;

use fotofx_image::Image;

use crate::{FilterError, FilterKind};

/// Lookup table from display name to filter.
///
/// Built once with every [`FilterKind`] and immutable afterwards.
///
/// # Examples
///
/// ```
/// use fotofx_image::{Image, ImageSize};
/// use fotofx_filters::FilterRegistry;
///
/// let registry = FilterRegistry::new();
/// let names: Vec<_> = registry.iter().map(|kind| kind.name()).collect();
/// assert_eq!(names[0], "Detail Enhance");
///
/// let image = Image::<u8, 3>::from_size_val(ImageSize { width: 6, height: 6 }, 9).unwrap();
/// let blurred = registry.apply("gaussian", &image, &[2.0]).unwrap();
/// assert_eq!(blurred.size(), image.size());
/// ```
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    order: Vec<FilterKind>,
    by_name: HashMap<&'static str, FilterKind>,
}

impl FilterRegistry {
    /// Register every filter in display order.
    pub fn new() -> Self {
        let order = FilterKind::ALL.to_vec();
        let by_name = order.iter().map(|kind| (kind.name(), *kind)).collect();
        Self { order, by_name }
    }

    /// Iterate over the registered filters in display order.
    pub fn iter(&self) -> impl Iterator<Item = FilterKind> + '_ {
        self.order.iter().copied()
    }

    /// Number of registered filters.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no filter is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Find a filter by its display name.
    pub fn get(&self, name: &str) -> Option<FilterKind> {
        self.by_name.get(name).copied()
    }

    /// Apply the filter registered under `name`.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnknownFilter`] if no filter has that name, otherwise the
    /// errors of [`FilterKind::apply`].
    pub fn apply(
        &self,
        name: &str,
        src: &Image<u8, 3>,
        params: &[f32],
    ) -> Result<Image<u8, 3>, FilterError> {
        let kind = self
            .get(name)
            .ok_or_else(|| FilterError::UnknownFilter(name.to_string()))?;
        kind.apply(src, params)
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
