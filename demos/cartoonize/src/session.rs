use fotofx::{
    filters::{FilterError, FilterRegistry},
    image::Image,
};

/// The images held while editing: the untouched original and the latest result.
///
/// Every edit replaces the modified image wholesale, `reset` goes back to the original.
pub struct EditSession {
    original: Image<u8, 3>,
    modified: Image<u8, 3>,
}

impl EditSession {
    pub fn new(image: Image<u8, 3>) -> Self {
        Self {
            modified: image.clone(),
            original: image,
        }
    }

    pub fn original(&self) -> &Image<u8, 3> {
        &self.original
    }

    pub fn modified(&self) -> &Image<u8, 3> {
        &self.modified
    }

    /// Run a registered filter on the modified image.
    pub fn apply(
        &mut self,
        registry: &FilterRegistry,
        name: &str,
        params: &[f32],
    ) -> Result<(), FilterError> {
        self.modified = registry.apply(name, &self.modified, params)?;
        Ok(())
    }

    /// Run an arbitrary transform on the modified image.
    pub fn apply_with<F>(&mut self, f: F) -> Result<(), FilterError>
    where
        F: FnOnce(&Image<u8, 3>) -> Result<Image<u8, 3>, FilterError>,
    {
        self.modified = f(&self.modified)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.modified = self.original.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fotofx::image::ImageSize;

    #[test]
    fn apply_then_reset() -> Result<(), FilterError> {
        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            0,
        )?;
        let registry = FilterRegistry::new();
        let mut session = EditSession::new(image.clone());

        session.apply(&registry, "contour", &[])?;
        assert_eq!(session.modified().pixel(1, 1), &[255, 255, 255]);
        assert_eq!(session.original(), &image);

        // a failing filter leaves the modified image untouched
        let before = session.modified().clone();
        assert!(session.apply(&registry, "gaussian", &[0.0]).is_err());
        assert_eq!(session.modified(), &before);

        session.reset();
        assert_eq!(session.modified(), &image);

        Ok(())
    }
}
