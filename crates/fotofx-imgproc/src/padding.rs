/// A border type used by neighbourhood filters to read outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingMode {
    /// This border type takes the outermost row or column of pixels and repeats it into the padded region.
    ///
    /// Example: ...d c b a | a a a a...
    Replicate,

    /// This border type reflects the pixel values at the boundary, starting with the pixel 'next' to the edge.
    ///
    /// Example: ...d c b a | b c d e...
    Reflect101,
}

impl PaddingMode {
    #[inline]
    fn reflect101(i: isize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let len = len as isize;
        let mut i = i;
        while i < 0 || i >= len {
            if i < 0 {
                i = -i;
            } else if i >= len {
                i = 2 * len - i - 2;
            }
        }
        i as usize
    }

    /// Maps index `i` to a valid index i.e. within `[0, len)` according to the padding mode.
    ///
    /// PRECONDITION: `len > 0`.
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> usize {
        match self {
            PaddingMode::Replicate => i.clamp(0, len as isize - 1) as usize,
            PaddingMode::Reflect101 => Self::reflect101(i, len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PaddingMode;

    #[test]
    fn test_replicate() {
        let mode = PaddingMode::Replicate;
        assert_eq!(mode.map_index(-3, 5), 0);
        assert_eq!(mode.map_index(2, 5), 2);
        assert_eq!(mode.map_index(7, 5), 4);
    }

    #[test]
    fn test_reflect101() {
        let mode = PaddingMode::Reflect101;
        assert_eq!(mode.map_index(-1, 5), 1);
        assert_eq!(mode.map_index(-2, 5), 2);
        assert_eq!(mode.map_index(5, 5), 3);
        assert_eq!(mode.map_index(6, 5), 2);
        // long reflections bounce more than once
        assert_eq!(mode.map_index(-12, 3), 0);
        assert_eq!(mode.map_index(4, 1), 0);
    }
}
