use inkfield_protocol::LayoutSize;

use crate::constants::RESIZE_THRESHOLD;

/// Filters container resizes down to the ones worth a full re-seed.
#[derive(Debug, Clone, Default)]
pub struct ResizeFilter {
    applied: Option<LayoutSize>,
}

impl ResizeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True unless both dimensions moved by less than the jitter threshold.
    pub fn should_reseed(&self, size: LayoutSize) -> bool {
        match self.applied {
            None => true,
            Some(prev) => {
                (size.width - prev.width).abs() >= RESIZE_THRESHOLD
                    || (size.height - prev.height).abs() >= RESIZE_THRESHOLD
            }
        }
    }

    pub fn commit(&mut self, size: LayoutSize) {
        self.applied = Some(size);
    }

    pub fn applied(&self) -> Option<LayoutSize> {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_deltas_are_jitter() {
        let mut filter = ResizeFilter::new();
        assert!(filter.should_reseed(LayoutSize::new(1200.0, 800.0)));
        filter.commit(LayoutSize::new(1200.0, 800.0));

        assert!(!filter.should_reseed(LayoutSize::new(1249.0, 751.0)));
        assert!(filter.should_reseed(LayoutSize::new(1250.0, 800.0)));
        assert!(filter.should_reseed(LayoutSize::new(1200.0, 700.0)));
    }
}
