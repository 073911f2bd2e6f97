//! Construction parameters for maps and sets.

use crate::error::{Error, Result};

/// Slot count requested when the caller gives none.
pub const DEFAULT_CAPACITY: usize = 11;

/// Fraction of slots that may be FULL before the table grows.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.5;

/// Sizing parameters for a table.
///
/// `initial_capacity` is a requested slot count; the table rounds it up to the
/// next tabulated prime. Growth happens once more than
/// `floor(capacity * load_factor)` slots are in use (or `capacity - 1` when the
/// load factor is exactly 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HashConfig {
    /// Requested number of slots.
    pub initial_capacity: usize,
    /// Target occupancy ratio in `(0, 1]`.
    pub load_factor: f32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl HashConfig {
    pub fn new(initial_capacity: usize, load_factor: f32) -> Self {
        Self {
            initial_capacity,
            load_factor,
        }
    }

    pub fn with_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Checks both parameters. Runs before any allocation.
    pub fn validate(&self) -> Result<()> {
        if isize::try_from(self.initial_capacity).is_err() {
            return Err(Error::InvalidCapacity(self.initial_capacity));
        }
        // NaN fails both comparisons, so test for the accepted range.
        if !(self.load_factor > 0.0 && self.load_factor <= 1.0) {
            return Err(Error::InvalidLoadFactor(self.load_factor));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: defaults are a small prime slot count and half occupancy.
    #[test]
    fn defaults() {
        let c = HashConfig::default();
        assert_eq!(c.initial_capacity, 11);
        assert_eq!(c.load_factor, 0.5);
        assert!(c.validate().is_ok());
    }

    /// Invariant: load factors outside (0, 1] are rejected, 1.0 is accepted.
    #[test]
    fn load_factor_range() {
        for bad in [0.0, -0.5, 1.0001, f32::NAN, f32::INFINITY] {
            let c = HashConfig::default().with_load_factor(bad);
            assert!(matches!(c.validate(), Err(Error::InvalidLoadFactor(_))));
        }
        assert!(HashConfig::default().with_load_factor(1.0).validate().is_ok());
        assert!(HashConfig::default()
            .with_load_factor(f32::MIN_POSITIVE)
            .validate()
            .is_ok());
    }

    /// Invariant: a capacity that reads as negative in a signed word is rejected.
    #[test]
    fn negative_capacity_rejected() {
        let negative_one = usize::MAX;
        let c = HashConfig::new(negative_one, 0.5);
        assert_eq!(c.validate(), Err(Error::InvalidCapacity(usize::MAX)));
        assert!(HashConfig::new(0, 0.5).validate().is_ok());
    }
}
