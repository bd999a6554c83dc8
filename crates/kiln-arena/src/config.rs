//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for an owned transient arena.
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the backing block in bytes.
    ///
    /// Default: 1 MiB. Must be at least 2: pushes require
    /// `used + size < capacity`, so a 1-byte arena can only serve
    /// zero-length requests.
    pub capacity: usize,
}

impl ArenaConfig {
    /// Default capacity: 1 MiB.
    pub const DEFAULT_CAPACITY: usize = 1 << 20;

    /// Smallest capacity accepted by [`ArenaConfig::validate`].
    pub const MIN_CAPACITY: usize = 2;

    /// Create a config with the given capacity in bytes.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Check that the config describes a usable arena.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.capacity < Self::MIN_CAPACITY {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "capacity must be at least {} bytes (got {})",
                    Self::MIN_CAPACITY,
                    self.capacity,
                ),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
