//! Filter configuration and parameter validation.

use crate::error::{DenoiseError, Result};

/// Hard cap on the number of worker threads.
pub const MAX_THREADS: usize = 32;

/// Configuration for the mosquito noise reduction filter.
///
/// Parameters are immutable for the lifetime of a filter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenoiseConfig {
    /// Blur weight of the directional smoothing pass (0-32).
    ///
    /// 0 disables the filter entirely: frames pass through untouched.
    pub strength: u8,
    /// Detail restoration blend weight (0-128).
    ///
    /// 0 keeps the fully smoothed result (wavelet stages are skipped),
    /// 128 fully restores the coarse band of the original image.
    pub restore: u8,
    /// Smoothing neighborhood radius: 1 (3x3) or 2 (5x5).
    pub radius: u8,
    /// Worker thread count (1-32), or 0 to match the logical CPU count
    /// (capped at [`MAX_THREADS`]).
    pub threads: usize,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            strength: 16,
            restore: 128,
            radius: 2,
            threads: 0,
        }
    }
}

impl DenoiseConfig {
    /// Set the smoothing strength.
    pub fn with_strength(mut self, strength: u8) -> Self {
        self.strength = strength;
        self
    }

    /// Set the detail restoration weight.
    pub fn with_restore(mut self, restore: u8) -> Self {
        self.restore = restore;
        self
    }

    /// Set the smoothing radius.
    pub fn with_radius(mut self, radius: u8) -> Self {
        self.radius = radius;
        self
    }

    /// Set the worker thread count (0 = auto-detect).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Check every parameter against its permitted range.
    pub fn validate(&self) -> Result<()> {
        if self.strength > 32 {
            return Err(DenoiseError::parameter(
                "strength",
                self.strength as i64,
                0,
                32,
            ));
        }
        if self.restore > 128 {
            return Err(DenoiseError::parameter(
                "restore",
                self.restore as i64,
                0,
                128,
            ));
        }
        if self.radius < 1 || self.radius > 2 {
            return Err(DenoiseError::parameter("radius", self.radius as i64, 1, 2));
        }
        if self.threads > MAX_THREADS {
            return Err(DenoiseError::parameter(
                "threads",
                self.threads as i64,
                0,
                MAX_THREADS as i64,
            ));
        }
        Ok(())
    }

    /// Resolve the effective worker count, detecting logical CPUs when
    /// `threads` is 0.
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1)
                .min(MAX_THREADS)
        } else {
            self.threads
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DenoiseConfig::default();
        assert_eq!(config.strength, 16);
        assert_eq!(config.restore, 128);
        assert_eq!(config.radius, 2);
        assert_eq!(config.threads, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = DenoiseConfig::default()
            .with_strength(32)
            .with_restore(64)
            .with_radius(1)
            .with_threads(4);
        assert_eq!(config.strength, 32);
        assert_eq!(config.restore, 64);
        assert_eq!(config.radius, 1);
        assert_eq!(config.threads, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        assert!(DenoiseConfig::default().with_strength(33).validate().is_err());
        assert!(DenoiseConfig::default().with_restore(129).validate().is_err());
        assert!(DenoiseConfig::default().with_radius(0).validate().is_err());
        assert!(DenoiseConfig::default().with_radius(3).validate().is_err());
        assert!(DenoiseConfig::default()
            .with_threads(MAX_THREADS + 1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_effective_threads() {
        assert_eq!(DenoiseConfig::default().with_threads(4).effective_threads(), 4);

        let auto = DenoiseConfig::default().with_threads(0).effective_threads();
        assert!(auto >= 1 && auto <= MAX_THREADS);
    }
}
