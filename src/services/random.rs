use crate::error::{ClgError, Result};
use rand::Rng;

/// Source of random indexes.
pub trait RandomService: Send + Sync {
    /// Returns a number in `0..max`.
    fn create_max(&self, max: usize) -> Result<usize>;
}

/// Samples from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomService for ThreadRandom {
    fn create_max(&self, max: usize) -> Result<usize> {
        if max == 0 {
            return Err(ClgError::Random("max must be greater than 0".to_string()));
        }
        Ok(rand::thread_rng().gen_range(0..max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_max_stays_in_range() {
        let random = ThreadRandom;
        for _ in 0..100 {
            assert!(random.create_max(3).unwrap() < 3);
        }
        assert!(random.create_max(0).is_err());
    }
}
