//! Random instances with a planted solution, for tests, demos and benchmarks.

use crate::input::MAX_SAFE_INTEGER;
use serde::{Deserialize, Serialize};

/// Shape of generated instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of values
    pub size: usize,
    /// Values are drawn uniformly from `1..=max_value`
    pub max_value: u64,
    /// How many values the planted solution uses
    pub planted_count: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            size: 1_000,
            max_value: 1_000_000,
            planted_count: 5,
        }
    }
}

impl GeneratorConfig {
    /// Tiny values, so many subsets collide on the same sum.
    pub fn dense(size: usize) -> Self {
        Self {
            size,
            max_value: 20,
            planted_count: size.min(4),
        }
    }

    /// Magnitudes near the safe-integer ceiling.
    pub fn huge_values(size: usize) -> Self {
        Self {
            size,
            max_value: MAX_SAFE_INTEGER / 64,
            planted_count: size.min(6),
        }
    }
}

/// A generated instance. `target` is the sum of the values at `planted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub values: Vec<u64>,
    pub target: u64,
    pub planted: Vec<usize>,
}

impl Instance {
    /// Values as host numbers, the form the bindings receive.
    pub fn numbers(&self) -> Vec<f64> {
        self.values.iter().map(|&v| v as f64).collect()
    }
}

/// Instance generator
pub struct InstanceGenerator {
    pub config: GeneratorConfig,
    rng: SimpleRng,
}

impl Default for InstanceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceGenerator {
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
            rng: SimpleRng::new(),
        }
    }

    /// Reproducible generator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            config: GeneratorConfig::default(),
            rng: SimpleRng::with_seed(seed),
        }
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn generate(&mut self) -> Instance {
        let GeneratorConfig {
            size,
            max_value,
            planted_count,
        } = self.config;
        let max_value = max_value.clamp(1, MAX_SAFE_INTEGER);

        let values: Vec<u64> = (0..size).map(|_| 1 + self.rng.next_below(max_value)).collect();

        // Partial Fisher-Yates picks distinct rows for the planted subset
        let mut rows: Vec<usize> = (0..size).collect();
        let picks = planted_count.min(size);
        for i in 0..picks {
            let j = i + self.rng.next_usize(size - i);
            rows.swap(i, j);
        }
        let mut planted = rows[..picks].to_vec();
        planted.sort_unstable();

        let target = planted.iter().map(|&row| values[row]).sum();
        Instance {
            values,
            target,
            planted,
        }
    }
}

/// Simple PRNG, seeded from the platform when no seed is given
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new() -> Self {
        let mut seed_bytes = [0u8; 8];
        getrandom::getrandom(&mut seed_bytes).unwrap_or_else(|_| {
            static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
            let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            seed_bytes = counter.to_le_bytes();
        });
        Self::with_seed(u64::from_le_bytes(seed_bytes))
    }

    fn with_seed(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        // PCG-like step; two outputs per draw for 64 bits
        let mut half = || {
            self.state = self
                .state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let xorshifted = (((self.state >> 18) ^ self.state) >> 27) as u32;
            let rot = (self.state >> 59) as u32;
            xorshifted.rotate_right(rot) as u64
        };
        (half() << 32) | half()
    }

    fn next_below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }

    fn next_usize(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planted_target() {
        let mut generator = InstanceGenerator::with_seed(42);
        let instance = generator.generate();
        assert_eq!(instance.values.len(), 1_000);
        assert_eq!(instance.planted.len(), 5);
        let sum: u64 = instance.planted.iter().map(|&i| instance.values[i]).sum();
        assert_eq!(sum, instance.target);
        assert!(instance.values.iter().all(|&v| (1..=1_000_000).contains(&v)));
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = InstanceGenerator::with_seed(7).generate();
        let b = InstanceGenerator::with_seed(7).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_planted_rows_are_distinct() {
        let mut generator = InstanceGenerator::with_seed(3).with_config(GeneratorConfig::dense(6));
        for _ in 0..20 {
            let instance = generator.generate();
            let mut rows = instance.planted.clone();
            rows.dedup();
            assert_eq!(rows.len(), 4);
        }
    }

    #[test]
    fn test_huge_values_stay_safe() {
        let instance = InstanceGenerator::with_seed(11)
            .with_config(GeneratorConfig::huge_values(30))
            .generate();
        assert!(instance.values.iter().all(|&v| v <= MAX_SAFE_INTEGER));
        assert!(instance.target <= MAX_SAFE_INTEGER);
    }
}
