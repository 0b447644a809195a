use pzoo_engine::DeathType;
use serde::{Deserialize, Serialize};

/// Summary of one generation's fitness values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessStats {
    /// The lowest fitness in the generation.
    pub min: f32,
    /// The highest fitness in the generation.
    pub max: f32,
    /// The arithmetic mean of all fitness values.
    pub mean: f32,
}

impl FitnessStats {
    /// Computes the summary of `values`.
    ///
    /// Returns `None` if `values` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pzoo_training::stats::FitnessStats;
    /// let stats = FitnessStats::new([3.0, 1.0, 2.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 3.0);
    /// assert_eq!(stats.mean, 2.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0_f64;
        let mut count = 0_u32;
        for value in values {
            min = min.min(value);
            max = max.max(value);
            sum += f64::from(value);
            count += 1;
        }
        if count == 0 {
            return None;
        }
        #[expect(clippy::cast_possible_truncation)]
        let mean = (sum / f64::from(count)) as f32;
        Some(Self { min, max, mean })
    }
}

/// Number of episodes that ended with each [`DeathType`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathCounts {
    pub complete: usize,
    pub dead: usize,
    pub timeout: usize,
}

impl DeathCounts {
    #[must_use]
    pub fn new<I>(death_types: I) -> Self
    where
        I: IntoIterator<Item = DeathType>,
    {
        let mut counts = Self::default();
        for death_type in death_types {
            *counts.get_mut(death_type) += 1;
        }
        counts
    }

    #[must_use]
    pub fn get(&self, death_type: DeathType) -> usize {
        match death_type {
            DeathType::Complete => self.complete,
            DeathType::Dead => self.dead,
            DeathType::Timeout => self.timeout,
        }
    }

    fn get_mut(&mut self, death_type: DeathType) -> &mut usize {
        match death_type {
            DeathType::Complete => &mut self.complete,
            DeathType::Dead => &mut self.dead,
            DeathType::Timeout => &mut self.timeout,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.complete + self.dead + self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_no_stats() {
        assert!(FitnessStats::new([]).is_none());
    }

    #[test]
    fn test_single_value() {
        let stats = FitnessStats::new([4.5]).unwrap();
        assert!((stats.min - 4.5).abs() < f32::EPSILON);
        assert!((stats.max - 4.5).abs() < f32::EPSILON);
        assert!((stats.mean - 4.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_death_counts_sum() {
        let types = [
            DeathType::Dead,
            DeathType::Complete,
            DeathType::Dead,
            DeathType::Timeout,
            DeathType::Dead,
        ];
        let counts = DeathCounts::new(types);
        assert_eq!(counts.dead, 3);
        assert_eq!(counts.complete, 1);
        assert_eq!(counts.timeout, 1);
        assert_eq!(counts.total(), types.len());
        assert_eq!(counts.get(DeathType::Dead), 3);
    }
}
