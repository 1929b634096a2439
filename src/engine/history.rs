//! Append-only sample history.
//!
//! Every tracked scalar keeps its full trajectory, one sample per step,
//! so derived views (Cartesian positions, exports, digests) can replay the
//! whole run after the fact.

use serde::{Deserialize, Serialize};

/// Ordered, never-empty sequence of `f64` samples.
///
/// Samples are only ever appended. The first sample is supplied at
/// construction, so [`History::latest`] is always defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct History {
    samples: Vec<f64>,
}

impl History {
    /// Create a history holding the initial sample.
    #[must_use]
    pub fn new(initial: f64) -> Self {
        Self {
            samples: vec![initial],
        }
    }

    /// Reserve room for at least `additional` more samples.
    pub fn reserve(&mut self, additional: usize) {
        self.samples.reserve(additional);
    }

    /// Append one sample.
    pub fn push(&mut self, sample: f64) {
        self.samples.push(sample);
    }

    /// Most recent sample.
    #[must_use]
    pub fn latest(&self) -> f64 {
        self.samples[self.samples.len() - 1]
    }

    /// Sample at `index`, if recorded.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.samples.get(index).copied()
    }

    /// Number of samples (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; present for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples in recording order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    /// Iterate over samples in recording order.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, f64>> {
        self.samples.iter().copied()
    }
}

impl TryFrom<Vec<f64>> for History {
    type Error = String;

    fn try_from(samples: Vec<f64>) -> Result<Self, Self::Error> {
        if samples.is_empty() {
            return Err("history must contain at least one sample".to_string());
        }
        Ok(Self { samples })
    }
}

impl From<History> for Vec<f64> {
    fn from(history: History) -> Self {
        history.samples
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = f64;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_history_starts_with_initial() {
        let h = History::new(1.5);
        assert_eq!(h.len(), 1);
        assert!(!h.is_empty());
        assert!((h.latest() - 1.5).abs() < f64::EPSILON);
        assert_eq!(h.get(0), Some(1.5));
    }

    #[test]
    fn test_history_push_keeps_order() {
        let mut h = History::new(0.0);
        h.reserve(2);
        h.push(1.0);
        h.push(2.0);
        assert_eq!(h.as_slice(), &[0.0, 1.0, 2.0]);
        assert!((h.latest() - 2.0).abs() < f64::EPSILON);
        assert_eq!(h.get(1), Some(1.0));
        assert_eq!(h.get(3), None);
    }

    #[test]
    fn test_history_iter() {
        let mut h = History::new(3.0);
        h.push(4.0);
        let collected: Vec<f64> = (&h).into_iter().collect();
        assert_eq!(collected, vec![3.0, 4.0]);
        assert!((h.iter().sum::<f64>() - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_history_serializes_as_plain_array() {
        let mut h = History::new(0.5);
        h.push(0.25);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, "[0.5,0.25]");
        let back: History = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn test_history_rejects_empty_input() {
        assert!(serde_json::from_str::<History>("[]").is_err());
        assert!(History::try_from(Vec::new()).is_err());
    }
}
