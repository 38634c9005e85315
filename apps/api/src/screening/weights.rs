//! Weight Configuration Store — profile-level scoring-criteria weights.
//!
//! Readers get an `Arc` snapshot; `set` swaps the whole map at once, so a
//! screening that starts mid-update sees either the old or the new weights,
//! never a mix.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::screening::error::ScreeningError;

pub const MIN_WEIGHT: i64 = 0;
pub const MAX_WEIGHT: i64 = 100;
/// Advisory target for the sum of all weights.
pub const TARGET_TOTAL: i64 = 100;

const DEFAULT_CRITERIA: &[(&str, i64)] = &[
    ("technical", 35),
    ("experience", 25),
    ("cultural", 20),
    ("education", 10),
    ("projects", 10),
];

/// Criterion name → integer weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringWeights(BTreeMap<String, i64>);

impl ScoringWeights {
    pub fn as_map(&self) -> &BTreeMap<String, i64> {
        &self.0
    }

    pub fn total(&self) -> i64 {
        self.0.values().sum()
    }

    pub fn sum_mismatch(&self) -> bool {
        self.total() != TARGET_TOTAL
    }

    pub fn validate(&self) -> Result<(), ScreeningError> {
        for (criterion, &weight) in &self.0 {
            if criterion.trim().is_empty() {
                return Err(ScreeningError::validation(
                    "criterion names cannot be empty",
                ));
            }
            if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
                return Err(ScreeningError::validation(format!(
                    "weight for '{criterion}' must be between {MIN_WEIGHT} and {MAX_WEIGHT}, got {weight}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self(
            DEFAULT_CRITERIA
                .iter()
                .map(|(name, weight)| (name.to_string(), *weight))
                .collect(),
        )
    }
}

impl<const N: usize> From<[(&str, i64); N]> for ScoringWeights {
    fn from(pairs: [(&str, i64); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(name, weight)| (name.to_string(), weight))
                .collect(),
        )
    }
}

/// Result of a successful `set`, or of reading the current weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightsSummary {
    pub weights: ScoringWeights,
    pub total: i64,
    /// True when the weights do not add up to 100. Advisory only.
    pub sum_mismatch: bool,
}

impl WeightsSummary {
    fn of(weights: &ScoringWeights) -> Self {
        Self {
            weights: weights.clone(),
            total: weights.total(),
            sum_mismatch: weights.sum_mismatch(),
        }
    }
}

/// Process-wide holder of the current scoring weights.
#[derive(Debug, Default)]
pub struct WeightStore {
    current: RwLock<Arc<ScoringWeights>>,
}

impl WeightStore {
    /// Snapshot of the most recently stored weights.
    pub fn get(&self) -> Arc<ScoringWeights> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    pub fn summary(&self) -> WeightsSummary {
        WeightsSummary::of(&self.get())
    }

    /// Replaces the weights. Rejects out-of-range values; a total other than
    /// 100 is accepted and reported through `sum_mismatch`.
    pub fn set(&self, weights: ScoringWeights) -> Result<WeightsSummary, ScreeningError> {
        weights.validate()?;
        let summary = WeightsSummary::of(&weights);

        {
            let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
            *guard = Arc::new(weights);
        }

        if summary.sum_mismatch {
            warn!(
                "Scoring weights updated; total is {} (should equal {TARGET_TOTAL})",
                summary.total
            );
        } else {
            info!("Scoring weights updated");
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl ScoringWeights {
        pub(crate) fn get(&self, criterion: &str) -> Option<i64> {
            self.0.get(criterion).copied()
        }
    }

    #[test]
    fn test_default_weights_sum_to_100() {
        let store = WeightStore::default();
        let summary = store.summary();
        assert_eq!(summary.total, 100);
        assert!(!summary.sum_mismatch);
        assert_eq!(summary.weights.get("technical"), Some(35));
        assert_eq!(summary.weights.get("projects"), Some(10));
    }

    #[test]
    fn test_set_rejects_out_of_range_weight() {
        let store = WeightStore::default();
        let err = store
            .set(ScoringWeights::from([("technical", 150)]))
            .unwrap_err();
        assert!(matches!(err, ScreeningError::Validation(_)));
        // rejected update leaves the previous weights in place
        assert_eq!(store.get().get("technical"), Some(35));
    }

    #[test]
    fn test_set_rejects_negative_weight() {
        let store = WeightStore::default();
        let err = store
            .set(ScoringWeights::from([("cultural", -1)]))
            .unwrap_err();
        assert!(matches!(err, ScreeningError::Validation(_)));
    }

    #[test]
    fn test_set_accepts_sum_mismatch_with_advisory() {
        let store = WeightStore::default();
        let summary = store
            .set(ScoringWeights::from([("technical", 40), ("experience", 70)]))
            .unwrap();
        assert!(summary.sum_mismatch);
        assert_eq!(summary.total, 110);
        assert_eq!(store.get().get("experience"), Some(70));
        assert_eq!(store.get().get("cultural"), None);
    }

    #[test]
    fn test_boundary_weights_are_valid() {
        let weights = ScoringWeights::from([("technical", 0), ("experience", 100)]);
        assert!(weights.validate().is_ok());
        assert!(!weights.sum_mismatch());
    }

    #[test]
    fn test_snapshot_survives_later_set() {
        let store = WeightStore::default();
        let before = store.get();
        store
            .set(ScoringWeights::from([("technical", 100)]))
            .unwrap();
        assert_eq!(before.get("technical"), Some(35));
        assert_eq!(store.get().get("technical"), Some(100));
    }

    #[test]
    fn test_weights_deserialize_from_plain_object() {
        let weights: ScoringWeights =
            serde_json::from_str(r#"{"technical": 50, "education": 50}"#).unwrap();
        assert_eq!(weights.total(), 100);
    }
}
