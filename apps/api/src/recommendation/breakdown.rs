//! Weighted aggregation with residual correction.
//!
//! Each dimension contributes `raw * weight / total_weight`. Contributions are
//! rounded independently for display; any drift between their sum and the
//! rounded total is folded into the largest rounded entry so the breakdown
//! always sums to `match_score`.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::matching::RawScores;
use crate::models::{Dimension, WeightVector};

/// Round half to even.
pub fn round_score(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Rounded per-dimension contributions, serialized as `{"Skills": n, ...}` in
/// fixed dimension order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breakdown([i64; 5]);

impl Breakdown {
    pub fn get(&self, dimension: Dimension) -> i64 {
        self.0[dimension as usize]
    }

    pub fn total(&self) -> i64 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, i64)> + '_ {
        Dimension::ALL.iter().map(|d| (*d, self.get(*d)))
    }

    /// Adds `target - total()` to the largest entry; ties go to the first in
    /// dimension order.
    fn reconcile(&mut self, target: i64) {
        let drift = target - self.total();
        if drift == 0 {
            return;
        }
        let mut largest = 0;
        for (i, value) in self.0.iter().enumerate() {
            if *value > self.0[largest] {
                largest = i;
            }
        }
        self.0[largest] += drift;
    }
}

impl Serialize for Breakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (dimension, value) in self.iter() {
            map.serialize_entry(dimension.display_name(), &value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedScore {
    /// Unrounded weighted sum.
    pub final_score: f64,
    pub match_score: i64,
    pub breakdown: Breakdown,
}

/// Returns `None` when the weights carry no signal (total weight 0).
pub fn aggregate(raw: &RawScores, weights: &WeightVector) -> Option<WeightedScore> {
    let total_weight = weights.total();
    if total_weight <= 0.0 || !total_weight.is_finite() {
        return None;
    }

    let mut final_score = 0.0;
    let mut breakdown = Breakdown::default();
    for dimension in Dimension::ALL {
        let contribution = raw.get(dimension) * weights.get(dimension) / total_weight;
        final_score += contribution;
        breakdown.0[dimension as usize] = round_score(contribution);
    }

    let match_score = round_score(final_score);
    breakdown.reconcile(match_score);

    Some(WeightedScore {
        final_score,
        match_score,
        breakdown,
    })
}
