//! Extra candidate labels shown when a prediction is not confident.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LowConfidencePolicy {
    /// Predictions strictly below this confidence get alternatives.
    pub threshold: f32,
    /// How many alternatives to offer.
    pub count: usize,
}

impl Default for LowConfidencePolicy {
    fn default() -> Self {
        Self {
            threshold: 0.75,
            count: 2,
        }
    }
}

impl LowConfidencePolicy {
    /// Whether a prediction over `class_count` classes needs alternatives.
    pub fn applies(&self, confidence: f32, class_count: usize) -> bool {
        confidence < self.threshold && class_count > 2
    }

    /// Indices of alternatives for `primary`, in draw order. Empty when the
    /// policy does not apply.
    pub fn pick<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        primary: usize,
        confidence: f32,
        class_count: usize,
    ) -> Vec<usize> {
        if !self.applies(confidence, class_count) {
            return Vec::new();
        }
        pick_distinct(rng, primary, self.count, class_count)
    }
}

/// Rejection-sample up to `count` distinct indices in `0..class_count`,
/// never returning `primary`.
pub fn pick_distinct<R: Rng + ?Sized>(
    rng: &mut R,
    primary: usize,
    count: usize,
    class_count: usize,
) -> Vec<usize> {
    let mut visited: HashSet<usize> = HashSet::from([primary]);
    // never more than the classes left besides the primary
    let mut picked = Vec::with_capacity(count.min(class_count.saturating_sub(1)));
    if class_count == 0 {
        return picked;
    }
    while picked.len() < count && visited.len() < class_count {
        let candidate = rng.gen_range(0..class_count);
        if visited.insert(candidate) {
            picked.push(candidate);
        }
    }
    picked
}
