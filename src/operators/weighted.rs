//! Weighted random choice
//!
//! [`WeightedChoice`] is the cumulative-weight table behind every
//! `Stochastic*` operator: one uniform draw picks an item with probability
//! proportional to its weight.

use rand::RngCore;
use rand_distr::{Distribution, WeightedIndex};

use crate::error::OperatorError;

/// A list of items with a weighted sampling distribution over them
#[derive(Clone, Debug)]
pub struct WeightedChoice<T> {
    items: Vec<T>,
    weights: Vec<f64>,
    index: WeightedIndex<f64>,
}

impl<T> WeightedChoice<T> {
    /// Create a weighted choice from `(item, weight)` entries
    ///
    /// Weights need not sum to one, but must be finite and non-negative with
    /// a positive total.
    pub fn new(entries: Vec<(T, f64)>) -> Result<Self, OperatorError> {
        if entries.is_empty() {
            return Err(OperatorError::InvalidConfiguration(
                "weighted choice needs at least one item".to_string(),
            ));
        }
        if let Some((_, w)) = entries.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(OperatorError::InvalidConfiguration(format!(
                "weight {} must be finite and non-negative",
                w
            )));
        }

        let (items, weights): (Vec<T>, Vec<f64>) = entries.into_iter().unzip();
        let index = WeightedIndex::new(&weights)
            .map_err(|e| OperatorError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            items,
            weights,
            index,
        })
    }

    /// Create a weighted choice with equal weights
    pub fn uniform(items: Vec<T>) -> Result<Self, OperatorError> {
        Self::new(items.into_iter().map(|item| (item, 1.0)).collect())
    }

    /// Draw one item
    pub fn choose(&self, rng: &mut dyn RngCore) -> &T {
        &self.items[self.choose_index(rng)]
    }

    /// Draw the index of one item
    pub fn choose_index(&self, rng: &mut dyn RngCore) -> usize {
        self.index.sample(rng)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false: construction requires at least one item
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items, in insertion order
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Weight of each item normalised to sum to one
    pub fn probabilities(&self) -> Vec<f64> {
        let total: f64 = self.weights.iter().sum();
        self.weights.iter().map(|w| w / total).collect()
    }
}
