use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::items::ItemSource;

/// Draws every set independently and uniformly from the whole pool.
///
/// Items within a set are distinct; consecutive sets may overlap.
pub struct SampledItems {
    items: Vec<String>,
    rng: SmallRng,
}

impl SampledItems {
    pub fn new(items: Vec<String>, rng: SmallRng) -> Self {
        Self { items, rng }
    }
}

impl ItemSource for SampledItems {
    type Item = String;

    fn next_item(&mut self) -> String {
        self.items.choose(&mut self.rng).cloned().unwrap_or_default()
    }

    /// Returns at most the pool size; larger requests are rejected by
    /// configuration validation.
    fn draw_set(&mut self, n: usize) -> Vec<String> {
        self.items
            .choose_multiple(&mut self.rng, n)
            .cloned()
            .collect()
    }
}
