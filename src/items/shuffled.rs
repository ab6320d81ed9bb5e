use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::items::ItemSource;

/// Replays a pool end to end in a fresh random order on every pass.
///
/// No item repeats within a pass. A set may straddle two passes, in which case
/// an item from the end of one pass can reappear early in the next.
pub struct ShuffledItems<T> {
    items: Vec<T>,
    cursor: usize,
    passes: usize,
    rng: SmallRng,
}

impl<T: Clone> ShuffledItems<T> {
    /// `items` must not be empty; pools reject empty input before this point.
    pub fn new(items: Vec<T>, rng: SmallRng) -> Self {
        let cursor = items.len();
        Self {
            items,
            cursor,
            passes: 0,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of shuffles performed so far.
    pub fn passes(&self) -> usize {
        self.passes
    }
}

impl<T: Clone> ItemSource for ShuffledItems<T> {
    type Item = T;

    fn next_item(&mut self) -> T {
        if self.cursor >= self.items.len() {
            self.items.shuffle(&mut self.rng);
            self.cursor = 0;
            self.passes += 1;
            tracing::debug!(pass = self.passes, size = self.items.len(), "reshuffled item pool");
        }
        let item = self.items[self.cursor].clone();
        self.cursor += 1;
        item
    }
}
