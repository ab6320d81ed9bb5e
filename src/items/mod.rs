pub mod pool;
pub mod sampled;
pub mod shuffled;

use rand::SeedableRng;
use rand::rngs::SmallRng;

pub use pool::{ItemPool, ProcessingItem};
pub use sampled::SampledItems;
pub use shuffled::ShuffledItems;

/// An inexhaustible supply of items drawn from a fixed pool.
pub trait ItemSource {
    type Item;

    fn next_item(&mut self) -> Self::Item;

    /// Items for one list.
    fn draw_set(&mut self, n: usize) -> Vec<Self::Item> {
        (0..n).map(|_| self.next_item()).collect()
    }
}

/// Item streams shared by every phase of a run.
pub struct Material {
    pub processing: ShuffledItems<ProcessingItem>,
    pub targets: Box<dyn ItemSource<Item = String>>,
    /// Every target is one character; recall is then split per character.
    pub single_letters: bool,
}

impl Material {
    /// `pseudo_random` selects the reshuffled stream for targets instead of
    /// independent sampling.
    pub fn new(
        processing: Vec<ProcessingItem>,
        targets: &ItemPool,
        pseudo_random: bool,
        mut rng: SmallRng,
    ) -> Self {
        let target_rng =
            SmallRng::from_rng(&mut rng).unwrap_or_else(|_| SmallRng::seed_from_u64(0));
        let target_items = targets.items().to_vec();
        let target_source: Box<dyn ItemSource<Item = String>> = if pseudo_random {
            Box::new(ShuffledItems::new(target_items, target_rng))
        } else {
            Box::new(SampledItems::new(target_items, target_rng))
        };
        Self {
            processing: ShuffledItems::new(processing, rng),
            targets: target_source,
            single_letters: targets.single_characters(),
        }
    }
}
