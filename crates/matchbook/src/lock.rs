//! Sharded per-key lock table
//!
//! Insert and remove each perform a sequence of reads and writes across
//! the store and three indexes. Holding the key's stripe for the whole
//! sequence makes mutators that share a match key take effect one at a
//! time, which is what keeps the side buckets consistent with the key
//! bucket. Mutators for different keys proceed in parallel unless they
//! collide on a stripe.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};

use parking_lot::{Mutex, MutexGuard};

use crate::domain::MatchKey;

/// Fixed-size table of lock stripes indexed by key hash
#[derive(Debug)]
pub struct KeyLockTable {
    stripes: Box<[Mutex<()>]>,
    hasher: RandomState,
}

impl KeyLockTable {
    /// Create a table with at least `stripes` stripes, rounded up to a
    /// power of two
    pub fn new(stripes: usize) -> Self {
        let count = stripes.max(1).next_power_of_two();
        Self {
            stripes: (0..count).map(|_| Mutex::new(())).collect(),
            hasher: RandomState::new(),
        }
    }

    /// Acquire the stripe guarding `key`, blocking until it is free
    pub fn lock(&self, key: &MatchKey) -> MutexGuard<'_, ()> {
        let mut hasher = self.hasher.build_hasher();
        key.hash(&mut hasher);
        let index = (hasher.finish() as usize) & (self.stripes.len() - 1);
        self.stripes[index].lock()
    }

    /// Number of stripes in the table
    pub fn stripes(&self) -> usize {
        self.stripes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Instrument;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn key(amount: u64) -> MatchKey {
        MatchKey::new(Instrument::new("GBPUSD"), "1.2222".parse().unwrap(), amount)
    }

    #[test]
    fn test_stripe_count_rounds_up_to_power_of_two() {
        assert_eq!(KeyLockTable::new(0).stripes(), 1);
        assert_eq!(KeyLockTable::new(5).stripes(), 8);
        assert_eq!(KeyLockTable::new(64).stripes(), 64);
    }

    #[test]
    fn test_same_key_excludes_concurrent_holder() {
        let table = Arc::new(KeyLockTable::new(8));
        let released = Arc::new(AtomicBool::new(false));

        let holder_table = Arc::clone(&table);
        let holder_released = Arc::clone(&released);
        let holder = std::thread::spawn(move || {
            let _guard = holder_table.lock(&key(1));
            std::thread::sleep(Duration::from_millis(50));
            holder_released.store(true, Ordering::SeqCst);
        });

        // Let the holder take the stripe first
        std::thread::sleep(Duration::from_millis(10));

        let _guard = table.lock(&key(1));
        assert!(released.load(Ordering::SeqCst));

        holder.join().unwrap();
    }
}
