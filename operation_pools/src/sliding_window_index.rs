use core::{num::NonZeroUsize, ops::Range};
use std::collections::{BTreeMap, HashMap};

use types::phase0::{
    consts::GENESIS_EPOCH,
    primitives::{Epoch, H256},
};

type Sequence = u64;

/// A bounded multimap from `(epoch, root)` to values, covering a window of consecutive epochs.
///
/// The index does not check that added values fall inside its window. That is up to the caller.
/// When the number of stored values exceeds the capacity, the value in the lowest epoch that was
/// added first is evicted.
pub struct SlidingWindowIndex<V> {
    // Values are keyed by a sequence number shared by all epochs so that insertion order is
    // preserved across roots and across epochs.
    epochs: BTreeMap<Epoch, BTreeMap<Sequence, (H256, V)>>,
    roots: HashMap<H256, BTreeMap<Sequence, Epoch>>,
    baseline: Epoch,
    tracked_epochs: u64,
    capacity: NonZeroUsize,
    next_sequence: Sequence,
    len: usize,
}

impl<V: PartialEq> SlidingWindowIndex<V> {
    #[must_use]
    pub fn new(tracked_epochs: u64, capacity: NonZeroUsize) -> Self {
        Self {
            epochs: BTreeMap::new(),
            roots: HashMap::new(),
            baseline: GENESIS_EPOCH,
            tracked_epochs,
            capacity,
            next_sequence: 0,
            len: 0,
        }
    }

    /// Adds `value` under `epoch` and `root`.
    ///
    /// Adding a value equal to one already stored under the same key does nothing.
    /// Returns the value evicted to stay within capacity, if any.
    pub fn add(&mut self, epoch: Epoch, root: H256, value: V) -> Option<V> {
        if self.contains(epoch, root, &value) {
            return None;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.epochs
            .entry(epoch)
            .or_default()
            .insert(sequence, (root, value));

        self.roots.entry(root).or_default().insert(sequence, epoch);

        self.len += 1;

        if self.len > self.capacity.get() {
            return self.evict_oldest();
        }

        None
    }

    /// Removes and returns all values stored under `root` in the order they were added.
    pub fn evict(&mut self, root: H256) -> Vec<V> {
        let Some(sequences) = self.roots.remove(&root) else {
            return vec![];
        };

        let values = sequences
            .into_iter()
            .filter_map(|(sequence, epoch)| self.remove_from_epoch(epoch, sequence))
            .map(|(_, value)| value)
            .collect::<Vec<_>>();

        self.len -= values.len();

        values
    }

    /// Drops every epoch before `new_baseline` and returns the number of values dropped.
    ///
    /// Moving the baseline backwards does nothing.
    pub fn move_baseline(&mut self, new_baseline: Epoch) -> usize {
        if new_baseline <= self.baseline {
            return 0;
        }

        let retained = self.epochs.split_off(&new_baseline);
        let dropped = core::mem::replace(&mut self.epochs, retained);

        let mut dropped_count = 0;

        for (sequence, (root, _)) in dropped.into_values().flatten() {
            self.forget_root(root, sequence);
            dropped_count += 1;
        }

        self.baseline = new_baseline;
        self.len -= dropped_count;

        dropped_count
    }

    #[must_use]
    pub const fn baseline(&self) -> Epoch {
        self.baseline
    }

    #[must_use]
    pub const fn tracked_epochs(&self) -> u64 {
        self.tracked_epochs
    }

    #[must_use]
    pub const fn window(&self) -> Range<Epoch> {
        self.baseline..self.baseline.saturating_add(self.tracked_epochs)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over stored values by epoch and then by insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.epochs
            .values()
            .flat_map(BTreeMap::values)
            .map(|(_, value)| value)
    }

    fn contains(&self, epoch: Epoch, root: H256, value: &V) -> bool {
        let Some(sequences) = self.roots.get(&root) else {
            return false;
        };

        let Some(values) = self.epochs.get(&epoch) else {
            return false;
        };

        sequences
            .iter()
            .filter(|(_, stored_epoch)| **stored_epoch == epoch)
            .filter_map(|(sequence, _)| values.get(sequence))
            .any(|(_, stored)| stored == value)
    }

    fn evict_oldest(&mut self) -> Option<V> {
        let mut oldest_epoch = self.epochs.first_entry()?;
        let (sequence, (root, value)) = oldest_epoch.get_mut().pop_first()?;

        if oldest_epoch.get().is_empty() {
            oldest_epoch.remove();
        }

        self.forget_root(root, sequence);
        self.len -= 1;

        Some(value)
    }

    fn remove_from_epoch(&mut self, epoch: Epoch, sequence: Sequence) -> Option<(H256, V)> {
        let values = self.epochs.get_mut(&epoch)?;
        let removed = values.remove(&sequence);

        if values.is_empty() {
            self.epochs.remove(&epoch);
        }

        removed
    }

    fn forget_root(&mut self, root: H256, sequence: Sequence) {
        if let Some(sequences) = self.roots.get_mut(&root) {
            sequences.remove(&sequence);

            if sequences.is_empty() {
                self.roots.remove(&root);
            }
        }
    }
}
