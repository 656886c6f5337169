use core::num::NonZeroUsize;
use std::sync::Arc;

use helper_functions::misc;
use logging::{debug_with_pool, trace_with_pool};
use types::{
    phase0::{
        containers::BeaconBlock,
        primitives::{Epoch, Slot},
    },
    preset::Preset,
};

use crate::{
    error::Error,
    misc::ReceivedAttestation,
    sliding_window_index::SlidingWindowIndex,
    traits::{BlockStorage, ChainSpec},
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum RegistryState {
    Uninitialized,
    Initialized { baseline: Epoch },
}

/// Holds attestations for blocks that have not been imported yet.
///
/// Attestations are indexed by target epoch and block root. The window starts one epoch behind
/// the current epoch and covers `lookahead + 2` epochs. The registry must be fed at least one slot
/// before it accepts attestations.
pub struct OrphanAttestationRegistry<P: Preset, S, C> {
    chain_spec: Arc<C>,
    block_storage: Arc<S>,
    state: RegistryState,
    index: SlidingWindowIndex<ReceivedAttestation<P>>,
}

impl<P: Preset, S: BlockStorage, C: ChainSpec<P>> OrphanAttestationRegistry<P, S, C> {
    #[must_use]
    pub fn new(
        chain_spec: Arc<C>,
        block_storage: Arc<S>,
        lookahead: u64,
        capacity: NonZeroUsize,
    ) -> Self {
        Self {
            chain_spec,
            block_storage,
            state: RegistryState::Uninitialized,
            index: SlidingWindowIndex::new(lookahead.saturating_add(2), capacity),
        }
    }

    /// Returns `Ok(false)` without storing anything if the referenced block is already known.
    ///
    /// Attestations that target an epoch outside the window are dropped,
    /// but `Ok(true)` is still returned because their block is unknown.
    pub fn add(&mut self, attestation: ReceivedAttestation<P>) -> Result<bool, Error> {
        if !self.is_initialized() {
            return Err(Error::RegistryNotInitialized);
        }

        let data = attestation.attestation.data;

        if self.block_storage.contains_block(data.beacon_block_root) {
            return Ok(false);
        }

        if !self.tracks_epoch(data.target.epoch) {
            trace_with_pool!(
                "ignoring orphan attestation outside of tracked epochs \
                 (target epoch: {}, window: {:?})",
                data.target.epoch,
                self.index.window(),
            );

            return Ok(true);
        }

        if let Some(evicted) =
            self.index
                .add(data.target.epoch, data.beacon_block_root, attestation)
        {
            debug_with_pool!(
                "orphan attestation evicted because capacity was reached (data: {:?})",
                evicted.attestation.data,
            );
        }

        Ok(true)
    }

    /// Releases the attestations that were waiting for `block`.
    ///
    /// Blocks outside the window are not hashed and release nothing.
    pub fn feed_new_imported_block(
        &mut self,
        block: &BeaconBlock<P>,
    ) -> Vec<ReceivedAttestation<P>> {
        if !self.is_initialized() {
            return vec![];
        }

        let block_epoch = self.chain_spec.compute_epoch_at_slot(block.slot);

        if !self.index.window().contains(&block_epoch) {
            return vec![];
        }

        let block_root = self.chain_spec.block_root(block);
        let released = self.index.evict(block_root);

        if !released.is_empty() {
            debug_with_pool!(
                "released {} orphan attestations (block_root: {block_root:?}, slot: {})",
                released.len(),
                block.slot,
            );
        }

        released
    }

    /// Moves the window so that it starts one epoch before the epoch of `slot`.
    ///
    /// The window never moves backwards.
    pub fn feed_new_slot(&mut self, slot: Slot) {
        let epoch = self.chain_spec.compute_epoch_at_slot(slot);
        let new_baseline = misc::previous_epoch(epoch);

        let baseline = match self.state {
            RegistryState::Uninitialized => new_baseline,
            RegistryState::Initialized { baseline } => baseline.max(new_baseline),
        };

        let dropped = self.index.move_baseline(baseline);

        if dropped > 0 {
            debug_with_pool!("dropped {dropped} orphan attestations before epoch {baseline}");
        }

        self.state = RegistryState::Initialized { baseline };
    }

    /// Returns `true` if attestations targeting `epoch` are kept once added.
    #[must_use]
    pub fn tracks_epoch(&self, epoch: Epoch) -> bool {
        self.is_initialized() && self.index.window().contains(&epoch)
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        matches!(self.state, RegistryState::Initialized { .. })
    }

    #[must_use]
    pub const fn baseline(&self) -> Option<Epoch> {
        match self.state {
            RegistryState::Uninitialized => None,
            RegistryState::Initialized { baseline } => Some(baseline),
        }
    }

    #[must_use]
    pub const fn tracked_epochs(&self) -> u64 {
        self.index.tracked_epochs()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use nonzero_ext::nonzero;
    use types::preset::Minimal;

    use crate::test_utils::{
        attestation, block, received, root, start_slot, TestBlockStorage, TestChainSpec,
    };

    use super::*;

    type Registry = OrphanAttestationRegistry<Minimal, TestBlockStorage, TestChainSpec>;

    fn registry(lookahead: u64, capacity: NonZeroUsize) -> (Registry, Arc<TestBlockStorage>) {
        let block_storage = Arc::new(TestBlockStorage::default());

        let registry = OrphanAttestationRegistry::new(
            Arc::new(TestChainSpec::default()),
            Arc::clone(&block_storage),
            lookahead,
            capacity,
        );

        (registry, block_storage)
    }

    #[test]
    fn add_before_first_slot_fails() {
        let (mut registry, _) = registry(1, nonzero!(16_usize));

        assert!(!registry.is_initialized());
        assert_eq!(registry.baseline(), None);
        assert_eq!(
            registry.add(received(attestation(0, root(1), "1"))),
            Err(Error::RegistryNotInitialized),
        );
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn attestation_is_released_when_its_block_is_imported() -> Result<(), Error> {
        let (mut registry, _) = registry(1, nonzero!(16_usize));
        let orphan = received(attestation(9, root(7), "01"));

        registry.feed_new_slot(start_slot(10) + 3);

        assert!(registry.is_initialized());
        assert_eq!(registry.baseline(), Some(9));
        assert_eq!(registry.tracked_epochs(), 3);
        assert!(registry.add(orphan.clone())?);

        let released = registry.feed_new_imported_block(&block(start_slot(9) + 1, root(7)));

        assert_eq!(released, [orphan]);
        assert!(registry
            .feed_new_imported_block(&block(start_slot(9) + 1, root(7)))
            .is_empty());

        Ok(())
    }

    #[test]
    fn add_refuses_attestations_for_known_blocks() -> Result<(), Error> {
        let (mut registry, block_storage) = registry(1, nonzero!(16_usize));

        block_storage.insert(root(7));
        registry.feed_new_slot(start_slot(10));

        assert!(!registry.add(received(attestation(9, root(7), "1")))?);
        assert_eq!(registry.len(), 0);

        Ok(())
    }

    #[test]
    fn attestations_targeting_epochs_outside_window_are_dropped() -> Result<(), Error> {
        let (mut registry, _) = registry(1, nonzero!(16_usize));

        registry.feed_new_slot(start_slot(10));

        assert!(registry.add(received(attestation(8, root(7), "1")))?);
        assert!(registry.add(received(attestation(12, root(7), "1")))?);
        assert!(registry.add(received(attestation(11, root(7), "1")))?);
        assert_eq!(registry.len(), 1);

        assert!(!registry.tracks_epoch(8));
        assert!(registry.tracks_epoch(9));
        assert!(registry.tracks_epoch(11));
        assert!(!registry.tracks_epoch(12));

        Ok(())
    }

    #[test]
    fn blocks_outside_window_release_nothing() -> Result<(), Error> {
        let (mut registry, _) = registry(1, nonzero!(16_usize));

        registry.feed_new_slot(start_slot(10));
        registry.add(received(attestation(9, root(7), "1")))?;

        assert!(registry
            .feed_new_imported_block(&block(start_slot(8), root(7)))
            .is_empty());
        assert!(registry
            .feed_new_imported_block(&block(start_slot(12), root(7)))
            .is_empty());
        assert_eq!(registry.len(), 1);

        Ok(())
    }

    #[test]
    fn block_before_first_slot_releases_nothing() {
        let (mut registry, _) = registry(1, nonzero!(16_usize));

        assert!(registry
            .feed_new_imported_block(&block(0, root(7)))
            .is_empty());
    }

    #[test]
    fn baseline_at_genesis_is_genesis_and_never_moves_backwards() {
        let (mut registry, _) = registry(1, nonzero!(16_usize));

        registry.feed_new_slot(start_slot(0) + 5);
        assert_eq!(registry.baseline(), Some(0));

        registry.feed_new_slot(start_slot(1));
        assert_eq!(registry.baseline(), Some(0));

        registry.feed_new_slot(start_slot(4));
        assert_eq!(registry.baseline(), Some(3));

        registry.feed_new_slot(start_slot(2));
        assert_eq!(registry.baseline(), Some(3));
    }

    #[test]
    fn new_slot_drops_attestations_behind_baseline() -> Result<(), Error> {
        let (mut registry, _) = registry(1, nonzero!(16_usize));

        registry.feed_new_slot(start_slot(10));
        registry.add(received(attestation(9, root(7), "1")))?;
        registry.add(received(attestation(10, root(8), "1")))?;

        registry.feed_new_slot(start_slot(11));

        assert_eq!(registry.len(), 1);
        assert!(registry
            .feed_new_imported_block(&block(start_slot(10), root(7)))
            .is_empty());

        Ok(())
    }

    #[test]
    fn capacity_evicts_oldest_orphans() -> Result<(), Error> {
        let (mut registry, _) = registry(1, nonzero!(2_usize));

        registry.feed_new_slot(start_slot(10));
        registry.add(received(attestation(10, root(1), "1")))?;
        registry.add(received(attestation(9, root(2), "1")))?;
        registry.add(received(attestation(10, root(3), "1")))?;

        assert_eq!(registry.len(), 2);
        assert!(registry
            .feed_new_imported_block(&block(start_slot(9), root(2)))
            .is_empty());
        assert_eq!(
            registry
                .feed_new_imported_block(&block(start_slot(9), root(1)))
                .len(),
            1,
        );

        Ok(())
    }
}
