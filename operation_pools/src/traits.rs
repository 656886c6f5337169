use std::sync::Arc;

use helper_functions::misc;
use types::{
    phase0::{
        containers::{Attestation, BeaconBlock},
        primitives::{Epoch, Slot, H256},
    },
    preset::Preset,
    traits::BeaconState,
};

/// Read-only view of locally stored blocks.
pub trait BlockStorage {
    fn contains_block(&self, block_root: H256) -> bool;
}

impl<S: BlockStorage + ?Sized> BlockStorage for Arc<S> {
    fn contains_block(&self, block_root: H256) -> bool {
        self.as_ref().contains_block(block_root)
    }
}

/// Consensus functions the ingestion pipeline depends on but does not implement.
///
/// Implementations are expected not to block. Signature verification in particular should
/// either be cheap or be delegated elsewhere.
pub trait ChainSpec<P: Preset> {
    type State: BeaconState<P>;

    fn compute_epoch_at_slot(&self, slot: Slot) -> Epoch {
        misc::compute_epoch_at_slot::<P>(slot)
    }

    /// Content root of `block`. Attestations refer to blocks by this root.
    fn block_root(&self, block: &BeaconBlock<P>) -> H256;

    fn is_valid_attestation(&self, state: &Self::State, attestation: &Attestation<P>) -> bool;
}
