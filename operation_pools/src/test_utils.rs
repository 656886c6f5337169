use std::collections::HashSet;

use helper_functions::{accessors, misc};
use parking_lot::Mutex;
use types::{
    collections::BitList,
    phase0::{
        beacon_state::BeaconState,
        containers::{Attestation, AttestationData, BeaconBlock, Checkpoint, PendingAttestation},
        primitives::{AggregateSignatureBytes, Epoch, Slot, H256},
    },
    preset::{Minimal, Preset},
};

use crate::{
    misc::{Origin, ReceivedAttestation},
    traits::{BlockStorage, ChainSpec},
};

/// Treats `state_root` as the content root of a block.
/// Accepts attestations targeting the current or previous epoch of the state
/// unless their block root has been rejected.
#[derive(Default)]
pub struct TestChainSpec {
    rejected_block_roots: HashSet<H256>,
}

impl TestChainSpec {
    pub fn rejecting(block_roots: impl IntoIterator<Item = H256>) -> Self {
        Self {
            rejected_block_roots: block_roots.into_iter().collect(),
        }
    }
}

impl ChainSpec<Minimal> for TestChainSpec {
    type State = BeaconState<Minimal>;

    fn block_root(&self, block: &BeaconBlock<Minimal>) -> H256 {
        block.state_root
    }

    fn is_valid_attestation(
        &self,
        state: &Self::State,
        attestation: &Attestation<Minimal>,
    ) -> bool {
        let target_epoch = attestation.data.target.epoch;

        let in_range = target_epoch == accessors::get_current_epoch(state)
            || target_epoch == accessors::get_previous_epoch(state);

        in_range
            && !self
                .rejected_block_roots
                .contains(&attestation.data.beacon_block_root)
    }
}

#[derive(Default)]
pub struct TestBlockStorage {
    block_roots: Mutex<HashSet<H256>>,
}

impl TestBlockStorage {
    pub fn insert(&self, block_root: H256) {
        self.block_roots.lock().insert(block_root);
    }
}

impl BlockStorage for TestBlockStorage {
    fn contains_block(&self, block_root: H256) -> bool {
        self.block_roots.lock().contains(&block_root)
    }
}

pub fn root(value: u64) -> H256 {
    H256::from_low_u64_be(value)
}

pub fn start_slot(epoch: Epoch) -> Slot {
    misc::compute_start_slot_at_epoch::<Minimal>(epoch)
}

pub fn bits(bit_string: &str) -> BitList<<Minimal as Preset>::MaxValidatorsPerCommittee> {
    BitList::from_bits(bit_string.chars().map(|character| character == '1'))
        .expect("test bit lists are shorter than a committee")
}

pub fn attestation_data(target_epoch: Epoch, block_root: H256) -> AttestationData {
    AttestationData {
        slot: start_slot(target_epoch),
        index: 0,
        beacon_block_root: block_root,
        source: Checkpoint::default(),
        target: Checkpoint {
            epoch: target_epoch,
            root: block_root,
        },
    }
}

pub fn attestation(
    target_epoch: Epoch,
    block_root: H256,
    bit_string: &str,
) -> Attestation<Minimal> {
    Attestation {
        aggregation_bits: bits(bit_string),
        data: attestation_data(target_epoch, block_root),
        signature: AggregateSignatureBytes::empty(),
    }
}

pub fn received(attestation: Attestation<Minimal>) -> ReceivedAttestation<Minimal> {
    ReceivedAttestation::new(attestation, Origin::Api)
}

pub fn block(slot: Slot, block_root: H256) -> BeaconBlock<Minimal> {
    BeaconBlock {
        slot,
        state_root: block_root,
        ..BeaconBlock::default()
    }
}

pub fn pending(data: AttestationData, bit_string: &str) -> PendingAttestation<Minimal> {
    PendingAttestation {
        aggregation_bits: bits(bit_string),
        data,
        inclusion_delay: 1,
        proposer_index: 0,
    }
}

pub fn state(
    slot: Slot,
    previous_epoch_attestations: Vec<PendingAttestation<Minimal>>,
    current_epoch_attestations: Vec<PendingAttestation<Minimal>>,
) -> BeaconState<Minimal> {
    BeaconState {
        slot,
        previous_epoch_attestations,
        current_epoch_attestations,
    }
}
