use typenum::Unsigned as _;
use types::{
    phase0::{
        consts::GENESIS_EPOCH,
        primitives::{Epoch, Slot},
    },
    preset::Preset,
};

#[must_use]
pub fn compute_epoch_at_slot<P: Preset>(slot: Slot) -> Epoch {
    slot / P::SlotsPerEpoch::U64
}

#[must_use]
pub const fn compute_start_slot_at_epoch<P: Preset>(epoch: Epoch) -> Slot {
    epoch.saturating_mul(P::SlotsPerEpoch::U64)
}

/// Returns the epoch before `epoch`, or [`GENESIS_EPOCH`] if there is none.
#[must_use]
pub fn previous_epoch(epoch: Epoch) -> Epoch {
    epoch.saturating_sub(1).max(GENESIS_EPOCH)
}
