use types::{phase0::primitives::Epoch, preset::Preset, traits::BeaconState};

use crate::misc;

#[must_use]
pub fn get_previous_epoch<P: Preset>(state: &impl BeaconState<P>) -> Epoch {
    misc::previous_epoch(get_current_epoch(state))
}

#[must_use]
pub fn get_current_epoch<P: Preset>(state: &impl BeaconState<P>) -> Epoch {
    misc::compute_epoch_at_slot::<P>(state.slot())
}
