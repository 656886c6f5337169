use serde::{Deserialize, Serialize};

use crate::{
    phase0::{containers::PendingAttestation, primitives::Slot},
    preset::Preset,
};

/// The parts of a phase 0 `BeaconState` that record attestations already included on chain.
#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
#[serde(bound = "", deny_unknown_fields)]
pub struct BeaconState<P: Preset> {
    pub slot: Slot,
    pub previous_epoch_attestations: Vec<PendingAttestation<P>>,
    pub current_epoch_attestations: Vec<PendingAttestation<P>>,
}
