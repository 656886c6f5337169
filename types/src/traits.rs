use core::fmt::Debug;
use std::sync::Arc;

use crate::{
    phase0::{
        beacon_state::BeaconState as Phase0BeaconState, containers::PendingAttestation,
        primitives::Slot,
    },
    preset::Preset,
};

pub trait BeaconState<P: Preset>: Debug + Send + Sync {
    fn slot(&self) -> Slot;
    fn previous_epoch_attestations(&self) -> &[PendingAttestation<P>];
    fn current_epoch_attestations(&self) -> &[PendingAttestation<P>];

    fn pending_attestations(&self) -> impl Iterator<Item = &PendingAttestation<P>> {
        self.previous_epoch_attestations()
            .iter()
            .chain(self.current_epoch_attestations())
    }
}

impl<P: Preset> BeaconState<P> for Phase0BeaconState<P> {
    fn slot(&self) -> Slot {
        self.slot
    }

    fn previous_epoch_attestations(&self) -> &[PendingAttestation<P>] {
        &self.previous_epoch_attestations
    }

    fn current_epoch_attestations(&self) -> &[PendingAttestation<P>] {
        &self.current_epoch_attestations
    }
}

impl<P: Preset, S: BeaconState<P>> BeaconState<P> for Arc<S> {
    fn slot(&self) -> Slot {
        self.as_ref().slot()
    }

    fn previous_epoch_attestations(&self) -> &[PendingAttestation<P>] {
        self.as_ref().previous_epoch_attestations()
    }

    fn current_epoch_attestations(&self) -> &[PendingAttestation<P>] {
        self.as_ref().current_epoch_attestations()
    }
}
