use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use itertools::Itertools as _;
use logging::debug_with_pool;
use typenum::Unsigned as _;
use types::{
    collections::BitList,
    phase0::{
        containers::{Attestation, AttestationData},
        primitives::{Epoch, Slot},
    },
    preset::Preset,
    traits::BeaconState as _,
};

use crate::{misc::SubmissionOutcome, traits::ChainSpec};

/// Attestations for known blocks, grouped by target epoch.
///
/// Only epochs at or after `current_epoch - historic_epochs` are retained.
pub struct EpochWindowedAttestationPool<P: Preset, C> {
    chain_spec: Arc<C>,
    historic_epochs: u64,
    current_epoch: Epoch,
    attestations: BTreeMap<Epoch, BTreeSet<Attestation<P>>>,
}

impl<P: Preset, C: ChainSpec<P>> EpochWindowedAttestationPool<P, C> {
    #[must_use]
    pub const fn new(chain_spec: Arc<C>, historic_epochs: u64, current_epoch: Epoch) -> Self {
        Self {
            chain_spec,
            historic_epochs,
            current_epoch,
            attestations: BTreeMap::new(),
        }
    }

    pub fn on_tick(&mut self, slot: Slot) {
        let new_epoch = self.chain_spec.compute_epoch_at_slot(slot);

        if new_epoch <= self.current_epoch {
            return;
        }

        self.current_epoch = new_epoch;

        let retained = self.attestations.split_off(&self.threshold());
        let pruned = core::mem::replace(&mut self.attestations, retained);

        if !pruned.is_empty() {
            debug_with_pool!(
                "pruned attestations from epochs {:?} (current epoch: {new_epoch})",
                pruned.keys().collect_vec(),
            );
        }
    }

    /// Stores `attestation` unless it targets an epoch that is no longer retained.
    pub fn on_attestation(&mut self, attestation: Attestation<P>) -> SubmissionOutcome {
        let target_epoch = attestation.data.target.epoch;

        if target_epoch < self.threshold() {
            return SubmissionOutcome::Stale;
        }

        if self
            .attestations
            .entry(target_epoch)
            .or_default()
            .insert(attestation)
        {
            SubmissionOutcome::Pooled
        } else {
            SubmissionOutcome::Duplicate
        }
    }

    /// Returns retained attestations that carry at least one bit not yet included in `state`
    /// and that `state` would accept.
    ///
    /// Attestations are ordered by target epoch and then by their own ordering.
    pub fn off_chain_attestations(&self, state: &C::State) -> Vec<Attestation<P>> {
        let mut on_chain_bits =
            HashMap::<AttestationData, BitList<P::MaxValidatorsPerCommittee>>::new();

        for pending_attestation in state.pending_attestations() {
            *on_chain_bits
                .entry(pending_attestation.data)
                .or_insert_with(|| BitList::with_length(P::MaxValidatorsPerCommittee::USIZE)) |=
                &pending_attestation.aggregation_bits;
        }

        self.attestations
            .values()
            .flatten()
            .filter(|attestation| match on_chain_bits.get(&attestation.data) {
                Some(bits) => !bits.has_same_bits_as(&attestation.aggregation_bits),
                None => attestation.aggregation_bits.any(),
            })
            .filter(|attestation| self.chain_spec.is_valid_attestation(state, attestation))
            .cloned()
            .collect()
    }

    pub fn attestations_by_epoch(&self, epoch: Epoch) -> impl Iterator<Item = &Attestation<P>> {
        self.attestations.get(&epoch).into_iter().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attestations.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub const fn current_epoch(&self) -> Epoch {
        self.current_epoch
    }

    #[must_use]
    pub const fn threshold(&self) -> Epoch {
        self.current_epoch.saturating_sub(self.historic_epochs)
    }
}
