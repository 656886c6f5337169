use std::sync::Arc;

use logging::{debug_with_pool, trace_with_pool, POOL_LOG_METRICS};
use prometheus_metrics::{start_timer_vec, Metrics};
use types::{
    phase0::{
        containers::{Attestation, BeaconBlock},
        primitives::{Epoch, Slot},
    },
    preset::Preset,
};

use crate::{
    attestation_pool::EpochWindowedAttestationPool,
    config::PoolConfig,
    error::Error,
    misc::{ReceivedAttestation, SubmissionOutcome},
    orphan_registry::OrphanAttestationRegistry,
    traits::{BlockStorage, ChainSpec},
};

const METRICS_TYPE_NAME: &str = "AttestationIngestion";

/// Routes attestations between the pool and the orphan registry.
///
/// Not thread safe. Events must be applied in the order they were observed.
/// [`AttestationIngestionPool`](crate::AttestationIngestionPool) does that for callers on
/// other threads.
pub struct AttestationIngestion<P: Preset, S, C> {
    block_storage: Arc<S>,
    pool: EpochWindowedAttestationPool<P, C>,
    registry: OrphanAttestationRegistry<P, S, C>,
    metrics: Option<Arc<Metrics>>,
}

impl<P: Preset, S: BlockStorage, C: ChainSpec<P>> AttestationIngestion<P, S, C> {
    #[must_use]
    pub fn new(
        config: &PoolConfig,
        chain_spec: Arc<C>,
        block_storage: Arc<S>,
        current_epoch: Epoch,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        let pool = EpochWindowedAttestationPool::new(
            Arc::clone(&chain_spec),
            config.historic_epochs,
            current_epoch,
        );

        let registry = OrphanAttestationRegistry::new(
            chain_spec,
            Arc::clone(&block_storage),
            config.unknown_attestation_lookahead,
            config.unknown_attestation_capacity,
        );

        Self {
            block_storage,
            pool,
            registry,
            metrics,
        }
    }

    pub fn submit(
        &mut self,
        attestation: ReceivedAttestation<P>,
    ) -> Result<SubmissionOutcome, Error> {
        let _timer = self.start_timer("submit");

        let outcome = self.route(attestation)?;

        self.record_outcome(outcome);
        self.update_lengths();

        Ok(outcome)
    }

    pub fn on_slot(&mut self, slot: Slot) {
        let _timer = self.start_timer("on_slot");

        self.pool.on_tick(slot);
        self.registry.feed_new_slot(slot);

        self.update_lengths();
    }

    /// Moves attestations waiting for `block` into the pool.
    ///
    /// Returns the number of attestations released by the registry.
    pub fn on_block_imported(&mut self, block: &BeaconBlock<P>) -> usize {
        let _timer = self.start_timer("on_block_imported");

        let released = self.registry.feed_new_imported_block(block);
        let released_count = released.len();

        // The block is now known, so released attestations skip the storage check.
        // Sending them through `submit` again could orphan them a second time if storage lags.
        for received in released {
            let outcome = self.pool.on_attestation(received.attestation);
            self.record_outcome(outcome);
        }

        if released_count > 0 {
            self.update_lengths();
        }

        released_count
    }

    pub fn off_chain_attestations(&self, state: &C::State) -> Vec<Attestation<P>> {
        let _timer = self.start_timer("off_chain_attestations");

        self.pool.off_chain_attestations(state)
    }

    #[must_use]
    pub const fn pool(&self) -> &EpochWindowedAttestationPool<P, C> {
        &self.pool
    }

    #[must_use]
    pub const fn registry(&self) -> &OrphanAttestationRegistry<P, S, C> {
        &self.registry
    }

    fn route(&mut self, received: ReceivedAttestation<P>) -> Result<SubmissionOutcome, Error> {
        let block_root = received.attestation.data.beacon_block_root;

        if self.block_storage.contains_block(block_root) {
            return Ok(self.pool.on_attestation(received.attestation));
        }

        let attestation = received.attestation.clone();
        let target_epoch = attestation.data.target.epoch;

        if self.registry.add(received)? {
            if !self.registry.tracks_epoch(target_epoch) {
                return Ok(SubmissionOutcome::Untracked);
            }

            trace_with_pool!(
                "attestation for unknown block orphaned (block_root: {block_root:?})",
            );

            return Ok(SubmissionOutcome::Orphaned);
        }

        // The block was imported between the two lookups.
        debug_with_pool!(
            "block became known while routing attestation (block_root: {block_root:?})",
        );

        Ok(self.pool.on_attestation(attestation))
    }

    fn start_timer(&self, operation: &str) -> Option<prometheus::HistogramTimer> {
        self.metrics
            .as_ref()
            .and_then(|metrics| start_timer_vec(&metrics.attestation_ingestion_times, operation))
    }

    fn record_outcome(&self, outcome: SubmissionOutcome) {
        if let Some(metrics) = self.metrics.as_ref() {
            metrics.register_submission_outcome(outcome.into());
        }
    }

    fn update_lengths(&self) {
        let pooled = self.pool.len();
        let orphaned = self.registry.len();

        POOL_LOG_METRICS.set_pooled_attestation_count(pooled);
        POOL_LOG_METRICS.set_orphaned_attestation_count(orphaned);

        if let Some(metrics) = self.metrics.as_ref() {
            metrics.set_collection_length(METRICS_TYPE_NAME, "pooled", pooled);
            metrics.set_collection_length(METRICS_TYPE_NAME, "orphaned", orphaned);
        }
    }
}
