use std::sync::Arc;

use anyhow::Result;
use futures::{
    channel::{
        mpsc::{UnboundedReceiver, UnboundedSender},
        oneshot::{self, Sender},
    },
    stream::StreamExt as _,
};
use logging::{debug_with_pool, info_with_pool, warn_with_pool};
use prometheus_metrics::Metrics;
use types::{
    phase0::{
        containers::{Attestation, BeaconBlock},
        primitives::{Epoch, Slot},
    },
    preset::Preset,
    traits::BeaconState,
};

use crate::{
    config::PoolConfig,
    error::Error,
    ingestion::AttestationIngestion,
    misc::{ReceivedAttestation, SubmissionOutcome},
    traits::{BlockStorage, ChainSpec},
};

/// Handle for sending events to an [`AttestationIngestion`] owned by a [`Service`].
///
/// `T` is the type of state passed to [`AttestationIngestionPool::off_chain_attestations`].
pub struct AttestationIngestionPool<P: Preset, T> {
    tx: UnboundedSender<PoolMessage<P, T>>,
}

impl<P: Preset, T: BeaconState<P>> AttestationIngestionPool<P, T> {
    #[must_use]
    pub fn new<S: BlockStorage, C: ChainSpec<P, State = T>>(
        config: &PoolConfig,
        chain_spec: Arc<C>,
        block_storage: Arc<S>,
        current_epoch: Epoch,
        metrics: Option<Arc<Metrics>>,
    ) -> (Arc<Self>, Service<P, S, C>) {
        let (tx, rx) = futures::channel::mpsc::unbounded();

        let pool = Arc::new(Self { tx });

        let service = Service {
            ingestion: AttestationIngestion::new(
                config,
                chain_spec,
                block_storage,
                current_epoch,
                metrics,
            ),
            rx,
        };

        (pool, service)
    }

    pub fn on_slot(&self, slot: Slot) {
        PoolMessage::Slot(slot).send(&self.tx)
    }

    pub fn notify_attestation(&self, attestation: ReceivedAttestation<P>) {
        PoolMessage::Attestation(Box::new(attestation), None).send(&self.tx)
    }

    pub async fn submit(&self, attestation: ReceivedAttestation<P>) -> Result<SubmissionOutcome> {
        let (sender, receiver) = oneshot::channel();
        PoolMessage::Attestation(Box::new(attestation), Some(sender)).send(&self.tx);
        receiver.await?.map_err(Into::into)
    }

    pub fn on_block_imported(&self, block: Arc<BeaconBlock<P>>) {
        PoolMessage::BlockImported(block).send(&self.tx)
    }

    pub async fn off_chain_attestations(&self, state: Arc<T>) -> Result<Vec<Attestation<P>>> {
        let (sender, receiver) = oneshot::channel();
        PoolMessage::RequestOffChainAttestations(state, sender).send(&self.tx);
        receiver.await.map_err(Into::into)
    }

    pub fn stop(&self) {
        PoolMessage::Stop.send(&self.tx)
    }
}

pub struct Service<P: Preset, S, C: ChainSpec<P>> {
    ingestion: AttestationIngestion<P, S, C>,
    rx: UnboundedReceiver<PoolMessage<P, C::State>>,
}

impl<P: Preset, S: BlockStorage, C: ChainSpec<P>> Service<P, S, C> {
    pub async fn run(mut self) -> Result<()> {
        while let Some(message) = self.rx.next().await {
            let success = match message {
                PoolMessage::Slot(slot) => {
                    self.ingestion.on_slot(slot);
                    true
                }
                PoolMessage::Attestation(attestation, sender) => {
                    let result = self.ingestion.submit(*attestation);

                    if let Err(error) = result {
                        warn_with_pool!("attestation could not be submitted: {error}");
                    }

                    sender
                        .map(|sender| sender.send(result).is_ok())
                        .unwrap_or(true)
                }
                PoolMessage::BlockImported(block) => {
                    self.ingestion.on_block_imported(&block);
                    true
                }
                PoolMessage::RequestOffChainAttestations(state, sender) => sender
                    .send(self.ingestion.off_chain_attestations(&state))
                    .is_ok(),
                PoolMessage::Stop => break,
            };

            if !success {
                warn_with_pool!("failed to send response because the receiver was dropped");
            }
        }

        info_with_pool!("attestation ingestion service stopped");

        Ok(())
    }
}

enum PoolMessage<P: Preset, T> {
    Slot(Slot),
    Attestation(
        Box<ReceivedAttestation<P>>,
        Option<Sender<Result<SubmissionOutcome, Error>>>,
    ),
    BlockImported(Arc<BeaconBlock<P>>),
    RequestOffChainAttestations(Arc<T>, Sender<Vec<Attestation<P>>>),
    Stop,
}

impl<P: Preset, T> PoolMessage<P, T> {
    fn send(self, tx: &UnboundedSender<Self>) {
        if tx.unbounded_send(self).is_err() {
            debug_with_pool!(
                "send to attestation ingestion service failed because the receiver was dropped",
            );
        }
    }
}
