pub use crate::{
    attestation_pool::EpochWindowedAttestationPool,
    config::PoolConfig,
    error::Error,
    ingestion::AttestationIngestion,
    misc::{Origin, ReceivedAttestation, SubmissionOutcome},
    orphan_registry::OrphanAttestationRegistry,
    service::{AttestationIngestionPool, Service as AttestationIngestionService},
    sliding_window_index::SlidingWindowIndex,
    traits::{BlockStorage, ChainSpec},
};

mod attestation_pool;
mod config;
mod error;
mod ingestion;
mod misc;
mod orphan_registry;
mod service;
mod sliding_window_index;
mod traits;

#[cfg(test)]
mod test_utils;
