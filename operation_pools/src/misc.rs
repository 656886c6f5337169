use std::time::SystemTime;

use strum::IntoStaticStr;
use types::{nonstandard::GossipId, phase0::containers::Attestation, preset::Preset};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Origin {
    Api,
    Gossip(GossipId),
}

/// An attestation together with where and when it was received.
///
/// The metadata is carried along but never used to make routing decisions.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ReceivedAttestation<P: Preset> {
    pub attestation: Attestation<P>,
    pub origin: Origin,
    pub received_at: SystemTime,
}

impl<P: Preset> ReceivedAttestation<P> {
    #[must_use]
    pub fn new(attestation: Attestation<P>, origin: Origin) -> Self {
        Self {
            attestation,
            origin,
            received_at: SystemTime::now(),
        }
    }
}

/// Where a submitted attestation ended up. None of these are errors.
#[derive(Clone, Copy, PartialEq, Eq, Debug, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionOutcome {
    Pooled,
    Duplicate,
    Stale,
    Orphaned,
    /// The block is unknown and the target epoch is outside the epochs orphans are kept for.
    Untracked,
}
