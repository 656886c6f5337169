//! Types that are not part of `consensus-specs`.

use serde::{Deserialize, Serialize};

use crate::phase0::primitives::H256;

/// Identifies a gossip message so that its validation result can be reported to the sender.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Deserialize, Serialize)]
pub struct GossipId {
    pub source: String,
    pub message_id: H256,
}
