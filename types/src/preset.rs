use core::{fmt::Debug, hash::Hash};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use typenum::{NonZero, Unsigned, U2048, U32, U8};

/// Compile-time configuration variables.
///
/// See [presets in `consensus-specs`](https://github.com/ethereum/consensus-specs/tree/aac851f860fa384916f62027b2dbe3318a354c5b/presets).
///
/// Only the variables the attestation subsystem reads are present.
pub trait Preset: Copy + Eq + Ord + Hash + Default + Debug + Send + Sync + 'static {
    type MaxValidatorsPerCommittee: Unsigned + NonZero + Eq + Ord + Debug + Send + Sync;
    type SlotsPerEpoch: Unsigned + NonZero + Debug + Send + Sync;

    const NAME: PresetName;
}

/// [Mainnet preset](https://github.com/ethereum/consensus-specs/tree/aac851f860fa384916f62027b2dbe3318a354c5b/presets/mainnet).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Mainnet;

impl Preset for Mainnet {
    type MaxValidatorsPerCommittee = U2048;
    type SlotsPerEpoch = U32;

    const NAME: PresetName = PresetName::Mainnet;
}

/// [Minimal preset](https://github.com/ethereum/consensus-specs/tree/aac851f860fa384916f62027b2dbe3318a354c5b/presets/minimal).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Minimal;

impl Preset for Minimal {
    type MaxValidatorsPerCommittee = U2048;
    type SlotsPerEpoch = U8;

    const NAME: PresetName = PresetName::Minimal;
}

#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Default, Debug, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PresetName {
    #[default]
    Mainnet,
    Minimal,
}
