use core::num::NonZeroUsize;

use anyhow::Result;
use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};

/// Tunable parameters of the attestation ingestion pipeline.
///
/// Deserialized from YAML in the same shape as chain configuration files.
/// Omitted fields take their default values.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PoolConfig {
    pub historic_epochs: u64,
    pub unknown_attestation_lookahead: u64,
    pub unknown_attestation_capacity: NonZeroUsize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            historic_epochs: 1,
            unknown_attestation_lookahead: 1,
            unknown_attestation_capacity: nonzero!(16384_usize),
        }
    }
}

impl PoolConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Previous and current epochs plus the lookahead.
    #[must_use]
    pub const fn tracked_epochs(&self) -> u64 {
        self.unknown_attestation_lookahead.saturating_add(2)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() -> Result<()> {
        assert_eq!(PoolConfig::from_yaml_str("{}")?, PoolConfig::default());
        Ok(())
    }

    #[test]
    fn fields_are_read_in_screaming_snake_case() -> Result<()> {
        let config = PoolConfig::from_yaml_str(
            "
            HISTORIC_EPOCHS: 2
            UNKNOWN_ATTESTATION_LOOKAHEAD: 3
            UNKNOWN_ATTESTATION_CAPACITY: 64
            ",
        )?;

        assert_eq!(
            config,
            PoolConfig {
                historic_epochs: 2,
                unknown_attestation_lookahead: 3,
                unknown_attestation_capacity: nonzero!(64_usize),
            },
        );

        assert_eq!(config.tracked_epochs(), 5);

        Ok(())
    }

    #[test_case("UNKNOWN_ATTESTATION_CAPACITY: 0"; "zero capacity")]
    #[test_case("HISTORIC_EPOCHS: -1"; "negative retention")]
    #[test_case("SLOTS_PER_EPOCH: 8"; "unknown field")]
    fn invalid_documents_are_rejected(yaml: &str) {
        assert!(PoolConfig::from_yaml_str(yaml).is_err());
    }
}
