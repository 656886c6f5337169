use anyhow::Result;
use prometheus::{histogram_opts, opts, HistogramVec, IntCounterVec, IntGaugeVec};
use tracing::warn;

#[derive(Debug)]
pub struct Metrics {
    // Collection Lengths
    collection_lengths: IntGaugeVec,

    // Attestation ingestion
    pub attestation_ingestion_times: HistogramVec,
    attestation_submission_outcomes: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // Collection Lengths
            collection_lengths: IntGaugeVec::new(
                opts!("COLLECTION_LENGTHS", "Number of items in each collection"),
                &["type", "name"],
            )?,

            // Attestation ingestion
            attestation_ingestion_times: HistogramVec::new(
                histogram_opts!(
                    "ATTESTATION_INGESTION_TIMES",
                    "Time spent in each attestation ingestion operation"
                ),
                &["operation"],
            )?,

            attestation_submission_outcomes: IntCounterVec::new(
                opts!(
                    "ATTESTATION_SUBMISSION_OUTCOMES",
                    "Number of submitted attestations by where they were routed"
                ),
                &["outcome"],
            )?,
        })
    }

    pub fn register_with_default_metrics(&self) -> Result<()> {
        let default_registry = prometheus::default_registry();

        default_registry.register(Box::new(self.collection_lengths.clone()))?;
        default_registry.register(Box::new(self.attestation_ingestion_times.clone()))?;
        default_registry.register(Box::new(self.attestation_submission_outcomes.clone()))?;

        Ok(())
    }

    pub fn set_collection_length(&self, type_name: &str, name: &str, length: usize) {
        match self
            .collection_lengths
            .get_metric_with_label_values(&[type_name, name])
        {
            Ok(gauge) => gauge.set(i64::try_from(length).unwrap_or(i64::MAX)),
            Err(error) => {
                warn!("unable to set collection length for {type_name}::{name}: {error:?}")
            }
        }
    }

    pub fn register_submission_outcome(&self, outcome: &str) {
        match self
            .attestation_submission_outcomes
            .get_metric_with_label_values(&[outcome])
        {
            Ok(counter) => counter.inc(),
            Err(error) => warn!("unable to register submission outcome {outcome}: {error:?}"),
        }
    }

    #[cfg(test)]
    fn collection_length(&self, type_name: &str, name: &str) -> Option<i64> {
        self.collection_lengths
            .get_metric_with_label_values(&[type_name, name])
            .ok()
            .map(|gauge| gauge.get())
    }

    #[cfg(test)]
    fn submission_outcome_count(&self, outcome: &str) -> Option<u64> {
        self.attestation_submission_outcomes
            .get_metric_with_label_values(&[outcome])
            .ok()
            .map(|counter| counter.get())
    }
}
