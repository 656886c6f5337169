use core::sync::atomic::{AtomicUsize, Ordering};

use derive_more::Display;

pub static POOL_LOG_METRICS: PoolLogMetrics = PoolLogMetrics::new();

/// Attestation counts shown in front of every message logged with the macros below.
///
/// The counts are for display only. Nothing reads them back to make decisions.
#[derive(Display, Debug)]
#[display("pooled: {pooled_attestation_count:?}, orphaned: {orphaned_attestation_count:?}")]
pub struct PoolLogMetrics {
    pooled_attestation_count: AtomicUsize,
    orphaned_attestation_count: AtomicUsize,
}

impl PoolLogMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pooled_attestation_count: AtomicUsize::new(0),
            orphaned_attestation_count: AtomicUsize::new(0),
        }
    }

    pub fn set_pooled_attestation_count(&self, count: usize) {
        self.pooled_attestation_count
            .store(count, Ordering::Relaxed)
    }

    pub fn set_orphaned_attestation_count(&self, count: usize) {
        self.orphaned_attestation_count
            .store(count, Ordering::Relaxed)
    }
}

impl Default for PoolLogMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[macro_export]
macro_rules! info_with_pool {
    ($($arg:tt)*) => {
        ::tracing::info!("[{}] {}", $crate::POOL_LOG_METRICS, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! debug_with_pool {
    ($($arg:tt)*) => {
        ::tracing::debug!("[{}] {}", $crate::POOL_LOG_METRICS, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! warn_with_pool {
    ($($arg:tt)*) => {
        ::tracing::warn!("[{}] {}", $crate::POOL_LOG_METRICS, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! trace_with_pool {
    ($($arg:tt)*) => {
        ::tracing::trace!("[{}] {}", $crate::POOL_LOG_METRICS, format_args!($($arg)*));
    };
}
