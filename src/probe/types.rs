//! Probe configuration and result types.

use std::time::Duration;

use crate::config::{DEFAULT_PROBE_TIMEOUT, DEFAULT_PROBE_WORKERS, DEFAULT_QUEUE_CAPACITY};
use crate::error_handling::{ProbeConfigError, ProbeSetupError};
use crate::storage::ProbeTarget;

/// Probe pool configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Number of concurrent workers (at least 1)
    pub workers: usize,
    /// Upper bound for a single probe
    pub timeout: Duration,
    /// Capacity of the work queue and of the result queue
    pub queue_capacity: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_PROBE_WORKERS,
            timeout: DEFAULT_PROBE_TIMEOUT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ProbeConfig {
    /// Checks that every bound is usable.
    pub fn validate(&self) -> Result<(), ProbeConfigError> {
        if self.workers == 0 {
            return Err(ProbeConfigError::NoWorkers);
        }
        if self.timeout.is_zero() {
            return Err(ProbeConfigError::ZeroTimeout);
        }
        if self.queue_capacity == 0 {
            return Err(ProbeConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// What a single reachability test observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reachability {
    pub reachable: bool,
    /// Round-trip time; zero when unreachable.
    pub latency: Duration,
}

impl Reachability {
    pub fn online(latency: Duration) -> Self {
        Self {
            reachable: true,
            latency,
        }
    }

    pub fn offline() -> Self {
        Self {
            reachable: false,
            latency: Duration::ZERO,
        }
    }
}

/// How probing a target ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The target answered within the timeout.
    Reachable { latency: Duration },
    /// The target refused, did not answer, or timed out.
    Unreachable,
    /// No test could be built for this target.
    SetupFailed(ProbeSetupError),
}

/// Result of probing one [`ProbeTarget`]. Exactly one is produced per submitted target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub target: ProbeTarget,
    pub status: ProbeStatus,
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self.status, ProbeStatus::Reachable { .. })
    }

    /// Observed latency, only when the target was reachable.
    pub fn latency(&self) -> Option<Duration> {
        match self.status {
            ProbeStatus::Reachable { latency } => Some(latency),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(ProbeConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let zero_workers = ProbeConfig {
            workers: 0,
            ..Default::default()
        };
        assert_eq!(zero_workers.validate(), Err(ProbeConfigError::NoWorkers));

        let zero_timeout = ProbeConfig {
            timeout: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(zero_timeout.validate(), Err(ProbeConfigError::ZeroTimeout));

        let zero_capacity = ProbeConfig {
            queue_capacity: 0,
            ..Default::default()
        };
        assert_eq!(
            zero_capacity.validate(),
            Err(ProbeConfigError::ZeroCapacity)
        );
    }

    #[test]
    fn test_latency_only_when_reachable() {
        let target = ProbeTarget {
            host_name: "jp-1".to_string(),
            ip: "192.0.2.1".to_string(),
            ping: 1,
            speed: 1,
            country_short: "JP".to_string(),
        };
        let online = ProbeOutcome {
            target: target.clone(),
            status: ProbeStatus::Reachable {
                latency: Duration::from_millis(10),
            },
        };
        assert!(online.is_reachable());
        assert_eq!(online.latency(), Some(Duration::from_millis(10)));

        let offline = ProbeOutcome {
            target,
            status: ProbeStatus::Unreachable,
        };
        assert!(!offline.is_reachable());
        assert_eq!(offline.latency(), None);
    }
}
