//! Reachability primitives.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use log::debug;
use tokio::net::TcpSocket;

use crate::config::DEFAULT_PROBE_PORT;
use crate::error_handling::ProbeSetupError;

use super::types::Reachability;

/// A single-attempt reachability test.
///
/// Implementations make exactly one attempt, never retry, and give up after
/// `timeout`. An unreachable or slow host is `Ok(Reachability::offline())`;
/// `Err` is reserved for targets no test can even be built for.
pub trait Prober: Send + Sync {
    fn probe(
        &self,
        host: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<Reachability, ProbeSetupError>> + Send;
}

/// Checks a relay by opening (and immediately closing) a TCP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpProber {
    port: u16,
}

impl TcpProber {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_PORT)
    }
}

impl Prober for TcpProber {
    async fn probe(&self, host: &str, timeout: Duration) -> Result<Reachability, ProbeSetupError> {
        let ip: IpAddr = host
            .trim()
            .parse()
            .map_err(|_| ProbeSetupError::InvalidAddress(host.to_string()))?;
        let addr = SocketAddr::new(ip, self.port);

        let socket = match ip {
            IpAddr::V4(_) => TcpSocket::new_v4(),
            IpAddr::V6(_) => TcpSocket::new_v6(),
        }
        .map_err(|e| ProbeSetupError::Socket(e.to_string()))?;

        let started = Instant::now();
        match tokio::time::timeout(timeout, socket.connect(addr)).await {
            Ok(Ok(_stream)) => Ok(Reachability::online(started.elapsed())),
            Ok(Err(e)) => {
                debug!("Connect to {addr} failed: {e}");
                Ok(Reachability::offline())
            }
            Err(_) => {
                debug!("Connect to {addr} timed out after {timeout:?}");
                Ok(Reachability::offline())
            }
        }
    }
}
