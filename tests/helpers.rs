// Shared test helpers: scripted probers, target builders and catalog setup.

use std::collections::HashSet;
use std::net::IpAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use vpnlist::probe::{Prober, Reachability};
use vpnlist::{CatalogRecord, ProbeSetupError, ProbeTarget, RecordStore};

/// Prober that sleeps for a fixed delay and reports a scripted result.
///
/// Unparsable addresses are setup errors, addresses in `panic_on` panic,
/// addresses in `offline` are unreachable, everything else is reachable with
/// latency `latency`.
pub struct ScriptedProber {
    delay: Duration,
    latency: Duration,
    offline: HashSet<String>,
    panic_on: HashSet<String>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[allow(dead_code)] // Not every test file uses every helper
impl ScriptedProber {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latency: delay,
            offline: HashSet::new(),
            panic_on: HashSet::new(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_offline<I: IntoIterator<Item = &'static str>>(mut self, ips: I) -> Self {
        self.offline.extend(ips.into_iter().map(str::to_string));
        self
    }

    pub fn with_panic_on<I: IntoIterator<Item = &'static str>>(mut self, ips: I) -> Self {
        self.panic_on.extend(ips.into_iter().map(str::to_string));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Prober for ScriptedProber {
    async fn probe(&self, host: &str, _timeout: Duration) -> Result<Reachability, ProbeSetupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if host.parse::<IpAddr>().is_err() {
            return Err(ProbeSetupError::InvalidAddress(host.to_string()));
        }
        if self.panic_on.contains(host) {
            panic!("scripted failure for {host}");
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.offline.contains(host) {
            Ok(Reachability::offline())
        } else {
            Ok(Reachability::online(self.latency))
        }
    }
}

/// `n` targets with distinct host names and IPs.
#[allow(dead_code)]
pub fn targets(n: usize) -> Vec<ProbeTarget> {
    (0..n)
        .map(|i| target(&format!("host-{i:04}"), &format!("10.0.{}.{}", i / 250, i % 250 + 1)))
        .collect()
}

#[allow(dead_code)]
pub fn target(host_name: &str, ip: &str) -> ProbeTarget {
    ProbeTarget {
        host_name: host_name.to_string(),
        ip: ip.to_string(),
        ping: 10,
        speed: 10_000_000,
        country_short: "JP".to_string(),
    }
}

#[allow(dead_code)]
pub fn record(host_name: &str, ip: &str, country_short: &str, speed: i64) -> CatalogRecord {
    CatalogRecord {
        host_name: host_name.to_string(),
        ip: ip.to_string(),
        score: 100,
        ping: 10,
        speed,
        country_long: match country_short {
            "JP" => "Japan",
            "US" => "United States",
            _ => "Unknown",
        }
        .to_string(),
        country_short: country_short.to_string(),
        num_vpn_sessions: 1,
        uptime: 1000,
        total_users: 10,
        total_traffic: 100,
        log_type: "2weeks".to_string(),
        operator: "tester".to_string(),
        message: String::new(),
        config: format!("client\nremote {ip} 1194\n").into_bytes(),
    }
}

/// Opens a fresh on-disk catalog under `dir`.
#[allow(dead_code)]
pub async fn open_store(dir: &Path) -> RecordStore {
    RecordStore::open(&dir.join("catalog").join("vpnlist.db"))
        .await
        .expect("Failed to open catalog")
}
