use crate::metrics;
use crate::utils::AtomicF64;

use crossbeam_utils::CachePadded;
use std::num::NonZeroU32;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Configuration shared by the control thread and the workers.
///
/// The static part (`num_flows`, `num_cores`) is fixed at creation. The runtime part is
/// written by the control thread only, through [`crate::control::Controller`], and read by
/// any number of workers without locks.
///
/// Every batch of writes ends with a single [`Config::publish`], which increments the update
/// counter with release ordering. A reader that acquires a counter value sees all the writes
/// that preceded the matching increment.
#[derive(Debug)]
pub struct Config {
    num_flows: NonZeroU32,
    num_cores: NonZeroUsize,
    /// Aggregate rate requested by the operator, in Gbps
    rate: AtomicF64,
    /// Churn requested by the operator, in flows per minute
    churn: AtomicF64,
    runtime: Runtime,
}

#[derive(Debug)]
struct Runtime {
    running: AtomicBool,
    rate_per_core: AtomicF64,
    churn_per_second: AtomicF64,
    flow_ttl: AtomicU64,
    // polled by every worker, keep it on its own cache line
    update_cnt: CachePadded<AtomicU64>,
}

/// Point-in-time view of the runtime fields, as seen by a worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// Counter value acquired before reading the fields. The fields are at least this recent.
    pub update_cnt: u64,
    pub running: bool,
    /// Gbps
    pub rate_per_core: f64,
    pub churn_per_second: f64,
    /// Nanoseconds, [`metrics::NEVER_EXPIRES`] when there is no churn
    pub flow_ttl: u64,
}

impl Config {
    /// A stopped configuration with no rate and no churn. Nothing is published yet.
    pub fn new(num_flows: NonZeroU32, num_cores: NonZeroUsize) -> Self {
        Config {
            num_flows,
            num_cores,
            rate: AtomicF64::new(0.),
            churn: AtomicF64::new(0.),
            runtime: Runtime {
                running: AtomicBool::new(false),
                rate_per_core: AtomicF64::new(0.),
                churn_per_second: AtomicF64::new(0.),
                flow_ttl: AtomicU64::new(metrics::NEVER_EXPIRES),
                update_cnt: CachePadded::new(AtomicU64::new(0)),
            },
        }
    }

    pub fn num_flows(&self) -> NonZeroU32 {
        self.num_flows
    }

    pub fn num_cores(&self) -> NonZeroUsize {
        self.num_cores
    }

    /// Number of flows whose expiry drives the churn
    pub fn base_flows(&self) -> u32 {
        metrics::base_flows(self.num_flows)
    }

    pub fn rate(&self) -> f64 {
        self.rate.load(Ordering::Relaxed)
    }

    pub fn churn(&self) -> f64 {
        self.churn.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn update_cnt(&self) -> u64 {
        self.runtime.update_cnt.load(Ordering::Acquire)
    }

    /// Acquire the update counter, then read the runtime fields.
    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        let update_cnt = self.update_cnt();
        self.read_fields(update_cnt)
    }

    /// Same as [`Config::snapshot`], but only if the counter moved since `last_seen`.
    /// Updates `last_seen` if changed.
    #[inline]
    pub fn snapshot_if_changed(&self, last_seen: &mut u64) -> Option<Snapshot> {
        let update_cnt = self.update_cnt();
        if update_cnt == *last_seen {
            return None;
        }
        *last_seen = update_cnt;
        Some(self.read_fields(update_cnt))
    }

    #[inline]
    fn read_fields(&self, update_cnt: u64) -> Snapshot {
        let rt = &self.runtime;
        Snapshot {
            update_cnt,
            running: rt.running.load(Ordering::Relaxed),
            rate_per_core: rt.rate_per_core.load(Ordering::Relaxed),
            churn_per_second: rt.churn_per_second.load(Ordering::Relaxed),
            flow_ttl: rt.flow_ttl.load(Ordering::Relaxed),
        }
    }

    // Writer side. The stores are relaxed: `publish` orders them for the readers.

    pub(crate) fn set_running(&self, running: bool) {
        self.runtime.running.store(running, Ordering::Relaxed);
    }

    pub(crate) fn set_rate(&self, rate: f64) {
        self.rate.store(rate, Ordering::Relaxed);
        self.runtime
            .rate_per_core
            .store(metrics::rate_per_core(rate, self.num_cores), Ordering::Relaxed);
    }

    pub(crate) fn set_churn(&self, churn: f64) {
        let projection = metrics::project_churn(churn, self.num_flows, self.num_cores);
        self.churn.store(churn, Ordering::Relaxed);
        self.runtime
            .churn_per_second
            .store(projection.churn_per_second, Ordering::Relaxed);
        self.runtime
            .flow_ttl
            .store(projection.flow_ttl, Ordering::Relaxed);
    }

    /// Make every previous write visible to the readers. Never blocks.
    pub(crate) fn publish(&self) -> u64 {
        self.runtime.update_cnt.fetch_add(1, Ordering::Release) + 1
    }
}
