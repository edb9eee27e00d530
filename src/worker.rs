use crate::metrics::NEVER_EXPIRES;
use crate::runtime::{Config, Snapshot};
use crate::stats::Stats;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Period of the generation loop
const TICK: Duration = Duration::from_millis(1);
/// Period of the configuration polling while stopped
const IDLE_POLL: Duration = Duration::from_millis(10);
/// A worker never sends more than one second of traffic at once
const MAX_BURST: Duration = Duration::from_secs(1);

/// What a worker produced during one tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub packets: u64,
    pub bytes: u64,
    pub expired_flows: u64,
}

/// Converts elapsed time into packets at `rate_per_core` and into expired flows at `flow_ttl`.
/// Fractions are carried over to the next tick.
#[derive(Debug, Clone)]
pub struct Pacer {
    packet_size: u32,
    base_flows: u32,
    bits_budget: f64,
    expiry_budget: f64,
}

impl Pacer {
    pub fn new(packet_size: u32, base_flows: u32) -> Self {
        Pacer {
            packet_size,
            base_flows,
            bits_budget: 0.,
            expiry_budget: 0.,
        }
    }

    pub fn advance(&mut self, snapshot: &Snapshot, elapsed: Duration) -> Progress {
        if !snapshot.running {
            self.bits_budget = 0.;
            self.expiry_budget = 0.;
            return Progress::default();
        }

        let rate_bps = snapshot.rate_per_core * 1e9;
        let max_budget = rate_bps * MAX_BURST.as_secs_f64();
        self.bits_budget = (self.bits_budget + rate_bps * elapsed.as_secs_f64()).min(max_budget);
        let packet_bits = 8. * self.packet_size as f64;
        let packets = (self.bits_budget / packet_bits).floor();
        self.bits_budget -= packets * packet_bits;

        let expired_flows = if snapshot.flow_ttl == NEVER_EXPIRES || snapshot.flow_ttl == 0 {
            self.expiry_budget = 0.;
            0.
        } else {
            // every base flow of this worker is renewed once per flow_ttl
            self.expiry_budget +=
                elapsed.as_nanos() as f64 * self.base_flows as f64 / snapshot.flow_ttl as f64;
            let expired = self.expiry_budget.floor();
            self.expiry_budget -= expired;
            expired
        };

        Progress {
            packets: packets as u64,
            bytes: packets as u64 * self.packet_size as u64,
            expired_flows: expired_flows as u64,
        }
    }
}

pub struct Worker {
    pub id: usize,
    pub config: Arc<Config>,
    pub stats: Arc<Stats>,
    pub packet_size: u32,
    /// Core to pin this worker to
    pub core: Option<core_affinity::CoreId>,
}

/// Generation loop of one worker. Only reads the configuration, and adopts a new version as
/// soon as the update counter moves. Returns when `shutdown` is raised.
pub fn run(worker: Worker, shutdown: Arc<AtomicBool>) {
    if let Some(core) = worker.core {
        if core_affinity::set_for_current(core) {
            log::debug!("Worker {} pinned to core {}", worker.id, core.id);
        } else {
            log::warn!("Worker {} cannot be pinned to core {}", worker.id, core.id);
        }
    }

    let mut pacer = Pacer::new(worker.packet_size, worker.config.base_flows());
    let mut last_seen = 0;
    let mut current = worker.config.snapshot();
    let mut last_tick = Instant::now();

    while !shutdown.load(Ordering::Relaxed) {
        if let Some(s) = worker.config.snapshot_if_changed(&mut last_seen) {
            log::debug!("Worker {} adopts configuration #{}", worker.id, s.update_cnt);
            current = s;
        }

        let now = Instant::now();
        let progress = pacer.advance(&current, now.duration_since(last_tick));
        last_tick = now;
        if progress.packets > 0 {
            worker.stats.packets_sent(progress.packets, progress.bytes);
        }
        if progress.expired_flows > 0 {
            worker.stats.flows_expired(progress.expired_flows);
        }

        thread::sleep(if current.running { TICK } else { IDLE_POLL });
    }
    log::debug!("Worker {} stopped", worker.id);
}

/// Cores for `count` workers starting at `first_core`, wrapping around the available cores
pub fn pick_cores(count: usize, first_core: usize) -> Vec<Option<core_affinity::CoreId>> {
    match core_affinity::get_core_ids() {
        Some(ids) if !ids.is_empty() => (0..count)
            .map(|i| Some(ids[(first_core + i) % ids.len()]))
            .collect(),
        _ => {
            log::warn!("Cannot list the cores, workers are not pinned");
            vec![None; count]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Controller;
    use std::num::{NonZeroU32, NonZeroUsize};

    fn snapshot(running: bool, rate_per_core: f64, flow_ttl: u64) -> Snapshot {
        Snapshot {
            update_cnt: 1,
            running,
            rate_per_core,
            churn_per_second: 0.,
            flow_ttl,
        }
    }

    #[test]
    fn test_pacing() {
        let mut pacer = Pacer::new(1000, 1);
        // 1 Gbps during 1 ms: 1e6 bits, i.e. 125 packets of 8000 bits
        let p = pacer.advance(&snapshot(true, 1., NEVER_EXPIRES), Duration::from_millis(1));
        assert_eq!(p.packets, 125);
        assert_eq!(p.bytes, 125_000);
        assert_eq!(p.expired_flows, 0);
    }

    #[test]
    fn test_budget_carries_over() {
        let mut pacer = Pacer::new(1000, 1);
        let s = snapshot(true, 0.005, NEVER_EXPIRES);
        // 5 Mbps during 1 ms is 5000 bits, less than a packet
        assert_eq!(pacer.advance(&s, Duration::from_millis(1)).packets, 0);
        assert_eq!(pacer.advance(&s, Duration::from_millis(1)).packets, 1);
    }

    #[test]
    fn test_burst_is_capped() {
        let mut pacer = Pacer::new(1000, 1);
        // 10 s at 0.5 Gbps, but only one second of it is sent
        let p = pacer.advance(&snapshot(true, 0.5, NEVER_EXPIRES), Duration::from_secs(10));
        assert_eq!(p.packets, 62_500);
    }

    #[test]
    fn test_stopped_worker_is_idle() {
        let mut pacer = Pacer::new(64, 100);
        let p = pacer.advance(&snapshot(false, 10., 1_000), Duration::from_secs(1));
        assert_eq!(p, Progress::default());
    }

    #[test]
    fn test_flow_expiry() {
        // 100 base flows, each renewed every 10 s: 10 flows per second
        let mut pacer = Pacer::new(64, 100);
        let p = pacer.advance(&snapshot(true, 0., 10_000_000_000), Duration::from_secs(1));
        assert_eq!(p.packets, 0);
        assert_eq!(p.expired_flows, 10);
    }

    #[test]
    fn test_aggregate_churn_matches_target() {
        // 200 flows, 2 cores, 120 fpm: 2 flows per second over all the workers
        let config = Config::new(NonZeroU32::new(200).unwrap(), NonZeroUsize::new(2).unwrap());
        let mut controller = Controller::new(config, 0., 120., Arc::new(Stats::default()));
        controller.start();
        let config = controller.config();
        let s = config.snapshot();
        let total: u64 = (0..2)
            .map(|_| {
                Pacer::new(64, config.base_flows())
                    .advance(&s, Duration::from_secs(10))
                    .expired_flows
            })
            .sum();
        assert_eq!(total, 20);
    }

    #[test]
    fn test_workers_follow_the_controller() {
        let config = Config::new(NonZeroU32::new(10).unwrap(), NonZeroUsize::new(1).unwrap());
        let stats = Arc::new(Stats::default());
        let mut controller = Controller::new(config, 1., 0., Arc::clone(&stats));
        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = {
            let worker = Worker {
                id: 0,
                config: controller.config(),
                stats: Arc::clone(&stats),
                packet_size: 64,
                core: None,
            };
            let shutdown = Arc::clone(&shutdown);
            thread::spawn(move || run(worker, shutdown))
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(stats.summary().packets, 0);

        controller.start();
        let deadline = Instant::now() + Duration::from_secs(5);
        while stats.summary().packets == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        shutdown.store(true, Ordering::Relaxed);
        handle.join().unwrap();
        assert!(stats.summary().packets > 0);
    }
}
