use crate::runtime::Config;
use crate::stats::Stats;
use crate::utils::format_throughput;

use crossbeam_channel::{select, tick, Receiver};
use std::sync::Arc;
use std::time::Duration;

/// Log a summary of the statistics every `interval`, until `shutdown` is disconnected
pub fn run(stats: Arc<Stats>, config: Arc<Config>, interval: Duration, shutdown: Receiver<()>) {
    let ticker = tick(interval);
    loop {
        select! {
            recv(ticker) -> _ => {
                let s = stats.summary();
                let state = if config.snapshot().running { "running" } else { "stopped" };
                log::info!(
                    "[{state}] {} sent packets ({}), {} expired flows",
                    s.packets,
                    format_throughput(s.throughput()),
                    s.expired_flows
                );
            }
            recv(shutdown) -> _ => break,
        }
    }
}
