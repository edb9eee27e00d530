use crate::metrics::NEVER_EXPIRES;
use crate::runtime::Config;
use crate::stats::Stats;

use std::io::{self, Write};
use std::sync::Arc;

/// The only writer of the shared [`Config`].
///
/// It takes the configuration by value, so no other handle can exist before it is shared,
/// and the mutating handlers take `&mut self`: a single control thread drives it.
/// Each handler writes the runtime fields, then publishes exactly once.
pub struct Controller {
    config: Arc<Config>,
    stats: Arc<Stats>,
}

impl Controller {
    /// Apply the initial targets, then publish once to signal readiness.
    pub fn new(config: Config, rate: f64, churn: f64, stats: Arc<Stats>) -> Self {
        config.set_rate(rate);
        config.set_churn(churn);
        let version = config.publish();
        log::debug!("Initial configuration published (#{version})");
        Controller {
            config: Arc::new(config),
            stats,
        }
    }

    /// Read-only handle for the workers
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    pub fn start(&mut self) {
        self.config.set_running(true);
        let version = self.config.publish();
        log::info!("Generation started (#{version})");
    }

    pub fn stop(&mut self) {
        self.config.set_running(false);
        let version = self.config.publish();
        log::info!("Generation stopped (#{version})");
    }

    /// Aggregate rate, in Gbps
    pub fn set_rate(&mut self, rate: f64) {
        debug_assert!(rate >= 0.);
        self.config.set_rate(rate);
        let version = self.config.publish();
        log::info!(
            "Rate set to {rate} Gbps, {} Gbps per core (#{version})",
            self.config.snapshot().rate_per_core
        );
    }

    /// Churn, in flows per minute
    pub fn set_churn(&mut self, churn: f64) {
        debug_assert!(churn >= 0.);
        self.config.set_churn(churn);
        let version = self.config.publish();
        let flow_ttl = self.config.snapshot().flow_ttl;
        if flow_ttl == NEVER_EXPIRES {
            log::info!("Churn disabled, flows never expire (#{version})");
        } else {
            log::info!("Churn set to {churn} fpm, flow TTL is {flow_ttl} ns (#{version})");
        }
    }

    /// Leaving the session neither changes nor publishes the configuration.
    pub fn quit(&self) {
        log::info!("Leaving the interactive session");
    }

    pub fn display_stats(&self, out: &mut impl Write) -> io::Result<()> {
        self.stats.display(out)
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
        log::info!("Statistics reset");
    }
}
