use crate::error::ConfigError;
use crate::runtime::Config;

use serde::Deserialize;
use std::fs;
use std::num::NonZeroU32;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

/// Parameters of a generator launch.
/// `num_flows` and `num_cores` are fixed for the whole process, `rate` and `churn` are only
/// the initial targets.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchConfig {
    /// Total number of flows, counting both sides of each request/response pair
    pub num_flows: u32,
    /// Number of worker cores
    pub num_cores: usize,
    /// Aggregate rate, in Gbps
    pub rate: f64,
    /// Flows per minute
    pub churn: f64,
    /// Size of the generated packets, in bytes
    pub packet_size: u32,
    /// Period of the statistics log, in seconds. 0 disables it.
    pub stats_interval: u64,
    /// Pin each worker to its own core
    pub pin_cores: bool,
    /// First core used by the workers when they are pinned
    pub first_core: usize,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        LaunchConfig {
            num_flows: 1024,
            num_cores: 1,
            rate: 1.,
            churn: 0.,
            packet_size: 64,
            stats_interval: 0,
            pin_cores: false,
            first_core: 0,
        }
    }
}

impl LaunchConfig {
    /// Check the launch parameters and return the static ones
    pub fn validate(&self) -> Result<(NonZeroU32, NonZeroUsize), ConfigError> {
        let num_cores = NonZeroUsize::new(self.num_cores).ok_or(ConfigError::NoCores)?;
        if self.num_flows < 2 {
            return Err(ConfigError::TooFewFlows(self.num_flows));
        }
        let num_flows = NonZeroU32::new(self.num_flows).ok_or(ConfigError::TooFewFlows(0))?;
        if !self.rate.is_finite() || self.rate < 0. {
            return Err(ConfigError::InvalidRate(self.rate));
        }
        if !self.churn.is_finite() || self.churn < 0. {
            return Err(ConfigError::InvalidChurn(self.churn));
        }
        if self.packet_size == 0 {
            return Err(ConfigError::InvalidPacketSize);
        }
        Ok((num_flows, num_cores))
    }

    /// Validate, then create the shared configuration of the workers
    pub fn runtime_config(&self) -> Result<Config, ConfigError> {
        let (num_flows, num_cores) = self.validate()?;
        Ok(Config::new(num_flows, num_cores))
    }

    pub fn stats_interval(&self) -> Option<Duration> {
        (self.stats_interval > 0).then(|| Duration::from_secs(self.stats_interval))
    }
}

/// Parse a TOML launch configuration. Missing keys take their default value.
pub fn import_config(config: &str) -> Result<LaunchConfig, ConfigError> {
    let config: LaunchConfig = toml::from_str(config)?;
    log::trace!("Launch configuration: {config:?}");
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<LaunchConfig, ConfigError> {
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = import_config(&config_str)?;
    log::info!("Configuration loaded from {}", path.display());
    Ok(config)
}
