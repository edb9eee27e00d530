use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A launch configuration that cannot be used. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("ill-formed configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("at least one worker core is required")]
    NoCores,
    #[error("at least two flows (one request/response pair) are required, got {0}")]
    TooFewFlows(u32),
    #[error("rate must be a finite non-negative number of Gbps, got {0}")]
    InvalidRate(f64),
    #[error("churn must be a finite non-negative number of flows per minute, got {0}")]
    InvalidChurn(f64),
    #[error("packet size must be at least one byte")]
    InvalidPacketSize,
}
