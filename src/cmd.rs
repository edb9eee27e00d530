use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(
        short,
        long,
        default_value = None,
        help = "Path to a TOML launch configuration"
    )]
    pub config: Option<String>,
    #[arg(short = 'f', long, help = "Total number of flows, both sides of each pair included")]
    pub num_flows: Option<u32>,
    #[arg(short = 'j', long, help = "Number of worker cores")]
    pub num_cores: Option<usize>,
    #[arg(short, long, help = "Initial aggregate rate in Mbps")]
    pub rate: Option<u32>,
    #[arg(long, help = "Initial churn in flows per minute")]
    pub churn: Option<u32>,
    #[arg(long, help = "Size of the generated packets in bytes")]
    pub packet_size: Option<u32>,
    #[arg(long, help = "Period in seconds of the statistics log (0 to disable)")]
    pub stats_interval: Option<u64>,
    #[arg(long, default_value_t = false, help = "Pin each worker to its own core")]
    pub pin_cores: bool,
    #[arg(long, help = "First core used by the workers when pinned")]
    pub first_core: Option<usize>,
}
