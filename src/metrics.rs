use std::num::NonZeroU32;
use std::num::NonZeroUsize;

/// Flow TTL meaning "flows never expire because of churn".
pub const NEVER_EXPIRES: u64 = u64::MAX;

const NANOS_PER_SEC: f64 = 1e9;

/// Split the aggregate rate equally among the workers.
pub fn rate_per_core(rate: f64, num_cores: NonZeroUsize) -> f64 {
    rate / num_cores.get() as f64
}

/// Flows are generated by request/response pairs: only one side of each pair expires.
pub fn base_flows(num_flows: NonZeroU32) -> u32 {
    num_flows.get() / 2
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChurnProjection {
    /// Aggregate churn, in flows per second
    pub churn_per_second: f64,
    /// Average lifetime of a flow on one worker, in nanoseconds
    pub flow_ttl: u64,
}

/// Convert a churn in flows per minute into the flow TTL every worker must apply.
///
/// Each worker generates the whole base-flow population, so a single worker would reach the
/// requested churn with a TTL of `base_flows / churn_per_second`. Since `num_cores` workers
/// run at the same time, each of them ages its flows `num_cores` times more slowly.
///
/// A null churn yields [`NEVER_EXPIRES`].
pub fn project_churn(
    churn_fpm: f64,
    num_flows: NonZeroU32,
    num_cores: NonZeroUsize,
) -> ChurnProjection {
    let churn_per_second = churn_fpm / 60.;
    if churn_per_second <= 0. {
        return ChurnProjection {
            churn_per_second: 0.,
            flow_ttl: NEVER_EXPIRES,
        };
    }
    // the float to integer cast saturates
    let single_worker_ttl = (NANOS_PER_SEC * base_flows(num_flows) as f64 / churn_per_second) as u64;
    ChurnProjection {
        churn_per_second,
        flow_ttl: single_worker_ttl.saturating_mul(num_cores.get() as u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flows(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn cores(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_rate_split() {
        assert_eq!(rate_per_core(10., cores(2)), 5.);
        assert_eq!(rate_per_core(0., cores(8)), 0.);
        assert!((rate_per_core(1., cores(3)) - 1. / 3.).abs() < 1e-12);
        assert_eq!(rate_per_core(0.125, cores(1)), 0.125);
    }

    #[test]
    fn test_base_flows() {
        assert_eq!(base_flows(flows(1000)), 500);
        assert_eq!(base_flows(flows(201)), 100);
        assert_eq!(base_flows(flows(2)), 1);
    }

    #[test]
    fn test_churn_projection() {
        let p = project_churn(600., flows(1000), cores(4));
        assert_eq!(p.churn_per_second, 10.);
        assert_eq!(p.flow_ttl, 200_000_000_000);

        let p = project_churn(120., flows(200), cores(2));
        assert_eq!(p.churn_per_second, 2.);
        assert_eq!(p.flow_ttl, 100_000_000_000);
    }

    #[test]
    fn test_churn_scales_with_cores() {
        let one = project_churn(60., flows(10), cores(1));
        let four = project_churn(60., flows(10), cores(4));
        assert_eq!(one.flow_ttl, 5_000_000_000);
        assert_eq!(four.flow_ttl, 4 * one.flow_ttl);
    }

    #[test]
    fn test_zero_churn_never_expires() {
        let p = project_churn(0., flows(1000), cores(4));
        assert_eq!(p.churn_per_second, 0.);
        assert_eq!(p.flow_ttl, NEVER_EXPIRES);
    }

    #[test]
    fn test_tiny_churn_saturates() {
        let p = project_churn(1e-12, flows(u32::MAX), cores(64));
        assert_eq!(p.flow_ttl, NEVER_EXPIRES);
    }
}
