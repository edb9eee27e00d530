use std::sync::atomic::{AtomicU64, Ordering};

/// An `f64` stored as its bit pattern in an `AtomicU64`.
#[derive(Debug, Default)]
pub(crate) struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub(crate) fn new(v: f64) -> Self {
        AtomicF64(AtomicU64::new(v.to_bits()))
    }

    #[inline]
    pub(crate) fn load(&self, order: Ordering) -> f64 {
        f64::from_bits(self.0.load(order))
    }

    #[inline]
    pub(crate) fn store(&self, v: f64, order: Ordering) {
        self.0.store(v.to_bits(), order)
    }
}

/// Human-friendly throughput, from a number of bits per second.
pub(crate) fn format_throughput(bps: f64) -> String {
    let mbps = bps / 1_000_000.;
    if mbps < 1. {
        format!("{:.2} kbps", mbps * 1000.)
    } else if mbps < 1000. {
        format!("{:.2} Mbps", mbps)
    } else {
        format!("{:.2} Gbps", mbps / 1000.)
    }
}
