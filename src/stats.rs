use crate::utils::format_throughput;

use indicatif::HumanBytes;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Counters updated by the workers. Shown and reset from the shell.
pub struct Stats {
    start_time: Mutex<Instant>,
    packets_counter: AtomicU64,
    bytes_counter: AtomicU64,
    expired_flows: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            start_time: Mutex::new(Instant::now()),
            packets_counter: AtomicU64::new(0),
            bytes_counter: AtomicU64::new(0),
            expired_flows: AtomicU64::new(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub packets: u64,
    pub bytes: u64,
    pub expired_flows: u64,
    pub elapsed: Duration,
}

impl Summary {
    /// Average throughput since the last reset, in bits per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0. {
            8. * (self.bytes as f64) / secs
        } else {
            0.
        }
    }
}

impl Stats {
    pub fn packets_sent(&self, packets: u64, bytes: u64) {
        self.packets_counter.fetch_add(packets, Ordering::Relaxed);
        self.bytes_counter.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn flows_expired(&self, count: u64) {
        self.expired_flows.fetch_add(count, Ordering::Relaxed);
    }

    pub fn summary(&self) -> Summary {
        let start_time = *self.start_time.lock().unwrap();
        Summary {
            packets: self.packets_counter.load(Ordering::Relaxed),
            bytes: self.bytes_counter.load(Ordering::Relaxed),
            expired_flows: self.expired_flows.load(Ordering::Relaxed),
            elapsed: start_time.elapsed(),
        }
    }

    pub fn display(&self, out: &mut impl Write) -> io::Result<()> {
        let s = self.summary();
        writeln!(out, "Elapsed:       {:.1}s", s.elapsed.as_secs_f64())?;
        writeln!(out, "Packets:       {}", s.packets)?;
        writeln!(out, "Bytes:         {}", HumanBytes(s.bytes))?;
        writeln!(out, "Throughput:    {}", format_throughput(s.throughput()))?;
        writeln!(out, "Expired flows: {}", s.expired_flows)
    }

    pub fn reset(&self) {
        let mut start_time = self.start_time.lock().unwrap();
        self.packets_counter.store(0, Ordering::Relaxed);
        self.bytes_counter.store(0, Ordering::Relaxed);
        self.expired_flows.store(0, Ordering::Relaxed);
        *start_time = Instant::now();
    }
}
