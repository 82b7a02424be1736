//! Process-level metrics: uptime, memory, successful prediction responses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters owned by the HTTP layer.
#[derive(Debug)]
pub struct ServiceMetrics {
    started_at: Instant,
    predictions_served: AtomicU64,
}

/// Point-in-time view of [`ServiceMetrics`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub memory_usage_mb: f64,
    pub predictions_served: u64,
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            predictions_served: AtomicU64::new(0),
        }
    }

    /// Count one successful prediction response; returns the new total.
    pub fn record_prediction(&self) -> u64 {
        self.predictions_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn predictions_served(&self) -> u64 {
        self.predictions_served.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime: self.uptime(),
            memory_usage_mb: resident_memory_mb(),
            predictions_served: self.predictions_served(),
        }
    }
}

/// Resident set size of this process in MiB (0.0 where unsupported).
pub fn resident_memory_mb() -> f64 {
    resident_memory_bytes().map(|b| b as f64 / 1024.0 / 1024.0).unwrap_or(0.0)
}

#[cfg(target_os = "linux")]
fn resident_memory_bytes() -> Option<u64> {
    // statm: size resident shared text lib data dt (in pages)
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let resident_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if page_size <= 0 {
        return None;
    }
    Some(resident_pages * page_size as u64)
}

#[cfg(target_os = "macos")]
fn resident_memory_bytes() -> Option<u64> {
    // No current-RSS counter through libc here; ru_maxrss is the peak, in bytes.
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return None;
    }
    Some(usage.ru_maxrss as u64)
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn resident_memory_bytes() -> Option<u64> {
    None
}
