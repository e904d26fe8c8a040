//! Progress reporting for file transfers.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

/// Direction of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Upload,
    Download,
}

/// Lifecycle of a background transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Running,
    Completed,
    Failed,
}

impl TransferState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => TransferState::Completed,
            2 => TransferState::Failed,
            _ => TransferState::Running,
        }
    }
}

/// Point-in-time progress information.
#[derive(Debug, Clone)]
pub struct TransferProgress {
    /// Bytes transferred so far
    pub done: u64,
    /// Total bytes to transfer
    pub total: u64,
}

impl TransferProgress {
    /// Get progress as a percentage (0.0 to 100.0).
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.done as f64 / self.total as f64) * 100.0
    }

    /// Check if transfer is complete.
    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }
}

#[derive(Debug)]
struct Counters {
    total: u64,
    loaded: AtomicU64,
    state: AtomicU8,
}

/// Live progress of one in-flight upload or download.
///
/// The transfer task is the only writer; any number of clones may poll
/// `loaded`/`progress` concurrently. Reads may be slightly stale but never
/// go backwards for downloads.
#[derive(Clone)]
pub struct TransferMonitor {
    kind: TransferKind,
    inner: Arc<Counters>,
}

impl TransferMonitor {
    pub fn new(kind: TransferKind, total: u64) -> Self {
        Self {
            kind,
            inner: Arc::new(Counters {
                total,
                loaded: AtomicU64::new(0),
                state: AtomicU8::new(0),
            }),
        }
    }

    pub fn upload(total: u64) -> Self {
        Self::new(TransferKind::Upload, total)
    }

    pub fn download(total: u64) -> Self {
        Self::new(TransferKind::Download, total)
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    /// Total number of bytes to transfer.
    pub fn total(&self) -> u64 {
        self.inner.total
    }

    /// Bytes transferred so far.
    pub fn loaded(&self) -> u64 {
        self.inner.loaded.load(Ordering::Acquire)
    }

    /// Fraction transferred in `[0, 1]`; `0.0` when the total is zero.
    pub fn progress(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.loaded() as f64 / total as f64).min(1.0)
    }

    /// Record progress reported by the transfer task.
    ///
    /// Downloads report the bytes written this iteration and accumulate;
    /// uploads report the encoder's cumulative byte count, which replaces
    /// the previous value.
    pub fn record_progress(&self, amount: u64) {
        match self.kind {
            TransferKind::Download => {
                self.inner.loaded.fetch_add(amount, Ordering::AcqRel);
            }
            TransferKind::Upload => {
                self.inner.loaded.store(amount, Ordering::Release);
            }
        }
    }

    pub fn state(&self) -> TransferState {
        TransferState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    pub fn is_finished(&self) -> bool {
        self.state() != TransferState::Running
    }

    pub fn snapshot(&self) -> TransferProgress {
        TransferProgress {
            done: self.loaded(),
            total: self.total(),
        }
    }

    pub(crate) fn finish(&self, ok: bool) {
        let state = if ok {
            TransferState::Completed
        } else {
            TransferState::Failed
        };
        self.inner.state.store(state as u8, Ordering::Release);
    }
}

impl fmt::Debug for TransferMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferMonitor")
            .field("kind", &self.kind)
            .field("loaded", &self.loaded())
            .field("total", &self.total())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_accumulates() {
        let monitor = TransferMonitor::download(1000);
        monitor.record_progress(300);
        monitor.record_progress(300);
        assert_eq!(monitor.loaded(), 600);
        assert!((monitor.progress() - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_upload_adopts_cumulative_value() {
        let monitor = TransferMonitor::upload(1000);
        monitor.record_progress(750);
        monitor.record_progress(900);
        assert_eq!(monitor.loaded(), 900);
        assert!((monitor.progress() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_total() {
        let monitor = TransferMonitor::download(0);
        assert_eq!(monitor.progress(), 0.0);
        assert_eq!(monitor.snapshot().percent(), 0.0);
    }

    #[test]
    fn test_clones_share_counters() {
        let monitor = TransferMonitor::download(10);
        let observer = monitor.clone();
        monitor.record_progress(10);
        monitor.finish(true);
        assert_eq!(observer.loaded(), 10);
        assert!(observer.snapshot().is_complete());
        assert_eq!(observer.state(), TransferState::Completed);
    }

    #[test]
    fn test_failed_state() {
        let monitor = TransferMonitor::upload(10);
        assert!(!monitor.is_finished());
        monitor.finish(false);
        assert_eq!(monitor.state(), TransferState::Failed);
    }
}
