//! Progress reporting for long passes.

/// Receives progress updates from a pass
pub trait ProgressSink {
    /// `current` items of `total` processed. `total` is 0 when unknown.
    fn update(&self, pass: &str, current: usize, total: usize);

    /// The pass finished
    fn finish(&self, pass: &str, total: usize) {
        self.update(pass, total, total);
    }
}

/// Discards all updates
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn update(&self, _pass: &str, _current: usize, _total: usize) {}
}

/// Reports progress through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn update(&self, pass: &str, current: usize, total: usize) {
        if total > 0 {
            let pct = current as f64 * 100.0 / total as f64;
            log::info!("{}: {}/{} ({:.1}%)", pass, current, total, pct);
        } else {
            log::info!("{}: {} processed", pass, current);
        }
    }
}
