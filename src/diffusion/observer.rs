//! Per-iteration callbacks.
//!
//! The drivers call an [`IterationObserver`] after every completed step.
//! Observers only see the freshly recorded statistics; they cannot change
//! the numerical result.

/// Receives one notification per completed iteration.
pub trait IterationObserver<R> {
    /// `iteration` is 1-based; `total` is the configured iteration count.
    fn on_iteration(&mut self, iteration: usize, total: usize, record: &R);
}

impl<R, F> IterationObserver<R> for F
where
    F: FnMut(usize, usize, &R),
{
    fn on_iteration(&mut self, iteration: usize, total: usize, record: &R) {
        self(iteration, total, record)
    }
}

/// Observer that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl<R> IterationObserver<R> for NoopObserver {
    fn on_iteration(&mut self, _iteration: usize, _total: usize, _record: &R) {}
}

/// Logs progress at `info` level every `interval` iterations.
#[derive(Clone, Copy, Debug)]
pub struct ProgressLogger {
    interval: usize,
}

impl ProgressLogger {
    /// An interval of 0 is treated as 1.
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
        }
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    fn should_report(&self, iteration: usize) -> bool {
        iteration % self.interval == 0
    }
}

impl Default for ProgressLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl<R> IterationObserver<R> for ProgressLogger {
    fn on_iteration(&mut self, iteration: usize, total: usize, _record: &R) {
        if self.should_report(iteration) {
            log::info!("iteration {}/{} complete", iteration, total);
        }
    }
}
