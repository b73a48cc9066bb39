// Metrics hooks for the scorer.
//
// Callers install a global `ScoreMetrics` implementation via [`set_score_metrics`];
// every originality check and paraphrase then reports its latency and outcome.
// This keeps instrumentation decoupled from any specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::types::OriginalityResult;

/// Metrics observer for scoring and paraphrasing.
pub trait ScoreMetrics: Send + Sync {
    /// Record a finished originality check. `strategy` is the strategy name,
    /// `result` the value handed back to the caller.
    fn record_check(&self, strategy: &str, latency: Duration, result: &OriginalityResult);

    /// Record a finished paraphrase. `fell_back` is true when the input was
    /// returned unchanged because the provider failed.
    fn record_paraphrase(&self, latency: Duration, fell_back: bool);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn ScoreMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn ScoreMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn ScoreMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global score metrics recorder.
///
/// Typically called once during service startup.
pub fn set_score_metrics(recorder: Option<Arc<dyn ScoreMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
