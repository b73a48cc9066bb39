//! Prometheus wiring for the scorer's metrics hooks.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use scorer::{set_score_metrics, OriginalityResult, ScoreMetrics};

pub const CHECKS_TOTAL: &str = "originality_checks_total";
pub const DEGRADED_TOTAL: &str = "originality_degraded_total";
pub const CHECK_SECONDS: &str = "originality_check_seconds";
pub const PARAPHRASE_TOTAL: &str = "paraphrase_requests_total";
pub const PARAPHRASE_FALLBACKS_TOTAL: &str = "paraphrase_fallbacks_total";

const CHECK_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Forwards scorer observations to the `metrics` facade.
#[derive(Debug, Default)]
pub struct PrometheusScoreMetrics;

impl ScoreMetrics for PrometheusScoreMetrics {
    fn record_check(&self, strategy: &str, latency: Duration, result: &OriginalityResult) {
        counter!(CHECKS_TOTAL, "strategy" => strategy.to_owned()).increment(1);
        if result.degraded {
            counter!(DEGRADED_TOTAL, "strategy" => strategy.to_owned()).increment(1);
        }
        histogram!(CHECK_SECONDS, "strategy" => strategy.to_owned()).record(latency.as_secs_f64());
    }

    fn record_paraphrase(&self, _latency: Duration, fell_back: bool) {
        counter!(PARAPHRASE_TOTAL).increment(1);
        if fell_back {
            counter!(PARAPHRASE_FALLBACKS_TOTAL).increment(1);
        }
    }
}

/// Install the process-wide Prometheus recorder and the scorer hook.
///
/// Safe to call repeatedly: the recorder is installed once and later calls
/// return the same handle. Returns `None` if another recorder already owns
/// the process.
pub fn install() -> Option<PrometheusHandle> {
    static HANDLE: OnceCell<Option<PrometheusHandle>> = OnceCell::new();
    HANDLE
        .get_or_init(|| {
            let builder = match PrometheusBuilder::new()
                .set_buckets_for_metric(Matcher::Full(CHECK_SECONDS.to_string()), CHECK_BUCKETS)
            {
                Ok(builder) => builder,
                Err(err) => {
                    tracing::warn!(error = %err, "invalid histogram buckets, metrics disabled");
                    return None;
                }
            };
            match builder.install_recorder() {
                Ok(handle) => {
                    set_score_metrics(Some(Arc::new(PrometheusScoreMetrics)));
                    tracing::info!("prometheus recorder installed");
                    Some(handle)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to install prometheus recorder");
                    None
                }
            }
        })
        .clone()
}
