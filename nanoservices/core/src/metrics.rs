use once_cell::sync::Lazy;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};

use crate::registry::Category;

// Global registry and metrics are initialized lazily.
static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    Registry::new_custom(Some("inspect_flow".to_string()), None).expect("valid registry prefix")
});

static PIPELINE_DURATION_MS: Lazy<HistogramVec> = Lazy::new(|| {
    let opts = HistogramOpts::new("pipeline_duration_ms", "Pipeline run duration in milliseconds");
    let hist = HistogramVec::new(opts, &["pipeline_name"]).expect("valid histogram");
    REGISTRY.register(Box::new(hist.clone())).ok();
    hist
});

static PIPELINE_RUNS: Lazy<CounterVec> = Lazy::new(|| {
    let opts = Opts::new("pipeline_runs_total", "Total pipeline runs");
    let c = CounterVec::new(opts, &["pipeline_name"]).expect("valid counter");
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

static PIPELINE_FAILURES: Lazy<CounterVec> = Lazy::new(|| {
    let opts = Opts::new("pipeline_failures_total", "Total failed pipeline runs");
    let c = CounterVec::new(opts, &["pipeline_name"]).expect("valid counter");
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

static STAGE_ROWS: Lazy<CounterVec> = Lazy::new(|| {
    let opts = Opts::new("stage_rows_total", "Rows leaving each pipeline stage");
    let c = CounterVec::new(opts, &["pipeline_name", "stage"]).expect("valid counter");
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

/// Observe a pipeline run duration in milliseconds.
pub fn observe_duration(pipeline_name: &str, duration_ms: f64) {
    PIPELINE_DURATION_MS.with_label_values(&[pipeline_name]).observe(duration_ms);
}

/// Increment the run counter for a pipeline.
pub fn inc_run(pipeline_name: &str) {
    PIPELINE_RUNS.with_label_values(&[pipeline_name]).inc();
}

/// Increment the failure counter for a pipeline.
pub fn inc_failure(pipeline_name: &str) {
    PIPELINE_FAILURES.with_label_values(&[pipeline_name]).inc();
}

/// Count rows produced by one stage of a pipeline.
pub fn observe_rows(pipeline_name: &str, stage: Category, rows: usize) {
    STAGE_ROWS
        .with_label_values(&[pipeline_name, stage.as_str()])
        .inc_by(rows as f64);
}

/// Gather metrics as text in Prometheus exposition format.
///
/// The CLI prints this after a run when asked to; tests use it to check
/// what a run recorded.
pub fn gather_text() -> String {
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    if let Err(e) = TextEncoder::new().encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
