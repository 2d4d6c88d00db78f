//! Metrics sink port: counters for generations/validations/
//! batches, histograms for solver runtime and per-constraint encoding time,
//! gauges for last-compliance-rate, open-violation-count, and resilience
//! defense level. The core never talks to a metrics backend directly — it
//! only ever emits [`MetricEvent`]s through this trait, so swapping
//! Prometheus/StatsD/whatever is purely a collaborator concern.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum MetricEvent {
    Counter { name: &'static str, value: u64 },
    Histogram { name: &'static str, value: Duration },
    Gauge { name: &'static str, value: f64 },
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn record(&self, _event: MetricEvent) {}
}

/// Emits every event through `tracing` rather than a metrics backend,
/// for collaborators that scrape structured logs instead of a push/pull
/// metrics pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn record(&self, event: MetricEvent) {
        match event {
            MetricEvent::Counter { name, value } => {
                tracing::info!(metric.kind = "counter", metric.name = name, metric.value = value);
            }
            MetricEvent::Histogram { name, value } => {
                tracing::info!(
                    metric.kind = "histogram",
                    metric.name = name,
                    metric.value_ms = value.as_millis() as u64
                );
            }
            MetricEvent::Gauge { name, value } => {
                tracing::info!(metric.kind = "gauge", metric.name = name, metric.value = value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_sink_does_not_panic_on_any_event_kind() {
        let sink = TracingMetricsSink;
        sink.record(MetricEvent::Counter { name: "generations_total", value: 1 });
        sink.record(MetricEvent::Histogram { name: "solver_runtime", value: Duration::from_millis(250) });
        sink.record(MetricEvent::Gauge { name: "compliance_rate", value: 0.97 });
    }
}
