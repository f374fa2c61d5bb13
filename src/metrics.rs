use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and register the service series.
    pub fn init(seeded_profiles: usize) -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_counter!(
            "sbri_scored_requests_total",
            "Scored endpoint requests served."
        );
        describe_counter!(
            "sbri_scored_stored_total",
            "Scored responses answered from a stored score record."
        );
        describe_counter!(
            "sbri_registry_limited_total",
            "Registry proxy calls rejected by the rate limiter."
        );
        describe_gauge!("sbri_seeded_profiles", "Company profiles loaded at boot.");
        gauge!("sbri_seeded_profiles").set(seeded_profiles as f64);

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
