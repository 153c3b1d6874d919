use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::warn;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if observability is enabled via OBSERVABILITY_ENABLED env var
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Install the Prometheus recorder and its upkeep task.
/// Returns None if observability is disabled or the recorder can't be installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_observability_enabled() {
        return None;
    }

    let builder = match PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("http_request_duration_seconds".to_string()),
        &[
            0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
        ],
    ) {
        Ok(builder) => builder,
        Err(e) => {
            warn!(error = %e, "invalid histogram buckets, metrics disabled");
            return None;
        }
    };

    let handle = match builder.install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            warn!(error = %e, "failed to install Prometheus recorder, metrics disabled");
            return None;
        }
    };

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Some(handle)
}

/// Metrics middleware to track HTTP requests
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let uri_path = req.uri().path().to_owned();

    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or(uri_path);

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status.to_string()).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);

    gauge!("http_requests_active").decrement(1.0);

    response
}

pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

// Business metrics

pub fn track_registration(provider: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("accounts_registered_total", "provider" => provider.to_string()).increment(1);
}

pub fn track_login_success(provider: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("logins_total", "provider" => provider.to_string(), "status" => "success").increment(1);
}

pub fn track_login_failure(provider: &str, reason: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("logins_total", "provider" => provider.to_string(), "status" => "failure", "reason" => reason.to_string()).increment(1);
}

/// One increment per access/refresh pair.
pub fn track_tokens_issued(source: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("token_pairs_issued_total", "source" => source.to_string()).increment(1);
}

pub fn track_email_queued(kind: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("emails_queued_total", "kind" => kind.to_string()).increment(1);
}

pub fn track_email_sent(transport: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("emails_sent_total", "transport" => transport.to_string()).increment(1);
}

pub fn track_email_failed(transport: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("emails_failed_total", "transport" => transport.to_string()).increment(1);
}
