use std::net::SocketAddr;

use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder and expose it on `GET /metrics`.
///
/// Called at most once per process, before any pipeline starts emitting
/// counters.
pub fn init(bind_addr: &str) {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus metrics recorder");
    let _ = PROMETHEUS.set(handle);

    let addr: SocketAddr = bind_addr.parse().expect("invalid metrics bind address");

    tokio::spawn(serve(addr));
}

async fn serve(addr: SocketAddr) {
    let app = Router::new().route("/metrics", get(render));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind metrics listener");
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!(error = %e, "metrics server error");
    }
}

async fn render() -> String {
    PROMETHEUS
        .get()
        .expect("Prometheus recorder not initialized")
        .render()
}
