// ABOUTME: Prometheus text exposition of the operational metrics
// ABOUTME: Renders whatever the configured MetricsSink has recorded

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::resources::ServerResources;

/// Content type of the Prometheus text format
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Metrics routes implementation
pub struct MetricsRoutes;

impl MetricsRoutes {
    /// Create the `/metrics` route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/metrics", get(Self::handle_metrics))
            .with_state(resources)
    }

    async fn handle_metrics(State(resources): State<Arc<ServerResources>>) -> Response {
        let pool = resources.database.pool();
        let open = pool.size();
        let idle = u32::try_from(pool.num_idle()).unwrap_or(open);
        resources
            .metrics
            .set_db_connections(open.saturating_sub(idle), idle);

        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
            resources.metrics.render(),
        )
            .into_response()
    }
}
