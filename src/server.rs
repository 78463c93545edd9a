// ABOUTME: HTTP server assembly: merges domain routers and applies the tower middleware stack
// ABOUTME: Request ids, tracing spans, CORS, timeouts, request metrics, and graceful shutdown
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{extract::Request, middleware, Router};
use http::HeaderName;
use tokio::net::TcpListener;
use tokio::signal;
#[cfg(unix)]
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::middleware::{create_request_span, setup_cors, track_requests};
use crate::resources::ServerResources;
use crate::routes::{
    AuthRoutes, HealthRoutes, LearningRoutes, MentorRoutes, MetricsRoutes, RequestRoutes,
    UserRoutes,
};

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the full application router
///
/// Layers run outside-in: request id, trace span, CORS, timeout, then the
/// per-route metrics middleware.
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let timeout = Duration::from_secs(resources.config.http.request_timeout_secs);

    Router::new()
        .merge(HealthRoutes::routes())
        .merge(MetricsRoutes::routes(resources.clone()))
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(RequestRoutes::routes(resources.clone()))
        .merge(MentorRoutes::routes(resources.clone()))
        .merge(LearningRoutes::routes(resources.clone()))
        .merge(UserRoutes::routes(resources.clone()))
        .layer(middleware::from_fn_with_state(
            resources.metrics.clone(),
            track_requests,
        ))
        .layer(TimeoutLayer::new(timeout))
        .layer(setup_cors(&resources.config.http))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            create_request_span(request.method().as_str(), request.uri().path(), request_id)
        }))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
}

/// Bind and serve until Ctrl-C or SIGTERM
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        resources.config.host, resources.config.http_port
    )
    .parse()
    .with_context(|| {
        format!(
            "Invalid listen address {}:{}",
            resources.config.host, resources.config.http_port
        )
    })?;

    let app = build_router(resources);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix_signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
