use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
};
use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};
use crates::infra::{
    db::postgres::postgres_connection::PgPoolSquad,
    storages::{lazy_bucket::LazyObjectStorage, s3_bucket::S3BucketStorage},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Route table without transport layers. `candidates` carries `/upload` and
/// `/addcandidate`.
pub fn app(candidates: Router) -> Router {
    Router::new()
        .route("/", get(default_routers::root))
        .merge(routers::diagnostics::routes())
        .merge(candidates)
        .fallback(default_routers::not_found)
}

pub async fn start(
    config: Arc<DotEnvyConfig>,
    db_pool: Arc<PgPoolSquad>,
    object_storage: Arc<LazyObjectStorage<S3BucketStorage>>,
) -> Result<()> {
    let app = app(routers::candidates::routes(
        Arc::clone(&db_pool),
        Arc::clone(&object_storage),
    ))
    // Uploads are bounded by RequestBodyLimitLayer below, not axum's 2 MB default.
    .layer(DefaultBodyLimit::disable())
    .layer(TimeoutLayer::new(Duration::from_secs(
        config.backend_server.timeout,
    )))
    .layer(RequestBodyLimitLayer::new(body_limit_bytes(
        config.backend_server.body_limit,
    )?))
    .layer(
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE])
            .allow_origin(Any),
    )
    .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Converts the configured limit in MiB to bytes.
fn body_limit_bytes(limit_mib: u64) -> Result<usize> {
    limit_mib
        .checked_mul(1024 * 1024)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .with_context(|| format!("SERVER_BODY_LIMIT of {} MiB is too large", limit_mib))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_limit_is_converted_from_mib() {
        assert_eq!(body_limit_bytes(100).unwrap(), 100 * 1024 * 1024);
        assert_eq!(body_limit_bytes(0).unwrap(), 0);
    }

    #[test]
    fn oversized_body_limit_is_an_error() {
        let err = body_limit_bytes(u64::MAX).unwrap_err();

        assert!(err.to_string().contains("SERVER_BODY_LIMIT"));
    }
}
