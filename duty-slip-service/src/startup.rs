//! Application startup and lifecycle management.

use crate::config::DutyConfig;
use crate::handlers;
use crate::services::{init_metrics, RateClient};
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: DutyConfig,
    pub rate_client: Arc<RateClient>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/rates",
            get(handlers::list_rates).post(handlers::create_rate),
        )
        .route("/rates/plans", get(handlers::list_plans))
        .route(
            "/rates/:id",
            patch(handlers::update_rate).delete(handlers::delete_rate),
        )
        .route("/duty-slips", post(handlers::create_duty_slip))
        .route("/duty-slips/settle", post(handlers::settle_duty_slip))
        .route("/duty-slips/:id", patch(handlers::update_duty_slip))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: DutyConfig) -> Result<Self, AppError> {
        init_metrics();

        let rate_client = RateClient::new(&config.rate_api).map_err(|e| {
            tracing::error!(error = %e, "Failed to create rate API client");
            AppError::from(e)
        })?;

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port = port,
            rate_api = %config.rate_api.base_url,
            "Duty slip service listener bound"
        );

        let state = AppState {
            config,
            rate_client: Arc::new(rate_client),
        };

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Run until `shutdown` resolves, then finish in-flight requests.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(
            service = "duty-slip-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateApiConfig;
    use crate::services::SettlementPolicy;
    use axum::{body::Body, http::Request, http::StatusCode};
    use service_core::config::Config as CoreConfig;
    use tower::util::ServiceExt;

    fn router() -> Router {
        let config = DutyConfig {
            common: CoreConfig { port: 0 },
            service_name: "duty-slip-service".to_string(),
            log_level: "warn".to_string(),
            otlp_endpoint: None,
            rate_api: RateApiConfig {
                base_url: "http://127.0.0.1:1".to_string(),
                timeout_secs: 1,
            },
            settlement: SettlementPolicy::default(),
        };
        let rate_client = RateClient::new(&config.rate_api).unwrap();

        build_router(AppState {
            config,
            rate_client: Arc::new(rate_client),
        })
    }

    #[tokio::test]
    async fn health_needs_no_upstream() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn malformed_draft_is_rejected_before_any_upstream_call() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/duty-slips/settle")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"closingkm": "lots"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = router()
            .oneshot(Request::builder().uri("/invoices").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
