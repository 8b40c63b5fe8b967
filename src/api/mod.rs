use crate::api::rate_limit::{IpKeyExtractor, log_rate_limit_events};
use crate::config::{AuthConfig, Config};
use crate::services::health_service::HealthService;
use crate::services::message_service::MessageService;
use axum::body::Body;
use axum::http::{HeaderName, Method, Request, header};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod health;
pub mod messages;
pub mod middleware;
pub mod rate_limit;
pub mod schemas;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: AuthConfig,
    pub message_service: MessageService,
    pub rate_limit_metrics: rate_limit::Metrics,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub message_service: MessageService,
}

/// Configures and returns the public API router.
///
/// # Panics
/// Panics if the rate limiter configuration cannot be constructed.
pub fn app_router(config: &Config, services: ServiceContainer) -> Router {
    let interval_ns = 1_000_000_000 / config.rate_limit.per_second.max(1);
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_nanosecond(u64::from(interval_ns))
            .burst_size(config.rate_limit.burst.max(1))
            .key_extractor(IpKeyExtractor::new(config.server.trusted_proxies.clone()))
            .finish()
            .expect("Failed to build rate limiter config"),
    );

    let state = AppState {
        auth: config.auth.clone(),
        message_service: services.message_service,
        rate_limit_metrics: rate_limit::Metrics::new(),
    };

    // `/messages/conversations` and `/messages/unread/count` take priority over the `{userId}` capture.
    let message_routes = Router::new()
        .route("/messages", post(messages::send_message))
        .route("/messages/conversations", get(messages::list_conversations))
        .route("/messages/unread/count", get(messages::unread_count))
        .route("/messages/{userId}", get(messages::list_thread))
        .layer(GovernorLayer::new(governor_conf));

    let cors = CorsLayer::new()
        .allow_origin(config.server.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .nest("/api/v1", message_routes)
        .layer(from_fn_with_state(state.clone(), log_rate_limit_events))
        .layer(cors)
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .and_then(|id| id.header_value().to_str().ok())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                        "user_id" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        let status = response.status();
                        span.record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(HeaderName::from_static("x-request-id"), middleware::MakeRequestUuidV7))
        .with_state(state)
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new().route("/livez", get(health::livez)).route("/readyz", get(health::readyz)).with_state(state)
}
