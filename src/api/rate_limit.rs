//! Per-client request throttling

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    middleware,
    response::Response,
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::{config::RateLimitConfig, error::ErrorResponse};

const TOO_MANY_REQUESTS: &str = "too many request in a given period";

/// Wrap the router in a per-peer-IP limiter when enabled.
/// Requires the server to be started with connect info.
pub fn apply(router: Router, config: &RateLimitConfig) -> Router {
    if !config.enabled {
        tracing::info!("Rate limiting disabled");
        return router;
    }

    let Some(governor) = GovernorConfigBuilder::default()
        .per_second(config.replenish_seconds.max(1))
        .burst_size(config.burst_size.max(1))
        .finish()
    else {
        tracing::warn!("Invalid rate limit settings, rate limiting disabled");
        return router;
    };

    tracing::info!(
        "Rate limiting: burst {} requests, one slot back every {}s",
        config.burst_size,
        config.replenish_seconds
    );

    router
        .layer(GovernorLayer {
            // the layer borrows its config for the lifetime of the server
            config: Box::leak(Box::new(governor)),
        })
        .layer(middleware::map_response(rewrite_rejection))
}

/// Replace the limiter's plain-text rejection with the usual JSON error body
async fn rewrite_rejection(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    let body = serde_json::to_vec(&ErrorResponse {
        message: TOO_MANY_REQUESTS.to_string(),
    })
    .unwrap_or_default();

    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    parts
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Response::from_parts(parts, Body::from(body))
}
