//! Relay HTTP service: forwards chat turns to the inference gateway.
//!
//! Stateless per request. Failures collapse to `{ "error": "..." }` with a
//! non-2xx status; upstream details are logged, never returned.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::{Config, RELAY_ROUTE};
use crate::error::GatewayError;
use crate::gateway::GatewayClient;
use crate::relay::protocol::{RelayErrorBody, RelayRequest, RelayResponse};

const NOT_CONFIGURED_MESSAGE: &str = "AI gateway is not configured";
const UPSTREAM_ERROR_MESSAGE: &str = "AI API error";

#[derive(Clone)]
pub struct RelayState {
    gateway: Arc<GatewayClient>,
}

impl RelayState {
    #[must_use]
    pub fn new(gateway: GatewayClient) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayOptions {
    pub host: String,
    pub port: u16,
}

impl RelayOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.host(),
            port: config.port(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    model: String,
    configured: bool,
}

/// Start the relay server and serve until the listener fails.
pub async fn run_relay_server(config: Config, options: RelayOptions) -> Result<()> {
    if options.port == 0 {
        bail!("Port must be > 0");
    }
    let gateway = GatewayClient::new(&config).context("Failed to build gateway client")?;
    if !gateway.has_credential() {
        tracing::warn!("no gateway API key configured; chat requests will fail until one is set");
    }
    let app = build_router(RelayState::new(gateway));

    let addr: SocketAddr = format!("{}:{}", options.host, options.port)
        .parse()
        .with_context(|| format!("Invalid bind address '{}:{}'", options.host, options.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("relay listening on http://{addr}{RELAY_ROUTE}");
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow!("Relay server error: {e}"))
}

pub fn build_router(state: RelayState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(RELAY_ROUTE, post(agent_chat))
        .layer(cors_layer())
        .with_state(state)
}

async fn health(State(state): State<RelayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "vibecode-relay",
        model: state.gateway.model().to_string(),
        configured: state.gateway.has_credential(),
    })
}

async fn agent_chat(
    State(state): State<RelayState>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<RelayResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let request_id = uuid::Uuid::new_v4();
    tracing::info!(
        %request_id,
        messages = request.messages.len(),
        "processing agent request"
    );

    let message = state
        .gateway
        .complete(&request.messages, &request.file_tree)
        .await
        .map_err(|err| map_gateway_err(request_id, err))?;

    tracing::info!(%request_id, "agent response generated");
    Ok(Json(RelayResponse {
        message,
        actions: Vec::new(),
    }))
}

fn map_gateway_err(request_id: uuid::Uuid, err: GatewayError) -> ApiError {
    tracing::error!(%request_id, category = ?err.category(), error = %err, "agent request failed");
    match err {
        GatewayError::MissingCredential => ApiError::internal(NOT_CONFIGURED_MESSAGE),
        GatewayError::Upstream { .. }
        | GatewayError::Network(_)
        | GatewayError::MalformedResponse(_) => ApiError::internal(UPSTREAM_ERROR_MESSAGE),
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static("content-type"),
        ])
}

#[derive(Debug, Clone)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(RelayErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
