//! HTTP API gateway for mcplink.
//!
//! - `GET /`: welcome message
//! - `GET /tools`: names of every tool the configured MCP servers provide
//! - `POST /chat`: one stateless agent turn, aggregated or streamed as text
//!
//! Every request builds its own executor, so requests share nothing.

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::StreamExt;
use mcplink_agent::AgentFactory;
use mcplink_config::{AppConfig, GatewayConfig};
use mcplink_core::AgentInput;
use mcplink_relay::{Aggregator, ChannelSink, RelayError, Surface, parse_response, relay};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, error, info, warn};

const BODY_LIMIT: usize = 1024 * 1024;
const STREAM_BUFFER: usize = 64;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub factory: Arc<dyn AgentFactory>,
    pub aggregator: Aggregator,
}

type SharedState = Arc<GatewayState>;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub streaming: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { detail: detail.into() }))
}

/// Build the router with every route and layer applied.
pub fn build_router(state: SharedState, gateway: &GatewayConfig) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/tools", get(tools_handler))
        .route("/chat", post(chat_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors_layer(&gateway.cors_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Permissive unless origins are configured; unparsable origins are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Start the gateway HTTP server and run until Ctrl-C.
pub async fn start(config: &AppConfig, factory: Arc<dyn AgentFactory>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(GatewayState {
        factory,
        aggregator: Aggregator::new(config.agent.strip_newlines),
    });
    let app = build_router(state, &config.gateway);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, servers = config.mcp_servers.len(), "Gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down gateway");
        })
        .await?;
    Ok(())
}

// --- Handlers ---

async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Welcome to the MCP REST API" }))
}

async fn tools_handler(State(state): State<SharedState>) -> Result<Json<Vec<String>>, ApiError> {
    match state.factory.tool_names().await {
        Ok(names) => Ok(Json(names)),
        Err(e) => {
            error!(error = %e, "Tool listing failed");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error fetching tools: {e}"),
            ))
        }
    }
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let streaming = payload.streaming.unwrap_or(false);
    let Some(message) = payload.message.filter(|m| !m.is_empty()) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Message content is required"));
    };

    info!(message_len = message.len(), streaming, "Chat request");

    let executor = state.factory.executor().await.map_err(|e| {
        error!(error = %e, "Could not build agent executor");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error processing chat: {e}"),
        )
    })?;
    let chunks = executor.stream(AgentInput::single(message));

    if !streaming {
        let text = state.aggregator.collect(chunks).await;
        return Ok(Json(parse_response(&text)).into_response());
    }

    let (tx, rx) = mpsc::channel::<String>(STREAM_BUFFER);
    tokio::spawn(async move {
        let mut sink = ChannelSink::new(tx);
        match relay(chunks, &mut sink, Surface::Rest).await {
            Ok(_) => debug!("Streamed chat response complete"),
            Err(RelayError::Sink(_)) => debug!("Client went away mid-stream"),
            Err(e) => error!(error = %e, "Streamed chat response truncated"),
        }
    });

    let body = Body::from_stream(ReceiverStream::new(rx).map(Ok::<_, Infallible>));
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response())
}
