use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::directory::DeviceDirectory;
use crate::directory::DirectoryError;
use crate::session::ConnectivityMode;
use crate::session::GatePrompt;
use crate::session::ModeSession;
use crate::session::ProbeKick;

/// Response for the /v1/ping endpoint
#[derive(Serialize)]
struct PingResponse {
    status: String,
}

/// Response for the /v1/info endpoint
#[derive(Serialize)]
struct InfoResponse {
    version: String,
    hostname: String,
}

#[derive(Serialize)]
struct ModeResponse {
    mode: ConnectivityMode,
    hub_status: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct GateResponse {
    gate: GatePrompt,
}

#[derive(Deserialize)]
struct DevicesQuery {
    user: String,
}

#[derive(Deserialize)]
struct SwitchRequest {
    target: ConnectivityMode,
    user: String,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: &'static str,
    pub session: Arc<ModeSession>,
    pub directory: Arc<DeviceDirectory>,
    pub probe: Option<ProbeKick>,
}

/// Handler for GET /v1/ping
#[tracing::instrument(skip_all)]
async fn ping() -> impl IntoResponse {
    tracing::debug!("Handling /v1/ping request");
    (
        StatusCode::OK,
        Json(PingResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Handler for GET /v1/info
#[tracing::instrument(skip(state))]
async fn info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    (
        StatusCode::OK,
        Json(InfoResponse {
            version: state.version.to_string(),
            hostname,
        }),
    )
}

/// Handler for GET /v1/mode
async fn mode(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ModeResponse {
            mode: state.session.mode(),
            hub_status: state.session.hub_status().to_string(),
        }),
    )
}

/// Handler for GET /v1/devices
///
/// While the gate is up (Home mode, hub unreachable) this refuses to serve
/// stale data and returns the retry/switch choice instead.
async fn devices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DevicesQuery>,
) -> axum::response::Response {
    if let Some(gate) = state.session.gate_prompt() {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(GateResponse { gate })).into_response();
    }

    let mode = state.session.mode();
    match state.directory.fetch_devices(&query.user, mode).await {
        Ok(devices) => (StatusCode::OK, Json(devices)).into_response(),
        Err(DirectoryError::ConnectionUnavailable(reason)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse { error: reason }),
        )
            .into_response(),
    }
}

/// Handler for POST /v1/mode/switch
async fn switch_mode(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SwitchRequest>,
) -> impl IntoResponse {
    let availability = state
        .session
        .switch_mode(request.target, &request.user)
        .await;
    let status = if availability.available {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };
    (status, Json(availability))
}

/// Handler for POST /v1/hub/probe, the gate's "retry" choice.
async fn retry_probe(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.probe {
        Some(probe) => {
            probe.kick();
            StatusCode::ACCEPTED
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// Create the API router with all endpoints
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/ping", get(ping))
        .route("/v1/info", get(info))
        .route("/v1/mode", get(mode))
        .route("/v1/mode/switch", post(switch_mode))
        .route("/v1/devices", get(devices))
        .route("/v1/hub/probe", post(retry_probe))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server
///
/// Binds the UI-facing endpoints and runs until the provided shutdown signal
/// is triggered.
pub async fn serve(
    listen: String,
    port: u16,
    state: Arc<AppState>,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", listen, port).parse()?;
    tracing::info!("Starting HTTP API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            tracing::info!("HTTP API server shutting down gracefully");
        })
        .await?;

    Ok(())
}
