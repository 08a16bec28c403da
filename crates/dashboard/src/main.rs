mod analyze;
mod cli;
mod config;
mod events;
mod runtime;
mod state;

use crate::cli::Args;
use crate::config::{load_dashboard_config, resolve_analyze_config, resolve_reveal_config};
use crate::events::DashboardEvent;
use crate::runtime::spawn_session_worker;
use crate::state::{DashboardState, SessionCommand, SessionView};
use anyhow::Context;
use axum::body::Body;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::{Json, Router};
use clap::Parser;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Clone)]
struct AppState {
    state: Arc<RwLock<DashboardState>>,
    event_tx: broadcast::Sender<DashboardEvent>,
    command_tx: mpsc::Sender<SessionCommand>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_to_stderr)?;

    info!(
        listen_addr = %args.listen_addr,
        config = %args.config.display(),
        "dashboard starting"
    );
    let config = load_dashboard_config(&args.config)
        .with_context(|| format!("failed to load config {}", args.config.display()))?;
    let analyze = resolve_analyze_config(&config, args.api_base_url.clone());
    let reveal = resolve_reveal_config(&config);
    if analyze.base_url.is_none() {
        warn!("analysis api base url not configured; submissions will fail until it is set");
    }

    let shutdown = CancellationToken::new();
    let shared_state = Arc::new(RwLock::new(DashboardState::new()));
    let (event_tx, _) = broadcast::channel(512);
    let (command_tx, worker) = spawn_session_worker(
        Arc::clone(&shared_state),
        analyze,
        reveal,
        shutdown.clone(),
        event_tx.clone(),
    );
    let app_state = AppState {
        state: Arc::clone(&shared_state),
        event_tx: event_tx.clone(),
        command_tx,
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/form", get(get_form))
        .route("/form/field", post(set_form_field))
        .route("/analyze", post(submit_analysis))
        .route("/session", get(get_session))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
        .layer(middleware::from_fn(log_http_request));

    let listener = TcpListener::bind(&args.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", args.listen_addr))?;
    info!(addr = %args.listen_addr, "dashboard listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown(shutdown.clone()))
        .await?;
    info!("dashboard shutting down");
    shutdown.cancel();
    let _ = worker.await;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn log_http_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    let status = response.status();
    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        "http request"
    );
    response
}

async fn get_form(State(state): State<AppState>) -> Json<BTreeMap<String, String>> {
    let state = state.state.read().await;
    Json(state.form_entries())
}

async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    let state = state.state.read().await;
    Json(state.session_view())
}

#[derive(Deserialize)]
struct SetFieldPayload {
    field: String,
    value: String,
}

#[derive(serde::Serialize)]
struct ActionResponse {
    message: String,
}

async fn set_form_field(
    State(state): State<AppState>,
    Json(payload): Json<SetFieldPayload>,
) -> Result<Json<ActionResponse>, StatusCode> {
    let updated = {
        let mut guard = state.state.write().await;
        guard.set_field(&payload.field, payload.value)
    };
    if !updated {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(ActionResponse {
        message: "field updated".to_string(),
    }))
}

async fn submit_analysis(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>, StatusCode> {
    // one analysis in flight at a time; the UI disables submit on 409
    if state.state.read().await.is_pending() {
        return Err(StatusCode::CONFLICT);
    }
    state
        .command_tx
        .send(SessionCommand::Submit)
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(ActionResponse {
        message: "analysis queued".to_string(),
    }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: AppState) {
    let session = {
        let state = state.state.read().await;
        state.session_view()
    };
    if send_ws_event(&mut socket, DashboardEvent::SessionSnapshot { session })
        .await
        .is_err()
    {
        return;
    }

    let mut rx = state.event_tx.subscribe();
    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        if send_ws_event(&mut socket, event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }
}

async fn send_ws_event(socket: &mut WebSocket, event: DashboardEvent) -> Result<(), axum::Error> {
    let payload = match serde_json::to_string(&event) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(error = %err, "failed to serialize websocket event");
            return Ok(());
        }
    };
    socket.send(Message::Text(payload)).await
}

fn init_tracing(log_to_stderr: bool) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    );
    if log_to_stderr {
        builder.with_writer(std::io::stderr).init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn wait_for_shutdown(shutdown: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
    shutdown.cancel();
}
