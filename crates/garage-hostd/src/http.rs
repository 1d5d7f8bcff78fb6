//! Command surface — `POST /:command` with a JSON body.
//!
//! Mirrors what panels expect: the route path is the command name and the
//! response is a small JSON acknowledgement.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::core::HostEvent;

const KNOWN_COMMANDS: &[&str] = &["driveVehicle", "closeUI"];

#[derive(Clone)]
struct HttpState {
    event_tx: mpsc::Sender<HostEvent>,
}

#[derive(Serialize)]
struct Ack {
    ok: bool,
}

pub fn start_server(
    bind_address: String,
    port: u16,
    event_tx: mpsc::Sender<HostEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let app = Router::new()
            .route("/:command", post(handle_command))
            .with_state(HttpState { event_tx });

        let addr = format!("{}:{}", bind_address, port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind command server to {}: {}", addr, e);
                return;
            }
        };
        info!("command server listening on http://{}", addr);

        if let Err(e) = axum::serve(listener, app).await {
            error!("command server error: {}", e);
        }
    })
}

async fn handle_command(
    State(state): State<HttpState>,
    Path(command): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Ack>, StatusCode> {
    if !KNOWN_COMMANDS.contains(&command.as_str()) {
        debug!(%command, "unknown command");
        return Err(StatusCode::NOT_FOUND);
    }

    state
        .event_tx
        .send(HostEvent::Command {
            name: command,
            payload,
        })
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    Ok(Json(Ack { ok: true }))
}
