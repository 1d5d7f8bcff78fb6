//! CommandDispatcher — outbound requests to the host process.
//!
//! Commands are addressed by name: `POST {base}/{command}` with a JSON body,
//! resolving with the parsed JSON response.  The response shape is a contract
//! the host owns; the panel does not validate it.  Failures reject — the
//! dispatcher itself never retries and never logs, callers decide whether to
//! surface or swallow.
//!
//! Simulation mode lets the panel run without a live host: when enabled and
//! the caller supplies a canned response, the dispatcher resolves with that
//! value after a fixed delay and never touches the network.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use garage_proto::protocol::Command;

/// Fixed latency applied to canned responses in simulation mode.
pub const SIMULATED_LATENCY: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request failed at the transport layer (connect, send, read).
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    /// The host answered but the body was not valid JSON.
    #[error("protocol: {0}")]
    Protocol(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct CommandDispatcher {
    client: reqwest::Client,
    base_url: String,
    simulate: bool,
}

impl CommandDispatcher {
    pub fn new(base_url: impl Into<String>, simulate: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            simulate,
        }
    }

    /// Send a raw command by name.  `canned` is only honoured in simulation
    /// mode; otherwise the request always goes out to the host.
    pub async fn send(
        &self,
        command: &str,
        payload: Option<Value>,
        canned: Option<Value>,
    ) -> Result<Value, DispatchError> {
        if self.simulate {
            if let Some(value) = canned {
                tokio::time::sleep(SIMULATED_LATENCY).await;
                return Ok(value);
            }
        }

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), command);
        let body = payload.unwrap_or(Value::Null);
        let response = self.client.post(&url).json(&body).send().await?;
        let text = response.text().await?;
        let value: Value = serde_json::from_str(&text)?;
        Ok(value)
    }

    /// Send a typed command.
    pub async fn send_command(&self, cmd: &Command) -> Result<Value, DispatchError> {
        self.send(cmd.name(), cmd.payload(), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_canned_response_resolves_after_fixed_delay() {
        let dispatcher = CommandDispatcher::new("http://127.0.0.1:1", true);
        let canned = serde_json::json!({ "ok": true });

        let started = tokio::time::Instant::now();
        let value = dispatcher
            .send("driveVehicle", None, Some(canned.clone()))
            .await
            .unwrap();
        assert_eq!(value, canned);
        assert_eq!(started.elapsed(), SIMULATED_LATENCY);
    }

    #[tokio::test]
    async fn test_canned_response_ignored_outside_simulation() {
        // Not in simulation mode, so the canned value must not short-circuit;
        // port 1 refuses connections, so the call fails at transport level.
        let dispatcher = CommandDispatcher::new("http://127.0.0.1:1", false);
        let err = dispatcher
            .send("closeUI", None, Some(serde_json::json!({ "ok": true })))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Transport(_)));
    }

    #[tokio::test]
    async fn test_non_json_response_is_protocol_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let _ = stream
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-length: 8\r\n\r\nnot json",
                )
                .await;
        });

        let dispatcher = CommandDispatcher::new(format!("http://{}", addr), false);
        let err = dispatcher.send("driveVehicle", None, None).await.unwrap_err();
        assert!(matches!(err, DispatchError::Protocol(_)));
    }
}
