//! TCP connection to the host's push socket.
//!
//! The host pushes length-prefixed JSON frames; this side only reads.  The
//! reader runs as a task feeding the App's channel and reconnects forever,
//! so a host restart just shows up as a Disconnected/Connected pair.

use std::time::Duration;

use serde_json::Value;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use garage_proto::protocol::frame_len;

use crate::app::AppMessage;

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

pub struct HostConnection {
    stream: TcpStream,
    read_buffer: Vec<u8>,
}

impl HostConnection {
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        Ok(Self {
            stream,
            read_buffer: Vec::with_capacity(4096),
        })
    }

    /// Read until at least one full frame is buffered.  `Ok(None)` means the
    /// host closed the connection.
    pub async fn receive(&mut self) -> anyhow::Result<Option<Value>> {
        loop {
            if let Some(value) = self.try_decode() {
                return Ok(Some(value));
            }
            let mut buf = vec![0u8; 4096];
            match self.stream.read(&mut buf).await {
                Ok(0) => return Ok(None),
                Ok(n) => self.read_buffer.extend_from_slice(&buf[..n]),
                Err(e) => return Err(anyhow::anyhow!("Read error: {}", e)),
            }
        }
    }

    fn try_decode(&mut self) -> Option<Value> {
        // Only a short buffer means "keep reading".  A complete frame whose
        // body fails to parse is consumed and skipped, so one corrupt frame
        // cannot wedge every push behind it.
        loop {
            let total = frame_len(&self.read_buffer)?;
            let parsed: Result<Value, _> = serde_json::from_slice(&self.read_buffer[4..total]);
            self.read_buffer.drain(..total);
            match parsed {
                Ok(value) => return Some(value),
                Err(e) => warn!(%e, "skipping corrupt push frame"),
            }
        }
    }
}

/// Reader task: connect, forward pushes, reconnect on any failure.
/// Stops when the App side drops its receiver.
pub async fn run_reader(address: String, tx: mpsc::Sender<AppMessage>) {
    loop {
        match HostConnection::connect(&address).await {
            Ok(mut conn) => {
                debug!(%address, "connected to host push socket");
                if tx.send(AppMessage::Connected).await.is_err() {
                    return;
                }
                loop {
                    match conn.receive().await {
                        Ok(Some(value)) => {
                            if tx.send(AppMessage::HostPush(value)).await.is_err() {
                                return;
                            }
                        }
                        Ok(None) => {
                            debug!("host closed push connection");
                            break;
                        }
                        Err(e) => {
                            warn!(%e, "push connection error");
                            break;
                        }
                    }
                }
                if tx.send(AppMessage::Disconnected).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                debug!(%e, "host not reachable, retrying");
            }
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garage_proto::protocol::HostPush;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_receive_reassembles_split_frames() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let frame = HostPush::CloseUi.encode().unwrap();
            // Split mid-frame to force buffering.
            stream.write_all(&frame[..3]).await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
            stream.write_all(&frame[3..]).await.unwrap();
        });

        let mut conn = HostConnection::connect(&addr.to_string()).await.unwrap();
        let value = conn.receive().await.unwrap().unwrap();
        assert_eq!(value, serde_json::json!({ "type": "closeUI" }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_receive_yields_each_frame_from_one_read() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut bytes = HostPush::CloseUi.encode().unwrap();
            bytes.extend(
                HostPush::UpdateVehicles { vehicles: vec![] }
                    .encode()
                    .unwrap(),
            );
            stream.write_all(&bytes).await.unwrap();
        });

        let mut conn = HostConnection::connect(&addr.to_string()).await.unwrap();
        let first = conn.receive().await.unwrap().unwrap();
        let second = conn.receive().await.unwrap().unwrap();
        assert_eq!(first["type"], "closeUI");
        assert_eq!(second["type"], "updateVehicles");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_receive_skips_corrupt_frame() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            // Framing is intact but the body is not JSON.
            let body = b"not json at all";
            let mut bytes = (body.len() as u32).to_be_bytes().to_vec();
            bytes.extend_from_slice(body);
            bytes.extend(HostPush::CloseUi.encode().unwrap());
            stream.write_all(&bytes).await.unwrap();
        });

        let mut conn = HostConnection::connect(&addr.to_string()).await.unwrap();
        let value = conn.receive().await.unwrap().unwrap();
        assert_eq!(value["type"], "closeUI");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_receive_reports_clean_close() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        let mut conn = HostConnection::connect(&addr.to_string()).await.unwrap();
        assert!(conn.receive().await.unwrap().is_none());
    }
}
