//! Push socket — streams framed pushes to every connected panel.
//!
//! Panels only read on this connection; commands come back over HTTP.  On
//! connect each client gets an openUI snapshot so a freshly started panel
//! shows the garage immediately.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use garage_proto::protocol::HostPush;

use crate::world::WorldHandle;

pub fn start_server(
    bind_address: String,
    port: u16,
    world: WorldHandle,
    push_tx: broadcast::Sender<HostPush>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let addr = format!("{}:{}", bind_address, port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind push socket {}: {}", addr, e);
                return;
            }
        };
        info!("push socket listening at {}", addr);

        let mut client_id = 0usize;
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    client_id += 1;
                    let id = client_id;
                    info!("panel {} connected from {}", id, peer);

                    let world = world.clone();
                    let push_rx = push_tx.subscribe();
                    tokio::spawn(async move {
                        handle_client(stream, world, id, push_rx).await;
                        info!("panel {} disconnected", id);
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    })
}

async fn handle_client(
    stream: TcpStream,
    world: WorldHandle,
    client_id: usize,
    mut push_rx: broadcast::Receiver<HostPush>,
) {
    let (mut read_half, mut write_half) = stream.into_split();
    let mut tmp = [0u8; 256];

    // Greet with the current snapshot.
    let open = HostPush::OpenUi(world.read().await.snapshot());
    match open.encode() {
        Ok(frame) => {
            if write_half.write_all(&frame).await.is_err() {
                return;
            }
        }
        Err(e) => {
            error!("failed to encode snapshot: {}", e);
            return;
        }
    }

    loop {
        tokio::select! {
            // Panels never write; a read here only detects the close.
            result = read_half.read(&mut tmp) => {
                match result {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
            push = push_rx.recv() => {
                match push {
                    Ok(push) => {
                        let frame = match push.encode() {
                            Ok(f) => f,
                            Err(e) => {
                                error!("failed to encode push: {}", e);
                                continue;
                            }
                        };
                        if write_half.write_all(&frame).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("panel {} lagged by {} pushes", client_id, n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}
