//! Server module
//!
//! Accepts TCP connections for the line protocol and spawns one task per
//! connection. All request processing goes through the store engine's lock;
//! the server itself holds no state.

mod connection;

use crate::store::StoreEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

pub use connection::{apply, Connection};

/// Run the line-protocol server
///
/// Binds the TCP listener on the given address and processes incoming
/// connections until the process stops.
pub async fn run(addr: &str, engine: Arc<StoreEngine>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Line-protocol server listening on {}", addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("New connection from {}", peer);

        let engine = engine.clone();
        tokio::spawn(async move {
            let mut connection = Connection::new(socket);

            if let Err(e) = connection.handle(engine).await {
                error!("Connection error from {}: {}", peer, e);
            }

            info!("Connection closed: {}", peer);
        });
    }
}
