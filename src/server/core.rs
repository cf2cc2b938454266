use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::client::handle_client;
use crate::config::ServerConfig;
use crate::protocol::Response;
use crate::server::ServerContext;

pub struct Server {
    listener: TcpListener,
    context: Arc<ServerContext>,
    slots: Arc<Semaphore>,
    max_clients: usize,
}

impl Server {
    pub async fn new(config: &ServerConfig, context: ServerContext) -> std::io::Result<Self> {
        let socket = config.control_socket();
        let listener = TcpListener::bind(&socket).await?;
        info!("Server bound to {}", listener.local_addr()?);
        info!("Server root directory: {}", context.root().display());

        Ok(Self {
            listener,
            context: Arc::new(context),
            slots: Arc::new(Semaphore::new(config.max_clients)),
            max_clients: config.max_clients,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, one task per client.
    pub async fn start(&self) {
        info!(
            "Starting RAX SFTP server on {} (max {} clients)",
            self.local_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
            self.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let context = Arc::clone(&self.context);
                    let slots = Arc::clone(&self.slots);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        handle_new_client(stream, addr, context, slots).await;
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Takes a session slot, or turns the client away when none is free.
async fn handle_new_client(
    mut stream: TcpStream,
    client_addr: SocketAddr,
    context: Arc<ServerContext>,
    slots: Arc<Semaphore>,
) {
    let Ok(_permit) = slots.try_acquire_owned() else {
        warn!("Rejecting client {}: too many connections", client_addr);
        let busy = Response::error("Too many connections, try again later");
        if let Err(e) = stream.write_all(&busy.encode()).await {
            warn!("Failed to notify client {}: {}", client_addr, e);
        }
        return;
    };

    info!("Client connected: {}", client_addr);
    match handle_client(stream, client_addr.to_string(), &context).await {
        Ok(()) => info!("Session with {} ended", client_addr),
        Err(e) => warn!("Session with {} ended abnormally: {}", client_addr, e),
    }
}
