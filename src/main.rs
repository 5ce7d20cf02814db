use rover_server::{host, CommandServer, LoggingActuator, ServerConfig};
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = ServerConfig::default();
    let server = CommandServer::bind(config, Arc::new(LoggingActuator)).await?;
    let port = server.local_addr()?.port();

    let server_ip = match host::local_ip().await {
        Some(ip) => ip.to_string(),
        None => "localhost".to_string(),
    };

    info!("Rover command server starting");
    info!("  Server IP: {}", server_ip);
    info!("  Port: {}", port);
    info!("  WebSocket URL: {}", host::websocket_url(&server_ip, port));

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("Server stopped");
    println!("Server stopped");
    Ok(())
}
