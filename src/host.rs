//! Host network helpers for the startup banner

use std::net::IpAddr;
use tokio::net::UdpSocket;

/// Best-effort LAN address of this host
///
/// Connecting a UDP socket only selects a route; nothing is sent.
pub async fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").await.ok()?;
    socket.connect("8.8.8.8:80").await.ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}

/// URL clients should connect to
pub fn websocket_url(host: &str, port: u16) -> String {
    format!("ws://{}:{}", host, port)
}
