//! End-to-end tests using a real WebSocket client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use rover_server::{CommandServer, ConnectionRegistry, LoggingActuator, ServerConfig};
use serde_json::{json, Value};
use tokio::sync::oneshot;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

struct TestServer {
    url: String,
    registry: Arc<ConnectionRegistry>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        timeout(TIMEOUT, self.handle)
            .await
            .expect("server did not stop")
            .unwrap()
            .unwrap();
    }
}

/// Boot a server on an ephemeral port
async fn boot_server(config: ServerConfig) -> TestServer {
    let config = ServerConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        ..config
    };
    let server = CommandServer::bind(config, Arc::new(LoggingActuator))
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    let registry = server.registry();

    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(server.run_until(async {
        let _ = rx.await;
    }));

    TestServer {
        url: format!("ws://{addr}"),
        registry,
        shutdown: Some(tx),
        handle,
    }
}

async fn connect(server: &TestServer) -> WsStream {
    let (ws, _) = timeout(TIMEOUT, connect_async(server.url.as_str()))
        .await
        .expect("connect timed out")
        .expect("connect failed");
    ws
}

async fn send_json(ws: &mut WsStream, value: Value) {
    ws.send(Message::text(value.to_string())).await.unwrap();
}

async fn recv_json(ws: &mut WsStream) -> Value {
    loop {
        let frame = timeout(TIMEOUT, ws.next())
            .await
            .expect("no reply within timeout")
            .expect("stream ended")
            .expect("read error");
        match frame {
            Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
            Message::Close(frame) => panic!("unexpected close: {:?}", frame),
            _ => continue,
        }
    }
}

async fn wait_for_count(registry: &ConnectionRegistry, expected: usize) {
    for _ in 0..250 {
        if registry.count().await == expected {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!(
        "registry count stuck at {} (expected {})",
        registry.count().await,
        expected
    );
}

fn command(name: &str, id: impl Into<Value>, data: Value) -> Value {
    json!({
        "command": name,
        "id": id.into(),
        "data": data,
        "timestamp": "2024-01-01T00:00:00Z",
    })
}

#[tokio::test]
async fn test_drill_speed_acknowledged() {
    let server = boot_server(ServerConfig::default()).await;
    let mut ws = connect(&server).await;

    send_json(&mut ws, command("DRILL_SPEED", "c1", json!({"speed": 50}))).await;
    let ack = recv_json(&mut ws).await;

    assert_eq!(ack["status"], "received");
    assert_eq!(ack["command_id"], "c1");
    let ts = ack["timestamp"].as_str().expect("timestamp is a string");
    assert!(ts.ends_with('Z'), "{}", ts);
    assert!(chrono_like(ts), "{}", ts);
    assert_eq!(ack.as_object().unwrap().len(), 3);

    ws.close(None).await.unwrap();
    server.stop().await;
}

/// `YYYY-MM-DDTHH:MM:SS.ffffffZ`
fn chrono_like(ts: &str) -> bool {
    let bytes = ts.as_bytes();
    ts.len() == 27 && bytes[4] == b'-' && bytes[10] == b'T' && bytes[19] == b'.'
}

#[tokio::test]
async fn test_garbage_gets_no_reply_and_connection_survives() {
    let server = boot_server(ServerConfig::default()).await;
    let mut ws = connect(&server).await;

    ws.send(Message::text("garbage")).await.unwrap();
    send_json(&mut ws, command("JOYSTICK_MOVE", "after", json!({"x": 0.1, "y": 0.2}))).await;

    let ack = recv_json(&mut ws).await;
    assert_eq!(ack["command_id"], "after");
    assert_eq!(server.registry.count().await, 1);

    ws.close(None).await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn test_unknown_command_acknowledged() {
    let server = boot_server(ServerConfig::default()).await;
    let mut ws = connect(&server).await;

    send_json(&mut ws, command("UNKNOWN_X", "c2", json!({}))).await;
    let ack = recv_json(&mut ws).await;
    assert_eq!(ack["status"], "received");
    assert_eq!(ack["command_id"], "c2");

    ws.close(None).await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn test_acks_follow_receipt_order() {
    let server = boot_server(ServerConfig::default()).await;
    let mut ws = connect(&server).await;

    for i in 0..10 {
        send_json(&mut ws, command("WHEEL_SPEED", i, json!({"wheel": "rear_right", "speed": i}))).await;
    }
    for i in 0..10 {
        assert_eq!(recv_json(&mut ws).await["command_id"], json!(i));
    }

    ws.close(None).await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn test_concurrent_clients_no_cross_talk() {
    let server = boot_server(ServerConfig::default()).await;
    let mut a = connect(&server).await;
    let mut b = connect(&server).await;
    wait_for_count(&server.registry, 2).await;

    send_json(&mut a, command("CAMERA_FEED", "from-a", json!({"camera": "front", "enabled": true}))).await;
    send_json(&mut b, command("AUTONOMOUS_MODE", "from-b", json!({"latitude": 1.5, "longitude": 2.5}))).await;

    assert_eq!(recv_json(&mut b).await["command_id"], "from-b");
    assert_eq!(recv_json(&mut a).await["command_id"], "from-a");

    a.close(None).await.unwrap();
    b.close(None).await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn test_registry_tracks_connections() {
    let server = boot_server(ServerConfig::default()).await;
    assert_eq!(server.registry.count().await, 0);

    let mut first = connect(&server).await;
    wait_for_count(&server.registry, 1).await;
    let second = connect(&server).await;
    wait_for_count(&server.registry, 2).await;

    first.close(None).await.unwrap();
    wait_for_count(&server.registry, 1).await;

    // abrupt disconnect without a close frame
    drop(second);
    wait_for_count(&server.registry, 0).await;

    server.stop().await;
}

#[tokio::test]
async fn test_missing_field_still_acknowledged() {
    let server = boot_server(ServerConfig::default()).await;
    let mut ws = connect(&server).await;

    send_json(&mut ws, command("WHEEL_SPEED", "w1", json!({"speed": 20}))).await;
    let ack = recv_json(&mut ws).await;
    assert_eq!(ack["status"], "received");
    assert_eq!(ack["command_id"], "w1");

    ws.close(None).await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn test_strict_acks_reject_invalid_payload() {
    let server = boot_server(ServerConfig {
        strict_acks: true,
        ..ServerConfig::default()
    })
    .await;
    let mut ws = connect(&server).await;

    send_json(&mut ws, command("WHEEL_SPEED", "w1", json!({"speed": 20}))).await;
    assert_eq!(recv_json(&mut ws).await["status"], "rejected");

    send_json(&mut ws, command("WHEEL_SPEED", "w2", json!({"wheel": "fl", "speed": 20}))).await;
    assert_eq!(recv_json(&mut ws).await["status"], "received");

    ws.close(None).await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn test_binary_frame_acknowledged() {
    let server = boot_server(ServerConfig::default()).await;
    let mut ws = connect(&server).await;

    let payload = command("DRILL_SPEED", "bin", json!({"speed": 5})).to_string();
    ws.send(Message::binary(payload.into_bytes())).await.unwrap();
    assert_eq!(recv_json(&mut ws).await["command_id"], "bin");

    ws.close(None).await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn test_idle_timeout_unregisters_connection() {
    let server = boot_server(ServerConfig {
        idle_timeout: Some(Duration::from_millis(100)),
        ..ServerConfig::default()
    })
    .await;
    let mut ws = connect(&server).await;

    // server closes the silent connection
    let closed = timeout(TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "connection was not closed");
    wait_for_count(&server.registry, 0).await;

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_clears_registry() {
    let server = boot_server(ServerConfig::default()).await;
    let _ws = connect(&server).await;
    wait_for_count(&server.registry, 1).await;

    let registry = server.registry.clone();
    server.stop().await;
    assert_eq!(registry.count().await, 0);
}
