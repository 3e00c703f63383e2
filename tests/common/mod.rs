//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use edge_gate::config::EdgeConfig;

/// Request heads seen by a mock backend, in arrival order.
pub type Seen = Arc<Mutex<Vec<String>>>;

/// Start a mock backend on an ephemeral port that records each request head
/// and answers with a fixed status and body.
pub async fn start_recording_backend(status_line: &'static str, body: &'static str) -> (SocketAddr, Seen) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let log = log.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        log.lock().unwrap().push(head);

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_line,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, seen)
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// A config pointing both upstreams at the given mock backends.
pub fn config_with(app: SocketAddr, links: SocketAddr) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.app.upstream_url = format!("http://{}", app);
    config.backend.base_url = Some(format!("http://{}/api", links));
    config.observability.metrics_enabled = false;
    config
}

/// URL-encoded `user_data` cookie value for a role.
pub fn user_data(role: &str) -> String {
    urlencoding::encode(&format!(r#"{{"id":1,"role":"{role}"}}"#)).into_owned()
}

/// Cookie header for a signed-in visitor.
pub fn session_cookie(role: &str) -> String {
    format!("auth_token=jwt; user_data={}", user_data(role))
}
