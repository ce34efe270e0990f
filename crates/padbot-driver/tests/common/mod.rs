//! In-process stand-in for the robot's HTTP gateway.
//!
//! Serves `/health`, `/status` and `/navigation` over plain HTTP/1.1 with one
//! request per connection. Response codes and bodies can be changed while
//! the driver is polling.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use padbot_types::RobotStatus;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

struct RobotState {
    health_code: AtomicU16,
    status_code: AtomicU16,
    status_body: Mutex<String>,
    navigation_code: AtomicU16,
    navigations: Mutex<Vec<Value>>,
    requests: AtomicUsize,
}

pub struct FakeRobot {
    pub addr: SocketAddr,
    state: Arc<RobotState>,
    task: JoinHandle<()>,
}

impl FakeRobot {
    /// Bind an ephemeral port and start serving.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake robot");
        let addr = listener.local_addr().expect("local addr");
        let state = Arc::new(RobotState {
            health_code: AtomicU16::new(200),
            status_code: AtomicU16::new(200),
            status_body: Mutex::new("{}".to_string()),
            navigation_code: AtomicU16::new(200),
            navigations: Mutex::new(Vec::new()),
            requests: AtomicUsize::new(0),
        });

        let shared = Arc::clone(&state);
        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let state = Arc::clone(&shared);
                tokio::spawn(async move {
                    let _ = serve(stream, state).await;
                });
            }
        });

        Self { addr, state, task }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_health(&self, code: u16) {
        self.state.health_code.store(code, Ordering::SeqCst);
    }

    pub fn set_status(&self, status: &RobotStatus) {
        *self.state.status_body.lock() = serde_json::to_string(status).expect("encode status");
        self.state.status_code.store(200, Ordering::SeqCst);
    }

    pub fn set_status_raw(&self, code: u16, body: &str) {
        *self.state.status_body.lock() = body.to_string();
        self.state.status_code.store(code, Ordering::SeqCst);
    }

    pub fn set_navigation(&self, code: u16) {
        self.state.navigation_code.store(code, Ordering::SeqCst);
    }

    /// Decoded JSON bodies of every `POST /navigation` received.
    pub fn navigations(&self) -> Vec<Value> {
        self.state.navigations.lock().clone()
    }

    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeRobot {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Poll `cond` every few milliseconds for up to two seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}

async fn serve(mut stream: TcpStream, state: Arc<RobotState>) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = (header_end + content_length).min(buf.len());
    let body = &buf[header_end..body_end];

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default();
    let path = request_line.next().unwrap_or_default();
    state.requests.fetch_add(1, Ordering::SeqCst);

    let (code, reply) = match (method, path) {
        ("GET", "/health") => (state.health_code.load(Ordering::SeqCst), "{}".to_string()),
        ("GET", "/status") => (
            state.status_code.load(Ordering::SeqCst),
            state.status_body.lock().clone(),
        ),
        ("POST", "/navigation") => {
            let decoded = serde_json::from_slice(body).unwrap_or(Value::Null);
            state.navigations.lock().push(decoded);
            (
                state.navigation_code.load(Ordering::SeqCst),
                r#"{"accepted":true}"#.to_string(),
            )
        }
        _ => (404, String::new()),
    };

    let reason = if code == 200 { "OK" } else { "Scripted" };
    let response = format!(
        "HTTP/1.1 {code} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
        reply.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
