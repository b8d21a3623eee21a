use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use uuid::Uuid;

use super::*;
use crate::canvas::CanvasState;
use crate::services::ingress::Click;
use crate::services::persistence::SnapshotStore;
use crate::state::test_helpers::test_app_state;

// =============================================================================
// Helpers
// =============================================================================

fn test_config(dir: &std::path::Path) -> Config {
    Config {
        port: 0,
        refresh: std::time::Duration::from_secs(6),
        auto_randomize_ticks: 100,
        click_queue_capacity: 4,
        data_path: dir.join("data.json"),
        pic_path: dir.join("pic.png"),
        index_path: dir.join("index.html"),
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await.unwrap();
    });
    addr
}

/// Send one HTTP/1.1 request and return the raw response bytes.
async fn request(addr: SocketAddr, method: &str, path: &str) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
    stream.write_all(head.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

fn status_line(response: &[u8]) -> String {
    String::from_utf8_lossy(response).lines().next().unwrap_or_default().to_string()
}

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pixelwalk-routes-{}", Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

// =============================================================================
// Routes
// =============================================================================

#[tokio::test]
async fn healthz_returns_ok() {
    assert_eq!(healthz().await, StatusCode::OK);
}

#[tokio::test]
async fn router_serves_every_route() {
    let dir = temp_dir();
    let config = test_config(&dir);
    fs::write(&config.index_path, "<html>walker</html>").unwrap();
    SnapshotStore::new(&config.data_path, &config.pic_path).save_blocking(&CanvasState::fresh()).unwrap();

    let (state, mut clicks) = test_app_state(CanvasState::fresh(), 4);
    let addr = serve(app(state, &config)).await;

    let health = request(addr, "GET", "/healthz").await;
    assert_eq!(status_line(&health), "HTTP/1.1 200 OK");

    let index = request(addr, "GET", "/").await;
    assert_eq!(status_line(&index), "HTTP/1.1 200 OK");
    assert!(String::from_utf8_lossy(&index).ends_with("<html>walker</html>"));

    let pic = request(addr, "GET", "/pic.png").await;
    assert_eq!(status_line(&pic), "HTTP/1.1 200 OK");
    assert!(String::from_utf8_lossy(&pic).to_ascii_lowercase().contains("content-type: image/png"));

    let walker = request(addr, "GET", "/api/walker").await;
    assert!(String::from_utf8_lossy(&walker).contains(r#""direction":"right""#));

    let clicked = request(addr, "POST", "/click").await;
    assert_eq!(status_line(&clicked), "HTTP/1.1 303 See Other");
    assert_eq!(clicks.recv().await, Some(Click));

    fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn click_rejects_get() {
    let dir = temp_dir();
    let (state, _clicks) = test_app_state(CanvasState::fresh(), 4);
    let addr = serve(app(state, &test_config(&dir))).await;

    let response = request(addr, "GET", "/click").await;
    assert_eq!(status_line(&response), "HTTP/1.1 405 Method Not Allowed");
    fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn missing_picture_is_not_found() {
    let dir = temp_dir();
    let (state, _clicks) = test_app_state(CanvasState::fresh(), 4);
    let addr = serve(app(state, &test_config(&dir))).await;

    let response = request(addr, "GET", "/pic.png").await;
    assert_eq!(status_line(&response), "HTTP/1.1 404 Not Found");
    fs::remove_dir_all(dir).unwrap();
}
