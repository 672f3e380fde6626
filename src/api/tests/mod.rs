use super::*;
use crate::Config;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod system;

const BOUNDARY: &str = "----ReportRelayBoundary7MA4YWxkTrZu0gW";
const TOKEN: &str = "123456:TEST";

/// Router wired to a mock Telegram API and a scratch upload directory
struct TestApp {
    router: Router,
    telegram: MockServer,
    upload_dir: TempDir,
}

impl TestApp {
    fn upload_dir_is_empty(&self) -> bool {
        std::fs::read_dir(self.upload_dir.path())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }
}

async fn test_app() -> TestApp {
    test_app_with(|_| {}).await
}

async fn test_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let telegram = MockServer::start().await;
    let upload_dir = tempdir().unwrap();

    let mut config = Config::default();
    config.telegram.api_base_url = telegram.uri();
    config.telegram.bot_token = Some(TOKEN.to_string());
    config.telegram.chat_id = Some("-100200300".to_string());
    config.telegram.request_timeout = Duration::from_secs(5);
    config.upload.upload_dir = upload_dir.path().to_path_buf();
    customize(&mut config);

    let relay = Arc::new(Relay::new(&config).unwrap());
    let router = create_router(relay, Arc::new(config));

    TestApp {
        router,
        telegram,
        upload_dir,
    }
}

fn bot_path(bot_method: &str) -> String {
    format!("/bot{}/{}", TOKEN, bot_method)
}

/// Bot API answer for a message that reached the chat
fn sent_message(message_id: i32) -> serde_json::Value {
    serde_json::json!({
        "ok": true,
        "result": {
            "message_id": message_id,
            "date": 1_760_900_000,
            "chat": {"id": -100200300, "type": "private", "first_name": "Shift"},
            "from": {"id": 42, "is_bot": true, "first_name": "Relay", "username": "relay_bot"},
            "text": "ok"
        }
    })
}

/// Mount a successful Bot API answer for `bot_method`, expected `times` times
async fn telegram_ok(server: &MockServer, bot_method: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(bot_path(bot_method)))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(42)))
        .expect(times)
        .mount(server)
        .await;
}

/// Mount a Bot API rejection for `bot_method`
async fn telegram_rejects(server: &MockServer, bot_method: &str) {
    Mock::given(method("POST"))
        .and(path(bot_path(bot_method)))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(server)
        .await;
}

/// One part of a multipart/form-data body
enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                        name, value
                    )
                    .as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn report_parts<'a>(extra: Vec<Part<'a>>) -> Vec<Part<'a>> {
    let mut parts = vec![
        Part::Text("date", "2026-10-19"),
        Part::Text("Time", "18:30"),
        Part::Text("shift", "evening"),
        Part::Text("name", "Dara"),
        Part::Text("total_money", "120"),
        Part::Text("balance_status", "balanced"),
    ];
    parts.extend(extra);
    parts
}

fn post_form(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn post_form_json(body: Vec<u8>) -> Request<Body> {
    let mut request = post_form(body);
    request.headers_mut().insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    request
}

async fn body_string(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

#[tokio::test]
async fn test_serve_stops_on_shutdown_signal() {
    let app = test_app().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    let mut config = Config::default();
    config.upload.upload_dir = app.upload_dir.path().to_path_buf();
    let config = Arc::new(config);
    let relay = Arc::new(Relay::new(&config).unwrap());

    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve(listener, relay, config, async move {
        stopped.await.ok();
    }));

    // The listener accepts connections before shutdown
    tokio::net::TcpStream::connect(address).await.unwrap();

    stop.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after the shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cors_enabled() {
    let app = test_app_with(|config| {
        config.server.cors_enabled = true;
        config.server.cors_origins = vec!["*".to_string()];
    })
    .await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled_by_default() {
    let app = test_app().await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let app = test_app_with(|config| {
        config.server.cors_enabled = true;
        config.server.cors_origins = vec!["https://shop.example".to_string()];
    })
    .await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "https://shop.example")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://shop.example"
    );
}

#[test]
fn test_body_limit_adds_form_overhead() {
    let limits = crate::config::UploadConfig {
        max_upload_bytes: 1024,
        ..Default::default()
    };
    assert_eq!(body_limit(&limits), 1024 + FORM_OVERHEAD_BYTES);

    let unbounded = crate::config::UploadConfig {
        max_upload_bytes: u64::MAX,
        ..Default::default()
    };
    assert_eq!(body_limit(&unbounded), u64::MAX);
}
