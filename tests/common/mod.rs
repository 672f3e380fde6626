//! Common test utilities for report-relay integration tests

use report_relay::{Config, Relay};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "424242:INTEGRATION";
pub const CHAT_ID: &str = "-1001234567890";

/// A running form server backed by a mock Telegram API
pub struct RunningServer {
    pub address: SocketAddr,
    pub telegram: MockServer,
    pub upload_dir: TempDir,
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<report_relay::Result<()>>>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    pub fn upload_dir_is_empty(&self) -> bool {
        std::fs::read_dir(self.upload_dir.path())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }

    /// Stop the server and wait for it to finish
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            stop.send(()).ok();
        }
        if let Some(handle) = self.handle.take() {
            let result = tokio::time::timeout(Duration::from_secs(5), handle)
                .await
                .expect("server did not stop")
                .expect("server task panicked");
            result.expect("server returned an error");
        }
    }
}

/// Boot the server on an ephemeral port.
///
/// `customize` runs after the Telegram URL, credentials and upload
/// directory are filled in.
pub async fn start_server(customize: impl FnOnce(&mut Config)) -> RunningServer {
    let telegram = MockServer::start().await;
    let upload_dir = tempfile::tempdir().expect("create upload dir");

    let mut config = Config::default();
    config.telegram.api_base_url = telegram.uri();
    config.telegram.bot_token = Some(TOKEN.to_string());
    config.telegram.chat_id = Some(CHAT_ID.to_string());
    config.upload.upload_dir = upload_dir.path().to_path_buf();
    customize(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");

    let config = Arc::new(config);
    let relay = Arc::new(Relay::new(&config).expect("relay"));
    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(report_relay::api::serve(
        listener,
        relay,
        config,
        async move {
            stopped.await.ok();
        },
    ));

    RunningServer {
        address,
        telegram,
        upload_dir,
        stop: Some(stop),
        handle: Some(handle),
    }
}

/// Bot API answer for a message that reached the chat
pub fn sent_message(message_id: i32) -> serde_json::Value {
    serde_json::json!({
        "ok": true,
        "result": {
            "message_id": message_id,
            "date": 1_760_900_000,
            "chat": {"id": -1001234567890_i64, "type": "private", "first_name": "Shift"},
            "from": {"id": 42, "is_bot": true, "first_name": "Relay", "username": "relay_bot"},
            "text": "ok"
        }
    })
}

/// Mount a successful Bot API answer for `bot_method`, expected `times` times
pub async fn telegram_accepts(server: &MockServer, bot_method: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/{}", TOKEN, bot_method)))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(99)))
        .expect(times)
        .mount(server)
        .await;
}

/// A report form with every field filled in
pub fn full_report() -> reqwest::multipart::Form {
    [
        ("date", "2026-10-19"),
        ("Time", "21:05"),
        ("shift", "evening"),
        ("name", "Sokha"),
        ("total_glasses", "134"),
        ("total_money", "268.50"),
        ("aba_usd", "120"),
        ("aba_khr", "40000"),
        ("acleda_usd", "30"),
        ("acleda_khr", "0"),
        ("other_bank", "0"),
        ("cash_usd", "98.50"),
        ("cash_khr", "12000"),
        ("expense", "5"),
        ("balance_status", "balanced"),
        ("balance_amount", "0"),
        ("notes", "ice machine leaking"),
    ]
    .into_iter()
    .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
        form.text(name, value)
    })
}
