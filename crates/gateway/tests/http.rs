//! HTTP surface tests against a live listener.

use std::{sync::Arc, time::Duration};

use {
    reqwest::StatusCode,
    serde_json::{Value, json},
};

use {
    waygate_protocol::{ClientEvent, ClientFactory, testing::MockFactory},
    waygate_sessions::{CredentialCache, SessionManager, SessionTimeouts},
    waygate_store::StatusStore,
};

struct TestServer {
    base: String,
    factory: Arc<MockFactory>,
    http: reqwest::Client,
    _cache_dir: tempfile::TempDir,
}

impl TestServer {
    async fn spawn() -> Self {
        let factory = Arc::new(MockFactory::new());
        let store = Arc::new(waygate_store::MemoryStatusStore::new());
        let cache_dir = tempfile::tempdir().unwrap();

        let manager = Arc::new(SessionManager::new(
            Arc::clone(&factory) as Arc<dyn ClientFactory>,
            store as Arc<dyn StatusStore>,
            CredentialCache::new(cache_dir.path()),
            SessionTimeouts::default(),
        ));
        let app = waygate_gateway::build_gateway_app(manager);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base: format!("http://{addr}"),
            factory,
            http: reqwest::Client::new(),
            _cache_dir: cache_dir,
        }
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self
            .http
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = self.http.post(format!("{}{path}", self.base));
        if let Some(body) = body {
            req = req.json(&body);
        } else {
            req = req.json(&json!({}));
        }
        let resp = req.send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    /// Let projection tasks catch up with emitted events.
    async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let server = TestServer::spawn().await;
    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["tenants"], 0);
}

#[tokio::test]
async fn fresh_tenant_reads_disconnected() {
    let server = TestServer::spawn().await;
    let (status, body) = server.get("/status/biz1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "disconnected");
    assert_eq!(body["isConnected"], false);
    assert!(body["error"].is_null());
}

#[tokio::test]
async fn qr_lifecycle_end_to_end() {
    let server = TestServer::spawn().await;

    // Sending creates the session on demand.
    let (status, body) = server
        .post(
            "/send-message/biz1",
            Some(json!({"phone": "5551234", "message": "hi"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // No pairing code yet.
    let (status, _) = server.get("/qr/biz1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let client = server.factory.last_client().unwrap();
    client.emit(ClientEvent::PairingCode("2@test-code".into()));
    server.settle().await;

    let (status, body) = server.get("/qr/biz1").await;
    assert_eq!(status, StatusCode::OK);
    let qr = body["qr"].as_str().unwrap();
    assert!(qr.starts_with("data:image/svg+xml;base64,"));
    let (_, body) = server.get("/status/biz1").await;
    assert_eq!(body["status"], "awaiting_pairing");

    // Once connected the pairing window closes.
    client.emit(ClientEvent::Ready);
    server.settle().await;

    let (status, body) = server.get("/qr/biz1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, body) = server.get("/status/biz1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "connected");
    assert_eq!(body["isConnected"], true);
}

#[tokio::test]
async fn send_message_requires_phone_and_message() {
    let server = TestServer::spawn().await;

    let (status, body) = server
        .post("/send-message/biz1", Some(json!({"phone": "", "message": "hi"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = server
        .post("/send-message/biz1", Some(json!({"phone": "5551234"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing was constructed for invalid requests.
    assert_eq!(server.factory.constructed(), 0);
}

#[tokio::test]
async fn send_failure_maps_to_500() {
    let server = TestServer::spawn().await;
    server.factory.fail_send(true);

    let (status, body) = server
        .post(
            "/send-message/biz1",
            Some(json!({"phone": "5551234", "message": "hi"})),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn init_failure_maps_to_500() {
    let server = TestServer::spawn().await;
    server.factory.fail_init(true);

    let (status, _) = server
        .post(
            "/send-message/biz1",
            Some(json!({"phone": "5551234", "message": "hi"})),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, body) = server.get("/status/biz1").await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn reset_while_connected_recreates_session() {
    let server = TestServer::spawn().await;

    server
        .post(
            "/send-message/biz1",
            Some(json!({"phone": "5551234", "message": "hi"})),
        )
        .await;
    let old = server.factory.last_client().unwrap();
    old.emit(ClientEvent::Ready);
    server.settle().await;
    let (_, body) = server.get("/status/biz1").await;
    assert_eq!(body["status"], "connected");

    let (status, body) = server.post("/reset-connection/biz1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(old.was_destroyed());
    assert_eq!(server.factory.constructed(), 2);

    // The fresh session is initializing until its client reports back.
    let (_, body) = server.get("/status/biz1").await;
    assert_eq!(body["status"], "initializing");
    assert_eq!(body["isConnected"], false);
}
