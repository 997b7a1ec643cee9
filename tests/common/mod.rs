//! Shared fixture: runs the real server on an ephemeral port.
#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use vendor_ai_services::{AppState, Config, build_router};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Configuration for tests: no metrics listener, generous limits.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: TEST_SECRET.to_string(),
        jwt_algorithm: Algorithm::HS256,
        rate_limit_requests: 1000,
        cors_allowed_origins: vec!["*".to_string()],
        log_level: "warn".to_string(),
        metrics_port: 0,
        ..Config::default()
    }
}

/// Sign a token for `user_id` expiring `exp_offset_secs` from now.
pub fn mint_token(user_id: &str, exp_offset_secs: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    encode(
        &Header::new(Algorithm::HS256),
        &json!({"userId": user_id, "userType": "vendor", "exp": now + exp_offset_secs}),
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to sign token")
}

pub fn bearer(user_id: &str) -> String {
    format!("Bearer {}", mint_token(user_id, 3600))
}

/// Running server plus a client pointed at it.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub state: AppState,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(test_config()).await
    }

    pub async fn start_with(config: Config) -> Self {
        let state = AppState::new(config);
        state
            .initialize_services()
            .await
            .expect("Failed to initialize services");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind ephemeral port");
        let addr = listener.local_addr().expect("Failed to get local address");

        let app = build_router(state.clone());
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async {
                let _ = rx.await;
            })
            .await
            .expect("Server failed");
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{addr}"),
            client,
            state,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Stop serving, then run service cleanup.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        self.state.shutdown().await;
    }
}
