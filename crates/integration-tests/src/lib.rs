//! Integration tests for the Brightspoke backend.
//!
//! Each test spawns the real API server in-process on an ephemeral port,
//! backed by a document store in a temporary directory, then drives it over
//! HTTP with `reqwest`. No external services are required.
//!
//! ```bash
//! cargo test -p brightspoke-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tempfile::TempDir;
use tokio::net::TcpListener;

use brightspoke_api::config::ApiConfig;
use brightspoke_api::{AppState, app};

/// A running API server plus a client pointed at it.
///
/// The store's temporary directory lives as long as the context; dropping
/// the context deletes it. The server task is aborted when the test's
/// runtime shuts down.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
    _data_dir: TempDir,
}

impl TestContext {
    /// Spawn the API on `127.0.0.1` with an OS-assigned port and a fresh,
    /// empty document store.
    ///
    /// # Panics
    ///
    /// Panics if the store cannot be opened or the listener cannot bind;
    /// both are test-environment failures.
    pub async fn spawn() -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp data dir");

        let config = ApiConfig {
            data_dir: data_dir.path().to_path_buf(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            allowed_origin: None,
            sentry_dsn: None,
            sentry_environment: "test".to_owned(),
        };

        let state = AppState::new(config)
            .await
            .expect("Failed to open document store");
        let router = app(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Test server exited");
        });

        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
            _data_dir: data_dir,
        }
    }

    /// Absolute URL for a path on the test server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
