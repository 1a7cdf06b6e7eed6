//! Shared fixtures for the integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use keymaster_cli::KeymasterClient;
use keymaster_gateway::{Gateway, GatewayConfig};
use keymaster_store::{CredentialRepository, Database, SqliteCredentialRepository};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A gateway serving on an ephemeral loopback port for the life of the value.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve a fresh in-memory store.
    pub async fn start() -> Self {
        let db = Database::in_memory().await.expect("in-memory store");
        Self::with_database(&db).await
    }

    /// Serve an existing database.
    pub async fn with_database(db: &Database) -> Self {
        let repository: Arc<dyn CredentialRepository> =
            Arc::new(SqliteCredentialRepository::from_database(db));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        let gateway = Gateway::new(
            GatewayConfig {
                bind: addr.ip().to_string(),
                port: addr.port(),
            },
            repository,
        );
        let handle = tokio::spawn(async move {
            let _ = gateway.serve(listener).await;
        });

        Self { addr, handle }
    }

    /// Base URL of the server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client pointed at the server.
    pub fn client(&self) -> KeymasterClient {
        KeymasterClient::new(&self.url()).expect("valid test server url")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The create body used across the tests.
pub fn example_spec() -> serde_json::Value {
    serde_json::json!({
        "AppNames": [{"AppName": "com.example.app"}],
        "Keys": [{"Name": "api_key", "Info": "abc123"}]
    })
}
