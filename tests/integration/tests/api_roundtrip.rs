//! HTTP round-trip tests.
//!
//! These tests start the real router on an ephemeral port and drive it
//! through the same client the `keymaster` binary uses.

use keymaster_cli::ClientError;
use keymaster_integration_tests::{example_spec, TestServer};
use keymaster_store::Database;
use serde_json::json;
use tempfile::TempDir;

fn secrets(envelope: &keymaster_cipher::Envelope) -> serde_json::Value {
    let plaintext = keymaster_cipher::open(envelope).unwrap();
    serde_json::from_slice(&plaintext).unwrap()
}

#[tokio::test]
async fn test_create_get_reissue() {
    let server = TestServer::start().await;
    let client = server.client();

    let created = client.create(&example_spec()).await.unwrap();
    assert_eq!(secrets(&created), json!({"api_key": "abc123"}));

    let fetched = client.get("com.example.app").await.unwrap();
    assert_eq!(fetched.cypher_key, created.cypher_key);
    assert_eq!(secrets(&fetched), secrets(&created));

    let reissued = client.reissue("com.example.app").await.unwrap();
    assert_ne!(reissued.cypher_key, created.cypher_key);
    assert_eq!(secrets(&reissued), json!({"api_key": "abc123"}));

    let after = client.get("com.example.app").await.unwrap();
    assert_eq!(after.cypher_key, reissued.cypher_key);
}

#[tokio::test]
async fn test_unknown_app_is_not_found() {
    let server = TestServer::start().await;
    let err = server.client().get("unknown.app").await.unwrap_err();

    match err {
        ClientError::Server { status, ref message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("expected server error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "404 Not Found");
}

#[tokio::test]
async fn test_alias_reuse_is_conflict() {
    let server = TestServer::start().await;
    let client = server.client();
    client.create(&example_spec()).await.unwrap();

    let err = client
        .create(&json!({
            "AppNames": [{"AppName": "other.app"}, {"AppName": "com.example.app"}],
            "Keys": []
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 409, .. }));

    // The rejected request bound nothing.
    assert_eq!(client.list_apps().await.unwrap(), vec![vec!["com.example.app"]]);
}

#[tokio::test]
async fn test_replace_moves_aliases_and_keeps_key() {
    let server = TestServer::start().await;
    let client = server.client();
    let created = client.create(&example_spec()).await.unwrap();

    let replaced = client
        .replace(
            "com.example.app",
            &json!({
                "AppNames": [{"AppName": "com.example.v2"}, {"AppName": "com.example.beta"}],
                "Keys": [{"Name": "token", "Info": "s3cret"}]
            }),
        )
        .await
        .unwrap();

    assert_eq!(replaced.cypher_key, created.cypher_key);
    assert_eq!(secrets(&replaced), json!({"token": "s3cret"}));

    let gone = client.get("com.example.app").await.unwrap_err();
    assert!(matches!(gone, ClientError::Server { status: 404, .. }));
    assert_eq!(client.get("com.example.beta").await.unwrap(), replaced);

    assert_eq!(
        client.list_apps().await.unwrap(),
        vec![vec!["com.example.beta", "com.example.v2"]]
    );
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let server = TestServer::start().await;
    let err = server
        .client()
        .create(&json!({"Keys": [{"Name": "k", "Info": "v"}]}))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 400, .. }));
}

#[tokio::test]
async fn test_list_groups_by_credential() {
    let server = TestServer::start().await;
    let client = server.client();
    assert!(client.list_apps().await.unwrap().is_empty());

    client
        .create(&json!({"AppNames": [{"AppName": "z.first"}, {"AppName": "a.first"}]}))
        .await
        .unwrap();
    client
        .create(&json!({"AppNames": [{"AppName": "m.second"}, {"AppName": "b.second"}]}))
        .await
        .unwrap();

    assert_eq!(
        client.list_apps().await.unwrap(),
        vec![vec!["a.first", "z.first"], vec!["b.second", "m.second"]]
    );
}

#[tokio::test]
async fn test_store_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = keymaster_core::config::StoreConfig {
        path: dir.path().join("keymaster.sqlite3"),
        max_connections: 2,
    };

    let created = {
        let db = Database::connect(&config).await.unwrap();
        let server = TestServer::with_database(&db).await;
        server.client().create(&example_spec()).await.unwrap()
    };

    let db = Database::connect(&config).await.unwrap();
    let server = TestServer::with_database(&db).await;
    let fetched = server.client().get("com.example.app").await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_on_file_store() {
    let dir = TempDir::new().unwrap();
    let config = keymaster_core::config::StoreConfig {
        path: dir.path().join("keymaster.sqlite3"),
        max_connections: 5,
    };
    let db = Database::connect(&config).await.unwrap();
    let server = TestServer::with_database(&db).await;
    let client = server.client();

    let spec = |name: &str| {
        json!({
            "AppNames": [{"AppName": name}],
            "Keys": [{"Name": "api_key", "Info": name}]
        })
    };

    let mut setup = Vec::new();
    for i in 0..16 {
        let client = client.clone();
        let body = spec(&format!("app-{i}"));
        setup.push(tokio::spawn(async move { client.create(&body).await }));
    }
    for task in setup {
        task.await.unwrap().unwrap();
    }

    let mut tasks = Vec::new();
    for i in 0..16 {
        let client = client.clone();
        let app = format!("app-{i}");
        let body = spec(&format!("moved-{i}"));
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                client.replace(&app, &body).await
            } else {
                client.reissue(&app).await
            }
        }));
    }
    for i in 0..8 {
        let client = client.clone();
        let body = spec(&format!("fresh-{i}"));
        tasks.push(tokio::spawn(async move { client.create(&body).await }));
    }

    for task in tasks {
        if let Err(err) = task.await.unwrap() {
            panic!("concurrent write failed: {err}");
        }
    }

    let groups = client.list_apps().await.unwrap();
    assert_eq!(groups.len(), 24);
    assert!(client.get("moved-0").await.is_ok());
    assert!(client.get("app-1").await.is_ok());
    assert!(matches!(
        client.get("app-0").await.unwrap_err(),
        ClientError::Server { status: 404, .. }
    ));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let client = keymaster_cli::KeymasterClient::new("http://127.0.0.1:1").unwrap();
    let err = client.list_apps().await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
}
