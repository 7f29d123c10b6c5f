//! Server startup and endpoint smoke tests.
//!
//! Spawns the real binary against a temp config; no browser or job
//! service is running, so run triggers fail fast but every endpoint must
//! stay structured and responsive.

use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::{NamedTempFile, TempDir};
use tokio::time::sleep;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a minimal valid config with all data dirs under a temp root.
fn minimal_config(port: u16, data_root: &std::path::Path) -> String {
    let downloads = data_root.join("downloads");
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {port}

[agent]
download_dir = "{downloads}"

[orchestrator]
download_dir = "{downloads}"
partition_root = "{lake}"
work_dir = "{work}"
"#,
        port = port,
        downloads = downloads.display(),
        lake = data_root.join("lake").display(),
        work = data_root.join("work").display(),
    )
}

/// Spawn the server and return a handle
fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_bovespa"))
        .env("BOVESPA_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

struct TestServer {
    port: u16,
    _child: tokio::process::Child,
    _config: NamedTempFile,
    _data: TempDir,
}

async fn start() -> TestServer {
    let port = get_available_port();
    let data = TempDir::new().unwrap();

    let mut config = NamedTempFile::new().unwrap();
    write!(config, "{}", minimal_config(port, data.path())).unwrap();

    let child = spawn_server(config.path());
    assert!(wait_for_server(port, 100).await, "server did not come up");

    TestServer {
        port,
        _child: child,
        _config: config,
        _data: data,
    }
}

#[tokio::test]
async fn health_and_config_endpoints_respond() {
    let server = start().await;
    let client = Client::new();

    let health: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/v1/health", server.port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let config: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/v1/config", server.port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(config["job_name"], "bovespa-etl-job");
    assert!(config["page_url"].as_str().unwrap().contains("IBOV"));
}

#[tokio::test]
async fn metrics_endpoint_serves_text_format() {
    let server = start().await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/metrics", server.port))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn last_run_is_404_before_any_run() {
    let server = start().await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/runs/last", server.port))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn failed_run_is_reported_and_remembered() {
    // No WebDriver endpoint is listening, so the session fails fast as a
    // total failure; the report must still be structured and retrievable.
    let server = start().await;
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap();

    let response = client
        .post(format!("http://127.0.0.1:{}/api/v1/runs", server.port))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 500);

    let report: serde_json::Value = response.json().await.unwrap();
    assert_eq!(report["status"], "failed");
    assert!(report["run_id"].as_str().is_some());

    let last: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/v1/runs/last", server.port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(last["status"], "failed");
    assert_eq!(last["run_id"], report["run_id"]);
}
