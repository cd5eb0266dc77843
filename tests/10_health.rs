mod common;

use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn root_and_health_respond() -> Result<()> {
    let server = common::TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(15)).await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK, "expected 200 OK, got {}", res.status());
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["name"], "orgboard-api", "unexpected body: {}", body);

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    let status = res.status();
    let body = res.json::<serde_json::Value>().await?;
    match status {
        StatusCode::OK => assert_eq!(body["data"]["database"], "ok"),
        StatusCode::SERVICE_UNAVAILABLE => assert_eq!(body["code"], "SERVICE_UNAVAILABLE"),
        other => panic!("unexpected health status {}: {}", other, body),
    }

    Ok(())
}
