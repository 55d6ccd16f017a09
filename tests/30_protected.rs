mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_protected_requires_bearer() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let resp = client.get(server.url("/protected/whoami")).send().await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");

    for header in ["Basic dTE6czE=", "Bearer", "Bearer ", "Bearer garbage"] {
        let resp = client
            .get(server.url("/protected/whoami"))
            .header("Authorization", header)
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "header {:?}", header);
    }

    Ok(())
}

#[tokio::test]
async fn test_whoami_returns_subject() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (access, _) = common::login(&server).await?;
    let resp = client
        .get(server.url("/protected/whoami"))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["subject"], common::SUBJECT);

    // Scheme is matched case-insensitively
    let resp = client
        .get(server.url("/protected/whoami"))
        .header("Authorization", format!("bearer {}", access))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (_, refresh) = common::login(&server).await?;
    let resp = client
        .get(server.url("/protected/whoami"))
        .bearer_auth(&refresh)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_unknown_protected_path_checks_auth_first() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let resp = client.get(server.url("/protected/reports/42")).send().await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let (access, _) = common::login(&server).await?;
    let resp = client
        .delete(server.url("/protected/reports/42"))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_wrong_method_on_whoami_checks_auth_first() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let resp = client.post(server.url("/protected/whoami")).send().await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get("allow").is_none());

    let (access, _) = common::login(&server).await?;
    let resp = client
        .post(server.url("/protected/whoami"))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "METHOD_NOT_ALLOWED");

    Ok(())
}

#[tokio::test]
async fn test_bare_protected_prefix_checks_auth_first() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let resp = client.get(server.url("/protected")).send().await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
