mod common;

use anyhow::Result;
use reqwest::StatusCode;

use contactbook::auth::{FileSessionStorage, SessionStore};
use contactbook::gateway::{ContactGateway, HttpContactGateway};
use contactbook::ErrorKind;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::TestServer::start().await?;
    let res = reqwest::get(format!("{}/health", server.base_url)).await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn login_stores_a_session_from_the_token() -> Result<()> {
    let server = common::TestServer::start().await?;
    let (client, session) = common::client_for(&server.base_url)?;

    let user = session.login(&client, "alice", common::PASSWORD).await?;
    assert_eq!(user.username, "alice");
    assert_eq!(user.role.as_deref(), Some("user"));
    assert!(user.expiration > chrono::Utc::now());
    assert!(session.token().await.is_some());

    let admin = session.login(&client, "admin", common::PASSWORD).await?;
    assert_eq!(admin.role.as_deref(), Some("admin"));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_rejected() -> Result<()> {
    let server = common::TestServer::start().await?;
    let (client, session) = common::client_for(&server.base_url)?;

    let err = session.login(&client, "alice", "nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(err.user_message(), "Invalid username or password");
    assert!(!session.is_authenticated().await);
    Ok(())
}

#[tokio::test]
async fn session_survives_a_restart_until_logout() -> Result<()> {
    let server = common::TestServer::start().await?;
    let dir = tempfile::tempdir()?;
    let (client, session) = common::file_client_for(&server.base_url, dir.path())?;
    session.login(&client, "alice", common::PASSWORD).await?;
    assert!(dir.path().join("session.json").exists());

    // A fresh store over the same file picks the session back up
    let restored = SessionStore::new(FileSessionStorage::new(dir.path().join("session.json")), 24);
    let user = restored.load().await?.expect("session restored");
    assert_eq!(user.username, "alice");
    assert_eq!(restored.token().await, session.token().await);

    session.logout().await;
    assert!(!dir.path().join("session.json").exists());
    Ok(())
}

#[tokio::test]
async fn contacts_require_a_bearer_token() -> Result<()> {
    let server = common::TestServer::start().await?;
    let http = reqwest::Client::new();
    let url = format!("{}/api/v2/contacts", server.base_url);

    let res = http.get(&url).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = http.get(&url).bearer_auth("not-a-jwt").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn gateway_without_session_fails_before_sending() -> Result<()> {
    let server = common::TestServer::start().await?;
    let (client, _session) = common::client_for(&server.base_url)?;
    let gateway = HttpContactGateway::new(client, "v2");

    let err = gateway.list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    Ok(())
}
