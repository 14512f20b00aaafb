mod common;

use anyhow::Result;
use axum::http::StatusCode;
use uuid::Uuid;
use workspace_gate::types::WorkspaceRole;

#[tokio::test]
async fn resolves_requested_keys() -> Result<()> {
    let app = common::TestApp::new();
    let user = Uuid::new_v4();
    let ws = app.workspace(user, WorkspaceRole::Member).await;
    app.flags(ws, &[("ENABLE_CHAT", "true"), ("ENABLE_CALENDAR", "FALSE")]).await;

    let (status, body) = app
        .get(
            &format!("/api/v1/workspaces/{}/capabilities?keys=ENABLE_CHAT,ENABLE_CALENDAR,ENABLE_AI", ws),
            Some(&common::token_for(user)),
        )
        .await?;

    assert_eq!(status, StatusCode::OK);
    let caps = &body["data"]["capabilities"];
    assert_eq!(caps["ENABLE_CHAT"], true);
    assert_eq!(caps["ENABLE_CALENDAR"], false);
    assert_eq!(caps["ENABLE_AI"], false);
    assert_eq!(caps.as_object().map(|m| m.len()), Some(3));
    assert_eq!(body["data"]["denied_reason"], "missing_capability");
    assert_eq!(body["data"]["workspace_id"], ws.to_string());
    Ok(())
}

#[tokio::test]
async fn all_enabled_has_no_denied_reason() -> Result<()> {
    let app = common::TestApp::new();
    let user = Uuid::new_v4();
    let ws = app.workspace(user, WorkspaceRole::Member).await;
    app.flags(ws, &[("ENABLE_CHAT", " True ")]).await;

    let (_, body) = app
        .get(
            &format!("/api/v1/workspaces/{}/capabilities?keys=ENABLE_CHAT", ws),
            Some(&common::token_for(user)),
        )
        .await?;
    assert_eq!(body["data"]["capabilities"]["ENABLE_CHAT"], true);
    assert!(body["data"]["denied_reason"].is_null());
    Ok(())
}

#[tokio::test]
async fn defaults_to_navigation_capabilities() -> Result<()> {
    let app = common::TestApp::new();
    let user = Uuid::new_v4();
    let ws = app.workspace(user, WorkspaceRole::Member).await;

    let (_, body) = app
        .get(&format!("/api/v1/workspaces/{}/capabilities", ws), Some(&common::token_for(user)))
        .await?;
    let caps = body["data"]["capabilities"].as_object().cloned().unwrap_or_default();
    assert_eq!(caps.len(), 9);
    assert!(caps.values().all(|v| v == false));
    Ok(())
}

#[tokio::test]
async fn rejects_malformed_keys() -> Result<()> {
    let app = common::TestApp::new();
    let user = Uuid::new_v4();
    let ws = app.workspace(user, WorkspaceRole::Member).await;

    let (status, _) = app
        .get(
            &format!("/api/v1/workspaces/{}/capabilities?keys=ENABLE%20CHAT", ws),
            Some(&common::token_for(user)),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn config_outage_fails_closed() -> Result<()> {
    let app = common::TestApp::split();
    let user = Uuid::new_v4();
    let ws = app.workspace(user, WorkspaceRole::Owner).await;
    app.flags(ws, &[("ENABLE_CHAT", "true")]).await;
    app.configs.set_offline(true);

    let (status, body) = app
        .get(
            &format!("/api/v1/workspaces/{}/capabilities?keys=ENABLE_CHAT", ws),
            Some(&common::token_for(user)),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["capabilities"]["ENABLE_CHAT"], false);
    assert_eq!(body["data"]["denied_reason"], "config_unavailable");
    Ok(())
}
