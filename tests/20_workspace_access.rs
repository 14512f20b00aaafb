mod common;

use anyhow::Result;
use axum::http::StatusCode;
use uuid::Uuid;
use workspace_gate::types::WorkspaceRole;

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let app = common::TestApp::new();
    let ws = app.workspace(Uuid::new_v4(), WorkspaceRole::Owner).await;

    let (status, body) = app.get(&format!("/api/v1/workspaces/{}/capabilities", ws), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn foreign_token_is_unauthorized() -> Result<()> {
    let app = common::TestApp::new();
    let user = Uuid::new_v4();
    let ws = app.workspace(user, WorkspaceRole::Owner).await;
    let forged = workspace_gate::auth::generate_jwt(&workspace_gate::auth::Claims::new(user, 1), "other")
        .expect("token");

    let (status, _) = app
        .get(&format!("/api/v1/workspaces/{}/capabilities", ws), Some(&forged))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn non_members_are_forbidden() -> Result<()> {
    let app = common::TestApp::new();
    let ws = app.workspace(Uuid::new_v4(), WorkspaceRole::Owner).await;
    let stranger = common::token_for(Uuid::new_v4());

    let (status, body) = app
        .get(&format!("/api/v1/workspaces/{}/capabilities", ws), Some(&stranger))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    assert!(body.get("reason").is_none());
    Ok(())
}

#[tokio::test]
async fn malformed_workspace_id_is_bad_request() -> Result<()> {
    let app = common::TestApp::new();
    let token = common::token_for(Uuid::new_v4());

    let (status, body) = app.get("/api/v1/workspaces/not-a-uuid/capabilities", Some(&token)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn membership_outage_is_unavailable() -> Result<()> {
    let app = common::TestApp::split();
    let user = Uuid::new_v4();
    let ws = app.workspace(user, WorkspaceRole::Owner).await;
    app.members.set_offline(true);

    let (status, _) = app
        .get(&format!("/api/v1/workspaces/{}/capabilities", ws), Some(&common::token_for(user)))
        .await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}
