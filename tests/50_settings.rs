mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;
use workspace_gate::types::{WorkspaceId, WorkspaceRole};

fn sections(body: &Value) -> Vec<String> {
    body["data"]["panels"]
        .as_array()
        .map(|panels| {
            panels
                .iter()
                .filter_map(|p| p["section"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn owner_sees_flagged_panels() -> Result<()> {
    let app = common::TestApp::new();
    let user = Uuid::new_v4();
    let ws = app.workspace(user, WorkspaceRole::Owner).await;
    app.flags(ws, &[("ENABLE_AVATAR", "true"), ("ENABLE_LOGO", "false")]).await;

    let (status, body) = app
        .get(&format!("/api/v1/workspaces/{ws}/settings/panels"), Some(&common::token_for(user)))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sections(&body), vec!["basic_info", "avatar", "security"]);
    assert_eq!(body["data"]["role"], "OWNER");
    assert_eq!(body["data"]["is_root_workspace"], false);
    Ok(())
}

#[tokio::test]
async fn members_cannot_edit() -> Result<()> {
    let app = common::TestApp::new();
    let user = Uuid::new_v4();
    let ws = app.workspace(user, WorkspaceRole::Member).await;

    let (_, body) = app
        .get(&format!("/api/v1/workspaces/{ws}/settings/panels"), Some(&common::token_for(user)))
        .await?;
    assert_eq!(
        body["data"]["panels"],
        json!([{ "section": "basic_info", "editable": false }])
    );
    Ok(())
}

#[tokio::test]
async fn root_workspace_hides_security() -> Result<()> {
    let app = common::TestApp::new();
    let user = Uuid::new_v4();
    let root = WorkspaceId::new(Uuid::nil());
    app.members.add_member(root, user, WorkspaceRole::Owner).await;

    let (_, body) = app
        .get(&format!("/api/v1/workspaces/{root}/settings/panels"), Some(&common::token_for(user)))
        .await?;
    assert_eq!(body["data"]["is_root_workspace"], true);
    assert_eq!(sections(&body), vec!["basic_info"]);
    Ok(())
}

#[tokio::test]
async fn outage_hides_security() -> Result<()> {
    let app = common::TestApp::split();
    let user = Uuid::new_v4();
    let ws = app.workspace(user, WorkspaceRole::Owner).await;
    app.configs.set_offline(true);

    let (status, body) = app
        .get(&format!("/api/v1/workspaces/{ws}/settings/panels"), Some(&common::token_for(user)))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sections(&body), vec!["basic_info"]);
    assert_eq!(body["data"]["denied_reason"], "config_unavailable");
    Ok(())
}
