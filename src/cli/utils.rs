use anyhow::{anyhow, Context};
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

use crate::cli::{OutputFormat, Remote};

/// Build `{server}/api/v1/workspaces/{ws}/{path}`
pub fn workspace_url(remote: &Remote, workspace: &str, path: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(&remote.server).with_context(|| format!("invalid server URL '{}'", remote.server))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("server URL '{}' cannot carry a path", remote.server))?
        .pop_if_empty()
        .extend(["api", "v1", "workspaces", workspace])
        .extend(path.split('/').filter(|s| !s.is_empty()));
    Ok(url)
}

/// GET a workspace endpoint and unwrap the success envelope
pub async fn api_get(remote: &Remote, url: Url) -> anyhow::Result<Value> {
    let mut request = Client::new().get(url.clone());
    if let Some(token) = &remote.token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.with_context(|| format!("GET {}", url))?;
    let status = response.status();
    let body: Value = response.json().await.with_context(|| format!("decoding response from {}", url))?;

    if body["success"].as_bool() != Some(true) {
        let message = body["error"].as_str().unwrap_or("request failed");
        return Err(match body["reason"].as_str() {
            Some(reason) => anyhow!("{} ({}, {})", message, status, reason),
            None => anyhow!("{} ({})", message, status),
        });
    }
    Ok(body["data"].clone())
}

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Check mark for enabled rows in text output
pub fn mark(enabled: bool) -> &'static str {
    if enabled {
        "✓"
    } else {
        "✗"
    }
}
