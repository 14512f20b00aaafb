use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use super::{ObjectSink, UploadError};
use crate::types::WorkspaceId;

/// Posts file bodies to the dashboard upload route:
/// `POST {endpoint}/api/workspaces/{ws}/upload?filename={name}`
pub struct HttpObjectSink {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpObjectSink {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, UploadError> {
        let endpoint = Url::parse(endpoint).map_err(|e| UploadError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(UploadError::InvalidEndpoint(endpoint.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn upload_url(&self, workspace: &WorkspaceId, file_name: &str) -> Url {
        let mut url = self.endpoint.clone();
        let workspace = workspace.to_string();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "workspaces", workspace.as_str(), "upload"]);
        }
        url.query_pairs_mut().clear().append_pair("filename", file_name);
        url
    }
}

#[async_trait]
impl ObjectSink for HttpObjectSink {
    async fn put(&self, workspace: &WorkspaceId, file_name: &str, body: Vec<u8>) -> Result<(), UploadError> {
        let mut request = self.client.post(self.upload_url(workspace, file_name)).body(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if response.status() != StatusCode::OK {
            return Err(UploadError::Rejected {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}
