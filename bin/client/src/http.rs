//! Thin blocking HTTP client for the integrity server

use anyhow::{Context, Result};
use common::ErrorResponse;
use reqwest::blocking::{multipart, Client, Response};
use std::path::Path;

pub struct ApiClient {
    server: String,
    client: Client,
}

impl ApiClient {
    pub fn new(server: &str) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.server, endpoint)
    }

    /// URL of an endpoint that takes a stored id as its last path segment
    pub fn url_for(&self, endpoint: &str, stored_id: &str) -> String {
        format!("{}{}/{}", self.server, endpoint, stored_id)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send a request and turn an unsuccessful status into an error carrying
    /// the server's message
    pub fn send(&self, request: reqwest::blocking::RequestBuilder, action: &str) -> Result<Response> {
        let response = request
            .send()
            .with_context(|| format!("Failed to connect to server at {}", self.server))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);
            anyhow::bail!("{} failed: {} - {}", action, status, message);
        }
        Ok(response)
    }

    /// Multipart form with the file part the server expects
    pub fn file_form(path: &Path) -> Result<multipart::Form> {
        let content =
            std::fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .with_context(|| format!("Not a file path: {:?}", path))?;

        Ok(multipart::Form::new().part(
            "file",
            multipart::Part::bytes(content)
                .file_name(filename)
                .mime_str("application/octet-stream")
                .context("Failed to set MIME type")?,
        ))
    }
}
