use anyhow::{Context, Result};
use common::{
    ErrorResponse, FileListResponse, FileSummary, QuickVerifyResponse, UploadResponse,
    VerifyResponse,
};
use rand::{distributions::Alphanumeric, Rng};
use reqwest::{multipart, StatusCode};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Duration;
use tokio::time::sleep;

pub fn create_test_files(dir: &Path, count: usize) -> Result<Vec<PathBuf>> {
    (0..count)
        .map(|i| {
            let file_path = dir.join(format!("file{}.txt", i));
            let content = format!("Test file {} content\n{}\n", i, random_string(32));
            fs::write(&file_path, content)
                .with_context(|| format!("Failed to create test file: {:?}", file_path))?;
            Ok(file_path)
        })
        .collect()
}

pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub async fn wait_for_server(url: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let health_url = format!("{}/health", url);

    println!("Waiting for server to be ready...");
    for i in 0..30 {
        match client.get(&health_url).send().await {
            Ok(response) if response.status().is_success() => {
                println!("Server is ready!");
                return Ok(());
            }
            _ => {
                if i < 29 {
                    sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    anyhow::bail!("Server did not become ready within 30 seconds");
}

/// Run the CLI client and return its output without judging the exit status
pub fn run_client(client_binary: &Path, server_url: &str, args: &[&str]) -> Result<Output> {
    Command::new(client_binary)
        .args(args)
        .arg("--server")
        .arg(server_url)
        .output()
        .with_context(|| format!("Failed to run client binary: {:?}", client_binary))
}

/// Run the CLI client and fail unless it exits successfully
pub fn run_client_ok(client_binary: &Path, server_url: &str, args: &[&str]) -> Result<String> {
    let output = run_client(client_binary, server_url, args)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        anyhow::bail!(
            "Client command {:?} failed:\nSTDOUT: {}\nSTDERR: {}",
            args,
            stdout,
            stderr
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Async HTTP access to the server API
#[derive(Clone)]
pub struct Api {
    base: String,
    client: reqwest::Client,
}

impl Api {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn file_form(filename: &str, content: &[u8], secret_key: &str) -> Result<multipart::Form> {
        Ok(multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(content.to_vec())
                    .file_name(filename.to_string())
                    .mime_str("text/plain")
                    .context("Failed to set MIME type")?,
            )
            .text("secret_key", secret_key.to_string()))
    }

    async fn json<T: DeserializeOwned>(response: reqwest::Response, action: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} failed: {} - {}", action, status, body);
        }
        response
            .json()
            .await
            .with_context(|| format!("Invalid {} response", action))
    }

    pub async fn upload(&self, filename: &str, content: &[u8], secret_key: &str) -> Result<FileSummary> {
        let response = self
            .client
            .post(self.url("/api/upload"))
            .multipart(Self::file_form(filename, content, secret_key)?)
            .send()
            .await?;
        let body: UploadResponse = Self::json(response, "upload").await?;
        Ok(body.file)
    }

    pub async fn list(&self) -> Result<Vec<FileSummary>> {
        let response = self.client.get(self.url("/api/files")).send().await?;
        let body: FileListResponse = Self::json(response, "list").await?;
        Ok(body.files)
    }

    pub async fn verify(&self, content: &[u8], secret_key: &str, hmac: &str) -> Result<VerifyResponse> {
        let form = Self::file_form("candidate.txt", content, secret_key)?.text("hmac", hmac.to_string());
        let response = self
            .client
            .post(self.url("/api/verify"))
            .multipart(form)
            .send()
            .await?;
        Self::json(response, "verify").await
    }

    pub async fn quick_verify(
        &self,
        filename: &str,
        content: &[u8],
        secret_key: &str,
    ) -> Result<QuickVerifyResponse> {
        let response = self
            .client
            .post(self.url("/api/quick-verify"))
            .multipart(Self::file_form(filename, content, secret_key)?)
            .send()
            .await?;
        Self::json(response, "quick-verify").await
    }

    /// Raw GET returning the status and body, for checking error responses too
    pub async fn get_raw(&self, path: &str) -> Result<(StatusCode, Vec<u8>)> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status();
        Ok((status, response.bytes().await?.to_vec()))
    }

    pub async fn post_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.post(self.url(path)).send().await?;
        Self::json(response, path).await
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.delete(self.url(path)).send().await?;
        Self::json(response, path).await
    }
}

/// Assert a raw response is a JSON error with the given status
pub fn expect_error(status: StatusCode, body: &[u8], expected: StatusCode) -> Result<()> {
    if status != expected {
        anyhow::bail!("Expected status {}, got {}", expected, status);
    }
    let error: ErrorResponse =
        serde_json::from_slice(body).context("Error response is not JSON")?;
    if error.success {
        anyhow::bail!("Error response claims success");
    }
    Ok(())
}

pub fn cleanup_test_data(test_data_dir: &Path) -> Result<()> {
    let keep_data = std::env::var("KEEP_TEST_DATA").unwrap_or_else(|_| "false".to_string());
    if keep_data == "true" {
        println!("⚠️  Keeping test data (KEEP_TEST_DATA=true)");
        return Ok(());
    }
    if test_data_dir.exists() {
        fs::remove_dir_all(test_data_dir)
            .with_context(|| format!("Failed to remove {:?}", test_data_dir))?;
    }
    Ok(())
}
