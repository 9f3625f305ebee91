//! HTTP client for the remote drive service holding the catalog file.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("request timed out")]
    Timeout,
    #[error("drive API error (status {status})")]
    Api { status: u16 },
}

/// Remote storage for the catalog file.
#[async_trait]
pub trait RemoteDrive: Send + Sync {
    /// Fetch the remote copy; `None` when the file does not exist yet.
    async fn download(&self) -> Result<Option<Vec<u8>>, DriveError>;

    /// Overwrite the remote copy.
    async fn upload(&self, bytes: &[u8]) -> Result<(), DriveError>;
}

/// HTTP client for a drive-file API (download media, upload-in-place).
pub struct HttpRemoteDrive {
    client: reqwest::Client,
    base_url: String,
    file_id: String,
    access_token: Option<String>,
}

impl HttpRemoteDrive {
    /// # Arguments
    /// * `base_url` - Base URL of the drive service.
    /// * `file_id` - Identifier of the catalog file on the drive.
    /// * `access_token` - Optional bearer token.
    /// * `timeout_sec` - Request timeout in seconds.
    pub fn new(
        base_url: String,
        file_id: String,
        access_token: Option<String>,
        timeout_sec: u64,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Self {
            client,
            base_url,
            file_id,
            access_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

fn map_transport(err: reqwest::Error) -> DriveError {
    if err.is_timeout() {
        DriveError::Timeout
    } else {
        DriveError::Connection(err.to_string())
    }
}

#[async_trait]
impl RemoteDrive for HttpRemoteDrive {
    async fn download(&self) -> Result<Option<Vec<u8>>, DriveError> {
        let url = format!("{}/files/{}?alt=media", self.base_url, self.file_id);
        debug!("Downloading catalog file from {}", url);

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DriveError::Api {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(map_transport)?;
        Ok(Some(bytes.to_vec()))
    }

    async fn upload(&self, bytes: &[u8]) -> Result<(), DriveError> {
        let url = format!(
            "{}/upload/files/{}?uploadType=media",
            self.base_url, self.file_id
        );
        debug!("Uploading catalog file ({} bytes) to {}", bytes.len(), url);

        let response = self
            .with_auth(self.client.patch(&url))
            .header(reqwest::header::CONTENT_TYPE, "text/tab-separated-values")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DriveError::Api {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let drive = HttpRemoteDrive::new(
            "http://localhost:8080".to_string(),
            "file-1".to_string(),
            None,
            60,
        );
        assert_eq!(drive.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_trailing_slash_removal() {
        let drive = HttpRemoteDrive::new(
            "http://localhost:8080/".to_string(),
            "file-1".to_string(),
            None,
            60,
        );
        assert_eq!(drive.base_url(), "http://localhost:8080");
    }
}
