//! Object storage client for transfer photos

use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Client};
use uuid::Uuid;

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct StorageService {
    client: Client,
    config: StorageConfig,
}

impl StorageService {
    pub fn new(config: StorageConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build storage HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.config.max_upload_bytes
    }

    /// Upload `bytes` under `path` inside the configured bucket and return
    /// its public URL
    pub async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<String> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url(),
            self.config.bucket,
            path
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("apikey", &self.config.api_key)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Upstream("Storage service timed out".to_string())
                } else {
                    AppError::Upstream(format!("Storage service unreachable: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Upload failed ({}): {}",
                status, body
            )));
        }

        Ok(self.public_url(path))
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url(),
            self.config.bucket,
            path
        )
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }
}

/// Object key for a transfer photo: `transfers/{uuid}.{ext}`, the extension
/// taken from the uploaded file name
pub fn transfer_photo_path(file_name: Option<&str>) -> String {
    let ext = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string());
    format!("transfers/{}.{}", Uuid::new_v4(), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(url: &str) -> StorageService {
        StorageService::new(StorageConfig {
            url: url.to_string(),
            api_key: "service-key".to_string(),
            bucket: "Transfer-Images".to_string(),
            max_upload_bytes: 1024,
            request_timeout_secs: 2,
        })
        .unwrap()
    }

    #[test]
    fn test_transfer_photo_path() {
        let path = transfer_photo_path(Some("Truck Photo.PNG"));
        assert!(path.starts_with("transfers/"));
        assert!(path.ends_with(".png"));

        assert!(transfer_photo_path(None).ends_with(".jpg"));
        assert!(transfer_photo_path(Some("no-extension")).ends_with(".jpg"));
        assert!(transfer_photo_path(Some("evil.p/h")).ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/storage/v1/object/Transfer-Images/transfers/a.jpg")
            .match_header("authorization", "Bearer service-key")
            .match_header("content-type", "image/jpeg")
            .with_status(200)
            .with_body(r#"{"Key":"Transfer-Images/transfers/a.jpg"}"#)
            .create_async()
            .await;

        let url = service(&server.url())
            .upload("transfers/a.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            url,
            format!("{}/storage/v1/object/public/Transfer-Images/transfers/a.jpg", server.url())
        );
    }

    #[tokio::test]
    async fn test_upload_failure_is_upstream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/storage/v1/object/Transfer-Images/transfers/b.jpg")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let result = service(&server.url())
            .upload("transfers/b.jpg", vec![0], "image/jpeg")
            .await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }
}
