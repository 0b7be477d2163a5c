//! Supabase Storage backend
//!
//! Writes objects through the Storage REST API with the service role key.
//! Uploads overwrite (`x-upsert`) and carry a short cache lifetime so the
//! display page never shows a stale frame for long.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};

use crate::api::ApiError;
use crate::config::Config;

use super::{ObjectStore, UploadError, UploadTarget};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Cache lifetime set on stored objects
const CACHE_CONTROL: &str = "max-age=30";

pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    key: String,
}

impl SupabaseStorage {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, UploadError> {
        Self::new(config.storage_base_url.clone(), config.storage_key.clone())
    }

    fn object_url(&self, target: &UploadTarget) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            target.bucket,
            target.path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn put_object(
        &self,
        target: &UploadTarget,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), UploadError> {
        let response = self
            .client
            .put(self.object_url(target))
            .bearer_auth(&self.key)
            .header("apikey", &self.key)
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .header(header::CACHE_CONTROL, CACHE_CONTROL)
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(UploadError::Status {
                status: status.as_u16(),
                body: ApiError::truncate_body(&body),
            })
        }
    }
}
