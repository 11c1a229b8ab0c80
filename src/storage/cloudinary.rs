//! Cloudinary backend, deleting through the Admin API.

use super::{AssetRef, AssetStore, StorageError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

pub struct CloudinaryStore {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    deleted: HashMap<String, String>,
}

impl CloudinaryStore {
    pub fn new(
        cloud_name: String,
        api_key: String,
        api_secret: String,
    ) -> Result<Self, StorageError> {
        if cloud_name.is_empty() || api_key.is_empty() || api_secret.is_empty() {
            return Err(StorageError::Config(
                "cloudinary backend needs cloud name, api key and api secret".into(),
            ));
        }

        log::info!("CloudinaryStore initialized for cloud: {}", cloud_name);

        Ok(Self {
            client: reqwest::Client::new(),
            cloud_name,
            api_key,
            api_secret,
        })
    }

    fn resources_url(&self, resource_type: &str) -> String {
        format!(
            "{}/{}/resources/{}/upload",
            API_BASE, self.cloud_name, resource_type
        )
    }
}

/// Interprets the per-id outcome Cloudinary reports.
fn check_outcome(response: &DeleteResponse, public_id: &str) -> Result<(), StorageError> {
    match response.deleted.get(public_id).map(String::as_str) {
        Some("deleted") => Ok(()),
        Some("not_found") => Err(StorageError::NotFound(public_id.to_string())),
        Some(other) => Err(StorageError::Cloudinary(format!(
            "{}: {}",
            public_id, other
        ))),
        None => Err(StorageError::Cloudinary(format!(
            "{}: missing from delete response",
            public_id
        ))),
    }
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    fn name(&self) -> &'static str {
        "cloudinary"
    }

    async fn delete(&self, asset: &AssetRef) -> Result<(), StorageError> {
        log::info!(
            "CloudinaryStore: delete {} {}",
            asset.resource_type,
            asset.public_id
        );

        let response = self
            .client
            .delete(self.resources_url(&asset.resource_type))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .query(&[("public_ids[]", asset.public_id.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Cloudinary(format!("{}: {}", status, body)));
        }

        let body: DeleteResponse = response.json().await?;
        check_outcome(&body, &asset.public_id)
    }
}
