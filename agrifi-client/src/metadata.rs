// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The off-chain store holding crop images and metadata documents.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::tokenize::{ImageFile, TokenizeRequest};

/// The gateway used to read `ipfs://` URIs.
pub const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request to {url} failed with status {status}: {body}")]
    Status { url: String, status: u16, body: String },
    #[error("the metadata store answered without an `imageUrl`: {0}")]
    MissingUrl(Value),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// A store that accepts file uploads and answers with the URL of the stored file.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn upload(&self, file: ImageFile) -> Result<String, Error>;
}

fn reqwest_client() -> Result<reqwest::Client, Error> {
    Ok(reqwest::ClientBuilder::new()
        .timeout(std::time::Duration::from_secs(30))
        .build()?)
}

/// A [`MetadataStore`] reached over HTTP. Files are posted as the `image` field of a
/// multipart form; the answer is a JSON object with an `imageUrl` field.
#[derive(Clone, Debug)]
pub struct HttpMetadataStore {
    url: Url,
    client: reqwest::Client,
}

impl HttpMetadataStore {
    pub fn new(url: Url) -> Result<Self, Error> {
        Ok(Self {
            url,
            client: reqwest_client()?,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl MetadataStore for HttpMetadataStore {
    async fn upload(&self, file: ImageFile) -> Result<String, Error> {
        tracing::debug!(
            file_name = %file.file_name,
            size = file.bytes.len(),
            "uploading to {}",
            self.url
        );
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        let form = reqwest::multipart::Form::new().part("image", part);
        let response = self
            .client
            .post(self.url.clone())
            .multipart(form)
            .send()
            .await?;
        let value = json_body(response).await?;
        match value.get("imageUrl").and_then(Value::as_str) {
            Some(url) => Ok(url.to_string()),
            None => Err(Error::MissingUrl(value)),
        }
    }
}

async fn json_body(response: reqwest::Response) -> Result<Value, Error> {
    let status = response.status();
    if !status.is_success() {
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .unwrap_or_else(|error| format!("Could not get response text: {error}"));
        return Err(Error::Status {
            url,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

/// One `trait_type`/`value` pair of a metadata document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: Value,
}

/// The JSON document a crop's `metadataURI` points to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "imageUrl", alias = "image_url")]
    pub image: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl CropMetadata {
    /// The document describing a crop about to be tokenized, whose image is stored at
    /// `image`.
    pub fn for_crop(request: &TokenizeRequest, image: String) -> Self {
        CropMetadata {
            name: format!("{} - {}", request.crop_type, request.variety),
            description: format!(
                "Token representing {} ({})",
                request.crop_type, request.variety
            ),
            image,
            attributes: vec![
                Attribute {
                    trait_type: "Harvest Date".to_string(),
                    value: Value::String(request.harvest_date_text.clone()),
                },
                Attribute {
                    trait_type: "Carbon Credits".to_string(),
                    value: Value::String(request.carbon_credits.to_string()),
                },
            ],
        }
    }

    /// The document as an uploadable `metadata.json` file.
    pub fn to_file(&self) -> Result<ImageFile, Error> {
        Ok(ImageFile {
            file_name: "metadata.json".to_string(),
            content_type: "application/json".to_string(),
            bytes: serde_json::to_vec(self)?,
        })
    }

    /// The value of the attribute named `trait_type`, if present.
    pub fn attribute(&self, trait_type: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|attribute| attribute.trait_type == trait_type)
            .map(|attribute| &attribute.value)
    }

    /// A fetchable URL for the image, or `None` if the document has no image.
    pub fn image_url(&self) -> Option<String> {
        (!self.image.is_empty()).then(|| resolve_uri(&self.image))
    }
}

/// Maps `ipfs://` URIs to the public gateway. Other URIs are returned as they are.
pub fn resolve_uri(uri: &str) -> String {
    match uri.strip_prefix("ipfs://") {
        Some(path) => format!("{IPFS_GATEWAY}{path}"),
        None => uri.to_string(),
    }
}

/// Downloads and parses the metadata document at `uri`.
pub async fn fetch(uri: &str) -> Result<CropMetadata, Error> {
    let url = Url::parse(&resolve_uri(uri))?;
    let response = reqwest_client()?.get(url).send().await?;
    let value = json_body(response).await?;
    Ok(serde_json::from_value(value)?)
}
