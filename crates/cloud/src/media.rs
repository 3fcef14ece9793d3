//! Media store client (Cloudinary signed upload API).
//!
//! Uploads are signed with SHA-256: the alphabetically sorted `key=value`
//! parameters joined with `&`, followed by the API secret. Audio is stored
//! under Cloudinary's `video` resource type.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Errors from the media store layer.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// No credentials configured.
    #[error("Media store is not configured")]
    Disabled,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Media store API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Unexpected media store response: {0}")]
    Decode(String),
}

/// Storage class of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Image,
    /// Video and audio.
    Video,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Video => "video",
        }
    }
}

/// Where and how to store an upload.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub resource_type: ResourceType,
    pub folder: Option<String>,
    pub public_id: Option<String>,
    /// Filename sent with the multipart body; its extension helps the store
    /// detect the format.
    pub filename: String,
}

/// The operations the API needs from the media store.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` and return the public HTTPS URL.
    async fn upload(&self, bytes: Vec<u8>, options: &UploadOptions) -> Result<String, MediaError>;

    /// Delete an asset. `Ok(false)` when the store reports nothing deleted.
    async fn destroy(&self, public_id: &str, resource_type: ResourceType)
        -> Result<bool, MediaError>;
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Per-request timeout, covering the upload body.
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Compute the request signature for a set of parameters.
pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let hash = Sha256::digest(format!("{to_sign}{api_secret}").as_bytes());
    format!("{hash:x}")
}

/// Recover `folder/name` (extension stripped) from a delivery URL such as
/// `https://res.cloudinary.com/demo/image/upload/v123/folder/name.jpg`.
pub fn public_id_from_url(url: &str, folder: &str) -> Option<String> {
    let path = url.split(&['?', '#'][..]).next()?;
    let segments: Vec<&str> = path.split('/').collect();
    let start = segments.iter().rposition(|s| *s == folder)?;
    let rest = &segments[start + 1..];
    if rest.is_empty() || rest.iter().any(|s| s.is_empty()) {
        return None;
    }
    let joined = rest.join("/");
    let stem = match joined.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem.to_string(),
        _ => joined,
    };
    Some(format!("{folder}/{stem}"))
}

/// Reduce caller-supplied text to a single public id segment.
///
/// Anything outside `[A-Za-z0-9_-]` becomes `_`, so a value such as a user
/// id can never introduce folders or query syntax.
pub fn public_id_segment(raw: &str) -> String {
    let segment: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if segment.is_empty() {
        "_".to_string()
    } else {
        segment
    }
}

/// [`MediaStore`] backed by Cloudinary.
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
    api_base: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Result<Self, MediaError> {
        Self::with_api_base(config, DEFAULT_API_BASE.to_string())
    }

    /// Point the client at a different API host.
    pub fn with_api_base(config: CloudinaryConfig, api_base: String) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            api_base,
        })
    }

    fn endpoint(&self, resource_type: ResourceType, action: &str) -> String {
        format!(
            "{}/{}/{}/{action}",
            self.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            resource_type.as_str()
        )
    }

    /// Signed form fields for `params`, including `api_key`, `signature`
    /// and `signature_algorithm`.
    fn signed_fields(&self, mut params: BTreeMap<&'static str, String>) -> Vec<(&'static str, String)> {
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());
        let signature = sign(&params, &self.config.api_secret);
        let mut fields: Vec<(&'static str, String)> = params.into_iter().collect();
        fields.push(("api_key", self.config.api_key.clone()));
        fields.push(("signature", signature));
        fields.push(("signature_algorithm", "sha256".to_string()));
        fields
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, MediaError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MediaError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, MediaError> {
        let response = Self::ensure_success(response).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| MediaError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, bytes: Vec<u8>, options: &UploadOptions) -> Result<String, MediaError> {
        let mut params = BTreeMap::new();
        if let Some(folder) = &options.folder {
            params.insert("folder", folder.clone());
        }
        if let Some(public_id) = &options.public_id {
            params.insert("public_id", public_id.clone());
            params.insert("overwrite", "true".to_string());
        }

        let mut form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(bytes).file_name(options.filename.clone()),
        );
        for (key, value) in self.signed_fields(params) {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(self.endpoint(options.resource_type, "upload"))
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = Self::parse_response(response).await?;
        tracing::info!(url = %uploaded.secure_url, "Uploaded asset to media store");
        Ok(uploaded.secure_url)
    }

    async fn destroy(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<bool, MediaError> {
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());
        let fields = self.signed_fields(params);

        let response = self
            .client
            .post(self.endpoint(resource_type, "destroy"))
            .form(&fields)
            .send()
            .await?;
        let destroyed: DestroyResponse = Self::parse_response(response).await?;
        Ok(destroyed.result == "ok")
    }
}
