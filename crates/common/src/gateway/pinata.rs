use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Gateway, GatewayError, KeyValues, PinMetadata, PinRecord};
use crate::object::{ContentHash, Upload};

pub const DEFAULT_GATEWAY_URL: &str = "https://api.pinata.cloud";

const API_KEY_HEADER: &str = "pinata_api_key";
const API_SECRET_HEADER: &str = "pinata_secret_api_key";

/// Pinata caps a single page of `pinList` at this many rows.
const PIN_LIST_PAGE_LIMIT: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("missing gateway credential: {0}")]
    MissingCredential(&'static str),
    #[error("gateway credential {0} is not a valid header value")]
    InvalidCredential(&'static str),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Where and as whom to talk to Pinata.
#[derive(Clone)]
pub struct PinataConfig {
    pub base_url: Url,
    api_key: String,
    api_secret: String,
}

impl std::fmt::Debug for PinataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinataConfig")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PinataConfig {
    /// Both credentials are required; an absent or empty one is fatal.
    pub fn new(
        base_url: Url,
        api_key: Option<String>,
        api_secret: Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigurationError::MissingCredential("api key"))?;
        let api_secret = api_secret
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigurationError::MissingCredential("api secret"))?;

        Ok(Self {
            base_url,
            api_key,
            api_secret,
        })
    }
}

/// [`Gateway`] over the Pinata HTTP API.
#[derive(Debug, Clone)]
pub struct PinataClient {
    base_url: Url,
    client: Client,
}

impl PinataClient {
    pub fn new(config: PinataConfig) -> Result<Self, ConfigurationError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            API_KEY_HEADER,
            sensitive_header(&config.api_key, "api key")?,
        );
        default_headers.insert(
            API_SECRET_HEADER,
            sensitive_header(&config.api_secret, "api secret")?,
        );
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            base_url: with_trailing_slash(config.base_url),
            client,
        })
    }

    /// Get the base URL for gateway requests
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        Ok(self.base_url.join(path)?)
    }

    async fn pin_list(&self, query: &[(&str, &str)]) -> Result<PinListResponse, GatewayError> {
        let url = self.endpoint("data/pinList")?;
        let response = self.client.get(url).query(query).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }
}

#[async_trait]
impl Gateway for PinataClient {
    async fn upload(
        &self,
        upload: &Upload,
        keyvalues: KeyValues,
    ) -> Result<ContentHash, GatewayError> {
        let failed = |e: &dyn std::fmt::Display| GatewayError::Upload(e.to_string());

        let metadata = PinMetadata {
            name: Some(upload.name.clone()),
            keyvalues,
        };
        let metadata = serde_json::to_string(&metadata).map_err(|e| failed(&e))?;

        let file = Part::bytes(upload.bytes.clone())
            .file_name(upload.name.clone())
            .mime_str(&upload.mime_type)
            .map_err(|e| failed(&e))?;
        let form = Form::new()
            .part("file", file)
            .text("pinataMetadata", metadata);

        let url = self
            .endpoint("pinning/pinFileToIPFS")
            .map_err(|e| failed(&e))?;

        tracing::debug!(
            name = %upload.name,
            size = upload.byte_size(),
            "uploading file to gateway"
        );

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| failed(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Upload(format!("HTTP status {}: {}", status, body)));
        }

        let pinned: PinFileResponse = response.json().await.map_err(|e| failed(&e))?;
        Ok(ContentHash::from_gateway(pinned.ipfs_hash))
    }

    async fn get_metadata(&self, hash: &ContentHash) -> Result<PinMetadata, GatewayError> {
        let list = match self
            .pin_list(&[("hashContains", hash.as_str()), ("status", "pinned")])
            .await
        {
            Err(GatewayError::HttpStatus(StatusCode::NOT_FOUND, _)) => {
                return Err(GatewayError::NotFound(hash.clone()))
            }
            result => result?,
        };

        // hashContains is a substring match
        list.rows
            .into_iter()
            .find(|row| row.ipfs_pin_hash == hash.as_str())
            .map(|row| row.metadata)
            .ok_or_else(|| GatewayError::NotFound(hash.clone()))
    }

    async fn update_metadata(
        &self,
        hash: &ContentHash,
        metadata: PinMetadata,
    ) -> Result<(), GatewayError> {
        let url = self.endpoint("pinning/hashMetadata")?;
        let body = HashMetadataRequest {
            ipfs_pin_hash: hash.as_str(),
            name: metadata.name.as_deref(),
            keyvalues: &metadata.keyvalues,
        };

        let response = self.client.put(url).json(&body).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<PinRecord>, GatewayError> {
        let limit = PIN_LIST_PAGE_LIMIT.to_string();
        let mut pins = Vec::new();

        loop {
            let offset = pins.len().to_string();
            let page = self
                .pin_list(&[
                    ("status", "pinned"),
                    ("pageLimit", limit.as_str()),
                    ("pageOffset", offset.as_str()),
                ])
                .await?;

            let fetched = page.rows.len();
            pins.extend(page.rows.into_iter().map(|row| PinRecord {
                hash: ContentHash::from_gateway(row.ipfs_pin_hash),
                metadata: row.metadata,
            }));

            let exhausted = page.count.is_some_and(|count| pins.len() >= count);
            if fetched < PIN_LIST_PAGE_LIMIT || exhausted {
                break;
            }
        }

        tracing::debug!(pins = pins.len(), "listed pins");
        Ok(pins)
    }
}

/// `Url::join` drops the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn sensitive_header(value: &str, which: &'static str) -> Result<HeaderValue, ConfigurationError> {
    let mut header =
        HeaderValue::from_str(value).map_err(|_| ConfigurationError::InvalidCredential(which))?;
    header.set_sensitive(true);
    Ok(header)
}

async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(GatewayError::HttpStatus(status, response.text().await?))
    }
}

#[derive(Debug, Deserialize)]
struct PinFileResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[derive(Debug, Deserialize)]
struct PinListResponse {
    /// Total matching pins across all pages
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    rows: Vec<PinRow>,
}

#[derive(Debug, Deserialize)]
struct PinRow {
    ipfs_pin_hash: String,
    #[serde(default)]
    metadata: PinMetadata,
}

#[derive(Debug, Serialize)]
struct HashMetadataRequest<'a> {
    #[serde(rename = "ipfsPinHash")]
    ipfs_pin_hash: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    keyvalues: &'a KeyValues,
}
