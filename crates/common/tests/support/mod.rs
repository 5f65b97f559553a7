//! Shared test utilities: a fake Pinata API served by axum on an ephemeral port
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use url::Url;

use common::gateway::{PinataClient, PinataConfig};
use common::object::ContentHash;

pub const API_KEY: &str = "test-key";
pub const API_SECRET: &str = "test-secret";

/// Page size Pinata uses when `pageLimit` is not given.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct FakePin {
    pub hash: String,
    pub name: Option<String>,
    pub keyvalues: Value,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

#[derive(Debug, Default)]
struct FakeState {
    pins: Vec<FakePin>,
    /// Status returned by the next request, whatever it is
    fail_next: Option<StatusCode>,
    /// Raw query strings received by pinList
    pin_list_queries: Vec<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default)]
pub struct FakePinata {
    state: Arc<Mutex<FakeState>>,
}

impl FakePinata {
    pub fn pins(&self) -> Vec<FakePin> {
        self.state.lock().pins.clone()
    }

    pub fn pin(&self, hash: &ContentHash) -> Option<FakePin> {
        self.pins().into_iter().find(|pin| pin.hash == hash.as_str())
    }

    pub fn fail_next(&self, status: StatusCode) {
        self.state.lock().fail_next = Some(status);
    }

    pub fn pin_list_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().pin_list_queries.clone()
    }

    /// Pin directly, as if another client had uploaded it.
    pub fn seed(&self, hash: &str, name: &str, keyvalues: Value) {
        self.state.lock().pins.push(FakePin {
            hash: hash.to_string(),
            name: Some(name.to_string()),
            keyvalues,
            file_name: None,
            content_type: None,
            size: 0,
        });
    }

    fn gate(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        if let Some(status) = self.state.lock().fail_next.take() {
            return Err(status);
        }
        let key = headers.get("pinata_api_key").and_then(|v| v.to_str().ok());
        let secret = headers
            .get("pinata_secret_api_key")
            .and_then(|v| v.to_str().ok());
        if key == Some(API_KEY) && secret == Some(API_SECRET) {
            Ok(())
        } else {
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Start the fake gateway, returning its base URL and a handle to its state.
pub async fn spawn_fake_pinata() -> (Url, FakePinata) {
    let fake = FakePinata::default();

    let router = Router::new()
        .route("/pinning/pinFileToIPFS", post(pin_file))
        .route("/data/pinList", get(pin_list))
        .route("/pinning/hashMetadata", put(hash_metadata))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let url = Url::parse(&format!("http://{}", addr)).unwrap();
    (url, fake)
}

/// A Pinata client pointed at the fake, with valid credentials.
pub async fn setup_pinata() -> (PinataClient, FakePinata) {
    let (url, fake) = spawn_fake_pinata().await;
    let config = PinataConfig::new(url, Some(API_KEY.into()), Some(API_SECRET.into())).unwrap();
    (PinataClient::new(config).unwrap(), fake)
}

async fn pin_file(
    State(fake): State<FakePinata>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, StatusCode> {
    fake.gate(&headers)?;

    let mut bytes = None;
    let mut file_name = None;
    let mut content_type = None;
    let mut metadata = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                bytes = Some(field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?);
            }
            Some("pinataMetadata") => {
                let text = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                let value: Value =
                    serde_json::from_str(&text).map_err(|_| StatusCode::BAD_REQUEST)?;
                metadata = Some(value);
            }
            _ => {}
        }
    }

    let bytes = bytes.ok_or(StatusCode::BAD_REQUEST)?;
    let metadata = metadata.unwrap_or_else(|| json!({}));
    let hash = ContentHash::of_bytes(&bytes)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .to_string();

    fake.state.lock().pins.push(FakePin {
        hash: hash.clone(),
        name: metadata["name"].as_str().map(str::to_string),
        keyvalues: metadata["keyvalues"].clone(),
        file_name,
        content_type,
        size: bytes.len(),
    });

    Ok(Json(json!({
        "IpfsHash": hash,
        "PinSize": bytes.len(),
        "Timestamp": "2024-01-01T00:00:00.000Z",
    })))
}

async fn pin_list(
    State(fake): State<FakePinata>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    fake.gate(&headers)?;

    let mut state = fake.state.lock();
    state.pin_list_queries.push(query.clone());

    let limit = page_param(&query, "pageLimit").unwrap_or(DEFAULT_PAGE_LIMIT);
    let offset = page_param(&query, "pageOffset").unwrap_or(0);

    let matching: Vec<&FakePin> = state
        .pins
        .iter()
        .filter(|pin| match query.get("hashContains") {
            Some(needle) => pin.hash.contains(needle.as_str()),
            None => true,
        })
        .collect();
    let count = matching.len();

    let rows: Vec<Value> = matching
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|pin| {
            let keyvalues = match &pin.keyvalues {
                Value::Object(map) if map.is_empty() => Value::Null,
                other => other.clone(),
            };
            json!({
                "id": format!("id-{}", pin.hash),
                "ipfs_pin_hash": pin.hash,
                "size": pin.size,
                "date_pinned": "2024-01-01T00:00:00.000Z",
                "metadata": { "name": pin.name, "keyvalues": keyvalues },
            })
        })
        .collect();

    Ok(Json(json!({ "count": count, "rows": rows })))
}

fn page_param(query: &HashMap<String, String>, key: &str) -> Option<usize> {
    query.get(key).and_then(|value| value.parse().ok())
}

async fn hash_metadata(
    State(fake): State<FakePinata>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<&'static str, StatusCode> {
    fake.gate(&headers)?;

    let hash = body["ipfsPinHash"]
        .as_str()
        .ok_or(StatusCode::BAD_REQUEST)?;

    let mut state = fake.state.lock();
    let pin = state
        .pins
        .iter_mut()
        .find(|pin| pin.hash == hash)
        .ok_or(StatusCode::NOT_FOUND)?;

    if let Some(name) = body["name"].as_str() {
        pin.name = Some(name.to_string());
    }
    pin.keyvalues = body["keyvalues"].clone();

    Ok("OK")
}
