//! HTTP client for the Met Museum collection API
//!
//! Wraps the two endpoints the importer needs: the full object ID listing
//! and individual object records. Every request goes through the retry
//! policy, and fetched records are slimmed down (configured bulky fields
//! removed) before they are handed to the persistence layer.

use crate::config::{Config, RetryConfig};
use crate::db::NewObject;
use crate::error::{Error, Result};
use crate::retry::fetch_with_retry;
use crate::types::ObjectId;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use url::Url;

/// Client for a collection API
///
/// Holds a reqwest client configured with the API's identity and timeout,
/// plus the retry policy applied to every request.
pub struct MetClient {
    /// Underlying HTTP client
    http: reqwest::Client,

    /// Normalized base URL (always ends with a slash)
    base_url: Url,

    /// Retry policy for transient failures
    retry: RetryConfig,

    /// Payload fields stripped before storage
    strip_fields: Vec<String>,
}

/// Response shape of the object listing endpoint
#[derive(Debug, Deserialize)]
struct ObjectIdsResponse {
    /// The API returns `"objectIDs": null` when no objects match
    #[serde(rename = "objectIDs", default)]
    object_ids: Option<Vec<i64>>,
}

impl MetClient {
    /// Create a new client from the API and retry sections of a config
    ///
    /// # Errors
    /// Returns an error if the base URL or user agent is invalid, or if the
    /// HTTP client cannot be created.
    pub fn new(config: &Config) -> Result<Self> {
        let mut base_url = Url::parse(&config.api.base_url).map_err(|e| Error::Config {
            message: format!("invalid base URL '{}': {}", config.api.base_url, e),
            key: Some("api.base_url".to_string()),
        })?;

        // Endpoint paths are appended textually, so the base must end with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let user_agent =
            HeaderValue::from_str(&config.api.user_agent).map_err(|e| Error::Config {
                message: format!("invalid user agent: {}", e),
                key: Some("api.user_agent".to_string()),
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.api.request_timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url,
            retry: config.retry.clone(),
            strip_fields: config.import.strip_fields.clone(),
        })
    }

    /// Fetch the full object ID listing from the remote API
    ///
    /// Rate limiting that outlasts the retry policy and non-success statuses
    /// yield an empty listing with a warning. Transport failures that survive
    /// the retries and malformed bodies are returned as errors, since an
    /// import cannot proceed without knowing whether the listing exists.
    pub async fn list_object_ids(&self) -> Result<Vec<ObjectId>> {
        let url = format!("{}objects", self.base_url);

        let result = fetch_with_retry(&self.retry, || {
            let request = self.http.get(&url);
            async move {
                let response = request.send().await?;
                if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(Error::RateLimited);
                }
                Ok(response)
            }
        })
        .await;

        let response = match result {
            Ok(response) => response,
            Err(Error::RateLimited) => {
                tracing::warn!(url = %url, "Object listing still rate limited after retries");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                url = %url,
                "Object listing returned non-success status"
            );
            return Ok(Vec::new());
        }

        let body: ObjectIdsResponse = response.json().await?;
        Ok(body
            .object_ids
            .unwrap_or_default()
            .into_iter()
            .map(ObjectId::from)
            .collect())
    }

    /// Fetch a single object record, transform it, and return it ready for storage
    ///
    /// Returns `Ok(None)` when the object cannot be fetched for reasons the
    /// import should survive: the remote refuses the ID (403/404) or keeps
    /// rate limiting past the retry budget. Transport and decode failures are
    /// returned as errors so the caller can count them.
    pub async fn fetch_object(&self, id: ObjectId) -> Result<Option<NewObject>> {
        let url = format!("{}objects/{}", self.base_url, id);

        let result = fetch_with_retry(&self.retry, || {
            let request = self.http.get(&url);
            async move {
                let response = request.send().await?;
                if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(Error::RateLimited);
                }
                Ok(response)
            }
        })
        .await;

        let response = match result {
            Ok(response) => response,
            Err(Error::RateLimited) => {
                tracing::warn!(
                    object_id = id.get(),
                    "Object still rate limited after retries"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                object_id = id.get(),
                status = status.as_u16(),
                "Object fetch returned non-success status"
            );
            return Ok(None);
        }

        let payload: serde_json::Value = response.json().await?;
        self.transform(id, payload).map(Some)
    }

    /// Strip configured bulky fields from a payload and extract its title
    fn transform(&self, id: ObjectId, mut payload: serde_json::Value) -> Result<NewObject> {
        let title = match payload.as_object_mut() {
            Some(map) => {
                for field in &self.strip_fields {
                    map.remove(field);
                }
                map.get("title").and_then(|v| v.as_str()).map(String::from)
            }
            None => {
                return Err(Error::Transform(format!(
                    "object {} payload is not a JSON object",
                    id
                )));
            }
        };

        Ok(NewObject {
            id,
            title,
            payload: serde_json::to_string(&payload)?,
            retrieved_at: chrono::Utc::now().timestamp(),
        })
    }
}
