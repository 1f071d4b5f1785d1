use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use super::{Scene, SceneIndexRef, VideoDataSource, VideoDbConnector};
use crate::config::VideoDbSettings;

/// Response envelope used by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self, what: &str) -> Result<Option<T>> {
        if !self.success {
            anyhow::bail!(
                "{} failed: {}",
                what,
                self.message.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(self.data)
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptData {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SceneIndexList {
    #[serde(default)]
    scene_indexes: Vec<SceneIndexRef>,
}

#[derive(Debug, Deserialize)]
struct SceneIndexRecords {
    #[serde(default)]
    scene_index_records: Vec<Scene>,
}

#[derive(Debug, Deserialize)]
struct CreatedSceneIndex {
    scene_index_id: Option<String>,
}

/// Video database client for a single collection, over the REST API
pub struct HttpVideoDb {
    client: Client,
    base_url: String,
    api_key: String,
    collection_id: String,
}

impl HttpVideoDb {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        collection_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            collection_id: collection_id.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("x-access-token", &self.api_key)
            .query(&[("collection_id", self.collection_id.as_str())])
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<Option<T>> {
        let response = request
            .send()
            .await
            .with_context(|| format!("{} request failed", what))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read {} response", what))?;
        debug!(what, %status, bytes = body.len(), "video db response");

        if !status.is_success() {
            anyhow::bail!("{} returned {}: {}", what, status, body);
        }

        parse_envelope(&body, what)
    }
}

fn parse_envelope<T: DeserializeOwned>(body: &str, what: &str) -> Result<Option<T>> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .with_context(|| format!("invalid {} response body", what))?;
    envelope.into_data(what)
}

#[async_trait]
impl VideoDataSource for HttpVideoDb {
    async fn get_transcript(&self, video_id: &str) -> Result<String> {
        let request = self
            .request(Method::GET, &format!("video/{}/transcription/", video_id))
            .query(&[("text", "true")]);
        let data: Option<TranscriptData> = self.send(request, "get transcript").await?;
        data.and_then(|d| d.text)
            .with_context(|| format!("no transcript available for video {}", video_id))
    }

    async fn index_spoken_words(&self, video_id: &str) -> Result<()> {
        let request = self
            .request(Method::POST, &format!("video/{}/index", video_id))
            .json(&json!({ "index_type": "spoken_word" }));
        let _: Option<Value> = self.send(request, "index spoken words").await?;
        Ok(())
    }

    async fn list_scene_index(&self, video_id: &str) -> Result<Vec<SceneIndexRef>> {
        let request = self.request(Method::GET, &format!("video/{}/index/scene/", video_id));
        let data: Option<SceneIndexList> = self.send(request, "list scene index").await?;
        Ok(data.map(|d| d.scene_indexes).unwrap_or_default())
    }

    async fn get_scene_index(&self, video_id: &str, scene_index_id: &str) -> Result<Vec<Scene>> {
        let request = self.request(
            Method::GET,
            &format!("video/{}/index/scene/{}", video_id, scene_index_id),
        );
        let data: Option<SceneIndexRecords> = self.send(request, "get scene index").await?;
        Ok(data.map(|d| d.scene_index_records).unwrap_or_default())
    }

    async fn index_scene(&self, video_id: &str) -> Result<Option<SceneIndexRef>> {
        let request = self
            .request(Method::POST, &format!("video/{}/index/scene", video_id))
            .json(&json!({}));
        let data: Option<CreatedSceneIndex> = self.send(request, "index scene").await?;
        Ok(data
            .and_then(|d| d.scene_index_id)
            .filter(|id| !id.is_empty())
            .map(|scene_index_id| SceneIndexRef {
                scene_index_id,
                name: None,
            }))
    }
}

/// Builds an [`HttpVideoDb`] per collection, sharing one HTTP client
pub struct HttpVideoDbConnector {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpVideoDbConnector {
    /// Create a connector, reading the API key from the configured environment variable
    pub fn from_settings(settings: &VideoDbSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env).with_context(|| {
            format!("{} environment variable not set", settings.api_key_env)
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl VideoDbConnector for HttpVideoDbConnector {
    async fn connect(&self, collection_id: &str) -> Result<Box<dyn VideoDataSource>> {
        if collection_id.trim().is_empty() {
            anyhow::bail!("collection id must not be empty");
        }
        Ok(Box::new(HttpVideoDb::new(
            self.client.clone(),
            &self.base_url,
            &self.api_key,
            collection_id,
        )))
    }
}
