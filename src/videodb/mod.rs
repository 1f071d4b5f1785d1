//! Video data source collaborator.
//!
//! The hook template agent only talks to a video database through
//! [`VideoDataSource`]; a fresh handle is obtained per invocation from a
//! [`VideoDbConnector`] for the requested collection.

mod http;

pub use http::{HttpVideoDb, HttpVideoDbConnector};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A scene index that exists for a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneIndexRef {
    pub scene_index_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// One scene record inside a scene index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub description: String,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
}

impl Scene {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            start: None,
            end: None,
        }
    }
}

/// Operations the agents need from a video database, scoped to one collection
#[async_trait]
pub trait VideoDataSource: Send + Sync {
    /// Fetch the plain-text transcript. Fails if the video has no spoken-word index yet.
    async fn get_transcript(&self, video_id: &str) -> Result<String>;

    /// Build the spoken-word index so a transcript becomes available
    async fn index_spoken_words(&self, video_id: &str) -> Result<()>;

    /// List existing scene indexes, oldest first
    async fn list_scene_index(&self, video_id: &str) -> Result<Vec<SceneIndexRef>>;

    /// Fetch the scenes of one scene index
    async fn get_scene_index(&self, video_id: &str, scene_index_id: &str) -> Result<Vec<Scene>>;

    /// Create a new scene index; `None` when the service produced nothing
    async fn index_scene(&self, video_id: &str) -> Result<Option<SceneIndexRef>>;
}

/// Opens a [`VideoDataSource`] for a collection
#[async_trait]
pub trait VideoDbConnector: Send + Sync {
    async fn connect(&self, collection_id: &str) -> Result<Box<dyn VideoDataSource>>;
}
