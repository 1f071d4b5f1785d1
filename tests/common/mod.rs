#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use hooksmith::{
    AgentRegistry, HookTemplateAgent, LlmProvider, LlmResponse, Message, ResponseFormat, Scene,
    SceneIndexRef, VideoDataSource, VideoDbConnector,
};

pub const TEMPLATE_REPLY: &str = r#"{
    "script": "You only get one first minute.",
    "visuals": ["Host at the studio desk", "Guest leaning into the mic"],
    "transitions": "Clean cuts",
    "music": "Soft ambient bed",
    "sound_effects": "None",
    "pacing": "Steady and conversational"
}"#;

/// A mock LLM provider that replays scripted responses in order and
/// remembers every prompt it was sent.
pub struct MockLlmProvider {
    responses: Mutex<VecDeque<LlmResponse>>,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmProvider {
    /// A mock that answers once with the given content.
    pub fn replying(content: &str) -> Self {
        Self::with_responses(vec![LlmResponse::success(content)])
    }

    /// A mock whose single request fails at the request level.
    pub fn failing(reason: &str) -> Self {
        Self::with_responses(vec![LlmResponse::failure(reason)])
    }

    pub fn with_responses(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn chat_completions(
        &self,
        messages: &[Message],
        response_format: ResponseFormat,
    ) -> Result<LlmResponse> {
        assert_eq!(response_format, ResponseFormat::JsonObject);
        let prompt = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);

        let mut queue = self.responses.lock().unwrap();
        queue
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("MockLlmProvider: no more responses in queue"))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// How a scripted video database call behaves
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Ok(T),
    Fail(&'static str),
}

impl<T: Clone> Outcome<T> {
    fn result(&self) -> Result<T> {
        match self {
            Outcome::Ok(v) => Ok(v.clone()),
            Outcome::Fail(msg) => Err(anyhow::anyhow!(*msg)),
        }
    }
}

/// Scripted video database that records which operations were called.
pub struct MockVideoDb {
    /// Transcript fetches, consumed in order; the last one repeats
    transcripts: Mutex<VecDeque<Outcome<String>>>,
    index_spoken_words: Outcome<()>,
    list_scene_index: Outcome<Vec<SceneIndexRef>>,
    get_scene_index: Outcome<Vec<Scene>>,
    index_scene: Outcome<Option<SceneIndexRef>>,
    calls: Mutex<Vec<String>>,
}

impl MockVideoDb {
    /// Transcript available, no scene index yet, scene creation succeeds.
    pub fn new() -> Self {
        Self {
            transcripts: Mutex::new(VecDeque::from([Outcome::Ok(
                "Welcome back to the show. Today we talk about shipping fast.".to_string(),
            )])),
            index_spoken_words: Outcome::Ok(()),
            list_scene_index: Outcome::Ok(Vec::new()),
            get_scene_index: Outcome::Ok(vec![
                Scene::new("Two hosts at a studio desk"),
                Scene::new("Close-up of the guest"),
            ]),
            index_scene: Outcome::Ok(Some(scene_ref("new-index"))),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn transcripts(self, outcomes: Vec<Outcome<String>>) -> Self {
        *self.transcripts.lock().unwrap() = VecDeque::from(outcomes);
        self
    }

    pub fn index_spoken_words(mut self, outcome: Outcome<()>) -> Self {
        self.index_spoken_words = outcome;
        self
    }

    pub fn list_scene_index(mut self, outcome: Outcome<Vec<SceneIndexRef>>) -> Self {
        self.list_scene_index = outcome;
        self
    }

    pub fn get_scene_index(mut self, outcome: Outcome<Vec<Scene>>) -> Self {
        self.get_scene_index = outcome;
        self
    }

    pub fn index_scene(mut self, outcome: Outcome<Option<SceneIndexRef>>) -> Self {
        self.index_scene = outcome;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn scene_ref(id: &str) -> SceneIndexRef {
    SceneIndexRef {
        scene_index_id: id.to_string(),
        name: None,
    }
}

#[async_trait]
impl VideoDataSource for MockVideoDb {
    async fn get_transcript(&self, _video_id: &str) -> Result<String> {
        self.record("get_transcript".to_string());
        let mut queue = self.transcripts.lock().unwrap();
        let outcome = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        outcome
            .ok_or_else(|| anyhow::anyhow!("MockVideoDb: no transcript scripted"))?
            .result()
    }

    async fn index_spoken_words(&self, _video_id: &str) -> Result<()> {
        self.record("index_spoken_words".to_string());
        self.index_spoken_words.result()
    }

    async fn list_scene_index(&self, _video_id: &str) -> Result<Vec<SceneIndexRef>> {
        self.record("list_scene_index".to_string());
        self.list_scene_index.result()
    }

    async fn get_scene_index(&self, _video_id: &str, scene_index_id: &str) -> Result<Vec<Scene>> {
        self.record(format!("get_scene_index:{}", scene_index_id));
        self.get_scene_index.result()
    }

    async fn index_scene(&self, _video_id: &str) -> Result<Option<SceneIndexRef>> {
        self.record("index_scene".to_string());
        self.index_scene.result()
    }
}

/// Hands out the same mock database for every collection.
pub struct MockConnector {
    pub db: Arc<MockVideoDb>,
    pub collections: Mutex<Vec<String>>,
}

impl MockConnector {
    pub fn new(db: MockVideoDb) -> Self {
        Self {
            db: Arc::new(db),
            collections: Mutex::new(Vec::new()),
        }
    }
}

struct SharedDb(Arc<MockVideoDb>);

#[async_trait]
impl VideoDataSource for SharedDb {
    async fn get_transcript(&self, video_id: &str) -> Result<String> {
        self.0.get_transcript(video_id).await
    }

    async fn index_spoken_words(&self, video_id: &str) -> Result<()> {
        VideoDataSource::index_spoken_words(&*self.0, video_id).await
    }

    async fn list_scene_index(&self, video_id: &str) -> Result<Vec<SceneIndexRef>> {
        VideoDataSource::list_scene_index(&*self.0, video_id).await
    }

    async fn get_scene_index(&self, video_id: &str, scene_index_id: &str) -> Result<Vec<Scene>> {
        VideoDataSource::get_scene_index(&*self.0, video_id, scene_index_id).await
    }

    async fn index_scene(&self, video_id: &str) -> Result<Option<SceneIndexRef>> {
        VideoDataSource::index_scene(&*self.0, video_id).await
    }
}

#[async_trait]
impl VideoDbConnector for MockConnector {
    async fn connect(&self, collection_id: &str) -> Result<Box<dyn VideoDataSource>> {
        self.collections
            .lock()
            .unwrap()
            .push(collection_id.to_string());
        Ok(Box::new(SharedDb(self.db.clone())))
    }
}

/// Build the hook template agent over mocks, keeping handles for assertions.
pub fn hook_agent(
    llm: MockLlmProvider,
    db: MockVideoDb,
) -> (HookTemplateAgent, Arc<MockLlmProvider>, Arc<MockConnector>) {
    let llm = Arc::new(llm);
    let connector = Arc::new(MockConnector::new(db));
    let agent = HookTemplateAgent::new(llm.clone(), connector.clone());
    (agent, llm, connector)
}

/// A registry holding only the hook template agent.
pub fn hook_registry(llm: MockLlmProvider, db: MockVideoDb) -> AgentRegistry {
    let (agent, _, _) = hook_agent(llm, db);
    let mut registry = AgentRegistry::new();
    registry.register(agent).expect("hook template agent describes itself");
    registry
}

pub fn hook_args() -> serde_json::Value {
    serde_json::json!({
        "video_id": "m-123",
        "collection_id": "c-456",
        "prompt": "Energetic, quote-driven opener",
    })
}
