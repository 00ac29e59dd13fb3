use async_trait::async_trait;
use sprite_companion::modules::completion::{ChatRequest, CompletionBackend, CompletionError};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// One reply followed by one classification answer.
    pub fn turn(reply: &str, classification: &str) -> Self {
        Self::new().then_turn(reply, classification)
    }

    pub fn then_turn(self, reply: &str, classification: &str) -> Self {
        self.with_reply(Ok(reply.to_string()))
            .with_reply(Ok(classification.to_string()))
    }

    pub fn with_reply(self, reply: Result<String, String>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: ChatRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request);

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(CompletionError::Api { status: 503, message }),
            None => Err(CompletionError::EmptyResponse),
        }
    }
}

/// Wraps a [`ScriptedBackend`] and holds every answer back for `delay`.
pub struct DelayedBackend {
    pub inner: ScriptedBackend,
    pub delay: std::time::Duration,
}

#[async_trait]
impl CompletionBackend for DelayedBackend {
    async fn complete(&self, request: ChatRequest) -> Result<String, CompletionError> {
        tokio::time::sleep(self.delay).await;
        self.inner.complete(request).await
    }
}
