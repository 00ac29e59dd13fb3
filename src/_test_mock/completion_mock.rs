use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::modules::completion::openai::CompletionBackend;
use crate::modules::completion::types::{ChatRequest, CompletionError};

/// Backend answering from a queue of scripted results and recording every
/// request it receives. An exhausted queue answers with an empty response.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
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
            Some(Err(message)) => Err(CompletionError::Api { status: 500, message }),
            None => Err(CompletionError::EmptyResponse),
        }
    }
}
