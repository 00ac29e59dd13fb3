pub mod client;
pub mod openai;
pub mod types;

pub use client::{CompletionClient, FALLBACK_REPLY};
pub use openai::{CompletionBackend, OpenAiBackend};
pub use types::{ChatMessage, ChatRequest, CompletionError, ResponseFormat, Role};
