pub mod config;
pub mod modules;
pub mod api;
pub mod utils;

#[cfg(test)]
mod _test_mock;

pub use config::{CompanionConfig, CompletionConfig, ConfigError, Identity};
pub use api::{ChatSession, Companion, CompanionError, LogRefresher};
pub use modules::completion::{CompletionBackend, CompletionClient, CompletionError, OpenAiBackend};
pub use modules::effects::{ChatDisplay, ImageSink, SinkError, SpeechSink};
pub use modules::emotion::{EmotionLabel, EmotionTaxonomy, TaxonomyLoader};
pub use modules::interaction::{InteractionPipeline, PipelineError, PipelineState, TurnOutcome};
pub use modules::memory::{ConversationLog, RollingHistory, Speaker};
