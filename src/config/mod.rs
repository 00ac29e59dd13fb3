pub mod companion_config;

pub use companion_config::{
    CompanionConfig, CompletionConfig, ConfigError, DisplayConfig, HistoryConfig, Identity,
    PathsConfig, SpeechConfig,
};
