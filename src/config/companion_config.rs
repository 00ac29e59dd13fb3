use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Temperature = f32;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub name: String,
    pub persona: String,
    pub language: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, persona: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persona: persona.into(),
            ..Self::default()
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: "Yui".to_string(),
            persona: "a friendly desktop sprite who chats warmly, like talking with an old friend".to_string(),
            language: "English".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub api_base: String,
    /// Takes precedence over `api_key_env` when set.
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub model: String,
    pub reply_max_tokens: u32,
    pub reply_temperature: Temperature,
    pub classify_max_tokens: u32,
    pub classify_temperature: Temperature,
    pub timeout_secs: u64,
}

impl CompletionConfig {
    /// Resolves the credential from the config value or the environment.
    /// Blank values count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        let non_blank = |key: String| {
            let key = key.trim().to_string();
            (!key.is_empty()).then_some(key)
        };
        self.api_key
            .clone()
            .and_then(non_blank)
            .or_else(|| std::env::var(&self.api_key_env).ok().and_then(non_blank))
    }

    pub fn validate(&self) -> Result<(), String> {
        let temperatures = [
            ("reply_temperature", self.reply_temperature),
            ("classify_temperature", self.classify_temperature),
        ];

        for (name, value) in temperatures {
            if !(0.0..=2.0).contains(&value) {
                return Err(format!(
                    "Completion setting '{}' has value {}, but must be between 0.0 and 2.0",
                    name, value
                ));
            }
        }

        if self.reply_max_tokens == 0 || self.classify_max_tokens == 0 {
            return Err("Completion token budgets must be greater than zero".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Completion timeout must be greater than zero".to_string());
        }

        Ok(())
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            model: DEFAULT_MODEL.to_string(),
            reply_max_tokens: 100,
            reply_temperature: 0.7,
            classify_max_tokens: 50,
            classify_temperature: 0.5,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_entries: usize,
}

impl HistoryConfig {
    pub fn new(max_entries: impl Into<usize>) -> Self {
        Self {
            max_entries: max_entries.into(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_entries: 6 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Writable per-user directory. `None` means `~/.sprite-companion`.
    pub data_dir: Option<PathBuf>,
    /// Bundled read-only resources. `None` means `./resources`.
    pub resource_dir: Option<PathBuf>,
    pub pictures_dir: String,
    pub taxonomy_file: String,
    pub conversation_file: String,
    pub normal_image: String,
    pub happy_image: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            resource_dir: None,
            pictures_dir: "pictures".to_string(),
            taxonomy_file: "emotion.txt".to_string(),
            conversation_file: "conversation.txt".to_string(),
            normal_image: "Yui_normal.png".to_string(),
            happy_image: "Yui_happy.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    pub program: String,
    pub rate: u32,
    pub voice: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "espeak".to_string(),
            rate: 150,
            voice: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub refresh_interval_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    pub identity: Identity,
    pub completion: CompletionConfig,
    pub history: HistoryConfig,
    pub paths: PathsConfig,
    pub speech: SpeechConfig,
    pub display: DisplayConfig,
}

impl CompanionConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CompanionConfig = toml::from_str(content)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Like [`CompanionConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.completion.validate()?;

        if self.history.max_entries == 0 {
            return Err("History must keep at least one entry".to_string());
        }

        if self.display.refresh_interval_ms == 0 {
            return Err("Display refresh interval must be greater than zero".to_string());
        }

        Ok(())
    }
}
