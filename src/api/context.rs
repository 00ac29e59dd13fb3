use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::api::services::refresh_service::LogRefresher;
use crate::config::{CompanionConfig, ConfigError};
use crate::modules::completion::client::CompletionClient;
use crate::modules::completion::openai::{CompletionBackend, OpenAiBackend};
use crate::modules::effects::sinks::{ChatDisplay, ImageDispatcher, ImageSink, SpeechSink};
use crate::modules::emotion::taxonomy::TaxonomyLoader;
use crate::modules::interaction::pipeline::{InteractionPipeline, PipelineError, PipelineState, TurnOutcome};
use crate::modules::memory::store::ConversationLog;
use crate::utils::paths::ResolvedPaths;
use crate::utils::setup::SetupUtils;

#[derive(Error, Debug)]
pub enum CompanionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No chat session is open")]
    ChatClosed,

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

pub type CompanionResult<T> = Result<T, CompanionError>;

/// An open chat window: one pipeline with its own rolling history, plus the
/// refresher mirroring the conversation log.
pub struct ChatSession {
    pipeline: Arc<Mutex<InteractionPipeline>>,
    state: watch::Receiver<PipelineState>,
    refresher: LogRefresher,
}

impl ChatSession {
    fn new(pipeline: InteractionPipeline, refresher: LogRefresher) -> Self {
        let state = pipeline.subscribe();
        Self {
            pipeline: Arc::new(Mutex::new(pipeline)),
            state,
            refresher,
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresher.is_running()
    }

    /// Rejects the submission instead of queueing it when a turn is running.
    pub async fn submit(&self, text: &str) -> Result<TurnOutcome, PipelineError> {
        let mut pipeline = self
            .pipeline
            .try_lock()
            .map_err(|_| PipelineError::Busy(self.state()))?;
        pipeline.submit(text).await
    }

    pub async fn history_len(&self) -> usize {
        self.pipeline.lock().await.client().history().len()
    }

    async fn close(self) {
        self.refresher.stop().await;
    }
}

/// The running companion: configuration, persistent resources, the injected
/// sinks and at most one chat session.
pub struct Companion {
    config: CompanionConfig,
    paths: ResolvedPaths,
    log: ConversationLog,
    backend: Option<Arc<dyn CompletionBackend>>,
    images: ImageDispatcher,
    speech: Arc<dyn SpeechSink>,
    current_image: PathBuf,
    chat: Option<ChatSession>,
}

impl Companion {
    pub fn new(
        config: CompanionConfig,
        image_sink: Arc<dyn ImageSink>,
        speech_sink: Arc<dyn SpeechSink>,
    ) -> CompanionResult<Self> {
        let backend = match OpenAiBackend::from_config(&config.completion) {
            Some(backend) => {
                info!(api_base = %backend.api_base(), model = %config.completion.model, "completion backend ready");
                Some(Arc::new(backend) as Arc<dyn CompletionBackend>)
            }
            None => {
                warn!(
                    env = %config.completion.api_key_env,
                    "no API credential found, replies will use the fallback text"
                );
                None
            }
        };
        Self::with_backend(config, backend, image_sink, speech_sink)
    }

    pub fn with_backend(
        config: CompanionConfig,
        backend: Option<Arc<dyn CompletionBackend>>,
        image_sink: Arc<dyn ImageSink>,
        speech_sink: Arc<dyn SpeechSink>,
    ) -> CompanionResult<Self> {
        config.validate().map_err(ConfigError::Invalid)?;

        let paths = ResolvedPaths::resolve(&config.paths);
        SetupUtils::run_setup(&paths, &config.paths.happy_image);

        let log = ConversationLog::new(&paths.conversation_file);
        let images = ImageDispatcher::new(image_sink);
        let normal_image = taxonomy_loader(&paths).load(&paths.taxonomy_file).normal_image().to_path_buf();
        let current_image = images.show(&normal_image, &normal_image);

        info!(data_dir = %paths.data_dir.display(), name = %config.identity.name, "companion started");
        Ok(Self {
            config,
            paths,
            log,
            backend,
            images,
            speech: speech_sink,
            current_image,
            chat: None,
        })
    }

    pub fn config(&self) -> &CompanionConfig {
        &self.config
    }

    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn current_image(&self) -> &Path {
        &self.current_image
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn chat(&self) -> Option<&ChatSession> {
        self.chat.as_ref()
    }

    /// Returns the open session, or opens a new one with a freshly loaded
    /// taxonomy and an empty history.
    pub fn open_chat(&mut self, display: Arc<dyn ChatDisplay>) -> &ChatSession {
        let session = match self.chat.take() {
            Some(session) => session,
            None => self.start_session(display),
        };
        self.chat.insert(session)
    }

    fn start_session(&self, display: Arc<dyn ChatDisplay>) -> ChatSession {
        let taxonomy = taxonomy_loader(&self.paths).load(&self.paths.taxonomy_file);
        let client = CompletionClient::from_config(&self.config, self.backend.clone());
        let pipeline = InteractionPipeline::new(
            client,
            taxonomy,
            self.log.clone(),
            self.images.clone(),
            self.speech.clone(),
        );

        let period = Duration::from_millis(self.config.display.refresh_interval_ms);
        let refresher = LogRefresher::spawn(self.log.clone(), display, period);
        info!("chat session opened");
        ChatSession::new(pipeline, refresher)
    }

    pub async fn submit(&mut self, text: &str) -> CompanionResult<TurnOutcome> {
        let chat = self.chat.as_ref().ok_or(CompanionError::ChatClosed)?;
        let outcome = chat.submit(text).await?;
        self.current_image = outcome.image.clone();
        Ok(outcome)
    }

    pub async fn close_chat(&mut self) {
        if let Some(chat) = self.chat.take() {
            chat.close().await;
            info!("chat session closed");
        }
    }

    pub async fn shutdown(mut self) {
        self.close_chat().await;
        info!("companion stopped");
    }
}

fn taxonomy_loader(paths: &ResolvedPaths) -> TaxonomyLoader {
    TaxonomyLoader::new(&paths.pictures_dir, &paths.normal_image, &paths.happy_image)
}
