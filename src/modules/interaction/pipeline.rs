use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::modules::completion::client::CompletionClient;
use crate::modules::effects::sinks::{ImageDispatcher, SpeechSink};
use crate::modules::emotion::taxonomy::{EmotionLabel, EmotionTaxonomy};
use crate::modules::memory::store::{ConversationLog, Speaker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    AwaitingReply,
    AwaitingEmotion,
    Dispatching,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("A turn is already in progress ({0:?})")]
    Busy(PipelineState),
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn_id: Uuid,
    pub reply: String,
    pub emotion: EmotionLabel,
    pub image: PathBuf,
}

/// Publishes `Idle` when dropped, so a turn abandoned mid-flight does not
/// leave observers looking at a stale state.
struct IdleOnDrop(Arc<watch::Sender<PipelineState>>);

impl Drop for IdleOnDrop {
    fn drop(&mut self) {
        self.0.send_replace(PipelineState::Idle);
    }
}

pub struct InteractionPipeline {
    client: CompletionClient,
    taxonomy: EmotionTaxonomy,
    log: ConversationLog,
    images: ImageDispatcher,
    speech: Arc<dyn SpeechSink>,
    state: Arc<watch::Sender<PipelineState>>,
}

impl InteractionPipeline {
    pub fn new(
        client: CompletionClient,
        taxonomy: EmotionTaxonomy,
        log: ConversationLog,
        images: ImageDispatcher,
        speech: Arc<dyn SpeechSink>,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            client,
            taxonomy,
            log,
            images,
            speech,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    pub fn taxonomy(&self) -> &EmotionTaxonomy {
        &self.taxonomy
    }

    pub fn client(&self) -> &CompletionClient {
        &self.client
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub async fn submit(&mut self, text: &str) -> Result<TurnOutcome, PipelineError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let current = self.state();
        if current != PipelineState::Idle {
            return Err(PipelineError::Busy(current));
        }

        let turn_id = Uuid::new_v4();
        let span = info_span!("turn", turn_id = %turn_id);
        self.run_turn(turn_id, text).instrument(span).await
    }

    async fn run_turn(&mut self, turn_id: Uuid, text: &str) -> Result<TurnOutcome, PipelineError> {
        let _idle = IdleOnDrop(self.state.clone());

        self.transition(PipelineState::AwaitingReply);
        if let Err(e) = self.log.append(Speaker::User, text) {
            warn!(error = %e, "user turn not logged");
        }
        let reply = self.client.generate_reply(text).await;

        self.transition(PipelineState::AwaitingEmotion);
        if let Err(e) = self.log.append(Speaker::Assistant, &reply) {
            warn!(error = %e, "assistant turn not logged");
        }
        let emotion = self.client.classify_emotion(&reply, &self.taxonomy).await;

        self.transition(PipelineState::Dispatching);
        let image = self.images.show_label(&self.taxonomy, &emotion);
        self.speak(&reply).await;

        info!(emotion = %emotion, "turn complete");
        Ok(TurnOutcome {
            turn_id,
            reply,
            emotion,
            image,
        })
    }

    async fn speak(&self, reply: &str) {
        let speech = self.speech.clone();
        let text = reply.to_string();

        match tokio::task::spawn_blocking(move || speech.speak(&text)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "speech dispatch failed"),
            Err(e) => warn!(error = %e, "speech task panicked"),
        }
    }

    fn transition(&self, next: PipelineState) {
        let previous = self.state.send_replace(next);
        debug!(from = ?previous, to = ?next, "pipeline state");
    }
}
