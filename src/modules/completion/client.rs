use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{CompanionConfig, CompletionConfig, Identity};
use crate::modules::emotion::classifier::{build_classification_input, build_classification_prompt, resolve_label};
use crate::modules::emotion::taxonomy::{EmotionLabel, EmotionTaxonomy};
use crate::modules::memory::history::RollingHistory;
use super::openai::CompletionBackend;
use super::types::{ChatMessage, ChatRequest, ResponseFormat};

pub const FALLBACK_REPLY: &str = "Oops, something went wrong!";

pub struct CompletionClient {
    backend: Option<Arc<dyn CompletionBackend>>,
    history: RollingHistory,
    settings: CompletionConfig,
    identity: Identity,
}

impl CompletionClient {
    pub fn new(
        backend: Option<Arc<dyn CompletionBackend>>,
        identity: Identity,
        settings: CompletionConfig,
        history: RollingHistory,
    ) -> Self {
        Self {
            backend,
            history,
            settings,
            identity,
        }
    }

    pub fn from_config(config: &CompanionConfig, backend: Option<Arc<dyn CompletionBackend>>) -> Self {
        Self::new(
            backend,
            config.identity.clone(),
            config.completion.clone(),
            RollingHistory::new(config.history.max_entries),
        )
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn history(&self) -> &RollingHistory {
        &self.history
    }

    pub fn reply_system_prompt(&self) -> String {
        format!(
            "You are {name}, {persona}. Reply in {language} with a warm, friendly tone, \
             as if chatting with an old friend. Use the earlier conversation to stay coherent. \
             Return plain text only, without JSON or any other formatting.",
            name = self.identity.name,
            persona = self.identity.persona,
            language = self.identity.language,
        )
    }

    pub async fn generate_reply(&mut self, user_text: &str) -> String {
        self.history.push(ChatMessage::user(user_text));

        let Some(backend) = self.backend.as_ref() else {
            warn!("completion backend not configured, using fallback reply");
            return FALLBACK_REPLY.to_string();
        };

        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(ChatMessage::system(self.reply_system_prompt()));
        messages.extend(self.history.messages().cloned());

        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages,
            max_tokens: self.settings.reply_max_tokens,
            temperature: self.settings.reply_temperature,
            response_format: ResponseFormat::Text,
        };

        match backend.complete(request).await {
            Ok(reply) => {
                debug!(reply = %reply, "completion reply");
                self.history.push(ChatMessage::assistant(reply.clone()));
                reply
            }
            Err(e) => {
                warn!(error = %e, "reply generation failed, using fallback reply");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    pub async fn classify_emotion(&self, reply_text: &str, taxonomy: &EmotionTaxonomy) -> EmotionLabel {
        let Some(backend) = self.backend.as_ref() else {
            warn!("completion backend not configured, using fallback emotion");
            return EmotionLabel::fallback();
        };

        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage::system(build_classification_prompt(taxonomy, &self.identity.name)),
                ChatMessage::user(build_classification_input(reply_text)),
            ],
            max_tokens: self.settings.classify_max_tokens,
            temperature: self.settings.classify_temperature,
            response_format: ResponseFormat::JsonObject,
        };

        let raw = match backend.complete(request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "emotion classification failed, using fallback emotion");
                return EmotionLabel::fallback();
            }
        };
        debug!(raw = %raw, "emotion classification response");

        match resolve_label(taxonomy, &raw) {
            Ok(label) => label,
            Err(e) => {
                warn!(error = %e, "emotion classification rejected, using fallback emotion");
                EmotionLabel::fallback()
            }
        }
    }
}
