pub mod mock;

use sprite_companion::api::Companion;
use sprite_companion::config::CompanionConfig;
use sprite_companion::modules::completion::{CompletionBackend, CompletionClient, FALLBACK_REPLY};
use sprite_companion::modules::effects::ImageDispatcher;
use sprite_companion::modules::memory::store::EMPTY_LOG_PLACEHOLDER;
use sprite_companion::{ConversationLog, InteractionPipeline, PipelineError, PipelineState, Speaker};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use mock::{DelayedBackend, RecordingDisplay, RecordingImageSink, RecordingSpeechSink, ScriptedBackend, TestSprite};

struct Harness {
    sprite: TestSprite,
    images: Arc<RecordingImageSink>,
    speech: Arc<RecordingSpeechSink>,
}

impl Harness {
    fn new() -> Self {
        Self::with_speech(RecordingSpeechSink::default())
    }

    fn with_speech(speech: RecordingSpeechSink) -> Self {
        Self {
            sprite: TestSprite::new(),
            images: Arc::new(RecordingImageSink::default()),
            speech: Arc::new(speech),
        }
    }

    fn log(&self) -> ConversationLog {
        ConversationLog::new(self.sprite.dir.path().join("conversation.txt"))
    }

    fn pipeline(&self, backend: Option<Arc<dyn CompletionBackend>>) -> InteractionPipeline {
        let taxonomy = self.sprite.loader().parse(TestSprite::taxonomy_content());
        let client = CompletionClient::from_config(&CompanionConfig::default(), backend);
        InteractionPipeline::new(
            client,
            taxonomy,
            self.log(),
            ImageDispatcher::new(self.images.clone()),
            self.speech.clone(),
        )
    }

    fn config(&self) -> CompanionConfig {
        let mut config = CompanionConfig::default();
        config.paths.data_dir = Some(self.sprite.data_dir());
        config.paths.resource_dir = Some(self.sprite.resource_dir());
        config.display.refresh_interval_ms = 20;
        config
    }
}

fn scripted(backend: ScriptedBackend) -> Option<Arc<dyn CompletionBackend>> {
    Some(Arc::new(backend))
}

#[tokio::test]
async fn test_turn_shows_classified_image_and_speaks_reply() {
    let harness = Harness::new();
    let mut pipeline = harness.pipeline(scripted(ScriptedBackend::turn("I'm sorry to hear that.", r#"{"emotion":"sad"}"#)));

    let outcome = assert_ok!(pipeline.submit("my cat is sick").await);

    assert_eq!(outcome.reply, "I'm sorry to hear that.");
    assert_eq!(outcome.emotion.as_str(), "sad");
    assert_eq!(harness.images.last(), Some(harness.sprite.picture("Yui_sad.png")));
    assert_eq!(harness.speech.spoken(), vec!["I'm sorry to hear that.".to_string()]);

    let turns = harness.log().read_turns();
    assert_eq!(turns.len(), 2);
    assert_eq!((turns[0].speaker, turns[0].text.as_str()), (Speaker::User, "my cat is sick"));
    assert_eq!((turns[1].speaker, turns[1].text.as_str()), (Speaker::Assistant, "I'm sorry to hear that."));
}

#[tokio::test]
async fn test_unknown_label_shows_happy_image() {
    let harness = Harness::new();
    let mut pipeline = harness.pipeline(scripted(ScriptedBackend::turn("Grr.", r#"{"emotion":"furious"}"#)));

    let outcome = assert_ok!(pipeline.submit("you broke it").await);

    assert!(outcome.emotion.is_fallback());
    assert_eq!(harness.images.last(), Some(harness.sprite.picture("Yui_happy.png")));
}

#[tokio::test]
async fn test_malformed_classification_shows_happy_image() {
    let harness = Harness::new();
    let mut pipeline = harness.pipeline(scripted(ScriptedBackend::turn("Well then.", "sad, I think")));

    let outcome = assert_ok!(pipeline.submit("hmm").await);

    assert!(outcome.emotion.is_fallback());
    assert_eq!(harness.images.last(), Some(harness.sprite.picture("Yui_happy.png")));
}

#[tokio::test]
async fn test_missing_picture_shows_normal_image() {
    let harness = Harness::new();
    let mut pipeline = harness.pipeline(scripted(ScriptedBackend::turn("Hey!", r#"{"emotion":"angry"}"#)));

    let outcome = assert_ok!(pipeline.submit("boo").await);

    assert_eq!(outcome.emotion.as_str(), "angry");
    assert_eq!(outcome.image, harness.sprite.picture("Yui_normal.png"));
    assert_eq!(harness.images.last(), Some(harness.sprite.picture("Yui_normal.png")));
}

#[tokio::test]
async fn test_without_backend_every_turn_falls_back() {
    let harness = Harness::new();
    let mut pipeline = harness.pipeline(None);

    for text in ["hello", "anyone there?"] {
        let outcome = assert_ok!(pipeline.submit(text).await);
        assert_eq!(outcome.reply, FALLBACK_REPLY);
        assert!(outcome.emotion.is_fallback());
    }

    assert_eq!(harness.log().read_turns().len(), 4);
    assert_eq!(harness.speech.spoken(), vec![FALLBACK_REPLY.to_string(), FALLBACK_REPLY.to_string()]);
}

#[tokio::test]
async fn test_speech_failure_does_not_fail_turn() {
    let harness = Harness::with_speech(RecordingSpeechSink::failing());
    let mut pipeline = harness.pipeline(scripted(ScriptedBackend::turn("Yay!", r#"{"emotion":"happy"}"#)));

    assert_ok!(pipeline.submit("good news").await);
    assert_eq!(pipeline.state(), PipelineState::Idle);
    assert_eq!(harness.speech.spoken().len(), 1);
}

#[tokio::test]
async fn test_empty_input_has_no_effects() {
    let harness = Harness::new();
    let mut pipeline = harness.pipeline(scripted(ScriptedBackend::new()));

    let err = assert_err!(pipeline.submit("\n  \t").await);

    assert_eq!(err, PipelineError::EmptyInput);
    assert!(harness.images.shown().is_empty());
    assert!(harness.speech.spoken().is_empty());
    assert_eq!(harness.log().read_all(), EMPTY_LOG_PLACEHOLDER);
}

#[tokio::test]
async fn test_second_submission_while_busy_is_rejected() {
    let harness = Harness::new();
    let backend = DelayedBackend {
        inner: ScriptedBackend::turn("One at a time!", r#"{"emotion":"happy"}"#),
        delay: Duration::from_millis(50),
    };
    let mut companion = Companion::with_backend(
        harness.config(),
        Some(Arc::new(backend)),
        harness.images.clone(),
        harness.speech.clone(),
    )
    .unwrap();

    let chat = companion.open_chat(Arc::new(RecordingDisplay::default()));
    let (first, second) = tokio::join!(chat.submit("first"), chat.submit("second"));

    assert_eq!(assert_ok!(first).reply, "One at a time!");
    assert_eq!(assert_err!(second), PipelineError::Busy(PipelineState::AwaitingReply));
    assert_eq!(chat.state(), PipelineState::Idle);
    companion.shutdown().await;
}

#[tokio::test]
async fn test_companion_session_mirrors_log() {
    let harness = Harness::new();
    harness.sprite.write_template(TestSprite::taxonomy_content());
    let display = Arc::new(RecordingDisplay::default());
    let mut companion = Companion::with_backend(
        harness.config(),
        scripted(ScriptedBackend::turn("Welcome back!", r#"{"emotion":"sad"}"#)),
        harness.images.clone(),
        harness.speech.clone(),
    )
    .unwrap();
    assert_eq!(harness.images.shown(), vec![harness.sprite.picture("Yui_normal.png")]);

    companion.open_chat(display.clone());
    let outcome = companion.submit("I'm back").await.unwrap();
    assert_eq!(companion.current_image(), harness.sprite.picture("Yui_sad.png"));
    assert_eq!(outcome.image, harness.sprite.picture("Yui_sad.png"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let shown = display.shown();
    let latest = shown.last().unwrap();
    assert!(latest.contains("| User: I'm back"));
    assert!(latest.contains("| AI: Welcome back!"));

    companion.shutdown().await;
}

#[tokio::test]
async fn test_startup_shows_taxonomy_normal_image() {
    let harness = Harness::new();
    std::fs::write(harness.sprite.picture("Yui_calm.png"), b"png").unwrap();
    harness.sprite.write_template("normal,Yui_calm.png,calm\nhappy,Yui_happy.png,cheerful\n");

    let companion = Companion::with_backend(
        harness.config(),
        None,
        harness.images.clone(),
        harness.speech.clone(),
    )
    .unwrap();

    assert_eq!(harness.images.shown(), vec![harness.sprite.picture("Yui_calm.png")]);
    assert_eq!(companion.current_image(), harness.sprite.picture("Yui_calm.png"));
    companion.shutdown().await;
}
