pub mod completion_mock;
pub mod sink_mock;

pub use completion_mock::{DelayedBackend, ScriptedBackend};
pub use sink_mock::{RecordingDisplay, RecordingImageSink, RecordingSpeechSink, TestSprite};
