pub mod sinks;
pub mod speech;

pub use sinks::{ChatDisplay, ImageDispatcher, ImageSink, SinkError, SpeechSink};
pub use speech::{CommandSpeechSink, SilentSpeechSink, audible_alert};
