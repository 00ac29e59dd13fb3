use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

use crate::config::SpeechConfig;
use super::sinks::{SinkError, SpeechSink};

pub fn audible_alert() {
    let mut stderr = std::io::stderr();
    let _ = stderr.write_all(b"\x07");
    let _ = stderr.flush();
}

/// Speaks through an external TTS program (`espeak`, `say`, ...). Blocks
/// until the program exits.
#[derive(Debug, Clone)]
pub struct CommandSpeechSink {
    program: String,
    rate: u32,
    voice: Option<String>,
}

impl CommandSpeechSink {
    pub fn new(program: impl Into<String>, rate: u32, voice: Option<String>) -> Self {
        Self {
            program: program.into(),
            rate,
            voice,
        }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(config.program.clone(), config.rate, config.voice.clone())
    }

    pub fn command(&self, text: &str) -> Command {
        let mut command = Command::new(&self.program);
        // macOS `say` takes words per minute via -r, espeak via -s
        let rate_flag = match Path::new(&self.program).file_stem().and_then(|s| s.to_str()) {
            Some("say") => "-r",
            _ => "-s",
        };
        command.arg(rate_flag).arg(self.rate.to_string());
        if let Some(voice) = &self.voice {
            command.arg("-v").arg(voice);
        }
        command.arg("--").arg(text).stdout(Stdio::null()).stderr(Stdio::null());
        command
    }
}

impl SpeechSink for CommandSpeechSink {
    fn speak(&self, text: &str) -> Result<(), SinkError> {
        let result = self.command(text).status();

        let error = match result {
            Ok(status) if status.success() => {
                debug!(program = %self.program, "speech finished");
                return Ok(());
            }
            Ok(status) => SinkError::Speech(format!("{} exited with {}", self.program, status)),
            Err(e) => SinkError::Speech(format!("failed to run {}: {}", self.program, e)),
        };

        warn!(error = %error, "speech failed, sounding alert instead");
        audible_alert();
        Err(error)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SilentSpeechSink;

impl SpeechSink for SilentSpeechSink {
    fn speak(&self, text: &str) -> Result<(), SinkError> {
        info!(chars = text.chars().count(), "speech disabled, skipping playback");
        Ok(())
    }
}
