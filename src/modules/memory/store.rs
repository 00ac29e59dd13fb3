use chrono::{Local, NaiveDateTime, SubsecRound};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const EMPTY_LOG_PLACEHOLDER: &str = "No conversation history yet.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Assistant => "AI",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "User" => Some(Speaker::User),
            "AI" => Some(Speaker::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub timestamp: NaiveDateTime,
    pub speaker: Speaker,
    pub text: String,
}

impl ConversationTurn {
    pub fn now(speaker: Speaker, text: &str) -> Self {
        Self {
            timestamp: Local::now().naive_local().trunc_subsecs(0),
            speaker,
            // one turn is always one line
            text: text.replace("\r\n", " ").replace(['\r', '\n'], " "),
        }
    }

    pub fn to_line(&self) -> String {
        format!("{} | {}: {}", self.timestamp.format(TIMESTAMP_FORMAT), self.speaker, self.text)
    }

    pub fn parse_line(line: &str) -> Option<Self> {
        let (timestamp, rest) = line.split_once(" | ")?;
        let (speaker, text) = rest.split_once(": ")?;

        Some(Self {
            timestamp: NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).ok()?,
            speaker: Speaker::from_label(speaker)?,
            text: text.to_string(),
        })
    }
}

/// Append-only, line-per-turn conversation record on disk.
///
/// Every append opens, writes and closes the file, so each line is durable on
/// its own. There is no locking; readers may observe the file between a user
/// line and its reply.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    path: PathBuf,
}

impl ConversationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, speaker: Speaker, text: &str) -> Result<ConversationTurn, std::io::Error> {
        let turn = ConversationTurn::now(speaker, text);

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{}", turn.to_line()));

        match result {
            Ok(()) => {
                debug!(speaker = %speaker, "logged conversation turn");
                Ok(turn)
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "failed to append to conversation log");
                Err(e)
            }
        }
    }

    pub fn read_all(&self) -> String {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => EMPTY_LOG_PLACEHOLDER.to_string(),
            Err(e) => format!("Failed to read conversation log: {}", e),
        }
    }

    pub fn read_turns(&self) -> Vec<ConversationTurn> {
        std::fs::read_to_string(&self.path)
            .map(|content| content.lines().filter_map(ConversationTurn::parse_line).collect())
            .unwrap_or_default()
    }
}
