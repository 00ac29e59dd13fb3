use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use sprite_companion::api::Companion;
use sprite_companion::config::CompanionConfig;
use sprite_companion::modules::effects::{
    ChatDisplay, CommandSpeechSink, ImageSink, SilentSpeechSink, SinkError, SpeechSink,
};
use sprite_companion::utils::default_data_dir;

const QUIT_COMMAND: &str = "/quit";

#[derive(Parser)]
#[command(name = "companion", version, about = "Desktop sprite companion that chats and emotes")]
struct Cli {
    #[arg(long, help = "Path to config.toml (defaults to <data dir>/config.toml)")]
    config: Option<PathBuf>,

    #[arg(long, help = "Override the per-user data directory")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Disable text-to-speech")]
    no_speech: bool,
}

/// Stands in for the sprite window by announcing which picture is shown.
struct TerminalImageSink;

impl ImageSink for TerminalImageSink {
    fn display(&self, image: &Path) -> Result<(), SinkError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "[sprite] {}", image.display())?;
        Ok(())
    }
}

/// Prints only the part of the log that is new since the last refresh.
#[derive(Default)]
struct TerminalChatDisplay {
    printed: Mutex<String>,
}

impl ChatDisplay for TerminalChatDisplay {
    fn show(&self, content: &str) {
        let Ok(mut printed) = self.printed.lock() else {
            return;
        };

        let fresh = content.strip_prefix(printed.as_str()).unwrap_or(content);
        if !fresh.trim().is_empty() {
            print!("{}", fresh);
            if !fresh.ends_with('\n') {
                println!();
            }
        }
        *printed = content.to_string();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| cli.data_dir.clone().unwrap_or_else(default_data_dir).join("config.toml"));
    let mut config = CompanionConfig::load_or_default(&config_path)?;
    if let Some(data_dir) = cli.data_dir {
        config.paths.data_dir = Some(data_dir);
    }
    if cli.no_speech {
        config.speech.enabled = false;
    }

    let speech: Arc<dyn SpeechSink> = if config.speech.enabled {
        Arc::new(CommandSpeechSink::from_config(&config.speech))
    } else {
        Arc::new(SilentSpeechSink)
    };

    let mut companion = Companion::new(config, Arc::new(TerminalImageSink), speech)?;
    companion.open_chat(Arc::new(TerminalChatDisplay::default()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == QUIT_COMMAND {
            break;
        }
        if line.is_empty() {
            continue;
        }

        if let Err(e) = companion.submit(line).await {
            warn!(error = %e, "submission rejected");
        }
    }

    companion.shutdown().await;
    Ok(())
}
