use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use lingo_tutor::api::{self, ApiState};
use lingo_tutor::voice::{SpeechSynthesizer, SpeechToText, TextToSpeech, Transcriber};
use lingo_tutor::{ChatClient, Config, Error, Session, TurnController};

/// Lingo - voice-driven English tutoring gateway
#[derive(Parser)]
#[command(name = "lingo", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "LINGO_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config file)
    #[arg(long, env = "LINGO_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the API server (default)
    Serve,
    /// Transcribe a WAV file and print the text
    Transcribe {
        /// Path to the audio file
        file: PathBuf,
    },
    /// Synthesize text and write MP3 to a file
    Say {
        /// Text to speak
        text: String,
        /// Output path
        #[arg(short, long, default_value = "reply.mp3")]
        out: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lingo_tutor={default_level},lingo={default_level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Build the transcriber from available API keys (Groq preferred)
fn build_transcriber(config: &Config) -> anyhow::Result<Arc<dyn Transcriber>> {
    let stt: Arc<dyn Transcriber> = if let Some(key) = &config.api_keys.groq {
        Arc::new(SpeechToText::new_groq(
            key.clone(),
            config.voice.stt_model.clone(),
        )?)
    } else if let Some(key) = &config.api_keys.openai {
        Arc::new(SpeechToText::new_openai(key.clone(), "whisper-1".to_string())?)
    } else {
        anyhow::bail!("transcription requires GROQ_API_KEY or OPENAI_API_KEY");
    };
    Ok(stt)
}

/// Build the chat completer from available API keys (Groq preferred)
fn build_completer(config: &Config) -> anyhow::Result<Arc<ChatClient>> {
    let client = if let Some(key) = &config.api_keys.groq {
        ChatClient::new_groq(key.clone())?
    } else if let Some(key) = &config.api_keys.openai {
        ChatClient::new_openai(key.clone())?
    } else {
        anyhow::bail!("chat completions require GROQ_API_KEY or OPENAI_API_KEY");
    };
    Ok(Arc::new(client))
}

/// Build the synthesizer, or `None` when voice output is disabled
fn build_synthesizer(config: &Config) -> anyhow::Result<Option<Arc<dyn SpeechSynthesizer>>> {
    if !config.voice.enabled {
        return Ok(None);
    }

    let tts: Arc<dyn SpeechSynthesizer> = match config.voice.tts_provider.as_str() {
        "openai" => {
            let key = config.api_keys.openai.clone().ok_or_else(|| {
                anyhow::anyhow!("OpenAI TTS requires OPENAI_API_KEY")
            })?;
            Arc::new(TextToSpeech::new_openai(
                key,
                config.voice.tts_voice.clone(),
                config.voice.tts_speed,
            )?)
        }
        "gtranslate" => Arc::new(TextToSpeech::new_gtranslate()),
        other => anyhow::bail!("unknown TTS provider '{other}'"),
    };
    Ok(Some(tts))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let synthesizer = build_synthesizer(&config)?;
            let controller = TurnController::new(
                build_transcriber(&config)?,
                build_completer(&config)?,
                synthesizer.clone(),
            );

            let state = ApiState {
                session: Arc::new(RwLock::new(Session::new())),
                tutor: Arc::new(RwLock::new(config.tutor.clone())),
                controller: Arc::new(controller),
                synthesizer,
            };

            api::serve(state, config.server.port).await?;
        }
        Command::Transcribe { file } => {
            let audio = std::fs::read(&file)?;
            let transcriber = build_transcriber(&config)?;
            let text = transcriber.transcribe(&audio, Some("en")).await?;
            println!("{text}");
        }
        Command::Say { text, out } => {
            let synthesizer = build_synthesizer(&config)?
                .ok_or_else(|| Error::Config("voice output disabled".to_string()))?;
            let audio = synthesizer.synthesize(&text, config.tutor.accent).await?;
            std::fs::write(&out, audio)?;
            println!("wrote {}", out.display());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
