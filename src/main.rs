use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use aoai_relay::config::Config;
use aoai_relay::mediator::{AzureMediator, Mediator};
use aoai_relay::session::SessionState;
use aoai_relay::staging::StagedUpload;
use aoai_relay::task::{TaskKind, TaskOutput, TaskRequest, TaskResult};

#[derive(Parser)]
#[command(
    name = "aoai-relay",
    about = "Forward prompts, audio, and text to Azure OpenAI deployments"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send a chat prompt and print the completion
    Chat { prompt: String },
    /// Transcribe an audio file ("-" reads from stdin)
    Transcribe { path: PathBuf },
    /// Generate an embedding vector for a piece of text
    Embed { text: String },
    /// Interactive console; results are kept per task until superseded
    Console,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    // --- 3. Parse Command-Line Arguments ---
    let args = Cli::parse();

    let mediator = AzureMediator::new(config);

    let request = match args.command {
        Command::Console => return run_console(&mediator).await,
        Command::Chat { prompt } => TaskRequest::Chat { prompt },
        Command::Embed { text } => TaskRequest::Embedding { text },
        Command::Transcribe { path } => transcription_request(&path)?,
    };

    let result = mediator.execute(request).await;
    print_result(&result);
    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Reads the audio source, stages it, and builds the request from the
/// staged copy. The staged file is gone before the request leaves.
fn transcription_request(path: &Path) -> Result<TaskRequest> {
    let (file_name, bytes) = if path == Path::new("-") {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read audio from stdin")?;
        ("stdin".to_string(), buffer)
    } else {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        (file_name, bytes)
    };

    let staged = StagedUpload::stage(&file_name, &bytes).context("Failed to stage audio upload")?;
    let audio = staged.read().context("Failed to read staged audio")?;
    Ok(TaskRequest::Transcription {
        audio,
        mime_type: staged.mime_type().to_string(),
    })
}

/// Line-driven console standing in for the original task picker UI.
/// Each task command runs one round trip and stores the result; `show`
/// reprints the stored result for a task without re-running it.
async fn run_console(mediator: &impl Mediator) -> Result<ExitCode> {
    let mut session = SessionState::new();
    let stdin = io::stdin();
    let mut line = String::new();

    println!("Commands: chat <prompt> | transcribe <path> | embed <text> | show <task> | clear | quit");
    loop {
        print!("> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        match command {
            "" => {}
            "quit" | "exit" => break,
            "clear" => session.clear(),
            "chat" | "embed" | "transcribe" if rest.is_empty() => {
                eprintln!("{command} needs an argument");
            }
            "chat" => {
                let result = mediator
                    .execute(TaskRequest::Chat {
                        prompt: rest.to_string(),
                    })
                    .await;
                print_result(&result);
                session.record(TaskKind::Chat, result);
            }
            "embed" => {
                let result = mediator
                    .execute(TaskRequest::Embedding {
                        text: rest.to_string(),
                    })
                    .await;
                print_result(&result);
                session.record(TaskKind::Embeddings, result);
            }
            "transcribe" => match transcription_request(Path::new(rest)) {
                Ok(request) => {
                    let result = mediator.execute(request).await;
                    print_result(&result);
                    session.record(TaskKind::Speech, result);
                }
                Err(err) => eprintln!("{err:#}"),
            },
            "show" => match parse_kind(rest) {
                Some(kind) => match session.latest(kind) {
                    Some(result) => print_result(result),
                    None => println!("No {} result yet", kind.as_str()),
                },
                None => eprintln!("Unknown task {rest:?}; expected chat, speech, or embeddings"),
            },
            _ => eprintln!("Unrecognized command {input:?}"),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_result(result: &TaskResult) {
    match result {
        TaskResult::Success(output) => print_output(output),
        TaskResult::Failure {
            message,
            attempted_url,
        } => {
            eprintln!("{message}");
            eprintln!("URL: {attempted_url}");
        }
    }
}

fn print_output(output: &TaskOutput) {
    match output {
        TaskOutput::Chat(text) => println!("{text}"),
        TaskOutput::Transcript(transcript) => match serde_json::to_string_pretty(transcript) {
            Ok(rendered) => println!("{rendered}"),
            Err(_) => println!("{transcript}"),
        },
        TaskOutput::Embedding(vector) => match serde_json::to_string_pretty(vector) {
            Ok(rendered) => println!("{rendered}"),
            Err(_) => println!("{vector:?}"),
        },
    }
}

fn parse_kind(name: &str) -> Option<TaskKind> {
    match name {
        "chat" => Some(TaskKind::Chat),
        "speech" => Some(TaskKind::Speech),
        "embeddings" => Some(TaskKind::Embeddings),
        _ => None,
    }
}
