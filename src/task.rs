//! The task model shared between the front-end and the mediator.
//!
//! A [`TaskRequest`] is built per user action and consumed by a single
//! `execute` call; the [`TaskResult`] it yields is a plain immutable value
//! the front-end keeps until it is superseded.

use serde_json::Value;

/// Selects which endpoint a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Chat,
    Speech,
    Embeddings,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Chat => "chat",
            TaskKind::Speech => "speech",
            TaskKind::Embeddings => "embeddings",
        }
    }
}

/// One unit of user input, tagged with the task it belongs to.
#[derive(Debug, Clone)]
pub enum TaskRequest {
    Chat { prompt: String },
    Transcription { audio: Vec<u8>, mime_type: String },
    Embedding { text: String },
}

impl TaskRequest {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskRequest::Chat { .. } => TaskKind::Chat,
            TaskRequest::Transcription { .. } => TaskKind::Speech,
            TaskRequest::Embedding { .. } => TaskKind::Embeddings,
        }
    }
}

/// Successful payload, shaped per task kind.
///
/// The transcript is the parsed response body verbatim; chat is the
/// extracted completion text; embeddings are the raw vector.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutput {
    Chat(String),
    Transcript(Value),
    Embedding(Vec<f32>),
}

impl TaskOutput {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskOutput::Chat(_) => TaskKind::Chat,
            TaskOutput::Transcript(_) => TaskKind::Speech,
            TaskOutput::Embedding(_) => TaskKind::Embeddings,
        }
    }
}

/// Terminal outcome of one `execute` call.
///
/// A `Success` output kind always matches the request kind that produced
/// it. `Failure` carries a human-readable message and the URL that was
/// attempted; never a key.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult {
    Success(TaskOutput),
    Failure {
        message: String,
        attempted_url: String,
    },
}

impl TaskResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskResult::Success(_))
    }
}
