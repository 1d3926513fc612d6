//! Session-scoped result state, owned by the front-end.
//!
//! The mediator itself is stateless; whatever it returns is recorded here
//! so redisplays read plain immutable values. A new result supersedes
//! only the previous result of the same task kind.

use crate::task::{TaskKind, TaskResult};

#[derive(Debug, Default)]
pub struct SessionState {
    chat: Option<TaskResult>,
    speech: Option<TaskResult>,
    embeddings: Option<TaskResult>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `result` as the latest outcome for `kind`.
    pub fn record(&mut self, kind: TaskKind, result: TaskResult) {
        *self.slot(kind) = Some(result);
    }

    /// The most recent result for `kind`, if any task of that kind has run.
    pub fn latest(&self, kind: TaskKind) -> Option<&TaskResult> {
        match kind {
            TaskKind::Chat => self.chat.as_ref(),
            TaskKind::Speech => self.speech.as_ref(),
            TaskKind::Embeddings => self.embeddings.as_ref(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn slot(&mut self, kind: TaskKind) -> &mut Option<TaskResult> {
        match kind {
            TaskKind::Chat => &mut self.chat,
            TaskKind::Speech => &mut self.speech,
            TaskKind::Embeddings => &mut self.embeddings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mediator::{MockMediator, Mediator};
    use crate::task::{TaskOutput, TaskRequest};

    #[test]
    fn results_are_kept_per_kind_and_superseded_in_place() {
        let mut session = SessionState::new();
        assert!(session.latest(TaskKind::Chat).is_none());

        session.record(
            TaskKind::Chat,
            TaskResult::Success(TaskOutput::Chat("first".into())),
        );
        session.record(
            TaskKind::Embeddings,
            TaskResult::Success(TaskOutput::Embedding(vec![1.0])),
        );

        // A chat result does not disturb the embedding slot and vice versa.
        assert_eq!(
            session.latest(TaskKind::Chat),
            Some(&TaskResult::Success(TaskOutput::Chat("first".into())))
        );
        assert_eq!(
            session.latest(TaskKind::Embeddings),
            Some(&TaskResult::Success(TaskOutput::Embedding(vec![1.0])))
        );
        assert!(session.latest(TaskKind::Speech).is_none());

        session.record(
            TaskKind::Chat,
            TaskResult::Failure {
                message: "HTTP 500".into(),
                attempted_url: "http://example.invalid/chat".into(),
            },
        );
        assert_eq!(
            session.latest(TaskKind::Chat),
            Some(&TaskResult::Failure {
                message: "HTTP 500".into(),
                attempted_url: "http://example.invalid/chat".into(),
            })
        );
        // The embedding slot is untouched by the superseding chat result.
        assert_eq!(
            session.latest(TaskKind::Embeddings),
            Some(&TaskResult::Success(TaskOutput::Embedding(vec![1.0])))
        );

        session.clear();
        assert!(session.latest(TaskKind::Chat).is_none());
        assert!(session.latest(TaskKind::Embeddings).is_none());
    }

    #[tokio::test]
    async fn records_whatever_the_mediator_returns() {
        let mut mediator = MockMediator::new();
        mediator
            .expect_execute()
            .times(1)
            .returning(|_| TaskResult::Success(TaskOutput::Chat("hi there".into())));

        let request = TaskRequest::Chat {
            prompt: "hello".into(),
        };
        let kind = request.kind();

        let mut session = SessionState::new();
        let result = mediator.execute(request).await;
        session.record(kind, result);

        assert_eq!(
            session.latest(kind),
            Some(&TaskResult::Success(TaskOutput::Chat("hi there".into())))
        );
    }
}
