//! Per-user session state.
//!
//! A session is owned by the caller and only mutated through
//! [`QuestionFlowEngine`](crate::engine::QuestionFlowEngine).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use intestacy_core::{DistributionResult, EstateFacts};

use crate::answer::Answer;
use crate::question::QuestionId;

/// A recorded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    /// Sequence number, starting at 1 and increasing per session.
    pub sequence: u64,
    pub question: QuestionId,
    pub answer: Answer,
}

/// Facts gathered so far, the pending question and the answer history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    pub(crate) facts: EstateFacts,
    pub(crate) pending: QuestionId,
    pub(crate) resolution: Option<DistributionResult>,
    pub(crate) history: Vec<AnsweredQuestion>,
}

impl Session {
    pub(crate) fn new(root: QuestionId) -> Self {
        Self {
            id: Uuid::new_v4(),
            facts: EstateFacts::new(),
            pending: root,
            resolution: None,
            history: Vec::new(),
        }
    }

    /// Identifier used to correlate log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn facts(&self) -> &EstateFacts {
        &self.facts
    }

    /// The question awaiting an answer. Meaningless once resolved.
    pub fn pending(&self) -> QuestionId {
        self.pending
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// The final distribution, once resolved.
    pub fn resolution(&self) -> Option<&DistributionResult> {
        self.resolution.as_ref()
    }

    /// Answers in the order they were given.
    pub fn history(&self) -> &[AnsweredQuestion] {
        &self.history
    }

    pub(crate) fn push_history(&mut self, question: QuestionId, answer: Answer) {
        let sequence = self.history.len() as u64 + 1;
        self.history.push(AnsweredQuestion {
            sequence,
            question,
            answer,
        });
    }

    /// Back to the start: all facts unknown, history cleared, pending
    /// question at `root`. The session id is kept.
    pub(crate) fn clear(&mut self, root: QuestionId) {
        self.facts = EstateFacts::new();
        self.pending = root;
        self.resolution = None;
        self.history.clear();
    }
}
