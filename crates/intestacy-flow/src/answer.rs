//! Typed answers and raw-input parsing.

use serde::{Deserialize, Serialize};

use intestacy_core::{Money, MoneyParseError};

use crate::error::FlowError;
use crate::question::{AnswerKind, QuestionId};

/// One answer to the pending question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Boolean(bool),
    Amount(Money),
    Count(u32),
}

impl Answer {
    pub fn kind(&self) -> AnswerKind {
        match self {
            Answer::Boolean(_) => AnswerKind::Boolean,
            Answer::Amount(_) => AnswerKind::Amount,
            Answer::Count(_) => AnswerKind::Count,
        }
    }

    /// Value used to look up the transition table. Amounts and counts
    /// always continue along the "yes" edge.
    pub fn as_bool(&self) -> bool {
        match self {
            Answer::Boolean(b) => *b,
            Answer::Amount(_) | Answer::Count(_) => true,
        }
    }

    /// Parse raw user text for a question of the given kind.
    pub fn parse(question: QuestionId, raw: &str) -> Result<Answer, FlowError> {
        let raw = raw.trim();
        match question.kind() {
            AnswerKind::Boolean => match raw.to_ascii_lowercase().as_str() {
                "yes" | "y" | "true" | "1" => Ok(Answer::Boolean(true)),
                "no" | "n" | "false" | "0" => Ok(Answer::Boolean(false)),
                _ => Err(FlowError::invalid(question, "Please answer yes or no")),
            },
            AnswerKind::Amount => {
                let amount: Money = raw.parse().map_err(|e| match e {
                    MoneyParseError::Empty => {
                        FlowError::invalid(question, "Please enter your estate value")
                    }
                    MoneyParseError::Negative => {
                        FlowError::invalid(question, "Your estate value must be greater than £0")
                    }
                    MoneyParseError::Invalid(_) | MoneyParseError::Overflow => {
                        FlowError::invalid(question, "Please enter a valid number")
                    }
                })?;
                if !amount.is_positive() {
                    return Err(FlowError::invalid(
                        question,
                        "Your estate value must be greater than £0",
                    ));
                }
                Ok(Answer::Amount(amount))
            }
            AnswerKind::Count => {
                if raw.is_empty() {
                    return Err(FlowError::invalid(question, "Please enter a number"));
                }
                match raw.parse::<u32>() {
                    Ok(0) => Err(FlowError::invalid(question, "Please enter at least 1")),
                    Ok(n) => Ok(Answer::Count(n)),
                    Err(_) => Err(FlowError::invalid(question, "Please enter a whole number")),
                }
            }
        }
    }
}
