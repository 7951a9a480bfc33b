//! Question flow for the intestacy calculator.
//!
//! A [`QuestionFlowEngine`] walks a declarative [`TransitionTable`] over a
//! [`Catalog`] of questions, recording each answer into the caller-owned
//! [`Session`] until the distribution calculator can resolve the estate.

pub mod answer;
pub mod engine;
pub mod error;
pub mod question;
pub mod session;
pub mod transition;

pub use answer::Answer;
pub use engine::{FlowOptions, QuestionFlowEngine, Step};
pub use error::FlowError;
pub use question::{AnswerKind, Catalog, QuestionId, QuestionNode};
pub use session::{AnsweredQuestion, Session};
pub use transition::{Next, TransitionTable};
