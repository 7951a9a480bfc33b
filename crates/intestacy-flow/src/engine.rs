//! The question flow engine.
//!
//! Holds the catalog, the transition table and the calculator, all immutable
//! after construction. Every per-user value lives in the caller's
//! [`Session`], so one engine can serve any number of sessions.

use tracing::{debug, info, warn};

use intestacy_core::{
    CalcError, DistributionCalculator, DistributionResult, Entitlement, EstateFacts, FactKey,
    FactValue, RecipientClass,
};

use crate::answer::Answer;
use crate::error::FlowError;
use crate::question::{Catalog, QuestionId, QuestionNode};
use crate::session::Session;
use crate::transition::{Next, TransitionTable};

/// Engine behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowOptions {
    /// Ask how many recipients the winning class has before resolving, so
    /// the result can show per-recipient shares.
    pub collect_counts: bool,
}

/// What to show the user after an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Question(QuestionNode),
    Resolution(DistributionResult),
}

/// Drives sessions from the root question to a resolution.
#[derive(Debug, Clone)]
pub struct QuestionFlowEngine {
    catalog: Catalog,
    table: TransitionTable,
    calculator: DistributionCalculator,
    options: FlowOptions,
}

impl QuestionFlowEngine {
    /// Build an engine, validating the table against the catalog.
    pub fn new(
        catalog: Catalog,
        table: TransitionTable,
        calculator: DistributionCalculator,
    ) -> Result<Self, FlowError> {
        table.validate(&catalog)?;
        Ok(Self {
            catalog,
            table,
            calculator,
            options: FlowOptions::default(),
        })
    }

    /// The England and Wales flow with the default statutory legacy.
    pub fn standard() -> Self {
        Self {
            catalog: Catalog::standard(),
            table: TransitionTable::standard(),
            calculator: DistributionCalculator::default(),
            options: FlowOptions::default(),
        }
    }

    pub fn with_calculator(mut self, calculator: DistributionCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn with_options(mut self, options: FlowOptions) -> Self {
        self.options = options;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn calculator(&self) -> &DistributionCalculator {
        &self.calculator
    }

    pub fn options(&self) -> FlowOptions {
        self.options
    }

    /// A fresh session with every fact unknown, pending the root question.
    pub fn start_session(&self) -> Session {
        let session = Session::new(self.catalog.root());
        debug!(session = %session.id(), "session started");
        session
    }

    /// Put a session back to its starting state.
    pub fn reset(&self, session: &mut Session) {
        session.clear(self.catalog.root());
        debug!(session = %session.id(), "session reset");
    }

    /// The question awaiting an answer, `None` once resolved.
    pub fn current_question(&self, session: &Session) -> Option<&QuestionNode> {
        if session.is_resolved() {
            return None;
        }
        self.catalog.get(session.pending())
    }

    /// Parse raw text for the pending question and apply it.
    pub fn answer_raw(&self, session: &mut Session, raw: &str) -> Result<Step, FlowError> {
        if session.is_resolved() {
            return Err(FlowError::AlreadyResolved);
        }
        let question = session.pending();
        let answer = Answer::parse(question, raw).inspect_err(|e| {
            warn!(session = %session.id(), %question, error = %e, "rejected input");
        })?;
        self.next_step(session, answer)
    }

    /// Record an answer to the pending question and move on.
    ///
    /// On any error the session is left exactly as it was.
    pub fn next_step(&self, session: &mut Session, answer: Answer) -> Result<Step, FlowError> {
        if session.is_resolved() {
            return Err(FlowError::AlreadyResolved);
        }
        let question = session.pending();
        let facts = self.stage(session, question, answer).inspect_err(|e| {
            if e.is_recoverable() {
                warn!(session = %session.id(), %question, error = %e, "rejected input");
            }
        })?;

        let step = self.advance(&facts, question, answer)?;
        let next = match &step {
            Step::Question(node) => Next::Ask(node.id),
            Step::Resolution(_) => Next::Resolve,
        };
        debug!(
            session = %session.id(),
            %question,
            answer = answer.as_bool(),
            %next,
            "transition"
        );

        session.facts = facts;
        session.push_history(question, answer);
        match &step {
            Step::Question(node) => session.pending = node.id,
            Step::Resolution(result) => {
                info!(
                    session = %session.id(),
                    estate = %result.estate_value,
                    answers = session.history().len(),
                    "distribution resolved"
                );
                session.resolution = Some(result.clone());
            }
        }
        Ok(step)
    }

    /// Apply an answer to a copy of the session's facts.
    fn stage(
        &self,
        session: &Session,
        question: QuestionId,
        answer: Answer,
    ) -> Result<EstateFacts, FlowError> {
        if answer.kind() != question.kind() {
            return Err(FlowError::invalid(
                question,
                format!("Expected a {} answer", question.kind()),
            ));
        }
        let mut facts = session.facts().clone();
        let recorded = match (question, answer) {
            (QuestionId::Count(class), Answer::Count(n)) => facts.record_count(class, n),
            (QuestionId::EstateValue, Answer::Amount(amount)) => {
                facts.record(FactKey::EstateValue, FactValue::Amount(amount))
            }
            (QuestionId::Flag(key), Answer::Boolean(b)) => facts.record(key, FactValue::Flag(b)),
            _ => {
                return Err(FlowError::invalid(
                    question,
                    format!("Expected a {} answer", question.kind()),
                ))
            }
        };
        recorded.map_err(|e| match e {
            CalcError::NonPositiveEstate(_) => {
                FlowError::invalid(question, "Your estate value must be greater than £0")
            }
            CalcError::ZeroCount(_) => FlowError::invalid(question, "Please enter at least 1"),
            other => FlowError::Calculation(other),
        })?;
        Ok(facts)
    }

    /// Decide the step that follows an answer, given the updated facts.
    fn advance(
        &self,
        facts: &EstateFacts,
        question: QuestionId,
        answer: Answer,
    ) -> Result<Step, FlowError> {
        if self.calculator.can_resolve(facts) {
            if let Some(node) = self.pending_count(facts)? {
                return Ok(Step::Question(node.clone()));
            }
            return Ok(Step::Resolution(self.calculator.resolve(facts)?));
        }
        match self.table.next(question, answer.as_bool())? {
            Next::Ask(id) => self
                .catalog
                .get(id)
                .cloned()
                .map(Step::Question)
                .ok_or_else(|| FlowError::UnknownQuestionId(id.to_string())),
            // The table ended before the hierarchy had what it needs.
            Next::Resolve => Ok(Step::Resolution(self.calculator.resolve(facts)?)),
        }
    }

    /// Count question for the winning class, when counts are being
    /// collected and not yet known.
    fn pending_count(&self, facts: &EstateFacts) -> Result<Option<&QuestionNode>, FlowError> {
        if !self.options.collect_counts {
            return Ok(None);
        }
        let class = match self.calculator.entitlement(facts)? {
            Entitlement::SpouseAndChildren { .. } => RecipientClass::Children,
            Entitlement::Class { class, .. } => class,
            Entitlement::SpouseOnly | Entitlement::SpouseWithinLegacy | Entitlement::Crown => {
                return Ok(None)
            }
        };
        if facts.count(class).is_some() {
            return Ok(None);
        }
        Ok(self.catalog.get(QuestionId::Count(class)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intestacy_core::Money;

    fn yes(engine: &QuestionFlowEngine, session: &mut Session) -> Step {
        engine.next_step(session, Answer::Boolean(true)).unwrap()
    }

    fn no(engine: &QuestionFlowEngine, session: &mut Session) -> Step {
        engine.next_step(session, Answer::Boolean(false)).unwrap()
    }

    fn asked(step: &Step) -> QuestionId {
        match step {
            Step::Question(node) => node.id,
            Step::Resolution(_) => panic!("expected a question, got a resolution"),
        }
    }

    fn estate(engine: &QuestionFlowEngine, session: &mut Session, pounds: i64) -> Step {
        engine
            .next_step(session, Answer::Amount(Money::from_pounds(pounds)))
            .unwrap()
    }

    #[test]
    fn standard_engine_validates() {
        QuestionFlowEngine::new(
            Catalog::standard(),
            TransitionTable::standard(),
            DistributionCalculator::default(),
        )
        .unwrap();
    }

    #[test]
    fn new_session_starts_at_root() {
        let engine = QuestionFlowEngine::standard();
        let session = engine.start_session();
        assert_eq!(session.pending(), QuestionId::EstateValue);
        assert_eq!(
            engine.current_question(&session).unwrap().prompt,
            "What is the value of your estate?"
        );
    }

    #[test]
    fn married_without_children_resolves_immediately() {
        let engine = QuestionFlowEngine::standard();
        let mut s = engine.start_session();
        assert_eq!(asked(&estate(&engine, &mut s, 500_000)), QuestionId::Flag(FactKey::Married));
        assert_eq!(asked(&yes(&engine, &mut s)), QuestionId::Flag(FactKey::Children));
        let step = no(&engine, &mut s);
        assert!(matches!(step, Step::Resolution(_)));
        assert!(s.is_resolved());
        assert!(engine.current_question(&s).is_none());
    }

    #[test]
    fn married_with_children_within_legacy_resolves_immediately() {
        let engine = QuestionFlowEngine::standard();
        let mut s = engine.start_session();
        estate(&engine, &mut s, 300_000);
        yes(&engine, &mut s);
        let Step::Resolution(result) = yes(&engine, &mut s) else {
            panic!("expected resolution");
        };
        assert_eq!(result.amount_for(RecipientClass::Spouse), Some(Money::from_pounds(300_000)));
    }

    #[test]
    fn no_on_siblings_moves_to_grandparents() {
        let engine = QuestionFlowEngine::standard();
        let mut s = engine.start_session();
        estate(&engine, &mut s, 100_000);
        no(&engine, &mut s); // married
        no(&engine, &mut s); // cohabiting
        no(&engine, &mut s); // children
        no(&engine, &mut s); // grandchildren
        no(&engine, &mut s); // great-grandchildren
        assert_eq!(asked(&no(&engine, &mut s)), QuestionId::Flag(FactKey::Siblings));
        assert_eq!(asked(&no(&engine, &mut s)), QuestionId::Flag(FactKey::Grandparents));
    }

    #[test]
    fn invalid_input_leaves_session_unchanged() {
        let engine = QuestionFlowEngine::standard();
        let mut s = engine.start_session();
        let before = s.clone();

        let err = engine.next_step(&mut s, Answer::Boolean(true)).unwrap_err();
        assert!(err.is_recoverable());
        let err = engine
            .next_step(&mut s, Answer::Amount(Money::ZERO))
            .unwrap_err();
        assert_eq!(err.to_string(), "Your estate value must be greater than £0");
        let err = engine.answer_raw(&mut s, "abc").unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid number");

        assert_eq!(s.pending(), before.pending());
        assert_eq!(s.facts(), before.facts());
        assert!(s.history().is_empty());
    }

    #[test]
    fn answering_resolved_session_fails() {
        let engine = QuestionFlowEngine::standard();
        let mut s = engine.start_session();
        estate(&engine, &mut s, 1_000);
        yes(&engine, &mut s);
        no(&engine, &mut s);
        let err = engine.next_step(&mut s, Answer::Boolean(true)).unwrap_err();
        assert!(matches!(err, FlowError::AlreadyResolved));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn reset_returns_to_root() {
        let engine = QuestionFlowEngine::standard();
        let mut s = engine.start_session();
        estate(&engine, &mut s, 1_000);
        yes(&engine, &mut s);
        no(&engine, &mut s);
        engine.reset(&mut s);
        assert!(!s.is_resolved());
        assert_eq!(s.pending(), QuestionId::EstateValue);
        assert_eq!(s.facts().known().count(), 0);
        assert!(s.history().is_empty());
    }

    #[test]
    fn counts_are_asked_when_enabled() {
        let engine = QuestionFlowEngine::standard().with_options(FlowOptions {
            collect_counts: true,
        });
        let mut s = engine.start_session();
        estate(&engine, &mut s, 90_000);
        no(&engine, &mut s); // married
        no(&engine, &mut s); // cohabiting
        yes(&engine, &mut s); // children
        let step = no(&engine, &mut s); // none deceased
        assert_eq!(asked(&step), QuestionId::Count(RecipientClass::Children));
        let Step::Resolution(result) = engine.next_step(&mut s, Answer::Count(3)).unwrap() else {
            panic!("expected resolution");
        };
        assert_eq!(result.breakdown[0].recipients, Some(3));
        assert_eq!(result.breakdown[0].per_recipient[0], Money::from_pounds(30_000));
    }

    #[test]
    fn early_table_resolve_is_a_flow_defect() {
        let catalog = Catalog::standard();
        let mut table = TransitionTable::standard();
        table = table.with(
            QuestionId::Flag(FactKey::Married),
            false,
            Next::Resolve,
        );
        let engine =
            QuestionFlowEngine::new(catalog, table, DistributionCalculator::default()).unwrap();
        let mut s = engine.start_session();
        estate(&engine, &mut s, 1_000);
        let err = engine.next_step(&mut s, Answer::Boolean(false)).unwrap_err();
        assert!(matches!(
            err,
            FlowError::Calculation(CalcError::IncompleteFacts {
                missing: FactKey::Children
            })
        ));
        assert_eq!(s.pending(), QuestionId::Flag(FactKey::Married));
    }
}
