//! Declarative `(question, answer) → next` table.
//!
//! The table is a pure function of question id and boolean answer; it never
//! looks at the facts gathered so far.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use intestacy_core::{FactKey, RecipientClass};

use crate::error::FlowError;
use crate::question::{Catalog, QuestionId};

/// Where a transition leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "question", rename_all = "snake_case")]
pub enum Next {
    Ask(QuestionId),
    Resolve,
}

impl fmt::Display for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Next::Ask(id) => write!(f, "{id}"),
            Next::Resolve => write!(f, "resolve"),
        }
    }
}

/// Transition table keyed by question id and boolean answer.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    edges: BTreeMap<(QuestionId, bool), Next>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add or replace one edge.
    pub fn with(mut self, from: QuestionId, answer: bool, next: Next) -> Self {
        self.edges.insert((from, answer), next);
        self
    }

    /// Builder: both answers lead to the same place.
    pub fn with_both(self, from: QuestionId, next: Next) -> Self {
        self.with(from, true, next).with(from, false, next)
    }

    /// Builder: separate destinations for yes and no.
    pub fn with_branch(self, from: QuestionId, yes: Next, no: Next) -> Self {
        self.with(from, true, yes).with(from, false, no)
    }

    /// The England and Wales flow over [`Catalog::standard`].
    pub fn standard() -> Self {
        use FactKey::*;
        let ask = |key: FactKey| Next::Ask(QuestionId::for_fact(key));
        let q = QuestionId::for_fact;

        let mut table = Self::new()
            .with_both(QuestionId::EstateValue, ask(Married))
            .with_branch(q(Married), ask(Children), ask(Cohabiting))
            .with_both(q(Cohabiting), ask(Children))
            .with_branch(q(Children), ask(ChildrenDeceased), ask(Grandchildren))
            .with_branch(
                q(ChildrenDeceased),
                ask(DeceasedChildrenHadIssue),
                Next::Resolve,
            )
            .with_both(q(DeceasedChildrenHadIssue), Next::Resolve)
            .with_branch(q(Grandchildren), Next::Resolve, ask(GreatGrandchildren))
            .with_branch(q(GreatGrandchildren), Next::Resolve, ask(ParentsAlive))
            .with_branch(q(ParentsAlive), Next::Resolve, ask(Siblings))
            .with_branch(q(Siblings), ask(FullSiblings), ask(Grandparents))
            .with_branch(q(FullSiblings), ask(SiblingsDeceasedWithIssue), ask(HalfSiblings))
            .with_both(q(SiblingsDeceasedWithIssue), Next::Resolve)
            .with_branch(q(HalfSiblings), Next::Resolve, ask(Grandparents))
            .with_branch(q(Grandparents), Next::Resolve, ask(AuntsUncles))
            .with_branch(q(AuntsUncles), ask(FullAuntsUncles), Next::Resolve)
            .with_branch(
                q(FullAuntsUncles),
                ask(AuntsUnclesDeceasedWithIssue),
                ask(HalfAuntsUncles),
            )
            .with_both(q(AuntsUnclesDeceasedWithIssue), Next::Resolve)
            .with_both(q(HalfAuntsUncles), Next::Resolve);

        for class in RecipientClass::COUNTABLE {
            table = table.with_both(QuestionId::Count(class), Next::Resolve);
        }
        table
    }

    /// Look up the next step.
    pub fn next(&self, from: QuestionId, answer: bool) -> Result<Next, FlowError> {
        self.edges
            .get(&(from, answer))
            .copied()
            .ok_or_else(|| FlowError::MissingTransition {
                question: from.to_string(),
                answer,
            })
    }

    /// All edges in question order, `yes` after `no`.
    pub fn edges(&self) -> impl Iterator<Item = (QuestionId, bool, Next)> + '_ {
        self.edges.iter().map(|(&(from, answer), &next)| (from, answer, next))
    }

    /// Check the table against a catalog: every id it mentions exists, every
    /// question has both edges, and no path revisits a question.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), FlowError> {
        for (from, _, next) in self.edges() {
            if !catalog.contains(from) {
                return Err(FlowError::UnknownQuestionId(from.to_string()));
            }
            if let Next::Ask(to) = next {
                if !catalog.contains(to) {
                    return Err(FlowError::UnknownQuestionId(to.to_string()));
                }
            }
        }
        for node in catalog.nodes() {
            for answer in [true, false] {
                self.next(node.id, answer)?;
            }
        }
        self.check_acyclic(catalog)
    }

    fn check_acyclic(&self, catalog: &Catalog) -> Result<(), FlowError> {
        let mut visited = HashSet::new();
        let mut stack = HashSet::new();

        fn dfs(
            table: &TransitionTable,
            node: QuestionId,
            visited: &mut HashSet<QuestionId>,
            stack: &mut HashSet<QuestionId>,
        ) -> Result<(), FlowError> {
            if stack.contains(&node) {
                return Err(FlowError::CyclicTransition(node.to_string()));
            }
            if visited.contains(&node) {
                return Ok(());
            }

            visited.insert(node);
            stack.insert(node);

            for answer in [true, false] {
                if let Some(Next::Ask(to)) = table.edges.get(&(node, answer)) {
                    dfs(table, *to, visited, stack)?;
                }
            }

            stack.remove(&node);
            Ok(())
        }

        for node in catalog.nodes() {
            dfs(self, node.id, &mut visited, &mut stack)?;
        }
        Ok(())
    }
}
