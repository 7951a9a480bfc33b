//! Question ids, answer kinds and the question catalog.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use intestacy_core::{FactKey, RecipientClass};

use crate::error::FlowError;

/// Identifies one question in the catalog.
///
/// Serialised as its string form: `estate_value`, a boolean fact key such as
/// `parents_alive`, or `<class>_count` for a recipient count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QuestionId {
    EstateValue,
    Flag(FactKey),
    Count(RecipientClass),
}

const COUNT_SUFFIX: &str = "_count";

impl QuestionId {
    /// The question that records a given fact.
    pub fn for_fact(key: FactKey) -> Self {
        if key.is_amount() {
            QuestionId::EstateValue
        } else {
            QuestionId::Flag(key)
        }
    }

    /// Kind of answer this question expects.
    pub fn kind(self) -> AnswerKind {
        match self {
            QuestionId::EstateValue => AnswerKind::Amount,
            QuestionId::Flag(_) => AnswerKind::Boolean,
            QuestionId::Count(_) => AnswerKind::Count,
        }
    }

    /// The fact recorded by this question, if it records one.
    pub fn fact(self) -> Option<FactKey> {
        match self {
            QuestionId::EstateValue => Some(FactKey::EstateValue),
            QuestionId::Flag(key) => Some(key),
            QuestionId::Count(_) => None,
        }
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::EstateValue => f.write_str(FactKey::EstateValue.as_str()),
            QuestionId::Flag(key) => f.write_str(key.as_str()),
            QuestionId::Count(class) => write!(f, "{}{COUNT_SUFFIX}", class.as_str()),
        }
    }
}

impl FromStr for QuestionId {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || FlowError::UnknownQuestionId(s.to_string());
        if let Some(class) = s.strip_suffix(COUNT_SUFFIX) {
            let class: RecipientClass = class.parse().map_err(|_| unknown())?;
            return if class.is_countable() {
                Ok(QuestionId::Count(class))
            } else {
                Err(unknown())
            };
        }
        let key: FactKey = s.parse().map_err(|_| unknown())?;
        Ok(QuestionId::for_fact(key))
    }
}

impl TryFrom<String> for QuestionId {
    type Error = FlowError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<QuestionId> for String {
    fn from(id: QuestionId) -> Self {
        id.to_string()
    }
}

/// The kind of answer a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    Boolean,
    Amount,
    Count,
}

impl fmt::Display for AnswerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerKind::Boolean => write!(f, "yes/no"),
            AnswerKind::Amount => write!(f, "amount"),
            AnswerKind::Count => write!(f, "count"),
        }
    }
}

/// A question shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionNode {
    pub id: QuestionId,
    pub prompt: String,
    pub kind: AnswerKind,
}

impl QuestionNode {
    pub fn new(id: QuestionId, prompt: impl Into<String>) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            kind: id.kind(),
        }
    }
}

/// Immutable set of questions with a designated root.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: QuestionId,
    nodes: BTreeMap<QuestionId, QuestionNode>,
}

impl Catalog {
    /// Build a catalog from nodes. The root must be one of them.
    pub fn new(
        root: QuestionId,
        nodes: impl IntoIterator<Item = QuestionNode>,
    ) -> Result<Self, FlowError> {
        let nodes: BTreeMap<_, _> = nodes.into_iter().map(|n| (n.id, n)).collect();
        if !nodes.contains_key(&root) {
            return Err(FlowError::UnknownQuestionId(root.to_string()));
        }
        Ok(Self { root, nodes })
    }

    /// The England and Wales question set, rooted at the estate value.
    pub fn standard() -> Self {
        let flags = [
            (FactKey::Married, "Are you married or in a civil partnership?"),
            (
                FactKey::Cohabiting,
                "Are you living with a partner you are not married to (cohabiting)?",
            ),
            (FactKey::Children, "Do you have any children?"),
            (FactKey::ChildrenDeceased, "Are any of your children deceased?"),
            (
                FactKey::DeceasedChildrenHadIssue,
                "Did any of your deceased children have children of their own?",
            ),
            (FactKey::Grandchildren, "Do you have any grandchildren?"),
            (
                FactKey::GreatGrandchildren,
                "Do you have any great-grandchildren?",
            ),
            (FactKey::ParentsAlive, "Are either of your parents alive?"),
            (FactKey::Siblings, "Do you have any siblings?"),
            (
                FactKey::FullSiblings,
                "Do you have any full siblings (same two parents)?",
            ),
            (
                FactKey::SiblingsDeceasedWithIssue,
                "Are any of your siblings deceased with children of their own?",
            ),
            (
                FactKey::HalfSiblings,
                "Do you have any half siblings (one shared parent)?",
            ),
            (FactKey::Grandparents, "Do you have any living grandparents?"),
            (FactKey::AuntsUncles, "Do you have any living aunts or uncles?"),
            (
                FactKey::FullAuntsUncles,
                "Do you have any full aunts or uncles (siblings of your parents)?",
            ),
            (
                FactKey::AuntsUnclesDeceasedWithIssue,
                "Are any of your aunts or uncles deceased with children of their own?",
            ),
            (
                FactKey::HalfAuntsUncles,
                "Do you have any half aunts or uncles (half-siblings of your parents)?",
            ),
        ];

        let mut nodes = vec![QuestionNode::new(
            QuestionId::EstateValue,
            "What is the value of your estate?",
        )];
        nodes.extend(
            flags
                .into_iter()
                .map(|(key, prompt)| QuestionNode::new(QuestionId::Flag(key), prompt)),
        );
        nodes.extend(RecipientClass::COUNTABLE.into_iter().map(|class| {
            QuestionNode::new(
                QuestionId::Count(class),
                format!("How many {} are there?", count_noun(class)),
            )
        }));

        Self {
            root: QuestionId::EstateValue,
            nodes: nodes.into_iter().map(|n| (n.id, n)).collect(),
        }
    }

    pub fn root(&self) -> QuestionId {
        self.root
    }

    pub fn get(&self, id: QuestionId) -> Option<&QuestionNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Questions in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &QuestionNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn count_noun(class: RecipientClass) -> &'static str {
    match class {
        RecipientClass::Children => "living children",
        RecipientClass::Grandchildren => "grandchildren",
        RecipientClass::GreatGrandchildren => "great-grandchildren",
        RecipientClass::Parents => "surviving parents",
        RecipientClass::FullSiblings => "living full siblings",
        RecipientClass::HalfSiblings => "living half-siblings",
        RecipientClass::Grandparents => "living grandparents",
        RecipientClass::FullAuntsUncles => "living full aunts and uncles",
        RecipientClass::HalfAuntsUncles => "living half-aunts and half-uncles",
        RecipientClass::Spouse | RecipientClass::Crown => "recipients",
    }
}
