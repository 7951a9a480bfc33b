//! Estate facts gathered from the user.
//!
//! Every fact starts unknown and becomes known exactly once. Relative counts
//! are an optional extra used only to show per-recipient shares.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::money::Money;
use crate::recipient::RecipientClass;

/// Keys of the fact map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKey {
    EstateValue,
    Married,
    Cohabiting,
    Children,
    ChildrenDeceased,
    DeceasedChildrenHadIssue,
    Grandchildren,
    GreatGrandchildren,
    ParentsAlive,
    Siblings,
    FullSiblings,
    HalfSiblings,
    SiblingsDeceasedWithIssue,
    Grandparents,
    AuntsUncles,
    FullAuntsUncles,
    HalfAuntsUncles,
    AuntsUnclesDeceasedWithIssue,
}

impl FactKey {
    pub const ALL: [FactKey; 18] = [
        FactKey::EstateValue,
        FactKey::Married,
        FactKey::Cohabiting,
        FactKey::Children,
        FactKey::ChildrenDeceased,
        FactKey::DeceasedChildrenHadIssue,
        FactKey::Grandchildren,
        FactKey::GreatGrandchildren,
        FactKey::ParentsAlive,
        FactKey::Siblings,
        FactKey::FullSiblings,
        FactKey::HalfSiblings,
        FactKey::SiblingsDeceasedWithIssue,
        FactKey::Grandparents,
        FactKey::AuntsUncles,
        FactKey::FullAuntsUncles,
        FactKey::HalfAuntsUncles,
        FactKey::AuntsUnclesDeceasedWithIssue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FactKey::EstateValue => "estate_value",
            FactKey::Married => "married",
            FactKey::Cohabiting => "cohabiting",
            FactKey::Children => "children",
            FactKey::ChildrenDeceased => "children_deceased",
            FactKey::DeceasedChildrenHadIssue => "deceased_children_had_issue",
            FactKey::Grandchildren => "grandchildren",
            FactKey::GreatGrandchildren => "great_grandchildren",
            FactKey::ParentsAlive => "parents_alive",
            FactKey::Siblings => "siblings",
            FactKey::FullSiblings => "full_siblings",
            FactKey::HalfSiblings => "half_siblings",
            FactKey::SiblingsDeceasedWithIssue => "siblings_deceased_with_issue",
            FactKey::Grandparents => "grandparents",
            FactKey::AuntsUncles => "aunts_uncles",
            FactKey::FullAuntsUncles => "full_aunts_uncles",
            FactKey::HalfAuntsUncles => "half_aunts_uncles",
            FactKey::AuntsUnclesDeceasedWithIssue => "aunts_uncles_deceased_with_issue",
        }
    }

    /// Whether this key holds a money amount rather than yes/no.
    pub fn is_amount(self) -> bool {
        self == FactKey::EstateValue
    }
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactKey {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FactKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CalcError::UnknownFact(s.to_string()))
    }
}

/// The value held under a fact key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactValue {
    Unknown,
    Flag(bool),
    Amount(Money),
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Unknown => write!(f, "unknown"),
            FactValue::Flag(true) => write!(f, "yes"),
            FactValue::Flag(false) => write!(f, "no"),
            FactValue::Amount(m) => write!(f, "{m}"),
        }
    }
}

/// The facts known about one estate.
///
/// Deserialization goes through the same checks as [`EstateFacts::record`]
/// and [`EstateFacts::record_count`], so a loaded value never holds a
/// non-positive estate or a zero count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FactsRecord")]
pub struct EstateFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    estate_value: Option<Money>,
    #[serde(flatten)]
    flags: BTreeMap<FactKey, bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    counts: BTreeMap<RecipientClass, u32>,
}

/// Unchecked wire form of [`EstateFacts`].
#[derive(Deserialize)]
struct FactsRecord {
    #[serde(default)]
    estate_value: Option<Money>,
    #[serde(flatten)]
    flags: BTreeMap<FactKey, bool>,
    #[serde(default)]
    counts: BTreeMap<RecipientClass, u32>,
}

impl TryFrom<FactsRecord> for EstateFacts {
    type Error = CalcError;

    fn try_from(record: FactsRecord) -> Result<Self, Self::Error> {
        if let Some(value) = record.estate_value {
            if !value.is_positive() {
                return Err(CalcError::NonPositiveEstate(value));
            }
        }
        if let Some((class, _)) = record.counts.iter().find(|(_, n)| **n == 0) {
            return Err(CalcError::ZeroCount(*class));
        }
        Ok(EstateFacts {
            estate_value: record.estate_value,
            flags: record.flags,
            counts: record.counts,
        })
    }
}

impl EstateFacts {
    /// All facts unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a fact.
    pub fn get(&self, key: FactKey) -> FactValue {
        if key.is_amount() {
            return self
                .estate_value
                .map_or(FactValue::Unknown, FactValue::Amount);
        }
        self.flags
            .get(&key)
            .copied()
            .map_or(FactValue::Unknown, FactValue::Flag)
    }

    /// Yes/no value of a fact, `None` while unknown.
    pub fn flag(&self, key: FactKey) -> Option<bool> {
        self.flags.get(&key).copied()
    }

    /// The estate value, `None` while unknown.
    pub fn estate_value(&self) -> Option<Money> {
        self.estate_value
    }

    pub fn is_known(&self, key: FactKey) -> bool {
        self.get(key) != FactValue::Unknown
    }

    /// Number of recipients recorded for a class.
    pub fn count(&self, class: RecipientClass) -> Option<u32> {
        self.counts.get(&class).copied()
    }

    /// Record a fact. Each fact may be recorded once; the value kind must
    /// match the key.
    pub fn record(&mut self, key: FactKey, value: FactValue) -> Result<(), CalcError> {
        if self.is_known(key) {
            return Err(CalcError::FactAlreadyRecorded(key));
        }
        match (key.is_amount(), value) {
            (true, FactValue::Amount(amount)) => {
                if !amount.is_positive() {
                    return Err(CalcError::NonPositiveEstate(amount));
                }
                self.estate_value = Some(amount);
            }
            (false, FactValue::Flag(b)) => {
                self.flags.insert(key, b);
            }
            _ => {
                return Err(CalcError::FactKindMismatch {
                    key,
                    value: value.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Builder-style shorthand for a yes/no fact.
    pub fn with_flag(mut self, key: FactKey, value: bool) -> Result<Self, CalcError> {
        self.record(key, FactValue::Flag(value))?;
        Ok(self)
    }

    /// Builder-style shorthand for the estate value.
    pub fn with_estate_value(mut self, value: Money) -> Result<Self, CalcError> {
        self.record(FactKey::EstateValue, FactValue::Amount(value))?;
        Ok(self)
    }

    /// Record how many recipients a class has. Counts, like facts, are set
    /// once and must be at least one.
    pub fn record_count(&mut self, class: RecipientClass, count: u32) -> Result<(), CalcError> {
        if count == 0 {
            return Err(CalcError::ZeroCount(class));
        }
        if self.counts.contains_key(&class) {
            return Err(CalcError::CountAlreadyRecorded(class));
        }
        self.counts.insert(class, count);
        Ok(())
    }

    /// Iterate over the known facts in key order.
    pub fn known(&self) -> impl Iterator<Item = (FactKey, FactValue)> + '_ {
        FactKey::ALL
            .into_iter()
            .map(|k| (k, self.get(k)))
            .filter(|(_, v)| *v != FactValue::Unknown)
    }

    /// Parse facts from a JSON document and check the same invariants
    /// `record` enforces.
    pub fn from_json(json: &str) -> Result<Self, CalcError> {
        serde_json::from_str(json).map_err(|e| CalcError::Deserialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, CalcError> {
        serde_json::to_string_pretty(self).map_err(|e| CalcError::Serialization(e.to_string()))
    }
}
