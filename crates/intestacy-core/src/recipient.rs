//! Classes of people (or the Crown) that can take under intestacy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalcError;

/// A class of recipient in the distribution breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientClass {
    Spouse,
    Children,
    Grandchildren,
    GreatGrandchildren,
    Parents,
    FullSiblings,
    HalfSiblings,
    Grandparents,
    FullAuntsUncles,
    HalfAuntsUncles,
    Crown,
}

impl RecipientClass {
    pub const ALL: [RecipientClass; 11] = [
        RecipientClass::Spouse,
        RecipientClass::Children,
        RecipientClass::Grandchildren,
        RecipientClass::GreatGrandchildren,
        RecipientClass::Parents,
        RecipientClass::FullSiblings,
        RecipientClass::HalfSiblings,
        RecipientClass::Grandparents,
        RecipientClass::FullAuntsUncles,
        RecipientClass::HalfAuntsUncles,
        RecipientClass::Crown,
    ];

    /// Classes whose members share equally and can therefore be counted.
    pub const COUNTABLE: [RecipientClass; 9] = [
        RecipientClass::Children,
        RecipientClass::Grandchildren,
        RecipientClass::GreatGrandchildren,
        RecipientClass::Parents,
        RecipientClass::FullSiblings,
        RecipientClass::HalfSiblings,
        RecipientClass::Grandparents,
        RecipientClass::FullAuntsUncles,
        RecipientClass::HalfAuntsUncles,
    ];

    /// Machine name, as used in JSON and question ids.
    pub fn as_str(self) -> &'static str {
        match self {
            RecipientClass::Spouse => "spouse",
            RecipientClass::Children => "children",
            RecipientClass::Grandchildren => "grandchildren",
            RecipientClass::GreatGrandchildren => "great_grandchildren",
            RecipientClass::Parents => "parents",
            RecipientClass::FullSiblings => "full_siblings",
            RecipientClass::HalfSiblings => "half_siblings",
            RecipientClass::Grandparents => "grandparents",
            RecipientClass::FullAuntsUncles => "full_aunts_uncles",
            RecipientClass::HalfAuntsUncles => "half_aunts_uncles",
            RecipientClass::Crown => "crown",
        }
    }

    /// Display label for breakdown tables.
    pub fn label(self) -> &'static str {
        match self {
            RecipientClass::Spouse => "Spouse/Civil Partner",
            RecipientClass::Children => "Children",
            RecipientClass::Grandchildren => "Grandchildren",
            RecipientClass::GreatGrandchildren => "Great-Grandchildren",
            RecipientClass::Parents => "Parents",
            RecipientClass::FullSiblings => "Full Siblings",
            RecipientClass::HalfSiblings => "Half-Siblings",
            RecipientClass::Grandparents => "Grandparents",
            RecipientClass::FullAuntsUncles => "Full Aunts and Uncles",
            RecipientClass::HalfAuntsUncles => "Half-Aunts and Half-Uncles",
            RecipientClass::Crown => "Crown (Bona Vacantia)",
        }
    }

    /// How the class reads inside a sentence ("your living children").
    pub fn phrase(self) -> &'static str {
        match self {
            RecipientClass::Spouse => "your spouse/civil partner",
            RecipientClass::Children => "your living children",
            RecipientClass::Grandchildren => "your grandchildren",
            RecipientClass::GreatGrandchildren => "your great-grandchildren",
            RecipientClass::Parents => "your surviving parent(s)",
            RecipientClass::FullSiblings => "your living full siblings",
            RecipientClass::HalfSiblings => "your living half-siblings",
            RecipientClass::Grandparents => "your grandparents",
            RecipientClass::FullAuntsUncles => "your living full aunts and uncles",
            RecipientClass::HalfAuntsUncles => "your living half-aunts and half-uncles",
            RecipientClass::Crown => "the Crown (Bona Vacantia)",
        }
    }

    /// Who steps into a predeceased member's place, for classes where
    /// substitution applies.
    pub fn substitutes(self) -> Option<&'static str> {
        match self {
            RecipientClass::Children => Some("the children of your deceased children"),
            RecipientClass::FullSiblings => Some("the children of your deceased full siblings"),
            RecipientClass::FullAuntsUncles => {
                Some("the children of your deceased full aunts and uncles")
            }
            _ => None,
        }
    }

    pub fn is_countable(self) -> bool {
        Self::COUNTABLE.contains(&self)
    }
}

impl fmt::Display for RecipientClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecipientClass {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecipientClass::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CalcError::UnknownRecipientClass(s.to_string()))
    }
}
