//! Intestacy hierarchy evaluation and money splitting.
//!
//! The hierarchy is evaluated first-match-wins:
//! spouse → children → grandchildren → great-grandchildren → parents →
//! siblings (full, then half) → grandparents → aunts/uncles (full, then half)
//! → Crown. A fact is only required when the walk reaches it; an unknown
//! required fact stops evaluation with [`CalcError::IncompleteFacts`].

use tracing::debug;

use crate::error::CalcError;
use crate::facts::{EstateFacts, FactKey};
use crate::money::Money;
use crate::recipient::RecipientClass;
use crate::result::{DistributionResult, Share};

/// Statutory legacy for a surviving spouse or civil partner.
pub const STATUTORY_LEGACY: Money = Money::from_pounds(322_000);

const COHABITING_WARNING: &str =
    "As a cohabiting partner, you have no automatic inheritance rights under UK law.";

/// The hierarchy branch that matched a set of facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entitlement {
    /// Married with no children: the spouse takes everything.
    SpouseOnly,
    /// Married with children, estate within the statutory legacy.
    SpouseWithinLegacy,
    /// Married with children, estate above the statutory legacy.
    SpouseAndChildren { per_stirpes: bool },
    /// A single class takes everything in equal shares.
    Class {
        class: RecipientClass,
        per_stirpes: bool,
    },
    /// No eligible relative.
    Crown,
}

/// Evaluates the hierarchy against a set of facts.
///
/// Holds no per-session state; one calculator can serve any number of
/// sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionCalculator {
    statutory_legacy: Money,
}

impl Default for DistributionCalculator {
    fn default() -> Self {
        Self::new(STATUTORY_LEGACY)
    }
}

impl DistributionCalculator {
    pub fn new(statutory_legacy: Money) -> Self {
        Self { statutory_legacy }
    }

    pub fn statutory_legacy(&self) -> Money {
        self.statutory_legacy
    }

    /// Whether enough facts are known to resolve.
    pub fn can_resolve(&self, facts: &EstateFacts) -> bool {
        self.entitlement(facts).is_ok()
    }

    /// The first fact the hierarchy still needs, if any.
    pub fn missing_fact(&self, facts: &EstateFacts) -> Option<FactKey> {
        match self.entitlement(facts) {
            Err(CalcError::IncompleteFacts { missing }) => Some(missing),
            _ => None,
        }
    }

    /// Walk the hierarchy and report the matching branch.
    pub fn entitlement(&self, facts: &EstateFacts) -> Result<Entitlement, CalcError> {
        let estate = facts.estate_value().ok_or(CalcError::IncompleteFacts {
            missing: FactKey::EstateValue,
        })?;

        if need(facts, FactKey::Married)? {
            if !need(facts, FactKey::Children)? {
                return Ok(Entitlement::SpouseOnly);
            }
            if estate <= self.statutory_legacy {
                return Ok(Entitlement::SpouseWithinLegacy);
            }
            return Ok(Entitlement::SpouseAndChildren {
                per_stirpes: descendants_substitute(facts)?,
            });
        }

        if need(facts, FactKey::Children)? {
            return Ok(Entitlement::Class {
                class: RecipientClass::Children,
                per_stirpes: descendants_substitute(facts)?,
            });
        }
        if need(facts, FactKey::Grandchildren)? {
            return Ok(equal(RecipientClass::Grandchildren));
        }
        if need(facts, FactKey::GreatGrandchildren)? {
            return Ok(equal(RecipientClass::GreatGrandchildren));
        }
        if need(facts, FactKey::ParentsAlive)? {
            return Ok(equal(RecipientClass::Parents));
        }
        if need(facts, FactKey::Siblings)? {
            if need(facts, FactKey::FullSiblings)? {
                return Ok(Entitlement::Class {
                    class: RecipientClass::FullSiblings,
                    per_stirpes: need(facts, FactKey::SiblingsDeceasedWithIssue)?,
                });
            }
            if need(facts, FactKey::HalfSiblings)? {
                return Ok(equal(RecipientClass::HalfSiblings));
            }
        }
        if need(facts, FactKey::Grandparents)? {
            return Ok(equal(RecipientClass::Grandparents));
        }
        if need(facts, FactKey::AuntsUncles)? {
            if need(facts, FactKey::FullAuntsUncles)? {
                return Ok(Entitlement::Class {
                    class: RecipientClass::FullAuntsUncles,
                    per_stirpes: need(facts, FactKey::AuntsUnclesDeceasedWithIssue)?,
                });
            }
            if need(facts, FactKey::HalfAuntsUncles)? {
                return Ok(equal(RecipientClass::HalfAuntsUncles));
            }
        }
        Ok(Entitlement::Crown)
    }

    /// Compute the final distribution. Fails with
    /// [`CalcError::IncompleteFacts`] rather than assuming a default.
    pub fn resolve(&self, facts: &EstateFacts) -> Result<DistributionResult, CalcError> {
        let entitlement = self.entitlement(facts)?;
        let estate = facts.estate_value().ok_or(CalcError::IncompleteFacts {
            missing: FactKey::EstateValue,
        })?;
        debug!(?entitlement, %estate, "hierarchy matched");

        let (breakdown, mut narrative) = match entitlement {
            Entitlement::SpouseOnly => (
                vec![Share::new(RecipientClass::Spouse, estate)],
                spouse_takes_all(estate),
            ),
            Entitlement::SpouseWithinLegacy => (
                vec![
                    Share::new(RecipientClass::Spouse, estate),
                    counted(facts, Share::new(RecipientClass::Children, Money::ZERO)),
                ],
                spouse_takes_all(estate),
            ),
            Entitlement::SpouseAndChildren { per_stirpes } => {
                let remainder = estate - self.statutory_legacy;
                let (children_half, spouse_half) = remainder.halve();
                let children = counted(
                    facts,
                    Share::new(RecipientClass::Children, children_half).with_per_stirpes(per_stirpes),
                );
                let narrative = self.spouse_and_children_text(facts, spouse_half, &children);
                (
                    vec![
                        Share::new(RecipientClass::Spouse, self.statutory_legacy + spouse_half),
                        children,
                    ],
                    narrative,
                )
            }
            Entitlement::Class { class, per_stirpes } => {
                let share = counted(facts, Share::new(class, estate).with_per_stirpes(per_stirpes));
                let mut text = class_text(estate, class, per_stirpes);
                if let Some(detail) = per_recipient_text(&share) {
                    text.push(' ');
                    text.push_str(&detail);
                }
                (vec![share], text)
            }
            Entitlement::Crown => (
                vec![Share::new(RecipientClass::Crown, estate)],
                format!("Your estate of {estate} will pass to the Crown (Bona Vacantia)."),
            ),
        };

        let mut warnings = Vec::new();
        if facts.flag(FactKey::Married) == Some(false) && facts.flag(FactKey::Cohabiting) == Some(true)
        {
            warnings.push(COHABITING_WARNING.to_string());
            narrative = format!(
                "Warning: {COHABITING_WARNING}\n\n\
                 Your cohabiting partner will not automatically inherit anything. \
                 Your estate will pass to your relatives according to intestacy rules:\n  - {narrative}\n\n\
                 To protect your partner, you should create a valid Will."
            );
        }

        Ok(DistributionResult {
            estate_value: estate,
            narrative,
            breakdown,
            warnings,
        })
    }

    fn spouse_and_children_text(
        &self,
        facts: &EstateFacts,
        spouse_half: Money,
        children: &Share,
    ) -> String {
        let who = if children.per_stirpes {
            "Your living children and the children of your deceased children \
             (who will share their parent's portion per stirpes)"
        } else if facts.flag(FactKey::ChildrenDeceased) == Some(true) {
            "Your living children"
        } else {
            "Your children"
        };
        let mut text = format!(
            "Your estate will be distributed as follows:\n\
             • Your spouse/civil partner will receive:\n  \
             - First {} as statutory legacy\n  \
             - Plus an absolute interest in {} (half of the remainder)\n\
             • {who} will share: {} (half of the remainder). \
             The children's share of the residue is held on statutory trusts.",
            self.statutory_legacy, spouse_half, children.amount,
        );
        if let Some(detail) = per_recipient_text(children) {
            text.push(' ');
            text.push_str(&detail);
        }
        text
    }
}

/// Yes/no value of a fact the walk has reached.
fn need(facts: &EstateFacts, key: FactKey) -> Result<bool, CalcError> {
    facts
        .flag(key)
        .ok_or(CalcError::IncompleteFacts { missing: key })
}

/// Per-stirpes substitution among descendants: only asked about when some
/// children have died.
fn descendants_substitute(facts: &EstateFacts) -> Result<bool, CalcError> {
    if need(facts, FactKey::ChildrenDeceased)? {
        need(facts, FactKey::DeceasedChildrenHadIssue)
    } else {
        Ok(false)
    }
}

fn equal(class: RecipientClass) -> Entitlement {
    Entitlement::Class {
        class,
        per_stirpes: false,
    }
}

/// Attach the recorded recipient count, if any.
fn counted(facts: &EstateFacts, share: Share) -> Share {
    match facts.count(share.class) {
        Some(n) if share.class.is_countable() => share.with_recipients(n),
        _ => share,
    }
}

fn spouse_takes_all(estate: Money) -> String {
    format!("Your entire estate of {estate} will pass to your spouse/civil partner.")
}

fn class_text(estate: Money, class: RecipientClass, per_stirpes: bool) -> String {
    if class == RecipientClass::Parents {
        return format!(
            "Your entire estate of {estate} will pass to {} in equal shares.",
            class.phrase()
        );
    }
    let who = match class.substitutes() {
        Some(issue) if per_stirpes => format!(
            "{} and {issue} (who will share their parent's portion per stirpes)",
            class.phrase()
        ),
        _ => class.phrase().to_string(),
    };
    format!("Your entire estate of {estate} will be divided equally between {who}.")
}

/// Sentence describing equal per-recipient shares, when a count is known.
fn per_recipient_text(share: &Share) -> Option<String> {
    let n = share.recipients?;
    let largest = share.per_recipient.first()?.to_string();
    let smallest = share.per_recipient.last()?.to_string();
    let unit = if share.per_stirpes { "equal portions" } else { "equal shares" };
    // Shares a few units apart print the same once rounded to the penny.
    Some(if largest == smallest {
        format!("That is {n} {unit} of {largest} each.")
    } else {
        format!("That is {n} {unit} of {smallest} or {largest} each.")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::FactValue;

    fn facts(estate: i64, flags: &[(FactKey, bool)]) -> EstateFacts {
        let mut f = EstateFacts::new();
        f.record(FactKey::EstateValue, FactValue::Amount(Money::from_pounds(estate)))
            .unwrap();
        for (k, v) in flags {
            f.record(*k, FactValue::Flag(*v)).unwrap();
        }
        f
    }

    #[test]
    fn spouse_without_children_takes_all() {
        let calc = DistributionCalculator::default();
        let f = facts(500_000, &[(FactKey::Married, true), (FactKey::Children, false)]);
        let result = calc.resolve(&f).unwrap();
        assert_eq!(
            result.narrative,
            "Your entire estate of £500,000.00 will pass to your spouse/civil partner."
        );
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(
            result.amount_for(RecipientClass::Spouse),
            Some(Money::from_pounds(500_000))
        );
    }

    #[test]
    fn spouse_and_children_above_legacy() {
        let calc = DistributionCalculator::default();
        let f = facts(
            522_000,
            &[
                (FactKey::Married, true),
                (FactKey::Children, true),
                (FactKey::ChildrenDeceased, false),
            ],
        );
        let result = calc.resolve(&f).unwrap();
        assert_eq!(
            result.amount_for(RecipientClass::Spouse),
            Some(Money::from_pounds(422_000))
        );
        assert_eq!(
            result.amount_for(RecipientClass::Children),
            Some(Money::from_pounds(100_000))
        );
        assert!(result.narrative.contains("First £322,000.00 as statutory legacy"));
        assert!(result.narrative.contains("Your children will share: £100,000.00"));
        assert!(!result.narrative.contains("per stirpes"));
    }

    #[test]
    fn spouse_and_children_within_legacy() {
        let calc = DistributionCalculator::default();
        let f = facts(300_000, &[(FactKey::Married, true), (FactKey::Children, true)]);
        let result = calc.resolve(&f).unwrap();
        assert_eq!(
            result.amount_for(RecipientClass::Spouse),
            Some(Money::from_pounds(300_000))
        );
        assert_eq!(result.amount_for(RecipientClass::Children), Some(Money::ZERO));
        assert!(result.narrative.contains("£300,000.00"));
    }

    #[test]
    fn legacy_boundary_is_inclusive() {
        let calc = DistributionCalculator::default();
        let f = facts(322_000, &[(FactKey::Married, true), (FactKey::Children, true)]);
        assert_eq!(calc.entitlement(&f).unwrap(), Entitlement::SpouseWithinLegacy);
    }

    fn spouse_with_children(estate: Money) -> EstateFacts {
        let mut f = EstateFacts::new().with_estate_value(estate).unwrap();
        for (k, v) in [
            (FactKey::Married, true),
            (FactKey::Children, true),
            (FactKey::ChildrenDeceased, false),
        ] {
            f.record(k, FactValue::Flag(v)).unwrap();
        }
        f
    }

    #[test]
    fn sub_penny_residue_is_split_not_rounded() {
        let calc = DistributionCalculator::default();
        let result = calc
            .resolve(&spouse_with_children(Money::from_pence(32_200_001)))
            .unwrap();
        let half_penny = Money::from_pence(1).halve().0;
        assert_eq!(result.amount_for(RecipientClass::Children), Some(half_penny));
        assert_eq!(
            result.amount_for(RecipientClass::Spouse),
            Some(Money::from_pounds(322_000) + half_penny)
        );
        assert_eq!(result.total(), result.estate_value);
    }

    #[test]
    fn odd_unit_remainder_goes_to_spouse() {
        let calc = DistributionCalculator::default();
        let estate = Money::from_pounds(322_000) + Money::from_units(1);
        let result = calc.resolve(&spouse_with_children(estate)).unwrap();
        assert_eq!(result.amount_for(RecipientClass::Children), Some(Money::ZERO));
        assert_eq!(result.amount_for(RecipientClass::Spouse), Some(estate));
        assert_eq!(result.total(), estate);
    }

    #[test]
    fn fractional_estate_keeps_entered_precision() {
        let calc = DistributionCalculator::default();
        let estate: Money = "522000.005".parse().unwrap();
        let result = calc.resolve(&spouse_with_children(estate)).unwrap();
        assert_eq!(result.total(), estate);
        assert_eq!(
            result.amount_for(RecipientClass::Children).unwrap().to_decimal_string(),
            "100000.0025"
        );
        assert!(result.narrative.contains("Your children will share: £100,000.00"));
    }

    #[test]
    fn deceased_child_with_issue_notes_per_stirpes() {
        let calc = DistributionCalculator::default();
        let f = facts(
            622_000,
            &[
                (FactKey::Married, true),
                (FactKey::Children, true),
                (FactKey::ChildrenDeceased, true),
                (FactKey::DeceasedChildrenHadIssue, true),
            ],
        );
        let result = calc.resolve(&f).unwrap();
        assert!(result.narrative.contains("per stirpes"));
        assert_eq!(
            result.amount_for(RecipientClass::Children),
            Some(Money::from_pounds(150_000))
        );
        assert!(result.breakdown[1].per_stirpes);
    }

    #[test]
    fn deceased_child_without_issue_says_living_children() {
        let calc = DistributionCalculator::default();
        let f = facts(
            622_000,
            &[
                (FactKey::Married, true),
                (FactKey::Children, true),
                (FactKey::ChildrenDeceased, true),
                (FactKey::DeceasedChildrenHadIssue, false),
            ],
        );
        let result = calc.resolve(&f).unwrap();
        assert!(result.narrative.contains("Your living children will share"));
        assert!(!result.breakdown[1].per_stirpes);
    }

    #[test]
    fn married_without_children_ignores_everything_else() {
        let calc = DistributionCalculator::default();
        let f = facts(
            500_000,
            &[
                (FactKey::Married, true),
                (FactKey::Children, false),
                (FactKey::ParentsAlive, true),
                (FactKey::Siblings, true),
                (FactKey::Grandchildren, true),
            ],
        );
        assert_eq!(calc.entitlement(&f).unwrap(), Entitlement::SpouseOnly);
    }

    #[test]
    fn unmarried_children_take_all() {
        let calc = DistributionCalculator::default();
        let mut f = facts(
            90_000,
            &[
                (FactKey::Married, false),
                (FactKey::Children, true),
                (FactKey::ChildrenDeceased, false),
            ],
        );
        f.record_count(RecipientClass::Children, 4).unwrap();
        let result = calc.resolve(&f).unwrap();
        assert_eq!(
            result.narrative,
            "Your entire estate of £90,000.00 will be divided equally between your living children. \
             That is 4 equal shares of £22,500.00 each."
        );
        assert_eq!(result.breakdown[0].per_recipient.len(), 4);
    }

    #[test]
    fn parents_take_all() {
        let calc = DistributionCalculator::default();
        let f = facts(
            500_000,
            &[
                (FactKey::Married, false),
                (FactKey::Children, false),
                (FactKey::Grandchildren, false),
                (FactKey::GreatGrandchildren, false),
                (FactKey::ParentsAlive, true),
            ],
        );
        let result = calc.resolve(&f).unwrap();
        assert!(result.narrative.contains("surviving parent(s)"));
        assert_eq!(
            result.amount_for(RecipientClass::Parents),
            Some(Money::from_pounds(500_000))
        );
    }

    #[test]
    fn grandchildren_before_great_grandchildren() {
        let calc = DistributionCalculator::default();
        let f = facts(
            10_000,
            &[
                (FactKey::Married, false),
                (FactKey::Children, false),
                (FactKey::Grandchildren, true),
                (FactKey::GreatGrandchildren, true),
            ],
        );
        assert_eq!(
            calc.entitlement(&f).unwrap(),
            equal(RecipientClass::Grandchildren)
        );
    }

    #[test]
    fn full_siblings_with_issue() {
        let calc = DistributionCalculator::default();
        let f = facts(
            200_000,
            &[
                (FactKey::Married, false),
                (FactKey::Children, false),
                (FactKey::Grandchildren, false),
                (FactKey::GreatGrandchildren, false),
                (FactKey::ParentsAlive, false),
                (FactKey::Siblings, true),
                (FactKey::FullSiblings, true),
                (FactKey::SiblingsDeceasedWithIssue, true),
            ],
        );
        let result = calc.resolve(&f).unwrap();
        assert!(result
            .narrative
            .contains("the children of your deceased full siblings (who will share their parent's portion per stirpes)"));
        assert_eq!(
            result.amount_for(RecipientClass::FullSiblings),
            Some(Money::from_pounds(200_000))
        );
    }

    #[test]
    fn siblings_without_full_or_half_fall_through() {
        let calc = DistributionCalculator::default();
        let f = facts(
            200_000,
            &[
                (FactKey::Married, false),
                (FactKey::Children, false),
                (FactKey::Grandchildren, false),
                (FactKey::GreatGrandchildren, false),
                (FactKey::ParentsAlive, false),
                (FactKey::Siblings, true),
                (FactKey::FullSiblings, false),
                (FactKey::HalfSiblings, false),
                (FactKey::Grandparents, true),
            ],
        );
        assert_eq!(
            calc.entitlement(&f).unwrap(),
            equal(RecipientClass::Grandparents)
        );
    }

    #[test]
    fn half_aunts_and_uncles() {
        let calc = DistributionCalculator::default();
        let f = facts(
            50_000,
            &[
                (FactKey::Married, false),
                (FactKey::Children, false),
                (FactKey::Grandchildren, false),
                (FactKey::GreatGrandchildren, false),
                (FactKey::ParentsAlive, false),
                (FactKey::Siblings, false),
                (FactKey::Grandparents, false),
                (FactKey::AuntsUncles, true),
                (FactKey::FullAuntsUncles, false),
                (FactKey::HalfAuntsUncles, true),
            ],
        );
        let result = calc.resolve(&f).unwrap();
        assert_eq!(result.breakdown[0].class, RecipientClass::HalfAuntsUncles);
        assert!(result.narrative.contains("half-aunts and half-uncles"));
    }

    #[test]
    fn nobody_left_goes_to_crown() {
        let calc = DistributionCalculator::default();
        let f = facts(
            500_000,
            &[
                (FactKey::Married, false),
                (FactKey::Children, false),
                (FactKey::Grandchildren, false),
                (FactKey::GreatGrandchildren, false),
                (FactKey::ParentsAlive, false),
                (FactKey::Siblings, false),
                (FactKey::Grandparents, false),
                (FactKey::AuntsUncles, false),
            ],
        );
        let result = calc.resolve(&f).unwrap();
        assert_eq!(
            result.narrative,
            "Your estate of £500,000.00 will pass to the Crown (Bona Vacantia)."
        );
        assert_eq!(
            result.amount_for(RecipientClass::Crown),
            Some(Money::from_pounds(500_000))
        );
    }

    #[test]
    fn incomplete_facts_are_reported() {
        let calc = DistributionCalculator::default();
        assert!(matches!(
            calc.resolve(&EstateFacts::new()),
            Err(CalcError::IncompleteFacts {
                missing: FactKey::EstateValue
            })
        ));

        let f = facts(500_000, &[(FactKey::Married, false), (FactKey::Children, false)]);
        assert!(!calc.can_resolve(&f));
        assert_eq!(calc.missing_fact(&f), Some(FactKey::Grandchildren));

        let f = facts(
            622_000,
            &[(FactKey::Married, true), (FactKey::Children, true)],
        );
        assert_eq!(calc.missing_fact(&f), Some(FactKey::ChildrenDeceased));
    }

    #[test]
    fn cohabiting_partner_gets_warning() {
        let calc = DistributionCalculator::default();
        let f = facts(
            100_000,
            &[
                (FactKey::Married, false),
                (FactKey::Cohabiting, true),
                (FactKey::Children, false),
                (FactKey::Grandchildren, false),
                (FactKey::GreatGrandchildren, false),
                (FactKey::ParentsAlive, true),
            ],
        );
        let result = calc.resolve(&f).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.narrative.starts_with("Warning: As a cohabiting partner"));
        assert!(result.narrative.contains("create a valid Will"));
        assert_eq!(
            result.amount_for(RecipientClass::Parents),
            Some(Money::from_pounds(100_000))
        );
    }

    #[test]
    fn custom_statutory_legacy() {
        let calc = DistributionCalculator::new(Money::from_pounds(270_000));
        let f = facts(
            300_000,
            &[
                (FactKey::Married, true),
                (FactKey::Children, true),
                (FactKey::ChildrenDeceased, false),
            ],
        );
        let result = calc.resolve(&f).unwrap();
        assert_eq!(
            result.amount_for(RecipientClass::Spouse),
            Some(Money::from_pounds(285_000))
        );
        assert_eq!(
            result.amount_for(RecipientClass::Children),
            Some(Money::from_pounds(15_000))
        );
    }
}
