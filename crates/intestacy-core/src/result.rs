//! The outcome of a resolved distribution.

use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::money::Money;
use crate::recipient::RecipientClass;

/// One line of the breakdown: what a class of recipients receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub class: RecipientClass,
    /// Exact amount for the whole class.
    pub amount: Money,
    /// Number of equal shares the class amount is divided into, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<u32>,
    /// Exact per-recipient amounts; sums to `amount`. Empty unless
    /// `recipients` is known.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub per_recipient: Vec<Money>,
    /// Whether the issue of a predeceased member takes that member's share.
    #[serde(default)]
    pub per_stirpes: bool,
}

impl Share {
    pub fn new(class: RecipientClass, amount: Money) -> Self {
        Self {
            class,
            amount,
            recipients: None,
            per_recipient: Vec::new(),
            per_stirpes: false,
        }
    }

    /// Builder: divide the class amount among `n` recipients.
    pub fn with_recipients(mut self, n: u32) -> Self {
        self.recipients = Some(n);
        self.per_recipient = self.amount.split_even(n);
        self
    }

    /// Builder: mark per-stirpes substitution.
    pub fn with_per_stirpes(mut self, per_stirpes: bool) -> Self {
        self.per_stirpes = per_stirpes;
        self
    }
}

/// Final distribution of an estate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionResult {
    pub estate_value: Money,
    /// Human-readable explanation.
    pub narrative: String,
    /// Per-class amounts, summing exactly to `estate_value`.
    pub breakdown: Vec<Share>,
    /// Caveats shown alongside the distribution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl DistributionResult {
    /// Amount received by a class, if it appears in the breakdown.
    pub fn amount_for(&self, class: RecipientClass) -> Option<Money> {
        self.breakdown
            .iter()
            .find(|s| s.class == class)
            .map(|s| s.amount)
    }

    /// Sum of all breakdown amounts.
    pub fn total(&self) -> Money {
        self.breakdown.iter().map(|s| s.amount).sum()
    }

    pub fn to_json(&self) -> Result<String, CalcError> {
        serde_json::to_string_pretty(self).map_err(|e| CalcError::Serialization(e.to_string()))
    }

    /// Plain-text breakdown table with percentages.
    pub fn format_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{:<28}  {:>18}  {:>7}\n", "RECIPIENT", "AMOUNT", "SHARE"));
        out.push_str(&format!("{}\n", "-".repeat(57)));
        for share in &self.breakdown {
            out.push_str(&format!(
                "{:<28}  {:>18}  {:>7}\n",
                share.class.label(),
                share.amount.to_string(),
                percent(share.amount, self.estate_value),
            ));
        }
        out.push_str(&format!("{}\n", "-".repeat(57)));
        out.push_str(&format!(
            "{:<28}  {:>18}  {:>7}\n",
            "Total",
            self.total().to_string(),
            percent(self.total(), self.estate_value),
        ));
        out
    }
}

/// Percentage to one decimal place, computed in integer arithmetic.
fn percent(part: Money, whole: Money) -> String {
    if whole.is_zero() {
        return "0.0%".to_string();
    }
    let (part, whole) = (part.units(), whole.units());
    let per_mille = match part.checked_mul(1000) {
        Some(scaled) => (scaled + whole / 2) / whole,
        None => {
            let per_mille_unit = (whole / 1000).max(1);
            (part + per_mille_unit / 2) / per_mille_unit
        }
    };
    format!("{}.{}%", per_mille / 10, per_mille % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_way() -> DistributionResult {
        DistributionResult {
            estate_value: Money::from_pounds(522_000),
            narrative: String::new(),
            breakdown: vec![
                Share::new(RecipientClass::Spouse, Money::from_pounds(422_000)),
                Share::new(RecipientClass::Children, Money::from_pounds(100_000)).with_recipients(3),
            ],
            warnings: Vec::new(),
        }
    }

    #[test]
    fn amount_lookup_and_total() {
        let result = two_way();
        assert_eq!(
            result.amount_for(RecipientClass::Children),
            Some(Money::from_pounds(100_000))
        );
        assert_eq!(result.amount_for(RecipientClass::Crown), None);
        assert_eq!(result.total(), result.estate_value);
    }

    #[test]
    fn per_recipient_shares_sum_to_class_amount() {
        let result = two_way();
        let children = &result.breakdown[1];
        assert_eq!(children.per_recipient.len(), 3);
        assert_eq!(
            children.per_recipient.iter().copied().sum::<Money>(),
            children.amount
        );
    }

    #[test]
    fn table_shows_percentages() {
        let table = two_way().format_table();
        assert!(table.contains("Spouse/Civil Partner"));
        assert!(table.contains("£422,000.00"));
        assert!(table.contains("80.8%"));
        assert!(table.contains("19.2%"));
        assert!(table.contains("100.0%"));
    }

    #[test]
    fn percent_of_very_large_estate() {
        let whole = Money::from_pounds(1_000_000_000_000_000_000);
        let (half, _) = whole.halve();
        assert_eq!(percent(half, whole), "50.0%");
        assert_eq!(percent(whole, whole), "100.0%");
    }

    #[test]
    fn json_omits_empty_fields() {
        let result = DistributionResult {
            estate_value: Money::from_pounds(10),
            narrative: "n".into(),
            breakdown: vec![Share::new(RecipientClass::Crown, Money::from_pounds(10))],
            warnings: Vec::new(),
        };
        let json = result.to_json().unwrap();
        assert!(json.contains("\"class\": \"crown\""));
        assert!(!json.contains("warnings"));
        assert!(!json.contains("per_recipient"));
    }
}
