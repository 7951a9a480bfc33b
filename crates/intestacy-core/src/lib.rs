//! Distribution calculator for UK (England and Wales) intestacy.
//!
//! Given a set of [`EstateFacts`] about the deceased's estate and surviving
//! relatives, the [`DistributionCalculator`] walks the statutory hierarchy and
//! produces a [`DistributionResult`]: a narrative plus an exact per-class
//! breakdown in [`Money`] that always sums to the estate value.

pub mod calculator;
pub mod error;
pub mod facts;
pub mod money;
pub mod recipient;
pub mod result;

pub use calculator::{DistributionCalculator, Entitlement, STATUTORY_LEGACY};
pub use error::CalcError;
pub use facts::{EstateFacts, FactKey, FactValue};
pub use money::{Money, MoneyParseError};
pub use recipient::RecipientClass;
pub use result::{DistributionResult, Share};
