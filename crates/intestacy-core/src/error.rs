//! Error types for the distribution calculator.

use crate::facts::FactKey;
use crate::money::Money;
use crate::recipient::RecipientClass;

/// Errors from recording facts or resolving a distribution.
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error("cannot resolve distribution: fact '{missing}' is still unknown")]
    IncompleteFacts { missing: FactKey },

    #[error("fact '{0}' has already been recorded")]
    FactAlreadyRecorded(FactKey),

    #[error("fact '{key}' cannot hold value {value}")]
    FactKindMismatch { key: FactKey, value: String },

    #[error("estate value must be greater than £0, got {0}")]
    NonPositiveEstate(Money),

    #[error("recipient count for {0} must be at least 1")]
    ZeroCount(RecipientClass),

    #[error("recipient count for {0} has already been recorded")]
    CountAlreadyRecorded(RecipientClass),

    #[error("unknown fact key '{0}'")]
    UnknownFact(String),

    #[error("unknown recipient class '{0}'")]
    UnknownRecipientClass(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}
