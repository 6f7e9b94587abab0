use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PayoffError {
    #[error("debt '{id}': {field} must be >= 0")]
    NegativeValue { id: String, field: &'static str },

    #[error("debt '{id}': {field} must be finite")]
    NonFiniteValue { id: String, field: &'static str },

    #[error("extra monthly payment must be >= 0")]
    NegativeExtraPayment,

    #[error("extra monthly payment must be finite")]
    NonFiniteExtraPayment,

    #[error("duplicate debt id '{0}'")]
    DuplicateDebtId(String),

    #[error("max months must be between 1 and {limit}, got {value}")]
    InvalidMaxMonths { value: u32, limit: u32 },

    #[error("invalid goal: {0}")]
    InvalidGoal(String),
}
