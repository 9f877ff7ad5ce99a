use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no account with number {0}")]
    NotFound(String),

    #[error("invalid credentials, or the customer is locked")]
    Unauthorized,

    #[error("account is suspended")]
    AccountSuspended,

    #[error("insufficient funds: requested {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("withdrawal would drop the balance below the {minimum} minimum")]
    BelowMinimumBalance { minimum: Decimal },

    #[error("generated account number {0} already exists")]
    DuplicateAccount(String),

    #[error(transparent)]
    Persistence(#[from] std::io::Error),
}
