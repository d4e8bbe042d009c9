//! Error type shared by every ledger operation.

use thiserror::Error;

pub type PosResult<T> = Result<T, PosError>;

#[derive(Debug, Error)]
pub enum PosError {
    // -- checkout -----------------------------------------------------------
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Unknown product: {0}")]
    UnknownProduct(String),
    #[error("Product is inactive: {0}")]
    InactiveProduct(String),
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),
    #[error("Payment method is inactive: {0}")]
    InactivePaymentMethod(String),
    #[error("Team {0} is an internal team and can only book internal consumption")]
    InternalOnly(String),
    #[error("Internal consumption can only be booked for an internal team")]
    NotAnInternalTeam,
    #[error("Payment method {0} requires a team")]
    TeamRequired(String),
    #[error("Unknown team: {0}")]
    UnknownTeam(String),
    #[error("Quantity too large for {0}")]
    QuantityTooLarge(String),
    #[error("Cash tendered ({given}) does not cover the total ({total})")]
    InsufficientCash { total: String, given: String },

    // -- ledger / settlement ------------------------------------------------
    #[error("No transactions to undo")]
    NothingToUndo,
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Team {0} has no open balance")]
    NothingToSettle(String),

    // -- cash book ----------------------------------------------------------
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("An expense needs a description")]
    MissingDescription,
    #[error("No rent cost configured")]
    RentNotConfigured,
    #[error("Rent has already been paid for this event")]
    RentAlreadyPaid,

    // -- catalog ------------------------------------------------------------
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Category already exists: {0}")]
    DuplicateCategory(String),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Category {0} is the fallback category and cannot be deleted")]
    ProtectedCategory(String),
    #[error("Payment method already exists: {0}")]
    DuplicatePaymentMethod(String),

    // -- reports / config ---------------------------------------------------
    #[error("Nothing to close: the event has no transactions or cash log entries")]
    NothingToClose,
    #[error("Event report not found: {0}")]
    ReportNotFound(String),
    #[error("Invalid config file: {0}")]
    InvalidConfig(String),

    // -- infrastructure -----------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Stored document '{key}' is unreadable ({reason}); fix or remove it before booking again")]
    CorruptDocument { key: String, reason: String },
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
