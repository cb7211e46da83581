use accumulate_ledger_api::LedgerApiError;
use thiserror::Error;

/// Error type for the mock ledger API.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// A failure injected with `MockLedgerApi::fail_scope` or
    /// `MockLedgerApi::fail_network_status`.
    #[error("{0}")]
    Injected(String),

    /// No record was registered for the scope.
    #[error("{0} not found")]
    NotFound(String),
}

impl LedgerApiError for Error {}
