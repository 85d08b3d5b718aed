//! Domain errors for rate lookup, settlement and the upstream rate API.

use rust_decimal::Decimal;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DutyError {
    #[error("customer rate '{0}' not found")]
    NotFound(String),

    #[error("closing km {closing} is less than starting km {starting}")]
    InvalidRange { starting: Decimal, closing: Decimal },

    #[error("no rate plan '{title}' for customer '{customer}'")]
    RateNotFound { customer: String, title: String },

    #[error("cannot read the included distance from title '{0}'")]
    UnparseableTitle(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("rate API unreachable: {0}")]
    NetworkFailure(String),

    #[error("rate API responded with status {status}: {message}")]
    UpstreamRejected { status: u16, message: String },
}

pub type DutyResult<T> = Result<T, DutyError>;

impl DutyError {
    /// Whether the failure came from the upstream API rather than the input.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            DutyError::NetworkFailure(_) | DutyError::UpstreamRejected { .. }
        )
    }
}

impl From<DutyError> for AppError {
    fn from(err: DutyError) -> Self {
        match err {
            DutyError::NotFound(_) => AppError::NotFound(anyhow::Error::new(err)),
            DutyError::InvalidRange { .. }
            | DutyError::InvalidInput(_)
            | DutyError::UnparseableTitle(_) => AppError::BadRequest(anyhow::Error::new(err)),
            DutyError::RateNotFound { .. } => AppError::Unprocessable(anyhow::Error::new(err)),
            DutyError::NetworkFailure(_) | DutyError::UpstreamRejected { .. } => {
                AppError::BadGateway(err.to_string())
            }
        }
    }
}
