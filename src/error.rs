use crate::domain::loan::{LoanId, TenantId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("Invalid loan terms: {field} {reason}")]
    InvalidLoanTerms { field: &'static str, reason: String },
    #[error("Invalid loan application: {field} {reason}")]
    InvalidApplication { field: &'static str, reason: String },
    #[error("Loan {loan} already exists for tenant {tenant}")]
    DuplicateLoan { tenant: TenantId, loan: LoanId },
    #[error("Loan {loan} not found for tenant {tenant}")]
    LoanNotFound { tenant: TenantId, loan: LoanId },
    #[error("Loan {loan} for tenant {tenant} has no pending installments")]
    ScheduleSettled { tenant: TenantId, loan: LoanId },
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl LoanError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidLoanTerms {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LoanError {
    fn from(e: rocksdb::Error) -> Self {
        Self::InternalError(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;
