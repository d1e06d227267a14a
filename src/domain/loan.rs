use super::money::Money;
use crate::error::{LoanError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies the microfinance institution that owns a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub u32);

/// Identifies a loan within a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub u32);

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The four parameters of a fixed-rate loan.
///
/// Only constructible through [`LoanTerms::new`] or from a
/// [`LoanApplication`], both of which validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    principal: Money,
    annual_interest_rate_percent: Decimal,
    term_in_months: u32,
    start_date: NaiveDate,
}

impl LoanTerms {
    pub fn new(
        principal: Decimal,
        annual_interest_rate_percent: Decimal,
        term_in_months: u32,
        start_date: NaiveDate,
    ) -> Result<Self> {
        let terms = Self {
            principal: Money::new(principal),
            annual_interest_rate_percent,
            term_in_months,
            start_date,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// Checks the amortization preconditions.
    ///
    /// Called on construction and again by the engine, since terms read back
    /// from storage bypass [`LoanTerms::new`].
    pub fn validate(&self) -> Result<()> {
        if self.principal.value() <= Decimal::ZERO {
            return Err(LoanError::invalid("principal", "must be greater than zero"));
        }
        if self.annual_interest_rate_percent < Decimal::ZERO {
            return Err(LoanError::invalid("annual_rate", "must not be negative"));
        }
        if self.term_in_months == 0 {
            return Err(LoanError::invalid("term_months", "must be at least one month"));
        }
        Ok(())
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn annual_interest_rate_percent(&self) -> Decimal {
        self.annual_interest_rate_percent
    }

    pub fn term_in_months(&self) -> u32 {
        self.term_in_months
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }
}

/// A loan request as it arrives from a form or an import file.
///
/// Every field is optional and the numeric ones are kept as text, so a
/// missing or malformed value surfaces as a validation error naming the
/// field instead of a generic decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoanApplication {
    pub tenant: Option<u32>,
    pub loan: Option<u32>,
    pub borrower: Option<String>,
    pub principal: Option<String>,
    pub annual_rate: Option<String>,
    pub term_months: Option<String>,
    pub start_date: Option<String>,
}

impl LoanApplication {
    pub fn tenant(&self) -> Result<TenantId> {
        self.tenant
            .map(TenantId)
            .ok_or_else(|| missing_application_field("tenant"))
    }

    pub fn loan(&self) -> Result<LoanId> {
        self.loan
            .map(LoanId)
            .ok_or_else(|| missing_application_field("loan"))
    }

    pub fn borrower(&self) -> Result<&str> {
        match self.borrower.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(missing_application_field("borrower")),
        }
    }
}

fn missing_application_field(field: &'static str) -> LoanError {
    LoanError::InvalidApplication {
        field,
        reason: "is required".to_string(),
    }
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Ok(raw),
        _ => Err(LoanError::invalid(field, "is required")),
    }
}

fn parse_field<T: FromStr>(field: &'static str, value: &Option<String>) -> Result<T> {
    let raw = required(field, value)?;
    raw.parse()
        .map_err(|_| LoanError::invalid(field, format!("is not valid: {raw:?}")))
}

impl TryFrom<&LoanApplication> for LoanTerms {
    type Error = LoanError;

    fn try_from(app: &LoanApplication) -> Result<Self> {
        let principal: Decimal = parse_field("principal", &app.principal)?;
        let annual_rate: Decimal = parse_field("annual_rate", &app.annual_rate)?;
        let term_months: u32 = parse_field("term_months", &app.term_months)?;
        let start_date: NaiveDate = parse_field("start_date", &app.start_date)?;
        LoanTerms::new(principal, annual_rate, term_months, start_date)
    }
}

/// One scheduled repayment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub sequence_number: u32,
    pub due_date: NaiveDate,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
}

/// Output of the amortization engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub monthly_payment: Money,
    pub total_payments: Money,
    pub total_interest: Money,
    pub schedule: Vec<Installment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    #[default]
    Pending,
    Paid,
}

/// A stored schedule row: one installment of a confirmed loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub loan: LoanId,
    pub installment: Installment,
    #[serde(default)]
    pub status: InstallmentStatus,
}

/// A confirmed loan as kept by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub tenant: TenantId,
    pub loan: LoanId,
    pub borrower: String,
    pub terms: LoanTerms,
    pub monthly_payment: Money,
    pub total_payments: Money,
    pub total_interest: Money,
}
