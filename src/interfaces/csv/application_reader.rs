use crate::domain::loan::LoanApplication;
use crate::error::{LoanError, Result};
use std::io::Read;

/// Reads loan applications from a CSV source.
///
/// Expected header: `tenant, loan, borrower, principal, annual_rate,
/// term_months, start_date`. Whitespace is trimmed and short rows are
/// accepted; missing trailing fields become `None` and are rejected later
/// with the field's name.
pub struct LoanApplicationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> LoanApplicationReader<R> {
    /// Creates a new `LoanApplicationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes applications.
    pub fn applications(self) -> impl Iterator<Item = Result<LoanApplication>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LoanError::from))
    }
}
