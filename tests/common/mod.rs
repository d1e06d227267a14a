use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 7] = [
    "tenant",
    "loan",
    "borrower",
    "principal",
    "annual_rate",
    "term_months",
    "start_date",
];

/// Writes `rows` applications spread across `tenants` tenants, loan ids 1..=rows.
pub fn generate_applications(path: &Path, rows: usize, tenants: u32) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(HEADER)?;

    for i in 1..=rows {
        let tenant = (i as u32 % tenants) + 1;
        let (tenant, loan, borrower) = (tenant.to_string(), i.to_string(), format!("Borrower {i}"));
        wtr.write_record([
            tenant.as_str(),
            loan.as_str(),
            borrower.as_str(),
            "1200",
            "18",
            "12",
            "2024-01-15",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
