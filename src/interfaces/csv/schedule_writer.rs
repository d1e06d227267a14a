use crate::domain::loan::{
    AmortizationResult, Installment, InstallmentStatus, LoanId, ScheduledPayment, TenantId,
};
use crate::domain::money::Money;
use crate::error::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct SimulationRow {
    installment: u32,
    due_date: NaiveDate,
    payment: Money,
    principal: Money,
    interest: Money,
    balance: Money,
}

impl From<&Installment> for SimulationRow {
    fn from(i: &Installment) -> Self {
        Self {
            installment: i.sequence_number,
            due_date: i.due_date,
            payment: i.payment_amount,
            principal: i.principal_portion,
            interest: i.interest_portion,
            balance: i.remaining_balance,
        }
    }
}

#[derive(Serialize)]
struct ScheduleRow {
    tenant: TenantId,
    loan: LoanId,
    installment: u32,
    due_date: NaiveDate,
    payment: Money,
    principal: Money,
    interest: Money,
    balance: Money,
    status: InstallmentStatus,
}

/// Writes payment schedules as CSV.
pub struct ScheduleWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ScheduleWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes an unsaved simulation, one row per installment.
    pub fn write_simulation(&mut self, result: &AmortizationResult) -> Result<()> {
        for installment in &result.schedule {
            self.writer.serialize(SimulationRow::from(installment))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes stored schedule rows of one tenant.
    ///
    /// Can be called repeatedly; the header is only written once.
    pub fn write_schedule(&mut self, tenant: TenantId, rows: &[ScheduledPayment]) -> Result<()> {
        for row in rows {
            let i = &row.installment;
            self.writer.serialize(ScheduleRow {
                tenant,
                loan: row.loan,
                installment: i.sequence_number,
                due_date: i.due_date,
                payment: i.payment_amount,
                principal: i.principal_portion,
                interest: i.interest_portion,
                balance: i.remaining_balance,
                status: row.status,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
