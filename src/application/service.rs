use crate::domain::amortization::compute_amortization_with;
use crate::domain::loan::{
    AmortizationResult, InstallmentStatus, LoanApplication, LoanId, LoanRecord, LoanTerms,
    ScheduledPayment, TenantId,
};
use crate::domain::money::RoundingPolicy;
use crate::domain::ports::{LoanStoreBox, ScheduleStoreBox};
use crate::error::{LoanError, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Entry point for everything that touches a loan schedule.
///
/// The simulator and the confirm-and-store flow both go through the same
/// amortization engine, so a stored schedule is always exactly what the
/// borrower was shown. Tenant scoping is explicit on every call.
///
/// Writes are serialized: the duplicate check in [`LoanService::originate`]
/// and the pending-row lookup in [`LoanService::record_payment`] each happen
/// under the same lock as the store calls that act on them. Reads do not
/// take the lock.
pub struct LoanService {
    loan_store: LoanStoreBox,
    schedule_store: ScheduleStoreBox,
    policy: RoundingPolicy,
    writes: Mutex<()>,
}

impl LoanService {
    /// Creates a new `LoanService` rounding to cents.
    ///
    /// # Arguments
    ///
    /// * `loan_store` - The store for loan records.
    /// * `schedule_store` - The store for installment rows.
    pub fn new(loan_store: LoanStoreBox, schedule_store: ScheduleStoreBox) -> Self {
        Self::with_policy(loan_store, schedule_store, RoundingPolicy::default())
    }

    pub fn with_policy(
        loan_store: LoanStoreBox,
        schedule_store: ScheduleStoreBox,
        policy: RoundingPolicy,
    ) -> Self {
        Self {
            loan_store,
            schedule_store,
            policy,
            writes: Mutex::new(()),
        }
    }

    /// Computes a schedule without storing anything.
    pub fn simulate(&self, application: &LoanApplication) -> Result<AmortizationResult> {
        let terms = LoanTerms::try_from(application)?;
        compute_amortization_with(&terms, self.policy)
    }

    /// Confirms an application: stores the loan and one pending row per
    /// installment.
    ///
    /// Nothing is written unless the whole application is valid and the loan
    /// id is unused within the tenant.
    pub async fn originate(&self, application: LoanApplication) -> Result<LoanRecord> {
        let tenant = application.tenant()?;
        let loan = application.loan()?;
        let borrower = application.borrower()?.to_string();
        let terms = LoanTerms::try_from(&application)?;
        let result = compute_amortization_with(&terms, self.policy)?;

        let _guard = self.writes.lock().await;
        if self.loan_store.get(tenant, loan).await?.is_some() {
            return Err(LoanError::DuplicateLoan { tenant, loan });
        }

        let rows = result
            .schedule
            .into_iter()
            .map(|installment| ScheduledPayment {
                loan,
                installment,
                status: InstallmentStatus::Pending,
            })
            .collect();
        self.schedule_store.store(tenant, loan, rows).await?;

        let record = LoanRecord {
            tenant,
            loan,
            borrower,
            terms,
            monthly_payment: result.monthly_payment,
            total_payments: result.total_payments,
            total_interest: result.total_interest,
        };
        if let Err(e) = self.loan_store.store(record.clone()).await {
            // No record means no loan; drop the rows written above.
            if let Err(cleanup) = self.schedule_store.remove(tenant, loan).await {
                warn!(tenant = %tenant, loan = %loan, "orphan schedule left behind: {}", cleanup);
            }
            return Err(e);
        }

        info!(
            tenant = %tenant,
            loan = %loan,
            monthly_payment = %record.monthly_payment,
            installments = record.terms.term_in_months(),
            "loan originated"
        );
        Ok(record)
    }

    pub async fn loan(&self, tenant: TenantId, loan: LoanId) -> Result<LoanRecord> {
        self.loan_store
            .get(tenant, loan)
            .await?
            .ok_or(LoanError::LoanNotFound { tenant, loan })
    }

    /// All loans of `tenant`, ordered by loan id.
    pub async fn loans(&self, tenant: TenantId) -> Result<Vec<LoanRecord>> {
        self.loan_store.loans(tenant).await
    }

    pub async fn schedule(&self, tenant: TenantId, loan: LoanId) -> Result<Vec<ScheduledPayment>> {
        self.schedule_store
            .get(tenant, loan)
            .await?
            .ok_or(LoanError::LoanNotFound { tenant, loan })
    }

    /// Marks the earliest pending installment as paid and returns it.
    pub async fn record_payment(&self, tenant: TenantId, loan: LoanId) -> Result<ScheduledPayment> {
        let _guard = self.writes.lock().await;
        let mut rows = self.schedule(tenant, loan).await?;
        let row = rows
            .iter_mut()
            .find(|row| row.status == InstallmentStatus::Pending)
            .ok_or(LoanError::ScheduleSettled { tenant, loan })?;
        row.status = InstallmentStatus::Paid;
        let paid = row.clone();

        self.schedule_store.store(tenant, loan, rows).await?;
        debug!(
            tenant = %tenant,
            loan = %loan,
            installment = paid.installment.sequence_number,
            "installment paid"
        );
        Ok(paid)
    }
}
