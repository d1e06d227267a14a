use super::loan::{LoanId, LoanRecord, ScheduledPayment, TenantId};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for confirmed loans.
///
/// Every call names the tenant explicitly. Implementations must never return
/// a row belonging to a different tenant.
#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn store(&self, record: LoanRecord) -> Result<()>;
    async fn get(&self, tenant: TenantId, loan: LoanId) -> Result<Option<LoanRecord>>;
    /// All loans of `tenant`, ordered by loan id.
    async fn loans(&self, tenant: TenantId) -> Result<Vec<LoanRecord>>;
}

/// Persistence for payment schedules, one row per installment.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn store(
        &self,
        tenant: TenantId,
        loan: LoanId,
        rows: Vec<ScheduledPayment>,
    ) -> Result<()>;
    async fn get(&self, tenant: TenantId, loan: LoanId) -> Result<Option<Vec<ScheduledPayment>>>;
    async fn remove(&self, tenant: TenantId, loan: LoanId) -> Result<()>;
}

pub type LoanStoreBox = Box<dyn LoanStore>;
pub type ScheduleStoreBox = Box<dyn ScheduleStore>;
