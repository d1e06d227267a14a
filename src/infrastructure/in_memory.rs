use crate::domain::loan::{LoanId, LoanRecord, ScheduledPayment, TenantId};
use crate::domain::ports::{LoanStore, ScheduleStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for loan records.
///
/// Rows are keyed by `(TenantId, LoanId)`, so the same loan id may exist under
/// several tenants without either seeing the other.
#[derive(Default, Clone)]
pub struct InMemoryLoanStore {
    loans: Arc<RwLock<HashMap<(TenantId, LoanId), LoanRecord>>>,
}

impl InMemoryLoanStore {
    /// Creates a new, empty in-memory loan store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoanStore for InMemoryLoanStore {
    async fn store(&self, record: LoanRecord) -> Result<()> {
        let mut loans = self.loans.write().await;
        loans.insert((record.tenant, record.loan), record);
        Ok(())
    }

    async fn get(&self, tenant: TenantId, loan: LoanId) -> Result<Option<LoanRecord>> {
        let loans = self.loans.read().await;
        Ok(loans.get(&(tenant, loan)).cloned())
    }

    async fn loans(&self, tenant: TenantId) -> Result<Vec<LoanRecord>> {
        let loans = self.loans.read().await;
        let mut records: Vec<LoanRecord> = loans
            .iter()
            .filter(|((owner, _), _)| *owner == tenant)
            .map(|(_, record)| record.clone())
            .collect();
        records.sort_by_key(|record| record.loan);
        Ok(records)
    }
}

/// A thread-safe in-memory store for payment schedules.
#[derive(Default, Clone)]
pub struct InMemoryScheduleStore {
    schedules: Arc<RwLock<HashMap<(TenantId, LoanId), Vec<ScheduledPayment>>>>,
}

impl InMemoryScheduleStore {
    /// Creates a new, empty in-memory schedule store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn store(
        &self,
        tenant: TenantId,
        loan: LoanId,
        rows: Vec<ScheduledPayment>,
    ) -> Result<()> {
        let mut schedules = self.schedules.write().await;
        schedules.insert((tenant, loan), rows);
        Ok(())
    }

    async fn get(&self, tenant: TenantId, loan: LoanId) -> Result<Option<Vec<ScheduledPayment>>> {
        let schedules = self.schedules.read().await;
        Ok(schedules.get(&(tenant, loan)).cloned())
    }

    async fn remove(&self, tenant: TenantId, loan: LoanId) -> Result<()> {
        let mut schedules = self.schedules.write().await;
        schedules.remove(&(tenant, loan));
        Ok(())
    }
}
