use crate::domain::loan::{LoanId, LoanRecord, ScheduledPayment, TenantId};
use crate::domain::ports::{LoanStore, ScheduleStore};
use crate::error::{LoanError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing loan records.
pub const CF_LOANS: &str = "loans";
/// Column Family for storing payment schedules.
pub const CF_SCHEDULES: &str = "schedules";

/// A persistent store implementation using RocksDB.
///
/// Keys are the big-endian tenant id followed by the big-endian loan id, so
/// one tenant's rows are contiguous and sorted by loan id. Values are JSON.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "loans" and "schedules" column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_loans = ColumnFamilyDescriptor::new(CF_LOANS, Options::default());
        let cf_schedules = ColumnFamilyDescriptor::new(CF_SCHEDULES, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_loans, cf_schedules])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            LoanError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }
}

fn key(tenant: TenantId, loan: LoanId) -> [u8; 8] {
    let mut key = [0u8; 8];
    key[..4].copy_from_slice(&tenant.0.to_be_bytes());
    key[4..].copy_from_slice(&loan.0.to_be_bytes());
    key
}

#[async_trait]
impl LoanStore for RocksDBStore {
    async fn store(&self, record: LoanRecord) -> Result<()> {
        let cf = self.cf(CF_LOANS)?;
        let value = serde_json::to_vec(&record)?;
        self.db.put_cf(cf, key(record.tenant, record.loan), value)?;
        Ok(())
    }

    async fn get(&self, tenant: TenantId, loan: LoanId) -> Result<Option<LoanRecord>> {
        let cf = self.cf(CF_LOANS)?;
        match self.db.get_cf(cf, key(tenant, loan))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn loans(&self, tenant: TenantId) -> Result<Vec<LoanRecord>> {
        let cf = self.cf(CF_LOANS)?;
        let prefix = tenant.0.to_be_bytes();

        let mut records = Vec::new();
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward));
        for item in iter {
            let (row_key, value) = item?;
            if !row_key.starts_with(&prefix) {
                break;
            }
            records.push(serde_json::from_slice(&value)?);
        }

        Ok(records)
    }
}

#[async_trait]
impl ScheduleStore for RocksDBStore {
    async fn store(
        &self,
        tenant: TenantId,
        loan: LoanId,
        rows: Vec<ScheduledPayment>,
    ) -> Result<()> {
        let cf = self.cf(CF_SCHEDULES)?;
        let value = serde_json::to_vec(&rows)?;
        self.db.put_cf(cf, key(tenant, loan), value)?;
        Ok(())
    }

    async fn get(&self, tenant: TenantId, loan: LoanId) -> Result<Option<Vec<ScheduledPayment>>> {
        let cf = self.cf(CF_SCHEDULES)?;
        match self.db.get_cf(cf, key(tenant, loan))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, tenant: TenantId, loan: LoanId) -> Result<()> {
        let cf = self.cf(CF_SCHEDULES)?;
        self.db.delete_cf(cf, key(tenant, loan))?;
        Ok(())
    }
}
