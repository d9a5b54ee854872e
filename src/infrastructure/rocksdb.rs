use crate::domain::ports::ChargeStore;
use crate::domain::record::{ChargeRecord, NewCharge};
use crate::error::{ChargeError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing charge records.
pub const CF_CHARGES: &str = "charges";

/// A persistent charge store using RocksDB.
///
/// Records are keyed by their big-endian id so iteration yields them in insertion order.
/// `Clone` shares the underlying `Arc<DB>` and the id allocation lock.
#[derive(Clone)]
pub struct RocksDBChargeStore {
    db: Arc<DB>,
    insert_lock: Arc<Mutex<()>>,
}

fn internal(message: String) -> ChargeError {
    ChargeError::InternalError(Box::new(std::io::Error::other(message)))
}

impl RocksDBChargeStore {
    /// Opens or creates a RocksDB instance at `path`, ensuring the `charges` column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_charges = ColumnFamilyDescriptor::new(CF_CHARGES, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_charges])?;

        Ok(Self {
            db: Arc::new(db),
            insert_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(CF_CHARGES)
            .ok_or_else(|| internal("Charges column family not found".to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<ChargeRecord> {
        serde_json::from_slice(bytes)
            .map_err(|e| internal(format!("Failed to deserialize charge: {}", e)))
    }

    fn last_id(&self) -> Result<u64> {
        let cf = self.cf()?;
        match self.db.iterator_cf(cf, IteratorMode::End).next() {
            Some(item) => {
                let (key, _) = item?;
                let bytes = <[u8; 8]>::try_from(&key[..])
                    .map_err(|_| internal("Malformed charge key".to_string()))?;
                Ok(u64::from_be_bytes(bytes))
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl ChargeStore for RocksDBChargeStore {
    async fn insert(&self, charge: NewCharge) -> Result<ChargeRecord> {
        let _guard = self.insert_lock.lock().await;
        let id = self.last_id()? + 1;
        let record = charge.into_record(id, Utc::now());

        let value = serde_json::to_vec(&record)?;
        self.db.put_cf(self.cf()?, id.to_be_bytes(), value)?;

        Ok(record)
    }

    async fn get(&self, id: u64) -> Result<Option<ChargeRecord>> {
        match self.db.get_cf(self.cf()?, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<ChargeRecord>> {
        let mut charges = Vec::new();
        for item in self.db.iterator_cf(self.cf()?, IteratorMode::Start) {
            let (_key, value) = item?;
            charges.push(Self::decode(&value)?);
        }
        Ok(charges)
    }

    async fn get_all_for_user(&self, user_id: u64) -> Result<Vec<ChargeRecord>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|charge| charge.user_id == user_id)
            .collect())
    }
}
