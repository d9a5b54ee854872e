use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A charge as the application remembers it after a successful submission.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ChargeRecord {
    pub id: u64,
    pub user_id: u64,
    pub name: String,
    pub status: String,
    /// Payment intent or invoice id on the processor.
    pub processor_charge_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A charge record that has not been assigned an id yet.
#[derive(Debug, PartialEq, Clone)]
pub struct NewCharge {
    pub user_id: u64,
    pub name: String,
    pub status: String,
    pub processor_charge_id: String,
}

impl NewCharge {
    pub fn into_record(self, id: u64, now: DateTime<Utc>) -> ChargeRecord {
        ChargeRecord {
            id,
            user_id: self.user_id,
            name: self.name,
            status: self.status,
            processor_charge_id: self.processor_charge_id,
            created_at: now,
            updated_at: now,
        }
    }
}
