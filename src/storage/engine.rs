use crate::core::{Criteria, Record, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage collaborator the lifecycle engine wraps.
///
/// Implementations evaluate `Criteria` themselves, including the clock used
/// for time-aware conditions, so "now" is the store's now at execution time.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert a new record
    async fn persist(&self, record: &Record) -> Result<()>;

    /// Overwrite an existing record
    async fn update(&self, record: &Record) -> Result<()>;

    /// First record of `entity_type` matching `criteria`
    async fn find_one_by(&self, entity_type: &str, criteria: &Criteria) -> Result<Option<Record>>;

    /// All records of `entity_type` matching `criteria`
    async fn find_by(&self, entity_type: &str, criteria: &Criteria) -> Result<Vec<Record>>;

    /// Physically delete a record. Returns false if it was not stored.
    async fn remove(&self, record: &Record) -> Result<bool>;

    /// The store's current time
    fn now(&self) -> DateTime<Utc>;
}
