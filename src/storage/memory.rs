use super::{EntityStore, EntityTable};
use crate::core::{Clock, Criteria, PolicyError, Record, Result, SystemClock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

pub struct InMemoryStore {
    /// Tables with individual locks
    tables: RwLock<HashMap<String, Arc<RwLock<EntityTable>>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Get a handle on a table, creating it on first use
    async fn table_or_create(&self, entity_type: &str) -> Arc<RwLock<EntityTable>> {
        if let Some(table) = self.tables.read().await.get(entity_type) {
            return table.clone();
        }

        let mut tables = self.tables.write().await;
        tables
            .entry(entity_type.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(EntityTable::new(entity_type))))
            .clone()
    }

    async fn get_table(&self, entity_type: &str) -> Option<Arc<RwLock<EntityTable>>> {
        self.tables.read().await.get(entity_type).cloned()
    }

    /// Number of stored records, soft-deleted ones included
    pub async fn row_count(&self, entity_type: &str) -> usize {
        match self.get_table(entity_type).await {
            Some(table) => table.read().await.row_count(),
            None => 0,
        }
    }

    /// Fetch a record by id without any filtering
    pub async fn get(&self, entity_type: &str, id: uuid::Uuid) -> Option<Record> {
        let table = self.get_table(entity_type).await?;
        let table = table.read().await;
        table.get(id).cloned()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn persist(&self, record: &Record) -> Result<()> {
        let table = self.table_or_create(record.entity_type()).await;
        let mut table = table.write().await;
        table.insert(record.clone())?;
        debug!(entity_type = %record.entity_type(), entity_id = %record.id(), "record persisted");
        Ok(())
    }

    async fn update(&self, record: &Record) -> Result<()> {
        let table = self.get_table(record.entity_type()).await.ok_or_else(|| {
            PolicyError::EntityNotFound(record.entity_type().to_string(), record.id().to_string())
        })?;
        let mut table = table.write().await;
        table.update(record.clone())?;
        debug!(entity_type = %record.entity_type(), entity_id = %record.id(), "record updated");
        Ok(())
    }

    async fn find_one_by(&self, entity_type: &str, criteria: &Criteria) -> Result<Option<Record>> {
        let Some(table) = self.get_table(entity_type).await else {
            return Ok(None);
        };
        let table = table.read().await;
        let now = self.clock.now();
        Ok(table.scan(criteria, now).next().cloned())
    }

    async fn find_by(&self, entity_type: &str, criteria: &Criteria) -> Result<Vec<Record>> {
        let Some(table) = self.get_table(entity_type).await else {
            return Ok(Vec::new());
        };
        let table = table.read().await;
        let now = self.clock.now();
        Ok(table.scan(criteria, now).cloned().collect())
    }

    async fn remove(&self, record: &Record) -> Result<bool> {
        let Some(table) = self.get_table(record.entity_type()).await else {
            return Ok(false);
        };
        let mut table = table.write().await;
        let removed = table.delete(record.id());
        debug!(entity_type = %record.entity_type(), entity_id = %record.id(), removed, "record removed");
        Ok(removed)
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
