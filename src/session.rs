use crate::core::{Criteria, Record, Result};
use crate::engine::EngineInner;
use crate::soft_delete::{DeleteOutcome, VisibilityFilter};
use std::sync::Arc;

/// Request-scoped unit of work.
///
/// Reads go through the session's visibility filter, deletes through the
/// lifecycle governor. Filter toggles only affect this session.
pub struct Session {
    engine: Arc<EngineInner>,
    filter: VisibilityFilter,
}

impl Session {
    pub(crate) fn new(engine: Arc<EngineInner>) -> Self {
        let filter = VisibilityFilter::new(engine.config.filter_enabled_by_default);
        Self { engine, filter }
    }

    pub fn filter(&self) -> &VisibilityFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut VisibilityFilter {
        &mut self.filter
    }

    pub async fn persist(&self, record: &Record) -> Result<()> {
        self.engine.store.persist(record).await
    }

    /// Plain write. Assigning a deletion timestamp here is not intercepted.
    pub async fn update(&self, record: &Record) -> Result<()> {
        self.engine.store.update(record).await
    }

    pub async fn find_one_by(&self, entity_type: &str, criteria: Criteria) -> Result<Option<Record>> {
        let criteria = self.visible(entity_type, criteria)?;
        self.engine.store.find_one_by(entity_type, &criteria).await
    }

    pub async fn find_by(&self, entity_type: &str, criteria: Criteria) -> Result<Vec<Record>> {
        let criteria = self.visible(entity_type, criteria)?;
        self.engine.store.find_by(entity_type, &criteria).await
    }

    /// Deletes `record`, softly when its type carries a soft-delete policy.
    pub async fn remove(&self, record: &mut Record) -> Result<DeleteOutcome> {
        let policy = self.engine.soft_delete_policy(record.entity_type())?;
        self.engine
            .governor
            .remove(self.engine.store.as_ref(), record, policy.as_ref())
            .await
    }

    fn visible(&self, entity_type: &str, criteria: Criteria) -> Result<Criteria> {
        let policy = self.engine.soft_delete_policy(entity_type)?;
        Ok(self.filter.apply(entity_type, policy.as_deref(), criteria))
    }
}
