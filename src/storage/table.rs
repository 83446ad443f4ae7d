use crate::core::{Criteria, PolicyError, Record, Result};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Records of one entity type, kept in insertion order.
#[derive(Debug, Clone)]
pub struct EntityTable {
    entity_type: String,
    rows: BTreeMap<usize, Record>,
    ids: HashMap<Uuid, usize>,
    next_row_id: usize,
}

impl EntityTable {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            rows: BTreeMap::new(),
            ids: HashMap::new(),
            next_row_id: 0,
        }
    }

    pub fn insert(&mut self, record: Record) -> Result<usize> {
        if self.ids.contains_key(&record.id()) {
            return Err(PolicyError::DuplicateEntity(
                self.entity_type.clone(),
                record.id().to_string(),
            ));
        }

        let row_id = self.next_row_id;
        self.next_row_id += 1;

        self.ids.insert(record.id(), row_id);
        self.rows.insert(row_id, record);
        Ok(row_id)
    }

    pub fn update(&mut self, record: Record) -> Result<()> {
        let row_id = self.row_id(record.id())?;
        self.rows.insert(row_id, record);
        Ok(())
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        match self.ids.remove(&id) {
            Some(row_id) => self.rows.remove(&row_id).is_some(),
            None => false,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Record> {
        self.ids.get(&id).and_then(|row_id| self.rows.get(row_id))
    }

    pub fn scan<'a>(
        &'a self,
        criteria: &'a Criteria,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        self.rows
            .values()
            .filter(move |record| criteria.matches(record, now))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row_id(&self, id: Uuid) -> Result<usize> {
        self.ids
            .get(&id)
            .copied()
            .ok_or_else(|| PolicyError::EntityNotFound(self.entity_type.clone(), id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut table = EntityTable::new("User");
        let record = Record::new("User");
        table.insert(record.clone()).unwrap();
        assert!(matches!(
            table.insert(record),
            Err(PolicyError::DuplicateEntity(_, _))
        ));
    }

    #[test]
    fn test_update_missing_record() {
        let mut table = EntityTable::new("User");
        assert!(matches!(
            table.update(Record::new("User")),
            Err(PolicyError::EntityNotFound(_, _))
        ));
    }

    #[test]
    fn test_scan_keeps_insertion_order() {
        let mut table = EntityTable::new("User");
        table.insert(Record::new("User").field("n", 1)).unwrap();
        table.insert(Record::new("User").field("n", 2)).unwrap();
        table.insert(Record::new("User").field("n", 3)).unwrap();

        let criteria = Criteria::new();
        let seen: Vec<String> = table
            .scan(&criteria, Utc::now())
            .map(|r| r.get("n").to_string())
            .collect();
        assert_eq!(seen, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_delete() {
        let mut table = EntityTable::new("User");
        let record = Record::new("User");
        table.insert(record.clone()).unwrap();
        assert!(table.delete(record.id()));
        assert!(!table.delete(record.id()));
        assert!(table.get(record.id()).is_none());
        assert_eq!(table.row_count(), 0);
    }
}
