use std::collections::BTreeMap;

use crate::models::{Adult, MeritBadgeProgress, Scout};

use super::{merge, RecordStore, StoreError, UpsertCounts};

/// Record store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    scouts: BTreeMap<String, Scout>,
    adults: BTreeMap<String, Adult>,
    progress: BTreeMap<String, MeritBadgeProgress>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.scouts.is_empty() && self.adults.is_empty() && self.progress.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn upsert_scouts(&mut self, scouts: &[Scout]) -> Result<UpsertCounts, StoreError> {
        Ok(merge(&mut self.scouts, scouts))
    }

    fn upsert_adults(&mut self, adults: &[Adult]) -> Result<UpsertCounts, StoreError> {
        Ok(merge(&mut self.adults, adults))
    }

    fn upsert_progress(
        &mut self,
        progress: &[MeritBadgeProgress],
    ) -> Result<UpsertCounts, StoreError> {
        Ok(merge(&mut self.progress, progress))
    }

    fn scouts(&self) -> Result<Vec<Scout>, StoreError> {
        Ok(self.scouts.values().cloned().collect())
    }

    fn adults(&self) -> Result<Vec<Adult>, StoreError> {
        Ok(self.adults.values().cloned().collect())
    }

    fn progress(&self) -> Result<Vec<MeritBadgeProgress>, StoreError> {
        Ok(self.progress.values().cloned().collect())
    }
}
