use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{Adult, MeritBadgeProgress, Scout};

use super::{merge, Keyed, RecordStore, StoreError, Table, UpsertCounts};

/// A table file on disk: rows plus when they were last written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTable<T> {
    pub rows: Vec<T>,
    pub updated_at: DateTime<Utc>,
}

impl<T> StoredTable<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows,
            updated_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.updated_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// How long ago each table was written, if ever.
#[derive(Debug, Default)]
pub struct TableAges {
    pub scouts: Option<String>,
    pub adults: Option<String>,
    pub progress: Option<String>,
}

impl TableAges {
    pub fn roster_age(&self) -> String {
        self.scouts.clone().unwrap_or_else(|| "never".to_string())
    }

    pub fn progress_age(&self) -> String {
        self.progress.clone().unwrap_or_else(|| "never".to_string())
    }
}

/// Record store backed by JSON table files in one directory.
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn open(dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            table: "database",
            path: dir.clone(),
            source,
        })?;
        info!(path = %dir.display(), "Opened record store");
        Ok(Self { dir })
    }

    /// Open a database that must already exist. Nothing is created on disk.
    pub fn open_existing(dir: PathBuf) -> Result<Self, StoreError> {
        if !dir.is_dir() {
            return Err(StoreError::NoDatabase { path: dir });
        }
        debug!(path = %dir.display(), "Opened existing record store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn table_path(&self, table: Table) -> PathBuf {
        self.dir.join(format!("{}.json", table.name()))
    }

    fn load<T: DeserializeOwned>(&self, table: Table) -> Result<Option<StoredTable<T>>, StoreError> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(None);
        }

        let io_error = |source| StoreError::Io {
            table: table.name(),
            path: path.clone(),
            source,
        };
        let contents = std::fs::read_to_string(&path).map_err(io_error)?;
        let stored = serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            table: table.name(),
            path: path.clone(),
            source,
        })?;
        Ok(Some(stored))
    }

    /// Write to a sibling temp file, then rename over the table, so a failed
    /// write never leaves a half-written table behind.
    fn save<T: Serialize>(&self, table: Table, rows: Vec<T>) -> Result<(), StoreError> {
        let path = self.table_path(table);
        let tmp = path.with_extension("json.tmp");
        let io_error = |source| StoreError::Io {
            table: table.name(),
            path: path.clone(),
            source,
        };

        let contents = serde_json::to_string_pretty(&StoredTable::new(rows)).map_err(|source| {
            StoreError::Corrupt {
                table: table.name(),
                path: path.clone(),
                source,
            }
        })?;
        std::fs::write(&tmp, contents).map_err(io_error)?;
        std::fs::rename(&tmp, &path).map_err(io_error)?;
        Ok(())
    }

    fn rows<T: DeserializeOwned>(&self, table: Table) -> Result<Vec<T>, StoreError> {
        Ok(self.load(table)?.map(|t| t.rows).unwrap_or_default())
    }

    fn upsert<T>(&self, table: Table, incoming: &[T]) -> Result<UpsertCounts, StoreError>
    where
        T: Keyed + Clone + Serialize + DeserializeOwned,
    {
        if incoming.is_empty() {
            return Ok(UpsertCounts::default());
        }

        let mut keyed: BTreeMap<String, T> = self
            .rows::<T>(table)?
            .into_iter()
            .map(|row| (row.store_key(), row))
            .collect();
        let counts = merge(&mut keyed, incoming);
        self.save(table, keyed.into_values().collect())?;

        debug!(
            table = table.name(),
            inserted = counts.inserted,
            updated = counts.updated,
            "Upserted rows"
        );
        Ok(counts)
    }

    /// Helper to load a table's age and log errors without failing
    fn load_age<T: DeserializeOwned>(&self, table: Table) -> Option<String> {
        match self.load::<T>(table) {
            Ok(Some(stored)) => Some(stored.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(table = table.name(), error = %e, "Failed to load table for age display");
                None
            }
        }
    }

    pub fn table_ages(&self) -> TableAges {
        TableAges {
            scouts: self.load_age::<Scout>(Table::Scouts),
            adults: self.load_age::<Adult>(Table::Adults),
            progress: self.load_age::<MeritBadgeProgress>(Table::Progress),
        }
    }
}

impl RecordStore for JsonStore {
    fn upsert_scouts(&mut self, scouts: &[Scout]) -> Result<UpsertCounts, StoreError> {
        self.upsert(Table::Scouts, scouts)
    }

    fn upsert_adults(&mut self, adults: &[Adult]) -> Result<UpsertCounts, StoreError> {
        self.upsert(Table::Adults, adults)
    }

    fn upsert_progress(
        &mut self,
        progress: &[MeritBadgeProgress],
    ) -> Result<UpsertCounts, StoreError> {
        self.upsert(Table::Progress, progress)
    }

    fn scouts(&self) -> Result<Vec<Scout>, StoreError> {
        self.rows(Table::Scouts)
    }

    fn adults(&self) -> Result<Vec<Adult>, StoreError> {
        self.rows(Table::Adults)
    }

    fn progress(&self) -> Result<Vec<MeritBadgeProgress>, StoreError> {
        self.rows(Table::Progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityStatus;
    use chrono::Duration;
    use tempfile::TempDir;

    fn scout(bsa: &str, first: &str) -> Scout {
        Scout {
            bsa_number: bsa.to_string(),
            first_name: first.to_string(),
            last_name: "Smith".to_string(),
            rank: Some("Scout".to_string()),
            activity_status: Some(ActivityStatus::Active),
            patrol_name: None,
            unit_number: None,
            date_joined: None,
            date_of_birth: None,
            email: None,
            phone: None,
            positions: Vec::new(),
        }
    }

    #[test]
    fn test_stored_table_age_display_just_now() {
        let stored = StoredTable::new(vec![1, 2, 3]);
        assert_eq!(stored.age_display(), "just now");
    }

    #[test]
    fn test_stored_table_age_display_rounding() {
        let mut stored = StoredTable::new(vec![1]);
        stored.updated_at = Utc::now() - Duration::minutes(95);
        assert_eq!(stored.age_display(), "2h ago");

        stored.updated_at = Utc::now() - Duration::hours(30);
        assert_eq!(stored.age_display(), "1d ago");
    }

    #[test]
    fn test_upsert_then_read_back() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path().join("db")).unwrap();

        let counts = store
            .upsert_scouts(&[scout("12345678", "Alex"), scout("12345679", "Bea")])
            .unwrap();
        assert_eq!(counts, UpsertCounts { inserted: 2, updated: 0 });

        let counts = store.upsert_scouts(&[scout("12345678", "Alexander")]).unwrap();
        assert_eq!(counts, UpsertCounts { inserted: 0, updated: 1 });

        let scouts = store.scouts().unwrap();
        assert_eq!(scouts.len(), 2);
        assert_eq!(scouts[0].first_name, "Alexander");
        assert!(!dir.path().join("db/scouts.json.tmp").exists());
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = JsonStore::open(dir.path().to_path_buf()).unwrap();
            store.upsert_scouts(&[scout("12345678", "Alex")]).unwrap();
        }
        let store = JsonStore::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.scouts().unwrap().len(), 1);
        assert!(store.adults().unwrap().is_empty());
    }

    #[test]
    fn test_table_ages() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.table_ages().roster_age(), "never");

        store.upsert_scouts(&[scout("12345678", "Alex")]).unwrap();
        let ages = store.table_ages();
        assert_eq!(ages.roster_age(), "just now");
        assert_eq!(ages.progress_age(), "never");
    }

    #[test]
    fn test_open_existing_does_not_create() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("db");
        let err = JsonStore::open_existing(missing.clone()).err().unwrap();
        assert!(matches!(err, StoreError::NoDatabase { .. }));
        assert!(!missing.exists());

        JsonStore::open(missing.clone()).unwrap();
        let store = JsonStore::open_existing(missing).unwrap();
        assert!(store.scouts().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_table_is_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("scouts.json"), "{not json").unwrap();
        let store = JsonStore::open(dir.path().to_path_buf()).unwrap();
        assert!(matches!(store.scouts(), Err(StoreError::Corrupt { .. })));
    }
}
