//! Lazily loaded, cached current/previous season tables.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{ColumnNames, DashboardConfig};
use crate::data::loader::{self, LoadError};
use crate::data::model::Table;

/// Which dataset a table comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Current-season projections.
    Current,
    /// Previous-season statistics.
    Previous,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Source::Current => "Current Season",
            Source::Previous => "Previous Season",
        }
    }
}

// ---------------------------------------------------------------------------
// Loader collaborator
// ---------------------------------------------------------------------------

/// Supplies a complete table for a source.
pub trait TableLoader: Send + Sync {
    fn load(&self, source: Source) -> Result<Table, LoadError>;
}

/// Reads each source from its file under the configured data directory.
#[derive(Debug, Clone)]
pub struct FileTableLoader {
    pub current: PathBuf,
    pub previous: PathBuf,
    pub columns: ColumnNames,
}

impl FileTableLoader {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            current: config.current_path(),
            previous: config.previous_path(),
            columns: config.columns.clone(),
        }
    }
}

impl TableLoader for FileTableLoader {
    fn load(&self, source: Source) -> Result<Table, LoadError> {
        let path = match source {
            Source::Current => &self.current,
            Source::Previous => &self.previous,
        };
        loader::load_file(path, &self.columns)
    }
}

// ---------------------------------------------------------------------------
// DatasetStore
// ---------------------------------------------------------------------------

/// Owns the two cached tables.
///
/// Each source has its own slot lock, held for the whole load, so concurrent
/// requests for a cold source wait for the single in-flight load and share
/// its result. A slot only ever holds a complete `Arc<Table>`.
pub struct DatasetStore {
    loader: Box<dyn TableLoader>,
    current: Mutex<Option<Arc<Table>>>,
    previous: Mutex<Option<Arc<Table>>>,
}

impl DatasetStore {
    pub fn new(loader: impl TableLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            current: Mutex::new(None),
            previous: Mutex::new(None),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(FileTableLoader::from_config(config))
    }

    /// The cached table for `source`, loading it on first access.
    ///
    /// Never fails: a missing or unreadable file yields an empty table.
    pub fn load(&self, source: Source) -> Arc<Table> {
        let mut slot = lock(self.slot(source));
        if let Some(table) = slot.as_ref() {
            return Arc::clone(table);
        }
        let table = Arc::new(self.fetch(source));
        *slot = Some(Arc::clone(&table));
        table
    }

    /// `(current, previous)`.
    pub fn load_both(&self) -> (Arc<Table>, Arc<Table>) {
        (self.load(Source::Current), self.load(Source::Previous))
    }

    /// Drop both cached tables; the next `load` re-reads from the loader.
    pub fn invalidate(&self) {
        let mut current = lock(&self.current);
        let mut previous = lock(&self.previous);
        *current = None;
        *previous = None;
        log::info!("Dataset cache invalidated");
    }

    pub fn is_loaded(&self, source: Source) -> bool {
        lock(self.slot(source)).is_some()
    }

    fn slot(&self, source: Source) -> &Mutex<Option<Arc<Table>>> {
        match source {
            Source::Current => &self.current,
            Source::Previous => &self.previous,
        }
    }

    fn fetch(&self, source: Source) -> Table {
        log::info!("Loading {} data", source.label());
        match self.loader.load(source) {
            Ok(table) => {
                log::info!(
                    "Loaded {} {} records with {} columns",
                    table.len(),
                    source.label(),
                    table.column_names.len()
                );
                table
            }
            Err(LoadError::NotFound { path }) => {
                log::warn!("{} file not found: {}", source.label(), path.display());
                Table::default()
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", source.label());
                Table::default()
            }
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PlayerRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts calls per source and hands out a one-row table.
    #[derive(Clone, Default)]
    struct CountingLoader {
        current_calls: Arc<AtomicUsize>,
        previous_calls: Arc<AtomicUsize>,
        delay: Option<Duration>,
    }

    impl TableLoader for CountingLoader {
        fn load(&self, source: Source) -> Result<Table, LoadError> {
            let counter = match source {
                Source::Current => &self.current_calls,
                Source::Previous => &self.previous_calls,
            };
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(d) = self.delay {
                std::thread::sleep(d);
            }
            Ok(Table::from_records(vec![PlayerRecord::new().with("Nome", "A")]))
        }
    }

    #[test]
    fn load_is_memoized_per_source() {
        let loader = CountingLoader::default();
        let store = DatasetStore::new(loader.clone());

        let a = store.load(Source::Current);
        let b = store.load(Source::Current);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loader.current_calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.previous_calls.load(Ordering::SeqCst), 0);
        assert!(!store.is_loaded(Source::Previous));
    }

    #[test]
    fn invalidate_forces_reload() {
        let loader = CountingLoader::default();
        let store = DatasetStore::new(loader.clone());

        let (before, _) = store.load_both();
        store.invalidate();
        assert!(!store.is_loaded(Source::Current));
        assert!(!store.is_loaded(Source::Previous));

        let after = store.load(Source::Current);
        assert_eq!(loader.current_calls.load(Ordering::SeqCst), 2);
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(*before, *after);
        // The old handle stays valid for whoever still holds it.
        assert_eq!(before.len(), 1);
    }

    #[test]
    fn concurrent_cold_loads_share_one_fetch() {
        let loader = CountingLoader {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let store = DatasetStore::new(loader.clone());

        let tables: Vec<Arc<Table>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| store.load(Source::Previous)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(loader.previous_calls.load(Ordering::SeqCst), 1);
        assert!(tables.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn missing_files_give_empty_tables() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let store = DatasetStore::from_config(&config);
        let (current, previous) = store.load_both();
        assert!(current.is_empty());
        assert!(previous.is_empty());
        assert!(store.is_loaded(Source::Current));
    }

    #[test]
    fn file_appearing_after_refresh_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig {
            data_dir: dir.path().to_path_buf(),
            previous_file: "previous.csv".to_string(),
            ..Default::default()
        };
        let store = DatasetStore::from_config(&config);
        assert!(store.load(Source::Previous).is_empty());

        std::fs::write(config.previous_path(), "Nome,Convenienza\nA,1\nB,2\n").unwrap();
        assert!(store.load(Source::Previous).is_empty());

        store.invalidate();
        assert_eq!(store.load(Source::Previous).len(), 2);
    }
}
