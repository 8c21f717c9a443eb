use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use once_cell::sync::OnceCell;

use super::error::LoadError;
use super::loader::load_file;
use super::model::Dataset;

type LoadFn = dyn Fn(&Path) -> Result<Dataset, LoadError> + Send + Sync;

/// Loaded datasets keyed by canonical file path.
///
/// Each path gets its own once-cell, so concurrent first requests for the same
/// file run the loader exactly once while the others wait on the cell. The map
/// lock is only held long enough to find or insert that cell. A failed load
/// leaves the cell empty and the next caller tries again.
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, Arc<OnceCell<Arc<Dataset>>>>>,
    loader: Box<LoadFn>,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetCache {
    /// A cache that reads files with [`load_file`].
    pub fn new() -> Self {
        Self::with_loader(load_file)
    }

    /// A cache backed by a custom loader.
    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn(&Path) -> Result<Dataset, LoadError> + Send + Sync + 'static,
    {
        Self {
            entries: Mutex::new(HashMap::new()),
            loader: Box::new(loader),
        }
    }

    /// Return the dataset for `path`, loading it on first use.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Dataset>, LoadError> {
        let key = std::fs::canonicalize(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(key.clone()).or_default())
        };

        cell.get_or_try_init(|| {
            debug!("cache miss for {}", key.display());
            (self.loader)(&key).map(Arc::new)
        })
        .map(Arc::clone)
    }

    /// Number of paths with a loaded dataset.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use tempfile::NamedTempFile;

    use super::*;

    fn kpi_file() -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "iso_a3;country;battAlias;var;val").unwrap();
        writeln!(f, "DEU;Germany;Batt_1;temp;1.5").unwrap();
        writeln!(f, "FRA;France;Batt_2;temp;2.5").unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn repeated_loads_share_one_dataset() {
        let f = kpi_file();
        let cache = DatasetCache::new();
        let a = cache.get_or_load(f.path()).unwrap();
        let b = cache.get_or_load(f.path()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_first_loads_run_the_loader_once() {
        let f = kpi_file();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cache = Arc::new(DatasetCache::with_loader(move |path| {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            load_file(path)
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let path = f.path().to_path_buf();
                thread::spawn(move || cache.get_or_load(&path).unwrap())
            })
            .collect();
        let loaded: Vec<Arc<Dataset>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(loaded.iter().all(|d| Arc::ptr_eq(d, &loaded[0])));
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let f = kpi_file();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cache = DatasetCache::with_loader(move |path| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(LoadError::EmptyData(path.to_path_buf()))
            } else {
                load_file(path)
            }
        });

        assert!(cache.get_or_load(f.path()).is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_load(f.path()).unwrap().len(), 2);
    }

    #[test]
    fn missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new();
        assert!(matches!(
            cache.get_or_load(&dir.path().join("nope.csv")),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn separate_caches_are_isolated() {
        let f = kpi_file();
        let a = DatasetCache::new().get_or_load(f.path()).unwrap();
        let b = DatasetCache::new().get_or_load(f.path()).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }
}
