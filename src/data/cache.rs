use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::LoadError;
use super::loader::{load_file, LoadOptions};
use super::model::Dataset;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    path: PathBuf,
    modified: Option<SystemTime>,
    options: LoadOptions,
}

impl CacheKey {
    fn for_file(path: &Path, options: &LoadOptions) -> Result<Self, LoadError> {
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let canonical = path.canonicalize().map_err(io_err)?;
        let modified = std::fs::metadata(&canonical).map_err(io_err)?.modified().ok();
        Ok(CacheKey {
            path: canonical,
            modified,
            options: *options,
        })
    }
}

/// Single-entry memo of the last loaded dataset, keyed by path, mtime and options.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(CacheKey, Arc<Dataset>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset if the file is unchanged, otherwise reload it.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        options: &LoadOptions,
    ) -> Result<Arc<Dataset>, LoadError> {
        let key = CacheKey::for_file(path, options)?;

        if let Some((cached_key, dataset)) = &self.entry {
            // Without an mtime we can't tell whether the file changed.
            if *cached_key == key && key.modified.is_some() {
                log::debug!("Dataset cache hit for {}", path.display());
                return Ok(Arc::clone(dataset));
            }
        }

        log::debug!("Dataset cache miss for {}", path.display());
        let dataset = Arc::new(load_file(path, options)?);
        self.entry = Some((key, Arc::clone(&dataset)));
        Ok(dataset)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;
    use crate::data::loader::RowPolicy;

    const CSV: &str = "Order ID,Order Date,Ship Date,Region,Category,Sub-Category,Product Name,Sales\n\
                       A-1,01/02/2015,01/04/2015,East,Furniture,Tables,Desk,10\n";

    fn write(path: &Path, body: &str) {
        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn reuses_unchanged_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        write(&path, CSV);

        let mut cache = DatasetCache::new();
        let a = cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        let b = cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn options_are_part_of_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        write(&path, CSV);

        let mut cache = DatasetCache::new();
        let a = cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        let strict = LoadOptions {
            row_policy: RowPolicy::Strict,
            ..LoadOptions::default()
        };
        let b = cache.get_or_load(&path, &strict).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }

    #[test]
    fn reloads_after_modification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        write(&path, CSV);

        let mut cache = DatasetCache::new();
        let a = cache.get_or_load(&path, &LoadOptions::default()).unwrap();

        let later = SystemTime::now() + Duration::from_secs(60);
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"A-2,01/03/2015,01/05/2015,West,Furniture,Tables,Desk,5\n")
            .unwrap();
        f.set_modified(later).unwrap();
        drop(f);

        let b = cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        write(&path, CSV);

        let mut cache = DatasetCache::new();
        let a = cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        cache.invalidate();
        assert!(cache.is_empty());
        let b = cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DatasetCache::new();
        let err = cache
            .get_or_load(&dir.path().join("nope.csv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
