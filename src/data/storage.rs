//! Persistence for uploaded datasets
//!
//! [`FsDatasetStorage`] keeps one `<name>.csv` per dataset in a single
//! directory. [`MemoryDatasetStorage`] keeps frames in a map and is used in
//! tests and by callers that need no durability.

use crate::error::{PlaygroundError, Result};
use parking_lot::RwLock;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Cursor;

const MAX_NAME_LEN: usize = 64;

/// Whether `name` can key a dataset: 1 to 64 of `[A-Za-z0-9_-]`.
///
/// Such a name never contains a path separator or `..`, so it always maps
/// to a single file directly inside the storage directory.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
use std::path::{Path, PathBuf};

/// Storage for uploaded tables, keyed by dataset name
pub trait DatasetStorage: Send + Sync {
    /// Write a dataset, replacing any existing one of the same name
    fn persist(&self, name: &str, df: &mut DataFrame) -> Result<()>;

    /// Load a dataset. Fails with [`PlaygroundError::NotFound`] when absent.
    fn load(&self, name: &str) -> Result<DataFrame>;

    /// Names of stored datasets
    fn list(&self) -> Result<Vec<String>>;

    fn contains(&self, name: &str) -> Result<bool>;
}

/// Parse CSV bytes with a header row.
///
/// Column types are inferred from every row, so a float far down an
/// otherwise integral column still parses.
pub fn parse_csv(bytes: &[u8]) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;
    Ok(df)
}

/// Filesystem storage: `<root>/<name>.csv`
#[derive(Debug, Clone)]
pub struct FsDatasetStorage {
    root: PathBuf,
}

impl FsDatasetStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if !is_valid_name(name) {
            return Err(PlaygroundError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{}.csv", name)))
    }
}

impl DatasetStorage for FsDatasetStorage {
    fn persist(&self, name: &str, df: &mut DataFrame) -> Result<()> {
        let path = self.path_for(name)?;
        std::fs::create_dir_all(&self.root)?;
        let mut file = File::create(&path)?;
        CsvWriter::new(&mut file).finish(df)?;
        tracing::debug!(dataset = name, path = %path.display(), "dataset written");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<DataFrame> {
        let path = self
            .path_for(name)
            .map_err(|_| PlaygroundError::NotFound(name.to_string()))?;
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PlaygroundError::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        parse_csv(&bytes)
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = BTreeSet::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.insert(stem.to_string());
            }
        }
        Ok(names.into_iter().collect())
    }

    fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.path_for(name).map(|p| p.is_file()).unwrap_or(false))
    }
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryDatasetStorage {
    frames: RwLock<BTreeMap<String, DataFrame>>,
}

impl MemoryDatasetStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DatasetStorage for MemoryDatasetStorage {
    fn persist(&self, name: &str, df: &mut DataFrame) -> Result<()> {
        self.frames.write().insert(name.to_string(), df.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<DataFrame> {
        self.frames
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| PlaygroundError::NotFound(name.to_string()))
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.frames.read().keys().cloned().collect())
    }

    fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.frames.read().contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "a" => &[1.0, 2.0, 3.0],
            "target" => &[0i64, 1, 1]
        )
        .unwrap()
    }

    #[test]
    fn test_fs_round_trip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsDatasetStorage::new(dir.path().join("nested"));

        assert!(storage.list().unwrap().is_empty());
        assert!(matches!(storage.load("toy"), Err(PlaygroundError::NotFound(_))));

        storage.persist("toy", &mut sample()).unwrap();
        assert!(storage.contains("toy").unwrap());
        assert_eq!(storage.load("toy").unwrap().shape(), (3, 2));

        let mut smaller = df!("a" => &[9.0], "target" => &[1i64]).unwrap();
        storage.persist("toy", &mut smaller).unwrap();
        assert_eq!(storage.load("toy").unwrap().height(), 1);
    }

    #[test]
    fn test_fs_list_is_sorted_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsDatasetStorage::new(dir.path());
        storage.persist("zeta", &mut sample()).unwrap();
        storage.persist("alpha", &mut sample()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        assert_eq!(storage.list().unwrap(), vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryDatasetStorage::new();
        storage.persist("b", &mut sample()).unwrap();
        storage.persist("a", &mut sample()).unwrap();

        assert_eq!(storage.list().unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert!(storage.contains("a").unwrap());
        assert!(!storage.contains("c").unwrap());
        assert!(matches!(storage.load("c"), Err(PlaygroundError::NotFound(_))));
    }

    #[test]
    fn test_parse_csv() {
        let df = parse_csv(b"x,y,target\n1,2.5,a\n3,4.5,b\n").unwrap();
        assert_eq!(df.shape(), (2, 3));
    }

    #[test]
    fn test_parse_csv_late_float_in_integer_column() {
        let mut csv = String::from("a,target\n");
        for i in 0..150 {
            csv.push_str(&format!("{},{}\n", i, i % 2));
        }
        csv.push_str("2.5,1\n");

        let df = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(df.height(), 151);
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_fs_names_stay_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("secret.csv"), "a,target\n1,0\n2,1\n").unwrap();
        let storage = FsDatasetStorage::new(dir.path().join("datasets"));

        assert!(matches!(storage.load("../secret"), Err(PlaygroundError::NotFound(_))));
        assert!(!storage.contains("../secret").unwrap());
        assert!(matches!(
            storage.persist("../escape", &mut sample()),
            Err(PlaygroundError::InvalidName(_))
        ));
        assert!(!dir.path().join("escape.csv").exists());
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("wine_2-b"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name(".."));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name(&"x".repeat(65)));
    }
}
