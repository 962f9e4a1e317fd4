//! Saving and loading game state.
//!
//! The home filesystem and the player's cache each live in their own JSON
//! file as a pretty-printed record array. Loading never aborts a session:
//! a missing or corrupt file is replaced with fresh state.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use mollusk_fs::{from_records, to_records, Cache, FileSystem, Record, RecordError, Tree};

/// Persistence errors.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("bad state in {path}: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: RecordError,
    },
}

impl PersistError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    fn record(path: &Path, source: RecordError) -> Self {
        Self::Record {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn write_records(path: &Path, records: &[Record]) -> Result<(), PersistError> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;
            parent
        }
        None => Path::new("."),
    };
    // Written beside the target and renamed over it, so the previous save
    // survives a failed write.
    let mut file = NamedTempFile::new_in(dir).map_err(|e| PersistError::io(dir, e))?;
    let mut writer = BufWriter::new(file.as_file_mut());
    serde_json::to_writer_pretty(&mut writer, records).map_err(|e| PersistError::json(path, e))?;
    writer.flush().map_err(|e| PersistError::io(path, e))?;
    drop(writer);
    file.persist(path).map_err(|e| PersistError::io(path, e.error))?;
    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<Record>, PersistError> {
    let file = File::open(path).map_err(|e| PersistError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| PersistError::json(path, e))
}

/// Write a filesystem's tree to `path`.
pub fn save_fs(fs: &FileSystem, path: &Path) -> Result<(), PersistError> {
    write_records(path, &to_records(fs.tree()))?;
    tracing::info!(path = %path.display(), nodes = fs.tree().len(), "saved filesystem");
    Ok(())
}

/// Read a tree back from `path`.
pub fn load_fs(path: &Path) -> Result<FileSystem, PersistError> {
    let records = read_records(path)?;
    let tree = from_records(&records).map_err(|e| PersistError::record(path, e))?;
    tracing::info!(path = %path.display(), nodes = tree.len(), "loaded filesystem");
    Ok(FileSystem::from_tree(tree))
}

/// Read a tree from `path`, or start fresh if that fails.
pub fn load_fs_or_default(path: &Path, root_name: &str, capacity: Option<usize>) -> FileSystem {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no saved filesystem, starting fresh");
        return FileSystem::from_tree(Tree::new(root_name, capacity));
    }
    match load_fs(path) {
        Ok(fs) => fs,
        Err(e) => {
            tracing::warn!("{e}; starting with a fresh filesystem");
            FileSystem::from_tree(Tree::new(root_name, capacity))
        }
    }
}

/// Write the cache to `path`.
pub fn save_cache(cache: &Cache, path: &Path) -> Result<(), PersistError> {
    write_records(path, &cache.to_records())?;
    tracing::info!(path = %path.display(), files = cache.len(), "saved cache");
    Ok(())
}

/// Read a cache of `slots` slots back from `path`.
pub fn load_cache(path: &Path, slots: usize) -> Result<Cache, PersistError> {
    let records = read_records(path)?;
    Cache::from_records(&records, slots).map_err(|e| PersistError::record(path, e))
}

/// Read the cache from `path`, or start empty if that fails.
pub fn load_cache_or_default(path: &Path, slots: usize) -> Cache {
    if !path.exists() {
        return Cache::new(slots);
    }
    match load_cache(path, slots) {
        Ok(cache) => cache,
        Err(e) => {
            tracing::warn!("{e}; starting with an empty cache");
            Cache::new(slots)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saves").join("filesys.json");

        let mut fs = FileSystem::new("~", Some(100));
        fs.mkdir("docs").unwrap();
        fs.write("docs/notes.txt", "remember").unwrap();
        save_fs(&fs, &path).unwrap();

        let loaded = load_fs(&path).unwrap();
        assert_eq!(to_records(loaded.tree()), to_records(fs.tree()));
        assert_eq!(loaded.usage().capacity, Some(100));
    }

    #[test]
    fn test_save_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filesys.json");

        let mut fs = FileSystem::default();
        fs.write("v", "1").unwrap();
        save_fs(&fs, &path).unwrap();
        fs.write("v", "2").unwrap();
        save_fs(&fs, &path).unwrap();

        assert_eq!(load_fs(&path).unwrap().read("v").unwrap(), "2");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_save_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filesys.json");
        save_fs(&FileSystem::default(), &path).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        // A directory cannot be renamed over by a file.
        let blocked = dir.path().join("blocked");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("inside"), "x").unwrap();
        assert!(matches!(
            save_fs(&FileSystem::default(), &blocked),
            Err(PersistError::Io { .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);

        let mut names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        names.sort();
        assert_eq!(names, ["blocked", "filesys.json"]);
    }

    #[test]
    fn test_file_is_pretty_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filesys.json");
        save_fs(&FileSystem::default(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["name"], "~");
        assert_eq!(value[0]["parent"], -1);
    }

    #[test]
    fn test_corrupt_state_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filesys.json");
        std::fs::write(&path, "[{\"name\": \"~\"").unwrap();

        assert!(matches!(load_fs(&path), Err(PersistError::Json { .. })));
        let fs = load_fs_or_default(&path, "~", Some(8));
        assert!(fs.tree().is_empty());
        assert_eq!(fs.usage().capacity, Some(8));

        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(load_fs(&path), Err(PersistError::Record { .. })));
    }

    #[test]
    fn test_missing_state_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let fs = load_fs_or_default(&dir.path().join("absent.json"), "home", None);
        assert_eq!(fs.name(), "home");
        assert!(matches!(
            load_fs(&dir.path().join("absent.json")),
            Err(PersistError::Io { .. })
        ));
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut fs = FileSystem::default();
        fs.write("key", "1234").unwrap();
        let mut cache = Cache::new(4);
        cache.download(&mut fs, "key").unwrap();
        save_cache(&cache, &path).unwrap();

        assert_eq!(load_cache(&path, 4).unwrap(), cache);
        assert!(load_cache_or_default(&dir.path().join("none.json"), 4).is_empty());
    }
}
