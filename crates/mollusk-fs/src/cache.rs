//! The player's file cache.
//!
//! A small, bounded bag of files the player carries between hosts.
//! Downloading moves a file out of a filesystem into the cache; uploading
//! moves it back. Either way the file exists in exactly one place.

use crate::error::{FsError, FsResult, RecordError};
use crate::filesystem::FileSystem;
use crate::record::Record;

/// Slots a fresh cache has.
pub const DEFAULT_CACHE_SLOTS: usize = 16;

/// Root name of the persisted cache record list.
pub const CACHE_ROOT_NAME: &str = "cache";

/// A file held in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFile {
    pub name: String,
    pub content: String,
}

/// Bounded list of carried files, in download order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cache {
    slots: usize,
    files: Vec<CachedFile>,
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SLOTS)
    }
}

impl Cache {
    /// An empty cache with room for `slots` files.
    pub fn new(slots: usize) -> Self {
        Self {
            slots,
            files: Vec::new(),
        }
    }

    /// How many files fit.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns true if every slot is taken.
    pub fn is_full(&self) -> bool {
        self.files.len() >= self.slots
    }

    /// Cached files in download order.
    pub fn files(&self) -> &[CachedFile] {
        &self.files
    }

    /// Look up a cached file by name.
    pub fn get(&self, name: &str) -> Option<&CachedFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Move the file at `path` out of `fs` and into the cache.
    ///
    /// Nothing is detached unless the file fits: a directory, a full cache
    /// or a name already cached all fail first.
    pub fn download(&mut self, fs: &mut FileSystem, path: &str) -> FsResult<&CachedFile> {
        let node = fs.get(path)?;
        if node.is_dir() {
            return Err(FsError::is_a_directory(fs.path_of(path)?));
        }
        if self.is_full() {
            return Err(FsError::CacheFull { slots: self.slots });
        }
        if self.get(node.name()).is_some() {
            return Err(FsError::already_exists(node.name()));
        }

        let (name, content) = fs.take_file(path)?;
        self.files.push(CachedFile { name, content });
        Ok(&self.files[self.files.len() - 1])
    }

    /// Move the cached file `name` into the directory at `dir_path`.
    pub fn upload(&mut self, fs: &mut FileSystem, name: &str, dir_path: &str) -> FsResult<()> {
        let index = self
            .files
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| FsError::not_found(name, CACHE_ROOT_NAME))?;
        fs.insert_file(dir_path, name, self.files[index].content.clone())?;
        self.files.remove(index);
        Ok(())
    }

    /// Flatten into records: a `cache` directory holding every file.
    pub fn to_records(&self) -> Vec<Record> {
        std::iter::once(Record::dir(CACHE_ROOT_NAME, -1, -1))
            .chain(
                self.files
                    .iter()
                    .map(|f| Record::file(f.name.clone(), 0, f.content.clone())),
            )
            .collect()
    }

    /// Rebuild a cache of `slots` slots from records.
    ///
    /// The list is flat: every record after the root must be a file whose
    /// parent is the root.
    pub fn from_records(records: &[Record], slots: usize) -> Result<Self, RecordError> {
        let (first, rest) = records.split_first().ok_or(RecordError::Empty)?;
        if first.parent >= 0 {
            return Err(RecordError::RootHasParent(first.parent));
        }
        if first.kind().is_file() {
            return Err(RecordError::RootIsFile(first.name.clone()));
        }

        let mut cache = Self::new(slots);
        for (offset, record) in rest.iter().enumerate() {
            let index = offset + 1;
            // Every earlier record past the root is a file.
            if (1..index as i64).contains(&record.parent) {
                return Err(RecordError::ParentIsFile {
                    index,
                    parent: record.parent,
                });
            }
            if record.parent != 0 {
                return Err(RecordError::ParentOutOfRange {
                    index,
                    parent: record.parent,
                });
            }
            if record.name.is_empty() || record.name.contains('/') {
                return Err(RecordError::InvalidName {
                    index,
                    name: record.name.clone(),
                });
            }
            if cache.get(&record.name).is_some() {
                return Err(RecordError::DuplicateName {
                    index,
                    name: record.name.clone(),
                });
            }
            let source = match (&record.data, record.kind().is_file()) {
                (_, false) => FsError::is_a_directory(record.name.clone()),
                _ if cache.is_full() => FsError::CacheFull { slots },
                (data, true) => {
                    cache.files.push(CachedFile {
                        name: record.name.clone(),
                        content: data.clone().unwrap_or_default(),
                    });
                    continue;
                }
            };
            return Err(RecordError::Rejected { index, source });
        }
        Ok(cache)
    }

    /// Serialize as a pretty-printed JSON record array.
    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(&self.to_records())?)
    }

    /// Rebuild from a JSON record array.
    pub fn from_json(text: &str, slots: usize) -> Result<Self, RecordError> {
        let records: Vec<Record> = serde_json::from_str(text)?;
        Self::from_records(&records, slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn world() -> FileSystem {
        let mut fs = FileSystem::default();
        fs.mkdir("docs").unwrap();
        fs.write("docs/key.txt", "1234").unwrap();
        fs.write("readme", "hi").unwrap();
        fs
    }

    #[test]
    fn test_download_moves_file() {
        let mut fs = world();
        let mut cache = Cache::default();

        let file = cache.download(&mut fs, "docs/key.txt").unwrap();
        assert_eq!(file.content, "1234");
        assert_eq!(cache.len(), 1);
        assert!(fs.get("docs/key.txt").is_err());
        assert_eq!(fs.usage().used, 2);
    }

    #[test]
    fn test_download_refuses_directory() {
        let mut fs = world();
        let mut cache = Cache::default();
        assert!(matches!(
            cache.download(&mut fs, "docs"),
            Err(FsError::IsADirectory(_))
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_download_when_full_keeps_file() {
        let mut fs = world();
        let mut cache = Cache::new(1);
        cache.download(&mut fs, "readme").unwrap();

        assert!(matches!(
            cache.download(&mut fs, "docs/key.txt"),
            Err(FsError::CacheFull { slots: 1 })
        ));
        assert_eq!(fs.read("docs/key.txt").unwrap(), "1234");
    }

    #[test]
    fn test_download_duplicate_name() {
        let mut fs = world();
        let mut cache = Cache::default();
        cache.download(&mut fs, "readme").unwrap();
        fs.write("docs/readme", "other").unwrap();

        assert!(matches!(
            cache.download(&mut fs, "docs/readme"),
            Err(FsError::AlreadyExists(_))
        ));
        assert_eq!(fs.read("docs/readme").unwrap(), "other");
    }

    #[test]
    fn test_upload_moves_file_back() {
        let mut fs = world();
        let mut cache = Cache::default();
        cache.download(&mut fs, "docs/key.txt").unwrap();

        cache.upload(&mut fs, "key.txt", "~").unwrap();
        assert!(cache.is_empty());
        assert_eq!(fs.read("key.txt").unwrap(), "1234");
    }

    #[test]
    fn test_upload_failure_keeps_cached_file() {
        let mut fs = FileSystem::new("~", Some(3));
        fs.write("a", "xyz").unwrap();
        let mut cache = Cache::default();
        cache.download(&mut fs, "a").unwrap();
        fs.write("b", "12").unwrap();

        assert!(matches!(
            cache.upload(&mut fs, "a", "~"),
            Err(FsError::CapacityExceeded { .. })
        ));
        assert_eq!(cache.len(), 1);
        assert!(matches!(
            cache.upload(&mut fs, "missing", "~"),
            Err(FsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_records_round_trip() {
        let mut fs = world();
        let mut cache = Cache::default();
        cache.download(&mut fs, "readme").unwrap();
        cache.download(&mut fs, "docs/key.txt").unwrap();

        let records = cache.to_records();
        assert_eq!(records[0], Record::dir("cache", -1, -1));
        assert_eq!(records[2], Record::file("key.txt", 0, "1234"));

        let json = cache.to_json().unwrap();
        assert_eq!(Cache::from_json(&json, 16).unwrap(), cache);
    }

    #[test]
    fn test_from_records_rejects_nesting() {
        let records = vec![
            Record::dir("cache", -1, -1),
            Record::dir("sub", 0, -1),
        ];
        assert!(matches!(
            Cache::from_records(&records, 4),
            Err(RecordError::Rejected { index: 1, .. })
        ));

        let records = vec![
            Record::dir("cache", -1, -1),
            Record::file("a", 0, ""),
            Record::file("b", 1, ""),
        ];
        assert!(matches!(
            Cache::from_records(&records, 4),
            Err(RecordError::ParentIsFile { index: 2, parent: 1 })
        ));

        let records = vec![
            Record::dir("cache", -1, -1),
            Record::file("a", 0, ""),
            Record::file("b", 5, ""),
        ];
        assert!(matches!(
            Cache::from_records(&records, 4),
            Err(RecordError::ParentOutOfRange { index: 2, parent: 5 })
        ));
    }

    #[test]
    fn test_from_records_respects_slots() {
        let records = vec![
            Record::dir("cache", -1, -1),
            Record::file("a", 0, ""),
            Record::file("b", 0, ""),
        ];
        assert!(matches!(
            Cache::from_records(&records, 1),
            Err(RecordError::Rejected { index: 2, .. })
        ));
    }
}
