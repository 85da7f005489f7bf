use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::{Error, Result};

/// Names served by default, in archive order.
pub const DEFAULT_ITEM_NAMES: [&str; 3] = ["junk1.txt", "junk2.txt", "junk3.txt"];

/// Byte content of a source item. Readable exactly once.
pub enum ItemContent {
    Bytes(Bytes),
    /// Opened lazily when the writer reaches the item.
    File(PathBuf),
    Reader(Box<dyn Read + Send>),
}

impl ItemContent {
    pub fn open(self) -> io::Result<Box<dyn Read + Send>> {
        match self {
            Self::Bytes(bytes) => Ok(Box::new(io::Cursor::new(bytes))),
            Self::File(path) => Ok(Box::new(File::open(path)?)),
            Self::Reader(reader) => Ok(reader),
        }
    }
}

impl fmt::Debug for ItemContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// A named payload that becomes one archive entry.
#[derive(Debug)]
pub struct SourceItem {
    pub name: String,
    pub content: ItemContent,
}

impl SourceItem {
    pub fn new(name: impl Into<String>, content: ItemContent) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self::new(name, ItemContent::Bytes(bytes.into()))
    }

    pub fn from_reader(name: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Self::new(name, ItemContent::Reader(Box::new(reader)))
    }
}

/// Enumerates the items of one archive.
pub trait SourceItemProvider: Send + Sync {
    /// Items in archive order. Called once per archive.
    fn list(&self) -> Result<Vec<SourceItem>>;
}

/// Fixed set of files under a root directory.
#[derive(Clone, Debug)]
pub struct DirectoryProvider {
    root: PathBuf,
    names: Vec<String>,
}

impl DirectoryProvider {
    pub fn new<I, S>(root: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: root.into(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The three junk files under `root`.
    pub fn junk(root: impl Into<PathBuf>) -> Self {
        Self::new(root, DEFAULT_ITEM_NAMES)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl SourceItemProvider for DirectoryProvider {
    fn list(&self) -> Result<Vec<SourceItem>> {
        self.names
            .iter()
            .map(|name| {
                let path = self.root.join(name);
                match std::fs::metadata(&path) {
                    Ok(meta) if meta.is_file() => Ok(SourceItem::new(name.clone(), ItemContent::File(path))),
                    _ => Err(Error::NotFound { name: name.clone() }),
                }
            })
            .collect()
    }
}

/// In-memory items, cloned on every call.
#[derive(Clone, Debug, Default)]
pub struct StaticProvider {
    items: Vec<(String, Bytes)>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        self.items.push((name.into(), content.into()));
        self
    }
}

impl SourceItemProvider for StaticProvider {
    fn list(&self) -> Result<Vec<SourceItem>> {
        Ok(self
            .items
            .iter()
            .map(|(name, bytes)| SourceItem::from_bytes(name.clone(), bytes.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(content: ItemContent) -> Vec<u8> {
        let mut out = Vec::new();
        content.open().unwrap().read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn directory_provider_lists_in_declared_order() {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [("junk1.txt", "AAA"), ("junk2.txt", "BB"), ("junk3.txt", "C")] {
            std::fs::write(dir.path().join(name), body).unwrap();
        }

        let items = DirectoryProvider::junk(dir.path()).list().unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, DEFAULT_ITEM_NAMES);

        let contents: Vec<_> = items.into_iter().map(|i| read_all(i.content)).collect();
        assert_eq!(contents, vec![b"AAA".to_vec(), b"BB".to_vec(), b"C".to_vec()]);
    }

    #[test]
    fn directory_provider_missing_item_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("junk1.txt"), "AAA").unwrap();

        let err = DirectoryProvider::junk(dir.path()).list().unwrap_err();
        assert!(matches!(err, Error::NotFound { ref name } if name == "junk2.txt"));
    }

    #[test]
    fn directory_provider_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("junk1.txt")).unwrap();

        let err = DirectoryProvider::new(dir.path(), ["junk1.txt"]).list().unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn directory_provider_opens_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk1.txt");
        std::fs::write(&path, "AAA").unwrap();

        let items = DirectoryProvider::new(dir.path(), ["junk1.txt"]).list().unwrap();
        std::fs::write(&path, "changed").unwrap();

        let item = items.into_iter().next().unwrap();
        assert_eq!(read_all(item.content), b"changed");
    }

    #[test]
    fn static_provider_is_repeatable() {
        let provider = StaticProvider::new().item("a", "1").item("b", "22");
        let first = provider.list().unwrap();
        let second = provider.list().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(first[1].name, "b");
        assert_eq!(read_all(second.into_iter().nth(1).unwrap().content), b"22");
    }

    #[test]
    fn item_content_debug_hides_reader() {
        let item = SourceItem::from_reader("r", io::empty());
        assert_eq!(format!("{:?}", item.content), "Reader(..)");
    }
}
