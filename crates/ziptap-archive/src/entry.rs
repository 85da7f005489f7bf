use crate::options::Compression;

/// One finalized archive entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryRecord {
    pub name: String,
    /// Uncompressed payload size.
    pub size: u64,
    pub crc32: u32,
    pub compression: Compression,
}

/// Entries written to one archive, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    pub entries: Vec<EntryRecord>,
    /// Sum of uncompressed entry sizes.
    pub total_bytes: u64,
}

impl ArchiveReport {
    pub(crate) fn push(&mut self, record: EntryRecord) {
        self.total_bytes += record.size;
        self.entries.push(record);
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}
