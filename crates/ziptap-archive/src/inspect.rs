use std::io::{Read, Seek};

use crate::error::{Error, Result};
use crate::options::Compression;

const MAX_PREALLOC: u64 = 1 << 20;

/// An entry read back from a finished archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InspectedEntry {
    pub name: String,
    /// `None` for methods this crate never writes.
    pub compression: Option<Compression>,
    pub crc32: u32,
    pub content: Vec<u8>,
}

/// Reads every entry of a complete archive in central-directory order.
///
/// An archive cut short before its central directory fails with
/// [`Error::Incomplete`], which is how a consumer of a streamed archive
/// detects truncation.
pub fn read_archive<R: Read + Seek>(reader: R) -> Result<Vec<InspectedEntry>> {
    let mut archive = zip::ZipArchive::new(reader).map_err(|source| Error::Incomplete { source })?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|source| Error::Incomplete { source })?;
        let name = file.name().to_string();

        // Declared sizes are untrusted; cap the preallocation.
        let mut content = Vec::with_capacity(file.size().min(MAX_PREALLOC) as usize);
        file.read_to_end(&mut content)
            .map_err(|source| Error::Read { name: name.clone(), source })?;

        entries.push(InspectedEntry {
            compression: Compression::from_method(file.compression()),
            crc32: file.crc32(),
            name,
            content,
        });
    }
    Ok(entries)
}
