//! Bundle archive
//!
//! Layout: `IGNB` magic, little-endian `u16` version, then a stream of
//! bincode-framed `Option<ArchiveEntry>` records closed by `None`. Readers
//! walk the stream front to back and never need the whole file in memory.

use super::unit::{unit_name_from_path, unit_path_for_name, UnitImage};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

/// Leading magic of every bundle archive
pub const ARCHIVE_MAGIC: [u8; 4] = *b"IGNB";

/// Current archive version
pub const ARCHIVE_VERSION: u16 = 1;

/// Conventional bundle file extension
pub const BUNDLE_EXTENSION: &str = "bundle";

/// A named blob inside a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Slash-separated path
    pub path: String,
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    /// Dotted unit name, if this entry is a compiled unit
    pub fn unit_name(&self) -> Option<String> {
        unit_name_from_path(&self.path)
    }
}

#[derive(Serialize)]
struct EntryRef<'a> {
    path: &'a str,
    data: &'a [u8],
}

// ============================================================================
// ArchiveReader
// ============================================================================

/// Streaming reader over archive entries
pub struct ArchiveReader<R: Read> {
    inner: R,
    finished: bool,
}

impl ArchiveReader<BufReader<File>> {
    /// Open a bundle file
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
            .map_err(|e| Error::archive(format!("{}: {}", path.display(), e)))
    }
}

impl<R: Read> ArchiveReader<R> {
    /// Validate the header and position at the first entry
    pub fn new(mut inner: R) -> Result<Self> {
        let mut header = [0u8; 6];
        inner.read_exact(&mut header).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => Error::archive("truncated header"),
            _ => Error::Io(e),
        })?;

        if header[..4] != ARCHIVE_MAGIC {
            return Err(Error::archive("not a bundle archive"));
        }
        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != ARCHIVE_VERSION {
            return Err(Error::archive(format!("unsupported archive version {}", version)));
        }

        Ok(Self {
            inner,
            finished: false,
        })
    }

    /// Next entry, `None` once the terminator has been read
    pub fn next_entry(&mut self) -> Result<Option<ArchiveEntry>> {
        if self.finished {
            return Ok(None);
        }

        let record: Option<ArchiveEntry> = bincode::deserialize_from(&mut self.inner)
            .map_err(|e| Error::archive(format!("corrupt entry: {}", e)))?;

        if record.is_none() {
            self.finished = true;
        }
        Ok(record)
    }
}

impl<R: Read> Iterator for ArchiveReader<R> {
    type Item = Result<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => None,
            Err(e) => {
                // a broken stream cannot be resynchronized
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

// ============================================================================
// BundleWriter
// ============================================================================

/// Writes bundle archives
pub struct BundleWriter<W: Write> {
    inner: W,
    entries: usize,
}

impl BundleWriter<BufWriter<File>> {
    /// Create (or truncate) a bundle file
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> BundleWriter<W> {
    pub fn new(mut inner: W) -> Result<Self> {
        inner.write_all(&ARCHIVE_MAGIC)?;
        inner.write_all(&ARCHIVE_VERSION.to_le_bytes())?;
        Ok(Self { inner, entries: 0 })
    }

    /// Append a raw entry
    pub fn add_entry(&mut self, path: &str, data: &[u8]) -> Result<()> {
        bincode::serialize_into(&mut self.inner, &Some(EntryRef { path, data }))?;
        self.entries += 1;
        Ok(())
    }

    /// Append an encoded unit under its conventional path
    pub fn add_unit(&mut self, image: &UnitImage) -> Result<()> {
        let bytes = image.encode()?;
        self.add_unit_bytes(&image.name, &bytes)
    }

    /// Append arbitrary bytes under a unit name's path
    pub fn add_unit_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.add_entry(&unit_path_for_name(name), bytes)
    }

    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Write the terminator and flush
    pub fn finish(mut self) -> Result<W> {
        bincode::serialize_into(&mut self.inner, &Option::<EntryRef<'_>>::None)?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}
