//! TAR archive adapter.

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use super::EntrySource;
use crate::entry::{EntryInfo, EntryKind};
use crate::error::Error;

/// Adapter for TAR archives.
///
/// Supports both plain `.tar` and gzip-compressed `.tar.gz` / `.tgz` streams.
///
/// TAR is a sequential format without a central directory, so entries are
/// read strictly forward and the reader never needs to seek. Symlink members
/// carry their target in the header; the adapter exposes it as the entry's
/// content so the engine handles it the same way as a ZIP symlink.
pub struct TarAdapter<R: Read> {
    archive: tar::Archive<R>,
    format: &'static str,
}

impl<R: Read> TarAdapter<R> {
    /// Create a new TarAdapter from a reader.
    ///
    /// For `.tar.gz` streams use [`TarAdapter::gz`].
    pub fn new(reader: R) -> Self {
        Self {
            archive: tar::Archive::new(reader),
            format: "tar",
        }
    }
}

impl<R: Read> TarAdapter<GzDecoder<R>> {
    /// Create an adapter for a gzip-compressed TAR stream.
    pub fn gz(reader: R) -> Self {
        Self {
            archive: tar::Archive::new(GzDecoder::new(reader)),
            format: "tar.gz",
        }
    }
}

impl TarAdapter<BufReader<File>> {
    /// Open a plain TAR file from a path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::format("tar", e))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl TarAdapter<GzDecoder<BufReader<File>>> {
    /// Open a gzip-compressed TAR file (.tar.gz, .tgz) from a path.
    pub fn open_gz<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::format("tar.gz", e))?;
        Ok(Self::gz(BufReader::new(file)))
    }
}

impl<R: Read> EntrySource for TarAdapter<R> {
    fn for_each<F>(&mut self, mut callback: F) -> Result<(), Error>
    where
        F: FnMut(EntryInfo, &mut dyn Read) -> Result<(), Error>,
    {
        let format = self.format;
        let entries = self.archive.entries().map_err(|e| Error::format(format, e))?;

        // Advancing the stream finishes skipping the previous member, so a
        // stream that breaks after the first header is blamed on that member.
        let mut previous: Option<String> = None;

        for entry_result in entries {
            let mut entry = entry_result.map_err(|e| match previous.take() {
                Some(entry) => Error::EntryRead { entry, source: e },
                None => Error::format(format, e),
            })?;

            let name = match String::from_utf8(entry.path_bytes().into_owned()) {
                Ok(name) => name,
                Err(e) => {
                    return Err(Error::InvalidEntryName {
                        entry: String::from_utf8_lossy(e.as_bytes()).into_owned(),
                    })
                }
            };
            previous = Some(name.clone());
            let header = entry.header();

            let entry_type = header.entry_type();
            let kind = match entry_type {
                tar::EntryType::Regular | tar::EntryType::Continuous => EntryKind::File,
                tar::EntryType::Directory => EntryKind::Directory,
                tar::EntryType::Symlink => EntryKind::Symlink,
                tar::EntryType::XGlobalHeader => {
                    tracing::trace!(entry = %name, "skipping pax global header");
                    continue;
                }
                // Hard links, device files and fifos are never materialized
                other => {
                    return Err(Error::UnsupportedEntryType {
                        entry: name,
                        entry_type: entry_type_name(other),
                    });
                }
            };

            let info = EntryInfo {
                kind,
                mode: header.mode().ok(),
                size: entry.size(),
                name,
            };

            if kind == EntryKind::Symlink {
                let target = entry
                    .link_name_bytes()
                    .map(|t| t.into_owned())
                    .unwrap_or_default();
                callback(info, &mut Cursor::new(target))?;
            } else {
                callback(info, &mut entry)?;
            }
        }

        Ok(())
    }
}

/// Convert TAR entry type to a human-readable name.
fn entry_type_name(entry_type: tar::EntryType) -> String {
    match entry_type {
        tar::EntryType::Link => "hard link".into(),
        tar::EntryType::Char => "character device".into(),
        tar::EntryType::Block => "block device".into(),
        tar::EntryType::Fifo => "fifo (named pipe)".into(),
        tar::EntryType::GNUSparse => "GNU sparse file".into(),
        _ => format!("unknown (0x{:02x})", entry_type.as_byte()),
    }
}
