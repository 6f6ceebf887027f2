use std::io;

/// Errors that can occur while decompressing an archive.
///
/// Every entry-scoped variant carries the archive-relative path exactly as it
/// was stored in the archive, plus the operation that failed. Extraction is
/// fail-fast: the first error aborts the call and nothing already written is
/// rolled back.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in minor versions without breaking existing code. Always include a
/// catch-all `_ =>` arm when matching.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The stream is not a valid archive container.
    #[error("failed to create {format} reader: {source}")]
    Format {
        format: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// An entry path, or a symlink's resolved target, escapes the destination (Zip Slip).
    #[error("illegal file path {entry:?}: the file path does not occur within the destination directory")]
    PathTraversal { entry: String },

    /// Creating a directory failed. `implicit` is set when the directory was a
    /// parent of a file or symlink rather than a listed entry.
    #[error("{} {entry:?}: {source}", directory_action(.implicit))]
    DirectoryCreate {
        entry: String,
        implicit: bool,
        #[source]
        source: io::Error,
    },

    /// Creating or writing a regular file failed.
    #[error("failed to extract file {entry:?}: {source}")]
    FileCreate {
        entry: String,
        #[source]
        source: io::Error,
    },

    /// The content stream of an entry could not be read.
    #[error("failed to read entry {entry:?}: {source}")]
    EntryRead {
        entry: String,
        #[source]
        source: io::Error,
    },

    /// A symlink's target does not exist on disk once all content is written.
    #[error("failed to evaluate symlink {entry:?} -> {target:?}: {source}")]
    SymlinkTargetMissing {
        entry: String,
        target: String,
        #[source]
        source: io::Error,
    },

    /// The symlink path is already occupied or `symlink(2)` failed.
    #[error("failed to extract symlink {entry:?}: {source}")]
    SymlinkCreate {
        entry: String,
        #[source]
        source: io::Error,
    },

    /// Archive contains an entry type that is never materialized (device file, fifo, hard link).
    #[error("entry {entry:?} has unsupported type '{entry_type}'")]
    UnsupportedEntryType { entry: String, entry_type: String },

    /// An entry name is not valid UTF-8 and cannot be reproduced on disk verbatim.
    #[error("entry name {entry:?} is not valid UTF-8")]
    InvalidEntryName { entry: String },

    /// Destination directory does not exist or is not a directory.
    #[error("destination directory '{path}' does not exist")]
    DestinationNotFound { path: String },
}

fn directory_action(implicit: &bool) -> &'static str {
    if *implicit {
        "failed to extract directory that was part of file path"
    } else {
        "failed to extract directory"
    }
}

impl Error {
    pub(crate) fn format<E>(format: &'static str, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::Format {
            format,
            source: source.into(),
        }
    }

    /// The archive-relative path of the entry that failed, if the error is entry-scoped.
    pub fn entry(&self) -> Option<&str> {
        match self {
            Self::PathTraversal { entry }
            | Self::DirectoryCreate { entry, .. }
            | Self::FileCreate { entry, .. }
            | Self::EntryRead { entry, .. }
            | Self::SymlinkTargetMissing { entry, .. }
            | Self::SymlinkCreate { entry, .. }
            | Self::UnsupportedEntryType { entry, .. }
            | Self::InvalidEntryName { entry } => Some(entry),
            Self::Format { .. } | Self::DestinationNotFound { .. } => None,
        }
    }
}
