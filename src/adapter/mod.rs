//! Archive format adapters.
//!
//! Adapters normalize different archive formats into a common entry stream
//! for the extraction engine.

use std::io::Read;

use crate::entry::EntryInfo;
use crate::error::Error;

#[cfg(feature = "tar")]
mod tar_adapter;
mod zip_adapter;

#[cfg(feature = "tar")]
pub use tar_adapter::TarAdapter;
pub use zip_adapter::ZipAdapter;

/// A single-pass source of archive entries.
///
/// Entries are yielded in archive-stored order. The reader handed to the
/// callback is only valid for the duration of that call; for symlink entries
/// it yields the link-target text.
pub trait EntrySource {
    /// Feed every entry to `callback`, stopping at the first error.
    fn for_each<F>(&mut self, callback: F) -> Result<(), Error>
    where
        F: FnMut(EntryInfo, &mut dyn Read) -> Result<(), Error>;
}
