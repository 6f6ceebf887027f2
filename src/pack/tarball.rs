use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::Path;

use anyhow::Context;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::info;

use super::{BundledFile, TarBuilder};

/// Writes files into a gzip-compressed tarball.
///
/// Parent directories are emitted as `0o755` directory entries before the
/// first file inside them.
#[derive(Debug, Clone, Copy, Default)]
pub struct GzipTarBuilder;

impl TarBuilder for GzipTarBuilder {
    fn build(&self, output: &Path, files: Vec<BundledFile>) -> anyhow::Result<()> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let file = File::create(output)
            .with_context(|| format!("failed to create {}", output.display()))?;
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        let mut directories = BTreeSet::new();
        let count = files.len();

        for mut file in files {
            let segments: Vec<&str> = file.name.split('/').collect();
            for depth in 1..segments.len() {
                let dir = segments[..depth].join("/");
                if directories.insert(dir.clone()) {
                    let mut header = tar::Header::new_gnu();
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_mode(0o755);
                    header.set_size(0);
                    builder.append_data(&mut header, format!("{dir}/"), std::io::empty())?;
                }
            }

            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(file.mode);
            header.set_size(file.size);
            builder
                .append_data(&mut header, &file.name, &mut file.content)
                .with_context(|| format!("failed to write {}", file.name))?;
        }

        builder.into_inner()?.finish()?;
        info!(output = %output.display(), files = count, "wrote buildpack archive");
        Ok(())
    }
}
