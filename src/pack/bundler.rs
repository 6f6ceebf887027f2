use std::fs::{self, File};
use std::path::Path;

use anyhow::{bail, Context};
use glob_match::glob_match;
use walkdir::WalkDir;

use super::{BundledFile, FileBundler};

/// Selects regular files below the root whose relative path matches one of
/// the include patterns.
///
/// Patterns are globs (`bin/*`, `**/*.sh`); a plain name matches itself. A
/// plain name that matches nothing is an error, since the descriptor promised
/// that file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternBundler;

impl FileBundler for PatternBundler {
    fn bundle(&self, root: &Path, patterns: &[String]) -> anyhow::Result<Vec<BundledFile>> {
        let mut matched = vec![false; patterns.len()];
        let mut files = Vec::new();

        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }

            let relative = entry.path().strip_prefix(root)?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let mut selected = false;
            for (pattern, hit) in patterns.iter().zip(matched.iter_mut()) {
                if pattern == &name || glob_match(pattern, &name) {
                    *hit = true;
                    selected = true;
                }
            }
            if !selected {
                continue;
            }

            // Follows symlinks so the archive carries the content.
            let metadata = fs::metadata(entry.path())
                .with_context(|| format!("failed to stat {name}"))?;
            if !metadata.is_file() {
                continue;
            }
            let content =
                File::open(entry.path()).with_context(|| format!("failed to open {name}"))?;

            files.push(BundledFile {
                size: metadata.len(),
                mode: mode_of(&metadata),
                content: Box::new(content),
                name,
            });
        }

        for (pattern, hit) in patterns.iter().zip(&matched) {
            if !hit && !is_glob(pattern) {
                bail!("included file {pattern:?} does not exist");
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

#[cfg(unix)]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn tree() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("bin")).unwrap();
        fs::write(root.path().join("bin/build"), "build").unwrap();
        fs::write(root.path().join("bin/detect"), "detect").unwrap();
        fs::write(root.path().join("buildpack.toml"), "toml").unwrap();
        fs::write(root.path().join("README.md"), "readme").unwrap();
        root
    }

    #[test]
    fn selects_exact_names_in_order() {
        let root = tree();
        let patterns = vec!["buildpack.toml".to_string(), "bin/build".to_string()];

        let files = PatternBundler.bundle(root.path(), &patterns).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["bin/build", "buildpack.toml"]);
        assert_eq!(files[1].size, 4);
    }

    #[test]
    fn selects_globs() {
        let root = tree();
        let patterns = vec!["bin/*".to_string()];

        let mut files = PatternBundler.bundle(root.path(), &patterns).unwrap();
        assert_eq!(files.len(), 2);

        let mut content = String::new();
        files[1].content.read_to_string(&mut content).unwrap();
        assert_eq!(content, "detect");
    }

    #[test]
    fn missing_exact_name_is_an_error() {
        let root = tree();
        let patterns = vec!["bin/missing".to_string()];

        let err = PatternBundler.bundle(root.path(), &patterns).unwrap_err();
        assert!(err.to_string().contains("bin/missing"));
    }
}
