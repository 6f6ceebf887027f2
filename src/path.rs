//! Destination-boundary checks.
//!
//! Everything here is a pure function of its arguments: paths are cleaned
//! lexically and never touch the filesystem, so escape attempts are rejected
//! before anything is created for the offending entry.

use std::path::{Component, Path, PathBuf};

/// Lexically clean a path.
///
/// `.` components are dropped and `..` removes the preceding normal component.
/// A `..` that would climb above the start of a relative path is kept, and one
/// that would climb above the filesystem root is dropped, as `filepath.Clean`
/// style cleaners do. An empty result is returned as `.`.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        PathBuf::from(".")
    } else {
        out.iter().collect()
    }
}

/// Turn an archive entry name into a relative path below the destination.
///
/// Names are split on `/`; empty and `.` segments are dropped and the first
/// `strip_components` remaining segments are removed. `..` segments are kept
/// verbatim so [`resolve`] can reject them. Returns `None` when nothing is
/// left, which is the case for the `./` top-level marker.
pub fn entry_relative_path(name: &str, strip_components: usize) -> Option<PathBuf> {
    let segments: Vec<&str> = name
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .skip(strip_components)
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.iter().collect())
    }
}

/// Resolve `candidate` below `root`, or `None` if the result escapes it.
///
/// Root and prefix components of `candidate` are ignored, so an absolute
/// entry name lands inside the destination instead of replacing it. The
/// cleaned result must equal the cleaned root or be a descendant of it.
pub fn resolve(root: &Path, candidate: &Path) -> Option<PathBuf> {
    let root = clean(root);
    let relative: PathBuf = candidate
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    let joined = clean(&root.join(relative));

    is_within(&root, &joined).then_some(joined)
}

/// Whether `path` is `root` itself or lies below it.
///
/// Comparison is component-wise, so `/dest-evil` is not within `/dest`.
pub fn is_within(root: &Path, path: &Path) -> bool {
    path.starts_with(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/a/b/c", "/a/b/c")]
    #[case("/a/b/../c", "/a/c")]
    #[case("/a/./b/", "/a/b")]
    #[case("/../a", "/a")]
    #[case("a/../../b", "../b")]
    #[case("./", ".")]
    #[case("", ".")]
    fn clean_is_lexical(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean(Path::new(input)), PathBuf::from(expected));
    }

    #[rstest]
    #[case("file", Some("/dest/file"))]
    #[case("dir/sub/file", Some("/dest/dir/sub/file"))]
    #[case("dir/../file", Some("/dest/file"))]
    #[case("/etc/passwd", Some("/dest/etc/passwd"))]
    #[case(".", Some("/dest"))]
    #[case("../escape", None)]
    #[case("../../etc/passwd", None)]
    #[case("dir/../../escape", None)]
    #[case("../dest-evil/file", None)]
    #[case("../dest", Some("/dest"))]
    fn resolve_rejects_escapes(#[case] candidate: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            resolve(Path::new("/dest"), Path::new(candidate)),
            expected.map(PathBuf::from)
        );
    }

    #[test]
    fn resolve_cleans_the_root() {
        assert_eq!(
            resolve(Path::new("/tmp/./dest/"), Path::new("a")),
            Some(PathBuf::from("/tmp/dest/a"))
        );
    }

    #[test]
    fn sibling_with_shared_prefix_is_not_within() {
        assert!(!is_within(Path::new("/dest"), Path::new("/dest-evil")));
        assert!(is_within(Path::new("/dest"), Path::new("/dest")));
        assert!(is_within(Path::new("/dest"), Path::new("/dest/a")));
    }

    #[rstest]
    #[case("./", 0, None)]
    #[case(".", 0, None)]
    #[case("some-dir/", 0, Some("some-dir"))]
    #[case("./some-dir/file", 0, Some("some-dir/file"))]
    #[case("../escape", 0, Some("../escape"))]
    #[case("top/inner/file", 1, Some("inner/file"))]
    #[case("top/", 1, None)]
    #[case("a//b", 0, Some("a/b"))]
    fn entry_names_are_normalized(
        #[case] name: &str,
        #[case] strip: usize,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(entry_relative_path(name, strip), expected.map(PathBuf::from));
    }
}
