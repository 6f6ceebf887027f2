//! CLI integration tests
//!
//! These tests run the `jam` binary end-to-end.

#![cfg(feature = "cli")]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

fn cli_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_jam"))
}

fn create_test_zip(dir: &Path) -> PathBuf {
    let zip_path = dir.join("test.zip");
    let file = fs::File::create(&zip_path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    zip.start_file("hello.txt", options).unwrap();
    zip.write_all(b"Hello, World!").unwrap();

    zip.start_file("subdir/nested.txt", options).unwrap();
    zip.write_all(b"Nested content").unwrap();

    zip.finish().unwrap();
    zip_path
}

fn create_test_tar_gz(dir: &Path) -> PathBuf {
    let path = dir.join("test.tar.gz");
    let encoder = flate2::write::GzEncoder::new(
        fs::File::create(&path).unwrap(),
        flate2::Compression::default(),
    );
    let mut builder = tar::Builder::new(encoder);

    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_mode(0o644);
    header.set_size(4);
    builder
        .append_data(&mut header, "package/file.txt", &b"data"[..])
        .unwrap();

    builder.into_inner().unwrap().finish().unwrap();
    path
}

#[test]
fn test_cli_help() {
    let output = cli_binary().arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Package buildpacks and extract archives"));
    assert!(stdout.contains("pack"));
    assert!(stdout.contains("extract"));
    assert!(stdout.contains("completions"));
}

#[test]
fn test_cli_version() {
    let output = cli_binary().arg("--version").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("jam"));
}

#[test]
fn test_cli_extract_zip() {
    let temp = tempfile::tempdir().unwrap();
    let zip_path = create_test_zip(temp.path());
    let dest = temp.path().join("output");

    let output = cli_binary()
        .arg("extract")
        .arg(&zip_path)
        .arg("-d")
        .arg(&dest)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Extracted"));

    assert_eq!(
        fs::read_to_string(dest.join("hello.txt")).unwrap(),
        "Hello, World!"
    );
    assert_eq!(
        fs::read_to_string(dest.join("subdir/nested.txt")).unwrap(),
        "Nested content"
    );
}

#[test]
fn test_cli_extract_tar_gz_strip_components() {
    let temp = tempfile::tempdir().unwrap();
    let archive = create_test_tar_gz(temp.path());
    let dest = temp.path().join("output");

    let output = cli_binary()
        .arg("extract")
        .arg(&archive)
        .arg("-d")
        .arg(&dest)
        .arg("--strip-components")
        .arg("1")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(dest.join("file.txt")).unwrap(), "data");
}

#[test]
fn test_cli_quiet_mode() {
    let temp = tempfile::tempdir().unwrap();
    let zip_path = create_test_zip(temp.path());
    let dest = temp.path().join("output");

    let output = cli_binary()
        .arg("-q")
        .arg("extract")
        .arg(&zip_path)
        .arg("-d")
        .arg(&dest)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(dest.join("hello.txt").exists());
}

#[test]
fn test_cli_extract_rejects_zip_slip() {
    let temp = tempfile::tempdir().unwrap();
    let zip_path = temp.path().join("evil.zip");
    let mut zip = zip::ZipWriter::new(fs::File::create(&zip_path).unwrap());
    zip.start_file("../evil.txt", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(b"evil").unwrap();
    zip.finish().unwrap();
    let dest = temp.path().join("output");

    let output = cli_binary()
        .arg("extract")
        .arg(&zip_path)
        .arg("-d")
        .arg(&dest)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("illegal file path"));
    assert!(!temp.path().join("evil.txt").exists());
}

#[test]
fn test_cli_nonexistent_file() {
    let output = cli_binary()
        .arg("extract")
        .arg("/nonexistent/file.zip")
        .arg("-d")
        .arg(std::env::temp_dir())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to open archive /nonexistent/file.zip"));
    assert!(stderr.contains("os error"));
}

#[test]
fn test_cli_destination_cannot_be_created() {
    let temp = tempfile::tempdir().unwrap();
    let zip_path = create_test_zip(temp.path());
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let output = cli_binary()
        .arg("extract")
        .arg(&zip_path)
        .arg("-d")
        .arg(blocker.join("output"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to create destination"));
    assert!(stderr.contains("os error"));
}

#[test]
fn test_cli_pack_missing_flag() {
    let output = cli_binary()
        .arg("pack")
        .arg("--version")
        .arg("1.0.0")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing required flag --buildpack"));
}

#[test]
fn test_cli_pack() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("source");
    fs::create_dir(&source).unwrap();
    fs::write(
        source.join("buildpack.toml"),
        r#"
api = "0.2"

[buildpack]
id = "some-buildpack-id"
name = "Some Buildpack"

[metadata]
include-files = ["buildpack.toml"]
"#,
    )
    .unwrap();
    let tarball = temp.path().join("buildpack.tgz");

    let output = cli_binary()
        .arg("pack")
        .arg("--buildpack")
        .arg(source.join("buildpack.toml"))
        .arg("--version")
        .arg("1.2.3")
        .arg("--output")
        .arg(&tarball)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Packing Some Buildpack 1.2.3..."));

    let dest = temp.path().join("unpacked");
    let output = cli_binary()
        .arg("extract")
        .arg(&tarball)
        .arg("-d")
        .arg(&dest)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(dest.join("buildpack.toml").exists());
}

#[test]
fn test_cli_completions() {
    let output = cli_binary().arg("completions").arg("bash").output().unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("jam"));
}
