use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context};
use tracing::info;

use super::PrePackager;

/// Runs the pre-package script with `bash -c` from the buildpack root.
///
/// An empty script is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellPrePackager;

impl PrePackager for ShellPrePackager {
    fn execute(&self, script: &str, root_dir: &Path) -> anyhow::Result<()> {
        if script.trim().is_empty() {
            return Ok(());
        }

        info!(script, root = %root_dir.display(), "running pre-package script");
        let output = Command::new("bash")
            .arg("-c")
            .arg(script)
            .current_dir(root_dir)
            .output()
            .context("failed to start bash")?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            info!("  {line}");
        }

        if !output.status.success() {
            bail!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(())
    }
}
