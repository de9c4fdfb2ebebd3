//! Invokes the source-to-AST compiler subprocess and hands back its stdout
//! for the loader to parse.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Runs `run-container <compiler_image> ast <program_path>` and returns its
/// stdout as a `String`. A non-zero exit surfaces stderr as the error
/// message.
pub fn compile_to_ast_json(compiler_image: &str, program_path: &Path) -> Result<String> {
    let output = Command::new("run-container")
        .arg(compiler_image)
        .arg("ast")
        .arg(program_path)
        .output()
        .with_context(|| format!("failed to launch compiler subprocess for {}", program_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("compiler exited with {}: {}", output.status, stderr.trim());
    }

    String::from_utf8(output.stdout).context("compiler stdout was not valid UTF-8")
}
