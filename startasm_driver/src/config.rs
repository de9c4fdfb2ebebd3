//! Where the compiler image name lives. Session flags and command history
//! are the interactive shell's concern and stay out of scope here; this is
//! just the one setting the driver itself needs before it can call the
//! compiler.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    pub compiler_image: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig { compiler_image: "startasm/compiler".to_string() }
    }
}

impl DriverConfig {
    pub fn load(path: &Path) -> Result<DriverConfig> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read driver config at {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("failed to parse driver config at {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_names_a_compiler_image() {
        assert!(!DriverConfig::default().compiler_image.is_empty());
    }
}
