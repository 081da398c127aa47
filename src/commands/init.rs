//! `webload init` command implementation.

use anyhow::Result;
use std::path::{Path, PathBuf};

use webload::loadtest::config::LoadTestConfig;

use super::CONFIG_FILE_NAME;

const TEMPLATE_HEADER: &str = "\
# webload configuration
#
# [settings] controls batch dispatch; each [[server]] entry is one target.
# Servers are reported in the order they appear here.

";

/// Execute the `init` command in the current directory.
pub fn execute_init(force: bool) -> Result<()> {
    let path = write_starter_config(&std::env::current_dir()?, force)?;
    eprintln!("Created {}", path.display());
    eprintln!("Edit the file to point at your servers.");
    Ok(())
}

/// Writes the default configuration as `webload.toml` inside `dir`.
fn write_starter_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}\n\
             Use `--force` to overwrite.",
            config_path.display()
        );
    }

    let content = format!("{TEMPLATE_HEADER}{}", LoadTestConfig::default().to_toml()?);
    std::fs::write(&config_path, content)?;
    Ok(config_path)
}
