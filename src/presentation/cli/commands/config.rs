use std::path::Path;

use crate::application::config::AppConfig;

/// Print the effective configuration as pretty JSON, or only where it was
/// loaded from when `path_only` is set.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn run_config(config: &AppConfig, source: &Path, path_only: bool) -> anyhow::Result<()> {
    if path_only {
        println!("{}", source.display());
    } else {
        println!("{}", serde_json::to_string_pretty(config)?);
    }
    Ok(())
}
