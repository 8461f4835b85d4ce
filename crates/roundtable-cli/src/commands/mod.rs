pub mod personas;
pub mod run;

use anyhow::{Context, Result};
use roundtable_core::config::parse_personas;
use roundtable_core::persona::{PersonaProfile, get_default_presets};
use std::path::PathBuf;

/// Loads persona profiles for a command.
///
/// Precedence: an explicit `--config` path, then the default config file
/// when it exists, then the built-in panel.
pub fn load_profiles(config: Option<PathBuf>) -> Result<Vec<PersonaProfile>> {
    let path = match config {
        Some(path) => Some(path),
        None => default_config_path().filter(|p| p.exists()),
    };

    match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let profiles = parse_personas(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            anyhow::ensure!(
                !profiles.is_empty(),
                "{} defines no personas",
                path.display()
            );
            Ok(profiles)
        }
        None => Ok(get_default_presets()),
    }
}

/// Default config file location (~/.config/roundtable/personas.toml).
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("roundtable").join("personas.toml"))
}
