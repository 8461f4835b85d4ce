use anyhow::Result;
use roundtable_core::persona::PersonaRegistry;
use std::path::PathBuf;

pub fn list(config: Option<PathBuf>) -> Result<()> {
    let profiles = super::load_profiles(config)?;
    let registry = PersonaRegistry::new(profiles)?;
    for profile in registry.all() {
        println!(
            "{} {:<20} {:<10} {} (bias {:+.1})",
            profile.avatar, profile.id, profile.name, profile.role, profile.sentiment_bias
        );
    }
    Ok(())
}
