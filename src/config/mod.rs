/// Onboarding content loading from config.toml
pub mod content;

/// Environment-variable settings (ids, roles, thresholds, file paths)
pub mod settings;
