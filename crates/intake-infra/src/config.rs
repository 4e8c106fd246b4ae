//! Configuration loader for Intake.
//!
//! Reads `intake.toml` from the data directory (`~/.intake/` in production)
//! and deserializes it into [`InterviewerConfig`]. Falls back to defaults
//! when the file is missing or malformed.

use std::path::Path;

use intake_types::config::InterviewerConfig;

/// Load engine configuration from `{data_dir}/intake.toml`.
///
/// - If the file does not exist, returns [`InterviewerConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the
///   default.
/// - If the file exists and parses successfully, returns the parsed config.
///   Every field is optional in the file; omitted fields take their
///   defaults.
pub async fn load_interviewer_config(data_dir: &Path) -> InterviewerConfig {
    let config_path = data_dir.join("intake.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No intake.toml found at {}, using defaults", config_path.display());
            return InterviewerConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return InterviewerConfig::default();
        }
    };

    match toml::from_str::<InterviewerConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            InterviewerConfig::default()
        }
    }
}
