// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AnalyticsSettings, AppSettings, DataSettings, PingSettings, ServerSettings, Settings};

/// Loads the application settings from the `config/` directory.
///
/// The environment is taken from `APP_ENVIRONMENT` and defaults to "development".
pub fn load_settings() -> Result<Settings> {
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());
    load_settings_from(Path::new("config"), &environment)
}

/// Loads the application settings from `dir`.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings_from(dir: &Path, environment: &str) -> Result<Settings> {
    load_layers(dir, environment, app_environment())
}

/// `APP_` variables, with `__` between nested keys (e.g. `APP_SERVER__PORT`).
fn app_environment() -> Environment {
    Environment::with_prefix("APP")
        .prefix_separator("_")
        .separator("__")
}

fn load_layers(dir: &Path, environment: &str, variables: Environment) -> Result<Settings> {
    let base = dir.join("base");
    let overlay = dir.join(environment);

    let settings = Config::builder()
        // 1. Load the base configuration file.
        .add_source(File::with_name(&base.to_string_lossy()))
        // 2. Load the environment-specific configuration file.
        .add_source(File::with_name(&overlay.to_string_lossy()).required(false))
        // 3. Load settings from environment variables (e.g., `APP_SERVER__PORT=8080`).
        .add_source(variables)
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    validate(&settings)?;

    Ok(settings)
}

fn validate(settings: &Settings) -> Result<()> {
    let capital = settings.analytics.initial_capital;
    if !capital.is_finite() || capital <= 0.0 {
        return Err(Error::Invalid(format!(
            "analytics.initial_capital must be a positive number, got {capital}"
        )));
    }
    if settings.ping.capacity == 0 {
        return Err(Error::Invalid("ping.capacity must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Mode;
    use std::fs;

    const BASE: &str = r#"
[app]
environment = "development"
log_level = "info"

[server]
host = "127.0.0.1"
port = 3000

[data]
backtest_dir = "data"
live_dir = "data/live"
"#;

    #[test]
    fn base_file_alone_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.toml"), BASE).unwrap();

        let settings = load_settings_from(dir.path(), "development").unwrap();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.data.default_mode, Mode::Backtest);
        assert_eq!(settings.data.root_for(Mode::Live), Path::new("data/live"));
        assert_eq!(settings.analytics.initial_capital, 100_000.0);
        assert_eq!(settings.ping.capacity, 100);
        assert_eq!(settings.ping.interval_secs, 60);
        assert_eq!(settings.ping.utc_offset_minutes, 330);
    }

    #[test]
    fn environment_file_overrides_base() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.toml"), BASE).unwrap();
        fs::write(
            dir.path().join("production.toml"),
            "[data]\ndefault_mode = \"live\"\n\n[analytics]\ninitial_capital = 25000.0\n",
        )
        .unwrap();

        let settings = load_settings_from(dir.path(), "production").unwrap();
        assert_eq!(settings.data.default_mode, Mode::Live);
        assert_eq!(settings.data.backtest_dir, Path::new("data"));
        assert_eq!(settings.analytics.initial_capital, 25_000.0);
    }

    fn variables(pairs: &[(&str, &str)]) -> Environment {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        app_environment().source(Some(map))
    }

    #[test]
    fn environment_variables_override_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.toml"), BASE).unwrap();

        let settings = load_layers(
            dir.path(),
            "development",
            variables(&[
                ("APP_SERVER__PORT", "8080"),
                ("APP_DATA__DEFAULT_MODE", "live"),
                ("APP_ENVIRONMENT", "development"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.data.default_mode, Mode::Live);
        assert_eq!(settings.server.host, "127.0.0.1");
    }

    #[test]
    fn double_underscore_after_the_prefix_is_not_a_key() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.toml"), BASE).unwrap();

        let settings = load_layers(
            dir.path(),
            "development",
            variables(&[("APP__SERVER__PORT", "9090")]),
        )
        .unwrap();

        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn rejects_non_positive_initial_capital() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("base.toml"),
            format!("{BASE}\n[analytics]\ninitial_capital = 0.0\n"),
        )
        .unwrap();

        let err = load_settings_from(dir.path(), "development").unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
    }

    #[test]
    fn missing_base_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_settings_from(dir.path(), "development"),
            Err(Error::LoadError(_))
        ));
    }
}
