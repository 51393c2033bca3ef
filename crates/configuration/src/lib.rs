use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    CacheSettings, LogFormat, LoggingSettings, ProviderSettings, ServerSettings, Settings,
};

/// The configuration file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "intel.toml";

/// Prefix for environment overrides, e.g. `DEFI_INTEL__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "DEFI_INTEL";

/// Loads the application configuration.
///
/// Sources are layered in order of increasing precedence: compiled-in defaults,
/// the TOML file (`intel.toml` unless `path` is given; optional only in the
/// default case), then `DEFI_INTEL__*` environment variables. The result is
/// validated before it is returned.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Endpoint;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_defaults_follow_endpoint_ttl_tiers() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        for endpoint in Endpoint::ALL {
            assert_eq!(settings.cache.ttl_for(endpoint), endpoint.default_ttl());
        }
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intel.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8088

[provider]
timeout = "3s"

[cache]
trending_ttl = "2m"
"#
        )
        .unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.server.port, 8088);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.provider.timeout, Duration::from_secs(3));
        assert_eq!(settings.cache.trending_ttl, Duration::from_secs(120));
        assert_eq!(settings.cache.chains_overview_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[cache]\nmovers_ttl = \"0s\"\n").unwrap();

        let err = load_settings(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("movers")));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(load_settings(Some(&path)), Err(ConfigError::LoadError(_))));
    }
}
