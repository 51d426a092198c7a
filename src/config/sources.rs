use super::models::Config;
use config::{ConfigError, Environment, File, FileFormat};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "PAGEGATE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/pagegate.toml";
const ENV_PREFIX: &str = "PAGEGATE";
const ENV_SEPARATOR: &str = "__";

/// Resolve which file to read: explicit path, then `PAGEGATE_CONFIG`, then
/// the default location
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load(explicit: Option<PathBuf>) -> Result<Config, ConfigError> {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    load_from_sources(config_path(explicit))
}

/// Load configuration from a specific path plus environment overrides
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).format(FileFormat::Toml));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // PAGEGATE__SERVER__CAPACITY -> server.capacity
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.capacity, 8);
        assert_eq!(config.server.index_document, "index.html");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
host = "127.0.0.1"
document_root = "/srv/site"
index_document = "home.html"
capacity = 16
max_request_bytes = "8KB"
read_timeout_ms = 2500
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.server.document_root, PathBuf::from("/srv/site"));
        assert_eq!(config.server.index_document, "home.html");
        assert_eq!(config.server.capacity, 16);
        assert_eq!(config.server.max_request_bytes.as_u64(), 8 * 1024);
        assert_eq!(config.server.read_timeout_ms, 2500);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[server\ncapacity = ").unwrap();

        assert!(load_from_sources(config_path).is_err());
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = config_path(Some(PathBuf::from("/etc/pagegate.toml")));
        assert_eq!(path, PathBuf::from("/etc/pagegate.toml"));
    }
}
