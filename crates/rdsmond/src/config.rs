//! rdsmond configuration.
//!
//! Resolution order: built-in defaults < optional TOML file < CLI flags.
//! The naming constants (namespace, log group, listen port) are process-wide
//! configuration, never derived at run time.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The original exporter's port, kept for drop-in scrape configs.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:9377";
pub const DEFAULT_NAMESPACE: &str = "rdsosmetrics";
pub const DEFAULT_LOG_GROUP: &str = "RDSOSMetrics";
pub const DEFAULT_REGION_TIMEOUT_SECS: u64 = 10;

/// Partial settings, as read from a TOML file or CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub listen: Option<String>,
    pub namespace: Option<String>,
    pub log_group: Option<String>,
    pub regions: Option<Vec<String>>,
    pub region_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Fully-resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub listen: SocketAddr,
    pub namespace: String,
    pub log_group: String,
    /// `None` means the built-in commercial region set.
    pub regions: Option<Vec<String>>,
    pub region_timeout: Duration,
}

/// Merge file values under CLI overrides and fill in defaults.
pub fn resolve(file: FileConfig, cli: FileConfig) -> anyhow::Result<Settings> {
    let listen = cli
        .listen
        .or(file.listen)
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string())
        .parse()?;

    Ok(Settings {
        listen,
        namespace: cli
            .namespace
            .or(file.namespace)
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        log_group: cli
            .log_group
            .or(file.log_group)
            .unwrap_or_else(|| DEFAULT_LOG_GROUP.to_string()),
        regions: cli.regions.or(file.regions),
        region_timeout: Duration::from_secs(
            cli.region_timeout_secs
                .or(file.region_timeout_secs)
                .unwrap_or(DEFAULT_REGION_TIMEOUT_SECS),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_nothing_is_given() {
        let settings = resolve(FileConfig::default(), FileConfig::default()).unwrap();
        assert_eq!(settings.listen.port(), 9377);
        assert_eq!(settings.namespace, "rdsosmetrics");
        assert_eq!(settings.log_group, "RDSOSMetrics");
        assert!(settings.regions.is_none());
        assert_eq!(settings.region_timeout, Duration::from_secs(10));
    }

    #[test]
    fn cli_overrides_file() {
        let file = FileConfig {
            listen: Some("127.0.0.1:9000".into()),
            namespace: Some("filespace".into()),
            ..Default::default()
        };
        let cli = FileConfig {
            namespace: Some("clispace".into()),
            ..Default::default()
        };

        let settings = resolve(file, cli).unwrap();
        // File value survives where the CLI is silent.
        assert_eq!(settings.listen.port(), 9000);
        // CLI wins where both speak.
        assert_eq!(settings.namespace, "clispace");
    }

    #[test]
    fn invalid_listen_address_is_an_error() {
        let cli = FileConfig {
            listen: Some("not-an-addr".into()),
            ..Default::default()
        };
        assert!(resolve(FileConfig::default(), cli).is_err());
    }

    #[test]
    fn parses_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "listen = \"0.0.0.0:9400\"\nregions = [\"eu-west-1\", \"us-east-1\"]\nregion_timeout_secs = 5"
        )
        .unwrap();

        let parsed = FileConfig::from_file(file.path()).unwrap();
        let settings = resolve(parsed, FileConfig::default()).unwrap();
        assert_eq!(settings.listen.port(), 9400);
        assert_eq!(
            settings.regions,
            Some(vec!["eu-west-1".to_string(), "us-east-1".to_string()])
        );
        assert_eq!(settings.region_timeout, Duration::from_secs(5));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(FileConfig::from_file(Path::new("/nonexistent/rdsmond.toml")).is_err());
    }
}
