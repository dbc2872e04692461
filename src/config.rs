//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between page requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of listing pages to visit
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Site-specific class token that marks a review container
    #[serde(default)]
    pub container_marker: Option<String>,

    /// Headers attached to every request
    #[serde(default)]
    pub headers: RequestHeaders,

    /// CSV output path
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// JSON output path
    #[serde(default = "default_json_path")]
    pub json_path: PathBuf,

    /// Console preview format
    #[serde(default)]
    pub format: OutputFormat,

    /// Number of reviews shown in the console preview
    #[serde(default = "default_preview")]
    pub preview: usize,
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_pages() -> u32 {
    5
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("reviews.csv")
}

fn default_json_path() -> PathBuf {
    PathBuf::from("reviews.json")
}

fn default_preview() -> usize {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: 0,
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
            container_marker: None,
            headers: RequestHeaders::default(),
            csv_path: default_csv_path(),
            json_path: default_json_path(),
            format: OutputFormat::Table,
            preview: default_preview(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("review-scraper").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("REVIEWS_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("REVIEWS_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(pages) = std::env::var("REVIEWS_PAGES") {
            if let Ok(p) = pages.parse() {
                self.max_pages = p;
            }
        }

        self
    }
}

/// Browser-like header set sent with every page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestHeaders {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub accept_encoding: String,
    pub connection: String,
}

impl Default for RequestHeaders {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            // Only encodings the client can decode (gzip and brotli features)
            accept_encoding: "gzip, br".to_string(),
            connection: "keep-alive".to_string(),
        }
    }
}

impl RequestHeaders {
    /// Returns the headers as (name, value) pairs in wire order.
    pub fn pairs(&self) -> [(&'static str, &str); 5] {
        [
            ("User-Agent", self.user_agent.as_str()),
            ("Accept", self.accept.as_str()),
            ("Accept-Language", self.accept_language.as_str()),
            ("Accept-Encoding", self.accept_encoding.as_str()),
            ("Connection", self.connection.as_str()),
        ]
    }
}

/// Console preview format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.delay_ms, 2000);
        assert_eq!(config.delay_jitter_ms, 0);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.format, OutputFormat::Table);
        assert_eq!(config.preview, 3);
        assert_eq!(config.csv_path, PathBuf::from("reviews.csv"));
        assert_eq!(config.json_path, PathBuf::from("reviews.json"));
        assert!(config.proxy.is_none());
        assert!(config.container_marker.is_none());
    }

    #[test]
    fn test_default_headers() {
        let headers = RequestHeaders::default();
        assert!(headers.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(headers.connection, "keep-alive");

        let names: Vec<_> = headers.pairs().iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["User-Agent", "Accept", "Accept-Language", "Accept-Encoding", "Connection"]
        );
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("Csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "markdown".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
        assert!(err.contains("table, json, csv"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            delay_ms = 500
            max_pages = 12
            container_marker = "_27M-vq"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.delay_ms, 500);
        assert_eq!(config.max_pages, 12);
        assert_eq!(config.container_marker.as_deref(), Some("_27M-vq"));
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.headers, RequestHeaders::default());
    }

    #[test]
    fn test_config_partial_headers() {
        let toml = r#"
            [headers]
            user_agent = "custom-agent/1.0"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.headers.user_agent, "custom-agent/1.0");
        assert_eq!(config.headers.connection, "keep-alive");
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            timeout_secs = 30
            csv_path = "out/r.csv"
            format = "json"
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.csv_path, PathBuf::from("out/r.csv"));
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_pages = 2").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.max_pages, 2);
    }

    /// Sets environment variables for the lifetime of the guard.
    struct EnvGuard {
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            let saved = vars.iter().map(|(key, _)| (*key, std::env::var(key).ok())).collect();
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
            Self { saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.saved {
                match value {
                    Some(v) => std::env::set_var(key, v),
                    None => std::env::remove_var(key),
                }
            }
        }
    }

    // One test owns the REVIEWS_* variables so parallel tests never race on them
    #[test]
    fn test_config_with_env() {
        {
            let _env = EnvGuard::set(&[
                ("REVIEWS_PROXY", "http://proxy:8080"),
                ("REVIEWS_DELAY", "750"),
                ("REVIEWS_PAGES", "9"),
            ]);

            let config = Config::new().with_env();
            assert_eq!(config.proxy, Some("http://proxy:8080".to_string()));
            assert_eq!(config.delay_ms, 750);
            assert_eq!(config.max_pages, 9);

            // Environment wins over values read from a file
            let mut file = NamedTempFile::new().unwrap();
            writeln!(file, "max_pages = 2\ndelay_ms = 100").unwrap();
            let config = Config::load(Some(file.path())).unwrap().with_env();
            assert_eq!(config.max_pages, 9);
            assert_eq!(config.delay_ms, 750);
        }

        {
            let _env = EnvGuard::set(&[("REVIEWS_DELAY", "soon"), ("REVIEWS_PAGES", "-3")]);

            // Unparseable values leave the defaults alone
            let config = Config::new().with_env();
            assert_eq!(config.delay_ms, 2000);
            assert_eq!(config.max_pages, 5);
        }
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = Config {
            container_marker: Some("_2wzgFH".to_string()),
            headers: RequestHeaders {
                accept_language: "hi-IN,hi;q=0.9".to_string(),
                ..RequestHeaders::default()
            },
            format: OutputFormat::Csv,
            ..Config::default()
        };

        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("[headers]"));

        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.container_marker.as_deref(), Some("_2wzgFH"));
        assert_eq!(parsed.headers.accept_language, "hi-IN,hi;q=0.9");
        assert_eq!(parsed.format, OutputFormat::Csv);
        assert_eq!(parsed.max_pages, 5);
    }
}
