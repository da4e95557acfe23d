use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Configuration file structure for the exporter.
///
/// Loaded from the current directory or a path given on the command line. Every
/// value can be overridden by a command-line flag or environment variable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Jenkins API connection settings
    #[serde(default)]
    pub jenkins: JenkinsConfig,

    /// Polling and exposition settings
    #[serde(default)]
    pub exporter: ExporterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JenkinsConfig {
    /// Jenkins host name or address
    #[serde(default = "default_host")]
    pub host: String,

    /// Jenkins HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the JSON API endpoint
    #[serde(default = "default_path")]
    pub path: String,

    /// Use HTTPS instead of HTTP
    #[serde(default)]
    pub ssl: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Basic-auth user name
    pub username: Option<String>,

    /// Basic-auth password
    pub password: Option<String>,

    /// Jenkins API token, preferred over the password
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExporterConfig {
    /// Address the `/metrics` endpoint listens on
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Seconds between two polls of the Jenkins API
    #[serde(default = "default_update_rate_secs")]
    pub update_rate_secs: u64,

    /// Prefix of every published metric name
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Also publish skip/fail/total/pass test counts per build slot
    #[serde(default)]
    pub test_counts: bool,

    /// Default log filter when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
            ssl: false,
            timeout_secs: default_timeout_secs(),
            username: None,
            password: None,
            token: None,
        }
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            update_rate_secs: default_update_rate_secs(),
            namespace: default_namespace(),
            test_counts: false,
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_path() -> String {
    "/api/json".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_listen() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_update_rate_secs() -> u64 {
    30
}

fn default_namespace() -> String {
    "jenkins".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./jenkins-exporter.toml
    /// 3. ./jenkins-exporter.json
    /// 4. ./jenkins-exporter.yaml
    /// 5. ./jenkins-exporter.yml
    ///
    /// Returns default configuration if no file is found. A path given explicitly
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "jenkins-exporter.toml",
            "jenkins-exporter.json",
            "jenkins-exporter.yaml",
            "jenkins-exporter.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml" | "yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Checks values that would otherwise only fail once the exporter is running.
    pub fn validate(&self) -> Result<()> {
        if self.jenkins.host.trim().is_empty() {
            bail!("jenkins.host must not be empty");
        }
        if !self.jenkins.path.starts_with('/') {
            bail!("jenkins.path must start with '/': {}", self.jenkins.path);
        }
        if self.exporter.update_rate_secs == 0 {
            bail!("exporter.update-rate-secs must be greater than zero");
        }
        if !is_valid_metric_namespace(&self.exporter.namespace) {
            bail!(
                "exporter.namespace is not a valid metric name prefix: {}",
                self.exporter.namespace
            );
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.exporter
            .listen
            .parse()
            .with_context(|| format!("Invalid listen address: {}", self.exporter.listen))
    }
}

fn is_valid_metric_namespace(namespace: &str) -> bool {
    let mut chars = namespace.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
