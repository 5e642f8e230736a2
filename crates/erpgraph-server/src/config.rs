use erpgraph_auth::{PolicyConfig, PolicyRule};
use erpgraph_graphql::GraphQLConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub graphql: GraphQLConfig,
    /// Permission checks performed by the entity services
    #[serde(default)]
    pub auth: AuthSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.host.parse::<IpAddr>().is_err() {
            return Err(format!(
                "server.host must be an IP address, got {:?}",
                self.server.host
            ));
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        if self.logging.file.as_deref() == Some("") {
            return Err("logging.file must not be empty when set".into());
        }
        if self.logging.max_bytes == 0 {
            return Err("logging.max_bytes must be > 0".into());
        }
        self.graphql.validate()?;
        // Auth validation
        if self.auth.mode == AuthMode::Policy && self.auth.rules.is_empty() {
            return Err("auth.mode=policy requires at least one auth.rules entry".into());
        }
        Ok(())
    }

    /// Listen address. Call after [`AppConfig::validate`].
    pub fn addr(&self) -> Result<SocketAddr, String> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|e| format!("server.host {:?}: {e}", self.server.host))?;
        Ok(SocketAddr::from((host, self.server.port)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5000
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Plain-text copy of every log line, appended to this path
    #[serde(default)]
    pub file: Option<String>,
    /// Size at which the log file is rotated
    #[serde(default = "default_log_max_bytes")]
    pub max_bytes: u64,
    /// Rotated files kept as `<file>.1` .. `<file>.N`
    #[serde(default = "default_log_backups")]
    pub backups: usize,
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_max_bytes() -> u64 {
    1_000_000
}
fn default_log_backups() -> usize {
    5
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            max_bytes: default_log_max_bytes(),
            backups: default_log_backups(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Every actor, including anonymous callers, may do anything
    #[default]
    AllowAll,
    /// Role rules from `auth.rules`
    Policy,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthSettings {
    #[serde(default)]
    pub mode: AuthMode,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

impl AuthSettings {
    pub fn policy(&self) -> PolicyConfig {
        PolicyConfig {
            rules: self.rules.clone(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or("erpgraph.toml"));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., ERPGRAPH__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("ERPGRAPH")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
