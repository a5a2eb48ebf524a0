use std::{collections::HashMap, fmt, path::PathBuf};

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSTORE_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSTORE_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKSTORE";
const ENV_SEPARATOR: &str = "__";

/// Flat variable names accepted alongside the `BOOKSTORE__*` form.
const FLAT_OVERRIDES: &[(&str, &str)] = &[
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_NAME", "database.name"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("SECRET_KEY", "secret_key"),
];

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// A configuration value that must never show up in logs.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Top-level configuration structure loaded from layered sources.
///
/// Immutable once loaded; the process holds one instance for its lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    pub secret_key: Secret,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay
    /// and process variables.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build settings from an explicit variable map instead of the process
    /// environment.
    pub fn from_vars(vars: &HashMap<String, String>) -> anyhow::Result<Self> {
        let environment = vars
            .get(ENV_VAR_NAME)
            .map(String::as_str)
            .unwrap_or(DEFAULT_ENV);
        let environment = Environment::parse(environment)?;

        let config_dir = match vars.get(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            // Default to repo root `config` directory.
            None => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment.as_str()));

        let mut builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .source(Some(vars.clone())),
            );

        for (var, key) in FLAT_OVERRIDES {
            builder = builder
                .set_override_option(*key, vars.get(*var).cloned())
                .with_context(|| format!("failed to apply {var}"))?;
        }

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = environment;
        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let required = [
            ("database.host", self.database.host.as_str()),
            ("database.name", self.database.name.as_str()),
            ("database.user", self.database.user.as_str()),
            ("database.password", self.database.password.expose()),
            ("secret_key", self.secret_key.expose()),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                bail!("configuration value '{key}' must not be empty");
            }
        }
        if !matches!(self.database.scheme.as_str(), "postgres" | "postgresql") {
            bail!(
                "configuration value 'database.scheme' must be 'postgres' or 'postgresql', got '{}'",
                self.database.scheme
            );
        }
        if self.database.port == 0 {
            bail!("configuration value 'database.port' must be non-zero");
        }
        if self.database.max_connections == 0 {
            bail!("configuration value 'database.max_connections' must be non-zero");
        }
        if !self.server.base_path.is_empty() && !self.server.base_path.starts_with('/') {
            bail!("configuration value 'server.base_path' must start with '/'");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Prefix prepended to every module route; empty mounts at the root.
    #[serde(default)]
    pub base_path: String,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
            base_path: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_scheme")]
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: Secret,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "DatabaseSettings::default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl DatabaseSettings {
    fn default_scheme() -> String {
        "postgres".to_string()
    }

    fn default_max_connections() -> u32 {
        5
    }

    fn default_acquire_timeout_secs() -> u64 {
        5
    }

    /// `<scheme>://<user>:<password>@<host>:<port>/<database>`
    pub fn connection_url(&self) -> String {
        self.render_url(self.password.expose())
    }

    /// Connection URL with the password masked, safe for logs.
    pub fn redacted_url(&self) -> String {
        self.render_url("***")
    }

    fn render_url(&self, password: &str) -> String {
        format!(
            "{}://{}:{}@{}:{}/{}",
            self.scheme, self.user, password, self.host, self.port, self.name
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Fallback filter directive when `RUST_LOG` is unset.
    #[serde(default = "TelemetrySettings::default_log_filter")]
    pub log_filter: String,
}

impl TelemetrySettings {
    fn default_log_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_filter: Self::default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
