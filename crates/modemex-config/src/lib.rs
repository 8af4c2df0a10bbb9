//! Configuration for the modem exporter.
//!
//! Layered loading (defaults, optional TOML file, `MODEM_*` environment,
//! bare `PORT`), password resolution, and translation into
//! `modemex_api::ModemConfig`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use modemex_api::{ModemConfig, TlsMode, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured (set `password` or `password_file`)")]
    NoCredentials,

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Everything needed to reach one device and serve its metrics.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Device vendor, e.g. "Huawei".
    pub vendor: Option<String>,

    /// Device model, e.g. "EG8141A5".
    pub model: Option<String>,

    /// Base URL of the device's web UI (e.g., "http://192.168.100.1").
    pub url: Option<String>,

    /// Web UI login name.
    pub user: Option<String>,

    /// Web UI password (plaintext; prefer `password_file`).
    pub password: Option<String>,

    /// File whose trimmed contents are the password.
    pub password_file: Option<PathBuf>,

    /// Accept any TLS certificate the device presents.
    #[serde(default)]
    pub insecure: bool,

    /// Extra CA certificate (PEM) to trust.
    pub ca_cert: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Address the metrics server binds to.
    #[serde(default = "default_listen")]
    pub listen: IpAddr,

    /// Port the metrics server binds to.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vendor: None,
            model: None,
            url: None,
            user: None,
            password: None,
            password_file: None,
            insecure: false,
            ca_cert: None,
            timeout: default_timeout(),
            listen: default_listen(),
            port: default_port(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_listen() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}
fn default_port() -> u16 {
    8080
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the default config file path via platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "modemex", "modemex").map_or_else(
        || PathBuf::from("modemex.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load configuration from defaults, a TOML file, and the environment.
///
/// With `path` set the file must exist; otherwise the platform default
/// path is read if present.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) if !p.is_file() => {
            return Err(ConfigError::NotFound {
                path: p.to_path_buf(),
            });
        }
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };

    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&file))
        .merge(Env::prefixed("MODEM_"))
        .merge(Env::raw().only(&["PORT"]))
        .extract()?;
    Ok(config)
}

// ── Resolution ──────────────────────────────────────────────────────

impl Config {
    /// The `(vendor, model)` pair used to pick an adapter.
    pub fn device(&self) -> Result<(&str, &str), ConfigError> {
        Ok((
            required(self.vendor.as_deref(), "vendor")?,
            required(self.model.as_deref(), "model")?,
        ))
    }

    /// Resolve the login password: inline `password`, then `password_file`.
    pub fn resolve_password(&self) -> Result<SecretString, ConfigError> {
        if let Some(ref pw) = self.password {
            return Ok(SecretString::from(pw.clone()));
        }

        if let Some(ref file) = self.password_file {
            let contents = std::fs::read_to_string(file)?;
            return Ok(SecretString::from(contents.trim().to_owned()));
        }

        Err(ConfigError::NoCredentials)
    }

    /// Build the adapter configuration.
    pub fn to_modem_config(&self) -> Result<ModemConfig, ConfigError> {
        let raw = required(self.url.as_deref(), "url")?;
        let base_url = Url::parse(raw).map_err(|e| ConfigError::Validation {
            field: "url".into(),
            reason: format!("{e}: {raw}"),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "url".into(),
                reason: format!("expected http or https, got '{}'", base_url.scheme()),
            });
        }

        let username = required(self.user.as_deref(), "user")?.to_owned();
        let password = self.resolve_password()?;

        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least one second".into(),
            });
        }

        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca) = self.ca_cert {
            TlsMode::CustomCa(ca.clone())
        } else {
            TlsMode::System
        };

        Ok(ModemConfig {
            base_url,
            username,
            password,
            transport: TransportConfig {
                tls,
                timeout: Duration::from_secs(self.timeout),
                ..TransportConfig::default()
            },
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen, self.port)
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::Validation {
            field: field.into(),
            reason: "missing".into(),
        })
}
