//! Configuration management for the presigned upload server

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Lifetime of signed part URLs: 3 hours
pub const DEFAULT_PART_EXPIRY_SECS: u64 = 3 * 60 * 60;

/// Lifetime of single-shot upload URLs: 15 minutes
pub const DEFAULT_SINGLE_EXPIRY_SECS: u64 = 15 * 60;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_OBJECT_ACL: &str = "public-read";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub presign: PresignConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Custom S3-compatible endpoint (MinIO, R2, ...)
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    /// Canned ACL applied to new objects, `None` to leave the bucket default
    pub object_acl: Option<String>,
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct PresignConfig {
    pub part_expiry: Duration,
    pub single_expiry: Duration,
}

impl Default for PresignConfig {
    fn default() -> Self {
        Self {
            part_expiry: Duration::from_secs(DEFAULT_PART_EXPIRY_SECS),
            single_expiry: Duration::from_secs(DEFAULT_SINGLE_EXPIRY_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let port = match optional("PORT").or_else(|| optional("SERVER_PORT")) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => 3000,
        };

        let endpoint = optional("S3_ENDPOINT").map(|e| e.trim_end_matches('/').to_string());

        let force_path_style = match optional("S3_FORCE_PATH_STYLE") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid {
                name: "S3_FORCE_PATH_STYLE",
                value,
            })?,
            None => endpoint.is_some(),
        };

        // An explicitly empty ACL disables it, an unset one keeps the default.
        let object_acl = match lookup("S3_OBJECT_ACL") {
            Some(acl) if acl.trim().is_empty() => None,
            Some(acl) => Some(acl.trim().to_string()),
            None => Some(DEFAULT_OBJECT_ACL.to_string()),
        };

        Ok(Config {
            server: ServerConfig {
                host: optional("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
            },
            storage: StorageConfig {
                bucket: required("AWS_S3_BUCKET_NAME")?,
                region: optional("AWS_S3_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
                access_key: required("AWS_ACCESS_KEY_ID")?,
                secret_key: required("AWS_SECRET_ACCESS_KEY")?,
                endpoint,
                force_path_style,
                object_acl,
                public_base_url: optional("PUBLIC_BASE_URL"),
            },
            presign: PresignConfig {
                part_expiry: parse_secs(
                    "PRESIGN_EXPIRY_SECS",
                    optional("PRESIGN_EXPIRY_SECS"),
                    DEFAULT_PART_EXPIRY_SECS,
                )?,
                single_expiry: parse_secs(
                    "SINGLE_PRESIGN_EXPIRY_SECS",
                    optional("SINGLE_PRESIGN_EXPIRY_SECS"),
                    DEFAULT_SINGLE_EXPIRY_SECS,
                )?,
            },
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.server.host, self.server.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            name: "SERVER_HOST",
            value: raw,
        })
    }
}

impl StorageConfig {
    /// Base URL objects are publicly reachable under, without a trailing slash.
    pub fn public_base_url(&self) -> String {
        if let Some(base) = &self.public_base_url {
            return base.trim_end_matches('/').to_string();
        }

        match &self.endpoint {
            Some(endpoint) => format!("{}/{}", endpoint, self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_secs(
    name: &'static str,
    value: Option<String>,
    default: u64,
) -> Result<Duration, ConfigError> {
    match value {
        Some(value) => match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::Invalid { name, value }),
        },
        None => Ok(Duration::from_secs(default)),
    }
}
