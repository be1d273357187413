use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub sync: SyncConfig,
    pub freebusy: FreeBusyConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    SingleUser,
    Proxy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    pub proxy: Option<ProxyAuthConfig>,
    pub single_user: Option<SingleUserAuthConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyAuthConfig {
    /// Header carrying the user name asserted by the fronting proxy.
    pub header: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SingleUserAuthConfig {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub serve_origin: Option<String>,
    /// Upper bound for PROPFIND/REPORT/PUT request bodies, in bytes.
    pub max_body_bytes: u64,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the server address as a string in the format "host:port".
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// ## Summary
    /// Returns the server origin URL.
    #[must_use]
    pub fn origin(&self) -> String {
        if let Some(origin) = &self.serve_origin {
            origin.clone()
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Clone, Deserialize)]
pub struct SyncConfig {
    /// Mixed into sync-token checksums so tokens from another deployment fail to decode.
    pub token_salt: String,
    /// How long tombstones are kept before the store may purge them.
    pub tombstone_retention_days: u32,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("token_salt", &"<redacted>")
            .field("tombstone_retention_days", &self.tombstone_retention_days)
            .finish()
    }
}

impl SyncConfig {
    #[must_use]
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.tombstone_retention_days))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FreeBusyConfig {
    /// Merge overlapping busy periods into a minimal set.
    pub merge_periods: bool,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8698)?
            .set_default("server.max_body_bytes", 1_048_576)?
            .set_default("logging.level", "debug")?
            .set_default("auth.method", "single_user")?
            .set_default("auth.single_user.name", "admin")?
            .set_default("auth.single_user.email", "admin@localhost")?
            .set_default("sync.token_salt", "kunai")?
            .set_default("sync.tombstone_retention_days", 90)?
            .set_default("freebusy.merge_periods", true)?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks cross-field constraints the deserializer cannot express.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidConfiguration` when the selected auth method
    /// has no matching section, or the body limit is zero.
    pub fn validate(&self) -> CoreResult<()> {
        match self.auth.method {
            AuthMethod::SingleUser if self.auth.single_user.is_none() => {
                return Err(CoreError::InvalidConfiguration(
                    "auth.method is single_user but auth.single_user is missing".to_string(),
                ));
            }
            AuthMethod::Proxy if self.auth.proxy.is_none() => {
                return Err(CoreError::InvalidConfiguration(
                    "auth.method is proxy but auth.proxy.header is missing".to_string(),
                ));
            }
            AuthMethod::SingleUser | AuthMethod::Proxy => {}
        }

        if self.server.max_body_bytes == 0 {
            return Err(CoreError::InvalidConfiguration(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// ## Summary
    /// Settings suitable for tests and embedded use: single user `admin`,
    /// 1 MiB body limit, merged free-busy periods.
    #[must_use]
    pub fn for_single_user(name: &str) -> Self {
        Self {
            auth: AuthConfig {
                method: AuthMethod::SingleUser,
                proxy: None,
                single_user: Some(SingleUserAuthConfig {
                    name: name.to_string(),
                    email: format!("{name}@localhost"),
                }),
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8698,
                serve_origin: None,
                max_body_bytes: 1_048_576,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
            },
            sync: SyncConfig {
                token_salt: "kunai".to_string(),
                tombstone_retention_days: 90,
            },
            freebusy: FreeBusyConfig {
                merge_periods: true,
            },
        }
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    tracing::debug!(
        host = %settings.server.host,
        port = settings.server.port,
        "Configuration loaded"
    );
    Ok(settings)
}
