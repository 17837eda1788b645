use anyhow::Result;
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use crate::constants::{DEFAULT_PROXY_USER_HEADER, DEFAULT_SAFETY_CAP};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub expansion: ExpansionConfig,
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

impl AuthConfig {
    /// ## Summary
    /// Returns the header a trusted reverse proxy puts the user id in.
    #[must_use]
    pub fn proxy_header(&self) -> &str {
        self.proxy
            .as_ref()
            .map_or(DEFAULT_PROXY_USER_HEADER, |proxy| proxy.header.as_str())
    }

    /// ## Summary
    /// Returns the configured owner for single-user deployments.
    ///
    /// ## Errors
    /// Returns an error if the method is `single_user` but no user is configured.
    pub fn single_user_id(&self) -> CoreResult<uuid::Uuid> {
        self.single_user
            .as_ref()
            .map(|single| single.user_id)
            .ok_or_else(|| {
                CoreError::InvalidConfiguration(
                    "auth.single_user.user_id is required for the single_user method".to_string(),
                )
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyAuthConfig {
    #[serde(default = "default_proxy_header")]
    pub header: String,
}

fn default_proxy_header() -> String {
    DEFAULT_PROXY_USER_HEADER.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SingleUserAuthConfig {
    pub user_id: uuid::Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address as a string in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Limits applied while expanding recurring events.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ExpansionConfig {
    /// Maximum occurrences generated per template per request.
    pub safety_cap: u32,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            safety_cap: DEFAULT_SAFETY_CAP,
        }
    }
}

impl Settings {
    /// ## Summary
    /// Returns a configuration builder pre-populated with every default value.
    ///
    /// ## Errors
    /// Returns an error if a default cannot be registered.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8698)?
            .set_default("database.max_connections", 4)?
            .set_default("logging.level", "debug")?
            .set_default("auth.method", "proxy")?
            .set_default("expansion.safety_cap", i64::from(DEFAULT_SAFETY_CAP))?)
    }

    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `config.toml` values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let settings = Self::builder()?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env, e.g. DATABASE__URL or EXPANSION__SAFETY_CAP
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Self>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks cross-field constraints `serde` cannot express.
    ///
    /// ## Errors
    /// Returns an error if the safety cap is zero or the single-user method has no user.
    pub fn validate(&self) -> CoreResult<()> {
        if self.expansion.safety_cap == 0 {
            return Err(CoreError::InvalidConfiguration(
                "expansion.safety_cap must be at least 1".to_string(),
            ));
        }
        if self.auth.method == AuthMethod::SingleUser {
            self.auth.single_user_id()?;
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<Settings> {
        Ok(Settings::builder()?
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    #[test_log::test]
    fn test_defaults_fill_missing_sections() {
        let settings = from_toml(
            r#"
            [database]
            url = "postgres://localhost/almanac"
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.bind_addr(), "0.0.0.0:8698");
        assert_eq!(settings.database.max_connections, 4);
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.auth.method, AuthMethod::Proxy);
        assert_eq!(settings.auth.proxy_header(), DEFAULT_PROXY_USER_HEADER);
        assert_eq!(settings.expansion.safety_cap, DEFAULT_SAFETY_CAP);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_single_user_requires_user_id() {
        let settings = from_toml(
            r#"
            [database]
            url = "postgres://localhost/almanac"

            [auth]
            method = "single_user"
            "#,
        )
        .unwrap();

        assert!(matches!(
            settings.validate(),
            Err(CoreError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_single_user_and_custom_cap() {
        let settings = from_toml(
            r#"
            [database]
            url = "postgres://localhost/almanac"

            [auth]
            method = "single_user"

            [auth.single_user]
            user_id = "0191e7a4-7c1e-7d3a-9d4e-1b2c3d4e5f60"

            [expansion]
            safety_cap = 50
            "#,
        )
        .unwrap();

        assert!(settings.validate().is_ok());
        assert_eq!(settings.expansion.safety_cap, 50);
        assert_eq!(
            settings.auth.single_user_id().unwrap().to_string(),
            "0191e7a4-7c1e-7d3a-9d4e-1b2c3d4e5f60"
        );
    }

    #[test]
    fn test_zero_cap_rejected() {
        let settings = from_toml(
            r#"
            [database]
            url = "postgres://localhost/almanac"

            [expansion]
            safety_cap = 0
            "#,
        )
        .unwrap();

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_custom_proxy_header() {
        let settings = from_toml(
            r#"
            [database]
            url = "postgres://localhost/almanac"

            [auth.proxy]
            header = "x-forwarded-user"
            "#,
        )
        .unwrap();

        assert_eq!(settings.auth.proxy_header(), "x-forwarded-user");
    }
}
