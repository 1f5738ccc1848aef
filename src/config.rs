use std::env;
use std::fmt;

use sqlx::postgres::PgConnectOptions;

/// Directory the seed CSV files are read from unless overridden
pub const DEFAULT_RAW_DATA_DIR: &str = "/usr/app/dbt_project/database/raw_data";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variables: {}", .0.join(", "))]
    MissingVars(Vec<&'static str>),
    #[error("invalid DB_PORT value '{0}'")]
    InvalidPort(String),
}

/// PostgreSQL connection settings.
///
/// Values are read without validation; missing ones only surface when
/// [`DbConfig::connect_options`] is called right before connecting.
#[derive(Clone, Default)]
pub struct DbConfig {
    pub host: Option<String>,
    pub port: Option<String>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl DbConfig {
    pub fn from_env() -> Self {
        DbConfig {
            host: env::var("DB_HOST").ok(),
            port: env::var("DB_PORT").ok(),
            database: env::var("DB_DATABASE").ok(),
            user: env::var("DB_USER").ok(),
            password: env::var("DB_PASSWORD").ok(),
        }
    }

    /// Names of the `DB_*` variables that were not set
    pub fn missing_vars(&self) -> Vec<&'static str> {
        [
            ("DB_HOST", &self.host),
            ("DB_PORT", &self.port),
            ("DB_DATABASE", &self.database),
            ("DB_USER", &self.user),
            ("DB_PASSWORD", &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let (Some(host), Some(port), Some(database), Some(user), Some(password)) = (
            &self.host,
            &self.port,
            &self.database,
            &self.user,
            &self.password,
        ) else {
            return Err(ConfigError::MissingVars(self.missing_vars()));
        };

        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port.clone()))?;

        Ok(PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(database)
            .username(user)
            .password(password))
    }

    /// Connection URL with the password masked, for log lines
    pub fn redacted_url(&self) -> String {
        let part = |value: &Option<String>| value.clone().unwrap_or_else(|| "<unset>".to_string());
        let password = if self.password.is_some() { "***" } else { "<unset>" };
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            part(&self.user),
            password,
            part(&self.host),
            part(&self.port),
            part(&self.database)
        )
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Database flags shared by the command line tools, each falling back to
/// its `DB_*` environment variable
#[derive(Debug, Clone, clap::Args)]
pub struct DbArgs {
    /// Database host
    #[arg(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    /// Database port
    #[arg(long, env = "DB_PORT")]
    pub db_port: Option<String>,

    /// Database name
    #[arg(long, env = "DB_DATABASE")]
    pub db_database: Option<String>,

    /// Database user
    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,
}

impl From<DbArgs> for DbConfig {
    fn from(args: DbArgs) -> Self {
        DbConfig {
            host: args.db_host,
            port: args.db_port,
            database: args.db_database,
            user: args.db_user,
            password: args.db_password,
        }
    }
}
