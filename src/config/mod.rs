use std::env;
use std::str::FromStr;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbDriver {
    Sqlite,
    Postgres,
}

impl FromStr for DbDriver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(DbDriver::Sqlite),
            "postgres" | "postgresql" => Ok(DbDriver::Postgres),
            other => Err(ConfigError::UnsupportedDriver(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub role_name: String,
    pub env: String,
    pub db_driver: DbDriver,
    pub sqlite_path: String,
    /// Present only when `db_driver` is `Postgres`.
    pub postgres: Option<PostgresSettings>,
    pub db_max_connections: u32,
    pub app_host: String,
    pub app_port: u16,
    pub swagger_api_key: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key-value source. Missing keys fall back to defaults,
    /// except the PostgreSQL parameters which are mandatory for that driver.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let db_driver: DbDriver = get("DB_DRIVER", "sqlite").parse()?;

        let postgres = match db_driver {
            DbDriver::Sqlite => None,
            DbDriver::Postgres => {
                let require = |key: &str| {
                    lookup(key)
                        .filter(|value| !value.is_empty())
                        .ok_or_else(|| ConfigError::MissingRequired(key.to_string()))
                };
                Some(PostgresSettings {
                    host: require("DB_HOST")?,
                    port: parse_var("DB_PORT", &require("DB_PORT")?)?,
                    name: require("DB_NAME")?,
                    username: require("DB_USERNAME")?,
                    password: require("DB_PASSWORD")?,
                })
            }
        };

        Ok(Settings {
            role_name: get("ROLE_NAME", "employees-api-manager"),
            env: get("ENV", "dev"),
            db_driver,
            sqlite_path: get("DB_SQLITE_PATH", "db.sqlite"),
            postgres,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", &get("DB_MAX_CONNECTIONS", "10"))?,
            app_host: get("APP_HOST", "localhost"),
            app_port: parse_var("APP_PORT", &get("APP_PORT", "5000"))?,
            swagger_api_key: get("SWAGGER_API_KEY", "1234567"),
        })
    }

    pub fn database_url(&self) -> Result<String, ConfigError> {
        match (self.db_driver, &self.postgres) {
            (DbDriver::Sqlite, _) => Ok(format!("sqlite://{}?mode=rwc", self.sqlite_path)),
            (DbDriver::Postgres, Some(pg)) => {
                let mut url = Url::parse("postgres://localhost")
                    .map_err(|err| ConfigError::InvalidValue(format!("DB_HOST ({err})")))?;
                url.set_host(Some(&pg.host))
                    .map_err(|_| ConfigError::InvalidValue("DB_HOST".to_string()))?;
                url.set_port(Some(pg.port))
                    .map_err(|_| ConfigError::InvalidValue("DB_PORT".to_string()))?;
                url.set_username(&pg.username)
                    .map_err(|_| ConfigError::InvalidValue("DB_USERNAME".to_string()))?;
                url.set_password(Some(&pg.password))
                    .map_err(|_| ConfigError::InvalidValue("DB_PASSWORD".to_string()))?;
                url.set_path(&pg.name);
                Ok(url.to_string())
            }
            (DbDriver::Postgres, None) => Err(ConfigError::MissingRequired("DB_HOST".to_string())),
        }
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.app_host.clone(), self.app_port)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Unsupported DB_DRIVER: {0}")]
    UnsupportedDriver(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
