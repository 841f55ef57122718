//! Application configuration management.
//!
//! This module assembles the server address and the database topology (one
//! primary, two replicas, pool limits) from environment variables. Every
//! variable has a default; a value that is missing, empty, or fails to parse
//! falls back to that default, so loading never fails.

use std::fmt::{Debug, Display};
use std::time::Duration;

use crate::duration::parse_duration;
use crate::env::Env;

/// Top-level application configuration.
///
/// Built once at startup by [`Config::from_env`] and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

/// Address the HTTP server binds to.
///
/// # Environment Variables
///
/// - `SERVER_HOST` (optional): defaults to `0.0.0.0`
/// - `SERVER_PORT` (optional): defaults to `8080`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,

    /// Not range checked here; the bootstrap rejects values outside `u16`.
    pub port: i64,
}

/// Database topology: a writable primary, read replicas and pool limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub primary: DatabaseInstanceConfig,
    pub replicas: [DatabaseInstanceConfig; 2],
    pub pool: PoolConfig,
}

/// Connection parameters for a single PostgreSQL instance.
///
/// `database`, `user`, `password` and `ssl_mode` come from the shared
/// `DB_NAME`, `DB_USER`, `DB_PASSWORD` and `DB_SSLMODE` variables, so the
/// primary and its replicas always agree on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInstanceConfig {
    pub host: String,
    pub port: i64,
    pub database: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: String,
}

/// Connection pool limits.
///
/// # Environment Variables
///
/// - `DB_POOL_MIN_CONNECTIONS` (optional): defaults to 10
/// - `DB_POOL_MAX_CONNECTIONS` (optional): defaults to 100
/// - `DB_POOL_MAX_IDLE_TIME` (optional): duration literal, defaults to `30m`
/// - `DB_POOL_MAX_LIFETIME` (optional): duration literal, defaults to `1h`
///
/// `min_connections` may exceed `max_connections`; no relationship is enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub min_connections: i64,
    pub max_connections: i64,
    pub max_idle_time: Duration,
    pub max_lifetime: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::load(&Env::real())
    }

    /// Load configuration from the given environment source.
    ///
    /// This is the only place the environment is read.
    pub fn load(env: &Env) -> Self {
        let database = env_string(env, "DB_NAME", "userdb");
        let user = env_string(env, "DB_USER", "postgres");
        let password = env_string(env, "DB_PASSWORD", "postgres");
        let ssl_mode = env_string(env, "DB_SSLMODE", "disable");

        let instance = |host: String, port: i64| DatabaseInstanceConfig {
            host,
            port,
            database: database.clone(),
            user: user.clone(),
            password: password.clone(),
            ssl_mode: ssl_mode.clone(),
        };

        Self {
            server: ServerConfig {
                host: env_string(env, "SERVER_HOST", "0.0.0.0"),
                port: env_int(env, "SERVER_PORT", 8080),
            },
            database: DatabaseConfig {
                primary: instance(
                    env_string(env, "DB_PRIMARY_HOST", "localhost"),
                    env_int(env, "DB_PRIMARY_PORT", 5432),
                ),
                replicas: [
                    instance(
                        env_string(env, "DB_REPLICA1_HOST", "localhost"),
                        env_int(env, "DB_REPLICA1_PORT", 5433),
                    ),
                    instance(
                        env_string(env, "DB_REPLICA2_HOST", "localhost"),
                        env_int(env, "DB_REPLICA2_PORT", 5434),
                    ),
                ],
                pool: PoolConfig {
                    min_connections: env_int(env, "DB_POOL_MIN_CONNECTIONS", 10),
                    max_connections: env_int(env, "DB_POOL_MAX_CONNECTIONS", 100),
                    max_idle_time: env_duration(
                        env,
                        "DB_POOL_MAX_IDLE_TIME",
                        Duration::from_secs(30 * 60),
                    ),
                    max_lifetime: env_duration(
                        env,
                        "DB_POOL_MAX_LIFETIME",
                        Duration::from_secs(60 * 60),
                    ),
                },
            },
        }
    }
}

impl DatabaseInstanceConfig {
    /// PostgreSQL keyword/value connection string for this instance.
    ///
    /// Values are substituted verbatim, without quoting or escaping.
    pub fn dsn(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={} sslmode={}",
            self.host, self.port, self.user, self.password, self.database, self.ssl_mode,
        )
    }
}

fn env_string(env: &Env, key: &str, default: &str) -> String {
    env.var(key).unwrap_or_else(|| default.to_string())
}

fn env_int(env: &Env, key: &str, default: i64) -> i64 {
    lookup(env, key, default, str::parse::<i64>)
}

fn env_duration(env: &Env, key: &str, default: Duration) -> Duration {
    lookup(env, key, default, parse_duration)
}

/// Parse `key` with `parse`, or return `default` when it is absent or malformed.
fn lookup<T, E>(env: &Env, key: &str, default: T, parse: impl FnOnce(&str) -> Result<T, E>) -> T
where
    T: Debug,
    E: Display,
{
    let Some(raw) = env.var(key) else {
        return default;
    };

    match parse(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                key,
                value = %raw,
                default = ?default,
                error = %err,
                "Ignoring malformed environment variable, using default"
            );
            default
        }
    }
}
