//! Database connection pools for the primary and its read replicas.
//!
//! This module turns a [`DatabaseConfig`] into sqlx PostgreSQL pools:
//! - One pool for the primary (writes)
//! - One pool per replica (reads)
//!
//! Creating the pools never waits on a connection. sqlx opens connections
//! in the background: on first use, and immediately up to `min_connections`
//! via its maintenance task.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{Pool, Postgres};

use crate::config::{DatabaseConfig, DatabaseInstanceConfig, PoolConfig};

/// Type alias for PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// The configuration loader accepts any value, so range errors surface here,
/// when the values are handed to sqlx.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("port {port} for database host {host:?} is out of range")]
    InvalidPort { host: String, port: i64 },

    #[error("pool setting {name} = {value} is out of range")]
    InvalidPoolLimit { name: &'static str, value: i64 },

    #[error("pool limits are inconsistent: min_connections {min} > max_connections {max}")]
    InconsistentPoolLimits { min: u32, max: u32 },

    #[error("invalid sslmode {mode:?}")]
    InvalidSslMode {
        mode: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Non-blocking pools for every instance of the database topology.
#[derive(Debug, Clone)]
pub struct DatabasePools {
    primary: DbPool,
    replicas: Vec<DbPool>,
}

impl DatabasePools {
    /// Build pools for the primary and each replica.
    ///
    /// Every pool shares the same limits from `config.pool`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A port does not fit in `u16`
    /// - A pool limit is negative, too large, or min exceeds max
    /// - An sslmode is not one sqlx understands
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, DbError> {
        let options = pool_options(&config.pool)?;

        let primary = options
            .clone()
            .connect_lazy_with(connect_options(&config.primary)?);

        let replicas = config
            .replicas
            .iter()
            .map(|replica| -> Result<DbPool, DbError> {
                Ok(options.clone().connect_lazy_with(connect_options(replica)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { primary, replicas })
    }

    /// Pool for the writable primary.
    pub fn primary(&self) -> &DbPool {
        &self.primary
    }

    /// Pools for the read replicas, in configuration order.
    pub fn replicas(&self) -> &[DbPool] {
        &self.replicas
    }
}

/// Translate pool limits into sqlx pool options.
fn pool_options(pool: &PoolConfig) -> Result<PgPoolOptions, DbError> {
    let limit = |name, value: i64| {
        u32::try_from(value).map_err(|_| DbError::InvalidPoolLimit { name, value })
    };

    let min = limit("min_connections", pool.min_connections)?;
    let max = limit("max_connections", pool.max_connections)?;
    // A pool with no connections could never serve an acquire.
    if max == 0 {
        return Err(DbError::InvalidPoolLimit {
            name: "max_connections",
            value: 0,
        });
    }
    if min > max {
        return Err(DbError::InconsistentPoolLimits { min, max });
    }

    Ok(PgPoolOptions::new()
        .min_connections(min)
        .max_connections(max)
        .idle_timeout(pool.max_idle_time)
        .max_lifetime(pool.max_lifetime))
}

/// Translate one instance into sqlx connect options.
///
/// Built field by field rather than from [`DatabaseInstanceConfig::dsn`],
/// since sqlx only parses URL-style connection strings.
///
/// Every field [`DatabaseInstanceConfig`] carries is set explicitly, plus the
/// application name. sqlx still fills the remaining options (for example
/// `PGSSLROOTCERT`, `PGOPTIONS`) from the `PG*` environment variables; that is
/// the one environment read outside [`crate::config::Config::load`].
fn connect_options(instance: &DatabaseInstanceConfig) -> Result<PgConnectOptions, DbError> {
    let port = u16::try_from(instance.port).map_err(|_| DbError::InvalidPort {
        host: instance.host.clone(),
        port: instance.port,
    })?;

    let ssl_mode = instance
        .ssl_mode
        .parse::<PgSslMode>()
        .map_err(|source| DbError::InvalidSslMode {
            mode: instance.ssl_mode.clone(),
            source,
        })?;

    Ok(PgConnectOptions::new_without_pgpass()
        .host(&instance.host)
        .port(port)
        .username(&instance.user)
        .password(&instance.password)
        .database(&instance.database)
        .ssl_mode(ssl_mode)
        .application_name(env!("CARGO_PKG_NAME")))
}
