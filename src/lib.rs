//! Environment-driven configuration for the user service.
//!
//! [`config::Config::from_env`] reads the server address and database
//! topology once at startup. The remaining modules consume that value:
//! [`db`] builds connection pools and [`handlers`] serves the health check.

pub mod config;
pub mod db;
pub mod duration;
pub mod env;
pub mod error;
pub mod handlers;
