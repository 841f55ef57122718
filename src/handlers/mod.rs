//! HTTP request handlers.

/// Health check endpoint
pub mod health;
