//! # Violation Tracker Shared Library
//!
//! This crate contains shared types, utilities, and business logic used by the
//! admin API server and the table bootstrap command.
//!
//! ## Module Organization
//!
//! - `auth`: Token claims, credential extraction and the admin gate
//! - `cache`: Field definition cache backends
//! - `db`: Connection pool, migrations and table bootstrap
//! - `mail`: SMTP configuration, transport, diagnostics and password reset mail
//! - `models`: Database models and data structures
//! - `redis`: Redis client wrapper

pub mod auth;
pub mod cache;
pub mod db;
pub mod mail;
pub mod models;
pub mod redis;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
