//! # Violation Tracker Admin API Library
//!
//! Admin backend for the violation report form: field definition management,
//! the cached active-field feed and SMTP diagnostics.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
