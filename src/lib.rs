//! # Bedrock Admin Console
//!
//! A terminal console for an Amazon Bedrock token-profiling backend. A
//! signed-in user can invoke a hosted model and, with the administrator
//! address, review per-tenant usage and cost records collected by the
//! backend.
//!
//! ## Overview
//!
//! The console keeps user-supplied backend configuration in a local SQLite
//! store, holds one in-process session record for the signed-in user, and
//! drives a region-based terminal view: styled alerts, an identity block,
//! the invocation result, and the cost table. All backend traffic goes
//! through a small blocking HTTP client authenticated with an `Auth`
//! header.
//!
//! ## Features
//!
//! - `colors` (default): Enables terminal color output via owo-colors

/// Blocking client for the token-profiling REST API
pub mod api;

/// Identity provider seam and token discovery
pub mod auth;

/// Command-line argument parsing and configuration
pub mod cli;

/// Controller wiring between store, provider, API client, and view
pub mod console;

/// Configuration-driven form dialog
pub mod dialog;

/// Data models for the session, credentials, and cost records
pub mod models;

/// SQLite-backed credential persistence
pub mod store;

/// Utility functions for env parsing, input, and formatting
pub mod utils;

/// Region visibility, alerts, and table rendering
pub mod view;
