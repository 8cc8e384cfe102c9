#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// DefaultGitHubClient is used through the core port traits, not its
// internal generic structure
#![allow(private_interfaces)]

mod archive;
mod client;
mod config;
mod error;
mod http;
mod models;
mod port;
mod url;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::DefaultGitHubClient;

// Configuration
pub use config::{DEFAULT_API_URL, GitHubClientConfig};

// Errors surfaced by client construction
pub use error::GitHubError;
