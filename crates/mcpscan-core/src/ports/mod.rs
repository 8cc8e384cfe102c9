//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the services expect from GitHub and
//! the external server catalogs.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` or API payload types in any signature
//! - One error type, [`GitHubPortError`], for every port
//! - All traits are `Send + Sync` and object-safe

pub mod alerts;
pub mod catalog;
pub mod error;
pub mod fetcher;
pub mod forks;
pub mod issues;
pub mod metadata;

pub use alerts::AlertSourcePort;
pub use catalog::CatalogSourcePort;
pub use error::{GitHubPortError, GitHubPortResult};
pub use fetcher::{MATERIALIZE_ATTEMPTS, RepositoryFetcherPort};
pub use forks::ForkManagerPort;
pub use issues::IssueTrackerPort;
pub use metadata::RepositoryMetadataPort;
