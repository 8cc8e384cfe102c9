//! Domain types shared by the engine, the ports and the services.

mod alerts;
mod repository;
mod runtime;

pub use alerts::{CodeScanningAlert, DependabotAlert, SecretScanningAlert};
pub use repository::{
    NewIssue, PropertyMap, RateLimitStatus, RepositoryDetails, RepositoryProperties,
    RepositorySummary,
};
pub use runtime::{McpComposition, RuntimeInfo, ServerSpec, ServerType};
