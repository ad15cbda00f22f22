//! boardsync-github: GitHub Projects (v2) transport for boardsync
//!
//! Implements [`boardsync_core::ProjectSource`] over the GitHub GraphQL API
//! with `reqwest`. Every call is a single HTTPS POST; pagination, retries of
//! whole runs and error policy stay in the core.
//!
//! ```ignore
//! let config = GithubConfig::new(token, "acme", 7).with_owner_type(OwnerType::Organization);
//! let client = GithubClient::new(config)?;
//! let report = Orchestrator::new(&client, &TracingSink, SyncConfig::default()).run().await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod queries;
pub mod wire;

pub use client::GithubClient;
pub use config::{GithubConfig, OwnerType, DEFAULT_ENDPOINT};
pub use error::GithubError;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, GithubError>;
