//! Connection settings for the GitHub transport.

use std::time::Duration;

use boardsync_core::FieldNames;
use serde::{Deserialize, Serialize};

/// Public GitHub GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

/// Kind of account that owns the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    #[default]
    Organization,
    User,
}

impl OwnerType {
    /// Root field of the GraphQL schema for this owner kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerType::Organization => "organization",
            OwnerType::User => "user",
        }
    }
}

impl std::fmt::Display for OwnerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GitHub connection configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,
    /// Token sent as `Authorization: Bearer`. Never serialized.
    #[serde(skip_serializing, default)]
    pub token: String,
    /// Login of the organization or user that owns the project
    pub owner: String,
    pub owner_type: OwnerType,
    pub project_number: u64,
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Board field names, passed to the item query as variables
    pub fields: FieldNames,
}

impl GithubConfig {
    pub fn new(token: impl Into<String>, owner: impl Into<String>, project_number: u64) -> Self {
        GithubConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: token.into(),
            owner: owner.into(),
            owner_type: OwnerType::default(),
            project_number,
            user_agent: format!("boardsync/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            fields: FieldNames::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_owner_type(mut self, owner_type: OwnerType) -> Self {
        self.owner_type = owner_type;
        self
    }

    pub fn with_fields(mut self, fields: FieldNames) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("owner_type", &self.owner_type)
            .field("project_number", &self.project_number)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("fields", &self.fields)
            .finish()
    }
}
