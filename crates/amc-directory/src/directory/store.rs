use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Company, CompanyFilter, PageWindow};
use crate::validation::NewCompany;

/// Read access to the company table so the listing service can be exercised in isolation.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Companies matching `filter`, ordered by name ascending.
    async fn find(&self, filter: &CompanyFilter, window: PageWindow)
        -> Result<Vec<Company>, StoreError>;

    async fn count(&self, filter: &CompanyFilter) -> Result<u64, StoreError>;
}

/// Schema and write access used by initialization and seeding.
#[async_trait]
pub trait SchemaStore: CompanyStore {
    /// Creates the company table and its indexes when absent.
    async fn create_tables(&self) -> Result<(), StoreError>;

    async fn has_company_table(&self) -> Result<bool, StoreError>;

    async fn insert(&self, company: &NewCompany) -> Result<(), StoreError>;

    /// Round trip to the server reporting its clock and version.
    async fn server_info(&self) -> Result<ServerInfo, StoreError>;
}

/// Answer to a connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub current_time: DateTime<Utc>,
    pub version: String,
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
