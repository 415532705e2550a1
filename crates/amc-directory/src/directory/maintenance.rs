use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::domain::CompanyFilter;
use super::seed::default_companies;
use super::store::{SchemaStore, ServerInfo, StoreError};
use crate::config::{AppEnvironment, DatabaseConfig};
use crate::validation::{validate_company_data, NewCompany, ValidationErrors};

/// Connection coordinates echoed by the connectivity probe. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSummary {
    pub user: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl From<&DatabaseConfig> for ConnectionSummary {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            user: config.user.clone(),
            host: config.host.clone(),
            port: config.port,
            database: config.database.clone(),
        }
    }
}

/// Body of `GET /api/test-connection`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionProbe {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ServerInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub environment: ConnectionSummary,
}

/// Body of `GET /api/init-db`. `timestamp` is always reported; `error` only
/// in development.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub success: bool,
    pub connected: bool,
    pub has_required_tables: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitOutcome {
    /// Rows present before seeding was considered.
    pub existing: u64,
    pub seeded: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum MaintenanceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("seed company is invalid: {0}")]
    InvalidSeed(ValidationErrors),
}

/// Schema creation, seeding, and diagnostics over a [`SchemaStore`].
pub struct DatabaseMaintenance<S> {
    store: Arc<S>,
    connection: ConnectionSummary,
    environment: AppEnvironment,
}

impl<S> DatabaseMaintenance<S>
where
    S: SchemaStore + 'static,
{
    pub fn new(store: Arc<S>, connection: ConnectionSummary, environment: AppEnvironment) -> Self {
        Self {
            store,
            connection,
            environment,
        }
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Creates the table and indexes, then seeds the built-in companies if the
    /// table is empty. Safe to run repeatedly.
    pub async fn initialize(&self) -> Result<InitOutcome, MaintenanceError> {
        let seed = default_companies()
            .iter()
            .map(validate_company_data)
            .collect::<Result<Vec<_>, _>>()
            .map_err(MaintenanceError::InvalidSeed)?;

        self.store.create_tables().await?;
        let existing = self.store.count(&CompanyFilter::default()).await?;

        let seeded = if existing == 0 {
            self.insert_all(&seed).await?
        } else {
            0
        };

        info!(existing, seeded, "database initialized");
        Ok(InitOutcome { existing, seeded })
    }

    /// Inserts already validated companies, returning how many were written.
    pub async fn import(&self, companies: &[NewCompany]) -> Result<usize, MaintenanceError> {
        self.store.create_tables().await?;
        let inserted = self.insert_all(companies).await?;
        info!(inserted, "imported companies");
        Ok(inserted)
    }

    async fn insert_all(&self, companies: &[NewCompany]) -> Result<usize, StoreError> {
        for company in companies {
            self.store.insert(company).await?;
        }
        Ok(companies.len())
    }

    pub async fn check_health(&self) -> DatabaseHealth {
        let timestamp = Utc::now();

        let connected = match self.store.server_info().await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "database health check could not connect");
                return DatabaseHealth {
                    success: false,
                    connected: false,
                    has_required_tables: false,
                    message: "Database connection failed".to_string(),
                    timestamp,
                    error: self.detail(&err),
                };
            }
        };

        match self.store.has_company_table().await {
            Ok(true) => DatabaseHealth {
                success: true,
                connected,
                has_required_tables: true,
                message: "Database is healthy".to_string(),
                timestamp,
                error: None,
            },
            Ok(false) => DatabaseHealth {
                success: true,
                connected,
                has_required_tables: false,
                message: "Database needs initialization".to_string(),
                timestamp,
                error: None,
            },
            Err(err) => {
                error!(error = %err, "database health check failed");
                DatabaseHealth {
                    success: false,
                    connected,
                    has_required_tables: false,
                    message: "Database health check failed".to_string(),
                    timestamp,
                    error: self.detail(&err),
                }
            }
        }
    }

    pub async fn test_connection(&self) -> ConnectionProbe {
        match self.store.server_info().await {
            Ok(info) => {
                info!(version = %info.version, "database connection succeeded");
                ConnectionProbe {
                    success: true,
                    message: "Database connection successful".to_string(),
                    data: Some(info),
                    error: None,
                    environment: self.connection.clone(),
                }
            }
            Err(err) => {
                error!(error = %err, "database connection failed");
                ConnectionProbe {
                    success: false,
                    message: "Database connection failed".to_string(),
                    data: None,
                    error: self.detail(&err),
                    environment: self.connection.clone(),
                }
            }
        }
    }

    fn detail(&self, err: &StoreError) -> Option<String> {
        self.environment
            .exposes_error_details()
            .then(|| err.to_string())
    }
}
