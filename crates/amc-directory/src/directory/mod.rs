//! Company directory: listing, rate limiting, persistence, and database maintenance.

pub mod domain;
pub mod maintenance;
pub mod postgres;
pub mod rate_limit;
pub mod router;
pub mod seed;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{Company, CompanyFilter, CompanyId, CompanyPage, PageWindow, PaginationSummary};
pub use maintenance::{
    ConnectionProbe, ConnectionSummary, DatabaseHealth, DatabaseMaintenance, InitOutcome,
    MaintenanceError,
};
pub use postgres::{connect_lazy, PgCompanyStore, COMPANY_TABLE};
pub use rate_limit::{
    client_key, FixedWindowLimiter, InMemoryRateLimitStore, RateLimitDecision, RateLimitError,
    RateLimitStore,
};
pub use router::{directory_router, maintenance_router};
pub use seed::{default_companies, CompanyImporter, ImportError, ImportReport, RejectedRow};
pub use service::{CompanyDirectory, ListingError, ListingQuery};
pub use store::{CompanyStore, SchemaStore, ServerInfo, StoreError};
