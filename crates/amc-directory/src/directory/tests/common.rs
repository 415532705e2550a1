use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::config::{AppEnvironment, RateLimitConfig};
use crate::directory::domain::{Company, CompanyFilter, CompanyId, PageWindow};
use crate::directory::maintenance::{ConnectionSummary, DatabaseMaintenance};
use crate::directory::rate_limit::{
    FixedWindowLimiter, InMemoryRateLimitStore, RateLimitError, RateLimitStore,
};
use crate::directory::service::CompanyDirectory;
use crate::directory::store::{CompanyStore, SchemaStore, ServerInfo, StoreError};
use crate::validation::NewCompany;

/// In-process company table with the same ordering and filtering as the SQL store.
#[derive(Default)]
pub(super) struct MemoryCompanyStore {
    companies: Mutex<Vec<Company>>,
    table_created: AtomicBool,
    pub(super) find_calls: AtomicUsize,
}

impl MemoryCompanyStore {
    pub(super) fn with_companies(companies: &[(&str, &str)]) -> Self {
        let store = Self::default();
        store.table_created.store(true, Ordering::SeqCst);
        {
            let mut rows = store.companies.lock().unwrap();
            for (index, (name, state)) in companies.iter().enumerate() {
                rows.push(company(index as i64 + 1, name, state));
            }
        }
        store
    }

    pub(super) fn names(&self) -> Vec<String> {
        self.companies
            .lock()
            .unwrap()
            .iter()
            .map(|company| company.name.clone())
            .collect()
    }

    pub(super) fn table_created(&self) -> bool {
        self.table_created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompanyStore for MemoryCompanyStore {
    async fn find(
        &self,
        filter: &CompanyFilter,
        window: PageWindow,
    ) -> Result<Vec<Company>, StoreError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let mut matching: Vec<Company> = self
            .companies
            .lock()
            .unwrap()
            .iter()
            .filter(|company| filter.matches(company))
            .cloned()
            .collect();
        matching.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(matching
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect())
    }

    async fn count(&self, filter: &CompanyFilter) -> Result<u64, StoreError> {
        let companies = self.companies.lock().unwrap();
        Ok(companies.iter().filter(|company| filter.matches(company)).count() as u64)
    }
}

#[async_trait]
impl SchemaStore for MemoryCompanyStore {
    async fn create_tables(&self) -> Result<(), StoreError> {
        self.table_created.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn has_company_table(&self) -> Result<bool, StoreError> {
        Ok(self.table_created())
    }

    async fn insert(&self, new: &NewCompany) -> Result<(), StoreError> {
        let mut companies = self.companies.lock().unwrap();
        let id = companies.len() as i64 + 1;
        companies.push(Company {
            id: CompanyId::from(id),
            name: new.name.clone(),
            phone: new.phone.clone(),
            email: new.email.clone(),
            state: new.state.clone(),
            website: new.website.clone(),
            signup_url: new.signup_url.clone(),
            created_at: None,
        });
        Ok(())
    }

    async fn server_info(&self) -> Result<ServerInfo, StoreError> {
        Ok(ServerInfo {
            current_time: Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap(),
            version: "PostgreSQL 16.2".to_string(),
        })
    }
}

/// Store whose every call fails as if the database were down.
pub(super) struct UnavailableStore;

fn unavailable() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl CompanyStore for UnavailableStore {
    async fn find(&self, _: &CompanyFilter, _: PageWindow) -> Result<Vec<Company>, StoreError> {
        Err(unavailable())
    }

    async fn count(&self, _: &CompanyFilter) -> Result<u64, StoreError> {
        Err(unavailable())
    }
}

#[async_trait]
impl SchemaStore for UnavailableStore {
    async fn create_tables(&self) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn has_company_table(&self) -> Result<bool, StoreError> {
        Err(unavailable())
    }

    async fn insert(&self, _: &NewCompany) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn server_info(&self) -> Result<ServerInfo, StoreError> {
        Err(unavailable())
    }
}

pub(super) struct BrokenRateLimitStore;

#[async_trait]
impl RateLimitStore for BrokenRateLimitStore {
    async fn increment(&self, _: &str, _: Duration) -> Result<u64, RateLimitError> {
        Err(RateLimitError::Unavailable("cache offline".to_string()))
    }
}

pub(super) fn company(id: i64, name: &str, state: &str) -> Company {
    Company {
        id: CompanyId::from(id),
        name: name.to_string(),
        phone: "(800) 555-0100".to_string(),
        email: format!("info@{}.com", name.to_lowercase().replace(' ', "")),
        state: state.to_string(),
        website: String::new(),
        signup_url: String::new(),
        created_at: None,
    }
}

pub(super) fn sample_store() -> MemoryCompanyStore {
    MemoryCompanyStore::with_companies(&[
        ("SunCoast AMC", "FL"),
        ("BluePeak Appraisal Management", "TX"),
        ("Precision Valuation Services", "CA"),
        ("Mountain View AMC", "CO"),
        ("Lone Star Valuations", "TX"),
    ])
}

pub(super) fn rate_limit(max_requests: u64) -> RateLimitConfig {
    RateLimitConfig {
        window: Duration::from_secs(60),
        max_requests,
    }
}

pub(super) fn directory_with<S, L>(
    store: Arc<S>,
    limiter_store: Arc<L>,
    max_requests: u64,
    environment: AppEnvironment,
) -> CompanyDirectory<S, L>
where
    S: CompanyStore + 'static,
    L: RateLimitStore + 'static,
{
    CompanyDirectory::new(
        store,
        FixedWindowLimiter::new(limiter_store, rate_limit(max_requests)),
        environment,
    )
}

pub(super) fn build_directory(
    max_requests: u64,
) -> (
    CompanyDirectory<MemoryCompanyStore, InMemoryRateLimitStore>,
    Arc<MemoryCompanyStore>,
) {
    let store = Arc::new(sample_store());
    let directory = directory_with(
        store.clone(),
        Arc::new(InMemoryRateLimitStore::default()),
        max_requests,
        AppEnvironment::Test,
    );
    (directory, store)
}

pub(super) fn connection() -> ConnectionSummary {
    ConnectionSummary {
        user: "amc".to_string(),
        host: "db.internal".to_string(),
        port: 5432,
        database: "amc_directory".to_string(),
    }
}

pub(super) fn maintenance_with<S>(
    store: Arc<S>,
    environment: AppEnvironment,
) -> DatabaseMaintenance<S>
where
    S: SchemaStore + 'static,
{
    DatabaseMaintenance::new(store, connection(), environment)
}

pub(super) fn peer() -> SocketAddr {
    "192.0.2.44:40123".parse().expect("socket address")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
