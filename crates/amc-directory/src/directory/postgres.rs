//! PostgreSQL-backed company store.
//!
//! Every statement is a fixed SQL string with positional parameters; user
//! input is only ever bound, never spliced into the query text.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use tracing::debug;

use super::domain::{Company, CompanyFilter, CompanyId, PageWindow};
use super::store::{CompanyStore, SchemaStore, ServerInfo, StoreError};
use crate::config::{DatabaseConfig, SslMode};
use crate::validation::NewCompany;

pub const COMPANY_TABLE: &str = "amc_companies";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS amc_companies (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    phone VARCHAR(50),
    email VARCHAR(255),
    state VARCHAR(2),
    website TEXT,
    signup_url TEXT,
    created_at TIMESTAMP DEFAULT NOW(),
    updated_at TIMESTAMP DEFAULT NOW()
)";
const CREATE_STATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_amc_companies_state ON amc_companies(state)";
const CREATE_NAME_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_amc_companies_name ON amc_companies(name)";

const SELECT_ALL: &str = "SELECT id, name, phone, email, state, website, signup_url, created_at
    FROM amc_companies
    ORDER BY name ASC
    LIMIT $1 OFFSET $2";
const SELECT_BY_NAME: &str = "SELECT id, name, phone, email, state, website, signup_url, created_at
    FROM amc_companies
    WHERE name ILIKE $1
    ORDER BY name ASC
    LIMIT $2 OFFSET $3";
const SELECT_BY_STATE: &str = "SELECT id, name, phone, email, state, website, signup_url, created_at
    FROM amc_companies
    WHERE state = $1
    ORDER BY name ASC
    LIMIT $2 OFFSET $3";
const SELECT_BY_NAME_AND_STATE: &str =
    "SELECT id, name, phone, email, state, website, signup_url, created_at
    FROM amc_companies
    WHERE name ILIKE $1 AND state = $2
    ORDER BY name ASC
    LIMIT $3 OFFSET $4";

const COUNT_ALL: &str = "SELECT COUNT(*) FROM amc_companies";
const COUNT_BY_NAME: &str = "SELECT COUNT(*) FROM amc_companies WHERE name ILIKE $1";
const COUNT_BY_STATE: &str = "SELECT COUNT(*) FROM amc_companies WHERE state = $1";
const COUNT_BY_NAME_AND_STATE: &str =
    "SELECT COUNT(*) FROM amc_companies WHERE name ILIKE $1 AND state = $2";

const INSERT_COMPANY: &str = "INSERT INTO amc_companies (name, phone, email, state, website, signup_url)
    VALUES ($1, $2, $3, $4, $5, $6)";
const TABLE_EXISTS: &str = "SELECT COUNT(*) FROM information_schema.tables
    WHERE table_schema = 'public' AND table_name = $1";
const SERVER_INFO: &str = "SELECT NOW() AS server_time, version() AS server_version";

/// Builds a lazily connecting pool; no connection is attempted until first use.
pub fn connect_lazy(config: &DatabaseConfig) -> PgPool {
    let ssl_mode = match config.ssl_mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
        SslMode::VerifyCa => PgSslMode::VerifyCa,
        SslMode::VerifyFull => PgSslMode::VerifyFull,
    };

    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
        .ssl_mode(ssl_mode);

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .connect_lazy_with(options)
}

#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    id: i32,
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    state: Option<String>,
    website: Option<String>,
    signup_url: Option<String>,
    created_at: Option<NaiveDateTime>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Self {
            id: CompanyId::from(i64::from(row.id)),
            name: row.name.unwrap_or_default(),
            phone: row.phone.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
            state: row.state.unwrap_or_default(),
            website: row.website.unwrap_or_default(),
            signup_url: row.signup_url.unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

fn name_pattern(query: &str) -> String {
    format!("%{query}%")
}

/// Company store over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgCompanyStore {
    pool: PgPool,
}

impl PgCompanyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CompanyStore for PgCompanyStore {
    async fn find(
        &self,
        filter: &CompanyFilter,
        window: PageWindow,
    ) -> Result<Vec<Company>, StoreError> {
        let limit = i64::from(window.limit);
        let offset = i64::try_from(window.offset).unwrap_or(i64::MAX);

        let query = match (filter.name_contains(), filter.state()) {
            (Some(name), Some(state)) => sqlx::query_as::<_, CompanyRow>(SELECT_BY_NAME_AND_STATE)
                .bind(name_pattern(name))
                .bind(state.code())
                .bind(limit)
                .bind(offset),
            (Some(name), None) => sqlx::query_as::<_, CompanyRow>(SELECT_BY_NAME)
                .bind(name_pattern(name))
                .bind(limit)
                .bind(offset),
            (None, Some(state)) => sqlx::query_as::<_, CompanyRow>(SELECT_BY_STATE)
                .bind(state.code())
                .bind(limit)
                .bind(offset),
            (None, None) => sqlx::query_as::<_, CompanyRow>(SELECT_ALL)
                .bind(limit)
                .bind(offset),
        };

        let rows = query.fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), "fetched company page");
        Ok(rows.into_iter().map(Company::from).collect())
    }

    async fn count(&self, filter: &CompanyFilter) -> Result<u64, StoreError> {
        let query = match (filter.name_contains(), filter.state()) {
            (Some(name), Some(state)) => sqlx::query_scalar::<_, i64>(COUNT_BY_NAME_AND_STATE)
                .bind(name_pattern(name))
                .bind(state.code()),
            (Some(name), None) => {
                sqlx::query_scalar::<_, i64>(COUNT_BY_NAME).bind(name_pattern(name))
            }
            (None, Some(state)) => sqlx::query_scalar::<_, i64>(COUNT_BY_STATE).bind(state.code()),
            (None, None) => sqlx::query_scalar::<_, i64>(COUNT_ALL),
        };

        let total = query.fetch_one(&self.pool).await?;
        Ok(u64::try_from(total).unwrap_or_default())
    }
}

#[async_trait]
impl SchemaStore for PgCompanyStore {
    async fn create_tables(&self) -> Result<(), StoreError> {
        for statement in [CREATE_TABLE, CREATE_STATE_INDEX, CREATE_NAME_INDEX] {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn has_company_table(&self) -> Result<bool, StoreError> {
        let tables: i64 = sqlx::query_scalar(TABLE_EXISTS)
            .bind(COMPANY_TABLE)
            .fetch_one(&self.pool)
            .await?;
        Ok(tables > 0)
    }

    async fn insert(&self, company: &NewCompany) -> Result<(), StoreError> {
        sqlx::query(INSERT_COMPANY)
            .bind(&company.name)
            .bind(&company.phone)
            .bind(&company.email)
            .bind(&company.state)
            .bind(&company.website)
            .bind(&company.signup_url)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn server_info(&self) -> Result<ServerInfo, StoreError> {
        let (current_time, version): (DateTime<Utc>, String) = sqlx::query_as(SERVER_INFO)
            .fetch_one(&self.pool)
            .await?;
        Ok(ServerInfo {
            current_time,
            version,
        })
    }
}
