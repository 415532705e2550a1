use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use super::domain::{CompanyFilter, CompanyPage, PageWindow, PaginationSummary};
use super::rate_limit::{FixedWindowLimiter, RateLimitDecision, RateLimitError, RateLimitStore};
use super::store::{CompanyStore, StoreError};
use crate::config::AppEnvironment;
use crate::validation::{validate_pagination_params, validate_search_params, ValidationErrors};

/// Raw listing query string: `?q=&state=&page=&limit=`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

/// Service composing the rate limiter, the validators, and the company store.
pub struct CompanyDirectory<S, L> {
    store: Arc<S>,
    limiter: FixedWindowLimiter<L>,
    environment: AppEnvironment,
}

impl<S, L> CompanyDirectory<S, L>
where
    S: CompanyStore + 'static,
    L: RateLimitStore + 'static,
{
    pub fn new(store: Arc<S>, limiter: FixedWindowLimiter<L>, environment: AppEnvironment) -> Self {
        Self {
            store,
            limiter,
            environment,
        }
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Counts one request against `client`'s window.
    pub async fn admit(&self, client: &str) -> Result<(), ListingError> {
        match self.limiter.check(client).await? {
            RateLimitDecision::Allowed { .. } => Ok(()),
            RateLimitDecision::Limited { retry_after } => {
                warn!(client, "listing rate limit exceeded");
                Err(ListingError::RateLimited { retry_after })
            }
        }
    }

    /// Validates the query and fetches one page plus the total match count.
    pub async fn list(&self, query: &ListingQuery) -> Result<CompanyPage, ListingError> {
        let search = validate_search_params(query.q.as_deref(), query.state.as_deref())
            .map_err(ListingError::InvalidSearch)?;
        let pagination = validate_pagination_params(query.page.as_deref(), query.limit.as_deref())
            .map_err(ListingError::InvalidPagination)?;

        let filter = CompanyFilter::from(&search);
        let window = PageWindow::from(pagination);

        debug!(
            query = %search.query,
            state = search.state.as_str(),
            page = pagination.page,
            limit = pagination.limit,
            "fetching companies"
        );

        let (companies, total) =
            tokio::try_join!(self.store.find(&filter, window), self.store.count(&filter))?;

        debug!(found = companies.len(), total, "fetched companies");

        Ok(CompanyPage {
            companies,
            pagination: PaginationSummary::new(pagination, total),
        })
    }

    /// Rate limits `client`, then lists.
    pub async fn list_for(
        &self,
        client: &str,
        query: &ListingQuery,
    ) -> Result<CompanyPage, ListingError> {
        self.admit(client).await?;
        self.list(query).await
    }
}

/// Error raised by the listing service.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("rate limit exceeded")]
    RateLimited { retry_after: Duration },
    #[error("invalid search parameters: {0}")]
    InvalidSearch(ValidationErrors),
    #[error("invalid pagination parameters: {0}")]
    InvalidPagination(ValidationErrors),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    RateLimitStore(#[from] RateLimitError),
}
