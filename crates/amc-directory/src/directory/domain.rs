use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::validation::{PaginationParams, SearchParams, UsState};

/// Opaque identifier for a listed company; rendered as a string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub String);

impl From<i64> for CompanyId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// Appraisal management company as exposed by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub state: String,
    pub website: String,
    pub signup_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// Which of the four listing query shapes applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyFilter {
    name_contains: Option<String>,
    state: Option<UsState>,
}

impl CompanyFilter {
    pub fn new(name_contains: Option<String>, state: Option<UsState>) -> Self {
        Self {
            name_contains: name_contains.filter(|query| !query.is_empty()),
            state,
        }
    }

    pub fn name_contains(&self) -> Option<&str> {
        self.name_contains.as_deref()
    }

    pub fn state(&self) -> Option<UsState> {
        self.state
    }

    /// Case-insensitive substring match used by in-process stores.
    pub fn matches(&self, company: &Company) -> bool {
        let name_matches = self.name_contains.as_ref().map_or(true, |query| {
            company
                .name
                .to_lowercase()
                .contains(&query.to_lowercase())
        });
        let state_matches = self
            .state
            .map_or(true, |state| company.state == state.code());
        name_matches && state_matches
    }
}

impl From<&SearchParams> for CompanyFilter {
    fn from(params: &SearchParams) -> Self {
        Self::new(Some(params.query.clone()), params.state.state())
    }
}

/// Slice of the ordered result set to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u32,
    pub offset: u64,
}

impl From<PaginationParams> for PageWindow {
    fn from(params: PaginationParams) -> Self {
        Self {
            limit: params.limit,
            offset: params.offset(),
        }
    }
}

/// Pagination metadata returned alongside a page of companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationSummary {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationSummary {
    pub fn new(params: PaginationParams, total: u64) -> Self {
        Self {
            page: params.page,
            limit: params.limit,
            total,
            total_pages: total.div_ceil(u64::from(params.limit)),
        }
    }
}

/// One page of listing results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyPage {
    pub companies: Vec<Company>,
    pub pagination: PaginationSummary,
}
