use serde::Serialize;

use super::sanitize::sanitize_string;
use super::{UsState, ValidationErrors, ValidationResult};

const DEFAULT_PAGE: u32 = 1;
const MAX_PAGE: u32 = 1000;
const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;
const MAX_QUERY_CHARS: usize = 100;
const ALL_STATES: &str = "ALL";

/// Largest identifier accepted by [`validate_id`] (2^53 - 1).
pub const MAX_SAFE_ID: u64 = 9_007_199_254_740_991;

/// Validated page/limit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationParams {
    pub page: u32,
    pub limit: u32,
}

impl PaginationParams {
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// State filter selected by the client; `ALL` disables filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    All,
    State(UsState),
}

impl StateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateFilter::All => ALL_STATES,
            StateFilter::State(state) => state.code(),
        }
    }

    pub fn state(&self) -> Option<UsState> {
        match self {
            StateFilter::All => None,
            StateFilter::State(state) => Some(*state),
        }
    }
}

impl Serialize for StateFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Sanitized search text and state filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    pub query: String,
    pub state: StateFilter,
}

/// Mirrors lenient leading-integer parsing: optional whitespace and sign,
/// then as many digits as are present. Trailing text is ignored. Values too
/// large for `i128` saturate.
fn parse_leading_integer(raw: &str) -> Option<i128> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i128 = 0;
    let mut seen_digit = false;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        seen_digit = true;
        value = value
            .saturating_mul(10)
            .saturating_add(i128::from(byte - b'0'));
    }

    seen_digit.then_some(if negative { -value } else { value })
}

fn bounded_number(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&str>,
    default: u32,
    max: u32,
    not_positive: &str,
    too_large: &str,
) -> u32 {
    let Some(raw) = raw else {
        return default;
    };

    match parse_leading_integer(raw) {
        Some(value) if value >= 1 && value <= i128::from(max) => value as u32,
        Some(value) if value > i128::from(max) => {
            errors.push(field, too_large);
            default
        }
        _ => {
            errors.push(field, not_positive);
            default
        }
    }
}

/// Validates `page` (default 1, 1..=1000) and `limit` (default 20, 1..=100).
///
/// Out-of-range values are errors, never clamped.
pub fn validate_pagination_params(
    page: Option<&str>,
    limit: Option<&str>,
) -> ValidationResult<PaginationParams> {
    let mut errors = ValidationErrors::default();

    let page = bounded_number(
        &mut errors,
        "page",
        page,
        DEFAULT_PAGE,
        MAX_PAGE,
        "Page must be a positive integer",
        "Page number too large",
    );
    let limit = bounded_number(
        &mut errors,
        "limit",
        limit,
        DEFAULT_LIMIT,
        MAX_LIMIT,
        "Limit must be a positive integer",
        "Limit cannot exceed 100",
    );

    errors.into_result(PaginationParams { page, limit })
}

/// Validates the free-text query (default empty, at most 100 characters once
/// sanitized) and the state filter (default `ALL`).
pub fn validate_search_params(
    query: Option<&str>,
    state: Option<&str>,
) -> ValidationResult<SearchParams> {
    let mut errors = ValidationErrors::default();

    let query = query.map(sanitize_string).unwrap_or_default();
    if query.chars().count() > MAX_QUERY_CHARS {
        errors.push("query", "Search query too long");
    }

    let state = match state {
        None => StateFilter::All,
        Some(raw) => {
            let normalized = sanitize_string(raw).to_uppercase();
            if normalized == ALL_STATES {
                StateFilter::All
            } else if let Some(state) = UsState::lookup(&normalized) {
                StateFilter::State(state)
            } else {
                errors.push("state", "Invalid state filter");
                StateFilter::All
            }
        }
    };

    errors.into_result(SearchParams { query, state })
}

/// Validates a record identifier: a positive integer no larger than [`MAX_SAFE_ID`].
pub fn validate_id(id: Option<&str>) -> ValidationResult<u64> {
    let mut errors = ValidationErrors::default();

    let id = match id.filter(|raw| !raw.is_empty()) {
        None => {
            errors.push("id", "ID is required");
            0
        }
        Some(raw) => match parse_leading_integer(raw) {
            Some(value) if value >= 1 && value <= i128::from(MAX_SAFE_ID) => value as u64,
            Some(value) if value > i128::from(MAX_SAFE_ID) => {
                errors.push("id", "ID too large");
                0
            }
            _ => {
                errors.push("id", "ID must be a positive integer");
                0
            }
        },
    };

    errors.into_result(id)
}
