//! Sanitization and validation of untrusted input.
//!
//! Every value that reaches the company store or is echoed back to a client
//! passes through this module first. Sanitizing never fails; only the checks
//! that follow it produce [`FieldError`]s. Validators accumulate every error
//! instead of stopping at the first one, and return the sanitized value only
//! when no error was recorded.

mod company;
mod params;
mod sanitize;

pub use company::{validate_company_data, CompanyInput, InputValue, NewCompany};
pub use params::{
    validate_id, validate_pagination_params, validate_search_params, PaginationParams,
    SearchParams, StateFilter, MAX_SAFE_ID,
};
pub use sanitize::{sanitize_string, MAX_SANITIZED_CHARS};

use serde::Serialize;
use std::fmt;

/// The fifty two-letter postal codes accepted for a company's state.
pub const US_STATES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS",
    "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY",
    "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY",
];

/// Validated two-letter state code borrowed from [`US_STATES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UsState(&'static str);

impl UsState {
    /// Looks up an exact (already upper-cased) code.
    pub fn lookup(code: &str) -> Option<Self> {
        US_STATES
            .iter()
            .find(|candidate| **candidate == code)
            .map(|candidate| Self(candidate))
    }

    pub fn code(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for UsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A single rejected field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Ordered, non-empty list of field errors produced by a validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub(crate) fn push(&mut self, field: &str, message: &str) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub(crate) fn into_result<T>(self, value: T) -> ValidationResult<T> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the first message recorded against `field`, if any.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|error| error.field.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed for {} field(s)", self.0.len())?;
        for (index, error) in self.0.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{} ({})", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Outcome of a validator: the sanitized value when valid, the field errors otherwise.
pub type ValidationResult<T> = Result<T, ValidationErrors>;
