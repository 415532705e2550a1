use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::sanitize::sanitize_string;
use super::{UsState, ValidationErrors, ValidationResult};

lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(
        r#"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"#
    )
    .expect("email pattern compiles");

    /// Loose US phone format: optional +1, optional parentheses and separators.
    static ref PHONE_PATTERN: Regex =
        Regex::new(r"^\+?1?[-.\s]?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}$")
            .expect("phone pattern compiles");

    static ref URL_PATTERN: Regex = Regex::new(
        r"^https?://[-A-Za-z0-9_.]+(?::[0-9]+)?(?:/[A-Za-z0-9_/.]*)?(?:\?[A-Za-z0-9_&=%.]*)?(?:#[A-Za-z0-9_.]*)?$"
    )
    .expect("url pattern compiles");
}

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 255;

/// A company field as received on the wire, before its type is checked.
///
/// Anything other than a JSON string is kept as [`InputValue::Other`] so the
/// validator can report a field error rather than rejecting the whole body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Text(String),
    Other(serde_json::Value),
}

impl InputValue {
    /// `null`, `false`, `0` and the empty string count as "not supplied".
    fn is_supplied(&self) -> bool {
        match self {
            InputValue::Text(text) => !text.is_empty(),
            InputValue::Other(serde_json::Value::Null) => false,
            InputValue::Other(serde_json::Value::Bool(flag)) => *flag,
            InputValue::Other(serde_json::Value::Number(number)) => {
                number.as_f64().map_or(true, |value| value != 0.0)
            }
            InputValue::Other(serde_json::Value::String(text)) => !text.is_empty(),
            InputValue::Other(_) => true,
        }
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Text(value)
    }
}

/// Untrusted company payload.
///
/// The signup URL is accepted as either `signup_url` or `signupUrl`; a
/// supplied `signup_url` takes precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<InputValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<InputValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<InputValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<InputValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<InputValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signup_url: Option<InputValue>,
    #[serde(
        default,
        rename = "signupUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub signup_url_camel: Option<InputValue>,
}

impl CompanyInput {
    fn signup_url(&self) -> Option<&InputValue> {
        self.signup_url
            .as_ref()
            .filter(|value| value.is_supplied())
            .or(self.signup_url_camel.as_ref())
    }
}

impl From<&NewCompany> for CompanyInput {
    fn from(company: &NewCompany) -> Self {
        Self {
            name: Some(company.name.as_str().into()),
            phone: Some(company.phone.as_str().into()),
            email: Some(company.email.as_str().into()),
            state: Some(company.state.as_str().into()),
            website: Some(company.website.as_str().into()),
            signup_url: Some(company.signup_url.as_str().into()),
            signup_url_camel: None,
        }
    }
}

/// Sanitized company ready to be written to the store.
///
/// Optional fields that were not supplied hold the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub state: String,
    pub website: String,
    pub signup_url: String,
}

enum Supplied<'a> {
    Absent,
    Text(&'a str),
    WrongType,
}

fn supplied(value: Option<&InputValue>) -> Supplied<'_> {
    match value {
        Some(value) if value.is_supplied() => match value {
            InputValue::Text(text) => Supplied::Text(text),
            InputValue::Other(serde_json::Value::String(text)) => Supplied::Text(text),
            InputValue::Other(_) => Supplied::WrongType,
        },
        _ => Supplied::Absent,
    }
}

struct OptionalField {
    field: &'static str,
    wrong_type: &'static str,
    invalid: &'static str,
}

impl OptionalField {
    fn check(
        &self,
        errors: &mut ValidationErrors,
        value: Option<&InputValue>,
        normalize: fn(String) -> String,
        is_valid: impl Fn(&str) -> bool,
    ) -> String {
        match supplied(value) {
            Supplied::Absent => String::new(),
            Supplied::WrongType => {
                errors.push(self.field, self.wrong_type);
                String::new()
            }
            Supplied::Text(raw) => {
                let sanitized = normalize(sanitize_string(raw));
                if !is_valid(&sanitized) {
                    errors.push(self.field, self.invalid);
                }
                sanitized
            }
        }
    }
}

fn unchanged(value: String) -> String {
    value
}

fn lowercase(value: String) -> String {
    value.to_lowercase()
}

fn uppercase(value: String) -> String {
    value.to_uppercase()
}

/// Validates and sanitizes a company payload.
///
/// Every field is checked; errors are reported in field order.
pub fn validate_company_data(input: &CompanyInput) -> ValidationResult<NewCompany> {
    let mut errors = ValidationErrors::default();

    let name = match supplied(input.name.as_ref()) {
        Supplied::Text(raw) => {
            let sanitized = sanitize_string(raw);
            let length = sanitized.chars().count();
            if length < NAME_MIN_CHARS {
                errors.push("name", "Company name must be at least 2 characters");
            } else if length > NAME_MAX_CHARS {
                errors.push("name", "Company name must be less than 255 characters");
            }
            sanitized
        }
        Supplied::Absent | Supplied::WrongType => {
            errors.push("name", "Company name is required");
            String::new()
        }
    };

    let phone = OptionalField {
        field: "phone",
        wrong_type: "Phone number must be a string",
        invalid: "Invalid phone number format",
    }
    .check(&mut errors, input.phone.as_ref(), unchanged, |value| {
        PHONE_PATTERN.is_match(value)
    });

    let email = OptionalField {
        field: "email",
        wrong_type: "Email must be a string",
        invalid: "Invalid email format",
    }
    .check(&mut errors, input.email.as_ref(), lowercase, |value| {
        EMAIL_PATTERN.is_match(value)
    });

    let state = OptionalField {
        field: "state",
        wrong_type: "State must be a string",
        invalid: "Invalid US state code",
    }
    .check(&mut errors, input.state.as_ref(), uppercase, |value| {
        UsState::lookup(value).is_some()
    });

    let website = OptionalField {
        field: "website",
        wrong_type: "Website must be a string",
        invalid: "Invalid website URL format",
    }
    .check(&mut errors, input.website.as_ref(), lowercase, |value| {
        URL_PATTERN.is_match(value)
    });

    let signup_url = OptionalField {
        field: "signup_url",
        wrong_type: "Signup URL must be a string",
        invalid: "Invalid signup URL format",
    }
    .check(&mut errors, input.signup_url(), lowercase, |value| {
        URL_PATTERN.is_match(value)
    });

    errors.into_result(NewCompany {
        name,
        phone,
        email,
        state,
        website,
        signup_url,
    })
}
