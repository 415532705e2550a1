use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::validation::{validate_company_data, CompanyInput, NewCompany, ValidationErrors};

struct SeedCompany {
    name: &'static str,
    phone: &'static str,
    domain: &'static str,
    email_user: &'static str,
    state: &'static str,
    signup_path: &'static str,
}

const DEFAULT_COMPANIES: [SeedCompany; 8] = [
    SeedCompany {
        name: "Precision Valuation Services",
        phone: "(800) 555-0123",
        domain: "precisionvaluations.com",
        email_user: "info",
        state: "CA",
        signup_path: "/signup",
    },
    SeedCompany {
        name: "BluePeak Appraisal Management",
        phone: "(877) 555-0147",
        domain: "bluepeakamc.com",
        email_user: "support",
        state: "TX",
        signup_path: "/register",
    },
    SeedCompany {
        name: "UrbanEdge Valuation Group",
        phone: "(866) 555-0199",
        domain: "urbanedgeval.com",
        email_user: "team",
        state: "NY",
        signup_path: "/vendors",
    },
    SeedCompany {
        name: "SunCoast AMC",
        phone: "(888) 555-0172",
        domain: "suncoastamc.com",
        email_user: "hello",
        state: "FL",
        signup_path: "/sign-up",
    },
    SeedCompany {
        name: "Heartland Valuation Network",
        phone: "(855) 555-0114",
        domain: "heartlandvn.com",
        email_user: "partners",
        state: "IL",
        signup_path: "/appraisers",
    },
    SeedCompany {
        name: "Atlantic Coast Valuations",
        phone: "(844) 555-0165",
        domain: "atlanticcoastval.com",
        email_user: "vendors",
        state: "NC",
        signup_path: "/appraiser-signup",
    },
    SeedCompany {
        name: "Mountain View AMC",
        phone: "(866) 555-0198",
        domain: "mountainviewamc.com",
        email_user: "appraisers",
        state: "CO",
        signup_path: "/register-appraiser",
    },
    SeedCompany {
        name: "Northwest Property Solutions",
        phone: "(877) 555-0134",
        domain: "nwpropsolutions.com",
        email_user: "join",
        state: "WA",
        signup_path: "/vendor-portal",
    },
];

/// Built-in sample companies inserted into an empty table.
pub fn default_companies() -> Vec<CompanyInput> {
    DEFAULT_COMPANIES
        .iter()
        .map(|seed| {
            let website = format!("https://{}", seed.domain);
            CompanyInput {
                name: Some(seed.name.into()),
                phone: Some(seed.phone.into()),
                email: Some(format!("{}@{}", seed.email_user, seed.domain).into()),
                state: Some(seed.state.into()),
                signup_url: Some(format!("{website}{}", seed.signup_path).into()),
                website: Some(website.into()),
                signup_url_camel: None,
            }
        })
        .collect()
}

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read company CSV: {}", err),
            ImportError::Csv(err) => write!(f, "invalid company CSV data: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompanyCsvRow {
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    state: Option<String>,
    website: Option<String>,
    #[serde(alias = "signupUrl")]
    signup_url: Option<String>,
}

impl From<CompanyCsvRow> for CompanyInput {
    fn from(row: CompanyCsvRow) -> Self {
        Self {
            name: row.name.map(Into::into),
            phone: row.phone.map(Into::into),
            email: row.email.map(Into::into),
            state: row.state.map(Into::into),
            website: row.website.map(Into::into),
            signup_url: row.signup_url.map(Into::into),
            signup_url_camel: None,
        }
    }
}

/// CSV line that failed validation. `line` counts the header as line 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub line: usize,
    pub errors: ValidationErrors,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub accepted: Vec<NewCompany>,
    pub rejected: Vec<RejectedRow>,
}

/// Reads companies from a CSV export with a
/// `name,phone,email,state,website,signup_url` header.
pub struct CompanyImporter;

impl CompanyImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ImportReport, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<ImportReport, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut report = ImportReport::default();
        for (index, row) in csv_reader.deserialize::<CompanyCsvRow>().enumerate() {
            let input = CompanyInput::from(row?);
            match validate_company_data(&input) {
                Ok(company) => report.accepted.push(company),
                Err(errors) => report.rejected.push(RejectedRow {
                    line: index + 2,
                    errors,
                }),
            }
        }
        Ok(report)
    }
}
