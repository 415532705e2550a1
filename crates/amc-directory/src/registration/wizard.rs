use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{parse_selected_ids, RegistrationData, RegistrationPatch};

pub const STEP_COUNT: u8 = 6;

/// The six wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WizardStep {
    Personal = 1,
    Professional = 2,
    Address = 3,
    Business = 4,
    Documents = 5,
    Review = 6,
}

impl WizardStep {
    pub const ALL: [WizardStep; STEP_COUNT as usize] = [
        WizardStep::Personal,
        WizardStep::Professional,
        WizardStep::Address,
        WizardStep::Business,
        WizardStep::Documents,
        WizardStep::Review,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Personal => "Personal Information",
            WizardStep::Professional => "Professional Information",
            WizardStep::Address => "Address Information",
            WizardStep::Business => "Business Information",
            WizardStep::Documents => "Documents",
            WizardStep::Review => "Review & Complete",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WizardStep::Personal => "Basic information about you",
            WizardStep::Professional => "License and certification details",
            WizardStep::Address => "Business and service locations",
            WizardStep::Business => "Company and professional details",
            WizardStep::Documents => "Upload required documents",
            WizardStep::Review => "Review and complete registration",
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::try_from(self.number() + 1).ok()
    }

    pub fn previous(self) -> Option<Self> {
        Self::try_from(self.number() - 1).ok()
    }

    pub fn is_last(self) -> bool {
        self == WizardStep::Review
    }

    /// Fields that still block leaving this step; empty when the gate passes.
    pub fn missing_fields(self, data: &RegistrationData) -> Vec<&'static str> {
        let required: Vec<(&'static str, bool)> = match self {
            WizardStep::Personal => vec![
                ("firstName", filled(&data.first_name)),
                ("lastName", filled(&data.last_name)),
                ("regEmail", filled(&data.reg_email)),
                ("regPhone", filled(&data.reg_phone)),
                ("yearsExperience", filled(&data.years_experience)),
            ],
            WizardStep::Professional => vec![
                ("companyName", filled(&data.company_name)),
                ("licenseNumber", filled(&data.license_number)),
                ("licenseState", filled(&data.license_state)),
            ],
            WizardStep::Address => vec![
                ("address1", filled(&data.address1)),
                ("city", filled(&data.city)),
                ("state", filled(&data.state)),
                ("zip", filled(&data.zip)),
            ],
            WizardStep::Business => vec![
                ("businessType", filled(&data.business_type)),
                ("taxId", filled(&data.tax_id)),
                ("formationDate", filled(&data.formation_date)),
            ],
            // Documents are optional.
            WizardStep::Documents => Vec::new(),
            WizardStep::Review => vec![
                ("termsAccepted", data.terms_accepted),
                ("privacyAccepted", data.privacy_accepted),
            ],
        };

        required
            .into_iter()
            .filter(|(_, ok)| !ok)
            .map(|(field, _)| field)
            .collect()
    }

    pub fn can_proceed(self, data: &RegistrationData) -> bool {
        self.missing_fields(data).is_empty()
    }
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|text| !text.trim().is_empty())
}

impl TryFrom<u8> for WizardStep {
    type Error = WizardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(WizardStep::Personal),
            2 => Ok(WizardStep::Professional),
            3 => Ok(WizardStep::Address),
            4 => Ok(WizardStep::Business),
            5 => Ok(WizardStep::Documents),
            6 => Ok(WizardStep::Review),
            other => Err(WizardError::InvalidStep(other)),
        }
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.number()
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("wizard step must be between 1 and 6, got {0}")]
    InvalidStep(u8),
    #[error("{step} is incomplete; missing {}", .missing.join(", "))]
    Incomplete {
        step: WizardStep,
        missing: Vec<&'static str>,
    },
}

/// Six-step registration state machine over a single [`RegistrationData`] record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationWizard {
    data: RegistrationData,
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a wizard with companies preselected from an `ids` query value.
    pub fn with_selection(ids: Option<&str>) -> Self {
        let mut wizard = Self::new();
        if let Some(raw) = ids {
            wizard.data.selected_company_ids = parse_selected_ids(raw);
        }
        wizard
    }

    /// Resumes from a previously captured record.
    pub fn resume(data: RegistrationData) -> Self {
        Self { data }
    }

    pub fn step(&self) -> WizardStep {
        self.data.step
    }

    pub fn data(&self) -> &RegistrationData {
        &self.data
    }

    pub fn into_data(self) -> RegistrationData {
        self.data
    }

    pub fn update(&mut self, patch: RegistrationPatch) {
        self.data.merge(patch);
    }

    pub fn can_proceed(&self) -> bool {
        self.step().can_proceed(&self.data)
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.step().missing_fields(&self.data)
    }

    /// Moves one step forward when the current gate passes. At the last step
    /// this is a no-op and returns the unchanged step.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let current = self.step();
        let missing = current.missing_fields(&self.data);
        if !missing.is_empty() {
            return Err(WizardError::Incomplete {
                step: current,
                missing,
            });
        }

        if let Some(next) = current.next() {
            debug!(from = current.number(), to = next.number(), "wizard advanced");
            self.data.step = next;
        }
        Ok(self.step())
    }

    /// Moves one step back without checking any gate; a no-op at the first step.
    pub fn retreat(&mut self) -> WizardStep {
        if let Some(previous) = self.step().previous() {
            self.data.step = previous;
        }
        self.step()
    }

    /// round(step / 6 * 100)
    pub fn progress_percent(&self) -> u8 {
        let step = u32::from(self.step().number());
        let total = u32::from(STEP_COUNT);
        ((step * 100 + total / 2) / total) as u8
    }
}
