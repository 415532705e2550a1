use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::RegistrationData;
use super::wizard::{RegistrationWizard, WizardError, WizardStep};

/// Acknowledgement returned by a sink that accepted a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReceipt {
    pub reference: String,
    pub company_count: usize,
}

/// Destination for a finished registration (an onboarding API, a queue, a CRM).
#[async_trait]
pub trait RegistrationSink: Send + Sync {
    async fn submit(&self, registration: &RegistrationData)
        -> Result<CompletionReceipt, CompletionError>;
}

/// Default sink: completion has no destination yet, so every submission fails
/// with [`CompletionError::NotWired`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnwiredRegistrationSink;

#[async_trait]
impl RegistrationSink for UnwiredRegistrationSink {
    async fn submit(&self, _: &RegistrationData) -> Result<CompletionReceipt, CompletionError> {
        Err(CompletionError::NotWired)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("registration can only be completed from the review step, currently at {0}")]
    NotAtReview(WizardStep),
    #[error(transparent)]
    Incomplete(#[from] WizardError),
    #[error("registration completion is not wired to any destination")]
    NotWired,
    #[error("registration sink rejected the submission: {0}")]
    Rejected(String),
}

/// Hands the record to `sink` once the wizard sits on the review step with
/// terms and privacy accepted.
pub async fn complete<S>(
    wizard: &RegistrationWizard,
    sink: &S,
) -> Result<CompletionReceipt, CompletionError>
where
    S: RegistrationSink + ?Sized,
{
    let step = wizard.step();
    if !step.is_last() {
        return Err(CompletionError::NotAtReview(step));
    }

    let missing = wizard.missing_fields();
    if !missing.is_empty() {
        return Err(WizardError::Incomplete { step, missing }.into());
    }

    match sink.submit(wizard.data()).await {
        Ok(receipt) => {
            info!(reference = %receipt.reference, "registration completed");
            Ok(receipt)
        }
        Err(err) => {
            warn!(error = %err, "registration completion failed");
            Err(err)
        }
    }
}
