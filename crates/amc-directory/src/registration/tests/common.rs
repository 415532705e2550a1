use std::sync::Mutex;

use async_trait::async_trait;

use crate::registration::{
    CompletionError, CompletionReceipt, ReferenceContact, RegistrationData, RegistrationPatch,
    RegistrationSink, RegistrationWizard,
};

pub(super) fn text(value: &str) -> Option<Option<String>> {
    Some(Some(value.to_string()))
}

pub(super) fn personal() -> RegistrationPatch {
    RegistrationPatch {
        first_name: text("Dana"),
        last_name: text("Whitfield"),
        reg_email: text("dana@whitfieldappraisals.com"),
        reg_phone: text("(515) 555-0147"),
        years_experience: text("12"),
        ..RegistrationPatch::default()
    }
}

pub(super) fn professional() -> RegistrationPatch {
    RegistrationPatch {
        company_name: text("Whitfield Appraisals LLC"),
        license_number: text("CR-4410"),
        license_state: text("IA"),
        ..RegistrationPatch::default()
    }
}

pub(super) fn address() -> RegistrationPatch {
    RegistrationPatch {
        address1: text("410 Locust St"),
        city: text("Des Moines"),
        state: text("IA"),
        zip: text("50309"),
        ..RegistrationPatch::default()
    }
}

pub(super) fn business() -> RegistrationPatch {
    RegistrationPatch {
        business_type: text("LLC"),
        tax_id: text("42-1234567"),
        formation_date: text("2014-05-01"),
        ..RegistrationPatch::default()
    }
}

pub(super) fn consent() -> RegistrationPatch {
    RegistrationPatch {
        terms_accepted: Some(true),
        privacy_accepted: Some(true),
        ..RegistrationPatch::default()
    }
}

pub(super) fn reference(name: &str) -> ReferenceContact {
    ReferenceContact {
        name: name.to_string(),
        company: "Heartland Valuation Network".to_string(),
        email: format!("{}@heartlandvn.com", name.to_lowercase()),
        phone: "(855) 555-0114".to_string(),
        relationship: "Client".to_string(),
    }
}

/// Drives a wizard through every gate up to the review step.
pub(super) fn wizard_at_review() -> RegistrationWizard {
    let mut wizard = RegistrationWizard::with_selection(Some("1,4"));
    for patch in [personal(), professional(), address(), business()] {
        wizard.update(patch);
        wizard.advance().expect("gate satisfied");
    }
    wizard.advance().expect("documents are optional");
    wizard
}

/// Sink that records what it receives.
#[derive(Default)]
pub(super) struct RecordingSink {
    pub(super) received: Mutex<Vec<RegistrationData>>,
}

#[async_trait]
impl RegistrationSink for RecordingSink {
    async fn submit(
        &self,
        registration: &RegistrationData,
    ) -> Result<CompletionReceipt, CompletionError> {
        let mut received = self.received.lock().unwrap();
        received.push(registration.clone());
        Ok(CompletionReceipt {
            reference: format!("REG-{:04}", received.len()),
            company_count: registration.selected_company_ids.len(),
        })
    }
}
