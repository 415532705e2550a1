use super::common::*;

use crate::registration::{RegistrationPatch, RegistrationWizard, WizardError, WizardStep};

#[test]
fn starts_on_personal_step_and_blocks_without_fields() {
    let mut wizard = RegistrationWizard::new();
    assert_eq!(wizard.step(), WizardStep::Personal);
    assert!(!wizard.can_proceed());

    let err = wizard.advance().unwrap_err();
    assert_eq!(
        err,
        WizardError::Incomplete {
            step: WizardStep::Personal,
            missing: vec![
                "firstName",
                "lastName",
                "regEmail",
                "regPhone",
                "yearsExperience"
            ],
        }
    );
    assert_eq!(wizard.step(), WizardStep::Personal);
}

#[test]
fn every_gate_opens_with_its_fields() {
    let mut wizard = RegistrationWizard::new();
    let patches = [personal(), professional(), address(), business()];
    let expected = [
        WizardStep::Professional,
        WizardStep::Address,
        WizardStep::Business,
        WizardStep::Documents,
    ];

    for (patch, next) in patches.into_iter().zip(expected) {
        assert!(!wizard.can_proceed());
        wizard.update(patch);
        assert!(wizard.can_proceed());
        assert_eq!(wizard.advance(), Ok(next));
    }

    assert!(wizard.can_proceed());
    assert_eq!(wizard.advance(), Ok(WizardStep::Review));
    assert_eq!(wizard.progress_percent(), 100);
}

#[test]
fn review_gate_needs_both_acceptances() {
    let mut wizard = wizard_at_review();
    assert_eq!(
        wizard.missing_fields(),
        vec!["termsAccepted", "privacyAccepted"]
    );

    wizard.update(RegistrationPatch {
        terms_accepted: Some(true),
        ..RegistrationPatch::default()
    });
    assert_eq!(wizard.missing_fields(), vec!["privacyAccepted"]);

    wizard.update(consent());
    assert!(wizard.can_proceed());
}

#[test]
fn advancing_past_review_is_a_no_op() {
    let mut wizard = wizard_at_review();
    wizard.update(consent());
    assert_eq!(wizard.advance(), Ok(WizardStep::Review));
    assert_eq!(wizard.step(), WizardStep::Review);
}

#[test]
fn retreat_ignores_gates_and_stops_at_first_step() {
    let mut wizard = wizard_at_review();
    assert_eq!(wizard.retreat(), WizardStep::Documents);
    assert_eq!(wizard.retreat(), WizardStep::Business);

    wizard.update(RegistrationPatch {
        tax_id: Some(None),
        ..RegistrationPatch::default()
    });
    assert_eq!(wizard.retreat(), WizardStep::Address);
    assert_eq!(wizard.retreat(), WizardStep::Professional);
    assert_eq!(wizard.retreat(), WizardStep::Personal);
    assert_eq!(wizard.retreat(), WizardStep::Personal);
    assert_eq!(wizard.progress_percent(), 17);
}

#[test]
fn updates_merge_without_touching_other_steps() {
    let mut wizard = wizard_at_review();
    wizard.update(RegistrationPatch {
        references: Some([reference("Avery"), reference("Blake"), reference("Casey")]),
        ..RegistrationPatch::default()
    });

    let data = wizard.data();
    assert_eq!(data.first_name.as_deref(), Some("Dana"));
    assert_eq!(data.references[2].email, "casey@heartlandvn.com");
    assert_eq!(data.selected_company_ids.len(), 2);
}
