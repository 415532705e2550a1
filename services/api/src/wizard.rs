use amc_directory::error::AppError;
use amc_directory::registration::{RegistrationData, RegistrationWizard, WizardStep};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct WizardCheckArgs {
    /// JSON file holding a saved registration record
    pub(crate) path: PathBuf,
}

pub(crate) fn run_wizard_check(args: WizardCheckArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.path)?;
    let data: RegistrationData = serde_json::from_str(&raw)?;
    let wizard = RegistrationWizard::resume(data);
    print!("{}", render_check(&wizard));
    Ok(())
}

pub(crate) fn render_check(wizard: &RegistrationWizard) -> String {
    let current = wizard.step();
    let mut out = format!(
        "Step {} of {}: {} ({}% complete)\n{}\n",
        current.number(),
        WizardStep::ALL.len(),
        current.title(),
        wizard.progress_percent(),
        current.description()
    );

    for step in WizardStep::ALL {
        let missing = step.missing_fields(wizard.data());
        let status = if missing.is_empty() {
            "ready".to_string()
        } else {
            format!("missing {}", missing.join(", "))
        };
        let marker = if step == current { ">" } else { " " };
        out.push_str(&format!("{marker} {}. {}: {status}\n", step.number(), step.title()));
    }

    let selected = &wizard.data().selected_company_ids;
    if !selected.is_empty() {
        let ids: Vec<&str> = selected.iter().map(|id| id.0.as_str()).collect();
        out.push_str(&format!("Selected companies: {}\n", ids.join(", ")));
    }
    out
}
