//! Client-side appraiser registration: a six-step wizard over one transient record.
//!
//! Nothing here talks to the database. The final hand-off goes through a
//! [`RegistrationSink`]; the default sink rejects every submission.

pub mod completion;
pub mod domain;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use completion::{
    complete, CompletionError, CompletionReceipt, RegistrationSink, UnwiredRegistrationSink,
};
pub use domain::{
    parse_selected_ids, DocumentKind, FileReference, ReferenceContact, RegistrationData,
    RegistrationPatch, REFERENCE_COUNT,
};
pub use wizard::{RegistrationWizard, WizardError, WizardStep, STEP_COUNT};
