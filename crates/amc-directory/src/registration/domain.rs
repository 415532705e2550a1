use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::wizard::WizardStep;
use crate::directory::{Company, CompanyId};

pub const REFERENCE_COUNT: usize = 3;

/// Uploaded document slots offered on the documents step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    License,
    ErrorsAndOmissions,
    W9,
    Resume,
    SampleReport,
}

/// Client-side handle for a selected file. The wizard never reads file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub file_name: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceContact {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub relationship: String,
}

/// Everything collected by the registration wizard. Transient; never persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationData {
    pub selected_company_ids: Vec<CompanyId>,
    pub step: WizardStep,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub reg_email: Option<String>,
    pub reg_phone: Option<String>,
    pub years_experience: Option<String>,

    pub company_name: Option<String>,
    pub license_number: Option<String>,
    pub license_state: Option<String>,
    pub license_expiration: Option<String>,

    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,

    pub business_type: Option<String>,
    pub tax_id: Option<String>,
    pub formation_date: Option<String>,

    pub documents: BTreeMap<DocumentKind, FileReference>,
    pub references: [ReferenceContact; REFERENCE_COUNT],
    pub designations: BTreeSet<String>,
    pub specialties: BTreeSet<String>,
    pub languages: BTreeSet<String>,
    pub geographic_coverage: BTreeSet<String>,

    pub terms_accepted: bool,
    pub privacy_accepted: bool,
}

impl Default for RegistrationData {
    fn default() -> Self {
        Self {
            selected_company_ids: Vec::new(),
            step: WizardStep::Personal,
            first_name: None,
            last_name: None,
            reg_email: None,
            reg_phone: None,
            years_experience: None,
            company_name: None,
            license_number: None,
            license_state: None,
            license_expiration: None,
            address1: None,
            address2: None,
            city: None,
            state: None,
            zip: None,
            business_type: None,
            tax_id: None,
            formation_date: None,
            documents: BTreeMap::new(),
            references: Default::default(),
            designations: BTreeSet::new(),
            specialties: BTreeSet::new(),
            languages: BTreeSet::new(),
            geographic_coverage: BTreeSet::new(),
            terms_accepted: false,
            privacy_accepted: false,
        }
    }
}

/// Parses the `ids` query value: comma separated, empty segments and repeats
/// dropped, first occurrence order kept.
pub fn parse_selected_ids(raw: &str) -> Vec<CompanyId> {
    distinct_ids(
        raw.split(',')
            .filter(|segment| !segment.is_empty())
            .map(|segment| CompanyId(segment.to_string())),
    )
}

fn distinct_ids(ids: impl IntoIterator<Item = CompanyId>) -> Vec<CompanyId> {
    let mut seen = BTreeSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

impl RegistrationData {
    /// Companies from `catalog` whose ids were selected, in catalog order.
    pub fn selected_companies<'a>(&self, catalog: &'a [Company]) -> Vec<&'a Company> {
        catalog
            .iter()
            .filter(|company| self.selected_company_ids.contains(&company.id))
            .collect()
    }

    /// Shallow merge: every field present in `patch` replaces the current value wholesale.
    pub fn merge(&mut self, patch: RegistrationPatch) {
        macro_rules! replace {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = patch.$field {
                    self.$field = value;
                })*
            };
        }

        replace!(
            selected_company_ids,
            first_name,
            last_name,
            reg_email,
            reg_phone,
            years_experience,
            company_name,
            license_number,
            license_state,
            license_expiration,
            address1,
            address2,
            city,
            state,
            zip,
            business_type,
            tax_id,
            formation_date,
            documents,
            references,
            designations,
            specialties,
            languages,
            geographic_coverage,
            terms_accepted,
            privacy_accepted,
        );
        self.selected_company_ids = distinct_ids(std::mem::take(&mut self.selected_company_ids));
    }
}

/// Partial update to [`RegistrationData`]. The step is owned by the wizard and
/// cannot be patched.
///
/// Optional text fields use a nested option: `"city": null` clears the field,
/// while an absent key leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationPatch {
    pub selected_company_ids: Option<Vec<CompanyId>>,
    #[serde(deserialize_with = "present")]
    pub first_name: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub last_name: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub reg_email: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub reg_phone: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub years_experience: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub company_name: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub license_number: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub license_state: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub license_expiration: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub address1: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub address2: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub city: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub state: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub zip: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub business_type: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub tax_id: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub formation_date: Option<Option<String>>,
    pub documents: Option<BTreeMap<DocumentKind, FileReference>>,
    pub references: Option<[ReferenceContact; REFERENCE_COUNT]>,
    pub designations: Option<BTreeSet<String>>,
    pub specialties: Option<BTreeSet<String>>,
    pub languages: Option<BTreeSet<String>>,
    pub geographic_coverage: Option<BTreeSet<String>>,
    pub terms_accepted: Option<bool>,
    pub privacy_accepted: Option<bool>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_query_drops_empty_segments() {
        assert_eq!(
            parse_selected_ids("3,,7,"),
            vec![CompanyId("3".to_string()), CompanyId("7".to_string())]
        );
        assert!(parse_selected_ids("").is_empty());
        assert!(parse_selected_ids(",,").is_empty());
    }

    #[test]
    fn ids_query_collapses_repeats_in_first_seen_order() {
        assert_eq!(
            parse_selected_ids("3,7,3,,7,1"),
            vec![
                CompanyId("3".to_string()),
                CompanyId("7".to_string()),
                CompanyId("1".to_string())
            ]
        );
    }

    #[test]
    fn merged_selection_holds_each_company_once() {
        let mut data = RegistrationData::default();
        let patch: RegistrationPatch = serde_json::from_value(json!({
            "selectedCompanyIds": ["5", "2", "5"]
        }))
        .unwrap();
        data.merge(patch);

        assert_eq!(
            data.selected_company_ids,
            vec![CompanyId("5".to_string()), CompanyId("2".to_string())]
        );
    }

    #[test]
    fn default_record_has_three_blank_references() {
        let data = RegistrationData::default();
        assert_eq!(data.references.len(), REFERENCE_COUNT);
        assert!(data.references.iter().all(|r| r.name.is_empty()));
        assert_eq!(data.step, WizardStep::Personal);
        assert!(!data.terms_accepted);
    }

    #[test]
    fn merge_replaces_only_supplied_fields() {
        let mut data = RegistrationData::default();
        data.city = Some("Des Moines".to_string());
        data.designations.insert("SRA".to_string());

        let patch: RegistrationPatch = serde_json::from_value(json!({
            "firstName": "Dana",
            "specialties": ["Residential"],
            "termsAccepted": true
        }))
        .unwrap();
        data.merge(patch);

        assert_eq!(data.first_name.as_deref(), Some("Dana"));
        assert_eq!(data.city.as_deref(), Some("Des Moines"));
        assert!(data.designations.contains("SRA"));
        assert!(data.specialties.contains("Residential"));
        assert!(data.terms_accepted);
    }

    #[test]
    fn merge_replaces_collections_wholesale_and_clears_on_null() {
        let mut data = RegistrationData::default();
        data.languages.insert("English".to_string());
        data.city = Some("Ames".to_string());

        let patch: RegistrationPatch = serde_json::from_value(json!({
            "languages": ["Spanish"],
            "city": null
        }))
        .unwrap();
        data.merge(patch);

        assert_eq!(data.languages.len(), 1);
        assert!(data.languages.contains("Spanish"));
        assert_eq!(data.city, None);
    }

    #[test]
    fn selected_companies_keep_catalog_order() {
        let catalog: Vec<Company> = ["Alpha AMC", "Beta AMC", "Gamma AMC"]
            .iter()
            .enumerate()
            .map(|(index, name)| Company {
                id: CompanyId::from(index as i64 + 1),
                name: name.to_string(),
                phone: String::new(),
                email: String::new(),
                state: String::new(),
                website: String::new(),
                signup_url: String::new(),
                created_at: None,
            })
            .collect();

        let mut data = RegistrationData::default();
        data.selected_company_ids = parse_selected_ids("3,1,9");

        let names: Vec<&str> = data
            .selected_companies(&catalog)
            .iter()
            .map(|company| company.name.as_str())
            .collect();
        assert_eq!(names, ["Alpha AMC", "Gamma AMC"]);
    }
}
