//! FHIR resource <-> dashboard record translation.
//!
//! Each submodule pairs a flattened record (`Ui*`, what the dashboard shows)
//! with an input shape (`*Input`, what the dashboard submits). Records are
//! built with `From<&Resource>`; inputs become resources with `to_fhir`.
//!
//! The extraction rules live here so every resource resolves names, codes,
//! references and dates the same way. None of them fail: a missing piece
//! yields an empty string or `None`.

pub mod allergy;
pub mod condition;
pub mod coverage;
pub mod encounter;
pub mod medication;
pub mod observation;
pub mod patient;
pub mod terminology;

pub use allergy::{AllergyInput, UiAllergy};
pub use condition::{ConditionInput, UiCondition};
pub use coverage::{CoverageInput, UiCoverage};
pub use encounter::{EncounterInput, UiEncounter};
pub use medication::{MedicationRequestInput, UiMedicationRequest};
pub use observation::{ObservationInput, UiObservation};
pub use patient::{PatientInput, UiPatient};

use chrono::{SecondsFormat, Utc};
use ehr_models::{
    Annotation, Bundle, CodeableConcept, Coding, ContactPoint, FhirResource, HumanName,
    Identifier, Period, Reference,
};

/// Trailing `/` segment of a reference string; empty when absent
pub fn extract_reference_id(reference: Option<&str>) -> String {
    reference
        .and_then(|r| r.rsplit('/').next())
        .unwrap_or("")
        .to_string()
}

pub fn reference_id(reference: Option<&Reference>) -> String {
    extract_reference_id(reference.and_then(|r| r.reference.as_deref()))
}

/// Display of a reference, else its id; `None` when neither is present
pub fn reference_label(reference: Option<&Reference>) -> Option<String> {
    let reference = reference?;
    reference
        .display
        .clone()
        .filter(|d| !d.is_empty())
        .or_else(|| Some(reference_id(Some(reference))).filter(|id| !id.is_empty()))
}

/// Human-readable form of a concept: `text`, then `coding[0].display`,
/// then `coding[0].code`, then empty.
pub fn codeable_text(concept: Option<&CodeableConcept>) -> String {
    let Some(concept) = concept else {
        return String::new();
    };
    if let Some(text) = concept.text.as_deref().filter(|t| !t.is_empty()) {
        return text.to_string();
    }
    let first = concept.first_coding();
    first
        .and_then(|c| c.display.as_deref())
        .filter(|d| !d.is_empty())
        .or_else(|| first.and_then(|c| c.code.as_deref()))
        .unwrap_or("")
        .to_string()
}

/// Machine form of a concept: `coding[0].code`, falling back to `text`.
/// Used for status-like concepts where the code is the value.
pub fn codeable_code(concept: Option<&CodeableConcept>) -> String {
    let Some(concept) = concept else {
        return String::new();
    };
    concept
        .first_coding()
        .and_then(|c| c.code.as_deref())
        .filter(|c| !c.is_empty())
        .or(concept.text.as_deref())
        .unwrap_or("")
        .to_string()
}

/// First, middle and last name of a person
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    pub first: String,
    pub middle: String,
    pub last: String,
}

/// `given[0]` is the first name, `given[1]` the middle name, `family` the
/// last name. A missing name yields empty strings.
pub fn extract_name(name: Option<&HumanName>) -> NameParts {
    let Some(name) = name else {
        return NameParts::default();
    };
    let given = name.given.as_deref().unwrap_or(&[]);
    NameParts {
        first: given.first().cloned().unwrap_or_default(),
        middle: given.get(1).cloned().unwrap_or_default(),
        last: name.family.clone().unwrap_or_default(),
    }
}

/// Value of the first contact point with the given `system`
pub fn find_telecom(telecom: &[ContactPoint], system: &str) -> Option<String> {
    telecom
        .iter()
        .find(|cp| cp.system.as_deref() == Some(system))
        .and_then(|cp| cp.value.clone())
}

/// Value of the first identifier typed with code `MR`
pub fn extract_mrn(identifiers: &[Identifier]) -> Option<String> {
    identifiers
        .iter()
        .find(|id| {
            id.identifier_type
                .as_ref()
                .is_some_and(|t| t.has_code(terminology::IDENTIFIER_TYPE_MRN))
        })
        .and_then(|id| id.value.clone())
}

/// Prefer the instant, then the period start, then empty. Never "now".
pub fn instant_or_period_start(instant: Option<&str>, period: Option<&Period>) -> String {
    instant
        .or_else(|| period.and_then(|p| p.start.as_deref()))
        .unwrap_or("")
        .to_string()
}

/// Text of the first annotation
pub fn first_note(notes: &[Annotation]) -> Option<String> {
    notes
        .iter()
        .map(|n| n.text.trim())
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

/// Map every entry of type `R` through `transform`, in bundle order.
/// An absent or empty `entry` yields an empty list; entries that do not
/// decode are left out.
pub fn transform_bundle<R, U>(bundle: &Bundle, transform: impl Fn(&R) -> U) -> Vec<U>
where
    R: FhirResource,
{
    let (resources, _) = bundle.resources_lenient::<R>();
    resources.iter().map(transform).collect()
}

/// Current instant, for stamping newly built resources
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Trimmed, non-empty copy of an optional input field
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// A concept coded in `system`, with the display doubling as text.
/// A blank code leaves a text-only concept.
pub(crate) fn coded_concept(system: &str, code: &str, display: Option<&str>) -> CodeableConcept {
    let display = non_blank(display);
    match non_blank(Some(code)) {
        Some(code) => {
            let mut coding = Coding::new(system, code);
            coding.display = display.clone();
            CodeableConcept {
                coding: Some(vec![coding]),
                text: display,
            }
        }
        None => CodeableConcept {
            coding: None,
            text: display,
        },
    }
}

/// A status-style concept: one coding, no text
pub(crate) fn status_concept(system: &str, code: &str) -> CodeableConcept {
    CodeableConcept::from_coding(Coding::new(system, code))
}

pub(crate) fn notes_from(text: Option<&str>) -> Option<Vec<Annotation>> {
    non_blank(text).map(|t| vec![Annotation::new(t)])
}
