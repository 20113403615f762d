//! FHIR MedicationRequest model

use super::datatypes::*;
use super::resource::fhir_resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// An order or request for the supply and administration of a medication
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    /// Resource type - always "MedicationRequest"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// active | on-hold | cancelled | completed | entered-in-error | stopped | draft | unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// proposal | plan | order | original-order | ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_codeable_concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_reference: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// When request was initially authored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authored_on: Option<String>,

    /// Who/What requested the Request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage_instruction: Option<Vec<Dosage>>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fhir_resource!(MedicationRequest, MedicationRequest, default_resource_type);

impl MedicationRequest {
    pub fn new() -> Self {
        Self {
            resource_type: default_resource_type(),
            ..Default::default()
        }
    }

    /// The first dosage instruction, which is the one the dashboard shows
    pub fn primary_dosage(&self) -> Option<&Dosage> {
        self.dosage_instruction.as_ref().and_then(|d| d.first())
    }

    pub fn notes(&self) -> &[Annotation] {
        self.note.as_deref().unwrap_or(&[])
    }
}
