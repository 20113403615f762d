//! FHIR AllergyIntolerance model

use super::datatypes::*;
use super::resource::fhir_resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Risk of harmful or undesirable physiological response to a substance
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllergyIntolerance {
    /// Resource type - always "AllergyIntolerance"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// active | inactive | resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_status: Option<CodeableConcept>,

    /// unconfirmed | confirmed | refuted | entered-in-error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<CodeableConcept>,

    /// allergy | intolerance
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub allergy_type: Option<String>,

    /// food | medication | environment | biologic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,

    /// low | high | unable-to-assess
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criticality: Option<String>,

    /// Code that identifies the allergy or intolerance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    /// Who the sensitivity is for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset_date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset_period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorder: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<Vec<AllergyReaction>>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Adverse reaction events linked to exposure to substance
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllergyReaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substance: Option<CodeableConcept>,

    /// Clinical symptoms/signs associated with the event
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manifestation: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset: Option<String>,

    /// mild | moderate | severe
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

fhir_resource!(AllergyIntolerance, AllergyIntolerance, default_resource_type);

impl AllergyIntolerance {
    pub fn new() -> Self {
        Self {
            resource_type: default_resource_type(),
            ..Default::default()
        }
    }

    pub fn primary_reaction(&self) -> Option<&AllergyReaction> {
        self.reaction.as_ref().and_then(|r| r.first())
    }

    pub fn notes(&self) -> &[Annotation] {
        self.note.as_deref().unwrap_or(&[])
    }
}
