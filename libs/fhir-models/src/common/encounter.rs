//! FHIR Encounter model

use super::datatypes::*;
use super::resource::fhir_resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// An interaction during which services are provided to the patient
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    /// Resource type - always "Encounter"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// planned | arrived | triaged | in-progress | onleave | finished | cancelled | ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Classification of patient encounter (AMB, IMP, EMER, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<Coding>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub encounter_type: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Vec<EncounterParticipant>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<EncounterLocation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider: Option<Reference>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// List of participants involved in the encounter
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncounterParticipant {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub participant_type: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    /// Persons involved in the encounter other than the patient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual: Option<Reference>,
}

/// List of locations where the patient has been
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncounterLocation {
    #[serde(default)]
    pub location: Reference,

    /// planned | active | reserved | completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

fhir_resource!(Encounter, Encounter, default_resource_type);

impl Encounter {
    pub fn new() -> Self {
        Self {
            resource_type: default_resource_type(),
            ..Default::default()
        }
    }

    pub fn types(&self) -> &[CodeableConcept] {
        self.encounter_type.as_deref().unwrap_or(&[])
    }

    pub fn reasons(&self) -> &[CodeableConcept] {
        self.reason_code.as_deref().unwrap_or(&[])
    }

    pub fn primary_participant(&self) -> Option<&EncounterParticipant> {
        self.participant.as_ref().and_then(|p| p.first())
    }

    pub fn primary_location(&self) -> Option<&EncounterLocation> {
        self.location.as_ref().and_then(|l| l.first())
    }
}
