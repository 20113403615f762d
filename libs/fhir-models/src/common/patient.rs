//! FHIR Patient model

use super::datatypes::*;
use super::resource::fhir_resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Demographics and other administrative information about an individual
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Resource type - always "Patient"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// An identifier for this patient (MRN, national id, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    /// Whether this patient's record is in active use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<HumanName>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<ContactPoint>>,

    /// male | female | other | unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deceased_boolean: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<Address>>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fhir_resource!(Patient, Patient, default_resource_type);

impl Patient {
    pub fn new() -> Self {
        Self {
            resource_type: default_resource_type(),
            ..Default::default()
        }
    }

    /// The first name entry, which is the one the dashboard edits
    pub fn primary_name(&self) -> Option<&HumanName> {
        self.name.as_ref().and_then(|names| names.first())
    }

    pub fn telecoms(&self) -> &[ContactPoint] {
        self.telecom.as_deref().unwrap_or(&[])
    }

    pub fn identifiers(&self) -> &[Identifier] {
        self.identifier.as_deref().unwrap_or(&[])
    }

    pub fn primary_address(&self) -> Option<&Address> {
        self.address.as_ref().and_then(|a| a.first())
    }
}
