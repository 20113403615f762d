//! FHIR Coverage model

use super::datatypes::*;
use super::resource::fhir_resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Insurance or medical plan or a payment agreement
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    /// Resource type - always "Coverage"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// active | cancelled | draft | entered-in-error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Coverage category such as medical or accident
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub coverage_type: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<Reference>,

    /// ID assigned to the subscriber
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_id: Option<String>,

    /// Plan beneficiary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary: Option<Reference>,

    /// Beneficiary relationship to the subscriber
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    /// Issuer of the policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payor: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<Vec<CoverageClass>>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Additional coverage classifications (group, plan, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoverageClass {
    #[serde(rename = "type", default)]
    pub class_type: CodeableConcept,

    #[serde(default)]
    pub value: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fhir_resource!(Coverage, Coverage, default_resource_type);

impl Coverage {
    pub fn new() -> Self {
        Self {
            resource_type: default_resource_type(),
            ..Default::default()
        }
    }

    pub fn payors(&self) -> &[Reference] {
        self.payor.as_deref().unwrap_or(&[])
    }

    /// The class entry whose type carries `code` (e.g. "plan", "group")
    pub fn class_of(&self, code: &str) -> Option<&CoverageClass> {
        self.class
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .find(|c| c.class_type.has_code(code))
    }
}
