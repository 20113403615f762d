//! FHIR CapabilityStatement model (subset)
//!
//! Only what a client needs to identify the server it is talking to.

use super::resource::fhir_resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A statement of system capabilities, as returned by `GET [base]/metadata`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityStatement {
    /// Resource type - always "CapabilityStatement"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// draft | active | retired | unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// instance | capability | requirements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub software: Option<Software>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<Implementation>,

    /// FHIR Version the system supports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhir_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Vec<String>>,

    /// Additional content beyond core fields (rest, messaging, ...)
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Software that is covered by this capability statement
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Software {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

/// If this describes a specific instance
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Implementation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fhir_resource!(CapabilityStatement, CapabilityStatement, default_resource_type);
