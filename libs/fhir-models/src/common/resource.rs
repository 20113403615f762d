//! Resource discriminator and the trait tying each model to it

use super::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The `resourceType` values this crate models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Patient,
    Observation,
    Condition,
    MedicationRequest,
    AllergyIntolerance,
    Encounter,
    Coverage,
    Bundle,
    CapabilityStatement,
    OperationOutcome,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "Patient",
            Self::Observation => "Observation",
            Self::Condition => "Condition",
            Self::MedicationRequest => "MedicationRequest",
            Self::AllergyIntolerance => "AllergyIntolerance",
            Self::Encounter => "Encounter",
            Self::Coverage => "Coverage",
            Self::Bundle => "Bundle",
            Self::CapabilityStatement => "CapabilityStatement",
            Self::OperationOutcome => "OperationOutcome",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Patient" => Ok(Self::Patient),
            "Observation" => Ok(Self::Observation),
            "Condition" => Ok(Self::Condition),
            "MedicationRequest" => Ok(Self::MedicationRequest),
            "AllergyIntolerance" => Ok(Self::AllergyIntolerance),
            "Encounter" => Ok(Self::Encounter),
            "Coverage" => Ok(Self::Coverage),
            "Bundle" => Ok(Self::Bundle),
            "CapabilityStatement" => Ok(Self::CapabilityStatement),
            "OperationOutcome" => Ok(Self::OperationOutcome),
            other => Err(Error::UnknownResourceType(other.to_string())),
        }
    }
}

/// A typed FHIR resource with a fixed `resourceType`.
///
/// Implemented by every resource model so transport code can stay generic:
/// the discriminator picks the endpoint, serde does the rest.
pub trait FhirResource: Serialize + DeserializeOwned + Send + Sync {
    const RESOURCE_TYPE: ResourceType;

    /// Server-assigned logical id
    fn id(&self) -> Option<&str>;

    /// Decode from JSON, rejecting a mismatched `resourceType`
    fn from_value(value: Value) -> Result<Self> {
        match value.get("resourceType").and_then(Value::as_str) {
            Some(actual) if actual != Self::RESOURCE_TYPE.as_str() => {
                Err(Error::UnexpectedResourceType {
                    expected: Self::RESOURCE_TYPE.as_str().to_string(),
                    actual: actual.to_string(),
                })
            }
            _ => serde_json::from_value(value).map_err(Error::from),
        }
    }

    fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::from)
    }
}

/// Implements `FhirResource` plus the `resourceType` default for a model.
macro_rules! fhir_resource {
    ($ty:ident, $variant:ident, $default_fn:ident) => {
        impl $crate::common::resource::FhirResource for $ty {
            const RESOURCE_TYPE: $crate::common::resource::ResourceType =
                $crate::common::resource::ResourceType::$variant;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }
        }

        fn $default_fn() -> String {
            $crate::common::resource::ResourceType::$variant
                .as_str()
                .to_string()
        }
    };
}

pub(crate) use fhir_resource;
