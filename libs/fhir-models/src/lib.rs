//! FHIR data models
//!
//! This crate provides strongly-typed Rust structures for the FHIR resources
//! the EHR dashboard exchanges with a FHIR server: Patient, Observation,
//! Condition, MedicationRequest, AllergyIntolerance, Encounter, Coverage,
//! plus Bundle and CapabilityStatement.
//!
//! # Design Philosophy
//!
//! - **Optional by default**: FHIR JSON omits freely, so nearly every field is an `Option`
//! - **Lossless**: an `extensions` map captures every member a model does not name
//! - **Typed discriminator**: [`FhirResource`] binds each struct to its `resourceType`
//!
//! # Example
//!
//! ```rust
//! use ehr_models::common::{FhirResource, Patient};
//! use serde_json::json;
//!
//! let patient = Patient::from_value(json!({
//!     "resourceType": "Patient",
//!     "id": "42",
//!     "name": [{"family": "Doe", "given": ["Jane"]}]
//! }))
//! .unwrap();
//!
//! assert_eq!(patient.id(), Some("42"));
//! assert_eq!(patient.primary_name().unwrap().family.as_deref(), Some("Doe"));
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
