//! Version-agnostic FHIR models
//!
//! The R4 subset the EHR dashboard reads and writes.

pub mod allergy_intolerance;
pub mod bundle;
pub mod capability_statement;
pub mod condition;
pub mod coverage;
pub mod datatypes;
pub mod encounter;
pub mod error;
pub mod medication_request;
pub mod observation;
pub mod patient;
pub mod resource;

// Re-export commonly used types
pub use allergy_intolerance::*;
pub use bundle::*;
pub use capability_statement::*;
pub use condition::*;
pub use coverage::*;
pub use datatypes::*;
pub use encounter::*;
pub use error::{Error, Result};
pub use medication_request::*;
pub use observation::*;
pub use patient::*;
pub use resource::{FhirResource, ResourceType};
