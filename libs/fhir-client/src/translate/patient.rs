//! Patient <-> dashboard patient record

use super::terminology::{IDENTIFIER_TYPE, IDENTIFIER_TYPE_MRN};
use super::{extract_mrn, extract_name, find_telecom, non_blank};
use crate::error::{Error, Result};
use ehr_models::{Address, CodeableConcept, Coding, ContactPoint, HumanName, Identifier, Patient};
use serde::{Deserialize, Serialize};

/// Flattened patient as listed and edited by the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiPatient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub date_of_birth: String,
    pub gender: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub mrn: Option<String>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Patient> for UiPatient {
    fn from(patient: &Patient) -> Self {
        let name = extract_name(patient.primary_name());
        let address = patient.primary_address();
        let last_updated = patient
            .meta
            .as_ref()
            .and_then(|m| m.last_updated.clone())
            .unwrap_or_default();

        Self {
            id: patient.id.clone().unwrap_or_default(),
            first_name: name.first,
            last_name: name.last,
            middle_name: Some(name.middle).filter(|m| !m.is_empty()),
            date_of_birth: patient.birth_date.clone().unwrap_or_default(),
            gender: patient.gender.clone().unwrap_or_default(),
            phone: find_telecom(patient.telecoms(), "phone"),
            email: find_telecom(patient.telecoms(), "email"),
            street_address: address
                .and_then(|a| a.line.as_ref())
                .and_then(|lines| lines.first().cloned()),
            city: address.and_then(|a| a.city.clone()),
            state: address.and_then(|a| a.state.clone()),
            postal_code: address.and_then(|a| a.postal_code.clone()),
            country: address.and_then(|a| a.country.clone()),
            mrn: extract_mrn(patient.identifiers()),
            active: patient.active.unwrap_or(true),
            created_at: last_updated.clone(),
            updated_at: last_updated,
        }
    }
}

/// Patient fields submitted by the create/edit forms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientInput {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub date_of_birth: String,
    pub gender: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub mrn: Option<String>,
    pub active: Option<bool>,
}

impl PatientInput {
    pub fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(Error::validation("first_name is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(Error::validation("last_name is required"));
        }
        Ok(())
    }

    /// Build the Patient resource to send on create/update
    pub fn to_fhir(&self) -> Patient {
        let mut given = vec![self.first_name.trim().to_string()];
        given.extend(non_blank(self.middle_name.as_deref()));

        let telecom: Vec<ContactPoint> = [
            ("phone", self.phone.as_deref()),
            ("email", self.email.as_deref()),
        ]
        .into_iter()
        .filter_map(|(system, value)| non_blank(value).map(|v| ContactPoint::new(system, v)))
        .collect();

        let address = Address {
            line: non_blank(self.street_address.as_deref()).map(|l| vec![l]),
            city: non_blank(self.city.as_deref()),
            state: non_blank(self.state.as_deref()),
            postal_code: non_blank(self.postal_code.as_deref()),
            country: non_blank(self.country.as_deref()),
            ..Default::default()
        };

        let identifier = non_blank(self.mrn.as_deref()).map(|mrn| {
            vec![Identifier {
                identifier_type: Some(CodeableConcept::from_coding(Coding::new(
                    IDENTIFIER_TYPE,
                    IDENTIFIER_TYPE_MRN,
                ))),
                value: Some(mrn),
                ..Default::default()
            }]
        });

        Patient {
            identifier,
            active: Some(self.active.unwrap_or(true)),
            name: Some(vec![HumanName {
                family: Some(self.last_name.trim().to_string()),
                given: Some(given),
                ..Default::default()
            }]),
            telecom: (!telecom.is_empty()).then_some(telecom),
            gender: non_blank(Some(&self.gender)),
            birth_date: non_blank(Some(&self.date_of_birth)),
            address: (address != Address::default()).then(|| vec![address]),
            ..Patient::new()
        }
    }

    /// Build the replacement for `current`; an unset `active` keeps the
    /// stored value instead of defaulting to true
    pub fn to_fhir_replacing(&self, current: &Patient) -> Patient {
        Patient {
            active: self.active.or(current.active),
            ..self.to_fhir()
        }
    }
}
