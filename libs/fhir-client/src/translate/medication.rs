//! MedicationRequest <-> dashboard prescription record

use super::terminology::RXNORM;
use super::{
    codeable_text, coded_concept, first_note, non_blank, notes_from, now_timestamp,
    reference_id, reference_label,
};
use crate::error::{Error, Result};
use ehr_models::{CodeableConcept, Dosage, MedicationRequest, Reference, Timing};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiMedicationRequest {
    pub id: String,
    pub patient_id: String,
    pub medication: String,
    pub medication_code: Option<String>,
    pub status: String,
    pub intent: String,
    pub dosage: String,
    pub frequency: Option<String>,
    pub route: Option<String>,
    pub authored_on: String,
    pub prescriber: Option<String>,
    pub notes: Option<String>,
}

impl From<&MedicationRequest> for UiMedicationRequest {
    fn from(request: &MedicationRequest) -> Self {
        let concept = request.medication_codeable_concept.as_ref();
        let medication = match concept {
            Some(concept) => codeable_text(Some(concept)),
            None => reference_label(request.medication_reference.as_ref()).unwrap_or_default(),
        };
        let dosage = request.primary_dosage();

        Self {
            id: request.id.clone().unwrap_or_default(),
            patient_id: reference_id(request.subject.as_ref()),
            medication,
            medication_code: concept
                .and_then(|c| c.first_coding())
                .and_then(|c| c.code.clone()),
            status: request.status.clone().unwrap_or_default(),
            intent: request.intent.clone().unwrap_or_default(),
            dosage: dosage.and_then(|d| d.text.clone()).unwrap_or_default(),
            frequency: dosage
                .and_then(|d| d.timing.as_ref())
                .and_then(|t| t.code.as_ref())
                .map(|c| codeable_text(Some(c)))
                .filter(|f| !f.is_empty()),
            route: dosage
                .and_then(|d| d.route.as_ref())
                .map(|r| codeable_text(Some(r)))
                .filter(|r| !r.is_empty()),
            authored_on: request.authored_on.clone().unwrap_or_default(),
            prescriber: reference_label(request.requester.as_ref()),
            notes: first_note(request.notes()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicationRequestInput {
    pub patient_id: String,
    pub medication: String,
    pub medication_code: Option<String>,
    pub status: Option<String>,
    pub intent: Option<String>,
    pub dosage: String,
    pub frequency: Option<String>,
    pub route: Option<String>,
    pub authored_on: Option<String>,
    pub prescriber: Option<String>,
    pub notes: Option<String>,
}

impl MedicationRequestInput {
    pub fn validate(&self) -> Result<()> {
        if self.patient_id.trim().is_empty() {
            return Err(Error::validation("patient_id is required"));
        }
        if self.medication.trim().is_empty() {
            return Err(Error::validation("medication is required"));
        }
        if self.dosage.trim().is_empty() {
            return Err(Error::validation("dosage is required"));
        }
        Ok(())
    }

    pub fn to_fhir(&self) -> MedicationRequest {
        let code = self.medication_code.as_deref().unwrap_or("");
        let dosage = Dosage {
            text: non_blank(Some(&self.dosage)),
            timing: non_blank(self.frequency.as_deref()).map(|f| Timing {
                code: Some(CodeableConcept::from_text(f)),
                ..Default::default()
            }),
            route: non_blank(self.route.as_deref()).map(CodeableConcept::from_text),
            ..Default::default()
        };

        MedicationRequest {
            status: Some(non_blank(self.status.as_deref()).unwrap_or_else(|| "active".into())),
            intent: Some(non_blank(self.intent.as_deref()).unwrap_or_else(|| "order".into())),
            medication_codeable_concept: Some(coded_concept(
                RXNORM,
                code,
                Some(&self.medication),
            )),
            subject: Some(Reference::to("Patient", self.patient_id.trim())),
            authored_on: Some(non_blank(self.authored_on.as_deref()).unwrap_or_else(now_timestamp)),
            requester: non_blank(self.prescriber.as_deref()).map(|p| Reference {
                display: Some(p),
                ..Default::default()
            }),
            note: notes_from(self.notes.as_deref()),
            dosage_instruction: Some(vec![dosage]),
            ..MedicationRequest::new()
        }
    }
}
