//! AllergyIntolerance <-> dashboard allergy record

use super::terminology::{ALLERGY_CLINICAL, ALLERGY_VERIFICATION, SNOMED_CT};
use super::{
    codeable_code, codeable_text, coded_concept, first_note, instant_or_period_start, non_blank,
    notes_from, now_timestamp, reference_id, status_concept,
};
use crate::error::{Error, Result};
use ehr_models::{AllergyIntolerance, AllergyReaction, CodeableConcept, Reference};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiAllergy {
    pub id: String,
    pub patient_id: String,
    pub allergen: String,
    pub allergen_code: Option<String>,
    /// food | medication | environment | biologic
    pub category: Option<String>,
    pub criticality: Option<String>,
    pub clinical_status: String,
    pub verification_status: String,
    /// Manifestation of the first reaction
    pub reaction: Option<String>,
    pub severity: Option<String>,
    pub onset_date: String,
    pub recorded_date: String,
    pub notes: Option<String>,
}

impl From<&AllergyIntolerance> for UiAllergy {
    fn from(allergy: &AllergyIntolerance) -> Self {
        let code = allergy.code.as_ref();
        let reaction = allergy.primary_reaction();

        Self {
            id: allergy.id.clone().unwrap_or_default(),
            patient_id: reference_id(allergy.patient.as_ref()),
            allergen: codeable_text(code),
            allergen_code: code
                .and_then(|c| c.first_coding())
                .and_then(|c| c.code.clone()),
            category: allergy
                .category
                .as_ref()
                .and_then(|c| c.first().cloned()),
            criticality: allergy.criticality.clone(),
            clinical_status: codeable_code(allergy.clinical_status.as_ref()),
            verification_status: codeable_code(allergy.verification_status.as_ref()),
            reaction: reaction
                .and_then(|r| r.manifestation.first())
                .map(|m| codeable_text(Some(m)))
                .filter(|m| !m.is_empty())
                .or_else(|| reaction.and_then(|r| r.description.clone())),
            severity: reaction.and_then(|r| r.severity.clone()),
            onset_date: instant_or_period_start(
                allergy.onset_date_time.as_deref(),
                allergy.onset_period.as_ref(),
            ),
            recorded_date: allergy.recorded_date.clone().unwrap_or_default(),
            notes: first_note(allergy.notes()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllergyInput {
    pub patient_id: String,
    pub allergen: String,
    pub allergen_code: Option<String>,
    pub category: Option<String>,
    pub criticality: Option<String>,
    pub clinical_status: Option<String>,
    pub verification_status: Option<String>,
    pub reaction: Option<String>,
    pub severity: Option<String>,
    pub onset_date: Option<String>,
    pub recorded_date: Option<String>,
    pub notes: Option<String>,
}

impl AllergyInput {
    pub fn validate(&self) -> Result<()> {
        if self.patient_id.trim().is_empty() {
            return Err(Error::validation("patient_id is required"));
        }
        if self.allergen.trim().is_empty() {
            return Err(Error::validation("allergen is required"));
        }
        Ok(())
    }

    pub fn to_fhir(&self) -> AllergyIntolerance {
        let clinical = non_blank(self.clinical_status.as_deref()).unwrap_or_else(|| "active".into());
        let verification =
            non_blank(self.verification_status.as_deref()).unwrap_or_else(|| "confirmed".into());
        let severity = non_blank(self.severity.as_deref());

        let reaction = match non_blank(self.reaction.as_deref()) {
            Some(manifestation) => Some(vec![AllergyReaction {
                manifestation: vec![CodeableConcept::from_text(manifestation)],
                severity,
                ..Default::default()
            }]),
            None => severity.map(|severity| {
                vec![AllergyReaction {
                    severity: Some(severity),
                    ..Default::default()
                }]
            }),
        };

        AllergyIntolerance {
            clinical_status: Some(status_concept(ALLERGY_CLINICAL, &clinical)),
            verification_status: Some(status_concept(ALLERGY_VERIFICATION, &verification)),
            category: non_blank(self.category.as_deref()).map(|c| vec![c]),
            criticality: non_blank(self.criticality.as_deref()),
            code: Some(coded_concept(
                SNOMED_CT,
                self.allergen_code.as_deref().unwrap_or(""),
                Some(&self.allergen),
            )),
            patient: Some(Reference::to("Patient", self.patient_id.trim())),
            onset_date_time: non_blank(self.onset_date.as_deref()),
            recorded_date: Some(
                non_blank(self.recorded_date.as_deref()).unwrap_or_else(now_timestamp),
            ),
            note: notes_from(self.notes.as_deref()),
            reaction,
            ..AllergyIntolerance::new()
        }
    }
}
