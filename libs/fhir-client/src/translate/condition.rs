//! Condition <-> dashboard problem-list record

use super::terminology::{
    CONDITION_CATEGORY, CONDITION_CLINICAL, CONDITION_VERIFICATION, SNOMED_CT,
};
use super::{
    codeable_code, codeable_text, coded_concept, first_note, instant_or_period_start, non_blank,
    notes_from, now_timestamp, reference_id, status_concept,
};
use crate::error::{Error, Result};
use ehr_models::{CodeableConcept, Condition, Reference};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiCondition {
    pub id: String,
    pub patient_id: String,
    pub code: String,
    pub display: String,
    pub clinical_status: String,
    pub verification_status: String,
    pub category: Option<String>,
    pub severity: Option<String>,
    pub onset_date: String,
    pub recorded_date: String,
    pub notes: Option<String>,
}

impl From<&Condition> for UiCondition {
    fn from(condition: &Condition) -> Self {
        let code = condition.code.as_ref();
        Self {
            id: condition.id.clone().unwrap_or_default(),
            patient_id: reference_id(condition.subject.as_ref()),
            code: code
                .and_then(|c| c.first_coding())
                .and_then(|c| c.code.clone())
                .unwrap_or_default(),
            display: codeable_text(code),
            clinical_status: codeable_code(condition.clinical_status.as_ref()),
            verification_status: codeable_code(condition.verification_status.as_ref()),
            category: condition
                .categories()
                .first()
                .map(|c| codeable_code(Some(c)))
                .filter(|c| !c.is_empty()),
            severity: condition
                .severity
                .as_ref()
                .map(|s| codeable_text(Some(s)))
                .filter(|s| !s.is_empty()),
            onset_date: instant_or_period_start(
                condition.onset_date_time.as_deref(),
                condition.onset_period.as_ref(),
            ),
            recorded_date: condition.recorded_date.clone().unwrap_or_default(),
            notes: first_note(condition.notes()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionInput {
    pub patient_id: String,
    pub code: String,
    pub display: Option<String>,
    pub clinical_status: Option<String>,
    pub verification_status: Option<String>,
    pub category: Option<String>,
    pub severity: Option<String>,
    pub onset_date: Option<String>,
    pub recorded_date: Option<String>,
    pub notes: Option<String>,
}

impl ConditionInput {
    /// A condition needs a patient and either a code or a display
    pub fn validate(&self) -> Result<()> {
        if self.patient_id.trim().is_empty() {
            return Err(Error::validation("patient_id is required"));
        }
        if self.code.trim().is_empty() && non_blank(self.display.as_deref()).is_none() {
            return Err(Error::validation("code or display is required"));
        }
        Ok(())
    }

    pub fn to_fhir(&self) -> Condition {
        let clinical = non_blank(self.clinical_status.as_deref()).unwrap_or_else(|| "active".into());
        let verification =
            non_blank(self.verification_status.as_deref()).unwrap_or_else(|| "confirmed".into());

        Condition {
            clinical_status: Some(status_concept(CONDITION_CLINICAL, &clinical)),
            verification_status: Some(status_concept(CONDITION_VERIFICATION, &verification)),
            category: non_blank(self.category.as_deref())
                .map(|c| vec![status_concept(CONDITION_CATEGORY, &c)]),
            severity: non_blank(self.severity.as_deref()).map(CodeableConcept::from_text),
            code: Some(coded_concept(SNOMED_CT, &self.code, self.display.as_deref())),
            subject: Some(Reference::to("Patient", self.patient_id.trim())),
            onset_date_time: non_blank(self.onset_date.as_deref()),
            recorded_date: Some(
                non_blank(self.recorded_date.as_deref()).unwrap_or_else(now_timestamp),
            ),
            note: notes_from(self.notes.as_deref()),
            ..Condition::new()
        }
    }
}
