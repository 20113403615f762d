//! Observation <-> dashboard observation record

use super::terminology::{LOINC, OBSERVATION_CATEGORY, UCUM};
use super::{
    codeable_code, codeable_text, coded_concept, first_note, instant_or_period_start, non_blank,
    notes_from, now_timestamp, reference_id, status_concept,
};
use crate::error::{Error, Result};
use ehr_models::{Observation, Quantity, Reference};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiObservation {
    pub id: String,
    pub patient_id: String,
    /// Code of `code.coding[0]`, e.g. a LOINC code
    pub code: String,
    pub display: String,
    pub category: String,
    pub value: String,
    pub unit: Option<String>,
    pub status: String,
    pub effective_date: String,
    pub issued: Option<String>,
    pub notes: Option<String>,
}

/// Observation value as `(value, unit)`.
///
/// `valueQuantity` wins over `valueString`, which wins over
/// `valueCodeableConcept`. A quantity without a unit falls back to its code.
fn observation_value(observation: &Observation) -> (String, Option<String>) {
    if let Some(quantity) = &observation.value_quantity {
        let value = quantity.value.map(|v| v.to_string()).unwrap_or_default();
        let unit = quantity.unit.clone().or_else(|| quantity.code.clone());
        return (value, unit);
    }
    if let Some(value) = &observation.value_string {
        return (value.clone(), None);
    }
    if let Some(concept) = &observation.value_codeable_concept {
        return (codeable_text(Some(concept)), None);
    }

    tracing::debug!(
        observation_id = observation.id.as_deref().unwrap_or(""),
        "Observation carries no supported value"
    );
    (String::new(), None)
}

impl From<&Observation> for UiObservation {
    fn from(observation: &Observation) -> Self {
        let (value, unit) = observation_value(observation);
        let code = observation.code.as_ref();

        Self {
            id: observation.id.clone().unwrap_or_default(),
            patient_id: reference_id(observation.subject.as_ref()),
            code: code
                .and_then(|c| c.first_coding())
                .and_then(|c| c.code.clone())
                .unwrap_or_default(),
            display: codeable_text(code),
            category: codeable_code(observation.categories().first()),
            value,
            unit,
            status: observation.status.clone().unwrap_or_default(),
            effective_date: instant_or_period_start(
                observation.effective_date_time.as_deref(),
                observation.effective_period.as_ref(),
            ),
            issued: observation.issued.clone(),
            notes: first_note(observation.notes()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationInput {
    pub patient_id: String,
    pub code: String,
    pub display: Option<String>,
    pub category: Option<String>,
    pub value: String,
    pub unit: Option<String>,
    pub status: Option<String>,
    pub effective_date: Option<String>,
    pub notes: Option<String>,
}

impl ObservationInput {
    pub fn validate(&self) -> Result<()> {
        if self.patient_id.trim().is_empty() {
            return Err(Error::validation("patient_id is required"));
        }
        if self.code.trim().is_empty() {
            return Err(Error::validation("code is required"));
        }
        if self.value.trim().is_empty() {
            return Err(Error::validation("value is required"));
        }
        Ok(())
    }

    /// Numeric values become `valueQuantity` (UCUM), anything else `valueString`
    pub fn to_fhir(&self) -> Observation {
        let value = self.value.trim();
        let (value_quantity, value_string) = match value.parse::<f64>() {
            Ok(number) if number.is_finite() => {
                let unit = non_blank(self.unit.as_deref());
                let quantity = Quantity {
                    value: Some(number),
                    system: unit.as_ref().map(|_| UCUM.to_string()),
                    code: unit.clone(),
                    unit,
                    ..Default::default()
                };
                (Some(quantity), None)
            }
            _ => (None, Some(value.to_string())),
        };

        Observation {
            status: Some(non_blank(self.status.as_deref()).unwrap_or_else(|| "final".to_string())),
            category: non_blank(self.category.as_deref())
                .map(|c| vec![status_concept(OBSERVATION_CATEGORY, &c)]),
            code: Some(coded_concept(LOINC, &self.code, self.display.as_deref())),
            subject: Some(Reference::to("Patient", self.patient_id.trim())),
            effective_date_time: Some(
                non_blank(self.effective_date.as_deref()).unwrap_or_else(now_timestamp),
            ),
            value_quantity,
            value_string,
            note: notes_from(self.notes.as_deref()),
            ..Observation::new()
        }
    }
}
