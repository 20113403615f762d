//! Encounter <-> dashboard visit record

use super::terminology::ENCOUNTER_CLASS;
use super::{codeable_text, non_blank, reference_id, reference_label};
use crate::error::{Error, Result};
use ehr_models::{
    CodeableConcept, Coding, Encounter, EncounterLocation, EncounterParticipant, Period, Reference,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiEncounter {
    pub id: String,
    pub patient_id: String,
    pub status: String,
    /// AMB, IMP, EMER, VR ...
    pub class_code: String,
    pub encounter_type: String,
    pub reason: Option<String>,
    pub start: String,
    pub end: String,
    pub practitioner: Option<String>,
    pub location: Option<String>,
}

impl From<&Encounter> for UiEncounter {
    fn from(encounter: &Encounter) -> Self {
        let period = encounter.period.as_ref();
        Self {
            id: encounter.id.clone().unwrap_or_default(),
            patient_id: reference_id(encounter.subject.as_ref()),
            status: encounter.status.clone().unwrap_or_default(),
            class_code: encounter
                .class
                .as_ref()
                .and_then(|c| c.code.clone())
                .unwrap_or_default(),
            encounter_type: codeable_text(encounter.types().first()),
            reason: encounter
                .reasons()
                .first()
                .map(|r| codeable_text(Some(r)))
                .filter(|r| !r.is_empty()),
            start: period.and_then(|p| p.start.clone()).unwrap_or_default(),
            end: period.and_then(|p| p.end.clone()).unwrap_or_default(),
            practitioner: reference_label(
                encounter
                    .primary_participant()
                    .and_then(|p| p.individual.as_ref()),
            ),
            location: reference_label(encounter.primary_location().map(|l| &l.location)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterInput {
    pub patient_id: String,
    pub status: Option<String>,
    pub class_code: Option<String>,
    pub encounter_type: Option<String>,
    pub reason: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub practitioner: Option<String>,
    pub location: Option<String>,
}

fn display_reference(display: String) -> Reference {
    Reference {
        display: Some(display),
        ..Default::default()
    }
}

impl EncounterInput {
    pub fn validate(&self) -> Result<()> {
        if self.patient_id.trim().is_empty() {
            return Err(Error::validation("patient_id is required"));
        }
        Ok(())
    }

    pub fn to_fhir(&self) -> Encounter {
        let class_code = non_blank(self.class_code.as_deref()).unwrap_or_else(|| "AMB".into());
        let start = non_blank(self.start.as_deref());
        let end = non_blank(self.end.as_deref());

        Encounter {
            status: Some(non_blank(self.status.as_deref()).unwrap_or_else(|| "planned".into())),
            class: Some(Coding::new(ENCOUNTER_CLASS, class_code)),
            encounter_type: non_blank(self.encounter_type.as_deref())
                .map(|t| vec![CodeableConcept::from_text(t)]),
            subject: Some(Reference::to("Patient", self.patient_id.trim())),
            participant: non_blank(self.practitioner.as_deref()).map(|p| {
                vec![EncounterParticipant {
                    individual: Some(display_reference(p)),
                    ..Default::default()
                }]
            }),
            period: (start.is_some() || end.is_some()).then_some(Period { start, end }),
            reason_code: non_blank(self.reason.as_deref())
                .map(|r| vec![CodeableConcept::from_text(r)]),
            location: non_blank(self.location.as_deref()).map(|l| {
                vec![EncounterLocation {
                    location: display_reference(l),
                    status: None,
                }]
            }),
            ..Encounter::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ehr_models::FhirResource;
    use serde_json::json;

    #[test]
    fn test_from_encounter() {
        let encounter = Encounter::from_value(json!({
            "resourceType": "Encounter",
            "id": "e1",
            "status": "finished",
            "class": {"system": ENCOUNTER_CLASS, "code": "IMP"},
            "type": [{"coding": [{"display": "Inpatient admission"}]}],
            "subject": {"reference": "Patient/42"},
            "participant": [{"individual": {"reference": "Practitioner/7"}}],
            "period": {"start": "2024-01-01T09:00:00Z", "end": "2024-01-03T12:00:00Z"},
            "location": [{"location": {"reference": "Location/1", "display": "Ward 3"}}]
        }))
        .unwrap();

        let record = UiEncounter::from(&encounter);
        assert_eq!(record.patient_id, "42");
        assert_eq!(record.status, "finished");
        assert_eq!(record.class_code, "IMP");
        assert_eq!(record.encounter_type, "Inpatient admission");
        assert_eq!(record.start, "2024-01-01T09:00:00Z");
        assert_eq!(record.end, "2024-01-03T12:00:00Z");
        assert_eq!(record.practitioner.as_deref(), Some("7"));
        assert_eq!(record.location.as_deref(), Some("Ward 3"));
        assert_eq!(record.reason, None);
    }

    #[test]
    fn test_defaults() {
        let input = EncounterInput {
            patient_id: "42".to_string(),
            ..Default::default()
        };
        let encounter = input.to_fhir();

        assert_eq!(encounter.status.as_deref(), Some("planned"));
        assert_eq!(encounter.class.as_ref().and_then(|c| c.code.as_deref()), Some("AMB"));
        assert!(encounter.period.is_none());
    }

    #[test]
    fn test_round_trip() {
        let input = EncounterInput {
            patient_id: "42".to_string(),
            status: Some("in-progress".to_string()),
            class_code: Some("VR".to_string()),
            encounter_type: Some("Telehealth follow-up".to_string()),
            reason: Some("Hypertension review".to_string()),
            start: Some("2024-04-01T14:00:00Z".to_string()),
            end: Some("2024-04-01T14:30:00Z".to_string()),
            practitioner: Some("Dr. Smith".to_string()),
            location: Some("Virtual".to_string()),
        };
        let record = UiEncounter::from(&input.to_fhir());

        assert_eq!(record.patient_id, "42");
        assert_eq!(record.status, "in-progress");
        assert_eq!(record.class_code, "VR");
        assert_eq!(record.encounter_type, "Telehealth follow-up");
        assert_eq!(record.reason.as_deref(), Some("Hypertension review"));
        assert_eq!(record.start, "2024-04-01T14:00:00Z");
        assert_eq!(record.end, "2024-04-01T14:30:00Z");
        assert_eq!(record.practitioner.as_deref(), Some("Dr. Smith"));
        assert_eq!(record.location.as_deref(), Some("Virtual"));
    }
}
