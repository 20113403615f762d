//! Coverage <-> dashboard insurance record

use super::terminology::{COVERAGE_CLASS, SUBSCRIBER_RELATIONSHIP};
use super::{codeable_code, codeable_text, non_blank, reference_id, reference_label, status_concept};
use crate::error::{Error, Result};
use ehr_models::{CodeableConcept, Coverage, CoverageClass, Period, Reference};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiCoverage {
    pub id: String,
    pub patient_id: String,
    pub status: String,
    pub payor: String,
    pub subscriber_id: Option<String>,
    pub plan: Option<String>,
    pub group: Option<String>,
    pub relationship: Option<String>,
    pub coverage_type: Option<String>,
    pub period_start: String,
    pub period_end: String,
}

impl From<&Coverage> for UiCoverage {
    fn from(coverage: &Coverage) -> Self {
        let period = coverage.period.as_ref();
        Self {
            id: coverage.id.clone().unwrap_or_default(),
            patient_id: reference_id(coverage.beneficiary.as_ref()),
            status: coverage.status.clone().unwrap_or_default(),
            payor: reference_label(coverage.payors().first()).unwrap_or_default(),
            subscriber_id: coverage.subscriber_id.clone(),
            plan: coverage.class_of("plan").map(|c| c.value.clone()),
            group: coverage.class_of("group").map(|c| c.value.clone()),
            relationship: coverage
                .relationship
                .as_ref()
                .map(|r| codeable_code(Some(r)))
                .filter(|r| !r.is_empty()),
            coverage_type: coverage
                .coverage_type
                .as_ref()
                .map(|t| codeable_text(Some(t)))
                .filter(|t| !t.is_empty()),
            period_start: period.and_then(|p| p.start.clone()).unwrap_or_default(),
            period_end: period.and_then(|p| p.end.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageInput {
    pub patient_id: String,
    pub status: Option<String>,
    pub payor: String,
    pub subscriber_id: Option<String>,
    pub plan: Option<String>,
    pub group: Option<String>,
    pub relationship: Option<String>,
    pub coverage_type: Option<String>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
}

fn coverage_class(code: &str, value: Option<&str>) -> Option<CoverageClass> {
    non_blank(value).map(|value| CoverageClass {
        class_type: status_concept(COVERAGE_CLASS, code),
        value,
        name: None,
    })
}

impl CoverageInput {
    pub fn validate(&self) -> Result<()> {
        if self.patient_id.trim().is_empty() {
            return Err(Error::validation("patient_id is required"));
        }
        if self.payor.trim().is_empty() {
            return Err(Error::validation("payor is required"));
        }
        Ok(())
    }

    pub fn to_fhir(&self) -> Coverage {
        let classes: Vec<CoverageClass> = [
            coverage_class("plan", self.plan.as_deref()),
            coverage_class("group", self.group.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect();
        let start = non_blank(self.period_start.as_deref());
        let end = non_blank(self.period_end.as_deref());

        Coverage {
            status: Some(non_blank(self.status.as_deref()).unwrap_or_else(|| "active".into())),
            coverage_type: non_blank(self.coverage_type.as_deref()).map(CodeableConcept::from_text),
            subscriber_id: non_blank(self.subscriber_id.as_deref()),
            beneficiary: Some(Reference::to("Patient", self.patient_id.trim())),
            relationship: non_blank(self.relationship.as_deref())
                .map(|r| status_concept(SUBSCRIBER_RELATIONSHIP, &r)),
            period: (start.is_some() || end.is_some()).then_some(Period { start, end }),
            payor: Some(vec![Reference {
                display: non_blank(Some(&self.payor)),
                ..Default::default()
            }]),
            class: (!classes.is_empty()).then_some(classes),
            ..Coverage::new()
        }
    }
}
