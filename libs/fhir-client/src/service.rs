//! Service facade: one method per dashboard use case.
//!
//! Each call is a single request/translate/respond cycle over a
//! [`FhirClient`]. Failures are returned in the [`ApiResponse`] envelope
//! exactly as the client produced them; input validation happens before any
//! request is issued.

use crate::client::FhirClient;
use crate::error::{Error, Result};
use crate::response::ApiResponse;
use crate::search::SearchParams;
use crate::smart::ConnectionStatus;
use crate::translate::{
    AllergyInput, ConditionInput, CoverageInput, EncounterInput, MedicationRequestInput,
    ObservationInput, PatientInput, UiAllergy, UiCondition, UiCoverage, UiEncounter,
    UiMedicationRequest, UiObservation, UiPatient,
};
use ehr_models::{
    AllergyIntolerance, Condition, Coverage, Encounter, FhirResource, MedicationRequest,
    Observation, Patient,
};
use serde::{Deserialize, Serialize};

/// Page size used when the caller sets no limit
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Filters accepted by the search use cases. Resource types ignore the
/// filters they do not support.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub patient_id: Option<String>,
    /// FHIR date search value, prefixes allowed (`ge2024-01-01`)
    pub date: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub code: Option<String>,
    /// Free-text patient name search
    pub search: Option<String>,
    pub limit: Option<u32>,
}

impl SearchFilters {
    pub fn for_patient(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: Some(patient_id.into()),
            ..Default::default()
        }
    }

    fn value(field: &Option<String>) -> Option<&str> {
        field.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    fn patient(&self) -> Option<&str> {
        Self::value(&self.patient_id)
    }

    fn status(&self) -> Option<&str> {
        Self::value(&self.status)
    }

    fn date(&self) -> Option<&str> {
        Self::value(&self.date)
    }

    fn category(&self) -> Option<&str> {
        Self::value(&self.category)
    }

    fn code(&self) -> Option<&str> {
        Self::value(&self.code)
    }

    fn search(&self) -> Option<&str> {
        Self::value(&self.search)
    }
}

/// Append `_count`, always as the last parameter
fn paged(mut params: SearchParams, filters: &SearchFilters) -> SearchParams {
    params.count(filters.limit.unwrap_or(DEFAULT_PAGE_SIZE));
    params
}

fn require_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(Error::validation("id is required"));
    }
    Ok(id)
}

/// Dashboard-facing operations over one FHIR server
pub struct EhrService {
    client: FhirClient,
}

impl EhrService {
    pub fn new(client: FhirClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &FhirClient {
        &self.client
    }

    async fn search_as<R, U>(&self, params: SearchParams) -> ApiResponse<Vec<U>>
    where
        R: FhirResource,
        U: for<'a> From<&'a R>,
    {
        tracing::debug!(
            resource_type = R::RESOURCE_TYPE.as_str(),
            query = %params.to_query_string(),
            "Searching"
        );
        self.client
            .search_resources::<R>(&params)
            .await
            .map(|resources| resources.iter().map(U::from).collect())
            .into()
    }

    async fn create_as<R, U>(
        &self,
        validation: Result<()>,
        resource: impl FnOnce() -> R,
    ) -> ApiResponse<U>
    where
        R: FhirResource,
        U: for<'a> From<&'a R>,
    {
        if let Err(err) = validation {
            tracing::debug!(
                resource_type = R::RESOURCE_TYPE.as_str(),
                error = %err,
                "Rejected create"
            );
            return ApiResponse::failure(&err);
        }
        self.client
            .create(&resource())
            .await
            .map(|stored| U::from(&stored))
            .into()
    }

    async fn update_as<R, U>(
        &self,
        id: &str,
        validation: Result<()>,
        resource: impl FnOnce() -> R,
    ) -> ApiResponse<U>
    where
        R: FhirResource,
        U: for<'a> From<&'a R>,
    {
        let id = match validation.and_then(|_| require_id(id)) {
            Ok(id) => id,
            Err(err) => {
                tracing::debug!(
                    resource_type = R::RESOURCE_TYPE.as_str(),
                    error = %err,
                    "Rejected update"
                );
                return ApiResponse::failure(&err);
            }
        };
        self.client
            .update(id, &resource())
            .await
            .map(|stored| U::from(&stored))
            .into()
    }

    // Patients

    pub async fn search_patients(&self, filters: &SearchFilters) -> ApiResponse<Vec<UiPatient>> {
        let mut params = SearchParams::new();
        params.push_opt("name", filters.search());
        self.search_as::<Patient, _>(paged(params, filters)).await
    }

    pub async fn get_patient(&self, id: &str) -> ApiResponse<UiPatient> {
        let id = match require_id(id) {
            Ok(id) => id,
            Err(err) => return ApiResponse::failure(&err),
        };
        self.client
            .read::<Patient>(id)
            .await
            .map(|patient| UiPatient::from(&patient))
            .into()
    }

    pub async fn create_patient(&self, input: &PatientInput) -> ApiResponse<UiPatient> {
        self.create_as(input.validate(), || input.to_fhir()).await
    }

    /// Replace a patient. When `active` is not given the stored flag is kept,
    /// which takes one read before the write.
    pub async fn update_patient(&self, id: &str, input: &PatientInput) -> ApiResponse<UiPatient> {
        if input.active.is_some() {
            return self.update_as(id, input.validate(), || input.to_fhir()).await;
        }

        let id = match input.validate().and_then(|_| require_id(id)) {
            Ok(id) => id,
            Err(err) => return ApiResponse::failure(&err),
        };
        let current = match self.client.read::<Patient>(id).await {
            Ok(current) => current,
            Err(err) => return ApiResponse::failure(&err),
        };
        self.update_as(id, Ok(()), || input.to_fhir_replacing(&current))
            .await
    }

    /// On success the envelope carries no `data`
    pub async fn delete_patient(&self, id: &str) -> ApiResponse<()> {
        match require_id(id) {
            Ok(id) => ApiResponse::from_unit(self.client.delete::<Patient>(id).await),
            Err(err) => ApiResponse::failure(&err),
        }
    }

    // Clinical records

    pub async fn search_observations(
        &self,
        filters: &SearchFilters,
    ) -> ApiResponse<Vec<UiObservation>> {
        let mut params = SearchParams::new();
        params
            .push_opt("patient", filters.patient())
            .push_opt("category", filters.category())
            .push_opt("code", filters.code())
            .push_opt("date", filters.date())
            .push_opt("status", filters.status());
        self.search_as::<Observation, _>(paged(params, filters)).await
    }

    pub async fn create_observation(&self, input: &ObservationInput) -> ApiResponse<UiObservation> {
        self.create_as(input.validate(), || input.to_fhir()).await
    }

    pub async fn search_conditions(&self, filters: &SearchFilters) -> ApiResponse<Vec<UiCondition>> {
        let mut params = SearchParams::new();
        params
            .push_opt("patient", filters.patient())
            .push_opt("clinical-status", filters.status())
            .push_opt("category", filters.category());
        self.search_as::<Condition, _>(paged(params, filters)).await
    }

    pub async fn create_condition(&self, input: &ConditionInput) -> ApiResponse<UiCondition> {
        self.create_as(input.validate(), || input.to_fhir()).await
    }

    pub async fn search_medication_requests(
        &self,
        filters: &SearchFilters,
    ) -> ApiResponse<Vec<UiMedicationRequest>> {
        let mut params = SearchParams::new();
        params
            .push_opt("patient", filters.patient())
            .push_opt("status", filters.status());
        self.search_as::<MedicationRequest, _>(paged(params, filters))
            .await
    }

    pub async fn create_medication_request(
        &self,
        input: &MedicationRequestInput,
    ) -> ApiResponse<UiMedicationRequest> {
        self.create_as(input.validate(), || input.to_fhir()).await
    }

    pub async fn search_allergies(&self, filters: &SearchFilters) -> ApiResponse<Vec<UiAllergy>> {
        let mut params = SearchParams::new();
        params
            .push_opt("patient", filters.patient())
            .push_opt("clinical-status", filters.status());
        self.search_as::<AllergyIntolerance, _>(paged(params, filters))
            .await
    }

    pub async fn create_allergy(&self, input: &AllergyInput) -> ApiResponse<UiAllergy> {
        self.create_as(input.validate(), || input.to_fhir()).await
    }

    // Visits and insurance

    pub async fn search_encounters(&self, filters: &SearchFilters) -> ApiResponse<Vec<UiEncounter>> {
        let mut params = SearchParams::new();
        params
            .push_opt("patient", filters.patient())
            .push_opt("status", filters.status())
            .push_opt("date", filters.date());
        self.search_as::<Encounter, _>(paged(params, filters)).await
    }

    pub async fn create_encounter(&self, input: &EncounterInput) -> ApiResponse<UiEncounter> {
        self.create_as(input.validate(), || input.to_fhir()).await
    }

    pub async fn update_encounter(
        &self,
        id: &str,
        input: &EncounterInput,
    ) -> ApiResponse<UiEncounter> {
        self.update_as(id, input.validate(), || input.to_fhir()).await
    }

    pub async fn search_coverages(&self, filters: &SearchFilters) -> ApiResponse<Vec<UiCoverage>> {
        let mut params = SearchParams::new();
        params
            .push_opt("beneficiary", filters.patient())
            .push_opt("status", filters.status());
        self.search_as::<Coverage, _>(paged(params, filters)).await
    }

    pub async fn create_coverage(&self, input: &CoverageInput) -> ApiResponse<UiCoverage> {
        self.create_as(input.validate(), || input.to_fhir()).await
    }

    /// Check connectivity through the server's CapabilityStatement
    pub async fn test_connection(&self) -> ApiResponse<ConnectionStatus> {
        self.client.test_connection().await.into()
    }
}
