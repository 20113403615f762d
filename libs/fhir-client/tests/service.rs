#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use ehr_client::translate::{
    AllergyInput, ConditionInput, CoverageInput, EncounterInput, MedicationRequestInput,
    ObservationInput, PatientInput,
};
use ehr_client::{Credentials, EhrService, FhirClient, SearchFilters};
use serde_json::json;
use support::*;

fn patient_filters(patient_id: &str) -> SearchFilters {
    SearchFilters::for_patient(patient_id)
}

// ---------------------------------------------------------------------------
// Patients
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_patient_sends_fhir_patient_and_returns_record() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::POST,
        "/Patient",
        MockResponse::echo_with_id(StatusCode::CREATED, "p-100"),
    );

    let input = PatientInput {
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        date_of_birth: "1980-01-01".to_string(),
        gender: "male".to_string(),
        ..Default::default()
    };
    let response = server.service()?.create_patient(&input).await;

    assert!(response.success, "create failed: {:?}", response.error);
    let record = response.data.expect("patient record");
    assert_eq!(record.id, "p-100");
    assert_eq!(record.first_name, "John");
    assert_eq!(record.last_name, "Doe");
    assert_eq!(record.date_of_birth, "1980-01-01");
    assert_eq!(record.gender, "male");

    let sent = server.single_request()?.json()?;
    assert_eq!(sent["resourceType"], "Patient");
    assert_eq!(sent["name"], json!([{"family": "Doe", "given": ["John"]}]));
    assert_eq!(sent["birthDate"], "1980-01-01");
    assert_eq!(sent["gender"], "male");
    Ok(())
}

#[tokio::test]
async fn create_patient_validation_skips_network() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;

    let response = server
        .service()?
        .create_patient(&PatientInput {
            first_name: "John".to_string(),
            ..Default::default()
        })
        .await;

    assert!(!response.success);
    assert!(response.error.as_deref().unwrap_or("").contains("last_name"));
    assert_eq!(response.status_code, None);
    assert_eq!(server.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn search_patients_by_name() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::GET,
        "/Patient",
        MockResponse::json(
            StatusCode::OK,
            &searchset(vec![
                patient("1", "Ada", "Lovelace"),
                patient("2", "Ada", "Byron"),
            ]),
        ),
    );

    let filters = SearchFilters {
        search: Some("Ada".to_string()),
        limit: Some(10),
        ..Default::default()
    };
    let response = server.service()?.search_patients(&filters).await;

    let records = response.data.expect("patients");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "1");
    assert_eq!(records[1].last_name, "Byron");
    assert_eq!(records[0].phone.as_deref(), Some("555-0100"));
    assert_eq!(records[0].updated_at, "2024-05-01T10:00:00Z");
    assert_eq!(
        server.single_request()?.path_and_query(),
        "/fhir/Patient?name=Ada&_count=10"
    );
    Ok(())
}

#[tokio::test]
async fn empty_search_yields_empty_list() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::GET,
        "/Patient",
        MockResponse::json(
            StatusCode::OK,
            &json!({"resourceType": "Bundle", "type": "searchset", "total": 0}),
        ),
    );

    let response = server
        .service()?
        .search_patients(&SearchFilters::default())
        .await;

    assert!(response.success);
    assert_eq!(response.data, Some(Vec::new()));
    assert_eq!(server.single_request()?.path_and_query(), "/fhir/Patient?_count=50");
    Ok(())
}

#[tokio::test]
async fn get_patient_passes_http_failure_through() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    let service = server.service()?;

    let response = service.get_patient("missing").await;
    assert!(!response.success);
    assert_eq!(response.status_code, Some(404));
    assert!(response.error.as_deref().unwrap_or("").contains("404"));
    assert!(response.data.is_none());

    let serialized = serde_json::to_value(&response)?;
    assert_eq!(serialized["statusCode"], 404);
    assert_eq!(serialized["success"], false);
    Ok(())
}

#[tokio::test]
async fn get_patient_requires_id() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    let response = server.service()?.get_patient("  ").await;

    assert!(!response.success);
    assert_eq!(server.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn update_and_delete_patient() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::GET,
        "/Patient/p-1",
        MockResponse::json(StatusCode::OK, &patient("p-1", "Jane", "Doe")),
    );
    server.on(
        Method::PUT,
        "/Patient/p-1",
        MockResponse::echo_with_id(StatusCode::OK, "p-1"),
    );
    server.on(
        Method::DELETE,
        "/Patient/p-1",
        MockResponse::empty(StatusCode::NO_CONTENT),
    );
    let service = server.service()?;

    let input = PatientInput {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        mrn: Some("MRN-9".to_string()),
        ..Default::default()
    };
    let updated = service.update_patient("p-1", &input).await;
    let record = updated.data.expect("updated patient");
    assert_eq!(record.id, "p-1");
    assert_eq!(record.mrn.as_deref(), Some("MRN-9"));

    let deleted = service.delete_patient("p-1").await;
    assert_eq!(serde_json::to_value(&deleted)?, json!({"success": true}));

    let requests = server.requests();
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[1].method, Method::PUT);
    assert_eq!(requests[1].json()?["id"], "p-1");
    assert_eq!(requests[2].method, Method::DELETE);
    assert_eq!(requests[2].path, "/fhir/Patient/p-1");
    Ok(())
}

#[tokio::test]
async fn update_patient_keeps_inactive_flag() -> anyhow::Result<()> {
    let mut stored = patient("p-2", "Jane", "Doe");
    stored["active"] = json!(false);

    let server = MockFhirServer::start().await?;
    server.on(
        Method::GET,
        "/Patient/p-2",
        MockResponse::json(StatusCode::OK, &stored),
    );
    server.on(
        Method::PUT,
        "/Patient/p-2",
        MockResponse::echo_with_id(StatusCode::OK, "p-2"),
    );

    let input = PatientInput {
        first_name: "Janet".to_string(),
        last_name: "Doe".to_string(),
        ..Default::default()
    };
    let record = server
        .service()?
        .update_patient("p-2", &input)
        .await
        .data
        .expect("updated patient");

    assert!(!record.active);
    assert_eq!(record.first_name, "Janet");
    let requests = server.requests();
    let put = &requests[1];
    assert_eq!(put.method, Method::PUT);
    assert_eq!(put.json()?["active"], false);
    Ok(())
}

#[tokio::test]
async fn update_patient_with_explicit_active_skips_read() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::PUT,
        "/Patient/p-3",
        MockResponse::echo_with_id(StatusCode::OK, "p-3"),
    );

    let input = PatientInput {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        active: Some(false),
        ..Default::default()
    };
    let response = server.service()?.update_patient("p-3", &input).await;

    assert!(response.success);
    let request = server.single_request()?;
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.json()?["active"], false);
    Ok(())
}

// ---------------------------------------------------------------------------
// Clinical records
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_vital_signs() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::GET,
        "/Observation",
        MockResponse::json(
            StatusCode::OK,
            &searchset(vec![temperature_observation("obs-1", "42")]),
        ),
    );

    let filters = SearchFilters {
        patient_id: Some("42".to_string()),
        category: Some("vital-signs".to_string()),
        ..Default::default()
    };
    let response = server.service()?.search_observations(&filters).await;

    assert_eq!(
        server.single_request()?.path_and_query(),
        "/fhir/Observation?patient=42&category=vital-signs&_count=50"
    );

    let records = response.data.expect("observations");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value, "98.6");
    assert_eq!(records[0].unit.as_deref(), Some("F"));
    assert_eq!(records[0].display, "Body temperature");
    assert_eq!(records[0].category, "vital-signs");
    assert_eq!(records[0].patient_id, "42");
    Ok(())
}

#[tokio::test]
async fn search_keeps_good_entries_next_to_bad_ones() -> anyhow::Result<()> {
    let mut sparse_note = temperature_observation("obs-2", "42");
    sparse_note["note"] = json!([{"authorString": "nurse"}]);
    let mut broken = temperature_observation("obs-3", "42");
    broken["subject"] = json!("Patient/42");

    let server = MockFhirServer::start().await?;
    server.on(
        Method::GET,
        "/Observation",
        MockResponse::json(
            StatusCode::OK,
            &searchset(vec![
                temperature_observation("obs-1", "42"),
                sparse_note,
                broken,
            ]),
        ),
    );

    let response = server
        .service()?
        .search_observations(&patient_filters("42"))
        .await;

    assert!(response.success, "got {:?}", response.error);
    let records = response.data.expect("observations");
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["obs-1", "obs-2"]);
    assert_eq!(records[0].value, "98.6");
    assert_eq!(records[1].notes, None);
    Ok(())
}

#[tokio::test]
async fn create_observation_posts_quantity() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::POST,
        "/Observation",
        MockResponse::echo_with_id(StatusCode::CREATED, "obs-2"),
    );

    let input = ObservationInput {
        patient_id: "42".to_string(),
        code: "8867-4".to_string(),
        display: Some("Heart rate".to_string()),
        category: Some("vital-signs".to_string()),
        value: "72".to_string(),
        unit: Some("/min".to_string()),
        ..Default::default()
    };
    let record = server
        .service()?
        .create_observation(&input)
        .await
        .data
        .expect("observation record");
    assert_eq!(record.id, "obs-2");
    assert_eq!(record.value, "72");
    assert_eq!(record.status, "final");

    let sent = server.single_request()?.json()?;
    assert_eq!(sent["subject"]["reference"], "Patient/42");
    assert_eq!(sent["valueQuantity"]["value"], 72.0);
    assert_eq!(sent["valueQuantity"]["system"], "http://unitsofmeasure.org");
    assert_eq!(sent["code"]["coding"][0]["system"], "http://loinc.org");
    assert!(sent["effectiveDateTime"].is_string());
    Ok(())
}

#[tokio::test]
async fn search_conditions_maps_status_to_clinical_status() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::GET,
        "/Condition",
        MockResponse::json(StatusCode::OK, &searchset(Vec::new())),
    );

    let filters = SearchFilters {
        status: Some("active".to_string()),
        category: Some("problem-list-item".to_string()),
        ..patient_filters("42")
    };
    let response = server.service()?.search_conditions(&filters).await;

    assert!(response.success);
    assert_eq!(
        server.single_request()?.path_and_query(),
        "/fhir/Condition?patient=42&clinical-status=active&category=problem-list-item&_count=50"
    );
    Ok(())
}

#[tokio::test]
async fn create_condition_defaults() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::POST,
        "/Condition",
        MockResponse::echo_with_id(StatusCode::CREATED, "c-1"),
    );

    let input = ConditionInput {
        patient_id: "42".to_string(),
        code: "38341003".to_string(),
        display: Some("Hypertension".to_string()),
        ..Default::default()
    };
    let record = server
        .service()?
        .create_condition(&input)
        .await
        .data
        .expect("condition record");
    assert_eq!(record.clinical_status, "active");
    assert_eq!(record.verification_status, "confirmed");

    let sent = server.single_request()?.json()?;
    assert_eq!(sent["code"]["coding"][0]["system"], "http://snomed.info/sct");
    assert!(sent["recordedDate"].is_string());
    Ok(())
}

#[tokio::test]
async fn medication_and_allergy_validation() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    let service = server.service()?;

    let medication = service
        .create_medication_request(&MedicationRequestInput {
            patient_id: "42".to_string(),
            medication: "Aspirin 81 MG".to_string(),
            ..Default::default()
        })
        .await;
    assert!(!medication.success);
    assert!(medication.error.as_deref().unwrap_or("").contains("dosage"));

    let allergy = service
        .create_allergy(&AllergyInput {
            allergen: "Peanut".to_string(),
            ..Default::default()
        })
        .await;
    assert!(!allergy.success);
    assert!(allergy.error.as_deref().unwrap_or("").contains("patient_id"));

    assert_eq!(server.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn search_medications_and_allergies() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::GET,
        "/MedicationRequest",
        MockResponse::json(
            StatusCode::OK,
            &searchset(vec![json!({
                "resourceType": "MedicationRequest",
                "id": "m-1",
                "status": "active",
                "intent": "order",
                "medicationCodeableConcept": {"text": "Metformin 500 MG"},
                "subject": {"reference": "Patient/42"},
                "dosageInstruction": [{"text": "500 mg twice daily"}]
            })]),
        ),
    );
    server.on(
        Method::GET,
        "/AllergyIntolerance",
        MockResponse::json(
            StatusCode::OK,
            &searchset(vec![json!({
                "resourceType": "AllergyIntolerance",
                "id": "a-1",
                "code": {"text": "Penicillin"},
                "patient": {"reference": "Patient/42"}
            })]),
        ),
    );
    let service = server.service()?;

    let filters = SearchFilters {
        status: Some("active".to_string()),
        ..patient_filters("42")
    };
    let medications = service.search_medication_requests(&filters).await;
    let allergies = service.search_allergies(&filters).await;

    let medications = medications.data.expect("medications");
    assert_eq!(medications[0].medication, "Metformin 500 MG");
    assert_eq!(medications[0].dosage, "500 mg twice daily");
    let allergies = allergies.data.expect("allergies");
    assert_eq!(allergies[0].allergen, "Penicillin");
    assert_eq!(allergies[0].patient_id, "42");

    let requests = server.requests();
    assert_eq!(
        requests[0].path_and_query(),
        "/fhir/MedicationRequest?patient=42&status=active&_count=50"
    );
    assert_eq!(
        requests[1].path_and_query(),
        "/fhir/AllergyIntolerance?patient=42&clinical-status=active&_count=50"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Visits and insurance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn encounter_create_and_update() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::POST,
        "/Encounter",
        MockResponse::echo_with_id(StatusCode::CREATED, "e-1"),
    );
    server.on(
        Method::PUT,
        "/Encounter/e-1",
        MockResponse::echo_with_id(StatusCode::OK, "e-1"),
    );
    let service = server.service()?;

    let mut input = EncounterInput {
        patient_id: "42".to_string(),
        start: Some("2024-06-01T09:00:00Z".to_string()),
        ..Default::default()
    };
    let created = service.create_encounter(&input).await.data.expect("encounter");
    assert_eq!(created.id, "e-1");
    assert_eq!(created.status, "planned");
    assert_eq!(created.class_code, "AMB");

    input.status = Some("finished".to_string());
    input.end = Some("2024-06-01T09:20:00Z".to_string());
    let updated = service
        .update_encounter("e-1", &input)
        .await
        .data
        .expect("encounter");
    assert_eq!(updated.status, "finished");
    assert_eq!(updated.end, "2024-06-01T09:20:00Z");

    let missing_id = service.update_encounter("", &input).await;
    assert!(!missing_id.success);
    assert_eq!(server.request_count(), 2);
    Ok(())
}

#[tokio::test]
async fn search_encounters_with_date() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::GET,
        "/Encounter",
        MockResponse::json(StatusCode::OK, &searchset(Vec::new())),
    );

    let filters = SearchFilters {
        date: Some("ge2024-01-01".to_string()),
        limit: Some(20),
        ..patient_filters("42")
    };
    server.service()?.search_encounters(&filters).await;

    assert_eq!(
        server.single_request()?.path_and_query(),
        "/fhir/Encounter?patient=42&date=ge2024-01-01&_count=20"
    );
    Ok(())
}

#[tokio::test]
async fn coverage_uses_beneficiary() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::GET,
        "/Coverage",
        MockResponse::json(StatusCode::OK, &searchset(Vec::new())),
    );
    server.on(
        Method::POST,
        "/Coverage",
        MockResponse::echo_with_id(StatusCode::CREATED, "cov-1"),
    );
    let service = server.service()?;

    service.search_coverages(&patient_filters("42")).await;
    let created = service
        .create_coverage(&CoverageInput {
            patient_id: "42".to_string(),
            payor: "Acme Health".to_string(),
            plan: Some("GOLD".to_string()),
            ..Default::default()
        })
        .await
        .data
        .expect("coverage");

    assert_eq!(created.payor, "Acme Health");
    assert_eq!(created.plan.as_deref(), Some("GOLD"));

    let requests = server.requests();
    assert_eq!(
        requests[0].path_and_query(),
        "/fhir/Coverage?beneficiary=42&_count=50"
    );
    assert_eq!(requests[1].json()?["beneficiary"]["reference"], "Patient/42");
    Ok(())
}

// ---------------------------------------------------------------------------
// Connectivity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_connection_reports_server_and_version() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::GET,
        "/metadata",
        MockResponse::json(
            StatusCode::OK,
            &json!({"resourceType": "CapabilityStatement", "fhirVersion": "4.0.1", "software": {"name": "HAPI"}}),
        ),
    );

    let response = server.service()?.test_connection().await;
    assert_eq!(
        serde_json::to_value(&response)?,
        json!({
            "success": true,
            "data": {"status": "connected", "server": "HAPI", "version": "4.0.1"}
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_connection_without_software_name() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::GET,
        "/metadata",
        MockResponse::json(
            StatusCode::OK,
            &json!({
                "resourceType": "CapabilityStatement",
                "fhirVersion": "4.0.1",
                "software": {"version": "1.0"},
                "implementation": {"url": "http://example.org/fhir"}
            }),
        ),
    );

    let response = server.service()?.test_connection().await;
    assert_eq!(
        serde_json::to_value(&response)?,
        json!({
            "success": true,
            "data": {"status": "connected", "server": "Unknown", "version": "4.0.1"}
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_connection_without_software() -> anyhow::Result<()> {
    let server = MockFhirServer::start().await?;
    server.on(
        Method::GET,
        "/metadata",
        MockResponse::json(
            StatusCode::OK,
            &json!({"resourceType": "CapabilityStatement"}),
        ),
    );

    let status = server
        .service()?
        .test_connection()
        .await
        .data
        .expect("connection status");
    assert_eq!(status.server, "Unknown");
    assert_eq!(status.version, "Unknown");
    Ok(())
}

#[tokio::test]
async fn test_connection_unreachable_server() -> anyhow::Result<()> {
    let client = FhirClient::new(Credentials::new(unreachable_base_url()?))?;
    let response = EhrService::new(client).test_connection().await;

    assert!(!response.success);
    assert!(response.error.is_some());
    assert_eq!(response.status_code, None);
    Ok(())
}
