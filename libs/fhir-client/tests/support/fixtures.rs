use serde_json::{json, Value};

/// Searchset Bundle wrapping `resources`
pub fn searchset(resources: Vec<Value>) -> Value {
    let entries: Vec<Value> = resources
        .into_iter()
        .map(|resource| {
            let full_url = format!(
                "http://example.org/fhir/{}/{}",
                resource["resourceType"].as_str().unwrap_or(""),
                resource["id"].as_str().unwrap_or("")
            );
            json!({
                "fullUrl": full_url,
                "resource": resource,
                "search": {"mode": "match"}
            })
        })
        .collect();

    json!({
        "resourceType": "Bundle",
        "type": "searchset",
        "total": entries.len(),
        "entry": entries
    })
}

pub fn operation_outcome(code: &str, diagnostics: &str) -> Value {
    json!({
        "resourceType": "OperationOutcome",
        "issue": [{"severity": "error", "code": code, "diagnostics": diagnostics}]
    })
}

pub fn capability_statement(server: &str, fhir_version: &str) -> Value {
    json!({
        "resourceType": "CapabilityStatement",
        "status": "active",
        "date": "2024-01-01",
        "kind": "instance",
        "software": {"name": server, "version": "7.0.0"},
        "fhirVersion": fhir_version,
        "format": ["json"]
    })
}

pub fn smart_configuration(token_endpoint: Option<&str>) -> Value {
    let mut config = json!({
        "authorization_endpoint": "https://idp.example/authorize",
        "capabilities": ["launch-ehr", "client-confidential-symmetric"],
        "grant_types_supported": ["authorization_code", "client_credentials"]
    });
    if let Some(endpoint) = token_endpoint {
        config["token_endpoint"] = json!(endpoint);
    }
    config
}

pub fn token_response(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3600,
        "scope": "patient/*.read"
    })
}

pub fn patient(id: &str, given: &str, family: &str) -> Value {
    json!({
        "resourceType": "Patient",
        "id": id,
        "meta": {"lastUpdated": "2024-05-01T10:00:00Z"},
        "active": true,
        "name": [{"family": family, "given": [given]}],
        "gender": "female",
        "birthDate": "1985-07-12",
        "telecom": [{"system": "phone", "value": "555-0100"}]
    })
}

pub fn temperature_observation(id: &str, patient_id: &str) -> Value {
    json!({
        "resourceType": "Observation",
        "id": id,
        "status": "final",
        "category": [{
            "coding": [{
                "system": "http://terminology.hl7.org/CodeSystem/observation-category",
                "code": "vital-signs"
            }]
        }],
        "code": {"coding": [{"system": "http://loinc.org", "code": "8310-5", "display": "Body temperature"}]},
        "subject": {"reference": format!("Patient/{patient_id}")},
        "effectiveDateTime": "2024-05-01T09:30:00Z",
        "valueQuantity": {"value": 98.6, "unit": "F"}
    })
}
