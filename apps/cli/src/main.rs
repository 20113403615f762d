//! `ehr` - query and update an EHR dashboard's FHIR server from the shell
//!
//! Every command prints the JSON result envelope on stdout and exits non-zero
//! when the call failed.

mod config;
mod logging;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ehr_client::credentials::{HEADER_ACCESS_TOKEN, HEADER_BASE_URL};
use ehr_client::translate::{
    AllergyInput, ConditionInput, CoverageInput, EncounterInput, MedicationRequestInput,
    ObservationInput, PatientInput,
};
use ehr_client::{
    resolve_credentials, ApiResponse, Credentials, EhrService, FhirClient, HeaderMap, HeaderValue,
    SearchFilters,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "ehr")]
#[command(version, about = "EHR dashboard FHIR client")]
struct Cli {
    /// Configuration file (defaults to ./ehr.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// FHIR base URL, overrides FHIR_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token, overrides FHIR_ACCESS_TOKEN
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check connectivity and report server software and FHIR version
    Ping,
    /// Print the server CapabilityStatement
    Metadata,
    /// Print the SMART configuration
    SmartConfig,
    /// Exchange an authorization code for an access token
    ExchangeCode {
        code: String,
        #[arg(long)]
        redirect_uri: String,
        /// PKCE code verifier
        #[arg(long)]
        code_verifier: Option<String>,
    },
    /// Search patients by name
    Patients {
        /// Name fragment
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Read one patient
    Patient { id: String },
    /// Delete one patient
    DeletePatient { id: String },
    /// Search observations
    Observations(FilterArgs),
    /// Search conditions
    Conditions(FilterArgs),
    /// Search medication requests
    Medications(FilterArgs),
    /// Search allergies
    Allergies(FilterArgs),
    /// Search encounters
    Encounters(FilterArgs),
    /// Search coverages
    Coverages(FilterArgs),
    /// Create a record from a JSON input file
    Create {
        #[arg(value_enum)]
        kind: RecordKind,
        /// JSON file with the record fields
        file: PathBuf,
    },
    /// Update a patient or encounter from a JSON input file
    Update {
        #[arg(value_enum)]
        kind: RecordKind,
        id: String,
        file: PathBuf,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Patient id
    #[arg(long)]
    patient: Option<String>,
    /// Date filter, FHIR prefixes allowed (ge2024-01-01)
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    code: Option<String>,
    /// Page size (default 50)
    #[arg(long)]
    limit: Option<u32>,
}

impl From<FilterArgs> for SearchFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            patient_id: args.patient,
            date: args.date,
            status: args.status,
            category: args.category,
            code: args.code,
            search: None,
            limit: args.limit,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordKind {
    Patient,
    Observation,
    Condition,
    Medication,
    Allergy,
    Encounter,
    Coverage,
}

impl Cli {
    /// Command line flags act as request headers, so they win over the environment
    fn credentials(&self) -> anyhow::Result<Credentials> {
        let mut headers = HeaderMap::new();
        if let Some(base_url) = &self.base_url {
            headers.insert(HEADER_BASE_URL, HeaderValue::from_str(base_url)?);
        }
        if let Some(token) = &self.token {
            headers.insert(HEADER_ACCESS_TOKEN, HeaderValue::from_str(token)?);
        }
        let env: HashMap<String, String> = std::env::vars().collect();

        resolve_credentials(&headers, &env)
            .context("FHIR server not configured; set FHIR_BASE_URL or pass --base-url")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    let credentials = cli.credentials()?;
    tracing::debug!(credentials = ?credentials, "Resolved FHIR credentials");

    let client = FhirClient::with_options(credentials, config.client.options())
        .context("Failed to create FHIR client")?;
    let service = EhrService::new(client);

    run(cli.command, &service).await
}

async fn run(command: Commands, service: &EhrService) -> anyhow::Result<()> {
    match command {
        Commands::Ping => emit(service.test_connection().await),
        Commands::Metadata => {
            emit(ApiResponse::from(service.client().capability_statement().await))
        }
        Commands::SmartConfig => {
            emit(ApiResponse::from(service.client().smart_configuration().await))
        }
        Commands::ExchangeCode {
            code,
            redirect_uri,
            code_verifier,
        } => emit(ApiResponse::from(
            service
                .client()
                .exchange_code_for_token(&code, &redirect_uri, code_verifier.as_deref())
                .await,
        )),
        Commands::Patients { name, limit } => {
            let filters = SearchFilters {
                search: name,
                limit,
                ..Default::default()
            };
            emit(service.search_patients(&filters).await)
        }
        Commands::Patient { id } => emit(service.get_patient(&id).await),
        Commands::DeletePatient { id } => emit(service.delete_patient(&id).await),
        Commands::Observations(args) => emit(service.search_observations(&args.into()).await),
        Commands::Conditions(args) => emit(service.search_conditions(&args.into()).await),
        Commands::Medications(args) => {
            emit(service.search_medication_requests(&args.into()).await)
        }
        Commands::Allergies(args) => emit(service.search_allergies(&args.into()).await),
        Commands::Encounters(args) => emit(service.search_encounters(&args.into()).await),
        Commands::Coverages(args) => emit(service.search_coverages(&args.into()).await),
        Commands::Create { kind, file } => create(service, kind, &file).await,
        Commands::Update { kind, id, file } => update(service, kind, &id, &file).await,
    }
}

async fn create(service: &EhrService, kind: RecordKind, file: &Path) -> anyhow::Result<()> {
    match kind {
        RecordKind::Patient => {
            emit(service.create_patient(&read_input::<PatientInput>(file)?).await)
        }
        RecordKind::Observation => {
            emit(service.create_observation(&read_input::<ObservationInput>(file)?).await)
        }
        RecordKind::Condition => {
            emit(service.create_condition(&read_input::<ConditionInput>(file)?).await)
        }
        RecordKind::Medication => emit(
            service
                .create_medication_request(&read_input::<MedicationRequestInput>(file)?)
                .await,
        ),
        RecordKind::Allergy => {
            emit(service.create_allergy(&read_input::<AllergyInput>(file)?).await)
        }
        RecordKind::Encounter => {
            emit(service.create_encounter(&read_input::<EncounterInput>(file)?).await)
        }
        RecordKind::Coverage => {
            emit(service.create_coverage(&read_input::<CoverageInput>(file)?).await)
        }
    }
}

async fn update(
    service: &EhrService,
    kind: RecordKind,
    id: &str,
    file: &Path,
) -> anyhow::Result<()> {
    match kind {
        RecordKind::Patient => emit(
            service
                .update_patient(id, &read_input::<PatientInput>(file)?)
                .await,
        ),
        RecordKind::Encounter => emit(
            service
                .update_encounter(id, &read_input::<EncounterInput>(file)?)
                .await,
        ),
        _ => anyhow::bail!("only patients and encounters can be updated"),
    }
}

fn read_input<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid input in {}", path.display()))
}

/// Print the envelope; a failed call becomes a non-zero exit
fn emit<T: Serialize>(response: ApiResponse<T>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.success {
        anyhow::bail!(
            "request failed: {}",
            response.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}
