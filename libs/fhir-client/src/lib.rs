//! EHR dashboard FHIR access layer
//!
//! This crate connects the dashboard to a FHIR R4 server. It has three layers:
//!
//! - [`FhirClient`]: authenticated REST transport (CRUD, search, metadata,
//!   SMART discovery and token exchange)
//! - [`translate`]: pure conversions between FHIR resources and the flat
//!   records the dashboard renders and submits
//! - [`EhrService`]: one call per dashboard use case, answering with an
//!   [`ApiResponse`] envelope instead of an error
//!
//! # Example
//!
//! ```rust,no_run
//! use ehr_client::{Credentials, EhrService, FhirClient, SearchFilters};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("https://hapi.fhir.org/baseR4");
//! let service = EhrService::new(FhirClient::new(credentials)?);
//!
//! let vitals = service
//!     .search_observations(&SearchFilters {
//!         patient_id: Some("42".to_string()),
//!         category: Some("vital-signs".to_string()),
//!         ..Default::default()
//!     })
//!     .await;
//!
//! if let Some(observations) = vitals.data {
//!     for obs in observations {
//!         println!("{} {} {}", obs.display, obs.value, obs.unit.unwrap_or_default());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod response;
pub mod search;
pub mod service;
pub mod smart;
pub mod translate;

pub use client::{FhirClient, FHIR_JSON};
pub use credentials::{resolve_credentials, ClientOptions, Credentials};
pub use error::{Error, Result};
pub use response::ApiResponse;
pub use search::SearchParams;
pub use service::{EhrService, SearchFilters, DEFAULT_PAGE_SIZE};
pub use smart::{ConnectionStatus, SmartConfiguration, TokenResponse};

// Header types accepted by `resolve_credentials`
pub use reqwest::header::{HeaderMap, HeaderValue};
