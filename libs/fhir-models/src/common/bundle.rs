//! FHIR Bundle model
//!
//! Search results come back as `searchset` bundles. Entries keep their
//! resource as raw JSON so a bundle can carry mixed content (matches,
//! `_include`d resources, OperationOutcome warnings); typed access goes
//! through [`Bundle::resources`].

use super::error::{Error, Result};
use super::resource::{FhirResource, ResourceType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR Bundle resource
///
/// A container for a collection of resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Resource type - always "Bundle"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Indicates the purpose of this bundle - how it was intended to be used
    #[serde(rename = "type", default = "default_bundle_type")]
    pub bundle_type: BundleType,

    /// When the bundle was assembled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// If search, the total number of matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    /// Links related to this Bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Vec<BundleLink>>,

    /// Entry in the bundle - will have a resource or information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Vec<BundleEntry>>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    ResourceType::Bundle.as_str().to_string()
}

// Some servers omit `type` on search responses.
fn default_bundle_type() -> BundleType {
    BundleType::Searchset
}

/// Type of Bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
    History,
    /// Search Results Bundle - Results of a search operation
    Searchset,
    Collection,
}

/// Links related to this Bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleLink {
    /// self | next | previous | first | last
    #[serde(default)]
    pub relation: String,

    /// Reference details for the link
    #[serde(default)]
    pub url: String,
}

/// Entry in the bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    /// Full URL for the entry (relative to the base URL, or absolute)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    /// A resource in this bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,

    /// Search-related information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<BundleEntrySearch>,

    /// Additional content beyond core fields (request, response, ...)
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl BundleEntry {
    /// The `resourceType` of the entry's resource, if it has one
    pub fn resource_type(&self) -> Option<&str> {
        self.resource
            .as_ref()
            .and_then(|r| r.get("resourceType"))
            .and_then(Value::as_str)
    }
}

/// Search-related information for a Bundle entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntrySearch {
    /// Why this entry is in the result set
    #[serde(rename = "mode", skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<BundleEntrySearchMode>,

    /// Search ranking (between 0 and 1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Why an entry is in the result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleEntrySearchMode {
    Match,
    Include,
    Outcome,
}

impl Bundle {
    /// Create a new Bundle with minimal required fields
    pub fn new(bundle_type: BundleType) -> Self {
        Self {
            resource_type: default_resource_type(),
            id: None,
            bundle_type,
            timestamp: None,
            total: None,
            link: None,
            entry: None,
            extensions: HashMap::new(),
        }
    }

    /// Create a searchset bundle holding the given resources, in order
    pub fn searchset<R: FhirResource>(resources: &[R]) -> Result<Self> {
        let mut bundle = Self::new(BundleType::Searchset);
        for resource in resources {
            bundle.add_entry(BundleEntry {
                resource: Some(resource.to_value()?),
                ..Default::default()
            });
        }
        bundle.total = Some(bundle.entry_count() as u32);
        Ok(bundle)
    }

    /// Check if this is a search result bundle
    pub fn is_searchset(&self) -> bool {
        matches!(self.bundle_type, BundleType::Searchset)
    }

    /// Get the number of entries in the bundle
    pub fn entry_count(&self) -> usize {
        self.entries().len()
    }

    /// Get entries as a slice; an absent `entry` is an empty slice
    pub fn entries(&self) -> &[BundleEntry] {
        self.entry.as_deref().unwrap_or(&[])
    }

    /// Add an entry to the bundle
    pub fn add_entry(&mut self, entry: BundleEntry) {
        self.entry.get_or_insert_with(Vec::new).push(entry);
    }

    /// URL of the link with the given relation (e.g. "next")
    pub fn link_url(&self, relation: &str) -> Option<&str> {
        self.link
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .find(|l| l.relation == relation)
            .map(|l| l.url.as_str())
    }

    /// Decode every entry whose resource is of type `R`, preserving order.
    ///
    /// Entries of other types and entries without a resource are skipped.
    /// An entry of the right type that fails to decode is an error.
    pub fn resources<R: FhirResource>(&self) -> Result<Vec<R>> {
        self.resource_values(R::RESOURCE_TYPE)
            .map(|value| R::from_value(value.clone()))
            .collect()
    }

    /// Decode the entries of type `R` one by one.
    ///
    /// Returns the resources that decoded, in bundle order, and for every entry
    /// that did not, its `id` (when present) with the decode error.
    pub fn resources_lenient<R: FhirResource>(&self) -> (Vec<R>, Vec<(Option<String>, Error)>) {
        let mut decoded = Vec::new();
        let mut failed = Vec::new();
        for value in self.resource_values(R::RESOURCE_TYPE) {
            match R::from_value(value.clone()) {
                Ok(resource) => decoded.push(resource),
                Err(err) => {
                    let id = value.get("id").and_then(Value::as_str).map(str::to_string);
                    failed.push((id, err));
                }
            }
        }
        (decoded, failed)
    }

    fn resource_values(&self, resource_type: ResourceType) -> impl Iterator<Item = &Value> {
        let wanted = resource_type.as_str();
        self.entries()
            .iter()
            .filter(move |entry| entry.resource_type() == Some(wanted))
            .filter_map(|entry| entry.resource.as_ref())
    }

    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(Error::from)
    }
}

impl FhirResource for Bundle {
    const RESOURCE_TYPE: ResourceType = ResourceType::Bundle;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
