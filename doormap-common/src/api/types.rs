//! Shared API request/response types
//!
//! Wire types used by both doormap-server (producing) and doormap-client
//! (consuming). Field names follow the JSON surface of the REST API
//! (camelCase), which is why the structs carry serde rename attributes.

use serde::{Deserialize, Serialize};

/// Request body for `POST /aggregates` and `PUT /aggregates/:id`
///
/// Only the coordinates are mandatory; everything else defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRequest {
    pub lat: f64,
    pub long: f64,
    /// Language name for the building's doors (defaults to "english")
    #[serde(default)]
    pub language: Option<String>,
    /// Declared door count; reconciled against `info` at the API boundary
    #[serde(default)]
    pub number_of_doors: Option<i64>,
    /// Door labels joined with ", " (see `info_codec`)
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub territory_id: Option<String>,
    /// Congregation identifier (defaults to 1)
    #[serde(default)]
    pub congregation_id: Option<i64>,
}

/// One aggregate as served by `GET /aggregates` and `GET /aggregates/:id`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRecord {
    pub id: String,
    pub lat: f64,
    pub long: f64,
    pub address: Option<String>,
    /// Unix epoch seconds of the last mutation
    pub last_modified: i64,
    pub number_of_doors: i64,
    /// Ordered door labels joined with ", "
    pub info: String,
    pub language: String,
    pub congregation_id: i64,
    pub pin_color: u32,
    pub pin_image: String,
}

/// Response body for successful POST/PUT
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub message: String,
    pub building_id: String,
}

/// Response body for successful DELETE
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: String,
    pub deleted_id: String,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
