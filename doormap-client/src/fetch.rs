//! Resilient aggregate fetching
//!
//! Tries an ordered list of endpoint candidates one at a time: direct by id,
//! query parameter, then list-then-filter. Per-candidate failures are logged
//! and swallowed; only after every candidate is exhausted does the fetch
//! fail, wrapping the last underlying cause as NotFound.

use crate::normalize::{normalize_record, NormalizedAggregate};
use crate::{ClientError, Result};
use doormap_common::config::Location;
use std::time::Duration;

const USER_AGENT: &str = concat!("doormap-client/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-side client for the aggregate API
pub struct AggregateFetcher {
    http_client: reqwest::Client,
    base_url: String,
    default_location: Location,
}

impl AggregateFetcher {
    /// Create a fetcher against an API base URL
    ///
    /// `default_location` is substituted for records with no usable
    /// coordinates; inject the operator's last known position here rather
    /// than relying on ambient cached state.
    pub fn new(base_url: impl Into<String>, default_location: Location) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_location,
        })
    }

    /// Fetch one aggregate, trying each endpoint candidate in turn
    ///
    /// Candidates run strictly sequentially, each awaited before the next.
    /// Overlapping calls for the same id are not deduplicated.
    pub async fn fetch_aggregate(&self, id: &str) -> Result<NormalizedAggregate> {
        let candidates = [
            format!("{}/aggregates/{}", self.base_url, id),
            format!("{}/aggregates?id={}", self.base_url, id),
            format!("{}/aggregates", self.base_url),
        ];

        let mut last_error = ClientError::NotFound(format!("aggregate {}", id));

        for url in &candidates {
            match self.try_candidate(url, id).await {
                Ok(record) => return Ok(record),
                Err(err) => {
                    tracing::warn!(url = %url, error = %err, "Aggregate fetch candidate failed");
                    last_error = err;
                }
            }
        }

        Err(ClientError::NotFound(format!(
            "aggregate {} not found after trying all endpoints: {}",
            id, last_error
        )))
    }

    async fn try_candidate(&self, url: &str, id: &str) -> Result<NormalizedAggregate> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Network(format!("HTTP {} from {}", status, url)));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        normalize_record(&raw, id, self.default_location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn record_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "lat": 11.0168,
            "long": 76.9558,
            "address": "12 Mettupalayam Rd",
            "language": "Tamil",
            "congregationId": 1,
            "numberOfDoors": 2,
            "info": "1/F, 2/F",
            "pinColor": 2,
            "pinImage": "/pins/pin2.png"
        })
    }

    #[tokio::test]
    async fn test_direct_endpoint_wins() {
        let server = MockServer::start_async().await;

        let direct = server
            .mock_async(|when, then| {
                when.method(GET).path("/aggregates/b1");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(record_json("b1"));
            })
            .await;

        let fetcher = AggregateFetcher::new(server.base_url(), Location::default()).unwrap();
        let record = fetcher.fetch_aggregate("b1").await.unwrap();

        assert_eq!(record.lat, 11.0168);
        assert_eq!(record.door_labels, vec!["1/F", "2/F"]);
        assert!(!record.needs_correction);
        direct.assert_async().await;
    }

    #[tokio::test]
    async fn test_falls_back_to_listing_when_direct_fails() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/aggregates/b2");
                then.status(500);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/aggregates");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"buildings": [record_json("b1"), record_json("b2")]}));
            })
            .await;

        let fetcher = AggregateFetcher::new(server.base_url(), Location::default()).unwrap();
        let record = fetcher.fetch_aggregate("b2").await.unwrap();

        assert_eq!(record.id, "b2");
        assert_eq!(record.lat, 11.0168);
    }

    #[tokio::test]
    async fn test_all_candidates_exhausted_is_not_found() {
        // Server with no mocks: every candidate gets a 404
        let server = MockServer::start_async().await;

        let fetcher = AggregateFetcher::new(server.base_url(), Location::default()).unwrap();
        let err = fetcher.fetch_aggregate("missing").await.unwrap_err();

        match err {
            ClientError::NotFound(message) => {
                assert!(message.contains("missing"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_coordinate_fallback_marks_needs_correction() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/aggregates/b3");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"id": "b3", "info": "G/F", "numberOfDoors": 1}));
            })
            .await;

        let default = Location::new(11.0168, 76.9558);
        let fetcher = AggregateFetcher::new(server.base_url(), default).unwrap();
        let record = fetcher.fetch_aggregate("b3").await.unwrap();

        assert!(record.needs_correction);
        assert_eq!(record.lat, default.lat);
        assert_eq!(record.long, default.long);
        assert_eq!(record.door_labels, vec!["G/F"]);
    }
}
