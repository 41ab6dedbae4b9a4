//! HTTP request handlers
//!
//! Implements the REST surface over the aggregate store. Typed store errors
//! are mapped to status codes here: validation problems become 400 with the
//! precise message, missing records become 404, anything else is logged and
//! surfaced as a generic 500.

use crate::store::{self, AggregateUpdate, NewAggregate};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use doormap_common::api::{
    AggregateRecord, AggregateRequest, DeleteResponse, ErrorResponse, MutationResponse,
};
use doormap_common::config::DEFAULT_RECENT_WINDOW_HOURS;
use doormap_common::db::init::get_setting_or;
use doormap_common::{info_codec, Error};
use tracing::error;
use uuid::Uuid;

const DEFAULT_LANGUAGE: &str = "english";
const DEFAULT_CONGREGATION: i64 = 1;

/// Error wrapper translating store errors into HTTP responses
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not found".to_string()),
            err if err.is_validation() => (StatusCode::BAD_REQUEST, err.to_string()),
            err => {
                error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// GET /aggregates
///
/// Lists aggregates modified within the recent window (24 hours unless
/// overridden by the `recent_window_hours` setting).
pub async fn list_aggregates(
    State(state): State<AppState>,
) -> Result<Json<Vec<AggregateRecord>>, ApiError> {
    let window_hours = get_setting_or(
        &state.db,
        "recent_window_hours",
        &DEFAULT_RECENT_WINDOW_HOURS.to_string(),
    )
    .await?
    .parse::<i64>()
    .unwrap_or(DEFAULT_RECENT_WINDOW_HOURS);

    let records = store::list_recent_aggregates(&state.db, window_hours).await?;
    Ok(Json(records))
}

/// POST /aggregates
///
/// Creates a building with its initial door set. 201 on success, 400 on
/// invalid coordinates or a door-count mismatch.
pub async fn create_aggregate(
    State(state): State<AppState>,
    Json(req): Json<AggregateRequest>,
) -> Result<(StatusCode, Json<MutationResponse>), ApiError> {
    validate_door_count(&req)?;

    let agg = NewAggregate {
        lat: req.lat,
        long: req.long,
        address: req.address,
        territory_id: req.territory_id,
        congregation_id: req.congregation_id.unwrap_or(DEFAULT_CONGREGATION),
        language: req.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        number_of_doors: req.number_of_doors.unwrap_or(0),
        door_labels: info_codec::decode_compact(req.info.as_deref().unwrap_or("")),
    };

    let building_id = store::create_aggregate(&state.db, &agg).await?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            message: "Building created".to_string(),
            building_id: building_id.to_string(),
        }),
    ))
}

/// GET /aggregates/:id
pub async fn get_aggregate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AggregateRecord>, ApiError> {
    let record = store::get_aggregate_record(&state.db, &id).await?;
    Ok(Json(record))
}

/// PUT /aggregates/:id
///
/// Replaces the building's scalars and its whole door set.
pub async fn update_aggregate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AggregateRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    validate_door_count(&req)?;

    let upd = AggregateUpdate {
        lat: req.lat,
        long: req.long,
        address: req.address,
        congregation_id: req.congregation_id.unwrap_or(DEFAULT_CONGREGATION),
        language: req.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        number_of_doors: req.number_of_doors.unwrap_or(0),
        door_labels: info_codec::decode_compact(req.info.as_deref().unwrap_or("")),
    };

    store::update_aggregate(&state.db, &id, &upd).await?;

    Ok(Json(MutationResponse {
        message: "Building updated".to_string(),
        building_id: id.to_string(),
    }))
}

/// DELETE /aggregates/:id
pub async fn delete_aggregate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    store::delete_aggregate(&state.db, &id).await?;

    Ok(Json(DeleteResponse {
        message: "Building deleted".to_string(),
        deleted_id: id.to_string(),
    }))
}

/// Reconcile declared door count against the supplied label text
///
/// Only enforced when the request carries both fields; when either is
/// absent the store's pairing rules fill the gap instead.
fn validate_door_count(req: &AggregateRequest) -> Result<(), ApiError> {
    if let (Some(declared), Some(info)) = (req.number_of_doors, req.info.as_deref()) {
        info_codec::validate_count(info, declared.max(0) as usize)?;
    }
    Ok(())
}
