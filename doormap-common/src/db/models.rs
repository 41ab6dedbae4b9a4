//! Database models

use serde::{Deserialize, Serialize};

/// A physical structure located by GPS coordinate
///
/// Owns its doors by composition: deleting a building deletes all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub lat: f64,
    pub long: f64,
    pub address: Option<String>,
    pub territory_id: Option<String>,
    /// Unix epoch seconds, refreshed on every mutation
    pub last_modified: i64,
}

/// A sub-unit of a building (floor, flat, shop front)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Door {
    pub id: String,
    pub building_id: String,
    /// Zero-based position within the building's door list
    pub position: i64,
    pub language_name: String,
    pub info_text: String,
    pub congregation_id: i64,
    /// Optional reference into the classification catalog
    pub classification_id: Option<String>,
}

/// Explicit pin override for a (congregation, language) pair
///
/// Rows are optional; pairs without an entry fall back to the computed
/// classification (`classify::color_for`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub id: String,
    pub congregation_id: i64,
    pub language_name: String,
    pub color: Option<u32>,
    pub image_path: Option<String>,
}
