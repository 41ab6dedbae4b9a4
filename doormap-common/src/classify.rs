//! Pin color classification
//!
//! Maps a door's (congregation, language) pair to the map marker color used
//! for its building. Pure computation with no I/O so server and clients see
//! identical results; this is the single authoritative implementation and
//! clients consume the resolved color rather than recomputing it.

/// Number of distinct pin colors available as marker images
pub const PIN_COLOR_COUNT: u32 = 15;

/// Base color index for a language name (case-insensitive)
///
/// Unknown languages map to 1 (the english pin).
pub fn base_index(language: &str) -> u32 {
    match language.trim().to_ascii_lowercase().as_str() {
        "english" => 1,
        "tamil" => 2,
        "hindi" => 3,
        "telugu" => 4,
        "malayalam" => 5,
        _ => 1,
    }
}

/// Compute the pin color index for a (congregation, language) pair
///
/// Congregation 1 uses the base language index directly. Other congregations
/// offset by five per congregation, wrapping back into [1, 15] once the raw
/// value exceeds the available pin count. Always returns a value in [1, 15].
pub fn color_for(congregation_id: i64, language: &str) -> u32 {
    let base = base_index(language);
    if congregation_id <= 1 {
        return base;
    }

    // Congregation ids are unbounded i64s. The raw value only matters
    // modulo the pin count, so reduce the offset before multiplying
    // rather than risking overflow on (id - 1) * 5.
    let offset = ((congregation_id - 1).rem_euclid(PIN_COLOR_COUNT as i64)) as u32;
    let raw = offset * 5 + base;
    if raw > PIN_COLOR_COUNT {
        ((raw - 1) % PIN_COLOR_COUNT) + 1
    } else {
        raw
    }
}

/// Marker image path for a pin color index
pub fn image_path_for(color: u32) -> String {
    format!("/pins/pin{}.png", color)
}

/// Resolve the pin for a concrete record
///
/// Resolution order: explicit stored image, then explicit stored color (via
/// [`image_path_for`]), then the computed [`color_for`] value. Catalog
/// entries carry the optional stored overrides; both absent means fully
/// computed.
pub fn resolve_pin(
    stored_color: Option<u32>,
    stored_image: Option<&str>,
    congregation_id: i64,
    language: &str,
) -> (u32, String) {
    let color = stored_color.unwrap_or_else(|| color_for(congregation_id, language));
    let image = match stored_image {
        Some(path) => path.to_string(),
        None => image_path_for(color),
    };
    (color, image)
}
