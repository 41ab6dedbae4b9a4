//! Door label encoding
//!
//! A building's door labels are persisted as a single delimited text field
//! (`"1/F, 2/F, Basement"`). This module owns that format: joining ordered
//! labels into the stored text and splitting the text back into labels.
//!
//! Labels are not escaped. A label containing a comma is ambiguous with the
//! delimiter; that is a known limitation of the format, not corrected here.

use crate::{Error, Result};

/// Delimiter used between door labels in the stored text field
pub const LABEL_DELIMITER: &str = ", ";

/// Join ordered door labels into the stored text form
pub fn encode(labels: &[String]) -> String {
    labels.join(LABEL_DELIMITER)
}

/// Split label text into its non-empty labels
///
/// Splits on `,`, trims surrounding whitespace, and drops empty entries.
/// Used to count the "real" doors described by a text field.
pub fn decode_compact(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split label text into exactly `count` positional slots
///
/// Same splitting rules as [`decode_compact`], then padded with empty
/// strings or truncated so the result always has `count` entries. Used when
/// a caller expects one slot per declared door.
pub fn decode_padded(text: &str, count: usize) -> Vec<String> {
    let mut labels = decode_compact(text);
    labels.resize(count, String::new());
    labels
}

/// Check that the label text describes exactly `declared` doors
///
/// Fails with [`Error::CountMismatch`] when the compact label count differs
/// from the declared door count. Enforced at the API boundary; the store
/// itself accepts whatever count it is given.
pub fn validate_count(text: &str, declared: usize) -> Result<()> {
    let actual = decode_compact(text).len();
    if actual != declared {
        return Err(Error::CountMismatch { declared, actual });
    }
    Ok(())
}
