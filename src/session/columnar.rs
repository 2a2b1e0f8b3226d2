//! Columnar session format: the persisted CSV dialect
//!
//! The archive format is plain comma-separated text with a fixed header
//! and decorated data cells:
//!
//! ```text
//! Millis,Voltage 1,Voltage 2
//! 0,"Voltage 1: 2.50V","Voltage 2: 3.00V"
//! 10,"Voltage 1: 2.60V","Voltage 2: 3.10V"
//! ```
//!
//! The header cells are plain while the data cells carry a label prefix
//! and a `V` unit suffix. The asymmetry is historical and must be
//! preserved for compatibility with existing archives. This module is
//! the only place that knows about the decoration; everything else goes
//! through [`encode_row`] / [`decode_cell`].

use crate::parser::ParseError;
use crate::types::Sample;

/// Fixed, mandatory header row
pub const HEADER: &str = "Millis,Voltage 1,Voltage 2";

/// Label prefix of the second column's data cells
pub const VOLTAGE1_LABEL: &str = "Voltage 1";

/// Label prefix of the third column's data cells
pub const VOLTAGE2_LABEL: &str = "Voltage 2";

/// Encode one sample as a data row
///
/// Voltages are rendered with exactly two decimal places.
pub fn encode_row(sample: &Sample) -> String {
    format!(
        "{},\"{}: {:.2}V\",\"{}: {:.2}V\"",
        sample.millis, VOLTAGE1_LABEL, sample.voltage1, VOLTAGE2_LABEL, sample.voltage2
    )
}

/// Strip cell decoration and return the bare value portion
///
/// Handles, in order: surrounding whitespace, an optional quote pair, an
/// optional `<Label>: ` prefix, and (for voltage cells) an optional
/// trailing unit character. Plain numeric cells pass through untouched,
/// so the live wire form decodes through the same path.
pub fn decode_cell(cell: &str, strip_unit: bool) -> Result<&str, ParseError> {
    let mut value = cell.trim();

    if value.starts_with('"') || value.ends_with('"') {
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            value = value[1..value.len() - 1].trim();
        } else {
            return Err(ParseError::MalformedField {
                field: cell.trim().to_string(),
            });
        }
    }

    if let Some((_, rest)) = value.split_once(':') {
        value = rest.trim();
        if value.is_empty() {
            return Err(ParseError::MalformedField {
                field: cell.trim().to_string(),
            });
        }
    }

    if strip_unit {
        value = value.strip_suffix(['V', 'v']).unwrap_or(value).trim_end();
    }

    if value.is_empty() {
        return Err(ParseError::MalformedField {
            field: cell.trim().to_string(),
        });
    }

    Ok(value)
}
