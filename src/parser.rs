//! Sample parser: raw text line -> [`Sample`]
//!
//! Accepts the two encodings the device ecosystem produces:
//!
//! 1. The live wire form, three comma-separated numeric fields:
//!    `"120, 2.60, 3.10"`
//! 2. The persisted columnar row form with label-prefixed, unit-suffixed
//!    cells, quoted or unquoted:
//!    `123,"Voltage 1: 2.60V","Voltage 2: 3.10V"`
//!
//! Supporting both means the parser round-trips the session recorder's
//! own output. Cell decoration (label prefix, `V` unit suffix, quoting)
//! is decoded by [`crate::session::columnar`]; no other module touches
//! label-prefixed strings.
//!
//! Parsing is pure and never panics; the pipeline treats any
//! [`ParseError`] as skip-this-line-and-continue.

use crate::session::columnar;
use crate::types::Sample;
use thiserror::Error;

/// Why a raw line could not be parsed into a [`Sample`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line did not split into exactly three fields
    #[error("expected 3 fields, found {found}")]
    WrongFieldCount {
        /// Number of comma-separated fields found
        found: usize,
    },

    /// A field had broken structure (unbalanced quote, label without value)
    #[error("malformed field `{field}`")]
    MalformedField {
        /// The offending field, trimmed
        field: String,
    },

    /// A field's value portion was not a valid number
    #[error("non-numeric value `{field}`")]
    NonNumeric {
        /// The offending value, after decoration was stripped
        field: String,
    },
}

/// Parse one raw line into a [`Sample`]
pub fn parse_line(raw: &str) -> Result<Sample, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::WrongFieldCount { found: 0 });
    }

    let fields: Vec<&str> = raw.split(',').collect();
    if fields.len() != 3 {
        return Err(ParseError::WrongFieldCount {
            found: fields.len(),
        });
    }

    let millis = columnar::decode_cell(fields[0], false)?;
    let voltage1 = columnar::decode_cell(fields[1], true)?;
    let voltage2 = columnar::decode_cell(fields[2], true)?;

    Ok(Sample::new(
        parse_millis(millis)?,
        parse_volts(voltage1)?,
        parse_volts(voltage2)?,
    ))
}

fn parse_millis(value: &str) -> Result<u64, ParseError> {
    value.parse::<u64>().map_err(|_| ParseError::NonNumeric {
        field: value.to_string(),
    })
}

fn parse_volts(value: &str) -> Result<f64, ParseError> {
    value.parse::<f64>().map_err(|_| ParseError::NonNumeric {
        field: value.to_string(),
    })
}
