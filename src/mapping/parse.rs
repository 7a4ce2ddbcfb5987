//! Record grammar: `<rawClassIndex>,<entry>[|<entry>]*` with
//! `<entry> ::= <activityLabel>[*<threshold>]`.

use thiserror::Error;

use super::ThresholdEntry;

const FIELD_SEPARATOR: char = ',';
const ENTRY_SEPARATOR: char = '|';
const THRESHOLD_SEPARATOR: char = '*';
const COMMENT_PREFIX: char = '#';

/// Why a single mapping record was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// The record did not split into exactly two comma-separated fields.
    #[error("expected 2 fields, found {found}")]
    FieldCount {
        /// Number of fields present.
        found: usize,
    },
    /// The first field is not a non-negative integer.
    #[error("invalid raw class index '{value}'")]
    BadIndex {
        /// Offending text.
        value: String,
    },
    /// A `*threshold` suffix is not a number.
    #[error("invalid threshold '{value}'")]
    BadThreshold {
        /// Offending text.
        value: String,
    },
    /// A threshold lies outside [0, 1].
    #[error("threshold {threshold} outside [0, 1]")]
    ThresholdOutOfRange {
        /// Parsed threshold.
        threshold: f32,
    },
    /// An entry has no activity label.
    #[error("empty activity label")]
    EmptyLabel,
    /// The line is not valid UTF-8.
    #[error("invalid UTF-8 after byte {valid_up_to}")]
    Encoding {
        /// Bytes decoded before the first invalid sequence.
        valid_up_to: usize,
    },
}

/// Parse one line. `Ok(None)` for blank and comment lines.
pub(super) fn parse_record(
    line: &str,
    default_threshold: f32,
) -> Result<Option<(usize, Vec<ThresholdEntry>)>, RecordError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
        return Ok(None);
    }
    let mut fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    // Spreadsheet exports pad rows with trailing separators.
    while fields.len() > 2 && fields.last().is_some_and(|field| field.trim().is_empty()) {
        fields.pop();
    }
    if fields.len() != 2 {
        return Err(RecordError::FieldCount {
            found: fields.len(),
        });
    }
    let raw = fields[0].trim();
    let index = raw.parse::<usize>().map_err(|_| RecordError::BadIndex {
        value: raw.to_string(),
    })?;
    let entries = fields[1]
        .split(ENTRY_SEPARATOR)
        .map(|entry| parse_entry(entry, default_threshold))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some((index, entries)))
}

fn parse_entry(entry: &str, default_threshold: f32) -> Result<ThresholdEntry, RecordError> {
    let (label, threshold) = match entry.split_once(THRESHOLD_SEPARATOR) {
        Some((label, raw)) => {
            let raw = raw.trim();
            let threshold = raw.parse::<f32>().map_err(|_| RecordError::BadThreshold {
                value: raw.to_string(),
            })?;
            (label, threshold)
        }
        None => (entry, default_threshold),
    };
    ThresholdEntry::new(label.trim(), threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_and_default_thresholds() {
        let (index, entries) = parse_record("0,Speaking*0.6|Conversation", 0.5)
            .unwrap()
            .unwrap();
        assert_eq!(index, 0);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label(), "Speaking");
        assert_eq!(entries[0].threshold(), 0.6);
        assert_eq!(entries[1].label(), "Conversation");
        assert_eq!(entries[1].threshold(), 0.5);
    }

    #[test]
    fn whitespace_and_crlf_are_trimmed() {
        let (index, entries) = parse_record(" 12 , Cooking * 0.3 \r", 0.5)
            .unwrap()
            .unwrap();
        assert_eq!(index, 12);
        assert_eq!(entries[0].label(), "Cooking");
        assert_eq!(entries[0].threshold(), 0.3);
    }

    #[test]
    fn trailing_empty_fields_are_dropped() {
        for line in ["0,Speaking,", "0,Speaking,, ,", "0,Speaking*0.6,\r"] {
            let (index, entries) = parse_record(line, 0.5).unwrap().unwrap();
            assert_eq!(index, 0);
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].label(), "Speaking");
        }
        assert_eq!(
            parse_record("0,Speaking,Cooking,", 0.5).unwrap_err(),
            RecordError::FieldCount { found: 3 }
        );
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        assert_eq!(parse_record("   ", 0.5).unwrap(), None);
        assert_eq!(parse_record("# index,entries", 0.5).unwrap(), None);
    }

    #[test]
    fn malformed_records_are_classified() {
        assert_eq!(
            parse_record("0", 0.5).unwrap_err(),
            RecordError::FieldCount { found: 1 }
        );
        assert_eq!(
            parse_record("0,A,B", 0.5).unwrap_err(),
            RecordError::FieldCount { found: 3 }
        );
        assert!(matches!(
            parse_record("-1,A", 0.5).unwrap_err(),
            RecordError::BadIndex { .. }
        ));
        assert!(matches!(
            parse_record("0,A*high", 0.5).unwrap_err(),
            RecordError::BadThreshold { .. }
        ));
        assert!(matches!(
            parse_record("0,A*1.5", 0.5).unwrap_err(),
            RecordError::ThresholdOutOfRange { .. }
        ));
        assert_eq!(parse_record("0,A||B", 0.5).unwrap_err(), RecordError::EmptyLabel);
    }
}
