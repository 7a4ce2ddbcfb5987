//! Raw class index to activity threshold table.
//!
//! The table is immutable once built. Reloading builds a fresh table and the
//! owner swaps it in whole; see [`crate::AudioActivityClassifier::reload_mapping`].

mod parse;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

pub use parse::RecordError;

/// Default file name of the mapping source next to the model.
pub const MAPPING_FILE_NAME: &str = "activity_mapping.csv";

/// Failure to read a mapping source at all.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The source file could not be read.
    #[error("Failed to read activity mapping {path}: {source}")]
    Read {
        /// Mapping file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Reload was requested but no mapping source is configured.
    #[error("No activity mapping source configured")]
    NoSource,
}

/// One `(activity, threshold)` pair attached to a raw class.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdEntry {
    label: String,
    threshold: f32,
}

impl ThresholdEntry {
    /// Build an entry; the label must be non-empty and the threshold in [0, 1].
    pub fn new(label: impl Into<String>, threshold: f32) -> Result<Self, RecordError> {
        let label = label.into();
        if label.is_empty() {
            return Err(RecordError::EmptyLabel);
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RecordError::ThresholdOutOfRange { threshold });
        }
        Ok(Self { label, threshold })
    }

    /// Activity label this entry is evidence for.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Score a raw class must strictly exceed.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

/// A record that was skipped while loading.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// 1-based line number in the source.
    pub line: usize,
    /// Why it was skipped.
    pub error: RecordError,
}

/// Summary of one load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Records accepted into the table.
    pub records: usize,
    /// Records rejected, in source order.
    pub skipped: Vec<SkippedRecord>,
}

/// Lookup from raw class index to its ordered threshold entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityMappingTable {
    entries: BTreeMap<usize, Vec<ThresholdEntry>>,
}

impl ActivityMappingTable {
    /// Table with no mappings.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from already validated entries, applying the same duplicate policy
    /// as parsing.
    pub fn from_entries(entries: impl IntoIterator<Item = (usize, ThresholdEntry)>) -> Self {
        let mut table = Self::default();
        for (index, entry) in entries {
            table.insert(index, entry);
        }
        table
    }

    /// Parse mapping text. Malformed records are skipped and reported, never fatal.
    pub fn load_str(text: &str, default_threshold: f32) -> (Self, LoadReport) {
        Self::load_bytes(text.as_bytes(), default_threshold)
    }

    /// Parse raw mapping bytes line by line.
    ///
    /// A line that is not valid UTF-8 is skipped like any other malformed record.
    pub fn load_bytes(bytes: &[u8], default_threshold: f32) -> (Self, LoadReport) {
        let mut table = Self::default();
        let mut report = LoadReport::default();
        for (idx, raw) in bytes.split(|&byte| byte == b'\n').enumerate() {
            let line_no = idx + 1;
            let parsed = std::str::from_utf8(raw)
                .map_err(|err| RecordError::Encoding {
                    valid_up_to: err.valid_up_to(),
                })
                .and_then(|line| parse::parse_record(line, default_threshold));
            match parsed {
                Ok(Some((index, entries))) => {
                    for entry in entries {
                        table.insert(index, entry);
                    }
                    report.records += 1;
                }
                Ok(None) => {}
                Err(error) => {
                    warn!("Skipping activity mapping line {line_no}: {error}");
                    report.skipped.push(SkippedRecord {
                        line: line_no,
                        error,
                    });
                }
            }
        }
        (table, report)
    }

    /// Read and parse a mapping file.
    pub fn load_path(
        path: &Path,
        default_threshold: f32,
    ) -> Result<(Self, LoadReport), MappingError> {
        let bytes = std::fs::read(path).map_err(|source| MappingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let (table, report) = Self::load_bytes(&bytes, default_threshold);
        info!(
            "Loaded activity mapping from {}: {} classes, {} entries, {} skipped",
            path.display(),
            table.len(),
            table.entry_count(),
            report.skipped.len()
        );
        Ok((table, report))
    }

    /// Entries for `index`; empty when the class maps to nothing.
    pub fn lookup(&self, index: usize) -> &[ThresholdEntry] {
        self.entries.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mapped indices the model cannot produce with `output_width` classes.
    pub fn out_of_range(&self, output_width: usize) -> Vec<usize> {
        self.entries.range(output_width..).map(|(&index, _)| index).collect()
    }

    /// Number of mapped raw classes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total threshold entries across all classes.
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Mapped raw class indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Later duplicates of (index, label) replace the threshold in place.
    fn insert(&mut self, index: usize, entry: ThresholdEntry) {
        let list = self.entries.entry(index).or_default();
        match list.iter_mut().find(|existing| existing.label == entry.label) {
            Some(existing) => existing.threshold = entry.threshold,
            None => list.push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_of_unmapped_index_is_empty() {
        let (table, _) = ActivityMappingTable::load_str("3,Cooking", 0.5);
        assert!(table.lookup(0).is_empty());
        assert!(table.lookup(usize::MAX).is_empty());
        assert_eq!(table.lookup(3).len(), 1);
    }

    #[test]
    fn one_malformed_line_among_valid_lines_is_skipped() {
        let text = "0,Speaking*0.6\n1,Cooking\nnot-a-record\n2,Eating*0.4\n3,Walking\n";
        let (table, report) = ActivityMappingTable::load_str(text, 0.5);
        assert_eq!(table.entry_count(), 4);
        assert_eq!(report.records, 4);
        assert_eq!(
            report.skipped,
            vec![SkippedRecord {
                line: 3,
                error: RecordError::FieldCount { found: 1 },
            }]
        );
    }

    #[test]
    fn duplicate_label_keeps_position_and_takes_later_threshold() {
        let text = "0,Speaking*0.6|Conversation\n0,Speaking*0.2|Reading";
        let (table, _) = ActivityMappingTable::load_str(text, 0.5);
        let labels: Vec<_> = table.lookup(0).iter().map(|e| (e.label(), e.threshold())).collect();
        assert_eq!(
            labels,
            vec![("Speaking", 0.2), ("Conversation", 0.5), ("Reading", 0.5)]
        );
    }

    #[test]
    fn out_of_range_lists_indices_beyond_width() {
        let (table, _) = ActivityMappingTable::load_str("0,A\n4,B\n7,C\n521,D", 0.5);
        assert_eq!(table.out_of_range(5), vec![7, 521]);
        assert!(table.out_of_range(600).is_empty());
        assert_eq!(table.indices().collect::<Vec<_>>(), vec![0, 4, 7, 521]);
    }

    #[test]
    fn entry_rejects_out_of_range_threshold() {
        assert!(ThresholdEntry::new("A", -0.1).is_err());
        assert!(ThresholdEntry::new("A", f32::NAN).is_err());
        assert!(ThresholdEntry::new("", 0.5).is_err());
        assert!(ThresholdEntry::new("A", 1.0).is_ok());
    }

    #[test]
    fn load_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ActivityMappingTable::load_path(&dir.path().join(MAPPING_FILE_NAME), 0.5)
            .unwrap_err();
        assert!(matches!(err, MappingError::Read { .. }));
    }

    #[test]
    fn invalid_utf8_line_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MAPPING_FILE_NAME);
        std::fs::write(&path, b"0,Speaking\n1,Caf\xe9\n2,Cooking\n").unwrap();
        let (table, report) = ActivityMappingTable::load_path(&path, 0.5).unwrap();
        assert_eq!(table.indices().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(report.records, 2);
        assert_eq!(
            report.skipped,
            vec![SkippedRecord {
                line: 2,
                error: RecordError::Encoding { valid_up_to: 5 },
            }]
        );
    }

    #[test]
    fn load_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MAPPING_FILE_NAME);
        std::fs::write(
            &path,
            "# comment\n\n0,Speaking*0.6|Conversation\r\n137,Cooking\r\n",
        )
        .unwrap();
        let (table, report) = ActivityMappingTable::load_path(&path, 0.5).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.entry_count(), 3);
        assert!(report.skipped.is_empty());
    }
}
