//! Known activity identifiers.

use std::collections::BTreeSet;

use thiserror::Error;

/// Activities recognized when no override is configured.
pub const DEFAULT_ACTIVITIES: &[&str] = &[
    "Alarm",
    "Cleaning",
    "Conversation",
    "Cooking",
    "Coughing",
    "Crying",
    "DoorActivity",
    "Eating",
    "Exercising",
    "ListeningMusic",
    "PhoneCall",
    "Reading",
    "Sleeping",
    "Speaking",
    "Walking",
    "Washing",
    "WatchingTv",
];

/// A mapping entry names an activity outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown activity label '{label}' mapped from raw class {raw_index}")]
pub struct UnknownActivityLabel {
    /// Label as written in the mapping source.
    pub label: String,
    /// Raw class whose entry referenced it.
    pub raw_index: usize,
}

/// Closed set of activity ids the rest of the system understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityVocabulary {
    labels: BTreeSet<String>,
}

impl ActivityVocabulary {
    /// Vocabulary with exactly `labels`; blank labels are ignored.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels = labels
            .into_iter()
            .map(|label| label.as_ref().trim().to_string())
            .filter(|label| !label.is_empty())
            .collect();
        Self { labels }
    }

    /// True when `label` is a known activity. Matching is case sensitive.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Accept `label`, or describe it as unknown for `raw_index`.
    pub fn validate<'a>(
        &self,
        label: &'a str,
        raw_index: usize,
    ) -> Result<&'a str, UnknownActivityLabel> {
        if self.contains(label) {
            Ok(label)
        } else {
            Err(UnknownActivityLabel {
                label: label.to_string(),
                raw_index,
            })
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl Default for ActivityVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITIES)
    }
}
