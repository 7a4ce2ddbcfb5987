//! Turn raw class scores into activity confidences.

use std::collections::BTreeMap;

use tracing::warn;

use crate::activity::{ActivityVocabulary, UnknownActivityLabel};
use crate::mapping::ActivityMappingTable;

/// Activity label to confidence, ordered by label.
pub type ActivityResult = BTreeMap<String, f32>;

/// Result of one reconciliation plus the unknown labels it dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Labels that cleared at least one threshold, with their best score.
    pub activities: ActivityResult,
    /// One item per dropped candidate, in raw index order.
    pub unknown: Vec<UnknownActivityLabel>,
}

/// Applies an [`ActivityMappingTable`] to a raw score vector.
#[derive(Debug, Clone, Default)]
pub struct ActivityReconciler {
    vocabulary: ActivityVocabulary,
}

impl ActivityReconciler {
    pub fn new(vocabulary: ActivityVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &ActivityVocabulary {
        &self.vocabulary
    }

    /// Map scores to activities, logging and dropping unknown labels.
    pub fn reconcile(&self, scores: &[f32], table: &ActivityMappingTable) -> ActivityResult {
        let outcome = self.reconcile_with_report(scores, table);
        for unknown in &outcome.unknown {
            warn!("Dropping activity candidate: {unknown}");
        }
        outcome.activities
    }

    /// Map scores to activities and return unknown labels instead of logging them.
    ///
    /// A score qualifies only when strictly greater than the entry threshold.
    /// Several qualifying candidates for one label keep the highest score.
    /// Table indices beyond `scores` are never visited.
    pub fn reconcile_with_report(
        &self,
        scores: &[f32],
        table: &ActivityMappingTable,
    ) -> Reconciliation {
        let mut outcome = Reconciliation::default();
        for (index, &score) in scores.iter().enumerate() {
            for entry in table.lookup(index).iter().filter(|e| score > e.threshold()) {
                match self.vocabulary.validate(entry.label(), index) {
                    Ok(label) => {
                        outcome
                            .activities
                            .entry(label.to_string())
                            .and_modify(|best| *best = best.max(score))
                            .or_insert(score);
                    }
                    Err(unknown) => outcome.unknown.push(unknown),
                }
            }
        }
        outcome
    }
}
