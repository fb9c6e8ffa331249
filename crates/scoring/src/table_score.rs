use std::cmp::Ordering;
use std::collections::BTreeMap;

use indexmap::IndexSet;
use serde::Serialize;
use tablescout_core::SignalCaps;

use crate::signal::SignalKind;

/// Per-query relevance score of one table.
///
/// `score` always equals the sum of the signal vector, and no capped kind
/// accepts more occurrences than its cap. Both hold because the only way to
/// add points is [`TableScore::add_score`].
#[derive(Debug, Clone, Serialize)]
pub struct TableScore {
    table_name: String,
    score: f64,
    signals: BTreeMap<SignalKind, f64>,
    matched_columns: IndexSet<String>,
    matched_entities: IndexSet<String>,
    reasons: Vec<String>,
    #[serde(skip)]
    counts: BTreeMap<SignalKind, u32>,
    #[serde(skip)]
    caps: SignalCaps,
}

impl TableScore {
    pub fn new(table_name: &str, caps: SignalCaps) -> Self {
        Self {
            table_name: table_name.to_string(),
            score: 0.0,
            signals: BTreeMap::new(),
            matched_columns: IndexSet::new(),
            matched_entities: IndexSet::new(),
            reasons: Vec::new(),
            counts: BTreeMap::new(),
            caps,
        }
    }

    /// Add `points` under `kind` unless the kind's cap is already reached.
    ///
    /// Returns whether the contribution was accepted. A declined contribution
    /// leaves the score, reasons and matched columns untouched.
    pub fn add_score(
        &mut self,
        kind: SignalKind,
        points: f64,
        reason: impl Into<String>,
        column: Option<&str>,
    ) -> bool {
        if !points.is_finite() || points < 0.0 {
            return false;
        }
        let count = self.counts.get(&kind).copied().unwrap_or(0);
        if let Some(cap) = kind.cap(&self.caps) {
            if count >= cap {
                return false;
            }
        }

        self.counts.insert(kind, count + 1);
        *self.signals.entry(kind).or_insert(0.0) += points;
        self.score = self.signals.values().sum();
        self.reasons.push(reason.into());
        if let Some(column) = column {
            self.matched_columns.insert(column.to_string());
        }
        true
    }

    /// Record that a query entity contributed to this table.
    pub fn record_entity(&mut self, entity: &str) {
        self.matched_entities.insert(entity.to_string());
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Score excluding FK-expansion contributions.
    pub fn base_score(&self) -> f64 {
        self.signals
            .iter()
            .filter(|(kind, _)| kind.is_base())
            .map(|(_, points)| points)
            .sum()
    }

    /// Accumulated points for one kind.
    pub fn signal(&self, kind: SignalKind) -> f64 {
        self.signals.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn has_signal(&self, kind: SignalKind) -> bool {
        self.signals.contains_key(&kind)
    }

    pub fn signals(&self) -> &BTreeMap<SignalKind, f64> {
        &self.signals
    }

    /// Accepted occurrences of one kind.
    pub fn occurrences(&self, kind: SignalKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn matched_columns(&self) -> &IndexSet<String> {
        &self.matched_columns
    }

    pub fn matched_entities(&self) -> &IndexSet<String> {
        &self.matched_entities
    }

    pub fn caps(&self) -> SignalCaps {
        self.caps
    }

    /// Serialized record form consumed by catalog and prompt builders.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Ranking order: higher score first, then table name ascending.
pub fn rank_order(a: &TableScore, b: &TableScore) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.table_name.cmp(&b.table_name))
}

pub fn sort_scores(scores: &mut [TableScore]) {
    scores.sort_by(rank_order);
}
