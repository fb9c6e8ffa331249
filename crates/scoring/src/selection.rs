use serde::Serialize;
use tablescout_graph::{Relationship, SchemaKnowledgeBase};

use crate::classify::QueryClass;
use crate::confidence::ConfidenceResult;
use crate::table_score::TableScore;
use crate::terms::QueryTerms;

/// Everything the funnel produced for one query.
#[derive(Debug, Clone, Serialize)]
pub struct TableSelection {
    pub query: String,
    pub terms: QueryTerms,
    pub query_class: QueryClass,
    /// Every table after scoring and centrality, in ranking order.
    pub all_scores: Vec<TableScore>,
    /// Final candidates after filtering and FK expansion.
    pub candidates: Vec<TableScore>,
    /// FK edges joining two final candidates.
    pub relationships: Vec<Relationship>,
    /// Candidates with no FK edge to any other candidate.
    pub disconnected_tables: Vec<String>,
    pub confidence: ConfidenceResult,
}

impl TableSelection {
    pub fn candidate_names(&self) -> Vec<&str> {
        self.candidates.iter().map(TableScore::table_name).collect()
    }

    pub fn candidate(&self, name: &str) -> Option<&TableScore> {
        self.candidates.iter().find(|c| c.table_name() == name)
    }

    /// True when every candidate can be joined to the rest.
    pub fn is_joinable(&self) -> bool {
        self.disconnected_tables.is_empty()
    }
}

/// FK relationships among `candidates`, and the candidates left unconnected.
pub(crate) fn join_structure(
    kb: &SchemaKnowledgeBase,
    candidates: &[TableScore],
) -> (Vec<Relationship>, Vec<String>) {
    let mut relationships = Vec::new();
    for (i, a) in candidates.iter().enumerate() {
        for b in &candidates[i + 1..] {
            relationships.extend(kb.relationships_between(a.table_name(), b.table_name()));
        }
    }

    let disconnected = if candidates.len() < 2 {
        Vec::new()
    } else {
        candidates
            .iter()
            .map(TableScore::table_name)
            .filter(|name| {
                !relationships
                    .iter()
                    .any(|r| r.from_table == *name || r.to_table == *name)
            })
            .map(str::to_string)
            .collect()
    };

    (relationships, disconnected)
}
