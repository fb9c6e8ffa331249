use tablescout_core::{CentralityConfig, CentralityMetrics, TableId};

use crate::store::SchemaGraph;

/// Weighted degree of a single table.
///
/// Incoming edges weigh more: tables referenced by many others are usually
/// the core entities of a schema.
pub fn weighted_degree(incoming: usize, outgoing: usize, config: &CentralityConfig) -> f64 {
    incoming as f64 * config.incoming_weight + outgoing as f64 * config.outgoing_weight
}

/// Compute centrality for every table, indexed by [`TableId`].
///
/// Edge counts are distinct neighbouring tables, so several FK columns
/// pointing at the same table count once. Betweenness is left unset.
pub fn compute_centrality(graph: &SchemaGraph, config: &CentralityConfig) -> Vec<CentralityMetrics> {
    let mut metrics: Vec<CentralityMetrics> = (0..graph.len())
        .map(|id: TableId| {
            let incoming_edges = graph.referencing_tables(id).len();
            let outgoing_edges = graph.referenced_tables(id).len();
            CentralityMetrics {
                degree_centrality: weighted_degree(incoming_edges, outgoing_edges, config),
                incoming_edges,
                outgoing_edges,
                ..Default::default()
            }
        })
        .collect();

    let max_degree = metrics
        .iter()
        .map(|m| m.degree_centrality)
        .fold(0.0, f64::max);

    if max_degree > 0.0 {
        for m in &mut metrics {
            m.normalized_centrality = m.degree_centrality / max_degree;
            m.is_hub = m.normalized_centrality >= config.hub_threshold;
        }
    }

    metrics
}
