use std::collections::HashMap;

use serde::Serialize;
use tablescout_core::TableId;

/// A foreign-key edge: `source.source_column` references `target.target_column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FkEdge {
    pub source: TableId,
    pub target: TableId,
    pub source_column: String,
    pub target_column: String,
}

#[derive(Debug, Serialize)]
pub struct GraphStats {
    pub table_count: usize,
    pub edge_count: usize,
    /// Tables with no FK edge in either direction.
    pub isolated_tables: usize,
    pub max_degree: usize,
}

/// Arena of table names indexed by dense [`TableId`], plus an FK adjacency list.
///
/// Adjacency vectors hold indexes into `edges` and are parallel to `names`.
///
/// Methods taking a [`TableId`] panic on an id that did not come from this
/// graph; use [`SchemaGraph::id_of`] to obtain valid ids.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    names: Vec<String>,
    index: HashMap<String, TableId>,
    edges: Vec<FkEdge>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, registering it if it is new.
    pub fn upsert_table(&mut self, name: &str) -> TableId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    pub fn id_of(&self, name: &str) -> Option<TableId> {
        self.index.get(name).copied()
    }

    /// # Panics
    ///
    /// Panics if `id` is out of range for this graph.
    pub fn name(&self, id: TableId) -> &str {
        &self.names[id]
    }

    /// Every stored FK edge, in insertion order.
    pub fn edges(&self) -> &[FkEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Add an FK edge. Self-references and exact duplicates are ignored;
    /// returns the index of the stored edge, if one was added or already present.
    pub fn add_edge(
        &mut self,
        source: TableId,
        target: TableId,
        source_column: &str,
        target_column: &str,
    ) -> Option<usize> {
        if source == target || source >= self.names.len() || target >= self.names.len() {
            return None;
        }

        if let Some(&existing) = self.outgoing[source].iter().find(|&&e| {
            let edge = &self.edges[e];
            edge.target == target
                && edge.source_column == source_column
                && edge.target_column == target_column
        }) {
            return Some(existing);
        }

        let idx = self.edges.len();
        self.edges.push(FkEdge {
            source,
            target,
            source_column: source_column.to_string(),
            target_column: target_column.to_string(),
        });
        self.outgoing[source].push(idx);
        self.incoming[target].push(idx);
        Some(idx)
    }

    /// Edges leaving `id` (this table references others).
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range for this graph.
    pub fn outgoing(&self, id: TableId) -> impl Iterator<Item = &FkEdge> {
        self.outgoing[id].iter().map(move |&e| &self.edges[e])
    }

    /// Edges arriving at `id` (other tables reference this one).
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range for this graph.
    pub fn incoming(&self, id: TableId) -> impl Iterator<Item = &FkEdge> {
        self.incoming[id].iter().map(move |&e| &self.edges[e])
    }

    /// Distinct tables this table references, ascending by id.
    pub fn referenced_tables(&self, id: TableId) -> Vec<TableId> {
        let mut out: Vec<TableId> = self.outgoing(id).map(|e| e.target).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Distinct tables referencing this table, ascending by id.
    pub fn referencing_tables(&self, id: TableId) -> Vec<TableId> {
        let mut out: Vec<TableId> = self.incoming(id).map(|e| e.source).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Direct FK neighbours in either direction, ascending by id.
    pub fn neighbors(&self, id: TableId) -> Vec<TableId> {
        let mut out: Vec<TableId> = self
            .outgoing(id)
            .map(|e| e.target)
            .chain(self.incoming(id).map(|e| e.source))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn are_connected(&self, a: TableId, b: TableId) -> bool {
        self.outgoing(a).any(|e| e.target == b) || self.outgoing(b).any(|e| e.target == a)
    }

    /// All edges joining `a` and `b`, in either direction.
    pub fn edges_between(&self, a: TableId, b: TableId) -> Vec<&FkEdge> {
        self.outgoing(a)
            .filter(|e| e.target == b)
            .chain(self.outgoing(b).filter(|e| e.target == a))
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        let mut isolated_tables = 0;
        let mut max_degree = 0;
        for id in 0..self.names.len() {
            let degree = self.outgoing[id].len() + self.incoming[id].len();
            if degree == 0 {
                isolated_tables += 1;
            }
            max_degree = max_degree.max(degree);
        }
        GraphStats {
            table_count: self.names.len(),
            edge_count: self.edges.len(),
            isolated_tables,
            max_degree,
        }
    }
}
