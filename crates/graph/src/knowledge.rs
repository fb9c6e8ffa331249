use std::collections::HashSet;

use serde::Serialize;
use tablescout_core::{
    CentralityConfig, Result, SynonymDictionary, TableId, TableMetadata, TableScoutError,
};
use tracing::{info, warn};

use crate::centrality::compute_centrality;
use crate::store::{FkEdge, SchemaGraph};

/// An FK edge spelled out with table names, for explanations and prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

/// Immutable, precomputed view of a schema: table metadata, FK graph,
/// merged synonyms and centrality.
///
/// Built once and shared read-only across any number of concurrent queries.
#[derive(Debug, Clone)]
pub struct SchemaKnowledgeBase {
    tables: Vec<TableMetadata>,
    graph: SchemaGraph,
    has_embeddings: bool,
}

impl SchemaKnowledgeBase {
    pub fn builder() -> KnowledgeBaseBuilder {
        KnowledgeBaseBuilder::default()
    }

    /// All tables, indexed by [`TableId`].
    pub fn tables(&self) -> &[TableMetadata] {
        &self.tables
    }

    /// # Panics
    ///
    /// Panics if `id` did not come from this knowledge base.
    pub fn table(&self, id: TableId) -> &TableMetadata {
        &self.tables[id]
    }

    pub fn id_of(&self, name: &str) -> Option<TableId> {
        self.graph.id_of(name)
    }

    pub fn table_by_name(&self, name: &str) -> Option<&TableMetadata> {
        self.id_of(name).map(|id| &self.tables[id])
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// True when at least one table or column carries an embedding.
    pub fn has_embeddings(&self) -> bool {
        self.has_embeddings
    }

    /// Names of tables sharing an FK edge with `name`, in either direction.
    pub fn related_tables(&self, name: &str) -> Vec<&str> {
        match self.id_of(name) {
            Some(id) => self
                .graph
                .neighbors(id)
                .into_iter()
                .map(|n| self.tables[n].name.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn describe_edge(&self, edge: &FkEdge) -> Relationship {
        Relationship {
            from_table: self.tables[edge.source].name.clone(),
            from_column: edge.source_column.clone(),
            to_table: self.tables[edge.target].name.clone(),
            to_column: edge.target_column.clone(),
        }
    }

    /// FK relationships joining two tables directly, in either direction.
    pub fn relationships_between(&self, a: &str, b: &str) -> Vec<Relationship> {
        match (self.id_of(a), self.id_of(b)) {
            (Some(a), Some(b)) => self
                .graph
                .edges_between(a, b)
                .into_iter()
                .map(|e| self.describe_edge(e))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Collects collaborator output and freezes it into a [`SchemaKnowledgeBase`].
#[derive(Debug, Default)]
pub struct KnowledgeBaseBuilder {
    tables: Vec<TableMetadata>,
    synonyms: SynonymDictionary,
    centrality: CentralityConfig,
    precomputed_centrality: bool,
}

impl KnowledgeBaseBuilder {
    pub fn table(mut self, table: TableMetadata) -> Self {
        self.tables.push(table);
        self
    }

    pub fn tables<I: IntoIterator<Item = TableMetadata>>(mut self, tables: I) -> Self {
        self.tables.extend(tables);
        self
    }

    pub fn synonyms(mut self, synonyms: SynonymDictionary) -> Self {
        self.synonyms = synonyms;
        self
    }

    pub fn centrality_config(mut self, config: CentralityConfig) -> Self {
        self.centrality = config;
        self
    }

    /// Keep the centrality fields supplied on each table instead of
    /// recomputing them from the FK edges.
    pub fn with_precomputed_centrality(mut self) -> Self {
        self.precomputed_centrality = true;
        self
    }

    pub fn build(self) -> Result<SchemaKnowledgeBase> {
        let KnowledgeBaseBuilder {
            mut tables,
            synonyms,
            centrality,
            precomputed_centrality,
        } = self;

        let mut graph = SchemaGraph::new();
        let mut seen = HashSet::new();
        for table in &tables {
            if !seen.insert(table.name.clone()) {
                return Err(TableScoutError::DuplicateTable(table.name.clone()));
            }
            graph.upsert_table(&table.name);
        }

        for (source, table) in tables.iter().enumerate() {
            for fk in &table.foreign_keys {
                match graph.id_of(&fk.references_table) {
                    Some(target) => {
                        graph.add_edge(source, target, &fk.column, &fk.references_column);
                    }
                    None => warn!(
                        "Dropping FK {}.{} -> {}: referenced table is not in the knowledge base",
                        table.name, fk.column, fk.references_table
                    ),
                }
            }
        }

        for table in &mut tables {
            for column in table.columns.values_mut() {
                let mut normalized: Vec<String> = Vec::with_capacity(column.synonyms.len());
                for s in column.synonyms.drain(..) {
                    let s = s.trim().to_lowercase();
                    if !s.is_empty() && !normalized.contains(&s) {
                        normalized.push(s);
                    }
                }
                column.synonyms = normalized;
            }
        }

        let mut merged = 0usize;
        for (table_name, column_name, extra) in synonyms.iter() {
            let column = match graph.id_of(table_name) {
                Some(id) => tables[id].columns.get_mut(column_name),
                None => None,
            };
            match column {
                Some(column) => {
                    for s in extra {
                        if !column.synonyms.contains(s) {
                            column.synonyms.push(s.clone());
                            merged += 1;
                        }
                    }
                }
                None => warn!(
                    "Ignoring synonyms for unknown column {}.{}",
                    table_name, column_name
                ),
            }
        }

        if !precomputed_centrality {
            let metrics = compute_centrality(&graph, &centrality);
            for (table, mut m) in tables.iter_mut().zip(metrics) {
                m.betweenness = table.centrality.betweenness;
                table.centrality = m;
            }
        }

        let has_embeddings = tables.iter().any(TableMetadata::has_embeddings);
        let stats = graph.stats();

        info!(
            "Knowledge base built: {} tables, {} FK edges, {} synonyms merged, embeddings: {}",
            stats.table_count, stats.edge_count, merged, has_embeddings
        );

        Ok(SchemaKnowledgeBase {
            tables,
            graph,
            has_embeddings,
        })
    }
}
