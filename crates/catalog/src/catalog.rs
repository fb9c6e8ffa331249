use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tablescout_core::{ColumnMetadata, Result, SemanticType, TableMetadata, TableScoutError};
use tablescout_graph::{Relationship, SchemaKnowledgeBase};
use tablescout_scoring::{is_rescued, ConfidenceResult, QueryClass, TableScore, TableSelection};
use tracing::info;


/// How much column metadata a catalog carries.
///
/// `Basic` is names, types and keys. `Medium` adds nullability, cardinality,
/// three sample values, synonyms, scoring reasons and FK relationships.
/// `Full` adds null percentage, hints, top values, five samples and
/// descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Basic,
    Medium,
    #[default]
    Full,
}

impl DetailLevel {
    fn sample_limit(self) -> usize {
        match self {
            DetailLevel::Basic => 0,
            DetailLevel::Medium => 3,
            DetailLevel::Full => 5,
        }
    }

    fn includes_relationships(self) -> bool {
        self != DetailLevel::Basic
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetailLevel::Basic => "basic",
            DetailLevel::Medium => "medium",
            DetailLevel::Full => "full",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = TableScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(DetailLevel::Basic),
            "medium" => Ok(DetailLevel::Medium),
            "full" => Ok(DetailLevel::Full),
            other => Err(TableScoutError::Config(format!("unknown detail level '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    Inner,
    #[default]
    Left,
}

impl JoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
        }
    }
}

/// SQL join clause bringing `rel.to_table` into a query that already has
/// `rel.from_table`.
pub fn join_clause(rel: &Relationship, join_type: JoinType) -> String {
    format!(
        "{} JOIN \"{}\" ON \"{}\".\"{}\" = \"{}\".\"{}\"",
        join_type.as_str(),
        rel.to_table,
        rel.from_table,
        rel.from_column,
        rel.to_table,
        rel.to_column
    )
}

/// One column of a candidate table.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogColumn {
    pub name: String,
    /// Native type with the semantic type in parentheses, e.g. `DATE (temporal)`.
    pub data_type: String,
    pub semantic_type: SemanticType,
    pub is_primary_key: bool,
    /// `table.column` this column references, if it is a foreign key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
    /// Whether the query matched this column.
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sample_values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_percentage: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CatalogColumn {
    fn build(
        name: &str,
        column: &ColumnMetadata,
        table: &TableMetadata,
        matched: bool,
        level: DetailLevel,
    ) -> Self {
        let references = table
            .foreign_keys
            .iter()
            .find(|fk| fk.column == name)
            .map(|fk| format!("{}.{}", fk.references_table, fk.references_column));

        let mut out = CatalogColumn {
            name: name.to_string(),
            data_type: format!("{} ({})", column.native_type, column.semantic_type),
            semantic_type: column.semantic_type,
            is_primary_key: column.is_primary_key,
            references,
            matched,
            nullable: None,
            cardinality: None,
            sample_values: Vec::new(),
            synonyms: Vec::new(),
            null_percentage: None,
            hints: Vec::new(),
            top_values: Vec::new(),
            description: None,
        };
        if level == DetailLevel::Basic {
            return out;
        }

        out.nullable = Some(column.null_ratio > 0.0);
        out.cardinality = Some(format!("{:.1}% unique", column.cardinality_ratio * 100.0));
        out.sample_values = column
            .sample_values
            .iter()
            .take(level.sample_limit())
            .cloned()
            .collect();
        out.synonyms = column.synonyms.clone();
        if level == DetailLevel::Medium {
            return out;
        }

        out.null_percentage = Some(format!("{:.1}%", column.null_ratio * 100.0));
        let hints = &column.hints;
        for (on, label) in [
            (hints.good_for_filtering, "filtering"),
            (hints.good_for_grouping, "grouping"),
            (hints.good_for_aggregation, "aggregation"),
        ] {
            if on {
                out.hints.push(label);
            }
        }
        out.top_values = column.top_values.iter().take(5).cloned().collect();
        out.description = column.description.clone();
        out
    }

    fn prompt_line(&self) -> String {
        let mut line = format!("{}: {}", self.name, self.data_type);
        if self.is_primary_key {
            line.push_str(" [PK]");
        }
        if let Some(target) = &self.references {
            line.push_str(&format!(" [FK → {}]", target));
        }
        if self.matched {
            line.push_str(" *matched*");
        }
        if !self.hints.is_empty() {
            line.push_str(&format!(" (good for {})", self.hints.join(", ")));
        }
        if !self.top_values.is_empty() {
            line.push_str(&format!(" top: {}", self.top_values.join(", ")));
        } else if !self.sample_values.is_empty() {
            line.push_str(&format!(" e.g. {}", self.sample_values.join(", ")));
        }
        if !self.synonyms.is_empty() {
            line.push_str(&format!(" aka {}", self.synonyms.join(", ")));
        }
        line
    }
}

/// A candidate table with its score explanation and schema detail.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    /// 1-based position in the final candidate list.
    pub rank: usize,
    pub table_name: String,
    pub score: f64,
    pub base_score: f64,
    pub row_count: u64,
    pub is_hub: bool,
    /// Pulled in by FK expansion rather than selected on its own score.
    pub rescued: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    pub matched_columns: Vec<String>,
    pub matched_entities: Vec<String>,
    pub columns: Vec<CatalogColumn>,
    /// Outgoing FK relationships.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<Relationship>,
    /// Tables holding an FK to this one.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub referenced_by: Vec<String>,
}

impl CatalogEntry {
    fn build(
        rank: usize,
        score: &TableScore,
        kb: &SchemaKnowledgeBase,
        level: DetailLevel,
    ) -> Result<Self> {
        let table = kb
            .table_by_name(score.table_name())
            .ok_or_else(|| TableScoutError::UnknownTable(score.table_name().to_string()))?;

        let columns = table
            .columns
            .iter()
            .map(|(name, column)| {
                let matched = score.matched_columns().contains(name.as_str());
                CatalogColumn::build(name, column, table, matched, level)
            })
            .collect();

        let mut entry = CatalogEntry {
            rank,
            table_name: table.name.clone(),
            score: score.score(),
            base_score: score.base_score(),
            row_count: table.row_count,
            is_hub: table.centrality.is_hub,
            rescued: is_rescued(score),
            description: None,
            reasons: Vec::new(),
            matched_columns: score.matched_columns().iter().cloned().collect(),
            matched_entities: score.matched_entities().iter().cloned().collect(),
            columns,
            foreign_keys: Vec::new(),
            referenced_by: Vec::new(),
        };

        if level.includes_relationships() {
            entry.description = table.description.clone();
            entry.reasons = score.reasons().to_vec();
            entry.foreign_keys = table
                .foreign_keys
                .iter()
                .map(|fk| Relationship {
                    from_table: table.name.clone(),
                    from_column: fk.column.clone(),
                    to_table: fk.references_table.clone(),
                    to_column: fk.references_column.clone(),
                })
                .collect();
            for other in kb.tables() {
                if other.name != table.name
                    && other.foreign_keys.iter().any(|fk| fk.references_table == table.name)
                {
                    entry.referenced_by.push(other.name.clone());
                }
            }
        }

        Ok(entry)
    }

    pub fn column(&self, name: &str) -> Option<&CatalogColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Detail-levelled description of a table selection for a SQL generator.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateCatalog {
    pub query: String,
    pub detail_level: DetailLevel,
    pub query_class: QueryClass,
    pub entities: Vec<String>,
    pub entries: Vec<CatalogEntry>,
    /// FK edges joining two candidates.
    pub joins: Vec<Relationship>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disconnected_tables: Vec<String>,
    pub confidence: ConfidenceResult,
}

impl CandidateCatalog {
    /// Describe every final candidate of `selection` using the schema in `kb`.
    ///
    /// Fails only if a candidate is missing from `kb`, which means the
    /// selection came from a different knowledge base.
    pub fn from_selection(
        selection: &TableSelection,
        kb: &SchemaKnowledgeBase,
        level: DetailLevel,
    ) -> Result<Self> {
        let entries = selection
            .candidates
            .iter()
            .enumerate()
            .map(|(i, score)| CatalogEntry::build(i + 1, score, kb, level))
            .collect::<Result<Vec<_>>>()?;

        let catalog = CandidateCatalog {
            query: selection.query.clone(),
            detail_level: level,
            query_class: selection.query_class,
            entities: selection.terms.entities.clone(),
            entries,
            joins: selection.relationships.clone(),
            disconnected_tables: selection.disconnected_tables.clone(),
            confidence: selection.confidence.clone(),
        };

        info!(
            "Candidate catalog built: {} tables, {} joins (detail: {}, confidence: {})",
            catalog.entries.len(),
            catalog.joins.len(),
            catalog.detail_level,
            catalog.confidence.confidence_level
        );

        Ok(catalog)
    }

    pub fn entry(&self, table: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.table_name == table)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.table_name.as_str()).collect()
    }

    /// One join clause per FK edge among the candidates.
    pub fn join_clauses(&self, join_type: JoinType) -> Vec<String> {
        self.joins.iter().map(|r| join_clause(r, join_type)).collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Render the catalog as a prompt block for an SQL-generating model.
    pub fn to_system_prompt(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("Question: {}", self.query.trim()));
        lines.push(format!(
            "Query class: {}. Confidence: {} ({:.2}).",
            self.query_class, self.confidence.confidence_level, self.confidence.confidence_score
        ));
        if self.confidence.is_domain_mismatch {
            lines.push("Warning: the question does not appear to be about this database.".to_string());
        }
        lines.push(String::new());

        lines.push(format!("Candidate tables ({}):", self.entries.len()));
        for entry in &self.entries {
            let mut tags = Vec::new();
            if entry.is_hub {
                tags.push("hub");
            }
            if entry.rescued {
                tags.push("join table");
            }
            let tags = if tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", tags.join(", "))
            };
            lines.push(format!(
                "  {}. {} (score {:.1}, {} rows){}",
                entry.rank, entry.table_name, entry.score, entry.row_count, tags
            ));
            if let Some(desc) = &entry.description {
                lines.push(format!("     {}", desc));
            }
            if !entry.reasons.is_empty() {
                lines.push(format!("     why: {}", entry.reasons.join("; ")));
            }
            if !entry.matched_columns.is_empty() {
                lines.push(format!("     matched columns: {}", entry.matched_columns.join(", ")));
            }
            lines.push("     columns:".to_string());
            for column in &entry.columns {
                lines.push(format!("       - {}", column.prompt_line()));
            }
            if !entry.referenced_by.is_empty() {
                lines.push(format!("     referenced by: {}", entry.referenced_by.join(", ")));
            }
        }

        if self.detail_level.includes_relationships() && !self.joins.is_empty() {
            lines.push(String::new());
            lines.push("Relationships:".to_string());
            for rel in &self.joins {
                lines.push(format!(
                    "  - {}.{} → {}.{}",
                    rel.from_table, rel.from_column, rel.to_table, rel.to_column
                ));
            }
        }

        if !self.disconnected_tables.is_empty() {
            lines.push(String::new());
            lines.push(format!(
                "No join path to the other candidates: {}",
                self.disconnected_tables.join(", ")
            ));
        }

        lines.push(String::new());
        lines.push(self.confidence.recommendation.clone());
        lines.join("\n")
    }
}
