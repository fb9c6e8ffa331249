use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Dense index of a table inside a loaded knowledge base.
pub type TableId = usize;

/// Semantic classification of a column, as inferred by the profiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Numerical,
    Categorical,
    Temporal,
    Text,
    Identifier,
    Boolean,
    #[default]
    Unknown,
}

impl SemanticType {
    /// Map an external tag onto the enum, ignoring case and surrounding whitespace.
    /// Unrecognised tags become `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "numerical" | "numeric" => SemanticType::Numerical,
            "categorical" => SemanticType::Categorical,
            "temporal" => SemanticType::Temporal,
            "text" => SemanticType::Text,
            "identifier" => SemanticType::Identifier,
            "boolean" => SemanticType::Boolean,
            _ => SemanticType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Numerical => "numerical",
            SemanticType::Categorical => "categorical",
            SemanticType::Temporal => "temporal",
            SemanticType::Text => "text",
            SemanticType::Identifier => "identifier",
            SemanticType::Boolean => "boolean",
            SemanticType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SemanticType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SemanticType::from_tag(s))
    }
}

// Profilers emit "TEMPORAL", "temporal" and "Temporal" interchangeably.
impl<'de> Deserialize<'de> for SemanticType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(SemanticType::from_tag(&raw))
    }
}

/// Query-optimization hints produced by the profiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationHints {
    pub good_for_filtering: bool,
    pub good_for_grouping: bool,
    pub good_for_aggregation: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMetadata {
    pub native_type: String,
    pub semantic_type: SemanticType,
    /// Fraction of rows that are null, in [0, 1].
    pub null_ratio: f64,
    /// Distinct values divided by row count, in [0, 1].
    pub cardinality_ratio: f64,
    pub is_primary_key: bool,
    pub sample_values: Vec<String>,
    /// Most frequent values, most frequent first.
    pub top_values: Vec<String>,
    /// Curated synonyms, lower-cased when merged into a knowledge base.
    pub synonyms: Vec<String>,
    pub hints: OptimizationHints,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl ColumnMetadata {
    pub fn new(native_type: &str, semantic_type: SemanticType) -> Self {
        Self {
            native_type: native_type.to_string(),
            semantic_type,
            ..Default::default()
        }
    }

    pub fn with_samples<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sample_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_top_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.top_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_hints(mut self, filtering: bool, grouping: bool, aggregation: bool) -> Self {
        self.hints = OptimizationHints {
            good_for_filtering: filtering,
            good_for_grouping: grouping,
            good_for_aggregation: aggregation,
        };
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// An outgoing foreign key: `column` in the owning table references
/// `references_column` in `references_table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
}

/// Structural importance of a table in the FK graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentralityMetrics {
    /// Weighted degree: incoming edges weigh more than outgoing ones.
    pub degree_centrality: f64,
    /// `degree_centrality` divided by the schema maximum, in [0, 1].
    pub normalized_centrality: f64,
    pub incoming_edges: usize,
    pub outgoing_edges: usize,
    pub is_hub: bool,
    /// Carried through when a collaborator supplies it; not used for scoring.
    pub betweenness: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableMetadata {
    pub name: String,
    pub row_count: u64,
    pub description: Option<String>,
    pub columns: IndexMap<String, ColumnMetadata>,
    pub foreign_keys: Vec<ForeignKey>,
    pub centrality: CentralityMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl TableMetadata {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_rows(mut self, row_count: u64) -> Self {
        self.row_count = row_count;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_column(mut self, name: &str, column: ColumnMetadata) -> Self {
        self.columns.insert(name.to_string(), column);
        self
    }

    pub fn with_foreign_key(mut self, column: &str, references_table: &str, references_column: &str) -> Self {
        self.foreign_keys.push(ForeignKey {
            column: column.to_string(),
            references_table: references_table.to_string(),
            references_column: references_column.to_string(),
        });
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.get(name)
    }

    pub fn has_embeddings(&self) -> bool {
        self.embedding.is_some() || self.columns.values().any(|c| c.embedding.is_some())
    }
}

/// Curated synonyms keyed by (table, column).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymDictionary {
    entries: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl SynonymDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a synonym. Stored lower-cased and de-duplicated.
    pub fn insert(&mut self, table: &str, column: &str, synonym: &str) {
        let synonym = synonym.trim().to_lowercase();
        if synonym.is_empty() {
            return;
        }
        let list = self
            .entries
            .entry(table.to_string())
            .or_default()
            .entry(column.to_string())
            .or_default();
        if !list.contains(&synonym) {
            list.push(synonym);
        }
    }

    pub fn get(&self, table: &str, column: &str) -> &[String] {
        self.entries
            .get(table)
            .and_then(|cols| cols.get(column))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate `(table, column, synonyms)` in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[String])> {
        self.entries.iter().flat_map(|(table, cols)| {
            cols.iter()
                .map(move |(col, syns)| (table.as_str(), col.as_str(), syns.as_slice()))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(|cols| cols.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_type_tags_are_case_insensitive() {
        assert_eq!(SemanticType::from_tag("TEMPORAL"), SemanticType::Temporal);
        assert_eq!(SemanticType::from_tag("temporal"), SemanticType::Temporal);
        assert_eq!(SemanticType::from_tag(" Categorical "), SemanticType::Categorical);
        assert_eq!(SemanticType::from_tag("geo"), SemanticType::Unknown);
    }

    #[test]
    fn semantic_type_deserializes_any_case() {
        let col: ColumnMetadata =
            serde_json::from_str(r#"{"native_type":"DATE","semantic_type":"TEMPORAL"}"#).unwrap();
        assert_eq!(col.semantic_type, SemanticType::Temporal);

        let col: ColumnMetadata =
            serde_json::from_str(r#"{"semantic_type":"numerical"}"#).unwrap();
        assert_eq!(col.semantic_type, SemanticType::Numerical);
    }

    #[test]
    fn semantic_type_serializes_lowercase() {
        let json = serde_json::to_string(&SemanticType::Categorical).unwrap();
        assert_eq!(json, "\"categorical\"");
    }

    #[test]
    fn table_columns_keep_insertion_order() {
        let t = TableMetadata::new("students_info")
            .with_column("Student ID", ColumnMetadata::new("INTEGER", SemanticType::Identifier))
            .with_column("Name", ColumnMetadata::new("TEXT", SemanticType::Text))
            .with_column("Batch", ColumnMetadata::new("TEXT", SemanticType::Categorical));
        let names: Vec<&str> = t.columns.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Student ID", "Name", "Batch"]);
    }

    #[test]
    fn table_deserializes_with_missing_fields() {
        let t: TableMetadata = serde_json::from_str(
            r#"{"name":"courses","columns":{"Course ID":{"semantic_type":"IDENTIFIER"}}}"#,
        )
        .unwrap();
        assert_eq!(t.name, "courses");
        assert_eq!(t.row_count, 0);
        assert_eq!(
            t.column("Course ID").map(|c| c.semantic_type),
            Some(SemanticType::Identifier)
        );
        assert!(t.foreign_keys.is_empty());
        assert!(!t.has_embeddings());
    }

    #[test]
    fn synonym_dictionary_normalizes() {
        let mut d = SynonymDictionary::new();
        d.insert("students_info", "Student ID", "Learner");
        d.insert("students_info", "Student ID", "learner ");
        d.insert("students_info", "Student ID", "pupil");
        d.insert("courses", "Title", "  ");

        assert_eq!(d.get("students_info", "Student ID"), ["learner", "pupil"]);
        assert!(d.get("courses", "Title").is_empty());
        assert_eq!(d.len(), 1);
        assert_eq!(d.iter().count(), 1);
    }
}
