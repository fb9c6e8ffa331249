use std::fmt;

use serde::{Serialize, Serializer};
use tablescout_core::{SemanticType, SignalCaps, SignalWeights};

/// Semantic-type tags a query operation can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SemanticTag {
    Temporal,
    Numerical,
    Categorical,
}

impl SemanticTag {
    pub const ALL: [SemanticTag; 3] = [Self::Temporal, Self::Numerical, Self::Categorical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temporal => "temporal",
            Self::Numerical => "numerical",
            Self::Categorical => "categorical",
        }
    }

    /// The column type that satisfies this tag.
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            Self::Temporal => SemanticType::Temporal,
            Self::Numerical => SemanticType::Numerical,
            Self::Categorical => SemanticType::Categorical,
        }
    }
}

/// Operations a column can be flagged as suitable for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HintOperation {
    Filtering,
    Grouping,
    Aggregation,
}

impl HintOperation {
    pub const ALL: [HintOperation; 3] = [Self::Filtering, Self::Grouping, Self::Aggregation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filtering => "filtering",
            Self::Grouping => "grouping",
            Self::Aggregation => "aggregation",
        }
    }
}

/// Closed set of score contributions.
///
/// Sub-tagged kinds are capped per tag, so `SemanticType(Temporal)` and
/// `SemanticType(Numerical)` are separate entries in the signal vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SignalKind {
    TableName,
    Synonym,
    ColumnName,
    SemanticType(SemanticTag),
    Hint(HintOperation),
    SampleValue,
    TopValue,
    SemanticSimilarity,
    FkRelationship,
    Centrality,
}

impl SignalKind {
    /// Maximum accepted occurrences per table, `None` when uncapped.
    pub fn cap(&self, caps: &SignalCaps) -> Option<u32> {
        match self {
            Self::Synonym => Some(caps.synonym),
            Self::ColumnName => Some(caps.column_name),
            Self::SemanticType(_) => Some(caps.semantic_type_per_tag),
            Self::Hint(_) => Some(caps.hint_per_operation),
            Self::SemanticSimilarity => Some(caps.semantic_similarity),
            Self::TableName
            | Self::SampleValue
            | Self::TopValue
            | Self::FkRelationship
            | Self::Centrality => None,
        }
    }

    /// Configured points per occurrence. Centrality has no fixed weight; its
    /// points come from the booster.
    pub fn weight(&self, weights: &SignalWeights) -> f64 {
        match self {
            Self::TableName => weights.table_name,
            Self::Synonym => weights.synonym,
            Self::ColumnName => weights.column_name,
            Self::SemanticType(_) => weights.semantic_type,
            Self::Hint(_) => weights.hint,
            Self::SampleValue => weights.sample_value,
            Self::TopValue => weights.top_value,
            Self::SemanticSimilarity => weights.semantic_similarity,
            Self::FkRelationship => weights.fk_relationship,
            Self::Centrality => 0.0,
        }
    }

    /// Contributions that belong to `base_score`, i.e. everything except
    /// structural FK expansion.
    pub fn is_base(&self) -> bool {
        !matches!(self, Self::FkRelationship)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableName => write!(f, "table_name"),
            Self::Synonym => write!(f, "synonym"),
            Self::ColumnName => write!(f, "column_name"),
            Self::SemanticType(tag) => write!(f, "semantic_type:{}", tag.as_str()),
            Self::Hint(op) => write!(f, "hint:{}", op.as_str()),
            Self::SampleValue => write!(f, "sample_value"),
            Self::TopValue => write!(f, "top_value"),
            Self::SemanticSimilarity => write!(f, "semantic_similarity"),
            Self::FkRelationship => write!(f, "fk_relationship"),
            Self::Centrality => write!(f, "centrality"),
        }
    }
}

// Serialized as its display string so it can key a JSON object.
impl Serialize for SignalKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_follow_config() {
        let caps = SignalCaps::default();
        assert_eq!(SignalKind::Synonym.cap(&caps), Some(2));
        assert_eq!(SignalKind::ColumnName.cap(&caps), Some(3));
        assert_eq!(SignalKind::SemanticSimilarity.cap(&caps), Some(3));
        for tag in SemanticTag::ALL {
            assert_eq!(SignalKind::SemanticType(tag).cap(&caps), Some(1));
        }
        for op in HintOperation::ALL {
            assert_eq!(SignalKind::Hint(op).cap(&caps), Some(1));
        }
        for uncapped in [
            SignalKind::TableName,
            SignalKind::SampleValue,
            SignalKind::TopValue,
            SignalKind::FkRelationship,
            SignalKind::Centrality,
        ] {
            assert_eq!(uncapped.cap(&caps), None);
        }
    }

    #[test]
    fn only_fk_is_outside_base() {
        assert!(!SignalKind::FkRelationship.is_base());
        assert!(SignalKind::Centrality.is_base());
        assert!(SignalKind::Hint(HintOperation::Grouping).is_base());
    }

    #[test]
    fn serializes_as_string_key() {
        let kind = SignalKind::SemanticType(SemanticTag::Temporal);
        assert_eq!(kind.to_string(), "semantic_type:temporal");
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"semantic_type:temporal\"");
        assert_eq!(SignalKind::Hint(HintOperation::Aggregation).to_string(), "hint:aggregation");
    }

    #[test]
    fn tag_maps_to_column_type() {
        assert_eq!(SemanticTag::Numerical.semantic_type(), SemanticType::Numerical);
    }
}
