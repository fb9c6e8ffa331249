use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableScoutError};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str) -> Option<T> {
    profiled_env_opt(profile, key).and_then(|v| v.parse().ok())
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    /// TOML file the scoring section was read from, if any.
    pub scoring_config_path: Option<PathBuf>,
    pub scoring: ScoringConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TABLESCOUT_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self> {
        let profile = env_or("TABLESCOUT_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    ///
    /// Precedence: built-in defaults, then the TOML file named by
    /// `SCORING_CONFIG_PATH`, then individual env overrides.
    pub fn for_profile(profile: &str) -> Result<Self> {
        let p = profile.to_uppercase();
        let p = p.as_str();

        let scoring_config_path = profiled_env_opt(p, "SCORING_CONFIG_PATH").map(PathBuf::from);
        let mut scoring = match &scoring_config_path {
            Some(path) => ScoringConfig::from_toml_file(path)?,
            None => ScoringConfig::default(),
        };

        if let Some(v) = profiled_env_parse(p, "ABSOLUTE_THRESHOLD") {
            scoring.filter.absolute_threshold = v;
        }
        if let Some(v) = profiled_env_parse(p, "MAX_CANDIDATES") {
            scoring.filter.max_candidates = v;
        }
        if let Some(v) = profiled_env_parse(p, "SEMANTIC_TOP_N") {
            scoring.semantic.top_n = v;
        }
        if let Some(v) = profiled_env_parse(p, "EMBEDDING_CACHE_CAPACITY") {
            scoring.semantic.query_cache_capacity = v;
        }

        scoring.validate()?;

        Ok(Self {
            profile: p.to_string(),
            scoring_config_path,
            scoring,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        let s = &self.scoring;
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  file:        {}",
            self.scoring_config_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(defaults)".to_string())
        );
        tracing::info!(
            "  filter:      absolute={}, relative={}, max={}",
            s.filter.absolute_threshold, s.filter.relative_threshold, s.filter.max_candidates
        );
        tracing::info!(
            "  semantic:    top_n={}, table>{}, column>{}",
            s.semantic.top_n, s.semantic.table_similarity_threshold, s.semantic.column_similarity_threshold
        );
        tracing::info!(
            "  centrality:  generic_max={}, mixed_cap={}",
            s.centrality.generic_boost_max, s.centrality.mixed_boost_cap
        );
    }
}

// ── Scoring ───────────────────────────────────────────────────

/// Every weight, cap and threshold the scoring pipeline consults.
///
/// Passed explicitly into the pipeline; defaults are tuned against a small
/// education schema and are expected to be recalibrated per deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: SignalWeights,
    #[serde(default)]
    pub caps: SignalCaps,
    #[serde(default)]
    pub terms: TermConfig,
    #[serde(default)]
    pub semantic: SemanticConfig,
    #[serde(default)]
    pub centrality: CentralityConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub fk: FkConfig,
    #[serde(default)]
    pub confidence: ConfidenceConfig,
}

impl ScoringConfig {
    /// Parse a (possibly partial) TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: ScoringConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Reject values the pipeline cannot operate on.
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        let weights = [
            ("table_name", w.table_name),
            ("synonym", w.synonym),
            ("column_name", w.column_name),
            ("semantic_type", w.semantic_type),
            ("hint", w.hint),
            ("sample_value", w.sample_value),
            ("top_value", w.top_value),
            ("semantic_similarity", w.semantic_similarity),
            ("fk_relationship", w.fk_relationship),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(TableScoutError::Config(format!(
                    "weight '{}' must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let unit = [
            ("semantic.table_similarity_threshold", self.semantic.table_similarity_threshold),
            ("semantic.column_similarity_threshold", self.semantic.column_similarity_threshold),
            ("semantic.column_weight_factor", self.semantic.column_weight_factor),
            ("semantic.mismatch_similarity_threshold", self.semantic.mismatch_similarity_threshold),
            ("centrality.hub_threshold", self.centrality.hub_threshold),
            ("filter.relative_threshold", self.filter.relative_threshold),
            ("confidence.high_coverage", self.confidence.high_coverage),
            ("confidence.medium_coverage", self.confidence.medium_coverage),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(TableScoutError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.filter.max_candidates == 0 {
            return Err(TableScoutError::Config(
                "filter.max_candidates must be at least 1".to_string(),
            ));
        }
        if self.fk.anchor_count == 0 {
            return Err(TableScoutError::Config(
                "fk.anchor_count must be at least 1".to_string(),
            ));
        }
        if self.semantic.query_cache_capacity == 0 {
            return Err(TableScoutError::Config(
                "semantic.query_cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Points awarded per accepted occurrence of each signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    #[serde(default = "default_table_name_weight")]
    pub table_name: f64,
    #[serde(default = "default_synonym_weight")]
    pub synonym: f64,
    #[serde(default = "default_column_name_weight")]
    pub column_name: f64,
    #[serde(default = "default_semantic_type_weight")]
    pub semantic_type: f64,
    #[serde(default = "default_hint_weight")]
    pub hint: f64,
    #[serde(default = "default_sample_value_weight")]
    pub sample_value: f64,
    #[serde(default = "default_top_value_weight")]
    pub top_value: f64,
    /// Multiplied by the similarity itself, so the real contribution is lower.
    #[serde(default = "default_semantic_similarity_weight")]
    pub semantic_similarity: f64,
    #[serde(default = "default_fk_weight")]
    pub fk_relationship: f64,
}

fn default_table_name_weight() -> f64 { 10.0 }
fn default_synonym_weight() -> f64 { 7.0 }
fn default_column_name_weight() -> f64 { 5.0 }
fn default_semantic_type_weight() -> f64 { 3.0 }
fn default_hint_weight() -> f64 { 3.0 }
fn default_sample_value_weight() -> f64 { 2.0 }
fn default_top_value_weight() -> f64 { 2.0 }
fn default_semantic_similarity_weight() -> f64 { 8.0 }
fn default_fk_weight() -> f64 { 4.0 }

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            table_name: default_table_name_weight(),
            synonym: default_synonym_weight(),
            column_name: default_column_name_weight(),
            semantic_type: default_semantic_type_weight(),
            hint: default_hint_weight(),
            sample_value: default_sample_value_weight(),
            top_value: default_top_value_weight(),
            semantic_similarity: default_semantic_similarity_weight(),
            fk_relationship: default_fk_weight(),
        }
    }
}

/// Maximum accepted occurrences per table. Signals without a field here are uncapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCaps {
    #[serde(default = "default_synonym_cap")]
    pub synonym: u32,
    #[serde(default = "default_column_name_cap")]
    pub column_name: u32,
    /// Applied separately to each semantic-type tag.
    #[serde(default = "default_per_variant_cap")]
    pub semantic_type_per_tag: u32,
    /// Applied separately to each hinted operation.
    #[serde(default = "default_per_variant_cap")]
    pub hint_per_operation: u32,
    /// Table-level similarity plus the best-matching columns.
    #[serde(default = "default_semantic_similarity_cap")]
    pub semantic_similarity: u32,
}

fn default_synonym_cap() -> u32 { 2 }
fn default_column_name_cap() -> u32 { 3 }
fn default_per_variant_cap() -> u32 { 1 }
fn default_semantic_similarity_cap() -> u32 { 3 }

impl Default for SignalCaps {
    fn default() -> Self {
        Self {
            synonym: default_synonym_cap(),
            column_name: default_column_name_cap(),
            semantic_type_per_tag: default_per_variant_cap(),
            hint_per_operation: default_per_variant_cap(),
            semantic_similarity: default_semantic_similarity_cap(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermConfig {
    /// Query terms shorter than this are discarded.
    #[serde(default = "default_min_term_length")]
    pub min_term_length: usize,
    /// Shortest query term allowed to prefix-match an identifier token.
    #[serde(default = "default_min_prefix_length")]
    pub min_prefix_length: usize,
}

fn default_min_term_length() -> usize { 2 }
fn default_min_prefix_length() -> usize { 3 }

impl Default for TermConfig {
    fn default() -> Self {
        Self {
            min_term_length: default_min_term_length(),
            min_prefix_length: default_min_prefix_length(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemanticConfig {
    /// Number of symbolic leaders that get vector comparisons.
    #[serde(default = "default_semantic_top_n")]
    pub top_n: usize,
    #[serde(default = "default_table_similarity_threshold")]
    pub table_similarity_threshold: f64,
    #[serde(default = "default_column_similarity_threshold")]
    pub column_similarity_threshold: f64,
    #[serde(default = "default_column_weight_factor")]
    pub column_weight_factor: f64,
    /// Below this best table similarity the query is considered out of domain.
    #[serde(default = "default_mismatch_similarity_threshold")]
    pub mismatch_similarity_threshold: f64,
    #[serde(default = "default_mismatch_top_k")]
    pub mismatch_top_k: usize,
    #[serde(default = "default_query_cache_capacity")]
    pub query_cache_capacity: usize,
}

fn default_semantic_top_n() -> usize { 20 }
fn default_table_similarity_threshold() -> f64 { 0.7 }
fn default_column_similarity_threshold() -> f64 { 0.6 }
fn default_column_weight_factor() -> f64 { 0.8 }
fn default_mismatch_similarity_threshold() -> f64 { 0.3 }
fn default_mismatch_top_k() -> usize { 5 }
fn default_query_cache_capacity() -> usize { 256 }

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            top_n: default_semantic_top_n(),
            table_similarity_threshold: default_table_similarity_threshold(),
            column_similarity_threshold: default_column_similarity_threshold(),
            column_weight_factor: default_column_weight_factor(),
            mismatch_similarity_threshold: default_mismatch_similarity_threshold(),
            mismatch_top_k: default_mismatch_top_k(),
            query_cache_capacity: default_query_cache_capacity(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentralityConfig {
    #[serde(default = "default_incoming_weight")]
    pub incoming_weight: f64,
    #[serde(default = "default_outgoing_weight")]
    pub outgoing_weight: f64,
    /// Normalized centrality at or above which a table is flagged as a hub.
    #[serde(default = "default_hub_threshold")]
    pub hub_threshold: f64,
    /// Points for a table of centrality 1.0 on a generic query.
    #[serde(default = "default_generic_boost_max")]
    pub generic_boost_max: f64,
    /// Points for a table of centrality 1.0 on a specific or mixed query.
    #[serde(default = "default_mixed_boost_cap")]
    pub mixed_boost_cap: f64,
    /// Best base score under which an entity-free query counts as generic.
    #[serde(default = "default_generic_query_threshold")]
    pub generic_query_threshold: f64,
}

fn default_incoming_weight() -> f64 { 1.0 }
fn default_outgoing_weight() -> f64 { 0.5 }
fn default_hub_threshold() -> f64 { 0.8 }
fn default_generic_boost_max() -> f64 { 10.0 }
fn default_mixed_boost_cap() -> f64 { 5.0 }
fn default_generic_query_threshold() -> f64 { 5.0 }

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            incoming_weight: default_incoming_weight(),
            outgoing_weight: default_outgoing_weight(),
            hub_threshold: default_hub_threshold(),
            generic_boost_max: default_generic_boost_max(),
            mixed_boost_cap: default_mixed_boost_cap(),
            generic_query_threshold: default_generic_query_threshold(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_absolute_threshold")]
    pub absolute_threshold: f64,
    /// Fraction of the top score used when the absolute pass keeps too many.
    #[serde(default = "default_relative_threshold")]
    pub relative_threshold: f64,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    #[serde(default = "default_min_fallback")]
    pub min_fallback: usize,
    /// Fewer survivors than this triggers the top-K fallback.
    #[serde(default = "default_min_candidates")]
    pub min_candidates: usize,
}

fn default_absolute_threshold() -> f64 { 5.0 }
fn default_relative_threshold() -> f64 { 0.3 }
fn default_max_candidates() -> usize { 8 }
fn default_min_fallback() -> usize { 5 }
fn default_min_candidates() -> usize { 2 }

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            absolute_threshold: default_absolute_threshold(),
            relative_threshold: default_relative_threshold(),
            max_candidates: default_max_candidates(),
            min_fallback: default_min_fallback(),
            min_candidates: default_min_candidates(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FkConfig {
    /// How many leading candidates act as join anchors.
    #[serde(default = "default_anchor_count")]
    pub anchor_count: usize,
    /// Anchors a non-candidate must touch before it is pulled into the list.
    #[serde(default = "default_rescue_min_anchors")]
    pub rescue_min_anchors: usize,
}

fn default_anchor_count() -> usize { 3 }
fn default_rescue_min_anchors() -> usize { 2 }

impl Default for FkConfig {
    fn default() -> Self {
        Self {
            anchor_count: default_anchor_count(),
            rescue_min_anchors: default_rescue_min_anchors(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    /// Base score a candidate needs to count as a core table.
    #[serde(default = "default_core_table_threshold")]
    pub core_table_threshold: f64,
    #[serde(default = "default_high_coverage")]
    pub high_coverage: f64,
    #[serde(default = "default_medium_coverage")]
    pub medium_coverage: f64,
}

fn default_core_table_threshold() -> f64 { 10.0 }
fn default_high_coverage() -> f64 { 0.8 }
fn default_medium_coverage() -> f64 { 0.5 }

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            core_table_threshold: default_core_table_threshold(),
            high_coverage: default_high_coverage(),
            medium_coverage: default_medium_coverage(),
        }
    }
}
