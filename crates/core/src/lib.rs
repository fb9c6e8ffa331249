pub mod config;
pub mod error;
pub mod schema;

pub use config::{
    CentralityConfig, ConfidenceConfig, Config, FilterConfig, FkConfig, ScoringConfig,
    SemanticConfig, SignalCaps, SignalWeights, TermConfig,
};
pub use error::*;
pub use schema::*;
