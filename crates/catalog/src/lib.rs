//! Candidate catalog: the hand-off from table selection to SQL generation.
//!
//! A [`CandidateCatalog`] joins a finished [`tablescout_scoring::TableSelection`]
//! with the schema metadata of each candidate, at a chosen [`DetailLevel`],
//! and renders it as JSON or as a prompt block.

pub mod catalog;

pub use catalog::{
    join_clause, CandidateCatalog, CatalogColumn, CatalogEntry, DetailLevel, JoinType,
};
