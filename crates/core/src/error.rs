use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableScoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Knowledge base contains no tables")]
    EmptyKnowledgeBase,

    #[error("Duplicate table in knowledge base: {0}")]
    DuplicateTable(String),

    #[error("Table not found: {0}")]
    UnknownTable(String),
}

pub type Result<T> = std::result::Result<T, TableScoutError>;
