//! Compiler error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Missing selector for {0}")]
    MissingSelector(String),

    #[error("Selector mismatch for {signature}: table has {supplied}, computed {computed}")]
    SelectorMismatch { signature: String, supplied: String, computed: String },

    #[error("Name collision: {0}")]
    NameCollision(String),

    #[error(transparent)]
    Codec(#[from] solbind_runtime::CodecError),

    #[error("Contract {contract}: {source}")]
    Contract {
        contract: String,
        #[source]
        source: Box<CompilerError>,
    },
}

impl CompilerError {
    /// Attaches the `"<source-id>:<contract-name>"` key to an error
    pub fn in_contract(self, contract: impl Into<String>) -> Self {
        Self::Contract { contract: contract.into(), source: Box::new(self) }
    }

    /// The underlying error with any contract context stripped
    pub fn root(&self) -> &CompilerError {
        match self {
            Self::Contract { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompilerError>;
