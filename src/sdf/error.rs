use thiserror::Error;

use crate::kekulize::KekulizeError;

/// Errors from reading or writing molfile (V2000) blocks.
#[derive(Error, Debug)]
pub enum SdfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error with location information
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// Line number within the record (1-based)
        line: usize,
        message: String,
    },

    /// Unsupported feature in the file format
    #[error("unsupported feature: {0}")]
    Unsupported(String),

    /// Atom symbol not in the periodic table
    #[error("unknown element symbol '{symbol}' at line {line}")]
    UnknownElement { line: usize, symbol: String },

    /// Aromatic bonds that admit no Kekulé structure
    #[error(transparent)]
    Kekulize(#[from] KekulizeError),

    /// Graph node without a `discrete_label`
    #[error("node {node} has no discrete_label")]
    MissingLabel { node: usize },

    /// `discrete_label` that is not an atomic number in 1..=118
    #[error("node {node} has discrete_label '{label}', not an atomic number")]
    UnknownAtomicNumber { node: usize, label: String },

    /// Edge label that does not fit the three-digit bond type column
    #[error("edge {edge} has label '{label}', not a bond type")]
    InvalidBondLabel { edge: usize, label: String },
}

impl SdfError {
    /// Create a parse error at a specific line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        SdfError::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn unsupported(feature: impl Into<String>) -> Self {
        SdfError::Unsupported(feature.into())
    }
}
