//! Errors surfaced by the converters.

use thiserror::Error;

use crate::sdf::SdfError;
use crate::smiles::SmilesError;
use crate::toolkit::ToolkitError;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("unrecognized file format: {0}")]
    UnknownFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Smiles(#[from] SmilesError),

    #[error(transparent)]
    Sdf(#[from] SdfError),

    #[error(transparent)]
    Toolkit(#[from] ToolkitError),

    /// A failure tied to one input record (0-based).
    #[error("record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    pub fn in_record(self, index: usize) -> Self {
        match self {
            ConvertError::Record { .. } => self,
            other => ConvertError::Record {
                index,
                source: Box::new(other),
            },
        }
    }

    /// Record index, when the error is tied to one.
    pub fn record(&self) -> Option<usize> {
        match self {
            ConvertError::Record { index, .. } => Some(*index),
            _ => None,
        }
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
