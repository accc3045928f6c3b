//! Converters between molecule files and graphs.
//!
//! Every converter has two faces. `results` yields one `Result` per graph
//! so callers can see which record failed. `transform` yields plain graphs
//! and stops at the first failure, logging it at debug level.

mod to_graph;
mod to_graph_3d;
mod to_molecule;

pub use to_graph::MoleculeToGraph;
pub use to_graph_3d::{graph_3d, Molecule3DToGraph};
pub use to_molecule::GraphToMolecule;

use std::error::Error as _;
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::sdf::{read_records, FileFormat};

/// Iterator adapter that ends at the first `Err`, logging it.
pub struct UntilError<I> {
    inner: I,
    done: bool,
}

impl<I> UntilError<I> {
    pub fn new(inner: I) -> Self {
        UntilError { inner, done: false }
    }
}

impl<I, T> Iterator for UntilError<I>
where
    I: Iterator<Item = Result<T>>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        match self.inner.next() {
            Some(Ok(item)) => Some(item),
            Some(Err(e)) => {
                self.done = true;
                log::debug!("Failed iteration. Reason: {e}");
                let mut source = e.source();
                while let Some(cause) = source {
                    log::debug!("  caused by: {cause}");
                    source = cause.source();
                }
                None
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

pub trait UntilErrorExt: Iterator + Sized {
    fn until_error(self) -> UntilError<Self> {
        UntilError::new(self)
    }
}

impl<I: Iterator> UntilErrorExt for I {}

/// Records of the file at `path`. A file that cannot be opened shows up as
/// a single leading error.
pub(crate) fn file_records(
    path: &Path,
    format: FileFormat,
) -> impl Iterator<Item = std::io::Result<String>> {
    let (reader, open_error) = match read_records(path, format) {
        Ok(reader) => (Some(reader), None),
        Err(e) => (None, Some(e)),
    };
    open_error
        .map(Err)
        .into_iter()
        .chain(reader.into_iter().flatten())
}

/// Attach record indices to errors and drop records that produced nothing.
pub(crate) fn per_record<I, C, F>(
    records: I,
    mut convert: F,
) -> impl Iterator<Item = Result<C::Item>>
where
    I: IntoIterator<Item = std::io::Result<String>>,
    C: IntoIterator,
    F: FnMut(&str) -> Result<C>,
{
    records
        .into_iter()
        .enumerate()
        .flat_map(move |(index, record)| {
            let converted = record
                .map_err(ConvertError::from)
                .and_then(|text| convert(&text))
                .map_err(|e| e.in_record(index));
            match converted {
                Ok(items) => items.into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(e)],
            }
        })
}
