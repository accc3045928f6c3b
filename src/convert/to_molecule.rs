use crate::error::{ConvertError, Result};
use crate::graph::MolGraph;
use crate::sdf::write_molfile;

use super::{UntilError, UntilErrorExt};

/// Graphs back to molfile records with zero coordinates.
///
/// Nodes need a `discrete_label` holding the atomic number; edge labels are
/// written as bond types.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphToMolecule;

impl GraphToMolecule {
    pub fn new() -> Self {
        GraphToMolecule
    }

    /// One molfile record per graph. Errors carry the graph's index.
    pub fn results<I>(&self, graphs: I) -> impl Iterator<Item = Result<String>>
    where
        I: IntoIterator<Item = MolGraph>,
    {
        graphs.into_iter().enumerate().map(|(index, graph)| {
            write_molfile(&graph).map_err(|e| ConvertError::from(e).in_record(index))
        })
    }

    /// Molfile records, ending at the first graph that cannot be written.
    pub fn transform<I>(&self, graphs: I) -> UntilError<impl Iterator<Item = Result<String>>>
    where
        I: IntoIterator<Item = MolGraph>,
    {
        self.results(graphs).until_error()
    }
}
