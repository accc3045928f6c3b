use std::path::Path;

use crate::cache::EmbeddingCache;
use crate::config::{FeatureMethod, Graph3DConfig};
use crate::error::Result;
use crate::features::{distance_matrix, local_density, nearest_neighbor_features};
use crate::graph::{MolGraph, NodeLabel};
use crate::hydrogen::remove_hs;
use crate::mol::Mol;
use crate::sdf::{parse_molfile, FileFormat, Molfile};
use crate::smiles::{first_token, has_unbalanced_brackets};
use crate::toolkit::{Obabel, Toolkit};
use crate::traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasPosition3D,
};

use super::{file_records, per_record, UntilError, UntilErrorExt};

/// Graph whose node labels are geometric feature vectors.
///
/// Atoms without coordinates sit at the origin.
pub fn graph_3d<A, B>(mol: &Mol<A, B>, config: &Graph3DConfig) -> MolGraph
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount + HasAromaticity + HasPosition3D,
    B: HasBondOrder,
{
    let coords: Vec<[f64; 3]> = mol
        .atoms()
        .map(|idx| mol.atom(idx).position_3d().unwrap_or_default())
        .collect();
    let atomic_nums: Vec<u8> = mol.atoms().map(|idx| mol.atom(idx).atomic_num()).collect();
    let distances = distance_matrix(&coords);

    MolGraph::from_mol_with(mol, |idx| {
        let row = &distances[idx.index()];
        NodeLabel::Vector(match config.method {
            FeatureMethod::Metric => nearest_neighbor_features(
                row,
                &atomic_nums,
                &config.atom_types,
                config.k,
                config.threshold,
                &config.similarity,
            ),
            FeatureMethod::Topological => local_density(row),
        })
    })
}

/// Molecules to graphs with 3D node features.
///
/// SMILES input is embedded by the toolkit; with `n_conf > 0` every record
/// is expanded into that many conformers, each becoming its own graph.
pub struct Molecule3DToGraph<T = Obabel> {
    config: Graph3DConfig,
    toolkit: T,
}

impl Molecule3DToGraph<Obabel> {
    pub fn new(config: Graph3DConfig) -> Self {
        let toolkit = Obabel::new(config.obabel.clone());
        Molecule3DToGraph { config, toolkit }
    }
}

impl<T: Toolkit> Molecule3DToGraph<T> {
    pub fn with_toolkit(config: Graph3DConfig, toolkit: T) -> Self {
        Molecule3DToGraph { config, toolkit }
    }

    pub fn config(&self) -> &Graph3DConfig {
        &self.config
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    /// A cache sized by the configuration.
    pub fn new_cache(&self) -> EmbeddingCache {
        EmbeddingCache::new(self.config.cache_capacity)
    }

    fn conformers(&self, sdf: &str) -> Result<Vec<Molfile>> {
        let pieces = self.toolkit.conformers(sdf, self.config.n_conf)?;
        log::debug!("toolkit returned {} conformers", pieces.len());
        pieces
            .iter()
            .map(|piece| parse_molfile(piece).map_err(Into::into))
            .collect()
    }

    fn labelled(&self, molfile: &Molfile, info: &str) -> Option<MolGraph> {
        let mol = remove_hs(&molfile.mol);
        if mol.is_empty() {
            return None;
        }
        let graph = graph_3d(&mol, &self.config);
        log::trace!(
            "3D graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Some(if info.is_empty() {
            graph
        } else {
            graph.with_info(info)
        })
    }

    /// Graphs for one record: one per conformer, or one for the input
    /// geometry when no conformers are requested.
    pub fn record_graphs(&self, text: &str, cache: &mut EmbeddingCache) -> Result<Vec<MolGraph>> {
        let n_conf = self.config.n_conf;
        let (geometries, info) = match self.config.file_format {
            FileFormat::Sdf => {
                let parent = parse_molfile(text)?;
                if n_conf == 0 {
                    let title = parent.title.clone();
                    (vec![parent], title)
                } else if parent.mol.is_empty() {
                    return Ok(Vec::new());
                } else {
                    (self.conformers(text)?, parent.title)
                }
            }
            FileFormat::Smi => {
                let line = text.trim();
                let Some(token) = first_token(line) else {
                    return Ok(Vec::new());
                };
                if has_unbalanced_brackets(line) {
                    log::debug!("skipping SMILES with unbalanced brackets: {line}");
                    return Ok(Vec::new());
                }
                let sdf = cache.get_or_try_insert_with(token, |smi| self.toolkit.embed_smiles(smi))?;
                let geometries = if n_conf == 0 {
                    vec![parse_molfile(&sdf)?]
                } else {
                    self.conformers(&sdf)?
                };
                (geometries, line.to_string())
            }
        };
        Ok(geometries
            .iter()
            .filter_map(|molfile| self.labelled(molfile, &info))
            .collect())
    }

    /// Graphs of `records`, errors tagged with their record index.
    ///
    /// With `split_components` off, everything is merged into a single graph
    /// yielded after the input is exhausted, or the first error instead.
    pub fn graphs<'a, I>(
        &'a self,
        records: I,
        cache: &'a mut EmbeddingCache,
    ) -> Box<dyn Iterator<Item = Result<MolGraph>> + 'a>
    where
        I: IntoIterator<Item = std::io::Result<String>> + 'a,
    {
        let graphs = per_record(records, move |text| self.record_graphs(text, cache));
        if self.config.split_components {
            return Box::new(graphs);
        }
        Box::new(std::iter::once_with(move || {
            let mut merged = MolGraph::new();
            for graph in graphs {
                merged.disjoint_union(graph?);
            }
            log::trace!("merged graph with {} nodes", merged.node_count());
            Ok(merged)
        }))
    }

    pub fn results<'a>(
        &'a self,
        path: impl AsRef<Path>,
        cache: &'a mut EmbeddingCache,
    ) -> Box<dyn Iterator<Item = Result<MolGraph>> + 'a> {
        self.graphs(file_records(path.as_ref(), self.config.file_format), cache)
    }

    /// Graphs of the file at `path`, ending at the first failure.
    pub fn transform<'a>(
        &'a self,
        path: impl AsRef<Path>,
        cache: &'a mut EmbeddingCache,
    ) -> UntilError<Box<dyn Iterator<Item = Result<MolGraph>> + 'a>> {
        self.results(path, cache).until_error()
    }
}
