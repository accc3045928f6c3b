//! Settings for the 3D converter.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::features::Similarity;
use crate::sdf::FileFormat;

/// H, He, O, C, Ne, Fe, N, Si, Mg, S: the most abundant elements in the
/// galaxy.
pub const DEFAULT_REFERENCE_ELEMENTS: [u8; 10] = [1, 2, 8, 6, 10, 26, 7, 14, 12, 16];

pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Node feature encoding for 3D graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureMethod {
    /// Similarities to the k nearest atoms of each reference element.
    #[default]
    Metric,
    /// Fraction of atoms within each of 20 radii.
    Topological,
}

/// Configuration for [`Molecule3DToGraph`](crate::convert::Molecule3DToGraph).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Graph3DConfig {
    pub file_format: FileFormat,
    /// Yield one graph per conformer; otherwise merge everything into one.
    pub split_components: bool,
    /// Conformers per molecule, 0 to use the input geometry.
    pub n_conf: usize,
    pub method: FeatureMethod,
    /// Atomic numbers whose nearest atoms are measured, in output order.
    pub atom_types: Vec<u8>,
    pub similarity: Similarity,
    /// Neighbours per reference element.
    pub k: usize,
    /// Distances above this count as absent. Zero disables the cut.
    pub threshold: f64,
    /// Entries kept in the SMILES embedding cache.
    pub cache_capacity: usize,
    /// Path to the `obabel` executable.
    pub obabel: PathBuf,
}

impl Default for Graph3DConfig {
    fn default() -> Self {
        Graph3DConfig {
            file_format: FileFormat::Sdf,
            split_components: true,
            n_conf: 0,
            method: FeatureMethod::Metric,
            atom_types: DEFAULT_REFERENCE_ELEMENTS.to_vec(),
            similarity: Similarity::Inverse,
            k: 3,
            threshold: 0.0,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            obabel: PathBuf::from("obabel"),
        }
    }
}

impl Graph3DConfig {
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Length of a node feature vector under these settings.
    pub fn feature_len(&self) -> usize {
        match self.method {
            FeatureMethod::Metric => self.atom_types.len() * self.k,
            FeatureMethod::Topological => crate::features::DENSITY_STEPS,
        }
    }
}
