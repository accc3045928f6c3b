//! Molecule files to attributed graphs, and back.
//!
//! SDF and SMILES records are parsed into petgraph-backed molecules, stripped
//! of explicit hydrogens and turned into [`MolGraph`]s whose nodes carry atom
//! types (2D) or geometric feature vectors (3D). Graphs can be written back
//! as V2000 molfiles. 3D coordinates for SMILES input and conformer
//! ensembles come from an external [`Toolkit`], by default `obabel`.
//!
//! ```
//! use crabgraph::{FileFormat, MoleculeToGraph};
//! use crabgraph::sdf::records_from_str;
//!
//! let converter = MoleculeToGraph::new(FileFormat::Smi);
//! let graphs: Vec<_> = converter
//!     .graphs(records_from_str("CC(=O)O acetic acid\n", FileFormat::Smi))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(graphs[0].node_count(), 4);
//! ```

pub mod atom;
pub mod atom_type;
pub mod bond;
pub mod cache;
pub mod config;
pub mod convert;
pub mod element;
pub mod error;
pub mod features;
pub mod graph;
pub mod hydrogen;
pub mod kekulize;
pub mod mol;
pub mod sdf;
pub mod smiles;
pub mod toolkit;
pub mod traits;
pub mod valence;
pub mod wrappers;

pub use atom::Atom;
pub use atom_type::{atom_type, atom_types};
pub use bond::{Bond, BondOrder, SmilesBond, SmilesBondOrder};
pub use cache::EmbeddingCache;
pub use config::{FeatureMethod, Graph3DConfig};
pub use convert::{GraphToMolecule, Molecule3DToGraph, MoleculeToGraph, UntilError, UntilErrorExt};
pub use element::Element;
pub use error::{ConvertError, Result};
pub use features::Similarity;
pub use graph::{EdgeData, MolGraph, NodeData, NodeLabel};
pub use hydrogen::remove_hs;
pub use kekulize::{kekulize, KekulizeError};
pub use mol::Mol;
pub use sdf::{parse_molfile, write_molfile, FileFormat, Molfile, SdfError};
pub use smiles::{from_smiles, parse_smiles, SmilesError};
pub use toolkit::{Obabel, Toolkit, ToolkitError};
pub use traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount,
    HasHydrogenCountMut, HasIsotope, HasPosition3D,
};
pub use wrappers::WithPosition3D;
