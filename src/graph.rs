//! Attributed molecular graphs, the output of the converters.
//!
//! Nodes are atoms keyed by zero-based index, edges are bonds labelled with
//! their order. Graphs serialize with serde so downstream pipelines can
//! consume them as JSON.

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::atom_type::atom_type;
use crate::mol::Mol;
use crate::traits::{HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

/// Node label: an atom type string in 2D graphs, a numeric feature vector
/// in 3D graphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeLabel {
    Discrete(String),
    Vector(Vec<f64>),
}

impl NodeLabel {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NodeLabel::Discrete(s) => Some(s),
            NodeLabel::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            NodeLabel::Discrete(_) => None,
            NodeLabel::Vector(v) => Some(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Index of the node in its graph. Kept in step by `add_node` and
    /// `disjoint_union`.
    #[serde(rename = "ID", default)]
    pub id: usize,
    pub label: NodeLabel,
    /// Atomic number as a decimal string. Required for writing molfiles.
    pub discrete_label: Option<String>,
    pub atom_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Bond order, `"1"`, `"2"` or `"3"`.
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MolGraph {
    pub graph: UnGraph<NodeData, EdgeData>,
    /// Source text the graph came from: a SMILES line or a molfile title.
    pub info: Option<String>,
}

impl MolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 2D graph: each node labelled with its atom type.
    pub fn from_mol<A, B>(mol: &Mol<A, B>) -> Self
    where
        A: HasAtomicNum + HasFormalCharge + HasHydrogenCount + HasAromaticity,
        B: HasBondOrder,
    {
        Self::from_mol_with(mol, |idx| NodeLabel::Discrete(atom_type(mol, idx)))
    }

    /// Graph over `mol` with node labels supplied by `label`.
    ///
    /// `discrete_label` and `atom_type` are always filled in.
    pub fn from_mol_with<A, B>(
        mol: &Mol<A, B>,
        mut label: impl FnMut(NodeIndex) -> NodeLabel,
    ) -> Self
    where
        A: HasAtomicNum + HasFormalCharge + HasHydrogenCount + HasAromaticity,
        B: HasBondOrder,
    {
        let mut graph = UnGraph::with_capacity(mol.atom_count(), mol.bond_count());
        for idx in mol.atoms() {
            graph.add_node(NodeData {
                id: idx.index(),
                label: label(idx),
                discrete_label: Some(mol.atom(idx).atomic_num().to_string()),
                atom_type: Some(atom_type(mol, idx)),
            });
        }
        for edge in mol.graph().edge_references() {
            graph.add_edge(
                edge.source(),
                edge.target(),
                EdgeData {
                    label: edge.weight().bond_order().as_u8().to_string(),
                },
            );
        }
        MolGraph { graph, info: None }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Add a node; its `id` is set to the new index.
    pub fn add_node(&mut self, mut data: NodeData) -> NodeIndex {
        data.id = self.graph.node_count();
        self.graph.add_node(data)
    }

    pub fn add_edge(&mut self, a: NodeIndex, b: NodeIndex, label: impl Into<String>) -> EdgeIndex {
        self.graph.add_edge(a, b, EdgeData { label: label.into() })
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&NodeData> {
        self.graph.node_weight(idx)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &NodeData)> + '_ {
        self.graph
            .node_indices()
            .map(move |idx| (idx, &self.graph[idx]))
    }

    /// Edges as `(source, target, label)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &str)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight().label.as_str()))
    }

    pub fn edge_label(&self, a: NodeIndex, b: NodeIndex) -> Option<&str> {
        self.graph
            .find_edge(a, b)
            .map(|e| self.graph[e].label.as_str())
    }

    /// Append `other`, shifting its node indices past the current ones.
    ///
    /// The merged graph keeps `other`'s info when it has one.
    pub fn disjoint_union(&mut self, other: MolGraph) {
        let offset = self.graph.node_count();
        let (nodes, edges) = other.graph.into_nodes_edges();
        for node in nodes {
            self.add_node(node.weight);
        }
        for edge in edges {
            self.graph.add_edge(
                NodeIndex::new(edge.source().index() + offset),
                NodeIndex::new(edge.target().index() + offset),
                edge.weight,
            );
        }
        if other.info.is_some() {
            self.info = other.info;
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
