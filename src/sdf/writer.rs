//! Graph to molfile (V2000) writer.
//!
//! Output is a bare connection table: zero coordinates, element symbols from
//! each node's `discrete_label`, bond orders from edge labels.

use std::io::Write;

use crate::element::symbol_for;
use crate::graph::MolGraph;
use crate::sdf::error::SdfError;

pub const HEADER: &str = "crabgraph graph to molfile";

/// Element symbol for every node, in index order.
fn node_symbols(graph: &MolGraph) -> Result<Vec<&'static str>, SdfError> {
    graph
        .nodes()
        .map(|(idx, data)| {
            let node = idx.index();
            let label = data
                .discrete_label
                .as_deref()
                .ok_or(SdfError::MissingLabel { node })?;
            label
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(symbol_for)
                .ok_or_else(|| SdfError::UnknownAtomicNumber {
                    node,
                    label: label.to_string(),
                })
        })
        .collect()
}

/// Bond lines as `(a, b, type)`, 1-based, checking that each edge label is
/// one to three digits.
fn bond_rows(graph: &MolGraph) -> Result<Vec<(usize, usize, &str)>, SdfError> {
    graph
        .edges()
        .enumerate()
        .map(|(edge, (a, b, label))| {
            let fits = (1..=3).contains(&label.len()) && label.bytes().all(|c| c.is_ascii_digit());
            if !fits {
                return Err(SdfError::InvalidBondLabel {
                    edge,
                    label: label.to_string(),
                });
            }
            Ok((a.index() + 1, b.index() + 1, label))
        })
        .collect()
}

/// Write one record, `$$$$` included.
///
/// Nothing is written if any node lacks a usable `discrete_label` or any
/// edge label is not a bond type.
pub fn write_molfile_to<W: Write>(writer: &mut W, graph: &MolGraph) -> Result<(), SdfError> {
    let symbols = node_symbols(graph)?;
    let bonds = bond_rows(graph)?;
    let n_atoms = graph.node_count();
    let n_bonds = graph.edge_count();
    if n_atoms > 999 || n_bonds > 999 {
        return Err(SdfError::unsupported(
            "more than 999 atoms or bonds in a V2000 molfile",
        ));
    }

    writeln!(writer, "{HEADER}")?;
    writeln!(writer)?;
    writeln!(writer)?;
    writeln!(
        writer,
        "{n_atoms:>3}{n_bonds:>3}  0     1  0  0  0  0  0999 V2000"
    )?;
    for symbol in symbols {
        writeln!(
            writer,
            "    0.0000    0.0000    0.0000 {symbol:<3} 0  0  0  0  0  0  0  0  0  0  0  0"
        )?;
    }
    for (a, b, label) in bonds {
        writeln!(writer, "{a:>3}{b:>3}{label:>3}  0  0  0  0")?;
    }
    writeln!(writer, "M  END")?;
    writeln!(writer, "$$$$")?;
    Ok(())
}

/// Molfile text for `graph`.
pub fn write_molfile(graph: &MolGraph) -> Result<String, SdfError> {
    let mut buf = Vec::new();
    write_molfile_to(&mut buf, graph)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeData, NodeLabel};
    use crate::sdf::parser::parse_molfile;
    use petgraph::graph::NodeIndex;
    use crate::smiles::from_smiles;

    fn node(discrete: Option<&str>) -> NodeData {
        NodeData {
            id: 0,
            label: NodeLabel::Discrete("X".into()),
            discrete_label: discrete.map(str::to_string),
            atom_type: None,
        }
    }

    #[test]
    fn exact_layout() {
        let graph = MolGraph::from_mol(&from_smiles("CO").unwrap());
        let text = write_molfile(&graph).unwrap();
        let expected = "\
crabgraph graph to molfile


  2  1  0     1  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    0.0000    0.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
M  END
$$$$
";
        assert_eq!(text, expected);
    }

    #[test]
    fn output_parses_back() {
        let graph = MolGraph::from_mol(&from_smiles("CC(=O)Cl").unwrap());
        let text = write_molfile(&graph).unwrap();
        let molfile = parse_molfile(&text).unwrap();
        assert_eq!(molfile.title, HEADER);
        assert_eq!(molfile.mol.atom_count(), graph.node_count());
        assert_eq!(molfile.mol.bond_count(), graph.edge_count());
    }

    #[test]
    fn heavy_element_symbols() {
        let mut graph = MolGraph::new();
        graph.add_node(node(Some("26")));
        graph.add_node(node(Some("112")));
        let text = write_molfile(&graph).unwrap();
        assert!(text.contains(" Fe  0"));
        assert!(text.contains(" Cn  0"));
    }

    #[test]
    fn missing_discrete_label() {
        let mut graph = MolGraph::new();
        graph.add_node(node(Some("6")));
        graph.add_node(node(None));
        assert!(matches!(
            write_molfile(&graph),
            Err(SdfError::MissingLabel { node: 1 })
        ));
    }

    #[test]
    fn atomic_number_out_of_table() {
        for bad in ["0", "119", "carbon"] {
            let mut graph = MolGraph::new();
            graph.add_node(node(Some(bad)));
            let mut buf = Vec::new();
            let err = write_molfile_to(&mut buf, &graph).unwrap_err();
            assert!(matches!(err, SdfError::UnknownAtomicNumber { node: 0, .. }));
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn bond_labels_must_be_bond_types() {
        for bad in ["aromatic", "1.5", "", "1000"] {
            let mut graph = MolGraph::from_mol(&from_smiles("CCO").unwrap());
            graph.add_edge(NodeIndex::new(0), NodeIndex::new(2), bad);
            let mut buf = Vec::new();
            match write_molfile_to(&mut buf, &graph) {
                Err(SdfError::InvalidBondLabel { edge: 2, label }) => assert_eq!(label, bad),
                other => panic!("expected invalid bond label for {bad:?}, got {other:?}"),
            }
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn empty_graph() {
        let text = write_molfile(&MolGraph::new()).unwrap();
        assert!(text.contains("  0  0  0     1"));
        assert!(text.ends_with("M  END\n$$$$\n"));
    }
}
