//! Kekulization assigns alternating single and double bonds to aromatic
//! systems.
//!
//! Aromatic bonds come either from lowercase SMILES atoms (`c1ccccc1`) or
//! from molfile bond type 4. The output carries only concrete
//! single/double/triple orders, which is what graph edge labels report.
//! Implemented as a maximum matching over the atoms that still lack one
//! valence, grown with augmenting paths.

use std::collections::{HashSet, VecDeque};

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

use crate::bond::{Bond, BondOrder, SmilesBond, SmilesBondOrder};
use crate::element::Element;
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasFormalCharge, HasHydrogenCount};
use crate::valence::{charged_valences, smiles_bond_order_sum};

/// No Kekulé structure exists for the listed atoms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KekulizeError {
    #[error("cannot kekulize aromatic system: unmatched atoms {}", format_atoms(.0))]
    Unkekulizable(Vec<NodeIndex>),
}

fn format_atoms(atoms: &[NodeIndex]) -> String {
    let parts: Vec<String> = atoms.iter().map(|a| a.index().to_string()).collect();
    format!("[{}]", parts.join(", "))
}

/// Replace aromatic bonds with single or double bonds so every aromatic
/// atom short of one valence receives exactly one double bond.
///
/// Atom payloads and bond order are carried over unchanged; only the bond
/// type changes.
pub fn kekulize<A>(mol: Mol<A, SmilesBond>) -> Result<Mol<A, Bond>, KekulizeError>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount + Clone,
{
    let adjacency = aromatic_adjacency(&mol);
    let needs_double: Vec<bool> = mol
        .atoms()
        .map(|idx| !adjacency[idx.index()].is_empty() && lacks_one_valence(&mol, idx))
        .collect();

    let mut matching = Matching::new(mol.atom_count());
    let candidates: Vec<NodeIndex> = mol.atoms().filter(|i| needs_double[i.index()]).collect();
    for &start in &candidates {
        if matching.partner_edge(start).is_none() {
            matching.augment_from(&mol, &adjacency, &needs_double, start);
        }
    }

    let unmatched: Vec<NodeIndex> = candidates
        .into_iter()
        .filter(|&v| matching.partner_edge(v).is_none())
        .collect();
    if !unmatched.is_empty() {
        return Err(KekulizeError::Unkekulizable(unmatched));
    }

    let doubled: HashSet<EdgeIndex> = matching.edges().collect();
    let mut result = Mol::with_capacity(mol.atom_count(), mol.bond_count());
    for idx in mol.atoms() {
        result.add_atom(mol.atom(idx).clone());
    }
    for edge in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        let order = match mol.bond(edge).order {
            SmilesBondOrder::Aromatic if doubled.contains(&edge) => BondOrder::Double,
            SmilesBondOrder::Aromatic | SmilesBondOrder::Implicit | SmilesBondOrder::Single => {
                BondOrder::Single
            }
            SmilesBondOrder::Double => BondOrder::Double,
            SmilesBondOrder::Triple => BondOrder::Triple,
        };
        result.add_bond(a, b, Bond { order });
    }
    Ok(result)
}

fn aromatic_adjacency<A>(mol: &Mol<A, SmilesBond>) -> Vec<Vec<(NodeIndex, EdgeIndex)>> {
    let mut adjacency = vec![Vec::new(); mol.atom_count()];
    for edge in mol.bonds() {
        if mol.bond(edge).order != SmilesBondOrder::Aromatic {
            continue;
        }
        if let Some((a, b)) = mol.bond_endpoints(edge) {
            adjacency[a.index()].push((b, edge));
            adjacency[b.index()].push((a, edge));
        }
    }
    adjacency
}

fn lacks_one_valence<A>(mol: &Mol<A, SmilesBond>, idx: NodeIndex) -> bool
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
{
    let atom = mol.atom(idx);
    let Some(elem) = Element::from_atomic_num(atom.atomic_num()) else {
        return false;
    };
    let used = smiles_bond_order_sum(mol, idx) + atom.hydrogen_count();
    let Some(target) = charged_valences(elem, atom.formal_charge())
        .into_iter()
        .find(|&v| v >= used)
    else {
        return false;
    };
    let gap = target - used;
    // bare charged ring atoms such as [n+] keep their double bond
    gap == 1 || (gap == 2 && atom.hydrogen_count() == 0 && atom.formal_charge() != 0)
}

struct Matching {
    partner: Vec<Option<EdgeIndex>>,
}

impl Matching {
    fn new(n: usize) -> Self {
        Self {
            partner: vec![None; n],
        }
    }

    fn partner_edge(&self, v: NodeIndex) -> Option<EdgeIndex> {
        self.partner[v.index()]
    }

    fn edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.partner.iter().filter_map(|e| *e)
    }

    /// Breadth-first search for an alternating path from the unmatched atom
    /// `start` to another unmatched atom, flipping it on success.
    fn augment_from<A>(
        &mut self,
        mol: &Mol<A, SmilesBond>,
        adjacency: &[Vec<(NodeIndex, EdgeIndex)>],
        eligible: &[bool],
        start: NodeIndex,
    ) -> bool {
        let n = mol.atom_count();
        let mut prev: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; n];
        let mut visited = vec![false; n];
        let mut queue = VecDeque::from([start]);
        visited[start.index()] = true;

        while let Some(u) = queue.pop_front() {
            for &(v, e) in &adjacency[u.index()] {
                if !eligible[v.index()] || visited[v.index()] || Some(e) == self.partner_edge(u) {
                    continue;
                }
                visited[v.index()] = true;
                prev[v.index()] = Some((u, e));

                let Some(matched) = self.partner_edge(v) else {
                    self.flip(&prev, start, v);
                    return true;
                };
                let Some(w) = mol.other_end(matched, v) else {
                    continue;
                };
                if !visited[w.index()] {
                    visited[w.index()] = true;
                    prev[w.index()] = Some((v, matched));
                    queue.push_back(w);
                }
            }
        }
        false
    }

    fn flip(&mut self, prev: &[Option<(NodeIndex, EdgeIndex)>], start: NodeIndex, end: NodeIndex) {
        let mut cur = end;
        let mut take = true;
        while cur != start {
            let Some((p, e)) = prev[cur.index()] else {
                break;
            };
            if take {
                self.partner[cur.index()] = Some(e);
                self.partner[p.index()] = Some(e);
            }
            take = !take;
            cur = p;
        }
    }
}
