use petgraph::graph::NodeIndex;

use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasFormalCharge, HasHydrogenCountMut, HasIsotope};

/// Remove explicit hydrogen nodes, folding them into the parent atom's
/// virtual hydrogen count.
///
/// Only neutral, natural-abundance hydrogens with exactly one neighbour are
/// removed. H2, bridging hydrides, charged and isotopic hydrogens stay as
/// nodes. Surviving atoms keep their relative order and are renumbered
/// contiguously from 0.
pub fn remove_hs<A, B>(mol: &Mol<A, B>) -> Mol<A, B>
where
    A: HasAtomicNum + HasFormalCharge + HasIsotope + HasHydrogenCountMut + Clone,
    B: Clone,
{
    let node_count = mol.atom_count();
    let mut removable = vec![false; node_count];
    let mut extra_h: Vec<u8> = vec![0; node_count];

    for idx in mol.atoms() {
        if !is_removable_h(mol, idx) {
            continue;
        }
        if let Some(parent) = mol.neighbors(idx).next() {
            removable[idx.index()] = true;
            extra_h[parent.index()] = extra_h[parent.index()].saturating_add(1);
        }
    }

    let mut result = Mol::with_capacity(node_count, mol.bond_count());
    let mut index_map: Vec<Option<NodeIndex>> = vec![None; node_count];

    for idx in mol.atoms() {
        if removable[idx.index()] {
            continue;
        }
        let mut atom = mol.atom(idx).clone();
        let count = atom.hydrogen_count_mut();
        *count = count.saturating_add(extra_h[idx.index()]);
        index_map[idx.index()] = Some(result.add_atom(atom));
    }

    for edge in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        if let (Some(new_a), Some(new_b)) = (index_map[a.index()], index_map[b.index()]) {
            result.add_bond(new_a, new_b, mol.bond(edge).clone());
        }
    }

    result
}

fn is_removable_h<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> bool
where
    A: HasAtomicNum + HasFormalCharge + HasIsotope,
{
    let atom = mol.atom(idx);
    if atom.atomic_num() != 1 || atom.isotope() != 0 || atom.formal_charge() != 0 {
        return false;
    }
    let mut neighbors = mol.neighbors(idx);
    match (neighbors.next(), neighbors.next()) {
        (Some(parent), None) => mol.atom(parent).atomic_num() != 1,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::{Bond, BondOrder};
    use crate::traits::HasHydrogenCount;
    use crate::wrappers::WithPosition3D;

    fn explicit_methanol() -> Mol<Atom, Bond> {
        // C, O, then four hydrogens: H on C x3, H on O x1
        let mut mol = Mol::new();
        let c = mol.add_atom(Atom { atomic_num: 6, ..Atom::default() });
        let o = mol.add_atom(Atom { atomic_num: 8, ..Atom::default() });
        mol.add_bond(c, o, Bond::default());
        for parent in [c, c, o, c] {
            let h = mol.add_atom(Atom { atomic_num: 1, ..Atom::default() });
            mol.add_bond(parent, h, Bond::default());
        }
        mol
    }

    #[test]
    fn folds_hydrogens_into_parents() {
        let mol = remove_hs(&explicit_methanol());
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 1);
        assert_eq!(mol.atom(NodeIndex::new(0)).hydrogen_count, 3);
        assert_eq!(mol.atom(NodeIndex::new(1)).hydrogen_count, 1);
    }

    #[test]
    fn renumbers_contiguously_preserving_order() {
        // H, C, H, N
        let mut mol: Mol<Atom, Bond> = Mol::new();
        let h0 = mol.add_atom(Atom { atomic_num: 1, ..Atom::default() });
        let c = mol.add_atom(Atom { atomic_num: 6, ..Atom::default() });
        let h1 = mol.add_atom(Atom { atomic_num: 1, ..Atom::default() });
        let nn = mol.add_atom(Atom { atomic_num: 7, ..Atom::default() });
        mol.add_bond(h0, c, Bond::default());
        mol.add_bond(c, h1, Bond::default());
        mol.add_bond(c, nn, Bond { order: BondOrder::Triple });

        let stripped = remove_hs(&mol);
        assert_eq!(stripped.atom_count(), 2);
        assert_eq!(stripped.atom(NodeIndex::new(0)).atomic_num, 6);
        assert_eq!(stripped.atom(NodeIndex::new(1)).atomic_num, 7);
        let e = stripped
            .bond_between(NodeIndex::new(0), NodeIndex::new(1))
            .unwrap();
        assert_eq!(stripped.bond(e).order, BondOrder::Triple);
    }

    #[test]
    fn keeps_special_hydrogens() {
        let mut mol: Mol<Atom, Bond> = Mol::new();
        // H2 molecule
        let a = mol.add_atom(Atom { atomic_num: 1, ..Atom::default() });
        let b = mol.add_atom(Atom { atomic_num: 1, ..Atom::default() });
        mol.add_bond(a, b, Bond::default());
        // deuterium on carbon
        let c = mol.add_atom(Atom { atomic_num: 6, ..Atom::default() });
        let d = mol.add_atom(Atom { atomic_num: 1, isotope: 2, ..Atom::default() });
        mol.add_bond(c, d, Bond::default());
        // lone proton
        mol.add_atom(Atom { atomic_num: 1, formal_charge: 1, ..Atom::default() });

        let stripped = remove_hs(&mol);
        assert_eq!(stripped.atom_count(), mol.atom_count());
        assert_eq!(stripped.bond_count(), mol.bond_count());
    }

    #[test]
    fn works_through_position_wrapper() {
        let mol = explicit_methanol();
        let positioned = mol.map_atoms(|idx, atom| {
            WithPosition3D::new(atom.clone(), Some([idx.index() as f64, 0.0, 0.0]))
        });
        let stripped = remove_hs(&positioned);
        assert_eq!(stripped.atom_count(), 2);
        assert_eq!(stripped.atom(NodeIndex::new(1)).position_3d, Some([1.0, 0.0, 0.0]));
        assert_eq!(stripped.atom(NodeIndex::new(0)).hydrogen_count(), 3);
    }

    #[test]
    fn no_hydrogens_is_identity() {
        let mol = crate::smiles::from_smiles("CC(=O)O").unwrap();
        let stripped = remove_hs(&mol);
        assert_eq!(stripped, mol);
    }
}
