//! Valence bookkeeping shared by the SMILES and molfile readers.

use petgraph::graph::NodeIndex;

use crate::bond::{BondOrder, SmilesBond};
use crate::element::Element;
use crate::mol::Mol;
use crate::traits::{HasBondOrder, HasHydrogenCount};

/// Sum of bond orders plus virtual hydrogens.
pub fn total_valence<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> u8
where
    A: HasHydrogenCount,
    B: HasBondOrder,
{
    let bond_sum: u8 = mol
        .bonds_of(atom)
        .map(|ei| mol.bond(ei).bond_order().as_u8())
        .sum();
    bond_sum + mol.atom(atom).hydrogen_count()
}

/// Whether any bond on `atom` has the given order.
pub fn has_bond_of_order<A, B: HasBondOrder>(
    mol: &Mol<A, B>,
    atom: NodeIndex,
    order: BondOrder,
) -> bool {
    mol.bonds_of(atom).any(|ei| mol.bond(ei).bond_order() == order)
}

/// Bond-order sum before kekulization, aromatic bonds counted as single.
pub fn smiles_bond_order_sum<A>(mol: &Mol<A, SmilesBond>, atom: NodeIndex) -> u8 {
    mol.bonds_of(atom)
        .fold(0u8, |acc, ei| {
            acc.saturating_add(mol.bond(ei).order.valence_contribution())
        })
}

/// Allowed valences of `elem` once a formal charge is applied.
///
/// Group 15-17 elements gain a bond per positive charge and lose one per
/// negative charge (N+ is tetravalent, O- monovalent); boron and carbon lose
/// one bond for either sign.
pub fn charged_valences(elem: Element, charge: i8) -> Vec<u8> {
    let base = elem.default_valences();
    if charge == 0 {
        return base.to_vec();
    }
    let shift = match elem {
        Element::B | Element::C | Element::Si | Element::Ge => -(charge.unsigned_abs() as i16),
        _ => charge as i16,
    };
    base.iter()
        .filter_map(|&v| {
            let adjusted = v as i16 + shift;
            (adjusted >= 0).then_some(adjusted as u8)
        })
        .collect()
}

/// Number of hydrogens needed to reach the smallest allowed valence that is
/// not below `bond_sum`. Aromatic atoms give one valence to the ring.
///
/// Elements without default valences (metals, noble gases) get none.
pub fn implicit_hydrogens(elem: Element, charge: i8, bond_sum: u8, aromatic: bool) -> u8 {
    let valences = charged_valences(elem, charge);
    let Some(target) = valences.iter().copied().find(|&v| v >= bond_sum) else {
        return 0;
    };
    let mut h = target - bond_sum;
    if aromatic && h > 0 {
        h -= 1;
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    #[test]
    fn ethene_total_valence() {
        let mol = from_smiles("C=C").unwrap();
        for idx in mol.atoms() {
            assert_eq!(total_valence(&mol, idx), 4);
        }
    }

    #[test]
    fn benzene_total_valence() {
        let mol = from_smiles("c1ccccc1").unwrap();
        for idx in mol.atoms() {
            assert_eq!(total_valence(&mol, idx), 4);
        }
    }

    #[test]
    fn neutral_implicit_h() {
        assert_eq!(implicit_hydrogens(Element::C, 0, 1, false), 3);
        assert_eq!(implicit_hydrogens(Element::O, 0, 0, false), 2);
        assert_eq!(implicit_hydrogens(Element::N, 0, 4, false), 1);
        assert_eq!(implicit_hydrogens(Element::S, 0, 3, false), 1);
    }

    #[test]
    fn aromatic_implicit_h() {
        assert_eq!(implicit_hydrogens(Element::C, 0, 2, true), 1);
        assert_eq!(implicit_hydrogens(Element::N, 0, 2, true), 0);
    }

    #[test]
    fn charged_implicit_h() {
        // ammonium
        assert_eq!(implicit_hydrogens(Element::N, 1, 0, false), 4);
        // hydroxide
        assert_eq!(implicit_hydrogens(Element::O, -1, 0, false), 1);
        // carbanion in a chain
        assert_eq!(implicit_hydrogens(Element::C, -1, 1, false), 2);
    }

    #[test]
    fn metals_get_no_hydrogens() {
        assert_eq!(implicit_hydrogens(Element::Fe, 0, 0, false), 0);
        assert_eq!(implicit_hydrogens(Element::Na, 1, 0, false), 0);
    }

    #[test]
    fn overvalent_gets_no_hydrogens() {
        assert_eq!(implicit_hydrogens(Element::C, 0, 5, false), 0);
    }
}
