//! Force-field style atom type strings used as node labels.
//!
//! The vocabulary follows the familiar OpenBabel internal types: element
//! plus hybridization (`C3`, `N2`), aromatic (`Car`, `Nar`) and a handful of
//! functional-group types (`Cac`, `Oco2`, `Nam`, `Sox`, ...). Elements with no
//! special rule are labelled with their symbol.

use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::element::{outer_shell_electrons, Element};
use crate::mol::Mol;
use crate::traits::{HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};
use crate::valence::{has_bond_of_order, total_valence};

/// Steric number: neighbours, virtual hydrogens and lone pairs.
fn steric_number<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> i16
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let degree = mol.degree(idx) as i16 + atom.hydrogen_count() as i16;
    if atom.atomic_num() <= 2 {
        return degree;
    }
    let nouter = outer_shell_electrons(atom.atomic_num()) as i16;
    let free = nouter - total_valence(mol, idx) as i16 - atom.formal_charge() as i16;
    degree + (free / 2).max(0)
}

/// 1 for sp, 2 for sp2, 3 for sp3 and beyond.
fn hybridization<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> u8
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    match steric_number(mol, idx) {
        i16::MIN..=2 => 1,
        3 => 2,
        _ => 3,
    }
}

fn is_element<A: HasAtomicNum, B>(mol: &Mol<A, B>, idx: NodeIndex, elem: Element) -> bool {
    mol.atom(idx).atomic_num() == elem.atomic_num()
}

/// Oxygen neighbours bonded to nothing else.
fn terminal_oxygens<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> usize
where
    A: HasAtomicNum,
{
    mol.neighbors(idx)
        .filter(|&n| is_element(mol, n, Element::O) && mol.degree(n) == 1)
        .count()
}

fn double_bonded_oxygens<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> usize
where
    A: HasAtomicNum,
    B: HasBondOrder,
{
    mol.bonds_of(idx)
        .filter(|&e| mol.bond(e).bond_order() == BondOrder::Double)
        .filter_map(|e| mol.other_end(e, idx))
        .filter(|&n| is_element(mol, n, Element::O))
        .count()
}

/// Carbon of a carboxylic acid or carboxylate once hydrogens are folded.
fn is_carboxyl_carbon<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> bool
where
    A: HasAtomicNum,
{
    is_element(mol, idx, Element::C) && terminal_oxygens(mol, idx) >= 2
}

/// Neighbour carries a double bond or sits in an aromatic ring.
fn has_pi_neighbor<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> bool
where
    A: HasAromaticity,
    B: HasBondOrder,
{
    mol.neighbors(idx).any(|n| {
        mol.atom(n).is_aromatic()
            || has_bond_of_order(mol, n, BondOrder::Double)
            || has_bond_of_order(mol, n, BondOrder::Triple)
    })
}

fn is_amide_nitrogen<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> bool
where
    A: HasAtomicNum,
    B: HasBondOrder,
{
    mol.neighbors(idx).any(|c| {
        is_element(mol, c, Element::C)
            && mol.bonds_of(c).any(|e| {
                mol.bond(e).bond_order() == BondOrder::Double
                    && mol.other_end(e, c).is_some_and(|x| {
                        is_element(mol, x, Element::O) || is_element(mol, x, Element::S)
                    })
            })
    })
}

/// Nitrogen of a guanidinium or amidinium cation.
fn is_guanidinium_nitrogen<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> bool
where
    A: HasAtomicNum + HasFormalCharge,
    B: HasBondOrder,
{
    mol.neighbors(idx).any(|c| {
        if !is_element(mol, c, Element::C) {
            return false;
        }
        let nitrogens: Vec<NodeIndex> = mol
            .neighbors(c)
            .filter(|&n| is_element(mol, n, Element::N))
            .collect();
        let imine = mol.bonds_of(c).any(|e| {
            mol.bond(e).bond_order() == BondOrder::Double
                && mol.other_end(e, c).is_some_and(|x| is_element(mol, x, Element::N))
        });
        imine
            && nitrogens.len() >= 2
            && nitrogens.iter().any(|&n| mol.atom(n).formal_charge() > 0)
    })
}

/// Type string for one atom.
pub fn atom_type<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> String
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount + HasAromaticity,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let Some(elem) = Element::from_atomic_num(atom.atomic_num()) else {
        return "Du".to_owned();
    };
    let charge = atom.formal_charge();
    let aromatic = atom.is_aromatic();

    let label: &str = match elem {
        Element::H => {
            if mol.neighbors(idx).any(|n| is_element(mol, n, Element::O)) {
                "HO"
            } else {
                "H"
            }
        }
        Element::C => {
            if aromatic {
                "Car"
            } else if is_carboxyl_carbon(mol, idx) {
                "Cac"
            } else {
                match hybridization(mol, idx) {
                    1 => "C1",
                    2 => "C2",
                    _ => "C3",
                }
            }
        }
        Element::N => {
            let hyb = hybridization(mol, idx);
            if aromatic {
                "Nar"
            } else if is_guanidinium_nitrogen(mol, idx) {
                "Ng+"
            } else if charge > 0 && hyb == 3 {
                "N3+"
            } else if charge > 0 && hyb == 2 {
                "Npl"
            } else if hyb == 3 && is_amide_nitrogen(mol, idx) {
                "Nam"
            } else if hyb == 3 && has_pi_neighbor(mol, idx) {
                "Npl"
            } else {
                match hyb {
                    1 => "N1",
                    2 => "N2",
                    _ => "N3",
                }
            }
        }
        Element::O => {
            let carboxyl = mol.degree(idx) == 1
                && mol.neighbors(idx).any(|c| is_carboxyl_carbon(mol, c));
            if carboxyl {
                "Oco2"
            } else if mol.degree(idx) == 0 && atom.hydrogen_count() == 2 {
                "OH2"
            } else if charge < 0 {
                "O-"
            } else if aromatic || hybridization(mol, idx) <= 2 {
                "O2"
            } else {
                "O3"
            }
        }
        Element::S => {
            if charge > 0 && hybridization(mol, idx) == 3 && mol.degree(idx) >= 3 {
                "S3+"
            } else if terminal_oxygens(mol, idx) >= 3 {
                "Sac"
            } else if double_bonded_oxygens(mol, idx) >= 1 {
                "Sox"
            } else if aromatic || hybridization(mol, idx) <= 2 {
                "S2"
            } else {
                "S3"
            }
        }
        Element::P => {
            if charge > 0 && mol.degree(idx) + atom.hydrogen_count() as usize == 4 {
                "P3+"
            } else if terminal_oxygens(mol, idx) >= 3 {
                "Pac"
            } else {
                "P3"
            }
        }
        Element::B => {
            if charge < 0 || mol.degree(idx) + atom.hydrogen_count() as usize == 4 {
                "B3"
            } else {
                "B2"
            }
        }
        other => other.symbol(),
    };
    label.to_owned()
}

/// Type strings for every atom, in index order.
pub fn atom_types<A, B>(mol: &Mol<A, B>) -> Vec<String>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount + HasAromaticity,
    B: HasBondOrder,
{
    mol.atoms().map(|idx| atom_type(mol, idx)).collect()
}
