//! Turns the token stream into a molecule.
//!
//! Bonds are added as they are read, so atom indices follow the order in
//! which atoms appear in the string. Hydrogen counts for organic-subset
//! atoms are filled in once every bond is known.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{SmilesBond, SmilesBondOrder};
use crate::mol::Mol;
use crate::smiles::error::SmilesError;
use crate::smiles::scanner::{AtomToken, BondToken, Token};
use crate::valence::{implicit_hydrogens, smiles_bond_order_sum};

struct OpenRing {
    atom: NodeIndex,
    bond: Option<BondToken>,
}

pub fn build_mol(tokens: &[Token]) -> Result<Mol<Atom, SmilesBond>, SmilesError> {
    let mut mol = Mol::new();
    let mut organic: Vec<bool> = Vec::new();
    let mut current: Option<NodeIndex> = None;
    let mut pending: Option<BondToken> = None;
    let mut branches: Vec<(NodeIndex, usize)> = Vec::new();
    let mut rings: HashMap<u16, OpenRing> = HashMap::new();

    for token in tokens {
        match token {
            Token::Atom(tok) => {
                let idx = mol.add_atom(atom_from_token(tok));
                organic.push(tok.hcount.is_none());
                if let Some(prev) = current {
                    let order = resolve_order(&mol, pending.take(), prev, idx);
                    mol.add_bond(prev, idx, SmilesBond { order });
                }
                pending = None;
                current = Some(idx);
            }
            Token::Bond(b) => pending = Some(*b),
            Token::RingClosure { digit, pos } => {
                let here = current.ok_or(SmilesError::InvalidRingBond {
                    digit: *digit,
                    pos: *pos,
                })?;
                let bond = pending.take();
                match rings.remove(digit) {
                    None => {
                        rings.insert(*digit, OpenRing { atom: here, bond });
                    }
                    Some(open) => {
                        if open.atom == here || mol.bond_between(open.atom, here).is_some() {
                            return Err(SmilesError::InvalidRingBond {
                                digit: *digit,
                                pos: *pos,
                            });
                        }
                        let bond = match (open.bond, bond) {
                            (Some(a), Some(b)) if a != b => {
                                return Err(SmilesError::RingBondConflict { digit: *digit })
                            }
                            (a, b) => a.or(b),
                        };
                        let order = resolve_order(&mol, bond, open.atom, here);
                        mol.add_bond(open.atom, here, SmilesBond { order });
                    }
                }
            }
            Token::OpenParen(pos) => {
                let here = current.ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                branches.push((here, *pos));
            }
            Token::CloseParen(pos) => {
                let (anchor, _) = branches
                    .pop()
                    .ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                current = Some(anchor);
                pending = None;
            }
            Token::Dot => {
                current = None;
                pending = None;
            }
        }
    }

    if let Some(&(_, pos)) = branches.last() {
        return Err(SmilesError::UnmatchedParen { pos });
    }
    if let Some(digit) = rings.keys().min() {
        return Err(SmilesError::UnclosedRing { digit: *digit });
    }

    for idx in mol.atoms().collect::<Vec<_>>() {
        if !organic[idx.index()] {
            continue;
        }
        let bond_sum = smiles_bond_order_sum(&mol, idx);
        let atom = mol.atom(idx);
        let Some(elem) = crate::element::Element::from_atomic_num(atom.atomic_num) else {
            continue;
        };
        let h = implicit_hydrogens(elem, atom.formal_charge, bond_sum, atom.is_aromatic);
        mol.atom_mut(idx).hydrogen_count = h;
    }

    Ok(mol)
}

fn atom_from_token(tok: &AtomToken) -> Atom {
    Atom {
        atomic_num: tok.element.atomic_num(),
        formal_charge: tok.charge,
        isotope: tok.isotope,
        hydrogen_count: tok.hcount.unwrap_or(0),
        is_aromatic: tok.is_aromatic,
    }
}

/// An unwritten bond between two aromatic atoms is aromatic.
fn resolve_order(
    mol: &Mol<Atom, SmilesBond>,
    written: Option<BondToken>,
    a: NodeIndex,
    b: NodeIndex,
) -> SmilesBondOrder {
    match written {
        Some(BondToken::Single) => SmilesBondOrder::Single,
        Some(BondToken::Double) => SmilesBondOrder::Double,
        Some(BondToken::Triple) => SmilesBondOrder::Triple,
        Some(BondToken::Aromatic) => SmilesBondOrder::Aromatic,
        None if mol.atom(a).is_aromatic && mol.atom(b).is_aromatic => SmilesBondOrder::Aromatic,
        None => SmilesBondOrder::Implicit,
    }
}
