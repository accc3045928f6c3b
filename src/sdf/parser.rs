//! Molfile (V2000) block parser.
//!
//! Reads one record of an SD file into a molecule with 3D positions.
//! Aromatic bonds (type 4) are kekulized and hydrogens not written as atoms
//! are filled in from default valences. Type 4 bonds cannot tell a pyrrole
//! nitrogen from a pyridine one, so a ring that fails to kekulize gets
//! hydrogens on its two-connected neutral N or P until it succeeds.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, SmilesBond, SmilesBondOrder};
use crate::element::Element;
use crate::kekulize::{kekulize, KekulizeError};
use crate::mol::Mol;
use crate::sdf::error::SdfError;
use crate::sdf::records::is_terminator;
use crate::valence::{implicit_hydrogens, smiles_bond_order_sum};
use crate::wrappers::WithPosition3D;

/// Molecule read from a molfile block.
#[derive(Debug, Clone, PartialEq)]
pub struct Molfile {
    /// First header line, trimmed.
    pub title: String,
    pub mol: Mol<WithPosition3D<Atom>, Bond>,
}

struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    line_number: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Lines {
            inner: text.lines().enumerate(),
            line_number: 0,
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let (i, line) = self.inner.next()?;
        self.line_number = i + 1;
        Some(line)
    }

    fn expect_line(&mut self, what: &str) -> Result<&'a str, SdfError> {
        self.next_line().ok_or_else(|| {
            SdfError::parse(
                self.line_number + 1,
                format!("expected {what}, got end of record"),
            )
        })
    }
}

/// Parse one molfile block.
pub fn parse_molfile(text: &str) -> Result<Molfile, SdfError> {
    let mut lines = Lines::new(text);

    let title = lines.expect_line("title line")?.trim().to_string();
    lines.expect_line("program line")?;
    lines.expect_line("comment line")?;

    let counts = lines.expect_line("counts line")?;
    let (n_atoms, n_bonds) = parse_counts_line(counts, lines.line_number)?;

    let mut mol: Mol<Atom, SmilesBond> = Mol::with_capacity(n_atoms, n_bonds);
    let mut positions = Vec::with_capacity(n_atoms);

    for i in 0..n_atoms {
        let line = lines.expect_line(&format!("atom {}", i + 1))?;
        let (atom, position) = parse_atom_line(line, lines.line_number)?;
        mol.add_atom(atom);
        positions.push(position);
    }

    for i in 0..n_bonds {
        let line = lines.expect_line(&format!("bond {}", i + 1))?;
        let (a, b, order) = parse_bond_line(line, lines.line_number, n_atoms)?;
        if mol.bond_between(a, b).is_some() {
            return Err(SdfError::parse(
                lines.line_number,
                format!("duplicate bond {}-{}", a.index() + 1, b.index() + 1),
            ));
        }
        if order == SmilesBondOrder::Aromatic {
            mol.atom_mut(a).is_aromatic = true;
            mol.atom_mut(b).is_aromatic = true;
        }
        mol.add_bond(a, b, SmilesBond { order });
    }

    let mut charges_reset = false;
    while let Some(line) = lines.next_line() {
        if line.starts_with("M  END") || is_terminator(line) {
            break;
        }
        if line.starts_with("M  CHG") {
            // M  CHG supersedes every charge in the atom block
            if !charges_reset {
                for idx in mol.atoms().collect::<Vec<_>>() {
                    mol.atom_mut(idx).formal_charge = 0;
                }
                charges_reset = true;
            }
            for (idx, value) in parse_property_pairs(line, lines.line_number, n_atoms)? {
                mol.atom_mut(idx).formal_charge = i8::try_from(value)
                    .map_err(|_| SdfError::parse(lines.line_number, "charge out of range"))?;
            }
        } else if line.starts_with("M  ISO") {
            for (idx, value) in parse_property_pairs(line, lines.line_number, n_atoms)? {
                mol.atom_mut(idx).isotope = u16::try_from(value)
                    .map_err(|_| SdfError::parse(lines.line_number, "isotope out of range"))?;
            }
        }
    }

    fill_implicit_hydrogens(&mut mol);
    let kekule = kekulize_aromatic_nh(mol)?;
    let mol = kekule.map_atoms(|idx, atom| {
        WithPosition3D::new(atom.clone(), Some(positions[idx.index()]))
    });

    Ok(Molfile { title, mol })
}

fn fill_implicit_hydrogens(mol: &mut Mol<Atom, SmilesBond>) {
    for idx in mol.atoms().collect::<Vec<_>>() {
        let bond_sum = smiles_bond_order_sum(mol, idx);
        let atom = mol.atom(idx);
        let Some(elem) = Element::from_atomic_num(atom.atomic_num) else {
            continue;
        };
        let h = implicit_hydrogens(elem, atom.formal_charge, bond_sum, atom.is_aromatic);
        mol.atom_mut(idx).hydrogen_count = h;
    }
}

/// Kekulize, retrying with an implicit H on pyrrole-type atoms.
///
/// Each candidate keeps its hydrogen only if it shrinks the set of atoms
/// left without a double bond.
fn kekulize_aromatic_nh(mut mol: Mol<Atom, SmilesBond>) -> Result<Mol<Atom, Bond>, SdfError> {
    let err = match kekulize(mol.clone()) {
        Ok(kekule) => return Ok(kekule),
        Err(e) => e,
    };
    let KekulizeError::Unkekulizable(unmatched) = &err;
    let mut remaining = unmatched.len();

    let candidates: Vec<NodeIndex> = mol
        .atoms()
        .filter(|&idx| takes_aromatic_h(&mol, idx))
        .collect();
    for idx in candidates {
        mol.atom_mut(idx).hydrogen_count = 1;
        match kekulize(mol.clone()) {
            Ok(kekule) => {
                log::debug!("kekulized after adding aromatic hydrogens");
                return Ok(kekule);
            }
            Err(KekulizeError::Unkekulizable(left)) if left.len() < remaining => {
                remaining = left.len();
            }
            Err(_) => mol.atom_mut(idx).hydrogen_count = 0,
        }
    }
    Err(err.into())
}

fn takes_aromatic_h(mol: &Mol<Atom, SmilesBond>, idx: NodeIndex) -> bool {
    let atom = mol.atom(idx);
    atom.is_aromatic
        && matches!(atom.atomic_num, 7 | 15)
        && atom.formal_charge == 0
        && atom.hydrogen_count == 0
        && mol.degree(idx) == 2
}

fn field<T: std::str::FromStr>(line: &str, range: std::ops::Range<usize>) -> Option<T> {
    line.get(range).and_then(|s| s.trim().parse().ok())
}

/// `aaabbb...vvvvvv`: atom and bond counts, version tag at columns 34-39.
fn parse_counts_line(line: &str, line_number: usize) -> Result<(usize, usize), SdfError> {
    if line.get(33..39).is_some_and(|s| s.trim() == "V3000") {
        return Err(SdfError::unsupported("V3000 molfiles"));
    }
    let n_atoms = field(line, 0..3)
        .ok_or_else(|| SdfError::parse(line_number, "invalid atom count"))?;
    let n_bonds = field(line, 3..6)
        .ok_or_else(|| SdfError::parse(line_number, "invalid bond count"))?;
    Ok((n_atoms, n_bonds))
}

/// Atom block charge codes: 1 = +3, 2 = +2, 3 = +1, 4 = doublet radical,
/// 5 = -1, 6 = -2, 7 = -3.
fn charge_from_code(code: u8) -> i8 {
    match code {
        1..=3 | 5..=7 => 4 - code as i8,
        _ => 0,
    }
}

fn parse_atom_line(line: &str, line_number: usize) -> Result<(Atom, [f64; 3]), SdfError> {
    let coord = |range: std::ops::Range<usize>, axis: &str| {
        field::<f64>(line, range)
            .ok_or_else(|| SdfError::parse(line_number, format!("invalid {axis} coordinate")))
    };
    let x = coord(0..10, "x")?;
    let y = coord(10..20, "y")?;
    let z = coord(20..30, "z")?;

    let symbol = line
        .get(31..34)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SdfError::parse(line_number, "missing atom symbol"))?;

    let (element, isotope) = match symbol {
        "D" => (Element::H, 2),
        "T" => (Element::H, 3),
        _ => {
            let element = Element::from_symbol_loose(symbol).ok_or_else(|| {
                SdfError::UnknownElement {
                    line: line_number,
                    symbol: symbol.to_string(),
                }
            })?;
            (element, 0)
        }
    };

    let charge = field::<u8>(line, 36..39).map(charge_from_code).unwrap_or(0);

    let atom = Atom {
        atomic_num: element.atomic_num(),
        formal_charge: charge,
        isotope,
        hydrogen_count: 0,
        is_aromatic: false,
    };
    Ok((atom, [x, y, z]))
}

fn atom_ref(value: usize, n_atoms: usize, line_number: usize) -> Result<NodeIndex, SdfError> {
    if value == 0 || value > n_atoms {
        return Err(SdfError::parse(
            line_number,
            format!("atom number {value} out of range 1..={n_atoms}"),
        ));
    }
    Ok(NodeIndex::new(value - 1))
}

/// `111222ttt...`: 1-based atom numbers and the bond type.
fn parse_bond_line(
    line: &str,
    line_number: usize,
    n_atoms: usize,
) -> Result<(NodeIndex, NodeIndex, SmilesBondOrder), SdfError> {
    let first: usize = field(line, 0..3)
        .ok_or_else(|| SdfError::parse(line_number, "invalid first atom in bond"))?;
    let second: usize = field(line, 3..6)
        .ok_or_else(|| SdfError::parse(line_number, "invalid second atom in bond"))?;
    let a = atom_ref(first, n_atoms, line_number)?;
    let b = atom_ref(second, n_atoms, line_number)?;
    if a == b {
        return Err(SdfError::parse(line_number, "bond from an atom to itself"));
    }

    let bond_type: u8 = field(line, 6..9).unwrap_or(1);
    let order = match bond_type {
        1 => SmilesBondOrder::Single,
        2 => SmilesBondOrder::Double,
        3 => SmilesBondOrder::Triple,
        4 => SmilesBondOrder::Aromatic,
        other => {
            return Err(SdfError::unsupported(format!(
                "query bond type {other} at line {line_number}"
            )))
        }
    };
    Ok((a, b, order))
}

/// `M  XXXnn8 aaa vvv ...` property lines: entry count, then atom/value
/// pairs.
fn parse_property_pairs(
    line: &str,
    line_number: usize,
    n_atoms: usize,
) -> Result<Vec<(NodeIndex, i32)>, SdfError> {
    let mut fields = line.get(6..).unwrap_or("").split_whitespace();
    let count: usize = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| SdfError::parse(line_number, "invalid property entry count"))?;

    let mut pairs = Vec::with_capacity(count);
    for _ in 0..count {
        let (Some(atom), Some(value)) = (
            fields.next().and_then(|s| s.parse::<usize>().ok()),
            fields.next().and_then(|s| s.parse::<i32>().ok()),
        ) else {
            return Err(SdfError::parse(line_number, "truncated property line"));
        };
        pairs.push((atom_ref(atom, n_atoms, line_number)?, value));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;
    use crate::traits::HasPosition3D;

    const ETHANOL: &str = "\
ethanol
  crabgraph

  3  2  0  0  0  0  0  0  0  0999 V2000
   -0.8883    0.1670   -0.0273 C   0  0  0  0  0  0  0  0  0  0  0  0
    0.4658   -0.5116   -0.0368 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.4311    0.3229    0.5867 O   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
  2  3  1  0  0  0  0
M  END
$$$$
";

    fn benzene_aromatic() -> String {
        let mut s = String::from("benzene\n\n\n  6  6  0  0  0  0  0  0  0  0999 V2000\n");
        for i in 0..6 {
            s.push_str(&format!(
                "{:>10.4}{:>10.4}{:>10.4} C   0  0  0  0  0  0  0  0  0  0  0  0\n",
                i as f64, 0.0, 0.0
            ));
        }
        for i in 0..6 {
            s.push_str(&format!("{:>3}{:>3}  4  0  0  0  0\n", i + 1, (i + 1) % 6 + 1));
        }
        s.push_str("M  END\n$$$$\n");
        s
    }

    #[test]
    fn parses_ethanol() {
        let molfile = parse_molfile(ETHANOL).unwrap();
        assert_eq!(molfile.title, "ethanol");
        let mol = &molfile.mol;
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        let hs: Vec<u8> = mol.atoms().map(|i| mol.atom(i).inner.hydrogen_count).collect();
        assert_eq!(hs, vec![3, 2, 1]);
        assert_eq!(
            mol.atom(NodeIndex::new(2)).position_3d(),
            Some([1.4311, 0.3229, 0.5867])
        );
    }

    #[test]
    fn aromatic_bonds_are_kekulized() {
        let molfile = parse_molfile(&benzene_aromatic()).unwrap();
        let mol = &molfile.mol;
        let doubles = mol
            .bonds()
            .filter(|&e| mol.bond(e).order == BondOrder::Double)
            .count();
        assert_eq!(doubles, 3);
        for idx in mol.atoms() {
            assert!(mol.atom(idx).inner.is_aromatic);
            assert_eq!(mol.atom(idx).inner.hydrogen_count, 1);
        }
    }

    #[test]
    fn zero_atom_record() {
        let text = "empty\n\n\n  0  0  0  0  0  0  0  0  0  0999 V2000\nM  END\n$$$$\n";
        let molfile = parse_molfile(text).unwrap();
        assert!(molfile.mol.is_empty());
    }

    #[test]
    fn charge_codes_and_properties() {
        let text = "\
ions


  2  0  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 N   0  3  0  0  0  0  0  0  0  0  0  0
    3.0000    0.0000    0.0000 Cl  0  5  0  0  0  0  0  0  0  0  0  0
M  END
";
        let mol = parse_molfile(text).unwrap().mol;
        assert_eq!(mol.atom(NodeIndex::new(0)).inner.formal_charge, 1);
        assert_eq!(mol.atom(NodeIndex::new(0)).inner.hydrogen_count, 4);
        assert_eq!(mol.atom(NodeIndex::new(1)).inner.formal_charge, -1);

        let with_props = text.replace(
            "M  END",
            "M  CHG  1   2  -1\nM  ISO  1   2  37\nM  END",
        );
        let mol = parse_molfile(&with_props).unwrap().mol;
        // atom-block charges are superseded once M  CHG appears
        assert_eq!(mol.atom(NodeIndex::new(0)).inner.formal_charge, 0);
        assert_eq!(mol.atom(NodeIndex::new(1)).inner.formal_charge, -1);
        assert_eq!(mol.atom(NodeIndex::new(1)).inner.isotope, 37);
    }

    #[test]
    fn deuterium_symbol() {
        let text = "\n\n\n  1  0  0  0  0  0  0  0  0  0999 V2000\n    0.0000    0.0000    0.0000 D   0  0  0  0\nM  END\n";
        let mol = parse_molfile(text).unwrap().mol;
        let atom = &mol.atom(NodeIndex::new(0)).inner;
        assert_eq!(atom.atomic_num, 1);
        assert_eq!(atom.isotope, 2);
    }

    #[test]
    fn missing_m_end_is_tolerated() {
        let text = ETHANOL.replace("M  END\n", "");
        assert_eq!(parse_molfile(&text).unwrap().mol.atom_count(), 3);
    }

    #[test]
    fn errors_carry_line_numbers() {
        let truncated = "t\n\n\n  2  0  0  0  0  0  0  0  0  0999 V2000\n    0.0000    0.0000    0.0000 C   0  0\n";
        match parse_molfile(truncated) {
            Err(SdfError::Parse { line, message }) => {
                assert_eq!(line, 6);
                assert!(message.contains("atom 2"), "{message}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }

        let bad_symbol = ETHANOL.replace(" O   0", " Xx  0");
        assert!(matches!(
            parse_molfile(&bad_symbol),
            Err(SdfError::UnknownElement { line: 7, .. })
        ));

        let bad_bond = ETHANOL.replace("  2  3  1", "  2  9  1");
        assert!(matches!(
            parse_molfile(&bad_bond),
            Err(SdfError::Parse { line: 9, .. })
        ));

        assert!(matches!(parse_molfile(""), Err(SdfError::Parse { line: 1, .. })));
    }

    #[test]
    fn v3000_is_rejected() {
        let text = "t\n\n\n  0  0  0     0  0            999 V3000\nM  END\n";
        assert!(matches!(parse_molfile(text), Err(SdfError::Unsupported(_))));
    }

    /// Aromatic five-membered ring; `ring` lists the element of each atom.
    fn five_ring_aromatic(ring: [&str; 5]) -> String {
        let mut s = String::from("ring\n\n\n  5  5  0  0  0  0  0  0  0  0999 V2000\n");
        for (i, symbol) in ring.iter().enumerate() {
            let angle = i as f64 * std::f64::consts::TAU / 5.0;
            s.push_str(&format!(
                "{:>10.4}{:>10.4}{:>10.4} {:<3} 0  0  0  0  0  0  0  0  0  0  0  0\n",
                angle.cos(),
                angle.sin(),
                0.0,
                symbol
            ));
        }
        for i in 0..5 {
            s.push_str(&format!("{:>3}{:>3}  4  0  0  0  0\n", i + 1, (i + 1) % 5 + 1));
        }
        s.push_str("M  END\n$$$$\n");
        s
    }

    fn double_bonds(mol: &Mol<WithPosition3D<Atom>, Bond>) -> usize {
        mol.bonds()
            .filter(|&e| mol.bond(e).order == BondOrder::Double)
            .count()
    }

    #[test]
    fn aromatic_pyrrole_gets_nh() {
        let mol = parse_molfile(&five_ring_aromatic(["N", "C", "C", "C", "C"]))
            .unwrap()
            .mol;
        assert_eq!(double_bonds(&mol), 2);
        let hs: Vec<u8> = mol.atoms().map(|i| mol.atom(i).inner.hydrogen_count).collect();
        assert_eq!(hs, vec![1, 1, 1, 1, 1]);
        for idx in mol.atoms() {
            let doubles = mol
                .bonds_of(idx)
                .filter(|&e| mol.bond(e).order == BondOrder::Double)
                .count();
            assert_eq!(doubles, usize::from(idx.index() != 0));
        }
    }

    #[test]
    fn aromatic_imidazole_protonates_one_nitrogen() {
        let mol = parse_molfile(&five_ring_aromatic(["N", "C", "N", "C", "C"]))
            .unwrap()
            .mol;
        assert_eq!(double_bonds(&mol), 2);
        let nitrogen_h: u8 = mol
            .atoms()
            .filter(|&i| mol.atom(i).inner.atomic_num == 7)
            .map(|i| mol.atom(i).inner.hydrogen_count)
            .sum();
        assert_eq!(nitrogen_h, 1);
    }

    #[test]
    fn charged_aromatic_nitrogen_is_left_alone() {
        let text = five_ring_aromatic(["N", "C", "C", "C", "C"])
            .replace("M  END", "M  CHG  1   1   1\nM  END");
        assert!(matches!(parse_molfile(&text), Err(SdfError::Kekulize(_))));
    }

    #[test]
    fn odd_aromatic_ring_fails() {
        let text = benzene_aromatic()
            .replace("  6  6  0", "  5  5  0")
            .replace("  6  1  4", "  5  1  4");
        let text: String = text
            .lines()
            .enumerate()
            .filter(|(i, _)| *i != 9 && *i != 14)
            .map(|(_, l)| format!("{l}\n"))
            .collect();
        assert!(matches!(parse_molfile(&text), Err(SdfError::Kekulize(_))));
    }
}
