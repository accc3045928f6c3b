#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
}

impl BondOrder {
    /// Numeric order, as written in a molfile bond line and used for the
    /// graph edge label.
    pub fn as_u8(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bond {
    pub order: BondOrder,
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}

/// Bond order before aromatic perception. Both the SMILES parser and the
/// molfile parser produce these; kekulization turns them into [`Bond`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SmilesBondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
    #[default]
    Implicit,
}

impl SmilesBondOrder {
    /// Contribution to an atom's valence. Aromatic bonds count as single
    /// here; the missing electron is accounted for by the aromatic flag.
    pub fn valence_contribution(self) -> u8 {
        match self {
            SmilesBondOrder::Double => 2,
            SmilesBondOrder::Triple => 3,
            SmilesBondOrder::Single | SmilesBondOrder::Aromatic | SmilesBondOrder::Implicit => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SmilesBond {
    pub order: SmilesBondOrder,
}
