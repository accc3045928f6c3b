/// Default atom type for a molecular graph node.
///
/// `Atom` stores intrinsic atomic properties, the things you would read off
/// a structural formula or a molfile atom line. Coordinates are attached
/// separately through [`WithPosition3D`](crate::wrappers::WithPosition3D).
///
/// # Examples
///
/// ```
/// use crabgraph::Atom;
///
/// let carbon = Atom {
///     atomic_num: 6,
///     hydrogen_count: 3,
///     ..Atom::default()
/// };
/// assert_eq!(carbon.atomic_num, 6);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, …). Identifies the element.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    /// Number of virtual (suppressed) hydrogens on this atom.
    ///
    /// These are not graph nodes. Hydrogen removal folds explicit hydrogen
    /// nodes into this count on their parent.
    pub hydrogen_count: u8,
    /// Whether this atom was written as aromatic (lowercase SMILES atom or
    /// an endpoint of a molfile aromatic bond).
    pub is_aromatic: bool,
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasIsotope for Atom {
    fn isotope(&self) -> u16 {
        self.isotope
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.hydrogen_count
    }
}

impl crate::traits::HasHydrogenCountMut for Atom {
    fn hydrogen_count_mut(&mut self) -> &mut u8 {
        &mut self.hydrogen_count
    }
}

impl crate::traits::HasAromaticity for Atom {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}
