use crate::traits::*;

/// Atom payload with optional Cartesian coordinates in ångströms.
///
/// Everything read from a molfile is wrapped this way, so the same
/// perception code runs on 2D and 3D input.
#[derive(Debug, Clone, PartialEq)]
pub struct WithPosition3D<T> {
    pub inner: T,
    pub position_3d: Option<[f64; 3]>,
}

impl<T> WithPosition3D<T> {
    pub fn new(inner: T, position_3d: Option<[f64; 3]>) -> Self {
        Self { inner, position_3d }
    }
}

impl<T> HasPosition3D for WithPosition3D<T> {
    fn position_3d(&self) -> Option<[f64; 3]> {
        self.position_3d
    }
    fn set_position_3d(&mut self, pos: Option<[f64; 3]>) {
        self.position_3d = pos;
    }
}

impl<T: HasHydrogenCountMut> HasHydrogenCountMut for WithPosition3D<T> {
    fn hydrogen_count_mut(&mut self) -> &mut u8 {
        self.inner.hydrogen_count_mut()
    }
}

macro_rules! delegate_trait {
    ($wrapper:ident, $trait:ident, $method:ident, $ret:ty) => {
        impl<T: $trait> $trait for $wrapper<T> {
            fn $method(&self) -> $ret {
                self.inner.$method()
            }
        }
    };
}

delegate_trait!(WithPosition3D, HasAtomicNum, atomic_num, u8);
delegate_trait!(WithPosition3D, HasFormalCharge, formal_charge, i8);
delegate_trait!(WithPosition3D, HasIsotope, isotope, u16);
delegate_trait!(WithPosition3D, HasHydrogenCount, hydrogen_count, u8);
delegate_trait!(WithPosition3D, HasAromaticity, is_aromatic, bool);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;

    #[test]
    fn delegates_atom_properties() {
        let mut wrapped = WithPosition3D::new(
            Atom {
                atomic_num: 7,
                formal_charge: 1,
                hydrogen_count: 2,
                ..Atom::default()
            },
            Some([1.0, 2.0, 3.0]),
        );
        assert_eq!(wrapped.atomic_num(), 7);
        assert_eq!(wrapped.formal_charge(), 1);
        assert_eq!(wrapped.hydrogen_count(), 2);
        assert_eq!(wrapped.position_3d(), Some([1.0, 2.0, 3.0]));

        *wrapped.hydrogen_count_mut() += 1;
        assert_eq!(wrapped.inner.hydrogen_count, 3);

        wrapped.set_position_3d(None);
        assert_eq!(wrapped.position_3d(), None);
    }
}
