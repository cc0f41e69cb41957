use crate::atom::Atom;
use crate::property::Properties;
use std::ops::{Index, IndexMut};

/// Frame-level property holding the name used to deduplicate structures.
pub const STRUCTURE_NAME: &str = "structure_name";

/// One atomic configuration read from a structure file.
#[derive(Debug, Default, Clone)]
pub struct Frame {
    /// Frame-level metadata, the `key=value` pairs of an extended XYZ comment
    /// line or the header records of a PDB file.
    pub properties: Properties,
    atoms: Vec<Atom>,
}

impl Frame {
    pub fn new() -> Self {
        Frame::default()
    }

    pub fn size(&self) -> usize {
        self.atoms.len()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn add_atom(&mut self, atom: Atom) {
        self.atoms.push(atom)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.atoms.iter().map(|atom| atom.symbol)
    }

    /// The `structure_name` property rendered as text, `None` when it is
    /// missing or blank. Integers and floats stay distinct: `12` and `12.0`
    /// are different names.
    pub fn structure_name(&self) -> Option<String> {
        let name = self.properties.get(STRUCTURE_NAME)?.to_string();
        if name.trim().is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

impl Index<usize> for Frame {
    type Output = Atom;

    fn index(&self, index: usize) -> &Self::Output {
        &self.atoms[index]
    }
}

impl IndexMut<usize> for Frame {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.atoms[index]
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::property::Property;

    #[test]
    fn test_frame_indexing() {
        let mut frame = Frame::new();
        frame.add_atom(Atom::new("H", [1.0, 2.0, 3.0]));
        frame.add_atom(Atom::new("O", [4.0, 5.0, 6.0]));

        assert_eq!(frame[0].symbol, "H");
        assert_eq!(frame[1].symbol, "O");
        assert_approx_eq!(frame[1].position[0], 4.0);

        frame[0].position[0] = 10.0;
        assert_approx_eq!(frame[0].position[0], 10.0);
        assert_eq!(frame.symbols().collect::<Vec<_>>(), ["H", "O"]);
    }

    #[test]
    #[should_panic]
    fn test_frame_indexing_out_of_bounds() {
        let frame = Frame::new();
        let _ = frame[0];
    }

    #[test]
    fn structure_names() {
        let mut frame = Frame::new();
        assert_eq!(frame.structure_name(), None);

        frame
            .properties
            .insert(STRUCTURE_NAME.into(), Property::String("  ".into()));
        assert_eq!(frame.structure_name(), None);

        frame
            .properties
            .insert(STRUCTURE_NAME.into(), Property::Integer(42));
        assert_eq!(frame.structure_name().as_deref(), Some("42"));

        frame
            .properties
            .insert(STRUCTURE_NAME.into(), Property::Double(42.0));
        assert_eq!(frame.structure_name().as_deref(), Some("42.0"));

        frame
            .properties
            .insert(STRUCTURE_NAME.into(), Property::String("bulk_Si".into()));
        assert_eq!(frame.structure_name().as_deref(), Some("bulk_Si"));
    }
}
