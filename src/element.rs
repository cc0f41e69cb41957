//! Periodic table data: symbols, names and the grid position of every
//! element in the usual 18-column layout.

use phf::phf_map;

use crate::error::Error;

/// Highest atomic number known to the table.
pub const MAX_ATOMIC_NUMBER: u8 = 118;

/// Number of grid rows used by [`layout_position`]: seven periods, a spacer
/// row and the two f-block rows.
pub const LAYOUT_ROWS: u8 = 10;

/// Number of grid columns used by [`layout_position`].
pub const LAYOUT_COLUMNS: u8 = 18;

/// `(symbol, name)` for every element, indexed by `Z - 1`.
pub static ELEMENTS: [(&str, &str); MAX_ATOMIC_NUMBER as usize] = [
    ("H", "Hydrogen"),
    ("He", "Helium"),
    ("Li", "Lithium"),
    ("Be", "Beryllium"),
    ("B", "Boron"),
    ("C", "Carbon"),
    ("N", "Nitrogen"),
    ("O", "Oxygen"),
    ("F", "Fluorine"),
    ("Ne", "Neon"),
    ("Na", "Sodium"),
    ("Mg", "Magnesium"),
    ("Al", "Aluminium"),
    ("Si", "Silicon"),
    ("P", "Phosphorus"),
    ("S", "Sulfur"),
    ("Cl", "Chlorine"),
    ("Ar", "Argon"),
    ("K", "Potassium"),
    ("Ca", "Calcium"),
    ("Sc", "Scandium"),
    ("Ti", "Titanium"),
    ("V", "Vanadium"),
    ("Cr", "Chromium"),
    ("Mn", "Manganese"),
    ("Fe", "Iron"),
    ("Co", "Cobalt"),
    ("Ni", "Nickel"),
    ("Cu", "Copper"),
    ("Zn", "Zinc"),
    ("Ga", "Gallium"),
    ("Ge", "Germanium"),
    ("As", "Arsenic"),
    ("Se", "Selenium"),
    ("Br", "Bromine"),
    ("Kr", "Krypton"),
    ("Rb", "Rubidium"),
    ("Sr", "Strontium"),
    ("Y", "Yttrium"),
    ("Zr", "Zirconium"),
    ("Nb", "Niobium"),
    ("Mo", "Molybdenum"),
    ("Tc", "Technetium"),
    ("Ru", "Ruthenium"),
    ("Rh", "Rhodium"),
    ("Pd", "Palladium"),
    ("Ag", "Silver"),
    ("Cd", "Cadmium"),
    ("In", "Indium"),
    ("Sn", "Tin"),
    ("Sb", "Antimony"),
    ("Te", "Tellurium"),
    ("I", "Iodine"),
    ("Xe", "Xenon"),
    ("Cs", "Caesium"),
    ("Ba", "Barium"),
    ("La", "Lanthanum"),
    ("Ce", "Cerium"),
    ("Pr", "Praseodymium"),
    ("Nd", "Neodymium"),
    ("Pm", "Promethium"),
    ("Sm", "Samarium"),
    ("Eu", "Europium"),
    ("Gd", "Gadolinium"),
    ("Tb", "Terbium"),
    ("Dy", "Dysprosium"),
    ("Ho", "Holmium"),
    ("Er", "Erbium"),
    ("Tm", "Thulium"),
    ("Yb", "Ytterbium"),
    ("Lu", "Lutetium"),
    ("Hf", "Hafnium"),
    ("Ta", "Tantalum"),
    ("W", "Tungsten"),
    ("Re", "Rhenium"),
    ("Os", "Osmium"),
    ("Ir", "Iridium"),
    ("Pt", "Platinum"),
    ("Au", "Gold"),
    ("Hg", "Mercury"),
    ("Tl", "Thallium"),
    ("Pb", "Lead"),
    ("Bi", "Bismuth"),
    ("Po", "Polonium"),
    ("At", "Astatine"),
    ("Rn", "Radon"),
    ("Fr", "Francium"),
    ("Ra", "Radium"),
    ("Ac", "Actinium"),
    ("Th", "Thorium"),
    ("Pa", "Protactinium"),
    ("U", "Uranium"),
    ("Np", "Neptunium"),
    ("Pu", "Plutonium"),
    ("Am", "Americium"),
    ("Cm", "Curium"),
    ("Bk", "Berkelium"),
    ("Cf", "Californium"),
    ("Es", "Einsteinium"),
    ("Fm", "Fermium"),
    ("Md", "Mendelevium"),
    ("No", "Nobelium"),
    ("Lr", "Lawrencium"),
    ("Rf", "Rutherfordium"),
    ("Db", "Dubnium"),
    ("Sg", "Seaborgium"),
    ("Bh", "Bohrium"),
    ("Hs", "Hassium"),
    ("Mt", "Meitnerium"),
    ("Ds", "Darmstadtium"),
    ("Rg", "Roentgenium"),
    ("Cn", "Copernicium"),
    ("Nh", "Nihonium"),
    ("Fl", "Flerovium"),
    ("Mc", "Moscovium"),
    ("Lv", "Livermorium"),
    ("Ts", "Tennessine"),
    ("Og", "Oganesson"),];

static ATOMIC_NUMBERS: phf::Map<&'static str, u8> = phf_map! {
    "H" => 1, "He" => 2, "Li" => 3, "Be" => 4, "B" => 5, "C" => 6, "N" => 7, "O" => 8, "F" => 9,
    "Ne" => 10, "Na" => 11, "Mg" => 12, "Al" => 13, "Si" => 14, "P" => 15, "S" => 16,
    "Cl" => 17, "Ar" => 18, "K" => 19, "Ca" => 20, "Sc" => 21, "Ti" => 22, "V" => 23,
    "Cr" => 24, "Mn" => 25, "Fe" => 26, "Co" => 27, "Ni" => 28, "Cu" => 29, "Zn" => 30,
    "Ga" => 31, "Ge" => 32, "As" => 33, "Se" => 34, "Br" => 35, "Kr" => 36, "Rb" => 37,
    "Sr" => 38, "Y" => 39, "Zr" => 40, "Nb" => 41, "Mo" => 42, "Tc" => 43, "Ru" => 44,
    "Rh" => 45, "Pd" => 46, "Ag" => 47, "Cd" => 48, "In" => 49, "Sn" => 50, "Sb" => 51,
    "Te" => 52, "I" => 53, "Xe" => 54, "Cs" => 55, "Ba" => 56, "La" => 57, "Ce" => 58,
    "Pr" => 59, "Nd" => 60, "Pm" => 61, "Sm" => 62, "Eu" => 63, "Gd" => 64, "Tb" => 65,
    "Dy" => 66, "Ho" => 67, "Er" => 68, "Tm" => 69, "Yb" => 70, "Lu" => 71, "Hf" => 72,
    "Ta" => 73, "W" => 74, "Re" => 75, "Os" => 76, "Ir" => 77, "Pt" => 78, "Au" => 79,
    "Hg" => 80, "Tl" => 81, "Pb" => 82, "Bi" => 83, "Po" => 84, "At" => 85, "Rn" => 86,
    "Fr" => 87, "Ra" => 88, "Ac" => 89, "Th" => 90, "Pa" => 91, "U" => 92, "Np" => 93,
    "Pu" => 94, "Am" => 95, "Cm" => 96, "Bk" => 97, "Cf" => 98, "Es" => 99, "Fm" => 100,
    "Md" => 101, "No" => 102, "Lr" => 103, "Rf" => 104, "Db" => 105, "Sg" => 106, "Bh" => 107,
    "Hs" => 108, "Mt" => 109, "Ds" => 110, "Rg" => 111, "Cn" => 112, "Nh" => 113, "Fl" => 114,
    "Mc" => 115, "Lv" => 116, "Ts" => 117, "Og" => 118,};

/// Atomic number of an exactly-cased element symbol.
pub fn atomic_number(symbol: &str) -> Option<u8> {
    ATOMIC_NUMBERS.get(symbol).copied()
}

/// Symbol of the element with atomic number `z`.
pub fn symbol(z: u8) -> Option<&'static str> {
    ELEMENTS.get(usize::from(z).checked_sub(1)?).map(|(symbol, _)| *symbol)
}

/// Full name of the element with atomic number `z`.
pub fn name(z: u8) -> Option<&'static str> {
    ELEMENTS.get(usize::from(z).checked_sub(1)?).map(|(_, name)| *name)
}

/// Turn user or file input such as `fe` or ` FE ` into the canonical symbol
/// `Fe`. Atomic numbers are not symbols and are rejected.
pub fn normalize_symbol(raw: &str) -> Result<&'static str, Error> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return Err(Error::EmptyElement);
    }

    let mut chars = cleaned.chars();
    let normalized: String = chars
        .next()
        .into_iter()
        .flat_map(char::to_uppercase)
        .chain(chars.flat_map(char::to_lowercase))
        .collect();

    ATOMIC_NUMBERS
        .get_entry(normalized.as_str())
        .map(|(symbol, _)| *symbol)
        .ok_or_else(|| Error::InvalidElement(raw.to_string()))
}

/// Grid position `(row, column)` of element `z`, both 1-based.
///
/// Rows 1 to 7 are the periods and columns the groups. The lanthanides and
/// actinides are pulled out of periods 6 and 7 into rows 9 and 10, columns 3
/// to 17, leaving row 8 empty as a gap.
pub fn layout_position(z: u8) -> Option<(u8, u8)> {
    let position = match z {
        1 => (1, 1),
        2 => (1, 18),
        3..=4 => (2, z - 2),
        5..=10 => (2, z + 8),
        11..=12 => (3, z - 10),
        13..=18 => (3, z),
        19..=36 => (4, z - 18),
        37..=54 => (5, z - 36),
        55..=56 => (6, z - 54),
        57..=71 => (9, z - 54),
        72..=86 => (6, z - 68),
        87..=88 => (7, z - 86),
        89..=103 => (10, z - 86),
        104..=118 => (7, z - 100),
        _ => return None,
    };
    Some(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_and_map_agree() {
        for (i, (symbol, _)) in ELEMENTS.iter().enumerate() {
            assert_eq!(atomic_number(symbol), Some(i as u8 + 1), "{symbol}");
        }
        assert_eq!(ATOMIC_NUMBERS.len(), ELEMENTS.len());
    }

    #[test]
    fn normalize() {
        assert_eq!(normalize_symbol("fe").unwrap(), "Fe");
        assert_eq!(normalize_symbol(" FE ").unwrap(), "Fe");
        assert_eq!(normalize_symbol("o").unwrap(), "O");
        assert_eq!(normalize_symbol("Og").unwrap(), "Og");

        let err = normalize_symbol("Xx").unwrap_err();
        assert_eq!(err.to_string(), "Invalid element symbol: Xx");
        let err = normalize_symbol("  ").unwrap_err();
        assert_eq!(err.to_string(), "Element symbol cannot be empty.");
        let err = normalize_symbol("8").unwrap_err();
        assert_eq!(err.to_string(), "Invalid element symbol: 8");
        assert!(normalize_symbol("119").is_err());
    }

    #[test]
    fn names() {
        assert_eq!(name(26), Some("Iron"));
        assert_eq!(symbol(118), Some("Og"));
        assert_eq!(symbol(0), None);
        assert_eq!(name(119), None);
    }

    #[test]
    fn layout_is_a_proper_grid() {
        let mut seen = std::collections::HashSet::new();
        for z in 1..=MAX_ATOMIC_NUMBER {
            let (row, column) = layout_position(z).unwrap();
            assert!((1..=LAYOUT_ROWS).contains(&row), "row of {z}");
            assert!((1..=LAYOUT_COLUMNS).contains(&column), "column of {z}");
            assert_ne!(row, 8, "spacer row used by {z}");
            assert!(seen.insert((row, column)), "{z} overlaps another element");
        }
        assert_eq!(layout_position(26), Some((4, 8)));
        assert_eq!(layout_position(57), Some((9, 3)));
        assert_eq!(layout_position(71), Some((9, 17)));
        assert_eq!(layout_position(72), Some((6, 4)));
        assert_eq!(layout_position(103), Some((10, 17)));
        assert_eq!(layout_position(118), Some((7, 18)));
        assert_eq!(layout_position(0), None);
    }
}
