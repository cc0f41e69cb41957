use crate::atom::Atom;
use crate::element::{normalize_symbol, symbol};
use crate::error::Error;
use crate::extendedxyzparser::ExtendedXyzParser;
use crate::format::{FileFormat, FrameSpan};
use crate::frame::Frame;
use crate::property::{Property, PropertyKind};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek};

/// Plain and extended XYZ reader.
pub struct XYZFormat;

const FORMAT: &str = "XYZ";

/// Column layout used when the comment line has no `Properties` key.
const DEFAULT_PROPERTIES: &str = "species:S:1:pos:R:3";

/// One entry of the `Properties=name:type:count:...` list.
#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    kind: ColumnKind,
    count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Real,
    Integer,
    String,
    Logical,
}

impl ColumnKind {
    fn property_kind(self) -> PropertyKind {
        match self {
            ColumnKind::Real => PropertyKind::Double,
            ColumnKind::Integer => PropertyKind::Integer,
            ColumnKind::String => PropertyKind::String,
            ColumnKind::Logical => PropertyKind::Bool,
        }
    }
}

fn invalid(line: usize, reason: impl Into<String>) -> Error {
    Error::InvalidLine {
        format: FORMAT.to_string(),
        line,
        reason: reason.into(),
    }
}

/// Reads one line into `buf`, returning `false` at end of file.
fn next_line(reader: &mut BufReader<File>, buf: &mut String) -> Result<bool, Error> {
    buf.clear();
    Ok(reader.read_line(buf)? != 0)
}

/// Skips blank lines and parses the atom count. Returns `None` at end of file
/// together with the number of lines consumed.
fn read_atom_count(
    reader: &mut BufReader<File>,
    buf: &mut String,
    first_line: usize,
) -> Result<(Option<usize>, usize), Error> {
    let mut consumed = 0;
    loop {
        if !next_line(reader, buf)? {
            return Ok((None, consumed));
        }
        consumed += 1;
        let trimmed = buf.trim();
        if trimmed.is_empty() {
            continue;
        }
        let n_atoms = trimmed.parse::<usize>().map_err(|_| {
            invalid(
                first_line + consumed - 1,
                format!("expected the number of atoms, got '{trimmed}'"),
            )
        })?;
        return Ok((Some(n_atoms), consumed));
    }
}

impl XYZFormat {
    fn parse_property_list(value: &str, line: usize) -> Result<Vec<Column>, Error> {
        let fields: Vec<&str> = value.split(':').collect();
        if fields.len() % 3 != 0 {
            return Err(invalid(
                line,
                "Invalid property list format: property definitions must be in groups of 3 (name:type:count)",
            ));
        }

        fields
            .chunks_exact(3)
            .map(|chunk| {
                let kind = match chunk[1] {
                    "R" => ColumnKind::Real,
                    "I" => ColumnKind::Integer,
                    "S" => ColumnKind::String,
                    "L" => ColumnKind::Logical,
                    unknown => {
                        return Err(invalid(line, format!("Unknown property type: {unknown}")))
                    }
                };
                let count = chunk[2].parse::<usize>().map_err(|e| {
                    invalid(line, format!("Invalid property count '{}': {e}", chunk[2]))
                })?;
                if count == 0 {
                    return Err(invalid(
                        line,
                        format!("Invalid count of 0 for property '{}'", chunk[0]),
                    ));
                }
                Ok(Column {
                    name: chunk[0].to_string(),
                    kind,
                    count,
                })
            })
            .collect()
    }

    /// Parses the comment line, storing frame-level properties in `frame`,
    /// and returns the per-atom column layout. The lattice is checked but
    /// not kept.
    fn read_comment_line(
        comment: &str,
        line: usize,
        frame: &mut Frame,
    ) -> Result<Vec<Column>, Error> {
        if !comment.contains('=') {
            return Self::parse_property_list(DEFAULT_PROPERTIES, line);
        }

        let properties = ExtendedXyzParser::new(comment)
            .parse()
            .map_err(|e| invalid(line, e.to_string()))?;

        for (k, v) in properties
            .iter()
            .filter(|(k, _)| k.as_str() != "Lattice" && k.as_str() != "Properties")
        {
            frame.properties.insert(k.clone(), Property::guess(v));
        }

        if let Some(lattice) = properties.get("Lattice") {
            Property::parse_value(lattice, PropertyKind::Matrix3x3)
                .map_err(|e| invalid(line, format!("invalid Lattice: {e}")))?;
        }

        let columns = match properties.get("Properties") {
            Some(list) => Self::parse_property_list(list, line)?,
            None => Self::parse_property_list(DEFAULT_PROPERTIES, line)?,
        };
        if !columns
            .iter()
            .any(|c| {
                matches!(
                    (c.name.as_str(), c.kind, c.count),
                    ("species", ColumnKind::String, 1) | ("Z", ColumnKind::Integer, 1)
                )
            })
        {
            return Err(invalid(
                line,
                "Properties must contain a 'species' (S) or 'Z' (I) column",
            ));
        }
        Ok(columns)
    }

    fn read_atom(columns: &[Column], text: &str, line: usize) -> Result<Atom, Error> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let expected: usize = columns.iter().map(|c| c.count).sum();
        if tokens.len() < expected {
            return Err(invalid(
                line,
                format!("expected {expected} columns, found {}", tokens.len()),
            ));
        }

        let mut atom = Atom::default();
        let mut offset = 0;
        for column in columns {
            let values = &tokens[offset..offset + column.count];
            offset += column.count;

            match (column.name.as_str(), column.kind, column.count) {
                ("species", ColumnKind::String, 1) => {
                    atom.symbol =
                        normalize_symbol(values[0]).map_err(|e| invalid(line, e.to_string()))?;
                }
                ("Z", ColumnKind::Integer, 1) if atom.symbol.is_empty() => {
                    atom.symbol = values[0]
                        .parse::<u8>()
                        .ok()
                        .and_then(symbol)
                        .ok_or_else(|| {
                            invalid(line, format!("Invalid atomic number: {}", values[0]))
                        })?;
                }
                ("pos", ColumnKind::Real, 3) => {
                    for (slot, value) in atom.position.iter_mut().zip(values) {
                        *slot = value.parse::<f64>().map_err(|e| {
                            invalid(line, format!("Failed to parse position '{value}': {e}"))
                        })?;
                    }
                }
                // other columns only need to hold values of their type
                (_, kind, _) => {
                    for value in values {
                        Property::parse_value(value, kind.property_kind())
                            .map_err(|e| invalid(line, e.to_string()))?;
                    }
                }
            }
        }

        Ok(atom)
    }
}

impl FileFormat for XYZFormat {
    fn read_next(&self, reader: &mut BufReader<File>, first_line: usize) -> Result<Frame, Error> {
        let mut buf = String::new();
        let (n_atoms, mut consumed) = read_atom_count(reader, &mut buf, first_line)?;
        let n_atoms = n_atoms.ok_or(Error::UnexpectedEof {
            format: FORMAT.to_string(),
            line: first_line,
            expected: 1,
            got: 0,
        })?;
        let count_line = first_line + consumed - 1;
        let eof = |got: usize| Error::UnexpectedEof {
            format: FORMAT.to_string(),
            line: count_line,
            expected: n_atoms + 2,
            got,
        };

        let mut frame = Frame::new();
        if !next_line(reader, &mut buf)? {
            return Err(eof(1));
        }
        consumed += 1;
        let columns = Self::read_comment_line(buf.trim(), count_line + 1, &mut frame)?;

        for i in 0..n_atoms {
            if !next_line(reader, &mut buf)? {
                return Err(eof(i + 2));
            }
            consumed += 1;
            let atom = Self::read_atom(&columns, &buf, first_line + consumed - 1)?;
            frame.add_atom(atom);
        }

        Ok(frame)
    }

    fn forward(
        &self,
        reader: &mut BufReader<File>,
        first_line: usize,
    ) -> Result<Option<FrameSpan>, Error> {
        let mut buf = String::new();
        let (n_atoms, mut consumed) = read_atom_count(reader, &mut buf, first_line)?;
        let Some(n_atoms) = n_atoms else {
            return Ok(None);
        };
        let count_line = first_line + consumed - 1;

        for i in 0..=n_atoms {
            if !next_line(reader, &mut buf)? {
                return Err(Error::UnexpectedEof {
                    format: FORMAT.to_string(),
                    line: count_line,
                    expected: n_atoms + 2,
                    got: i + 1,
                });
            }
            consumed += 1;
        }

        Ok(Some(FrameSpan {
            end: reader.stream_position()?,
            lines: consumed,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::trajectory::Trajectory;
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn check_nsteps() {
        let trajectory = Trajectory::open(Path::new("./src/tests-data/xyz/water.xyz")).unwrap();
        assert_eq!(trajectory.size(), 1);

        let trajectory =
            Trajectory::open(Path::new("./src/tests-data/xyz/structures.extxyz")).unwrap();
        assert_eq!(trajectory.size(), 4);
    }

    #[test]
    fn plain_xyz() {
        let mut trajectory = Trajectory::open(Path::new("./src/tests-data/xyz/water.xyz")).unwrap();
        let frame = trajectory.read().unwrap().unwrap();
        assert_eq!(frame.size(), 3);
        assert_eq!(frame.symbols().collect::<Vec<_>>(), ["O", "H", "H"]);
        assert_approx_eq!(frame[1].position[0], 0.757);
        assert!(frame.properties.is_empty());
    }

    #[test]
    fn extended_xyz() {
        let mut trajectory =
            Trajectory::open(Path::new("./src/tests-data/xyz/structures.extxyz")).unwrap();

        let frame = trajectory.read_at(0).unwrap();
        assert_eq!(frame.size(), 2);
        assert_eq!(frame.structure_name().as_deref(), Some("Si_bulk"));
        assert_eq!(frame.properties["energy"], Property::Double(-10.8));
        assert_eq!(frame.properties["pbc"], Property::String("T T T".into()));
        assert!(!frame.properties.contains_key("Lattice"));
        assert_approx_eq!(frame[1].position[2], 1.3575);

        let frame = trajectory.read_at(2).unwrap();
        assert_eq!(frame.symbols().collect::<Vec<_>>(), ["Ga", "As"]);
        assert_eq!(frame.structure_name().as_deref(), Some("GaAs"));

        let frame = trajectory.read_at(3).unwrap();
        assert_eq!(frame.symbols().collect::<Vec<_>>(), ["Fe", "O", "O", "O"]);
        assert_eq!(frame.properties["structure_name"], Property::Integer(12));
        assert_eq!(frame.structure_name().as_deref(), Some("12"));
    }

    #[test]
    fn atomic_numbers_column() {
        let mut trajectory =
            Trajectory::open(Path::new("./src/tests-data/xyz/numbers.extxyz")).unwrap();
        let frame = trajectory.read().unwrap().unwrap();
        assert_eq!(frame.symbols().collect::<Vec<_>>(), ["C", "O"]);
    }

    #[test]
    fn truncated_file() {
        let err = Trajectory::open(Path::new("./src/tests-data/xyz/truncated.xyz"))
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "XYZ format: not enough lines in the frame starting at line 6 (expected 5, got 3)"
        );
    }

    macro_rules! assert_read_at_fails {
        ($index:expr, $message:expr) => {
            let path = Path::new(BAD_EXTENDED);
            let mut trajectory = Trajectory::open(path).unwrap();
            let err = trajectory.read_at($index).unwrap_err();
            assert!(
                err.to_string().contains($message),
                "unexpected error: {err}"
            );
        };
    }

    const BAD_EXTENDED: &str = "./src/tests-data/xyz/bad_extended.xyz";

    #[test]
    fn read_bad_files() {
        assert_read_at_fails!(0, "line 3: expected 7 columns, found 6");
        assert_read_at_fails!(1, "line 7: Failed to parse number");
        assert_read_at_fails!(2, "line 10: Invalid element symbol: Qq");
        assert_read_at_fails!(3, "line 12: Unknown property type: Q");
        assert_read_at_fails!(4, "line 16: Invalid boolean value: ok");
        assert_read_at_fails!(5, "line 18: invalid Lattice");
        assert_read_at_fails!(6, "line 22: Failed to parse position");
    }
}
