use crate::atom::Atom;
use crate::element::normalize_symbol;
use crate::error::Error;
use crate::format::{FileFormat, FrameSpan};
use crate::frame::Frame;
use crate::property::Property;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek};

/// PDB reader. Only the records needed to know which atoms a model contains
/// are interpreted; everything else is skipped.
pub struct PDBFormat;

const FORMAT: &str = "PDB";

#[derive(Debug, PartialEq, Eq)]
pub enum Record {
    HEADER,
    TITLE,
    ATOM,
    HETATM,
    // Beginning of model
    MODEL,
    // End of model
    ENDMDL,
    // End of file
    END,
    // Records that carry nothing we need
    IGNORED_,
    // Unknown record type
    UNKNOWN_,
}

pub fn get_record(line: &str) -> Record {
    let rec = line.get(..6).unwrap_or(line);

    match rec {
        "ENDMDL" => Record::ENDMDL,
        _ if rec.starts_with("END") => Record::END,
        "ATOM  " => Record::ATOM,
        "HETATM" => Record::HETATM,
        _ if rec.starts_with("MODEL") => Record::MODEL,
        "HEADER" => Record::HEADER,
        "TITLE " => Record::TITLE,
        _ if rec.starts_with("TER") => Record::IGNORED_,
        "REMARK" | "CRYST1" | "MASTER" | "AUTHOR" | "CAVEAT" | "COMPND" | "EXPDTA" | "KEYWDS" | "OBSLTE"
        | "SOURCE" | "SPLIT " | "SPRSDE" | "JRNL  " | "SEQRES" | "HET   " | "REVDAT" | "SCALE1"
        | "SCALE2" | "SCALE3" | "ORIGX1" | "ORIGX2" | "ORIGX3" | "ANISOU" | "SITE  " | "FORMUL"
        | "DBREF " | "HETNAM" | "HETSYN" | "SSBOND" | "LINK  " | "SEQADV" | "MODRES" | "CISPEP"
        | "CONECT" | "HELIX " | "SHEET " | "TURN  " | "NUMMDL" | "MDLTYP" | "SPLT  " => {
            Record::IGNORED_
        }
        _ if line.trim().is_empty() => Record::IGNORED_,
        _ => Record::UNKNOWN_,
    }
}

fn invalid(line: usize, reason: impl Into<String>) -> Error {
    Error::InvalidLine {
        format: FORMAT.to_string(),
        line,
        reason: reason.into(),
    }
}

/// Fixed-column field, trimmed. Short lines yield an empty string.
fn field(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start.min(end)..end).unwrap_or("").trim()
}

fn parse_coordinate(line: &str, start: usize, number: usize) -> Result<f64, Error> {
    let text = field(line, start, start + 8);
    text.parse::<f64>()
        .map_err(|e| invalid(number, format!("Failed to parse coordinate '{text}': {e}")))
}

impl PDBFormat {
    /// Element of an ATOM/HETATM record: columns 77-78 when present, else
    /// guessed from the atom name in columns 13-16.
    fn element(line: &str, number: usize) -> Result<&'static str, Error> {
        let explicit = field(line, 76, 78);
        if !explicit.is_empty() {
            return normalize_symbol(explicit).map_err(|e| invalid(number, e.to_string()));
        }

        let name = line.get(12..16).unwrap_or("");
        let letters: String = name.chars().filter(char::is_ascii_alphabetic).collect();
        // Two-letter elements start in column 13, single-letter ones in 14.
        // Four-character hydrogen names (HG21) also start in column 13.
        let two_letters = name.starts_with(|c: char| c.is_ascii_alphabetic())
            && !(name.trim().len() == 4 && name.starts_with('H'));
        let guess = if two_letters {
            letters
                .get(..2)
                .and_then(|two| normalize_symbol(two).ok())
                .or_else(|| letters.get(..1).and_then(|one| normalize_symbol(one).ok()))
        } else {
            letters.get(..1).and_then(|one| normalize_symbol(one).ok())
        };
        let symbol = guess.ok_or_else(|| {
            invalid(
                number,
                format!("could not determine the element of atom '{}'", name.trim()),
            )
        })?;
        debug!("line {number}: guessed element {symbol} from atom name '{}'", name.trim());
        Ok(symbol)
    }

    fn parse_atom(frame: &mut Frame, line: &str, number: usize) -> Result<(), Error> {
        if line.len() < 54 {
            return Err(invalid(number, "ATOM/HETATM record is too short"));
        }

        frame.add_atom(Atom::new(
            Self::element(line, number)?,
            [
                parse_coordinate(line, 30, number)?,
                parse_coordinate(line, 38, number)?,
                parse_coordinate(line, 46, number)?,
            ],
        ));
        Ok(())
    }

    fn append_text(frame: &mut Frame, key: &str, text: &str) {
        if text.is_empty() {
            return;
        }
        let joined = match frame.properties.get(key).and_then(Property::as_string) {
            Some(previous) => format!("{previous} {text}"),
            None => text.to_string(),
        };
        frame.properties.insert(key.to_string(), Property::String(joined));
    }
}

impl FileFormat for PDBFormat {
    fn read_next(&self, reader: &mut BufReader<File>, first_line: usize) -> Result<Frame, Error> {
        let mut frame = Frame::new();
        let mut line = String::new();
        let mut number = first_line;

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            let text = line.trim_end_matches(['\n', '\r']);

            match get_record(text) {
                Record::ATOM | Record::HETATM => Self::parse_atom(&mut frame, text, number)?,
                Record::HEADER => {
                    Self::append_text(&mut frame, "classification", field(text, 10, 50));
                    Self::append_text(&mut frame, "pdb_idcode", field(text, 62, 66));
                }
                Record::TITLE => Self::append_text(&mut frame, "name", field(text, 10, 80)),
                Record::MODEL => {
                    let model = field(text, 10, 14);
                    if !model.is_empty() {
                        frame
                            .properties
                            .insert("model".to_string(), Property::guess(model));
                    }
                }
                Record::ENDMDL | Record::END if frame.size() > 0 => break,
                Record::ENDMDL | Record::END | Record::IGNORED_ => {}
                Record::UNKNOWN_ => {
                    warn!("line {number}: ignoring unknown PDB record '{}'", field(text, 0, 6));
                }
            }
            number += 1;
        }

        if frame.size() == 0 {
            return Err(Error::UnexpectedEof {
                format: FORMAT.to_string(),
                line: first_line,
                expected: 1,
                got: 0,
            });
        }
        Ok(frame)
    }

    fn forward(
        &self,
        reader: &mut BufReader<File>,
        _first_line: usize,
    ) -> Result<Option<FrameSpan>, Error> {
        let mut buf = Vec::with_capacity(128);
        let mut lines = 0;
        let mut has_atoms = false;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            lines += 1;
            let line = String::from_utf8_lossy(&buf);
            match get_record(&line) {
                Record::ATOM | Record::HETATM => has_atoms = true,
                Record::ENDMDL | Record::END if has_atoms => break,
                _ => {}
            }
        }

        if !has_atoms {
            return Ok(None);
        }
        Ok(Some(FrameSpan {
            end: reader.stream_position()?,
            lines,
        }))
    }
}
