// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2025 William Bro-Jørgensen
// Copyright (c) 2020 Guillaume Fraux and contributors
//
// See LICENSE at the project root for full text.

use crate::error::Error;
use crate::formats::pdb::PDBFormat;
use crate::formats::xyz::XYZFormat;
use crate::frame::Frame;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Supported text-based structure file formats.
///
/// - `XYZ`: plain and extended XYZ.
/// - `PDB`: Protein Data Bank format.
/// - `Guess`: autodetect format from file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFormat {
    /// XYZ and extended XYZ file format.
    XYZ,
    /// PDB file format.
    PDB,
    /// Automatically detect format from file extension.
    Guess,
}

impl TextFormat {
    /// Format named by the extension of `path`, `None` if it is not a
    /// structure format this crate reads.
    pub fn from_extension(path: &Path) -> Option<TextFormat> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match ext.to_lowercase().as_str() {
            "xyz" | "extxyz" => Some(TextFormat::XYZ),
            "pdb" | "ent" => Some(TextFormat::PDB),
            _ => None,
        }
    }
}

/// Where a frame ends, as found by [`FileFormat::forward`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSpan {
    /// Byte offset just past the frame.
    pub end: u64,
    /// Number of lines the frame occupies.
    pub lines: usize,
}

/// Concrete file format strategy for reading trajectory data.
pub enum Format {
    /// Handler for the XYZ format.
    XYZ(XYZFormat),
    /// Handler for the PDB format.
    PDB(PDBFormat),
}

impl Format {
    /// Creates a new [`Format`] by inferring the format from the provided file `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file extension is unrecognized.
    pub fn new(path: &Path) -> Result<Self, Error> {
        match TextFormat::from_extension(path) {
            Some(fmt) => Self::new_from_format(fmt, path),
            None => Err(Error::UnsupportedFileFormat(
                path.extension()
                    .map(|ext| ext.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            )),
        }
    }

    /// Creates a new `Format` using the specified `TextFormat` and file `path`.
    ///
    /// `TextFormat::Guess` delegates to [`Format::new`].
    pub fn new_from_format(fmt: TextFormat, path: &Path) -> Result<Self, Error> {
        match fmt {
            TextFormat::XYZ => Ok(Format::XYZ(XYZFormat)),
            TextFormat::PDB => Ok(Format::PDB(PDBFormat)),
            TextFormat::Guess => Self::new(path),
        }
    }
}

/// Common interface for reading trajectory file formats.
///
/// `first_line` is the 1-based line number at which the reader is positioned,
/// used for error messages only.
pub trait FileFormat {
    /// Reads the next [`Frame`] from `reader`.
    ///
    /// # Errors
    /// Returns an error if reading or parsing the frame fails.
    fn read_next(&self, reader: &mut BufReader<File>, first_line: usize)
        -> Result<Frame, Error>;

    /// Advances past the next frame in `reader` without parsing atoms,
    /// returning `None` when no frame is left.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs or the frame is truncated.
    fn forward(
        &self,
        reader: &mut BufReader<File>,
        first_line: usize,
    ) -> Result<Option<FrameSpan>, Error>;
}

impl FileFormat for Format {
    fn read_next(
        &self,
        reader: &mut BufReader<File>,
        first_line: usize,
    ) -> Result<Frame, Error> {
        match self {
            Format::XYZ(format) => format.read_next(reader, first_line),
            Format::PDB(format) => format.read_next(reader, first_line),
        }
    }

    fn forward(
        &self,
        reader: &mut BufReader<File>,
        first_line: usize,
    ) -> Result<Option<FrameSpan>, Error> {
        match self {
            Format::XYZ(format) => format.forward(reader, first_line),
            Format::PDB(format) => format.forward(reader, first_line),
        }
    }
}
