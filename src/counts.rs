//! Per-element tallies over the frames of a structure file.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use log::{debug, info};

use crate::element::{atomic_number, normalize_symbol};
use crate::error::Error;
use crate::frame::Frame;
use crate::trajectory::{FrameSelection, Trajectory};

/// How many times each element occurs, kept in atomic-number order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementCounts(BTreeMap<u8, (&'static str, u64)>);

impl ElementCounts {
    pub fn new() -> Self {
        ElementCounts::default()
    }

    /// Adds `n` occurrences of `symbol`, which must be a canonical symbol.
    pub fn add(&mut self, symbol: &'static str, n: u64) {
        // symbols reaching here went through normalize_symbol
        let Some(z) = atomic_number(symbol) else {
            return;
        };
        self.0.entry(z).or_insert((symbol, 0)).1 += n;
    }

    /// Count of `symbol`, zero when it never occurred.
    pub fn get(&self, symbol: &str) -> u64 {
        atomic_number(symbol)
            .and_then(|z| self.0.get(&z))
            .map_or(0, |&(_, n)| n)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn max(&self) -> Option<u64> {
        self.0.values().map(|&(_, n)| n).max()
    }

    pub fn total(&self) -> u64 {
        self.0.values().map(|&(_, n)| n).sum()
    }

    /// `(symbol, count)` pairs in atomic-number order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.0.values().copied()
    }
}

impl FromIterator<(&'static str, u64)> for ElementCounts {
    fn from_iter<T: IntoIterator<Item = (&'static str, u64)>>(iter: T) -> Self {
        let mut counts = ElementCounts::new();
        for (symbol, n) in iter {
            counts.add(symbol, n);
        }
        counts
    }
}

/// Result of counting a structure file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameTally {
    pub counts: ElementCounts,
    /// Frames read from the file with the requested selection.
    pub total_frames: usize,
    /// Frames that contributed to `counts`.
    pub counted_frames: usize,
}

/// Parses `--exclude-elements` values. Every value may hold several
/// comma-separated symbols; the result keeps first occurrences in order.
pub fn parse_exclude_elements(raw_values: &[String]) -> Result<Vec<&'static str>, Error> {
    let mut parsed = Vec::new();
    let mut seen = HashSet::new();
    for raw in raw_values {
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let symbol = normalize_symbol(token)?;
            if seen.insert(symbol) {
                parsed.push(symbol);
            }
        }
    }
    Ok(parsed)
}

/// `exclude` as a comma-separated list in atomic-number order.
pub fn describe_excluded(exclude: &[&'static str]) -> String {
    let mut sorted = exclude.to_vec();
    sorted.sort_by_key(|symbol| atomic_number(symbol));
    sorted.join(", ")
}

/// Keeps the first frame of every distinct `structure_name`, in input order.
///
/// Every frame must carry a non-blank name; the error lists (at most ten of)
/// the offending frame indices.
pub fn unique_frames_by_structure_name(frames: Vec<Frame>, path: &Path) -> Result<Vec<Frame>, Error> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    let mut missing = Vec::new();

    for (index, frame) in frames.into_iter().enumerate() {
        match frame.structure_name() {
            None => missing.push(index),
            Some(name) => {
                if seen.insert(name) {
                    unique.push(frame);
                }
            }
        }
    }

    if !missing.is_empty() {
        let preview = missing
            .iter()
            .take(10)
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let suffix = if missing.len() > 10 { " ..." } else { "" };
        return Err(Error::InvalidOption(format!(
            "--unique-structure requires non-empty info['structure_name'] in every frame. \
             Missing at frame indices: {preview}{suffix} (file: {}).",
            path.display()
        )));
    }

    Ok(unique)
}

/// Tallies element symbols over `frames`, skipping the `exclude`d ones.
pub fn count_frames(frames: &[Frame], exclude: &[&'static str]) -> ElementCounts {
    let mut counts = ElementCounts::new();
    for symbol in frames.iter().flat_map(Frame::symbols) {
        if !exclude.contains(&symbol) {
            counts.add(symbol, 1);
        }
    }
    counts
}

/// Reads the selected frames of a structure file and counts their elements.
pub fn element_counts_from_structure(
    path: &Path,
    selection: FrameSelection,
    unique_structure: bool,
    exclude: &[&'static str],
) -> Result<FrameTally, Error> {
    let mut trajectory = Trajectory::open(path)?;
    let mut frames = trajectory.select(selection)?;
    let total_frames = frames.len();

    if unique_structure && total_frames > 1 {
        frames = unique_frames_by_structure_name(frames, path)?;
        debug!(
            "{} unique structure(s) among {total_frames} frames",
            frames.len()
        );
    }
    let counted_frames = frames.len();

    let counts = count_frames(&frames, exclude);
    if counts.is_empty() {
        if !exclude.is_empty() {
            return Err(Error::GenericError(format!(
                "No atoms left after excluding elements ({}) in '{}'.",
                describe_excluded(exclude),
                path.display()
            )));
        }
        return Err(Error::GenericError(format!(
            "No atoms found in '{}'.",
            path.display()
        )));
    }
    info!(
        "counted {} atoms of {} element(s) in {counted_frames} frame(s)",
        counts.total(),
        counts.len()
    );

    Ok(FrameTally {
        counts,
        total_frames,
        counted_frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRUCTURES: &str = "./src/tests-data/xyz/structures.extxyz";

    #[test]
    fn counts_are_ordered_by_atomic_number() {
        let counts: ElementCounts = [("O", 2), ("H", 4), ("Fe", 1), ("H", 1)].into_iter().collect();
        assert_eq!(counts.iter().collect::<Vec<_>>(), [("H", 5), ("O", 2), ("Fe", 1)]);
        assert_eq!(counts.get("H"), 5);
        assert_eq!(counts.get("Cu"), 0);
        assert_eq!(counts.max(), Some(5));
        assert_eq!(counts.total(), 8);
    }

    #[test]
    fn exclude_elements() {
        let raw = vec!["h,O".to_string(), " fe ".to_string(), "H".to_string(), ",".to_string()];
        assert_eq!(parse_exclude_elements(&raw).unwrap(), ["H", "O", "Fe"]);
        assert!(parse_exclude_elements(&[]).unwrap().is_empty());

        let err = parse_exclude_elements(&["H,Xy".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid element symbol: Xy");

        assert_eq!(describe_excluded(&["O", "Fe", "H"]), "H, O, Fe");
    }

    #[test]
    fn all_frames() {
        let tally =
            element_counts_from_structure(Path::new(STRUCTURES), FrameSelection::All, false, &[])
                .unwrap();
        assert_eq!(tally.total_frames, 4);
        assert_eq!(tally.counted_frames, 4);
        assert_eq!(
            tally.counts.iter().collect::<Vec<_>>(),
            [("O", 3), ("Si", 4), ("Fe", 1), ("Ga", 1), ("As", 1)]
        );
    }

    #[test]
    fn unique_structures() {
        let tally =
            element_counts_from_structure(Path::new(STRUCTURES), FrameSelection::All, true, &[])
                .unwrap();
        assert_eq!(tally.total_frames, 4);
        assert_eq!(tally.counted_frames, 3);
        assert_eq!(tally.counts.get("Si"), 2);
        assert_eq!(tally.counts.get("O"), 3);
    }

    #[test]
    fn numeric_structure_names_key_by_type() {
        // 12 and 12.0 are different structures, 1e1 and 10.0 are the same one
        let tally = element_counts_from_structure(
            Path::new("./src/tests-data/xyz/numeric_names.extxyz"),
            FrameSelection::All,
            true,
            &[],
        )
        .unwrap();
        assert_eq!((tally.total_frames, tally.counted_frames), (4, 3));
        assert_eq!(
            tally.counts.iter().collect::<Vec<_>>(),
            [("H", 1), ("C", 1), ("O", 1)]
        );
    }

    #[test]
    fn single_frame_skips_deduplication() {
        // water.xyz has no structure_name, which only matters with several frames
        let tally = element_counts_from_structure(
            Path::new("./src/tests-data/xyz/water.xyz"),
            FrameSelection::All,
            true,
            &[],
        )
        .unwrap();
        assert_eq!((tally.total_frames, tally.counted_frames), (1, 1));
        assert_eq!(tally.counts.get("H"), 2);

        let tally =
            element_counts_from_structure(Path::new(STRUCTURES), FrameSelection::Index(1), true, &[])
                .unwrap();
        assert_eq!((tally.total_frames, tally.counted_frames), (1, 1));
        assert_eq!(tally.counts.iter().collect::<Vec<_>>(), [("Si", 2)]);
    }

    #[test]
    fn missing_structure_names() {
        let err = element_counts_from_structure(
            Path::new("./src/tests-data/xyz/unnamed.extxyz"),
            FrameSelection::All,
            true,
            &[],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "--unique-structure requires non-empty info['structure_name'] in every frame. \
             Missing at frame indices: 1, 2 (file: ./src/tests-data/xyz/unnamed.extxyz)."
        );
    }

    #[test]
    fn missing_names_preview_is_capped() {
        let frames = vec![Frame::new(); 12];
        let err = unique_frames_by_structure_name(frames, Path::new("many.xyz")).unwrap_err();
        assert!(err
            .to_string()
            .contains("Missing at frame indices: 0, 1, 2, 3, 4, 5, 6, 7, 8, 9 ... (file: many.xyz)."));
    }

    #[test]
    fn exclusion_can_empty_the_tally() {
        let err = element_counts_from_structure(
            Path::new("./src/tests-data/xyz/water.xyz"),
            FrameSelection::All,
            false,
            &["O", "H"],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No atoms left after excluding elements (H, O) in './src/tests-data/xyz/water.xyz'."
        );

        let tally = element_counts_from_structure(
            Path::new("./src/tests-data/xyz/water.xyz"),
            FrameSelection::All,
            false,
            &["H"],
        )
        .unwrap();
        assert_eq!(tally.counts.iter().collect::<Vec<_>>(), [("O", 1)]);
    }

    #[test]
    fn empty_structure() {
        let err = element_counts_from_structure(
            Path::new("./src/tests-data/xyz/empty_frame.xyz"),
            FrameSelection::All,
            false,
            &[],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No atoms found in './src/tests-data/xyz/empty_frame.xyz'."
        );
    }
}
