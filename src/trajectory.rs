use crate::error::Error;
use crate::format::{FileFormat, Format, TextFormat};
use crate::frame::Frame;
use log::debug;
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

/// Which frames of a trajectory to read: every frame or a single index.
/// Negative indices count from the end, `-1` being the last frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FrameSelection {
    #[default]
    All,
    Index(i64),
}

impl std::str::FromStr for FrameSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(FrameSelection::All);
        }
        s.trim()
            .parse::<i64>()
            .map(FrameSelection::Index)
            .map_err(|_| Error::InvalidOption("--frame must be an integer or 'all'.".to_string()))
    }
}

/// A structure file opened for reading, frame by frame.
pub struct Trajectory {
    strategy: Format,
    reader: BufReader<File>,
    /// Byte offset and first line number of every frame.
    frame_positions: Vec<(u64, usize)>,
    /// Index of the frame [`Trajectory::read`] returns next.
    step: usize,
}

impl Trajectory {
    /// Opens `path`, guessing the format from its extension.
    pub fn open(path: &Path) -> Result<Self, Error> {
        Self::with_format(path, TextFormat::Guess)
    }

    /// Opens `path` with an explicitly provided format.
    pub fn with_format(path: &Path, fmt: TextFormat) -> Result<Self, Error> {
        let strategy = Format::new_from_format(fmt, path)?;

        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let frame_positions = Trajectory::scan_all(&mut reader, &strategy)?;
        debug!("{}: {} frame(s)", path.display(), frame_positions.len());

        Ok(Trajectory {
            strategy,
            reader,
            frame_positions,
            step: 0,
        })
    }

    /// Number of frames in the file.
    pub fn size(&self) -> usize {
        self.frame_positions.len()
    }

    /// Reads the next frame, `None` once every frame has been read.
    pub fn read(&mut self) -> Result<Option<Frame>, Error> {
        if self.step >= self.size() {
            return Ok(None);
        }
        let frame = self.read_at(self.step)?;
        Ok(Some(frame))
    }

    /// Reads the frame at `index`. The next call to [`Trajectory::read`]
    /// returns the frame after it.
    pub fn read_at(&mut self, index: usize) -> Result<Frame, Error> {
        let &(offset, line) = self.frame_positions.get(index).ok_or(Error::FrameOutOfRange {
            index: index as i64,
            size: self.size(),
        })?;
        self.reader.seek(SeekFrom::Start(offset))?;
        let frame = self.strategy.read_next(&mut self.reader, line)?;
        self.step = index + 1;
        Ok(frame)
    }

    /// Resolves a possibly negative frame index against the trajectory size.
    pub fn resolve_index(&self, index: i64) -> Result<usize, Error> {
        let size = self.size() as i64;
        let resolved = if index < 0 { size + index } else { index };
        if (0..size).contains(&resolved) {
            Ok(resolved as usize)
        } else {
            Err(Error::FrameOutOfRange {
                index,
                size: self.size(),
            })
        }
    }

    /// Reads the frames named by `selection`, in file order.
    pub fn select(&mut self, selection: FrameSelection) -> Result<Vec<Frame>, Error> {
        match selection {
            FrameSelection::All => {
                self.step = 0;
                let mut frames = Vec::with_capacity(self.size());
                while let Some(frame) = self.read()? {
                    frames.push(frame);
                }
                Ok(frames)
            }
            FrameSelection::Index(index) => {
                let index = self.resolve_index(index)?;
                Ok(vec![self.read_at(index)?])
            }
        }
    }

    fn scan_all(
        reader: &mut BufReader<File>,
        strategy: &Format,
    ) -> Result<Vec<(u64, usize)>, Error> {
        let mut frame_positions = vec![];
        let mut position = (0, 1);
        while let Some(span) = strategy.forward(reader, position.1)? {
            frame_positions.push(position);
            position = (span.end, position.1 + span.lines);
        }
        reader.rewind()?;
        Ok(frame_positions)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn frame_selection_from_str() {
        assert_eq!("all".parse::<FrameSelection>().unwrap(), FrameSelection::All);
        assert_eq!("ALL".parse::<FrameSelection>().unwrap(), FrameSelection::All);
        assert_eq!("3".parse::<FrameSelection>().unwrap(), FrameSelection::Index(3));
        assert_eq!("-1".parse::<FrameSelection>().unwrap(), FrameSelection::Index(-1));
        let err = "last".parse::<FrameSelection>().unwrap_err();
        assert_eq!(err.to_string(), "--frame must be an integer or 'all'.");
    }

    #[test]
    fn select_frames() {
        let path = Path::new("./src/tests-data/xyz/structures.extxyz");
        let mut trajectory = Trajectory::open(path).unwrap();

        let frames = trajectory.select(FrameSelection::All).unwrap();
        assert_eq!(frames.len(), 4);

        let frames = trajectory.select(FrameSelection::Index(-1)).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].size(), 4);

        let frames = trajectory.select(FrameSelection::Index(2)).unwrap();
        assert_eq!(frames[0].structure_name().as_deref(), Some("GaAs"));

        let err = trajectory.select(FrameSelection::Index(4)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "frame index 4 is out of range for a trajectory with 4 frames"
        );
        assert!(trajectory.select(FrameSelection::Index(-5)).is_err());
    }

    #[test]
    fn sequential_reads_follow_read_at() {
        let path = Path::new("./src/tests-data/xyz/structures.extxyz");
        let mut trajectory = Trajectory::open(path).unwrap();
        trajectory.read_at(2).unwrap();
        let frame = trajectory.read().unwrap().unwrap();
        assert_eq!(frame.size(), 4);
        assert!(trajectory.read().unwrap().is_none());
    }

    #[test]
    fn unknown_extension() {
        let err = Trajectory::open(Path::new("./src/tests-data/csv/counts.csv"))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Unsupported file format: `csv`");
    }
}
