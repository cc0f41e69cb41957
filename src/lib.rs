pub mod atom;
pub mod colormap;
pub mod config;
pub mod counts;
pub mod element;
pub mod error;
pub mod extendedxyzparser;
pub mod format;
pub mod formats;
pub mod frame;
pub mod html;
pub mod pipeline;
pub mod plot;
pub mod property;
pub mod table;
pub mod trajectory;

use std::path::Path;

use counts::ElementCounts;
use error::Error;
use trajectory::{FrameSelection, Trajectory};

/// Counts the elements of every frame in a structure file.
pub fn count_elements(path: &Path) -> Result<ElementCounts, Error> {
    let mut trajectory = Trajectory::open(path)?;
    let frames = trajectory.select(FrameSelection::All)?;
    Ok(counts::count_frames(&frames, &[]))
}
