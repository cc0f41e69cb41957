//! One complete run: count, tabulate, export and render.

use std::fmt;
use std::path::PathBuf;

use log::debug;

use crate::colormap::ColorScale;
use crate::config::{Config, InputKind};
use crate::counts::{element_counts_from_structure, ElementCounts};
use crate::error::Error;
use crate::plot::{self, PlotSpec};
use crate::table::{default_csv_output_path, element_counts_from_csv, CountTable, ValueMode};

/// What a run did, printed as the console summary.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    /// `(counted, total)` frames, `None` for CSV input.
    pub frames: Option<(usize, usize)>,
    pub unique_structure: bool,
    pub mode: ValueMode,
    pub excluded: Vec<&'static str>,
    pub counts: ElementCounts,
    /// Every file written, in order.
    pub saved: Vec<PathBuf>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frames {
            Some((counted, total)) if self.unique_structure => writeln!(
                f,
                "Frames counted: {counted}/{total} (unique info['structure_name'])"
            )?,
            Some((counted, total)) => writeln!(f, "Frames counted: {counted}/{total}")?,
            None => writeln!(f, "Frames counted: N/A (CSV input)")?,
        }
        match self.frames {
            Some((_, total)) => writeln!(f, "Total frames in input: {total}")?,
            None => writeln!(f, "Total frames in input: N/A (CSV input)")?,
        }

        match self.mode {
            ValueMode::LogFraction => writeln!(
                f,
                "Visualization mode: log(Element fraction) (Element fraction = count / max_count)"
            )?,
            ValueMode::Fraction => {
                writeln!(f, "Visualization mode: Element fraction (count / max_count)")?
            }
            ValueMode::Count => {}
        }
        if !self.excluded.is_empty() {
            writeln!(
                f,
                "Excluded elements (white + black border): {}",
                self.excluded.join(", ")
            )?;
        }

        writeln!(f, "Element counts:")?;
        for (symbol, count) in self.counts.iter() {
            writeln!(f, "  {symbol}: {count}")?;
        }
        for path in &self.saved {
            writeln!(f, "Saved: {}", path.display())?;
        }
        Ok(())
    }
}

/// Runs the whole pipeline described by `config`.
pub fn run(config: &Config) -> Result<RunReport, Error> {
    let (counts, frames) = match config.input_kind {
        InputKind::Csv => (element_counts_from_csv(&config.input, &config.exclude)?, None),
        InputKind::Structure => {
            let tally = element_counts_from_structure(
                &config.input,
                config.frame,
                config.unique_structure,
                &config.exclude,
            )?;
            (tally.counts, Some((tally.counted_frames, tally.total_frames)))
        }
    };

    let table = CountTable::build(&counts, config.mode)?;
    let csv_path = config
        .save_csv
        .clone()
        .unwrap_or_else(|| default_csv_output_path(&config.output, config.mode));
    table.write_csv(&csv_path)?;

    let values = table.plot_values();
    let data: Vec<f64> = values.iter().map(|&(_, v)| v).collect();
    let spec = PlotSpec {
        values,
        title: config.title.clone(),
        colorbar_title: config.mode.colorbar_title().to_string(),
        decimals: config.mode.float_decimals(),
        colormap: config.colormap.clone(),
        color_scale: ColorScale::new(&data, config.scale, config.color_min, config.color_max)?,
        excluded: config.exclude.clone(),
        print_data: config.print_data,
        all_black_text: config.all_black_text,
    };
    debug!(
        "color range [{}, {}] over column {}",
        spec.color_scale.min,
        spec.color_scale.max,
        config.mode.column()
    );

    let mut saved = Vec::new();
    plot::render(&spec, &config.output, config.dpi)?;
    saved.push(config.output.clone());
    if let Some(html) = &config.save_html {
        plot::render(&spec, html, config.dpi)?;
        saved.push(html.clone());
    }
    saved.push(csv_path);

    Ok(RunReport {
        frames,
        unique_structure: config.unique_structure,
        mode: config.mode,
        excluded: config.exclude.clone(),
        counts,
        saved,
    })
}
