//! Command line options and their validation into a [`Config`].

use std::path::PathBuf;

use clap::Parser;

use crate::colormap::{Colormap, Scale, DEFAULT_COLORMAP};
use crate::counts::parse_exclude_elements;
use crate::error::Error;
use crate::plot::{check_dpi, OutputKind};
use crate::table::ValueMode;
use crate::trajectory::FrameSelection;

/// Read XYZ/PDB/CSV data, count elements, and plot them on a periodic table.
#[derive(Parser, Debug, Clone)]
#[command(name = "elemap", version, about)]
pub struct Options {
    /// Input file (.xyz/.extxyz/.pdb, or .csv with Element/element_count columns)
    pub input: PathBuf,

    /// Output file (.png, .svg or .html)
    pub output: PathBuf,

    /// Frame index for trajectory-like inputs (integer, negative counts from
    /// the end) or 'all'
    #[arg(long, default_value = "all", allow_hyphen_values = true)]
    pub frame: String,

    /// For multi-frame inputs, count only the first frame per unique
    /// info['structure_name']
    #[arg(long)]
    pub unique_structure: bool,

    /// Plot title
    #[arg(long, default_value = "Element Counts")]
    pub title: String,

    /// Optionally save interactive HTML alongside the main output
    #[arg(long, value_name = "FILE")]
    pub save_html: Option<PathBuf>,

    /// Path for the CSV export of element counts. Default:
    /// <output_stem>_counts.csv, <output_stem>_fraction.csv with --fraction,
    /// or <output_stem>_fraction_log.csv with --fraction --log-fraction
    #[arg(long, value_name = "FILE")]
    pub save_csv: Option<PathBuf>,

    /// PNG DPI, the render scale factor is dpi / 96
    #[arg(long, default_value_t = 300, allow_hyphen_values = true)]
    pub dpi: i64,

    /// Use a logarithmic scale for the colorbar values
    #[arg(long)]
    pub log_scale: bool,

    /// Exclude element symbols from counting and render them in white with
    /// black borders. Examples: --exclude-elements H O or --exclude-elements H,O
    #[arg(long, num_args = 1.., value_name = "SYMBOL")]
    pub exclude_elements: Vec<String>,

    /// Print values as text labels inside periodic-table cells
    #[arg(long)]
    pub print_data: bool,

    /// Render all text labels in black
    #[arg(long)]
    pub all_black_text: bool,

    /// Visualize element fractions normalized by the maximum element count
    #[arg(long)]
    pub fraction: bool,

    /// Visualize log10-transformed element fractions. Requires --fraction
    #[arg(long)]
    pub log_fraction: bool,

    /// Colormap name, with an optional _r suffix to reverse it
    #[arg(long, default_value = DEFAULT_COLORMAP)]
    pub cmap: String,

    /// Minimum value of the colorbar range (default: data minimum)
    #[arg(long, allow_hyphen_values = true)]
    pub color_min: Option<f64>,

    /// Maximum value of the colorbar range (default: data maximum)
    #[arg(long, allow_hyphen_values = true)]
    pub color_max: Option<f64>,
}

/// Where counts come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Pre-aggregated `Element,element_count` table.
    Csv,
    /// Structure file read frame by frame.
    Structure,
}

/// Validated run configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub input: PathBuf,
    pub input_kind: InputKind,
    pub output: PathBuf,
    pub frame: FrameSelection,
    pub unique_structure: bool,
    pub title: Option<String>,
    pub save_html: Option<PathBuf>,
    pub save_csv: Option<PathBuf>,
    pub dpi: u32,
    pub scale: Scale,
    pub exclude: Vec<&'static str>,
    pub print_data: bool,
    pub all_black_text: bool,
    pub mode: ValueMode,
    pub colormap: Colormap,
    pub color_min: Option<f64>,
    pub color_max: Option<f64>,
}

fn invalid(message: &str) -> Error {
    Error::InvalidOption(message.to_string())
}

impl TryFrom<Options> for Config {
    type Error = Error;

    fn try_from(options: Options) -> Result<Self, Self::Error> {
        if !options.input.exists() {
            return Err(Error::InputNotFound(options.input));
        }

        let exclude = parse_exclude_elements(&options.exclude_elements)?;
        let colormap = Colormap::resolve(&options.cmap)?;
        if options.log_fraction && !options.fraction {
            return Err(invalid("--log-fraction requires --fraction."));
        }
        if options.log_fraction && options.log_scale {
            return Err(invalid(
                "--log-fraction cannot be combined with --log-scale. \
                 Use one log transform at a time.",
            ));
        }
        if let (Some(min), Some(max)) = (options.color_min, options.color_max) {
            if min >= max {
                return Err(invalid("--color-min must be smaller than --color-max."));
            }
        }

        let is_csv = options
            .input
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let (input_kind, frame) = if is_csv {
            if options.unique_structure {
                return Err(invalid(
                    "--unique-structure can only be used with structure file input.",
                ));
            }
            if !options.frame.trim().eq_ignore_ascii_case("all") {
                return Err(invalid("--frame can only be used with structure file input."));
            }
            (InputKind::Csv, FrameSelection::All)
        } else {
            (InputKind::Structure, options.frame.parse()?)
        };

        let mut outputs = vec![OutputKind::from_path(&options.output)?];
        if let Some(html) = &options.save_html {
            outputs.push(OutputKind::from_path(html)?);
        }
        let dpi = match check_dpi(options.dpi) {
            Ok(dpi) => dpi,
            Err(e) if outputs.contains(&OutputKind::Png) => return Err(e),
            Err(_) => 96,
        };

        let title = Some(options.title).filter(|t| !t.is_empty());
        Ok(Config {
            input: options.input,
            input_kind,
            output: options.output,
            frame,
            unique_structure: options.unique_structure,
            title,
            save_html: options.save_html,
            save_csv: options.save_csv,
            dpi,
            scale: if options.log_scale {
                Scale::Log
            } else {
                Scale::Linear
            },
            exclude,
            print_data: options.print_data,
            all_black_text: options.all_black_text,
            mode: ValueMode::from_flags(options.fraction, options.log_fraction),
            colormap,
            color_min: options.color_min,
            color_max: options.color_max,
        })
    }
}
