//! Periodic-table heat map rendering.

use std::fs;
use std::path::Path;

use log::info;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::drawing::DrawingArea;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;

use crate::colormap::{format_tick, text_color_for_fill, ColorScale, Colormap, Rgb};
use crate::element::{self, layout_position, LAYOUT_COLUMNS, MAX_ATOMIC_NUMBER};
use crate::error::Error;
use crate::html;

/// Fill of elements without data.
pub const NO_DATA_COLOR: Rgb = Rgb(0xBF, 0xBF, 0xBF);
/// Fill of excluded elements, drawn with a black border.
pub const EXCLUDED_COLOR: Rgb = Rgb::WHITE;

/// Largest accepted `--dpi`. Bitmaps are `dpi / 96` times the unit-scale
/// figure on each side.
pub const MAX_DPI: u32 = 1200;

const FONT: &str = "sans-serif";
const COLORBAR_STEPS: i32 = 256;

/// Output file kinds, chosen by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    Png,
    Svg,
    Html,
}

impl OutputKind {
    pub fn from_path(path: &Path) -> Result<OutputKind, Error> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("png") => Ok(OutputKind::Png),
            Some("svg") => Ok(OutputKind::Svg),
            Some("html") => Ok(OutputKind::Html),
            _ => Err(Error::InvalidOption(
                "Output extension must be .png, .svg or .html".to_string(),
            )),
        }
    }
}

/// Everything needed to draw one heat map.
#[derive(Clone, Debug)]
pub struct PlotSpec {
    /// `(symbol, value)` for every element with data.
    pub values: Vec<(&'static str, f64)>,
    pub title: Option<String>,
    pub colorbar_title: String,
    /// Decimals of the values printed in the cells.
    pub decimals: usize,
    pub colormap: Colormap,
    pub color_scale: ColorScale,
    pub excluded: Vec<&'static str>,
    pub print_data: bool,
    pub all_black_text: bool,
}

/// One element of the table, fully styled.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cell {
    pub z: u8,
    pub symbol: &'static str,
    pub name: &'static str,
    pub row: u8,
    pub column: u8,
    pub value: Option<f64>,
    /// Formatted value, set when data labels are requested.
    pub label: Option<String>,
    pub fill: Rgb,
    pub text_color: Rgb,
    pub excluded: bool,
}

impl PlotSpec {
    fn value_of(&self, symbol: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|&(_, v)| v)
            .filter(|v| v.is_finite())
    }

    /// Formats `value` with the configured number of decimals.
    pub fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.decimals, value)
    }

    /// All 118 elements in atomic-number order.
    pub fn cells(&self) -> Vec<Cell> {
        (1..=MAX_ATOMIC_NUMBER)
            .filter_map(|z| {
                let symbol = element::symbol(z)?;
                let name = element::name(z)?;
                let (row, column) = layout_position(z)?;
                let excluded = self.excluded.contains(&symbol);
                let value = if excluded { None } else { self.value_of(symbol) };

                let fill = match value {
                    _ if excluded => EXCLUDED_COLOR,
                    Some(v) => self.colormap.sample(self.color_scale.normalize(v)),
                    None => NO_DATA_COLOR,
                };
                let text_color = if self.all_black_text {
                    Rgb::BLACK
                } else {
                    text_color_for_fill(fill)
                };
                let label = value
                    .filter(|_| self.print_data)
                    .map(|v| self.format_value(v));

                Some(Cell {
                    z,
                    symbol,
                    name,
                    row,
                    column,
                    value,
                    label,
                    fill,
                    text_color,
                    excluded,
                })
            })
            .collect()
    }
}

/// Pixel layout of the figure, in CSS pixels times `scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub scale: f64,
}

impl Geometry {
    const CELL: f64 = 56.0;
    const MARGIN: f64 = 24.0;
    const TITLE_HEIGHT: f64 = 56.0;
    /// Height of the empty row between the main table and the f-block.
    const GAP: f64 = 20.0;
    const COLORBAR_TOP: f64 = 28.0;
    const COLORBAR_HEIGHT: f64 = 20.0;
    const COLORBAR_SECTION: f64 = 124.0;

    pub fn new(scale: f64) -> Geometry {
        Geometry { scale }
    }

    fn px(&self, value: f64) -> i32 {
        (value * self.scale).round() as i32
    }

    pub fn cell_size(&self) -> i32 {
        self.px(Self::CELL)
    }

    fn table_width(&self) -> f64 {
        f64::from(LAYOUT_COLUMNS) * Self::CELL
    }

    fn table_bottom(&self) -> f64 {
        Self::TITLE_HEIGHT + 9.0 * Self::CELL + Self::GAP
    }

    /// Figure size in pixels.
    pub fn size(&self) -> (u32, u32) {
        let width = 2.0 * Self::MARGIN + self.table_width();
        let height = self.table_bottom() + Self::COLORBAR_SECTION + Self::MARGIN;
        (self.px(width) as u32, self.px(height) as u32)
    }

    /// Top-left corner of the cell at grid position `(row, column)`.
    pub fn cell_origin(&self, row: u8, column: u8) -> (i32, i32) {
        let x = Self::MARGIN + f64::from(column - 1) * Self::CELL;
        let y = match row {
            1..=7 => Self::TITLE_HEIGHT + f64::from(row - 1) * Self::CELL,
            _ => Self::TITLE_HEIGHT + f64::from(row - 2) * Self::CELL + Self::GAP,
        };
        (self.px(x), self.px(y))
    }

    /// `(left, top, right, bottom)` of the colorbar gradient.
    fn colorbar(&self) -> (i32, i32, i32, i32) {
        let left = Self::MARGIN + 3.0 * Self::CELL;
        let right = Self::MARGIN + self.table_width() - 3.0 * Self::CELL;
        let top = self.table_bottom() + Self::COLORBAR_TOP;
        (
            self.px(left),
            self.px(top),
            self.px(right),
            self.px(top + Self::COLORBAR_HEIGHT),
        )
    }

    fn font(&self, size: f64) -> f64 {
        size * self.scale
    }
}

fn color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

fn text_style(size: f64, style: FontStyle, rgb: Rgb, pos: Pos) -> TextStyle<'static> {
    (FONT, size, style).into_font().color(&color(rgb)).pos(pos)
}

fn centered(size: f64, rgb: Rgb) -> TextStyle<'static> {
    text_style(size, FontStyle::Normal, rgb, Pos::new(HPos::Center, VPos::Center))
}

fn draw_cell<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    cell: &Cell,
    geometry: &Geometry,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    let size = geometry.cell_size();
    let inset = geometry.px(1.0).max(1);
    let (x, y) = geometry.cell_origin(cell.row, cell.column);
    let (x0, y0, x1, y1) = (x + inset, y + inset, x + size - inset, y + size - inset);

    root.draw(&Rectangle::new([(x0, y0), (x1, y1)], color(cell.fill).filled()))?;
    if cell.excluded {
        let width = (1.25 * geometry.scale).round().max(1.0) as u32;
        root.draw(&Rectangle::new(
            [(x0, y0), (x1, y1)],
            BLACK.stroke_width(width),
        ))?;
    }

    let text = cell.text_color;
    root.draw(&Text::new(
        cell.z.to_string(),
        (x + geometry.px(5.0), y + geometry.px(5.0)),
        text_style(
            geometry.font(10.0),
            FontStyle::Normal,
            text,
            Pos::new(HPos::Left, VPos::Top),
        ),
    ))?;
    root.draw(&Text::new(
        cell.symbol.to_string(),
        (x + size / 2, y + geometry.px(26.0)),
        text_style(
            geometry.font(19.0),
            FontStyle::Bold,
            text,
            Pos::new(HPos::Center, VPos::Center),
        ),
    ))?;
    if let Some(label) = &cell.label {
        root.draw(&Text::new(
            label.clone(),
            (x + size / 2, y + geometry.px(45.0)),
            centered(geometry.font(10.0), text),
        ))?;
    }
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &PlotSpec,
    geometry: &Geometry,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    let (left, top, right, bottom) = geometry.colorbar();
    let width = right - left;

    for step in 0..COLORBAR_STEPS {
        let x0 = left + width * step / COLORBAR_STEPS;
        let x1 = left + width * (step + 1) / COLORBAR_STEPS;
        let t = (f64::from(step) + 0.5) / f64::from(COLORBAR_STEPS);
        let fill = color(spec.colormap.sample(t));
        root.draw(&Rectangle::new([(x0, top), (x1, bottom)], fill.filled()))?;
    }
    root.draw(&Rectangle::new([(left, top), (right, bottom)], BLACK.stroke_width(1)))?;

    let tick_length = geometry.px(6.0);
    for tick in spec.color_scale.ticks() {
        let x = left + (f64::from(width) * spec.color_scale.normalize(tick)).round() as i32;
        root.draw(&PathElement::new(
            vec![(x, bottom), (x, bottom + tick_length)],
            BLACK.stroke_width(1),
        ))?;
        root.draw(&Text::new(
            format_tick(tick),
            (x, bottom + tick_length + geometry.px(10.0)),
            centered(geometry.font(13.0), Rgb::BLACK),
        ))?;
    }

    root.draw(&Text::new(
        spec.colorbar_title.clone(),
        ((left + right) / 2, bottom + geometry.px(56.0)),
        centered(geometry.font(21.0), Rgb::BLACK),
    ))?;
    Ok(())
}

/// Draws the whole figure on `root`.
pub fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &PlotSpec,
    geometry: &Geometry,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    if let Some(title) = spec.title.as_deref().filter(|t| !t.is_empty()) {
        let (width, _) = geometry.size();
        root.draw(&Text::new(
            title.to_string(),
            (width as i32 / 2, geometry.px(Geometry::TITLE_HEIGHT / 2.0)),
            text_style(
                geometry.font(24.0),
                FontStyle::Bold,
                Rgb::BLACK,
                Pos::new(HPos::Center, VPos::Center),
            ),
        ))?;
    }

    for cell in spec.cells() {
        draw_cell(root, &cell, geometry)?;
    }
    draw_colorbar(root, spec, geometry)?;
    root.present()?;
    Ok(())
}

fn render_error(path: &Path, reason: impl ToString) -> Error {
    Error::Render {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// SVG markup of the figure at unit scale.
pub fn svg_string(spec: &PlotSpec) -> Result<String, Box<dyn std::error::Error>> {
    let geometry = Geometry::new(1.0);
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, geometry.size()).into_drawing_area();
        draw(&root, spec, &geometry)?;
    }
    Ok(svg)
}

/// Checks a requested PNG resolution.
pub fn check_dpi(dpi: i64) -> Result<u32, Error> {
    if dpi <= 0 {
        return Err(Error::InvalidOption(
            "--dpi must be a positive integer.".to_string(),
        ));
    }
    if dpi > i64::from(MAX_DPI) {
        return Err(Error::InvalidOption(format!(
            "--dpi must be at most {MAX_DPI}."
        )));
    }
    Ok(dpi as u32)
}

/// Renders `spec` into `path`, the kind of output chosen by its extension.
/// Bitmaps are scaled by `dpi / 96`.
pub fn render(spec: &PlotSpec, path: &Path, dpi: u32) -> Result<(), Error> {
    match OutputKind::from_path(path)? {
        OutputKind::Png => {
            check_dpi(i64::from(dpi))?;
            let geometry = Geometry::new(f64::from(dpi) / 96.0);
            let root = BitMapBackend::new(path, geometry.size()).into_drawing_area();
            draw(&root, spec, &geometry).map_err(|e| render_error(path, e))?;
        }
        OutputKind::Svg => {
            let svg = svg_string(spec).map_err(|e| render_error(path, e))?;
            fs::write(path, svg)?;
        }
        OutputKind::Html => {
            let svg = svg_string(spec).map_err(|e| render_error(path, e))?;
            fs::write(path, html::document(spec, &svg)?)?;
        }
    }
    info!("rendered {}", path.display());
    Ok(())
}
