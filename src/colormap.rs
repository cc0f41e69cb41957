//! Named colormaps and the mapping from plotted values onto them.

use std::fmt;
use std::str::FromStr;

use phf::phf_map;
use serde::{Serialize, Serializer};

use crate::error::Error;

/// An opaque 8-bit color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    const fn from_hex(hex: u32) -> Rgb {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Relative luminance, with sRGB channels linearized first.
    pub fn luminance(self) -> f64 {
        fn linear(channel: u8) -> f64 {
            let x = f64::from(channel) / 255.0;
            if x <= 0.04045 {
                x / 12.92
            } else {
                ((x + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.0) + 0.7152 * linear(self.1) + 0.0722 * linear(self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// White text on dark fills, black text on light ones.
pub fn text_color_for_fill(fill: Rgb) -> Rgb {
    if fill.luminance() < 0.45 {
        Rgb::WHITE
    } else {
        Rgb::BLACK
    }
}

/// Evenly spaced stops of every known colormap, from low to high.
static COLORMAPS: phf::Map<&'static str, &'static [u32]> = phf_map! {
    "viridis" => &[0x440154, 0x472d7b, 0x3b528b, 0x2c728e, 0x21918c, 0x28ae80, 0x5ec962, 0xaddc30, 0xfde725],
    "plasma" => &[0x0d0887, 0x4c02a1, 0x7e03a8, 0xa92395, 0xcc4778, 0xe56b5d, 0xf89540, 0xfdc328, 0xf0f921],
    "inferno" => &[0x000004, 0x1f0c48, 0x550f6d, 0x88226a, 0xba3655, 0xe35933, 0xf98e09, 0xf9cb35, 0xfcffa4],
    "magma" => &[0x000004, 0x1c1044, 0x4f127b, 0x812581, 0xb5367a, 0xe55064, 0xfb8761, 0xfec287, 0xfcfdbf],
    "cividis" => &[0x00204d, 0x414d6b, 0x7c7b78, 0xbcaf6f, 0xffea46],
    "coolwarm" => &[0x3b4cc0, 0x8db0fe, 0xdddddd, 0xf49a7b, 0xb40426],
    "Greys" => &[0xffffff, 0x000000],
    "Blues" => &[0xf7fbff, 0xc6dbef, 0x6baed6, 0x2171b5, 0x08306b],
    "Greens" => &[0xf7fcf5, 0xc7e9c0, 0x74c476, 0x238b45, 0x00441b],
    "Reds" => &[0xfff5f0, 0xfcbba1, 0xfb6a4a, 0xcb181d, 0x67000d],
    "YlOrRd" => &[0xffffcc, 0xfed976, 0xfd8d3c, 0xe31a1c, 0x800026],
};

pub const DEFAULT_COLORMAP: &str = "plasma";

/// A colormap looked up by name. Names are case sensitive; a `_r` suffix
/// reverses the map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Colormap {
    name: String,
    stops: &'static [u32],
    reversed: bool,
}

impl Colormap {
    pub fn resolve(name: &str) -> Result<Colormap, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidOption(
                "--cmap must be a non-empty colormap name.".to_string(),
            ));
        }

        let (base, reversed) = match COLORMAPS.get(name) {
            Some(_) => (name, false),
            None => match name.strip_suffix("_r") {
                Some(base) => (base, true),
                None => (name, false),
            },
        };
        let stops = COLORMAPS.get(base).ok_or_else(|| {
            Error::InvalidOption(format!(
                "Unknown colormap for --cmap: {name}. \
                 Try common options like: plasma, viridis, inferno, magma, cividis."
            ))
        })?;

        Ok(Colormap {
            name: name.to_string(),
            stops,
            reversed,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color at position `t` in `[0, 1]`; out of range positions are clamped.
    pub fn sample(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };

        let last = self.stops.len() - 1;
        let position = t * last as f64;
        let low = (position.floor() as usize).min(last);
        let high = (low + 1).min(last);
        let frac = position - low as f64;

        let (a, b) = (Rgb::from_hex(self.stops[low]), Rgb::from_hex(self.stops[high]));
        let lerp = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * frac).round() as u8;
        Rgb(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Colormap {
            name: DEFAULT_COLORMAP.to_string(),
            stops: COLORMAPS[DEFAULT_COLORMAP],
            reversed: false,
        }
    }
}

impl FromStr for Colormap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Colormap::resolve(s)
    }
}

/// How values are placed between the color bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

/// Maps values in `[min, max]` onto `[0, 1]`, clamping outside values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorScale {
    pub scale: Scale,
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    /// Bounds come from `values` unless overridden by `color_min` or
    /// `color_max`.
    pub fn new(
        values: &[f64],
        scale: Scale,
        color_min: Option<f64>,
        color_max: Option<f64>,
    ) -> Result<ColorScale, Error> {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let data_min = finite.clone().fold(f64::INFINITY, f64::min);
        let data_max = finite.fold(f64::NEG_INFINITY, f64::max);

        let min = color_min.unwrap_or(data_min);
        let max = color_max.unwrap_or(data_max);
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::GenericError(
                "No finite values to build a color scale from.".to_string(),
            ));
        }
        if scale == Scale::Log && (min <= 0.0 || max <= 0.0) {
            return Err(Error::InvalidOption(format!(
                "--log-scale requires positive color bounds, got [{min}, {max}]. \
                 Set --color-min to a positive value."
            )));
        }
        Ok(ColorScale { scale, min, max })
    }

    fn transform(&self, value: f64) -> f64 {
        match self.scale {
            Scale::Linear => value,
            Scale::Log => value.log10(),
        }
    }

    /// Position of `value` along the colormap.
    pub fn normalize(&self, value: f64) -> f64 {
        let (low, high) = (self.transform(self.min), self.transform(self.max));
        if high <= low {
            return 1.0;
        }
        if self.scale == Scale::Log && value <= 0.0 {
            return 0.0;
        }
        ((self.transform(value) - low) / (high - low)).clamp(0.0, 1.0)
    }

    /// Tick values for the colorbar, in increasing order.
    pub fn ticks(&self) -> Vec<f64> {
        if self.max <= self.min {
            return vec![self.min];
        }
        if self.scale == Scale::Log {
            let first = self.min.log10().ceil() as i32;
            let last = self.max.log10().floor() as i32;
            if last - first >= 1 {
                let stride = ((last - first) / 6 + 1) as usize;
                return (first..=last)
                    .step_by(stride)
                    .map(|exponent| 10f64.powi(exponent))
                    .collect();
            }
        }

        let (low, high) = (self.transform(self.min), self.transform(self.max));
        (0..5)
            .map(|i| low + (high - low) * f64::from(i) / 4.0)
            .map(|t| match self.scale {
                Scale::Linear => t,
                Scale::Log => 10f64.powf(t),
            })
            .collect()
    }
}

/// Short label for a colorbar tick.
pub fn format_tick(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if !(1e-3..1e6).contains(&magnitude) {
        return format!("{value:.1e}");
    }
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn resolve_names() {
        assert_eq!(Colormap::resolve(" viridis ").unwrap().name(), "viridis");
        assert_eq!(Colormap::default().name(), "plasma");
        assert!(Colormap::resolve("Greys_r").unwrap().reversed);

        let err = Colormap::resolve("  ").unwrap_err();
        assert_eq!(err.to_string(), "--cmap must be a non-empty colormap name.");

        let err = "greys".parse::<Colormap>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown colormap for --cmap: greys. \
             Try common options like: plasma, viridis, inferno, magma, cividis."
        );
        assert!(Colormap::resolve("viridis_r_r").is_err());
    }

    #[test]
    fn sampling() {
        let viridis = Colormap::resolve("viridis").unwrap();
        assert_eq!(viridis.sample(0.0), Rgb(0x44, 0x01, 0x54));
        assert_eq!(viridis.sample(1.0), Rgb(0xfd, 0xe7, 0x25));
        assert_eq!(viridis.sample(0.5), Rgb(0x21, 0x91, 0x8c));
        assert_eq!(viridis.sample(7.0), viridis.sample(1.0));
        assert_eq!(viridis.sample(-1.0), viridis.sample(0.0));

        let greys = Colormap::resolve("Greys").unwrap();
        assert_eq!(greys.sample(0.5), Rgb(128, 128, 128));
        let reversed = Colormap::resolve("Greys_r").unwrap();
        assert_eq!(reversed.sample(0.0), Rgb::BLACK);
        assert_eq!(reversed.sample(1.0), Rgb::WHITE);
    }

    #[test]
    fn text_colors() {
        assert_eq!(text_color_for_fill(Rgb::BLACK), Rgb::WHITE);
        assert_eq!(text_color_for_fill(Rgb::WHITE), Rgb::BLACK);
        // plasma ends: dark blue and bright yellow
        assert_eq!(text_color_for_fill(Rgb::from_hex(0x0d0887)), Rgb::WHITE);
        assert_eq!(text_color_for_fill(Rgb::from_hex(0xf0f921)), Rgb::BLACK);
        assert_eq!(text_color_for_fill(Rgb(128, 128, 128)), Rgb::WHITE);
        assert_eq!(Rgb(13, 8, 135).to_string(), "#0D0887");
    }

    #[test]
    fn linear_scale() {
        let scale = ColorScale::new(&[2.0, 10.0, 6.0], Scale::Linear, None, None).unwrap();
        assert_eq!((scale.min, scale.max), (2.0, 10.0));
        assert_approx_eq!(scale.normalize(6.0), 0.5);
        assert_approx_eq!(scale.normalize(0.0), 0.0);
        assert_approx_eq!(scale.normalize(20.0), 1.0);
        assert_eq!(scale.ticks(), [2.0, 4.0, 6.0, 8.0, 10.0]);

        let scale = ColorScale::new(&[2.0, 10.0], Scale::Linear, Some(0.0), Some(5.0)).unwrap();
        assert_approx_eq!(scale.normalize(2.5), 0.5);
        assert_approx_eq!(scale.normalize(10.0), 1.0);
    }

    #[test]
    fn degenerate_range() {
        let scale = ColorScale::new(&[3.0, 3.0], Scale::Linear, None, None).unwrap();
        assert_approx_eq!(scale.normalize(3.0), 1.0);
        assert_eq!(scale.ticks(), [3.0]);
    }

    #[test]
    fn log_scale() {
        let scale = ColorScale::new(&[1.0, 10.0, 1000.0], Scale::Log, None, None).unwrap();
        assert_approx_eq!(scale.normalize(10.0), 1.0 / 3.0);
        assert_approx_eq!(scale.normalize(1000.0), 1.0);
        assert_eq!(scale.ticks(), [1.0, 10.0, 100.0, 1000.0]);

        let err = ColorScale::new(&[0.0, 5.0], Scale::Log, None, None).unwrap_err();
        assert!(err.to_string().starts_with("--log-scale requires positive color bounds"));
        let scale = ColorScale::new(&[0.0, 5.0], Scale::Log, Some(1.0), None).unwrap();
        assert_approx_eq!(scale.normalize(0.0), 0.0);
    }

    #[test]
    fn tick_labels() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(12.0), "12");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(-0.30103), "-0.301");
        assert_eq!(format_tick(2_500_000.0), "2.5e6");
        assert_eq!(format_tick(0.0001), "1.0e-4");
    }
}
