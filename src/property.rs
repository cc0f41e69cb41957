use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use nalgebra::Matrix3;

use crate::error::Error;

const EPSILON: f64 = 1e-12;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum PropertyKind {
    Bool,
    Integer,
    Double,
    String,
    Vector3D,
    Matrix3x3,
    VectorXD,
}

/// A value attached to a frame (the "info" block of an extended XYZ comment
/// line) or to a single atom (an extra column).
#[derive(Debug, Clone)]
pub enum Property {
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Vector3D([f64; 3]),
    Matrix3x3(Matrix3<f64>),
    VectorXD(Vec<f64>),
}

/// Returns `true` if `a` and `b` are both finite and within `epsilon` of each other.
fn almost_eq(a: f64, b: f64, epsilon: f64) -> bool {
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= epsilon
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Property::Bool(a), Property::Bool(b)) => a == b,
            (Property::Integer(a), Property::Integer(b)) => a == b,
            (Property::Double(a), Property::Double(b)) => almost_eq(*a, *b, EPSILON),
            (Property::String(a), Property::String(b)) => a == b,
            (Property::Vector3D(a), Property::Vector3D(b)) => a
                .iter()
                .zip(b.iter())
                .all(|(x, y)| almost_eq(*x, *y, EPSILON)),
            (Property::Matrix3x3(a), Property::Matrix3x3(b)) => a
                .iter()
                .zip(b.iter())
                .all(|(x, y)| almost_eq(*x, *y, EPSILON)),
            (Property::VectorXD(a), Property::VectorXD(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|(x, y)| almost_eq(*x, *y, EPSILON))
            }
            _ => false,
        }
    }
}

/// Formats a float like Python's `str(float)`: integral values keep a
/// trailing `.0` and exponents carry a sign and at least two digits.
fn write_number(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("nan");
    }
    let repr = format!("{x:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            write!(f, "{mantissa}e{sign}{digits:0>2}")
        }
        None => f.write_str(&repr),
    }
}

fn write_numbers<'a>(
    f: &mut fmt::Formatter<'_>,
    values: impl IntoIterator<Item = &'a f64>,
) -> fmt::Result {
    for (i, x) in values.into_iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write_number(f, *x)?;
    }
    Ok(())
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Bool(true) => f.write_str("True"),
            Property::Bool(false) => f.write_str("False"),
            Property::Integer(n) => write!(f, "{n}"),
            Property::Double(x) => write_number(f, *x),
            Property::String(s) => f.write_str(s),
            Property::Vector3D(v) => write_numbers(f, v),
            // row-major, the order the values appear in the file
            Property::Matrix3x3(m) => write_numbers(f, m.transpose().iter()),
            Property::VectorXD(v) => write_numbers(f, v),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Properties(HashMap<String, Property>);

impl Deref for Properties {
    type Target = HashMap<String, Property>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Properties {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a String, &'a Property);
    type IntoIter = <&'a HashMap<String, Property> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Property {
    pub fn as_string(&self) -> Option<&str> {
        if let Property::String(ref s) = *self {
            Some(s)
        } else {
            None
        }
    }

    pub fn parse_value(value: &str, kind: PropertyKind) -> Result<Property, Error> {
        match kind {
            PropertyKind::String => StringParser::parse(value),
            PropertyKind::Bool => BoolParser::parse(value),
            PropertyKind::Integer => IntegerParser::parse(value),
            PropertyKind::Double => DoubleParser::parse(value),
            PropertyKind::Vector3D => Vector3DParser::parse(value),
            PropertyKind::Matrix3x3 => Matrix3x3Parser::parse(value),
            PropertyKind::VectorXD => VectorXDParser::parse(value),
        }
    }

    /// Guess the type of an untyped frame-level value: booleans first, then
    /// integers, floats, vectors and matrices by component count, and finally
    /// a plain string.
    pub fn guess(value: &str) -> Property {
        let lowercased = value.to_lowercase();
        if ["t", "true", "f", "false"].contains(&lowercased.as_str()) {
            return BoolParser::parse(&lowercased).unwrap_or_else(|_| Property::String(value.into()));
        }

        let kind = match value.split_whitespace().count() {
            0 => return Property::String(String::new()),
            1 if value.trim().parse::<i64>().is_ok() => PropertyKind::Integer,
            1 => PropertyKind::Double,
            3 => PropertyKind::Vector3D,
            9 => PropertyKind::Matrix3x3,
            _ => PropertyKind::VectorXD,
        };
        Self::parse_value(value, kind).unwrap_or_else(|_| Property::String(value.to_string()))
    }
}

trait ValueParser {
    fn parse(value: &str) -> Result<Property, Error>;
}

struct StringParser;
struct BoolParser;
struct IntegerParser;
struct DoubleParser;
struct Vector3DParser;
struct Matrix3x3Parser;
struct VectorXDParser;

fn parse_f64(value: &str, what: &str) -> Result<f64, Error> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| Error::GenericError(format!("Failed to parse {what}: {e}")))
}

fn parse_components(value: &str, what: &str) -> Result<Vec<f64>, Error> {
    value
        .split_whitespace()
        .map(|part| parse_f64(part, what))
        .collect()
}

impl ValueParser for StringParser {
    fn parse(value: &str) -> Result<Property, Error> {
        Ok(Property::String(value.to_string()))
    }
}

impl ValueParser for BoolParser {
    fn parse(value: &str) -> Result<Property, Error> {
        match value.to_lowercase().as_str() {
            "t" | "true" => Ok(Property::Bool(true)),
            "f" | "false" => Ok(Property::Bool(false)),
            _ => Err(Error::GenericError(format!(
                "Invalid boolean value: {value}"
            ))),
        }
    }
}

impl ValueParser for IntegerParser {
    fn parse(value: &str) -> Result<Property, Error> {
        value
            .trim()
            .parse::<i64>()
            .map(Property::Integer)
            .map_err(|e| Error::GenericError(format!("Failed to parse integer: {e}")))
    }
}

impl ValueParser for DoubleParser {
    fn parse(value: &str) -> Result<Property, Error> {
        parse_f64(value, "number").map(Property::Double)
    }
}

impl ValueParser for Vector3DParser {
    fn parse(value: &str) -> Result<Property, Error> {
        let nums = parse_components(value, "vector component")?;
        let &[x, y, z] = nums.as_slice() else {
            return Err(Error::GenericError(format!(
                "Vector3D requires exactly 3 components, got {}",
                nums.len()
            )));
        };
        Ok(Property::Vector3D([x, y, z]))
    }
}

impl ValueParser for Matrix3x3Parser {
    fn parse(value: &str) -> Result<Property, Error> {
        let nums = parse_components(value, "matrix component")?;
        if nums.len() != 9 {
            return Err(Error::GenericError(format!(
                "Matrix3x3 requires exactly 9 components, got {}",
                nums.len()
            )));
        }
        Ok(Property::Matrix3x3(Matrix3::from_row_slice(&nums)))
    }
}

impl ValueParser for VectorXDParser {
    fn parse(value: &str) -> Result<Property, Error> {
        parse_components(value, "vector component").map(Property::VectorXD)
    }
}
