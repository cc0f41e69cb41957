//! CSV input of pre-aggregated counts, and the count table written next to
//! every plot.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::counts::{describe_excluded, ElementCounts};
use crate::element::normalize_symbol;
use crate::error::Error;

const ELEMENT_COLUMN: &str = "Element";
const COUNT_COLUMN: &str = "element_count";
const FRACTION_COLUMN: &str = "element_fraction";
const LOG_FRACTION_COLUMN: &str = "element_fraction_log10";

/// Cell contents read as missing values.
const MISSING_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Splits CSV text into records. Fields may be double-quoted, with `""`
/// standing for a literal quote; quoted fields may span lines. Blank lines
/// are skipped.
fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    loop {
        let next = chars.next();
        match next {
            Some('"') if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            Some('"') => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            Some(',') if !in_quotes => record.push(std::mem::take(&mut field)),
            Some('\r') if !in_quotes && chars.peek() == Some(&'\n') => {}
            Some('\n') | None if !in_quotes || next.is_none() => {
                record.push(std::mem::take(&mut field));
                let blank = !quoted && record.len() == 1 && record[0].trim().is_empty();
                if blank {
                    record.clear();
                } else {
                    records.push(std::mem::take(&mut record));
                }
                quoted = false;
                if next.is_none() {
                    break;
                }
            }
            Some(c) => field.push(c),
            None => unreachable!("end of input is handled by the record-terminator arm"),
        }
    }
    records
}

/// Missing values match one of the markers exactly, surrounding spaces
/// included.
fn is_missing(value: Option<&String>) -> bool {
    value.map_or(true, |v| MISSING_VALUES.contains(&v.as_str()))
}

/// Reads `Element,element_count` rows from a CSV file.
///
/// When the header lacks those two names the first two columns are used.
/// Rows with a missing value are dropped, symbols are normalized, counts
/// must be non-negative integers, excluded elements are removed and
/// repeated symbols summed.
pub fn element_counts_from_csv(path: &Path, exclude: &[&'static str]) -> Result<ElementCounts, Error> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::Csv(format!("Failed to read CSV input: {} ({e})", path.display())))?;
    let mut records = split_records(&text).into_iter();

    let header = records
        .next()
        .ok_or_else(|| Error::Csv(format!("Failed to read CSV input: {} (file is empty)", path.display())))?;
    let rows: Vec<Vec<String>> = records.collect();
    if rows.is_empty() {
        return Err(Error::Csv(format!("CSV input has no rows: {}", path.display())));
    }

    let position = |name: &str| header.iter().position(|h| h.trim() == name);
    let (element_idx, count_idx) = match (position(ELEMENT_COLUMN), position(COUNT_COLUMN)) {
        (Some(e), Some(c)) => (e, c),
        _ if header.len() >= 2 => {
            debug!("{}: using the first two columns as element and count", path.display());
            (0, 1)
        }
        _ => {
            return Err(Error::Csv(
                "CSV input must contain 'Element' and 'element_count' columns or at least two columns."
                    .to_string(),
            ))
        }
    };

    let valid: Vec<(&str, &str)> = rows
        .iter()
        .filter(|row| !is_missing(row.get(element_idx)) && !is_missing(row.get(count_idx)))
        .map(|row| (row[element_idx].trim(), row[count_idx].trim()))
        .collect();
    if valid.is_empty() {
        return Err(Error::Csv(format!(
            "CSV input has no valid Element/count rows: {}",
            path.display()
        )));
    }

    let symbols = valid
        .iter()
        .map(|(symbol, _)| normalize_symbol(symbol))
        .collect::<Result<Vec<_>, _>>()?;
    let values = valid
        .iter()
        .map(|(_, count)| {
            count.parse::<f64>().map_err(|_| {
                Error::Csv(format!(
                    "CSV input contains a non-numeric count '{count}': {}",
                    path.display()
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.iter().any(|&v| v < 0.0) {
        return Err(Error::Csv(format!(
            "CSV input contains negative counts: {}",
            path.display()
        )));
    }
    if values.iter().any(|v| v.fract() != 0.0 || !v.is_finite()) {
        return Err(Error::Csv(format!(
            "CSV input contains non-integer counts: {}",
            path.display()
        )));
    }

    let counts: ElementCounts = symbols
        .into_iter()
        .zip(values)
        .filter(|(symbol, _)| !exclude.contains(symbol))
        .map(|(symbol, value)| (symbol, value as u64))
        .collect();

    if counts.is_empty() {
        if !exclude.is_empty() {
            return Err(Error::Csv(format!(
                "No counts left after excluding elements ({}) in '{}'.",
                describe_excluded(exclude),
                path.display()
            )));
        }
        return Err(Error::Csv(format!(
            "No counts left after filtering CSV input: {}",
            path.display()
        )));
    }
    Ok(counts)
}

/// Which quantity is plotted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ValueMode {
    /// Raw counts.
    #[default]
    Count,
    /// `count / max_count`.
    Fraction,
    /// `log10(count / max_count)`.
    LogFraction,
}

impl ValueMode {
    pub fn from_flags(fraction: bool, log_fraction: bool) -> Self {
        match (fraction, log_fraction) {
            (_, true) => ValueMode::LogFraction,
            (true, false) => ValueMode::Fraction,
            (false, false) => ValueMode::Count,
        }
    }

    /// Name of the plotted column.
    pub fn column(self) -> &'static str {
        match self {
            ValueMode::Count => COUNT_COLUMN,
            ValueMode::Fraction => FRACTION_COLUMN,
            ValueMode::LogFraction => LOG_FRACTION_COLUMN,
        }
    }

    pub fn colorbar_title(self) -> &'static str {
        match self {
            ValueMode::Count => "Count",
            ValueMode::Fraction => "Element fraction",
            ValueMode::LogFraction => "log(Element fraction)",
        }
    }

    /// Decimals used for values printed in the cells.
    pub fn float_decimals(self) -> usize {
        match self {
            ValueMode::Count => 0,
            ValueMode::Fraction | ValueMode::LogFraction => 3,
        }
    }

    fn csv_suffix(self) -> &'static str {
        match self {
            ValueMode::Count => "_counts.csv",
            ValueMode::Fraction => "_fraction.csv",
            ValueMode::LogFraction => "_fraction_log.csv",
        }
    }
}

/// `<output stem><suffix>` next to `output`, the suffix depending on `mode`.
pub fn default_csv_output_path(output: &Path, mode: ValueMode) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{stem}{}", mode.csv_suffix());
    match output.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CountRow {
    pub symbol: &'static str,
    pub count: u64,
    pub fraction: Option<f64>,
    pub log_fraction: Option<f64>,
}

impl CountRow {
    /// The value plotted for this row under `mode`.
    pub fn value(&self, mode: ValueMode) -> f64 {
        match mode {
            ValueMode::Count => self.count as f64,
            ValueMode::Fraction => self.fraction.unwrap_or(f64::NAN),
            ValueMode::LogFraction => self.log_fraction.unwrap_or(f64::NAN),
        }
    }
}

/// Counts with the derived columns of the chosen [`ValueMode`].
#[derive(Clone, Debug, PartialEq)]
pub struct CountTable {
    pub mode: ValueMode,
    pub rows: Vec<CountRow>,
}

impl CountTable {
    pub fn build(counts: &ElementCounts, mode: ValueMode) -> Result<Self, Error> {
        let mut rows: Vec<CountRow> = counts
            .iter()
            .map(|(symbol, count)| CountRow {
                symbol,
                count,
                fraction: None,
                log_fraction: None,
            })
            .collect();

        if mode != ValueMode::Count {
            let max_count = counts.max().unwrap_or(0);
            if max_count == 0 {
                return Err(Error::GenericError(
                    "Cannot compute fractions because max element count is not positive."
                        .to_string(),
                ));
            }
            for row in &mut rows {
                row.fraction = Some(row.count as f64 / max_count as f64);
            }
        }

        if mode == ValueMode::LogFraction {
            if rows.iter().any(|row| row.fraction.is_some_and(|f| f <= 0.0)) {
                return Err(Error::GenericError(
                    "Cannot compute log-fraction because some element fractions are <= 0."
                        .to_string(),
                ));
            }
            for row in &mut rows {
                row.log_fraction = row.fraction.map(f64::log10);
            }
        }

        Ok(CountTable { mode, rows })
    }

    /// `(symbol, value)` pairs for the plot.
    pub fn plot_values(&self) -> Vec<(&'static str, f64)> {
        self.rows
            .iter()
            .map(|row| (row.symbol, row.value(self.mode)))
            .collect()
    }

    pub fn to_csv(&self) -> String {
        let mut columns = vec![ELEMENT_COLUMN, COUNT_COLUMN];
        match self.mode {
            ValueMode::Count => {}
            ValueMode::Fraction => columns.push(FRACTION_COLUMN),
            ValueMode::LogFraction => columns.extend([FRACTION_COLUMN, LOG_FRACTION_COLUMN]),
        }

        let mut out = columns.join(",");
        out.push('\n');
        for row in &self.rows {
            let _ = write!(out, "{},{}", row.symbol, row.count);
            for value in [row.fraction, row.log_fraction].into_iter().flatten() {
                // `{:?}` is the shortest representation that reads back exactly
                let _ = write!(out, ",{value:?}");
            }
            out.push('\n');
        }
        out
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), Error> {
        fs::write(path, self.to_csv())?;
        info!("wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}
