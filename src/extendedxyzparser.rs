use std::{collections::HashMap, iter::Peekable, str::Chars};

use crate::error::Error;

/// Raw `key=value` pairs of an extended XYZ comment line. Flags without a
/// value (`pbc` in `pbc Lattice="..."`) map to `"T"`, the way ASE reads them.
pub type ExtendedXyzProperties = HashMap<String, String>;

/// Tokenizer for the second line of an extended XYZ frame.
///
/// Values may be bare words, double-quoted (with `\"` escapes),
/// single-quoted, or wrapped in `{...}` / `[...]`; the bracketed forms turn
/// their commas into spaces so `[1, 2, 3]` reads like `"1 2 3"`.
pub struct ExtendedXyzParser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> ExtendedXyzParser<'a> {
    pub fn new(line: &'a str) -> Self {
        ExtendedXyzParser {
            chars: line.trim().chars().peekable(),
        }
    }

    pub fn parse(mut self) -> Result<ExtendedXyzProperties, Error> {
        let mut props = HashMap::new();

        loop {
            self.skip_whitespace();
            if self.chars.peek().is_none() {
                break;
            }

            let key = self.next_substring()?;
            if key.is_empty() {
                return Err(Error::GenericError(
                    "extended XYZ comment line has an empty key".to_string(),
                ));
            }

            self.skip_whitespace();
            let value = if self.chars.peek() == Some(&'=') {
                self.chars.next();
                self.skip_whitespace();
                self.next_substring()?
            } else {
                "T".to_string()
            };
            props.insert(key, value);
        }

        Ok(props)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    /// Grabs either a quoted/bracketed substring (allowing spaces) or an
    /// unquoted one (stopping at `=` or whitespace). Doesn't include the
    /// delimiters.
    fn next_substring(&mut self) -> Result<String, Error> {
        match self.chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                self.chars.next();
                self.quoted(quote)
            }
            Some(open @ ('{' | '[')) => {
                self.chars.next();
                let close = if open == '{' { '}' } else { ']' };
                let inner = self.until(close)?;
                Ok(inner.replace(',', " ").trim().to_string())
            }
            _ => {
                let mut word = String::new();
                while let Some(c) = self.chars.next_if(|c| !c.is_whitespace() && *c != '=') {
                    word.push(c);
                }
                Ok(word)
            }
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, Error> {
        let mut value = String::new();
        while let Some(c) = self.chars.next() {
            match c {
                '\\' if quote == '"' => match self.chars.next() {
                    Some(escaped) => value.push(escaped),
                    None => break,
                },
                c if c == quote => return Ok(value),
                c => value.push(c),
            }
        }
        Err(Error::GenericError(format!(
            "unterminated {quote}-quoted value in extended XYZ comment line"
        )))
    }

    fn until(&mut self, close: char) -> Result<String, Error> {
        let mut value = String::new();
        for c in self.chars.by_ref() {
            if c == close {
                return Ok(value);
            }
            value.push(c);
        }
        Err(Error::GenericError(format!(
            "missing closing '{close}' in extended XYZ comment line"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_flags_and_values() {
        let props = ExtendedXyzParser::new(
            r#"Properties=species:S:1:pos:R:3 name='test file' debug structure_name="bulk \"Si\"""#,
        )
        .parse()
        .unwrap();
        assert_eq!(props["Properties"], "species:S:1:pos:R:3");
        assert_eq!(props["name"], "test file");
        assert_eq!(props["debug"], "T");
        assert_eq!(props["structure_name"], "bulk \"Si\"");
        assert_eq!(props.len(), 4);
    }

    #[test]
    fn spaces_around_equals_and_brackets() {
        let props = ExtendedXyzParser::new("energy = -1.5 pbc=[T, T, F] cell={1,0,0}")
            .parse()
            .unwrap();
        assert_eq!(props["energy"], "-1.5");
        assert_eq!(props["pbc"], "T  T  F");
        assert_eq!(props["cell"], "1 0 0");
    }

    #[test]
    fn empty_line() {
        assert!(ExtendedXyzParser::new("   ").parse().unwrap().is_empty());
    }

    #[test]
    fn unterminated_quote() {
        let err = ExtendedXyzParser::new(r#"Lattice="1 0 0"#).parse().unwrap_err();
        assert!(err.to_string().contains("unterminated"));
        assert!(ExtendedXyzParser::new("cell={1 0 0").parse().is_err());
    }
}
