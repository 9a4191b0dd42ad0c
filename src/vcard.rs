//! Minimal vCard reader.
//!
//! Only what the formatter needs: cards delimited by `BEGIN:VCARD` /
//! `END:VCARD`, folded content lines and property groups. Parameters are
//! skipped. Values are not validated.
//!
//! How a raw value becomes [`Property::values`] depends on the property:
//!
//! | Kind       | Properties                  | Split on |
//! |------------|-----------------------------|----------|
//! | structured | N, ADR, ORG, GENDER         | `;`      |
//! | list       | CATEGORIES, NICKNAME        | `,`      |
//! | text       | everything else             | nothing  |
//!
//! Lines that are not valid UTF-8 are read as ISO-8859-1.

use std::collections::HashMap;
use std::io::BufRead;

use crate::error::{Result, VcfError};

/// Anything that can list the instances of a named property.
///
/// The formatter and search code only ever see cards through this trait.
pub trait PropertySource {
    /// All instances of `field`, in card order. Empty if there are none.
    fn get(&self, field: &str) -> &[Property];
}

/// One instance of a property on a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    values: Vec<String>,
}

impl Property {
    /// Create a property. An empty value list is stored as one empty value.
    pub fn new<I, S>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            values.push(String::new());
        }
        Self {
            name: name.to_ascii_uppercase(),
            values,
        }
    }

    /// Upper-case property name, without any group prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The property's values; never empty.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// One contact record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Card {
    properties: HashMap<String, Vec<Property>>,
}

impl Card {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property instance after any existing ones of the same name.
    pub fn push(&mut self, property: Property) {
        self.properties
            .entry(property.name.clone())
            .or_default()
            .push(property);
    }

    /// Builder form of [`Card::push`] taking a name and its values.
    pub fn with<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Property::new(name, values));
        self
    }
}

impl PropertySource for Card {
    fn get(&self, field: &str) -> &[Property] {
        self.properties
            .get(&field.to_ascii_uppercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Streaming parser yielding one [`Card`] at a time.
///
/// Iteration stops after the first error.
pub struct Parser<R> {
    reader: R,
    buf: Vec<u8>,
    peeked: Option<(usize, String)>,
    line_num: usize,
    failed: bool,
}

impl<R: BufRead> Parser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            peeked: None,
            line_num: 0,
            failed: false,
        }
    }

    fn physical_line(&mut self) -> Result<Option<(usize, String)>> {
        if let Some(line) = self.peeked.take() {
            return Ok(Some(line));
        }
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_num += 1;

        let mut bytes = self.buf.as_slice();
        if let Some(rest) = bytes.strip_suffix(b"\n") {
            bytes = rest.strip_suffix(b"\r").unwrap_or(rest);
        }
        let line = match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => bytes.iter().copied().map(char::from).collect(),
        };
        Ok(Some((self.line_num, line)))
    }

    /// Next content line with folding undone, tagged with its first line number.
    fn logical_line(&mut self) -> Result<Option<(usize, String)>> {
        let Some((num, mut line)) = self.physical_line()? else {
            return Ok(None);
        };
        while let Some((next_num, next)) = self.physical_line()? {
            if let Some(rest) = next.strip_prefix([' ', '\t']) {
                line.push_str(rest);
            } else {
                self.peeked = Some((next_num, next));
                break;
            }
        }
        Ok(Some((num, line)))
    }

    /// Read the next card, or `None` at end of input.
    pub fn next_card(&mut self) -> Result<Option<Card>> {
        let begin = loop {
            match self.logical_line()? {
                None => return Ok(None),
                Some((_, line)) if line.trim().is_empty() => continue,
                Some(line) => break line,
            }
        };
        if !is_marker(&begin.1, "BEGIN") {
            return Err(parse_error(begin.0, "expected BEGIN:VCARD"));
        }

        let mut card = Card::new();
        loop {
            let Some((num, line)) = self.logical_line()? else {
                return Err(parse_error(self.line_num, "unexpected end of input in card"));
            };
            if line.trim().is_empty() {
                continue;
            }
            if is_marker(&line, "END") {
                return Ok(Some(card));
            }
            if is_marker(&line, "BEGIN") {
                return Err(parse_error(num, "nested BEGIN:VCARD"));
            }
            card.push(parse_content_line(&line).map_err(|m| parse_error(num, m))?);
        }
    }
}

impl<R: BufRead> Iterator for Parser<R> {
    type Item = Result<Card>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_card() {
            Ok(card) => card.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

fn parse_error(line: usize, message: &str) -> VcfError {
    VcfError::Parse {
        line,
        message: message.to_string(),
    }
}

fn is_marker(line: &str, marker: &str) -> bool {
    match line.trim_end().split_once(':') {
        Some((name, value)) => {
            name.eq_ignore_ascii_case(marker) && value.eq_ignore_ascii_case("VCARD")
        }
        None => false,
    }
}

/// Parse `[group.]NAME[;PARAM=VALUE...]:VALUE`.
fn parse_content_line(line: &str) -> std::result::Result<Property, &'static str> {
    let colon = find_value_separator(line).ok_or("property line has no ':'")?;
    let (head, raw_value) = (&line[..colon], &line[colon + 1..]);

    let full_name = head.split(';').next().unwrap_or_default();
    let name = full_name.rsplit('.').next().unwrap_or(full_name);
    if name.is_empty() {
        return Err("property has no name");
    }

    let values = split_values(raw_value, value_separators(name));
    Ok(Property::new(name, values))
}

/// Characters that separate values of the named property.
fn value_separators(name: &str) -> &'static [char] {
    match name.to_ascii_uppercase().as_str() {
        "N" | "ADR" | "ORG" | "GENDER" => &[';'],
        "CATEGORIES" | "NICKNAME" => &[','],
        _ => &[],
    }
}

/// Byte index of the first `:` outside a quoted parameter value.
fn find_value_separator(line: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

/// Split a raw value on unescaped `separators`, decoding escapes.
fn split_values(raw: &str, separators: &[char]) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n' | 'N') => current.push('\n'),
                Some(other) => current.push(other),
                None => current.push('\\'),
            },
            c if separators.contains(&c) => values.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    values.push(current);
    values
}
