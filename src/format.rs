//! Format string tokenizer.
//!
//! Format strings are printf-like:
//! ```text
//! %n <%e>
//! %+n,%+e,%+p
//! ```
//!
//! - `%%` is a literal `%`
//! - `%` + optional `+` modifier + one directive character is a directive
//! - everything else is literal text
//!
//! Tokenizing does not consult the directive table; call
//! [`FormatSpec::validate`] once the table is final.

use crate::directive::DirectiveTable;
use crate::error::{Result, VcfError};

/// A modifier changing how a directive's text is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// `+` - quote the text as a CSV field.
    Csv,
}

impl Modifier {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Modifier::Csv),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Modifier::Csv => '+',
        }
    }
}

/// One piece of a tokenized format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Text copied verbatim into every output line.
    Literal(String),
    /// A placeholder expanded from a card property.
    Directive {
        key: char,
        modifier: Option<Modifier>,
    },
}

/// A tokenized format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    tokens: Vec<Token>,
}

impl FormatSpec {
    /// Tokenize an (already escape-decoded) format string.
    pub fn parse(format: &str) -> Result<Self> {
        Ok(Self {
            tokens: tokenize(format)?,
        })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Directive characters in order of appearance.
    pub fn directive_keys(&self) -> impl Iterator<Item = char> + '_ {
        self.tokens.iter().filter_map(|t| match t {
            Token::Directive { key, .. } => Some(*key),
            Token::Literal(_) => None,
        })
    }

    /// Check that every directive is present in the table.
    pub fn validate(&self, table: &DirectiveTable) -> Result<()> {
        for key in self.directive_keys() {
            if table.resolve(key).is_none() {
                return Err(VcfError::UnknownDirective(key));
            }
        }
        Ok(())
    }
}

/// Split a format string into literal runs and directives.
pub fn tokenize(format: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    // Some(modifier) while inside a directive.
    let mut pending: Option<Option<Modifier>> = None;

    for c in format.chars() {
        match pending {
            None if c == '%' => pending = Some(None),
            None => literal.push(c),
            Some(_) if c == '%' => {
                literal.push('%');
                pending = None;
            }
            Some(modifier) => {
                if let Some(m) = Modifier::from_char(c) {
                    if let Some(existing) = modifier {
                        return Err(VcfError::DuplicateModifier(existing.as_char()));
                    }
                    pending = Some(Some(m));
                    continue;
                }
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(Token::Directive { key: c, modifier });
                pending = None;
            }
        }
    }

    if pending.is_some() {
        return Err(VcfError::UnterminatedDirective);
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}
