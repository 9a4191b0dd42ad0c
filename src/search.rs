//! Case-insensitive search over card properties.
//!
//! Two levels of matching:
//! - **card gate**: every term must appear in some value of some searchable
//!   field (AND across terms)
//! - **property filter**: a single property instance matches if any term
//!   appears in any of its values (OR across terms); used to drop instances
//!   of must-match fields

use crate::error::{Result, VcfError};
use crate::vcard::{Property, PropertySource};

/// A searchable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchField {
    pub name: String,
    /// Instances of this field that match no term are not rendered.
    pub must_match: bool,
}

/// Search terms and the fields they are matched against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSpec {
    /// Upper-cased terms.
    terms: Vec<String>,
    fields: Vec<SearchField>,
}

impl SearchSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the search terms.
    pub fn with_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.terms = terms.into_iter().map(|t| t.as_ref().to_uppercase()).collect();
        self
    }

    /// Add one searchable field.
    pub fn with_field(mut self, name: &str, must_match: bool) -> Self {
        self.fields.push(SearchField {
            name: name.to_string(),
            must_match,
        });
        self
    }

    /// Add fields from a comma-separated list such as `FN,EMAIL!`.
    ///
    /// A trailing `!` marks the field must-match. Nothing is added if any
    /// entry is empty.
    pub fn add_fields(&mut self, list: &str) -> Result<()> {
        let parsed = list
            .split(',')
            .map(|entry| {
                let (name, must_match) = match entry.strip_suffix('!') {
                    Some(name) => (name, true),
                    None => (entry, false),
                };
                if name.is_empty() {
                    return Err(VcfError::EmptySearchField);
                }
                Ok(SearchField {
                    name: name.to_string(),
                    must_match,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.fields.extend(parsed);
        Ok(())
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn fields(&self) -> &[SearchField] {
        &self.fields
    }

    /// Whether instances of `field` must match a term to be rendered.
    pub fn is_must_match(&self, field: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.must_match && f.name.eq_ignore_ascii_case(field))
    }

    /// Record-level gate.
    ///
    /// True with no terms. Otherwise every term needs a witness value in
    /// some instance of some searchable field.
    pub fn card_matches<C: PropertySource + ?Sized>(&self, card: &C) -> bool {
        self.terms.iter().all(|term| {
            self.fields
                .iter()
                .flat_map(|field| card.get(&field.name))
                .any(|prop| property_contains(prop, term))
        })
    }

    /// Field-level filter: true with no terms, else true if any term is in
    /// any value.
    pub fn property_matches(&self, property: &Property) -> bool {
        self.terms.is_empty() || self.terms.iter().any(|t| property_contains(property, t))
    }

    /// Instances of `field` that survive the must-match filter.
    pub fn filter<'a>(&self, field: &str, properties: &'a [Property]) -> Vec<&'a Property> {
        if self.is_must_match(field) {
            properties
                .iter()
                .filter(|p| self.property_matches(p))
                .collect()
        } else {
            properties.iter().collect()
        }
    }
}

/// `term` must already be upper-cased.
fn property_contains(property: &Property, term: &str) -> bool {
    property
        .values()
        .iter()
        .any(|v| v.to_uppercase().contains(term))
}
