//! Run configuration.
//!
//! Raw settings (format string, directive definitions, search fields) are
//! collected by [`ConfigBuilder`] and validated together in
//! [`ConfigBuilder::build`], so a bad setting fails the run before any card
//! is read.

use crate::directive::DirectiveTable;
use crate::error::Result;
use crate::escape;
use crate::format::FormatSpec;
use crate::render::{self, RenderOptions};
use crate::search::SearchSpec;
use crate::vcard::PropertySource;

/// Format used when none is given.
pub const DEFAULT_FORMAT: &str = "%n <%e>";

/// Validated, read-only settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub format: FormatSpec,
    pub directives: DirectiveTable,
    pub search: SearchSpec,
    pub options: RenderOptions,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Render one card with these settings.
    pub fn render<C: PropertySource + ?Sized>(&self, card: &C) -> Result<Vec<String>> {
        render::render(
            &self.format,
            card,
            &self.directives,
            &self.search,
            &self.options,
        )
    }
}

/// Collects raw settings for a [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    format: String,
    directives: Vec<String>,
    search_fields: Vec<String>,
    terms: Vec<String>,
    options: RenderOptions,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            directives: Vec::new(),
            search_fields: Vec::new(),
            terms: Vec::new(),
            options: RenderOptions::default(),
        }
    }
}

impl ConfigBuilder {
    /// Raw format string; backslash escapes are decoded at build time.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// A comma-separated list of `K=FIELD` directive definitions.
    pub fn directive(mut self, definitions: impl Into<String>) -> Self {
        self.directives.push(definitions.into());
        self
    }

    /// A comma-separated list of search fields, `!` suffix for must-match.
    pub fn search_fields(mut self, fields: impl Into<String>) -> Self {
        self.search_fields.push(fields.into());
        self
    }

    pub fn terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terms.extend(terms.into_iter().map(Into::into));
        self
    }

    pub fn include_empty(mut self, include_empty: bool) -> Self {
        self.options.include_empty = include_empty;
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.options.separator = separator.into();
        self
    }

    pub fn build(self) -> Result<Config> {
        let mut directives = DirectiveTable::new();
        for definitions in &self.directives {
            directives.define(definitions)?;
        }

        let mut search = SearchSpec::new().with_terms(&self.terms);
        for fields in &self.search_fields {
            search.add_fields(fields)?;
        }

        let format = FormatSpec::parse(&escape::decode(&self.format))?;
        format.validate(&directives)?;

        Ok(Config {
            format,
            directives,
            search,
            options: self.options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VcfError;
    use crate::format::Token;

    #[test]
    fn test_defaults() {
        let config = Config::builder().build().unwrap();
        assert_eq!(config.format, FormatSpec::parse(DEFAULT_FORMAT).unwrap());
        assert_eq!(config.directives, DirectiveTable::new());
        assert!(config.search.terms().is_empty());
        assert!(!config.options.include_empty);
        assert_eq!(config.options.separator, ",");
    }

    #[test]
    fn test_format_is_unescaped() {
        let config = Config::builder().format(r"%n\t%p").build().unwrap();
        assert_eq!(config.format.tokens()[1], Token::Literal("\t".to_string()));
    }

    #[test]
    fn test_directive_definitions_apply_before_validation() {
        let config = Config::builder()
            .format("%o")
            .directive("o=ORG")
            .build()
            .unwrap();
        assert_eq!(config.directives.resolve('o'), Some("ORG"));
    }

    #[test]
    fn test_unknown_directive_fails_build() {
        let err = Config::builder().format("%o").build().unwrap_err();
        assert!(matches!(err, VcfError::UnknownDirective('o')));
    }

    #[test]
    fn test_bad_settings_fail_build() {
        assert!(matches!(
            Config::builder().format("%n%").build(),
            Err(VcfError::UnterminatedDirective)
        ));
        assert!(matches!(
            Config::builder().directive("oo=ORG").build(),
            Err(VcfError::MalformedDirectiveEntry(_))
        ));
        assert!(matches!(
            Config::builder().search_fields("FN,").build(),
            Err(VcfError::EmptySearchField)
        ));
    }

    #[test]
    fn test_search_settings() {
        let config = Config::builder()
            .search_fields("FN")
            .search_fields("EMAIL!")
            .terms(["Smith"])
            .build()
            .unwrap();
        assert_eq!(config.search.terms(), ["SMITH"]);
        assert_eq!(config.search.fields().len(), 2);
        assert!(config.search.is_must_match("EMAIL"));
    }
}
