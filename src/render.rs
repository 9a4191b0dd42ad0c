//! Cartesian expansion of a format over one card.
//!
//! A card may hold several instances of a property, so one card can render
//! to several lines. Each directive multiplies the working set of lines by
//! the number of instances it resolves to:
//!
//! ```text
//! format  "%n <%e>"
//! card    FN: Jane Doe    EMAIL: a@x.com, b@x.com
//! output  Jane Doe <a@x.com>
//!         Jane Doe <b@x.com>
//! ```

use tracing::{debug, trace};

use crate::directive::DirectiveTable;
use crate::error::{Result, VcfError};
use crate::format::{FormatSpec, Modifier, Token};
use crate::search::SearchSpec;
use crate::vcard::{Property, PropertySource};

/// Knobs for [`render`] that are not part of the format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render cards even when a directive has no instances to expand.
    pub include_empty: bool,
    /// Joins the values of a single property instance.
    pub separator: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_empty: false,
            separator: ",".to_string(),
        }
    }
}

/// Quote a string as a CSV field: wrap in `"` and double inner quotes.
pub fn quote_csv(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' {
            out.push_str("\"\"");
        } else {
            out.push(c);
        }
    }
    out.push('"');
    out
}

/// Text written for one property instance.
pub fn render_property(
    property: &Property,
    modifier: Option<Modifier>,
    options: &RenderOptions,
) -> String {
    // Multiple values are always flattened into one string.
    let base = property.values().join(&options.separator);
    match modifier {
        Some(Modifier::Csv) => quote_csv(&base),
        None => base,
    }
}

/// Render one card to zero or more lines (without line terminators).
///
/// Every directive is resolved before anything is expanded, so an unknown
/// directive fails the card without producing partial output. A directive
/// with no instances (after must-match filtering) yields no lines for the
/// whole card unless `include_empty` is set.
pub fn render<C: PropertySource + ?Sized>(
    format: &FormatSpec,
    card: &C,
    table: &DirectiveTable,
    search: &SearchSpec,
    options: &RenderOptions,
) -> Result<Vec<String>> {
    let fields = format
        .directive_keys()
        .map(|key| table.resolve(key).ok_or(VcfError::UnknownDirective(key)))
        .collect::<Result<Vec<_>>>()?;
    let mut fields = fields.into_iter();

    let mut lines = vec![String::new()];
    for token in format.tokens() {
        match token {
            Token::Literal(text) => {
                for line in &mut lines {
                    line.push_str(text);
                }
            }
            Token::Directive { key, modifier } => {
                let Some(field) = fields.next() else {
                    return Err(VcfError::UnknownDirective(*key));
                };
                let instances = search.filter(field, card.get(field));

                if instances.is_empty() {
                    if options.include_empty {
                        continue;
                    }
                    debug!(field = field, "no instances to render, skipping card");
                    return Ok(Vec::new());
                }

                let rendered: Vec<String> = instances
                    .iter()
                    .map(|p| render_property(p, *modifier, options))
                    .collect();
                lines = expand(&lines, &rendered);
                trace!(
                    field = field,
                    instances = rendered.len(),
                    lines = lines.len(),
                    "expanded"
                );
            }
        }
    }
    Ok(lines)
}

/// Pair every line with every suffix; instance-major order.
///
/// Output index `i * lines.len() + j` is `lines[j] + suffixes[i]`.
fn expand(lines: &[String], suffixes: &[String]) -> Vec<String> {
    suffixes
        .iter()
        .flat_map(|suffix| lines.iter().map(move |line| format!("{line}{suffix}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcard::Card;

    fn run(format: &str, card: &Card) -> Vec<String> {
        run_with(format, card, &SearchSpec::new(), &RenderOptions::default())
    }

    fn run_with(
        format: &str,
        card: &Card,
        search: &SearchSpec,
        options: &RenderOptions,
    ) -> Vec<String> {
        let spec = FormatSpec::parse(format).unwrap();
        render(&spec, card, &DirectiveTable::new(), search, options).unwrap()
    }

    fn jane() -> Card {
        Card::new()
            .with("FN", ["Jane Doe"])
            .with("EMAIL", ["a@x.com"])
            .with("EMAIL", ["b@x.com"])
    }

    #[test]
    fn test_quote_csv() {
        assert_eq!(quote_csv("plain"), "\"plain\"");
        assert_eq!(quote_csv(r#"say "hi"@x.com"#), r#""say ""hi""@x.com""#);
        assert_eq!(quote_csv(""), "\"\"");
    }

    #[test]
    fn test_literal_only_format() {
        assert_eq!(run("hello\tworld", &Card::new()), vec!["hello\tworld"]);
        assert_eq!(run("", &Card::new()), vec![""]);
    }

    #[test]
    fn test_default_format_repeated_email() {
        assert_eq!(
            run("%n <%e>", &jane()),
            vec!["Jane Doe <a@x.com>", "Jane Doe <b@x.com>"]
        );
    }

    #[test]
    fn test_cartesian_order() {
        let card = Card::new()
            .with("FN", ["A"])
            .with("FN", ["B"])
            .with("TEL", ["1"])
            .with("TEL", ["2"])
            .with("TEL", ["3"]);
        assert_eq!(
            run("%n-%p", &card),
            vec!["A-1", "B-1", "A-2", "B-2", "A-3", "B-3"]
        );
    }

    #[test]
    fn test_multi_value_joined_with_comma() {
        let card = Card::new().with("N", ["Doe", "Jane", ""]);
        let mut table = DirectiveTable::new();
        table.insert('N', "N");
        let spec = FormatSpec::parse("%N").unwrap();
        let lines = render(
            &spec,
            &card,
            &table,
            &SearchSpec::new(),
            &RenderOptions::default(),
        )
        .unwrap();
        assert_eq!(lines, vec!["Doe,Jane,"]);
    }

    #[test]
    fn test_custom_separator() {
        let card = Card::new().with("FN", ["Doe", "Jane"]);
        let options = RenderOptions {
            separator: " ".to_string(),
            ..RenderOptions::default()
        };
        assert_eq!(
            run_with("%n", &card, &SearchSpec::new(), &options),
            vec!["Doe Jane"]
        );
    }

    #[test]
    fn test_csv_modifier_applied_once() {
        let card = Card::new()
            .with("FN", ["Jane"])
            .with("EMAIL", [r#"say "hi"@x.com"#]);
        assert_eq!(run("%+e", &card), vec![r#""say ""hi""@x.com""#]);
        assert_eq!(run("%+n,%n", &card), vec![r#""Jane",Jane"#]);
    }

    #[test]
    fn test_csv_modifier_quotes_joined_values() {
        let card = Card::new().with("FN", ["Doe", "Jane"]);
        assert_eq!(run("%+n", &card), vec!["\"Doe,Jane\""]);
    }

    #[test]
    fn test_empty_field_suppresses_card() {
        let card = Card::new().with("FN", ["Jane"]);
        assert!(run("%n <%e>", &card).is_empty());
        assert!(run("%n %p %e", &jane()).is_empty());
    }

    #[test]
    fn test_include_empty_contributes_nothing() {
        let card = Card::new().with("FN", ["Jane"]);
        let options = RenderOptions {
            include_empty: true,
            ..RenderOptions::default()
        };
        assert_eq!(
            run_with("%n <%e>", &card, &SearchSpec::new(), &options),
            vec!["Jane <>"]
        );
    }

    #[test]
    fn test_must_match_filters_instances() {
        let mut search = SearchSpec::new().with_terms(["B@X"]);
        search.add_fields("EMAIL!").unwrap();
        assert_eq!(
            run_with("%n <%e>", &jane(), &search, &RenderOptions::default()),
            vec!["Jane Doe <b@x.com>"]
        );
    }

    #[test]
    fn test_must_match_with_no_survivors_suppresses_card() {
        let mut search = SearchSpec::new().with_terms(["jane"]);
        search.add_fields("FN,EMAIL!").unwrap();
        assert!(run_with("%n <%e>", &jane(), &search, &RenderOptions::default()).is_empty());
    }

    #[test]
    fn test_unknown_directive_fails_before_output() {
        let spec = FormatSpec::parse("%n %x").unwrap();
        let err = render(
            &spec,
            &jane(),
            &DirectiveTable::new(),
            &SearchSpec::new(),
            &RenderOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, VcfError::UnknownDirective('x')));
    }

    #[test]
    fn test_expand_row_major() {
        let lines = vec!["a".to_string(), "b".to_string()];
        let suffixes = vec!["1".to_string(), "2".to_string()];
        assert_eq!(expand(&lines, &suffixes), vec!["a1", "b1", "a2", "b2"]);
    }
}
