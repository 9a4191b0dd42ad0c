//! # vcf-rs
//!
//! Format and search vCard contacts with a printf-style format string.
//!
//! ## Overview
//!
//! A format string mixes literal text with directives that expand to card
//! properties:
//! - **Directives**: `%n` (FN), `%e` (EMAIL), `%p` (TEL), plus any defined
//!   with `K=FIELD`
//! - **CSV quoting**: `%+e` wraps the value in quotes, doubling inner quotes
//! - **Repeated properties**: a card with two emails renders two lines; each
//!   directive multiplies the lines by its number of instances
//! - **Search**: terms are matched case-insensitively against chosen fields;
//!   a `!` field only renders its matching instances
//!
//! ## Example
//!
//! ```
//! use vcf_rs::{Config, execute_str};
//!
//! let input = "BEGIN:VCARD\nFN:Jane Doe\nEMAIL:a@x.com\nEMAIL:b@x.com\nEND:VCARD\n";
//!
//! let config = Config::builder().format("%n <%e>").build().unwrap();
//! let (output, stats) = execute_str(input, &config).unwrap();
//!
//! assert_eq!(output, "Jane Doe <a@x.com>\nJane Doe <b@x.com>\n");
//! assert_eq!(stats.lines_written, 2);
//! ```

pub mod config;
pub mod directive;
pub mod error;
pub mod escape;
pub mod executor;
pub mod format;
pub mod render;
pub mod search;
pub mod vcard;

pub use config::{Config, ConfigBuilder, DEFAULT_FORMAT};
pub use directive::DirectiveTable;
pub use error::{Result, VcfError};
pub use executor::{RunStats, execute, execute_cards, execute_str};
pub use format::{FormatSpec, Modifier, Token, tokenize};
pub use render::{RenderOptions, quote_csv, render};
pub use search::{SearchField, SearchSpec};
pub use vcard::{Card, Parser, Property, PropertySource};
