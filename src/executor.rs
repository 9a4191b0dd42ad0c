//! Record-at-a-time execution.
//!
//! Each card is read, gated by the search terms, rendered and written
//! before the next card is read. The first error from the card source
//! ends the run.

use std::io::{BufRead, Write};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::vcard::{Parser, PropertySource};

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub cards_read: usize,
    /// Cards that produced at least one line.
    pub cards_rendered: usize,
    pub lines_written: usize,
}

/// Render every card from `cards` into `output`, one line per result.
pub fn execute_cards<I, C, W>(cards: I, output: &mut W, config: &Config) -> Result<RunStats>
where
    I: IntoIterator<Item = Result<C>>,
    C: PropertySource,
    W: Write + ?Sized,
{
    let mut stats = RunStats::default();

    for card in cards {
        let card = card?;
        stats.cards_read += 1;

        if !config.search.card_matches(&card) {
            debug!(card = stats.cards_read, "card does not match search terms");
            continue;
        }

        let lines = config.render(&card)?;
        if !lines.is_empty() {
            stats.cards_rendered += 1;
        }
        for line in &lines {
            writeln!(output, "{line}")?;
        }
        stats.lines_written += lines.len();
    }

    info!(
        cards_read = stats.cards_read,
        cards_rendered = stats.cards_rendered,
        lines_written = stats.lines_written,
        "run complete"
    );
    Ok(stats)
}

/// Parse vCards from `input` and render them into `output`.
pub fn execute<R, W>(input: R, output: &mut W, config: &Config) -> Result<RunStats>
where
    R: BufRead,
    W: Write + ?Sized,
{
    execute_cards(Parser::new(input), output, config)
}

/// Run over an in-memory vCard string.
///
/// Returns (output_text, stats). Every output line ends with `\n`.
pub fn execute_str(input: &str, config: &Config) -> Result<(String, RunStats)> {
    let mut output = Vec::new();
    let stats = execute(input.as_bytes(), &mut output, config)?;
    Ok((String::from_utf8_lossy(&output).into_owned(), stats))
}
