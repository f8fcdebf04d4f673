use std::io::{self, Write};

use cky::{NonTerminal, Parse};

/// Writes one sentence block: the sentence, its trees and the parse count,
/// followed by a blank line. Blank sentences are echoed without a count.
pub fn write_parse(
    out: &mut impl Write,
    sentence: &str,
    parse: &Parse,
    start: &NonTerminal,
    show_chart: bool,
) -> io::Result<()> {
    writeln!(out, "{sentence}")?;
    if sentence.is_empty() {
        return Ok(());
    }

    for tree in &parse.trees {
        writeln!(out, "{tree}")?;
    }

    if parse.truncated {
        writeln!(
            out,
            "Number of parses: {} (showing first {})",
            parse.count(),
            parse.trees.len()
        )?;
    } else {
        writeln!(out, "Number of parses: {}", parse.count())?;
    }

    if show_chart {
        write!(out, "{}", parse.chart.display_with(start))?;
    }

    writeln!(out)
}
