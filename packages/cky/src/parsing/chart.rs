use std::fmt::Display;

use indexmap::IndexSet;
use itertools::Itertools;
use tabled::{builder::Builder, settings::Style};

use crate::grammars::types::{NonTerminal, Terminal};

/// One way of deriving `lhs` over the span of the cell holding the entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChartEntry {
    /// `lhs -> token`, only found in cells spanning a single token.
    Lexical { lhs: NonTerminal, token: Terminal },
    /// `lhs -> left right` with `left` over `[i, split)` and `right` over
    /// `[split, j)`.
    Binary {
        lhs: NonTerminal,
        split: usize,
        left: NonTerminal,
        right: NonTerminal,
    },
}

impl ChartEntry {
    pub fn lhs(&self) -> &NonTerminal {
        match self {
            ChartEntry::Lexical { lhs, .. } | ChartEntry::Binary { lhs, .. } => lhs,
        }
    }
}

impl Display for ChartEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartEntry::Lexical { lhs, token } => write!(f, "{lhs} -> '{token}'"),
            ChartEntry::Binary {
                lhs,
                split,
                left,
                right,
            } => write!(f, "{lhs} -> {left} {right} @{split}"),
        }
    }
}

pub type Cell = IndexSet<ChartEntry>;

/// Triangular table of derivations: `cell(i, j)` holds every entry deriving
/// `tokens[i..j]`. Entries are only ever added.
#[derive(Debug, Clone)]
pub struct Chart {
    tokens: Vec<Terminal>,
    table: Vec<Vec<Cell>>,
}

impl Chart {
    pub fn new(tokens: impl Into<Vec<Terminal>>) -> Self {
        let tokens = tokens.into();
        let size = tokens.len() + 1;

        Chart {
            table: vec![vec![Cell::new(); size]; size],
            tokens,
        }
    }

    /// Sentence length `n`.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Terminal] {
        &self.tokens
    }

    fn check_span(&self, i: usize, j: usize) {
        assert!(
            i < j && j <= self.len(),
            "span [{i}, {j}) is outside a chart over {} tokens",
            self.len()
        );
    }

    pub fn cell(&self, i: usize, j: usize) -> &Cell {
        self.check_span(i, j);
        &self.table[i][j]
    }

    /// Returns `false` when the exact entry was already in the cell.
    pub fn insert(&mut self, i: usize, j: usize, entry: ChartEntry) -> bool {
        self.check_span(i, j);
        self.table[i][j].insert(entry)
    }

    /// Distinct left-hand sides in `[i, j)`, in the order they were first derived.
    pub fn symbols(&self, i: usize, j: usize) -> IndexSet<NonTerminal> {
        self.cell(i, j)
            .iter()
            .map(|entry| entry.lhs().clone())
            .collect()
    }

    pub fn entries_for<'a>(
        &'a self,
        i: usize,
        j: usize,
        symbol: &'a NonTerminal,
    ) -> impl Iterator<Item = &'a ChartEntry> + 'a {
        self.cell(i, j)
            .iter()
            .filter(move |entry| entry.lhs() == symbol)
    }

    pub fn contains(&self, i: usize, j: usize, symbol: &NonTerminal) -> bool {
        self.entries_for(i, j, symbol).next().is_some()
    }

    /// Whether `start` derives the whole sentence. Never true for an empty one.
    pub fn derives(&self, start: &NonTerminal) -> bool {
        !self.is_empty() && self.contains(0, self.len(), start)
    }

    pub fn entry_count(&self) -> usize {
        self.table.iter().flatten().map(Cell::len).sum()
    }

    pub fn display_with<'a>(&'a self, start: &'a NonTerminal) -> ChartDisplay<'a> {
        ChartDisplay {
            chart: self,
            start: Some(start),
        }
    }

    fn render_table(&self) -> String {
        let n = self.len();
        let mut builder = Builder::default();

        for i in 0..n {
            builder.push_record((1..=n).map(|j| {
                if j > i {
                    let symbols = self.symbols(i, j);
                    format!(
                        "[{},{}) = {}",
                        i,
                        j,
                        if symbols.is_empty() {
                            "∅".to_string()
                        } else {
                            format!("{{{}}}", symbols.iter().join(", "))
                        }
                    )
                } else {
                    String::new()
                }
            }));
        }

        builder.insert_record(0, (1..=n).map(|j| format!("j = {} ({})", j, self.tokens[j - 1])));
        builder.insert_column(
            0,
            std::iter::once(String::new()).chain((0..n).map(|i| format!("i = {}", i))),
        );

        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }
}

pub struct ChartDisplay<'a> {
    chart: &'a Chart,
    start: Option<&'a NonTerminal>,
}

impl Display for ChartDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sentence = self.chart.tokens.iter().join(" ");

        writeln!(f, "CKY chart for \"{}\":", sentence)?;
        if self.chart.is_empty() {
            writeln!(f, "(no tokens)")?;
        } else {
            writeln!(f, "{}", self.chart.render_table())?;
        }

        if let Some(start) = self.start {
            let derives = self.chart.derives(start);
            writeln!(
                f,
                "The sentence \"{}\" is {} by the grammar, as the start symbol {} {} in the cell [0,{}).",
                sentence,
                if derives { "accepted" } else { "not accepted" },
                start,
                if derives { "is" } else { "is not" },
                self.chart.len(),
            )?;
        }

        Ok(())
    }
}

impl Display for Chart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        ChartDisplay {
            chart: self,
            start: None,
        }
        .fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(sentence: &str) -> Vec<Terminal> {
        sentence.split_whitespace().map(Terminal::new).collect()
    }

    fn lexical(lhs: &str, token: &str) -> ChartEntry {
        ChartEntry::Lexical {
            lhs: NonTerminal::new(lhs),
            token: Terminal::new(token),
        }
    }

    fn binary(lhs: &str, split: usize, left: &str, right: &str) -> ChartEntry {
        ChartEntry::Binary {
            lhs: NonTerminal::new(lhs),
            split,
            left: NonTerminal::new(left),
            right: NonTerminal::new(right),
        }
    }

    #[test]
    fn keeps_ambiguous_entries_and_drops_exact_duplicates() {
        let mut chart = Chart::new(tokens("a a a"));

        assert!(chart.insert(0, 3, binary("S", 1, "S", "S")));
        assert!(chart.insert(0, 3, binary("S", 2, "S", "S")));
        assert!(!chart.insert(0, 3, binary("S", 1, "S", "S")));

        assert_eq!(chart.cell(0, 3).len(), 2);
        assert_eq!(chart.symbols(0, 3).len(), 1);
        assert_eq!(chart.entry_count(), 2);
    }

    #[test]
    fn symbols_keep_first_derivation_order() {
        let mut chart = Chart::new(tokens("fish"));
        chart.insert(0, 1, lexical("VP", "fish"));
        chart.insert(0, 1, lexical("NP", "fish"));
        chart.insert(0, 1, lexical("VP", "fish"));

        let symbols = chart.symbols(0, 1);
        assert_eq!(
            symbols.iter().map(NonTerminal::as_str).collect::<Vec<_>>(),
            ["VP", "NP"]
        );
        assert!(chart.contains(0, 1, &NonTerminal::new("NP")));
        assert!(chart.derives(&NonTerminal::new("VP")));
        assert!(!chart.derives(&NonTerminal::new("S")));
    }

    #[test]
    fn empty_sentences_derive_nothing() {
        let chart = Chart::new(Vec::new());

        assert!(chart.is_empty());
        assert!(!chart.derives(&NonTerminal::new("S")));
        assert_eq!(chart.entry_count(), 0);
    }

    #[test]
    #[should_panic(expected = "span [2, 2) is outside a chart over 2 tokens")]
    fn rejects_empty_spans() {
        Chart::new(tokens("a b")).cell(2, 2);
    }

    #[test]
    fn renders_span_table() {
        let mut chart = Chart::new(tokens("fido barks"));
        chart.insert(0, 1, lexical("NP", "fido"));
        chart.insert(1, 2, lexical("VP", "barks"));
        chart.insert(0, 2, binary("S", 1, "NP", "VP"));

        let rendered = chart.display_with(&NonTerminal::new("S")).to_string();

        assert!(rendered.starts_with("CKY chart for \"fido barks\":\n"));
        assert!(rendered.contains("[0,1) = {NP}"));
        assert!(rendered.contains("[1,2) = {VP}"));
        assert!(rendered.contains("[0,2) = {S}"));
        assert!(rendered.contains("j = 2 (barks)"));
        assert!(rendered.ends_with(
            "The sentence \"fido barks\" is accepted by the grammar, as the start symbol S is in the cell [0,2).\n"
        ));
    }

    #[test]
    fn entries_display_their_backpointers() {
        assert_eq!(binary("S", 1, "NP", "VP").to_string(), "S -> NP VP @1");
        assert_eq!(lexical("NP", "fido").to_string(), "NP -> 'fido'");
    }
}
