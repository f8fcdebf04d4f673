use itertools::Itertools;

use crate::{
    grammars::types::Terminal,
    parsing::{
        chart::{Chart, ChartEntry},
        index::ProductionIndex,
    },
};

/// Fills a chart bottom-up over `tokens`.
///
/// Columns are completed left to right; within the column ending at `j` the
/// spans are visited from the shortest (`[j - 2, j)`) to the longest
/// (`[0, j)`), so both halves of every split are final before they are read.
/// An out-of-vocabulary token leaves its cell empty and every span covering it
/// underivable.
pub fn build_chart(index: &ProductionIndex, tokens: &[Terminal]) -> Chart {
    let _span = tracing::debug_span!("build_chart", tokens = tokens.len()).entered();

    let mut chart = Chart::new(tokens);

    for j in 1..=tokens.len() {
        let token = &tokens[j - 1];

        let mut matched = false;
        for lhs in index.lexical(token) {
            matched = true;
            chart.insert(
                j - 1,
                j,
                ChartEntry::Lexical {
                    lhs: lhs.clone(),
                    token: token.clone(),
                },
            );
        }
        if !matched {
            tracing::trace!(position = j - 1, %token, "no lexical rule for token");
        }

        for i in (0..j.saturating_sub(1)).rev() {
            for k in i + 1..j {
                let left_symbols = chart.symbols(i, k);
                let right_symbols = chart.symbols(k, j);

                for (left, right) in left_symbols.iter().cartesian_product(right_symbols.iter()) {
                    for lhs in index.binary(left, right) {
                        chart.insert(
                            i,
                            j,
                            ChartEntry::Binary {
                                lhs: lhs.clone(),
                                split: k,
                                left: left.clone(),
                                right: right.clone(),
                            },
                        );
                    }
                }
            }
        }
    }

    tracing::debug!(entries = chart.entry_count(), "chart complete");

    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::{context_free::ContextFreeGrammar, types::NonTerminal};

    fn index(productions: &[&str]) -> ProductionIndex {
        ProductionIndex::build(&ContextFreeGrammar::from_productions("S", productions).unwrap())
            .unwrap()
    }

    fn tokens(sentence: &str) -> Vec<Terminal> {
        sentence.split_whitespace().map(Terminal::new).collect()
    }

    fn symbols(chart: &Chart, i: usize, j: usize) -> Vec<String> {
        chart.symbols(i, j).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn fills_every_derivable_span() {
        let index = index(&[
            "S -> NP VP",
            "NP -> Det N",
            "VP -> V NP",
            "Det -> 'the'",
            "N -> 'dog' | 'cat'",
            "V -> 'saw'",
        ]);
        let chart = build_chart(&index, &tokens("the dog saw the cat"));

        assert_eq!(symbols(&chart, 0, 2), ["NP"]);
        assert_eq!(symbols(&chart, 2, 5), ["VP"]);
        assert_eq!(symbols(&chart, 0, 5), ["S"]);
        assert!(chart.cell(1, 3).is_empty());
        assert!(chart.derives(&NonTerminal::new("S")));
    }

    #[test]
    fn records_every_split_of_an_ambiguous_span() {
        let index = index(&["S -> S S", "S -> 'a'"]);
        let chart = build_chart(&index, &tokens("a a a"));

        let splits = chart
            .cell(0, 3)
            .iter()
            .map(|entry| match entry {
                ChartEntry::Binary { split, .. } => *split,
                ChartEntry::Lexical { .. } => unreachable!(),
            })
            .collect::<Vec<_>>();
        assert_eq!(splits, [1, 2]);
    }

    #[test]
    fn different_rules_over_the_same_children_are_kept() {
        let index = index(&["S -> A A", "T -> A A", "A -> 'a'"]);
        let chart = build_chart(&index, &tokens("a a"));

        assert_eq!(symbols(&chart, 0, 2), ["S", "T"]);
    }

    #[test]
    fn unknown_tokens_leave_holes() {
        let index = index(&["S -> A A", "A -> 'a'"]);
        let chart = build_chart(&index, &tokens("a b"));

        assert_eq!(symbols(&chart, 0, 1), ["A"]);
        assert!(chart.cell(1, 2).is_empty());
        assert!(chart.cell(0, 2).is_empty());
    }

    #[test]
    fn empty_input_builds_an_empty_chart() {
        let chart = build_chart(&index(&["S -> 'a'"]), &[]);

        assert!(chart.is_empty());
        assert_eq!(chart.entry_count(), 0);
    }
}
