use std::{fmt::Display, rc::Rc};

use indexmap::IndexMap;
use itertools::Itertools;

use crate::{
    grammars::{
        chomsky_normal_form::{CnfWord, Production},
        types::{NonTerminal, Terminal},
    },
    parsing::chart::{Chart, ChartEntry},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParseTree {
    Leaf {
        label: NonTerminal,
        token: Terminal,
    },
    Node {
        label: NonTerminal,
        children: Box<(ParseTree, ParseTree)>,
    },
}

impl ParseTree {
    pub fn leaf(label: NonTerminal, token: Terminal) -> Self {
        ParseTree::Leaf { label, token }
    }

    pub fn node(label: NonTerminal, left: ParseTree, right: ParseTree) -> Self {
        ParseTree::Node {
            label,
            children: Box::new((left, right)),
        }
    }

    pub fn label(&self) -> &NonTerminal {
        match self {
            ParseTree::Leaf { label, .. } | ParseTree::Node { label, .. } => label,
        }
    }

    pub fn token(&self) -> Option<&Terminal> {
        match self {
            ParseTree::Leaf { token, .. } => Some(token),
            ParseTree::Node { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(&ParseTree, &ParseTree)> {
        match self {
            ParseTree::Leaf { .. } => None,
            ParseTree::Node { children, .. } => Some((&children.0, &children.1)),
        }
    }

    /// The tokens covered by this tree, left to right.
    pub fn leaves(&self) -> Vec<&Terminal> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];

        while let Some(tree) = stack.pop() {
            match tree {
                ParseTree::Leaf { token, .. } => leaves.push(token),
                ParseTree::Node { children, .. } => {
                    stack.push(&children.1);
                    stack.push(&children.0);
                }
            }
        }

        leaves
    }

    /// Every rule application in the tree, in pre-order.
    pub fn productions(&self) -> Vec<Production> {
        let mut productions = Vec::new();
        let mut stack = vec![self];

        while let Some(tree) = stack.pop() {
            match tree {
                ParseTree::Leaf { label, token } => productions.push(Production::new(
                    label.clone(),
                    CnfWord::Terminal(token.clone()),
                )),
                ParseTree::Node { label, children } => {
                    productions.push(Production::new(
                        label.clone(),
                        CnfWord::NonTerminals(
                            children.0.label().clone(),
                            children.1.label().clone(),
                        ),
                    ));
                    stack.push(&children.1);
                    stack.push(&children.0);
                }
            }
        }

        productions
    }

    pub fn depth(&self) -> usize {
        match self {
            ParseTree::Leaf { .. } => 1,
            ParseTree::Node { children, .. } => 1 + children.0.depth().max(children.1.depth()),
        }
    }
}

impl Display for ParseTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseTree::Leaf { label, token } => write!(f, "({label} {token})"),
            ParseTree::Node { label, children } => {
                write!(f, "({label} {} {})", children.0, children.1)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trees {
    pub trees: Vec<ParseTree>,
    /// Number of trees the chart licenses, whether or not all were built.
    pub total: u128,
    pub truncated: bool,
}

/// Expands chart backpointers into parse trees.
///
/// Expansions are memoized on `(i, j, symbol)` for the lifetime of the
/// extractor, so a sub-span reached through many parents is only expanded
/// once. With a limit, every expansion keeps only its first `limit` trees,
/// which yields exactly the first `limit` trees of the unlimited enumeration.
pub struct TreeExtractor<'a> {
    chart: &'a Chart,
    limit: Option<usize>,
    memo: IndexMap<(usize, usize, NonTerminal), Rc<[ParseTree]>>,
}

impl<'a> TreeExtractor<'a> {
    pub fn new(chart: &'a Chart) -> Self {
        Self {
            chart,
            limit: None,
            memo: IndexMap::new(),
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        if self.limit != limit {
            self.memo.clear();
        }
        self.limit = limit;
        self
    }

    pub fn extract(&mut self, start: &NonTerminal) -> Trees {
        let _span = tracing::debug_span!("extract_trees", start = %start).entered();

        let total = count_trees(self.chart, start);
        if !self.chart.derives(start) {
            return Trees {
                trees: Vec::new(),
                total,
                truncated: false,
            };
        }

        let trees = self.expand(0, self.chart.len(), start).to_vec();
        let truncated = total > trees.len() as u128;
        if truncated {
            tracing::warn!(total, kept = trees.len(), "parse tree output capped");
        }

        tracing::debug!(total, memoized = self.memo.len(), "trees extracted");

        Trees {
            trees,
            total,
            truncated,
        }
    }

    fn is_full(&self, trees: &[ParseTree]) -> bool {
        self.limit.is_some_and(|limit| trees.len() >= limit)
    }

    fn expand(&mut self, i: usize, j: usize, symbol: &NonTerminal) -> Rc<[ParseTree]> {
        let key = (i, j, symbol.clone());
        if let Some(trees) = self.memo.get(&key) {
            return trees.clone();
        }

        let chart = self.chart;
        let mut trees = Vec::new();

        for entry in chart.entries_for(i, j, symbol) {
            if self.is_full(&trees) {
                break;
            }

            match entry {
                ChartEntry::Lexical { token, .. } => {
                    trees.push(ParseTree::leaf(symbol.clone(), token.clone()));
                }
                ChartEntry::Binary {
                    split, left, right, ..
                } => {
                    let left_trees = self.expand(i, *split, left);
                    let right_trees = self.expand(*split, j, right);

                    for (l, r) in left_trees.iter().cartesian_product(right_trees.iter()) {
                        if self.is_full(&trees) {
                            break;
                        }
                        trees.push(ParseTree::node(symbol.clone(), l.clone(), r.clone()));
                    }
                }
            }
        }

        let trees: Rc<[ParseTree]> = trees.into();
        self.memo.insert(key, trees.clone());
        trees
    }
}

/// Every parse tree of the whole sentence rooted at `start`. Empty when the
/// sentence is not derivable.
///
/// The number of trees grows exponentially with sentence length for
/// ambiguous grammars; use [`TreeExtractor::with_limit`] to cap it.
pub fn extract_trees(chart: &Chart, start: &NonTerminal) -> Vec<ParseTree> {
    TreeExtractor::new(chart).extract(start).trees
}

/// Number of distinct parse trees of the whole sentence rooted at `start`,
/// computed without building them. Saturates at `u128::MAX`.
pub fn count_trees(chart: &Chart, start: &NonTerminal) -> u128 {
    fn count(
        chart: &Chart,
        i: usize,
        j: usize,
        symbol: &NonTerminal,
        memo: &mut IndexMap<(usize, usize, NonTerminal), u128>,
    ) -> u128 {
        let key = (i, j, symbol.clone());
        if let Some(&total) = memo.get(&key) {
            return total;
        }

        let mut total: u128 = 0;
        for entry in chart.entries_for(i, j, symbol) {
            let derivations = match entry {
                ChartEntry::Lexical { .. } => 1,
                ChartEntry::Binary {
                    split, left, right, ..
                } => count(chart, i, *split, left, memo)
                    .saturating_mul(count(chart, *split, j, right, memo)),
            };
            total = total.saturating_add(derivations);
        }

        memo.insert(key, total);
        total
    }

    if !chart.derives(start) {
        return 0;
    }

    count(chart, 0, chart.len(), start, &mut IndexMap::new())
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;
    use crate::{
        grammars::context_free::ContextFreeGrammar,
        parsing::{cky::build_chart, index::ProductionIndex},
    };

    fn chart(productions: &[&str], sentence: &str) -> Chart {
        let grammar = ContextFreeGrammar::from_productions("S", productions).unwrap();
        let index = ProductionIndex::build(&grammar).unwrap();
        let tokens = sentence
            .split_whitespace()
            .map(Terminal::new)
            .collect::<Vec<_>>();
        build_chart(&index, &tokens)
    }

    fn render(trees: &[ParseTree]) -> String {
        trees.iter().map(|tree| format!("{tree}\n")).collect()
    }

    fn s() -> NonTerminal {
        NonTerminal::new("S")
    }

    const CATALAN: [&str; 2] = ["S -> S S", "S -> 'a'"];

    #[test]
    fn rebuilds_a_single_derivation() {
        let chart = chart(
            &["S -> NP VP", "NP -> Det N", "Det -> 'the'", "N -> 'dog'", "VP -> 'barks'"],
            "the dog barks",
        );

        expect![[r#"
            (S (NP (Det the) (N dog)) (VP barks))
        "#]]
        .assert_eq(&render(&extract_trees(&chart, &s())));
    }

    #[test]
    fn enumerates_splits_then_left_before_right() {
        let chart = chart(&CATALAN, "a a a a");

        expect![[r#"
            (S (S a) (S (S a) (S (S a) (S a))))
            (S (S a) (S (S (S a) (S a)) (S a)))
            (S (S (S a) (S a)) (S (S a) (S a)))
            (S (S (S a) (S (S a) (S a))) (S a))
            (S (S (S (S a) (S a)) (S a)) (S a))
        "#]]
        .assert_eq(&render(&extract_trees(&chart, &s())));
    }

    #[test]
    fn counts_match_enumeration() {
        for (n, catalan) in [1, 1, 2, 5, 14, 42, 132].into_iter().enumerate() {
            let sentence = vec!["a"; n + 1].join(" ");
            let chart = chart(&CATALAN, &sentence);

            assert_eq!(count_trees(&chart, &s()), catalan);
            assert_eq!(extract_trees(&chart, &s()).len() as u128, catalan);
        }
    }

    #[test]
    fn limit_keeps_a_prefix_and_reports_truncation() {
        let chart = chart(&CATALAN, "a a a a");
        let all = extract_trees(&chart, &s());

        let capped = TreeExtractor::new(&chart).with_limit(Some(3)).extract(&s());
        assert_eq!(capped.trees, all[..3]);
        assert_eq!(capped.total, 5);
        assert!(capped.truncated);

        let roomy = TreeExtractor::new(&chart).with_limit(Some(5)).extract(&s());
        assert_eq!(roomy.trees, all);
        assert!(!roomy.truncated);
    }

    #[test]
    fn underivable_sentences_have_no_trees() {
        let chart = chart(&["S -> A A", "A -> 'a'"], "a a a");

        assert!(extract_trees(&chart, &s()).is_empty());
        assert_eq!(count_trees(&chart, &s()), 0);
        assert!(extract_trees(&chart, &NonTerminal::new("Nope")).is_empty());
    }

    #[test]
    fn trees_expose_their_shape() {
        let chart = chart(&["S -> A B", "A -> 'a'", "B -> 'b'"], "a b");
        let trees = extract_trees(&chart, &s());
        let tree = &trees[0];

        assert_eq!(tree.label(), &s());
        assert_eq!(tree.token(), None);
        assert_eq!(tree.depth(), 2);
        assert_eq!(
            tree.leaves().iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            ["a", "b"]
        );

        let (left, right) = tree.children().unwrap();
        assert_eq!(left.token(), Some(&Terminal::new("a")));
        assert_eq!(right.label(), &NonTerminal::new("B"));
        assert_eq!(
            tree.productions()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            ["S -> A B", "A -> 'a'", "B -> 'b'"]
        );
    }
}
