use std::{fmt::Display, hash::Hash};

use derive_more::Display;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

use crate::{
    error::GrammarError,
    language::{Symbol, Word},
};

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Terminal(pub Symbol);

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonTerminal(pub Symbol);

impl Terminal {
    pub fn new(s: impl AsRef<str>) -> Self {
        Terminal(Symbol::new(s))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl NonTerminal {
    pub fn new(s: impl AsRef<str>) -> Self {
        NonTerminal(Symbol::new(s))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
pub enum ProductionSymbol {
    #[display("'{_0}'")]
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

/// Right-hand side shape accepted by a grammar.
pub trait ProductionWord: Display + Clone + Eq + Hash {
    fn from_word(word: &Word<ProductionSymbol>) -> Option<Self>;
    fn to_word(&self) -> Word<ProductionSymbol>;
}

impl ProductionWord for Word<ProductionSymbol> {
    fn from_word(word: &Word<ProductionSymbol>) -> Option<Self> {
        Some(word.clone())
    }

    fn to_word(&self) -> Word<ProductionSymbol> {
        self.clone()
    }
}

pub trait Grammar<R: ProductionWord> {
    fn new(start_symbol: NonTerminal) -> Self
    where
        Self: Sized;

    fn start_symbol(&self) -> &NonTerminal;
    fn productions(&self) -> &IndexMap<NonTerminal, IndexSet<R>>;

    /// Returns `false` if the exact production was already present.
    fn insert_production(&mut self, lhs: NonTerminal, rhs: R) -> bool;

    fn add_production(
        &mut self,
        lhs: NonTerminal,
        rhs: Word<ProductionSymbol>,
    ) -> Result<bool, GrammarError> {
        match R::from_word(&rhs) {
            Some(rhs) => Ok(self.insert_production(lhs, rhs)),
            None => Err(GrammarError::UnsupportedGrammarForm { lhs, rhs }),
        }
    }

    fn production_count(&self) -> usize {
        self.productions().values().map(IndexSet::len).sum()
    }

    fn non_terminals(&self) -> IndexSet<NonTerminal> {
        let mut non_terminals = IndexSet::from([self.start_symbol().clone()]);

        for (lhs, rhs) in self.productions() {
            non_terminals.insert(lhs.clone());
            for word in rhs {
                non_terminals.extend(word.to_word().0.into_iter().filter_map(|symbol| {
                    match symbol {
                        ProductionSymbol::NonTerminal(nt) => Some(nt),
                        ProductionSymbol::Terminal(_) => None,
                    }
                }));
            }
        }

        non_terminals
    }

    fn terminals(&self) -> IndexSet<Terminal> {
        self.productions()
            .values()
            .flatten()
            .flat_map(|word| word.to_word().0)
            .filter_map(|symbol| match symbol {
                ProductionSymbol::Terminal(t) => Some(t),
                ProductionSymbol::NonTerminal(_) => None,
            })
            .collect()
    }

    fn definition(&self) -> String {
        let start_symbol = self.start_symbol();

        let mut non_terminals = self.non_terminals();
        non_terminals.sort_by(|a, b| {
            if a == start_symbol {
                return std::cmp::Ordering::Less;
            }
            if b == start_symbol {
                return std::cmp::Ordering::Greater;
            }
            a.cmp(b)
        });

        let mut terminals = self.terminals();
        terminals.sort();

        let mut productions = self.productions().iter().collect::<Vec<_>>();
        productions.sort_by(|(lhs1, _), (lhs2, _)| {
            (*lhs1 != start_symbol)
                .cmp(&(*lhs2 != start_symbol))
                .then_with(|| lhs1.cmp(lhs2))
        });

        let mut definition = format!(
            "G = ({{{}}}, {{{}}}, P, {})\n\n",
            non_terminals.iter().join(", "),
            terminals.iter().join(", "),
            start_symbol
        );

        definition += "P = {\n";

        for (lhs, rhs) in productions {
            definition += &format!("  {} -> {}\n", lhs, rhs.iter().join(" | "));
        }

        definition += "}\n";

        definition
    }
}
