use indexmap::{IndexMap, IndexSet};

use crate::{
    error::GrammarError,
    grammars::{
        loader,
        types::{Grammar, NonTerminal, ProductionSymbol},
    },
    language::Word,
};

/// A grammar as written by its author: right-hand sides of any length.
#[derive(Debug, Clone)]
pub struct ContextFreeGrammar {
    pub(super) start_symbol: NonTerminal,
    pub(super) productions: IndexMap<NonTerminal, IndexSet<Word<ProductionSymbol>>>,
}

impl Grammar<Word<ProductionSymbol>> for ContextFreeGrammar {
    fn new(start_symbol: NonTerminal) -> Self {
        Self {
            start_symbol,
            productions: IndexMap::new(),
        }
    }

    fn start_symbol(&self) -> &NonTerminal {
        &self.start_symbol
    }

    fn productions(&self) -> &IndexMap<NonTerminal, IndexSet<Word<ProductionSymbol>>> {
        &self.productions
    }

    fn insert_production(&mut self, lhs: NonTerminal, rhs: Word<ProductionSymbol>) -> bool {
        self.productions.entry(lhs).or_default().insert(rhs)
    }
}

impl ContextFreeGrammar {
    /// Builds a grammar from rule lines such as `"NP -> Det N | 'fido'"`.
    pub fn from_productions<S: AsRef<str>>(
        start_symbol: S,
        productions: &[impl AsRef<str>],
    ) -> Result<Self, GrammarError> {
        let mut grammar = Self::new(NonTerminal::new(start_symbol));

        for (idx, line) in productions.iter().enumerate() {
            let (lhs, alternatives) = loader::parse_production(line.as_ref(), idx + 1)?;
            for rhs in alternatives {
                grammar.insert_production(lhs.clone(), rhs);
            }
        }

        Ok(grammar)
    }
}
