use indexmap::{IndexMap, IndexSet};

use crate::{
    error::GrammarError,
    grammars::{
        chomsky_normal_form::{ChomskyNormalFormGrammar, CnfWord, Production},
        context_free::ContextFreeGrammar,
        types::{NonTerminal, Terminal},
    },
};

/// Rules of a grammar keyed by their complete right-hand side, so both
/// `A -> 'w'` and `A -> B C` are found with a single lookup.
#[derive(Debug, Clone, Default)]
pub struct ProductionIndex {
    by_rhs: IndexMap<CnfWord, IndexSet<NonTerminal>>,
}

impl ProductionIndex {
    /// Checks that every rule of `grammar` is in Chomsky normal form and
    /// indexes it. A single offending rule rejects the whole grammar.
    pub fn build(grammar: &ContextFreeGrammar) -> Result<Self, GrammarError> {
        let cnf = ChomskyNormalFormGrammar::try_from(grammar)?;
        Ok(Self::from(&cnf))
    }

    pub fn insert(&mut self, production: Production) -> bool {
        self.by_rhs
            .entry(production.rhs)
            .or_default()
            .insert(production.lhs)
    }

    pub fn lookup(&self, rhs: &CnfWord) -> impl Iterator<Item = &NonTerminal> + '_ {
        self.by_rhs.get(rhs).into_iter().flatten()
    }

    pub fn lexical(&self, token: &Terminal) -> impl Iterator<Item = &NonTerminal> + '_ {
        self.lookup(&CnfWord::Terminal(token.clone()))
    }

    pub fn binary(
        &self,
        left: &NonTerminal,
        right: &NonTerminal,
    ) -> impl Iterator<Item = &NonTerminal> + '_ {
        self.lookup(&CnfWord::NonTerminals(left.clone(), right.clone()))
    }

    pub fn productions(&self) -> impl Iterator<Item = Production> + '_ {
        self.by_rhs.iter().flat_map(|(rhs, lhs)| {
            lhs.iter()
                .map(move |lhs| Production::new(lhs.clone(), rhs.clone()))
        })
    }

    /// Number of indexed productions.
    pub fn len(&self) -> usize {
        self.by_rhs.values().map(IndexSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_rhs.is_empty()
    }
}

impl From<&ChomskyNormalFormGrammar> for ProductionIndex {
    fn from(grammar: &ChomskyNormalFormGrammar) -> Self {
        let mut index = Self::default();
        for production in grammar.rules() {
            index.insert(production);
        }

        tracing::debug!(
            productions = index.len(),
            keys = index.by_rhs.len(),
            "built production index"
        );

        index
    }
}

impl FromIterator<Production> for ProductionIndex {
    fn from_iter<T: IntoIterator<Item = Production>>(iter: T) -> Self {
        let mut index = Self::default();
        for production in iter {
            index.insert(production);
        }
        index
    }
}
