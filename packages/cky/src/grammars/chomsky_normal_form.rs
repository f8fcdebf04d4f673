use std::fmt::Display;

use indexmap::{IndexMap, IndexSet};

use crate::{
    error::GrammarError,
    grammars::{
        context_free::ContextFreeGrammar,
        types::{Grammar, NonTerminal, ProductionSymbol, ProductionWord, Terminal},
    },
    language::Word,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CnfWord {
    Terminal(Terminal),
    NonTerminals(NonTerminal, NonTerminal),
}

impl Display for CnfWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CnfWord::Terminal(t) => write!(f, "'{t}'"),
            CnfWord::NonTerminals(nt1, nt2) => write!(f, "{nt1} {nt2}"),
        }
    }
}

impl ProductionWord for CnfWord {
    fn from_word(word: &Word<ProductionSymbol>) -> Option<Self> {
        match word.0.as_slice() {
            [ProductionSymbol::Terminal(t)] => Some(CnfWord::Terminal(t.clone())),
            [ProductionSymbol::NonTerminal(nt1), ProductionSymbol::NonTerminal(nt2)] => {
                Some(CnfWord::NonTerminals(nt1.clone(), nt2.clone()))
            }
            _ => None,
        }
    }

    fn to_word(&self) -> Word<ProductionSymbol> {
        match self {
            CnfWord::Terminal(t) => Word(vec![ProductionSymbol::Terminal(t.clone())]),
            CnfWord::NonTerminals(nt1, nt2) => Word(vec![
                ProductionSymbol::NonTerminal(nt1.clone()),
                ProductionSymbol::NonTerminal(nt2.clone()),
            ]),
        }
    }
}

/// A single rule `lhs -> rhs` of a grammar in Chomsky normal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub lhs: NonTerminal,
    pub rhs: CnfWord,
}

impl Production {
    pub fn new(lhs: NonTerminal, rhs: CnfWord) -> Self {
        Self { lhs, rhs }
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.lhs, self.rhs)
    }
}

#[derive(Debug, Clone)]
pub struct ChomskyNormalFormGrammar {
    pub(super) start_symbol: NonTerminal,
    pub(super) productions: IndexMap<NonTerminal, IndexSet<CnfWord>>,
}

impl Grammar<CnfWord> for ChomskyNormalFormGrammar {
    fn new(start_symbol: NonTerminal) -> Self {
        Self {
            start_symbol,
            productions: IndexMap::new(),
        }
    }

    fn start_symbol(&self) -> &NonTerminal {
        &self.start_symbol
    }

    fn productions(&self) -> &IndexMap<NonTerminal, IndexSet<CnfWord>> {
        &self.productions
    }

    fn insert_production(&mut self, lhs: NonTerminal, rhs: CnfWord) -> bool {
        self.productions.entry(lhs).or_default().insert(rhs)
    }
}

impl TryFrom<&ContextFreeGrammar> for ChomskyNormalFormGrammar {
    type Error = GrammarError;

    /// Fails on the first rule, in grammar order, whose right-hand side is not
    /// one terminal or two non-terminals. Nothing is converted or dropped.
    fn try_from(cfg: &ContextFreeGrammar) -> Result<Self, Self::Error> {
        let mut cnf = Self::new(cfg.start_symbol.clone());

        for (lhs, rhs) in &cfg.productions {
            for word in rhs {
                cnf.add_production(lhs.clone(), word.clone())?;
            }
        }

        Ok(cnf)
    }
}

impl TryFrom<ContextFreeGrammar> for ChomskyNormalFormGrammar {
    type Error = GrammarError;

    fn try_from(cfg: ContextFreeGrammar) -> Result<Self, Self::Error> {
        Self::try_from(&cfg)
    }
}

impl ChomskyNormalFormGrammar {
    pub fn rules(&self) -> impl Iterator<Item = Production> + '_ {
        self.productions.iter().flat_map(|(lhs, rhs)| {
            rhs.iter()
                .map(move |word| Production::new(lhs.clone(), word.clone()))
        })
    }

    pub fn has_production(&self, production: &Production) -> bool {
        self.productions
            .get(&production.lhs)
            .is_some_and(|rhs| rhs.contains(&production.rhs))
    }
}
