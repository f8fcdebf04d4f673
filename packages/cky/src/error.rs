use thiserror::Error;

use crate::{
    grammars::types::{NonTerminal, ProductionSymbol},
    language::Word,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error(
        "production `{lhs} -> {rhs}` is not in Chomsky normal form: the right-hand side must be exactly one terminal or exactly two non-terminals"
    )]
    UnsupportedGrammarForm {
        lhs: NonTerminal,
        rhs: Word<ProductionSymbol>,
    },
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("grammar has no productions")]
    Empty,
    #[error("start symbol `{0}` does not occur in the grammar")]
    UnknownStartSymbol(NonTerminal),
}
