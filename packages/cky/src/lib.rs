//! Chart parsing for grammars in Chomsky normal form.
//!
//! A [`ContextFreeGrammar`] is read from text, checked into a
//! [`ChomskyNormalFormGrammar`], indexed by right-hand side and used to fill
//! a CKY [`Chart`] for each sentence. Every parse tree the chart licenses can
//! then be rebuilt from its backpointers.
//!
//! ```
//! use cky::{ContextFreeGrammar, Parser};
//!
//! let grammar: ContextFreeGrammar = "
//!     S -> NP VP
//!     NP -> Det N
//!     Det -> 'the'
//!     N -> 'dog'
//!     VP -> 'barks'
//! "
//! .parse()
//! .unwrap();
//!
//! let parse = Parser::from_grammar(&grammar).unwrap().parse_sentence("the dog barks");
//! assert_eq!(parse.count(), 1);
//! assert_eq!(parse.trees[0].to_string(), "(S (NP (Det the) (N dog)) (VP barks))");
//! ```

pub mod error;
pub mod grammars;
pub mod language;
pub mod parser;
pub mod parsing;
pub mod tokenizer;

pub use error::GrammarError;
pub use grammars::{
    chomsky_normal_form::{ChomskyNormalFormGrammar, CnfWord, Production},
    context_free::ContextFreeGrammar,
    loader::parse_grammar,
    types::{Grammar, NonTerminal, ProductionSymbol, Terminal},
};
pub use parser::{Parse, Parser, ParserOptions};
pub use parsing::{
    chart::{Chart, ChartEntry},
    cky::build_chart,
    index::ProductionIndex,
    trees::{count_trees, extract_trees, ParseTree, TreeExtractor, Trees},
};
pub use tokenizer::tokenize;
