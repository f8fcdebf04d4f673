use itertools::Itertools;

use crate::{
    error::GrammarError,
    grammars::{
        chomsky_normal_form::ChomskyNormalFormGrammar,
        context_free::ContextFreeGrammar,
        types::{Grammar, NonTerminal, Terminal},
    },
    parsing::{
        chart::Chart,
        cky::build_chart,
        index::ProductionIndex,
        trees::{ParseTree, TreeExtractor},
    },
    tokenizer::tokenize,
};

#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Root of every returned tree. Defaults to the grammar's start symbol.
    pub start_symbol: Option<NonTerminal>,
    /// Cap on the trees built per sentence. The full count is still reported.
    pub max_trees: Option<usize>,
    /// Worker threads used by [`Parser::parse_batch`].
    pub threads: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            start_symbol: None,
            max_trees: None,
            threads: 1,
        }
    }
}

impl ParserOptions {
    pub fn start_symbol(mut self, start_symbol: NonTerminal) -> Self {
        self.start_symbol = Some(start_symbol);
        self
    }

    pub fn max_trees(mut self, max_trees: usize) -> Self {
        self.max_trees = Some(max_trees);
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }
}

/// Result of parsing one sentence. Zero trees is an ordinary outcome.
#[derive(Debug, Clone)]
pub struct Parse {
    pub tokens: Vec<Terminal>,
    pub chart: Chart,
    pub trees: Vec<ParseTree>,
    /// Number of trees the grammar licenses, even when `trees` was capped.
    pub total: u128,
    pub truncated: bool,
}

impl Parse {
    pub fn count(&self) -> u128 {
        self.total
    }

    pub fn is_parsed(&self) -> bool {
        self.total > 0
    }

    pub fn sentence(&self) -> String {
        self.tokens.iter().join(" ")
    }
}

/// A grammar ready for parsing: its production index is built once and
/// shared by every sentence.
#[derive(Debug, Clone)]
pub struct Parser {
    grammar: ChomskyNormalFormGrammar,
    index: ProductionIndex,
    options: ParserOptions,
}

impl Parser {
    pub fn new(grammar: ChomskyNormalFormGrammar) -> Self {
        let index = ProductionIndex::from(&grammar);

        Self {
            grammar,
            index,
            options: ParserOptions::default(),
        }
    }

    pub fn from_grammar(grammar: &ContextFreeGrammar) -> Result<Self, GrammarError> {
        Ok(Self::new(ChomskyNormalFormGrammar::try_from(grammar)?))
    }

    pub fn with_options(mut self, options: ParserOptions) -> Result<Self, GrammarError> {
        if let Some(start) = &options.start_symbol {
            if !self.grammar.non_terminals().contains(start) {
                return Err(GrammarError::UnknownStartSymbol(start.clone()));
            }
        }

        self.options = options;
        Ok(self)
    }

    pub fn grammar(&self) -> &ChomskyNormalFormGrammar {
        &self.grammar
    }

    pub fn index(&self) -> &ProductionIndex {
        &self.index
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn start_symbol(&self) -> &NonTerminal {
        self.options
            .start_symbol
            .as_ref()
            .unwrap_or_else(|| self.grammar.start_symbol())
    }

    pub fn parse_tokens(&self, tokens: impl Into<Vec<Terminal>>) -> Parse {
        let tokens = tokens.into();
        let chart = build_chart(&self.index, &tokens);

        let extracted = TreeExtractor::new(&chart)
            .with_limit(self.options.max_trees)
            .extract(self.start_symbol());

        tracing::debug!(
            tokens = tokens.len(),
            parses = extracted.total,
            "parsed sentence"
        );

        Parse {
            tokens,
            trees: extracted.trees,
            total: extracted.total,
            truncated: extracted.truncated,
            chart,
        }
    }

    /// Parses pre-split words. Empty strings are not words and are skipped.
    pub fn parse_words<S: AsRef<str>>(&self, words: &[S]) -> Parse {
        self.parse_tokens(
            words
                .iter()
                .map(|word| -> &str { word.as_ref() })
                .filter(|word| !word.is_empty())
                .map(Terminal::new)
                .collect::<Vec<_>>(),
        )
    }

    pub fn parse_sentence(&self, sentence: &str) -> Parse {
        self.parse_tokens(tokenize(sentence))
    }

    /// Parses independent sentences, fanning them out over
    /// [`ParserOptions::threads`] workers. Results keep the input order.
    pub fn parse_batch<S: AsRef<str> + Sync>(&self, sentences: &[S]) -> Vec<Parse> {
        let threads = self.options.threads.min(sentences.len());
        if threads <= 1 {
            return sentences
                .iter()
                .map(|sentence| self.parse_sentence(sentence.as_ref()))
                .collect();
        }

        let chunk_size = sentences.len().div_ceil(threads);
        tracing::debug!(sentences = sentences.len(), threads, "parsing batch");

        std::thread::scope(|scope| {
            let workers = sentences
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|sentence| self.parse_sentence(sentence.as_ref()))
                            .collect::<Vec<_>>()
                    })
                })
                .collect::<Vec<_>>();

            workers
                .into_iter()
                .flat_map(|worker| match worker.join() {
                    Ok(parses) => parses,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(productions: &[&str]) -> Parser {
        Parser::from_grammar(&ContextFreeGrammar::from_productions("S", productions).unwrap())
            .unwrap()
    }

    fn toy() -> Parser {
        parser(&[
            "S -> NP VP",
            "NP -> Det N",
            "VP -> V NP | 'barks'",
            "Det -> 'the'",
            "N -> 'dog' | 'cat'",
            "V -> 'sees'",
        ])
    }

    #[test]
    fn empty_words_are_skipped() {
        let parser = toy();

        assert_eq!(parser.parse_words(&["the", "", "dog", "barks"]).count(), 1);
        assert!(parser.parse_words(&[""]).tokens.is_empty());
    }

    #[test]
    fn parses_tokenized_sentences() {
        let parse = toy().parse_sentence("the dog sees the cat");

        assert!(parse.is_parsed());
        assert_eq!(parse.count(), 1);
        assert_eq!(
            parse.trees[0].to_string(),
            "(S (NP (Det the) (N dog)) (VP (V sees) (NP (Det the) (N cat))))"
        );
        assert_eq!(parse.sentence(), "the dog sees the cat");
    }

    #[test]
    fn no_parse_is_not_an_error() {
        let parser = toy();

        for sentence in ["the dog", "the bird barks", "", "dog the barks"] {
            let parse = parser.parse_sentence(sentence);
            assert!(!parse.is_parsed(), "{sentence}");
            assert!(parse.trees.is_empty());
            assert!(!parse.truncated);
        }
    }

    #[test]
    fn start_symbol_can_be_overridden() {
        let parser = toy()
            .with_options(ParserOptions::default().start_symbol(NonTerminal::new("NP")))
            .unwrap();

        assert_eq!(parser.start_symbol(), &NonTerminal::new("NP"));
        assert_eq!(parser.parse_words(&["the", "cat"]).count(), 1);
        assert_eq!(parser.parse_words(&["the", "cat", "barks"]).count(), 0);
    }

    #[test]
    fn unknown_start_symbols_are_rejected() {
        let err = toy()
            .with_options(ParserOptions::default().start_symbol(NonTerminal::new("TOP")))
            .unwrap_err();

        assert_eq!(err, GrammarError::UnknownStartSymbol(NonTerminal::new("TOP")));
    }

    #[test]
    fn caps_tree_output() {
        let parser = parser(&["S -> S S", "S -> 'a'"])
            .with_options(ParserOptions::default().max_trees(10))
            .unwrap();

        let parse = parser.parse_words(&["a"; 8]);
        assert_eq!(parse.trees.len(), 10);
        assert_eq!(parse.count(), 429);
        assert!(parse.truncated);
    }

    #[test]
    fn threaded_batches_keep_input_order() {
        let sentences = [
            "the dog barks",
            "the cat barks",
            "barks",
            "the dog sees the cat",
            "the cat sees the dog",
        ];
        let sequential = toy().parse_batch(&sentences);
        let threaded = toy()
            .with_options(ParserOptions::default().threads(3))
            .unwrap()
            .parse_batch(&sentences);

        assert_eq!(threaded.len(), sentences.len());
        for (a, b) in sequential.iter().zip(&threaded) {
            assert_eq!(a.sentence(), b.sentence());
            assert_eq!(a.trees, b.trees);
        }
        assert_eq!(
            threaded.iter().map(Parse::count).collect::<Vec<_>>(),
            [1, 1, 0, 1, 1]
        );
    }
}
