//! Reader for the plain-text `.cfg` grammar format:
//!
//! ```text
//! % start S
//! # comment
//! S -> NP VP
//! NP -> Det N | 'fido'
//! Det -> "the"
//! ```
//!
//! Non-terminals are bare names, terminals are quoted with `'` or `"`. When no
//! `% start` directive is given the left-hand side of the first rule is the
//! start symbol. A line ending in `\` continues on the next one; errors in a
//! continued rule report the line it starts on.

use std::str::FromStr;

use winnow::{
    ascii::{space0, space1},
    combinator::{alt, delimited, eof, preceded, repeat, separated, terminated},
    error::{ContextError, ParseError, StrContext, StrContextValue},
    token::{one_of, take_till, take_while},
    ModalResult, Parser,
};

use crate::{
    error::GrammarError,
    grammars::{
        context_free::ContextFreeGrammar,
        types::{Grammar, NonTerminal, ProductionSymbol, Terminal},
    },
    language::Word,
};

fn non_terminal(input: &mut &str) -> ModalResult<NonTerminal> {
    (
        one_of(|c: char| c.is_alphanumeric() || c == '_' || c == '/'),
        take_while(0.., |c: char| {
            c.is_alphanumeric() || matches!(c, '_' | '/' | '^' | '<' | '>' | '-')
        }),
    )
        .take()
        .map(|name: &str| NonTerminal::new(name))
        .context(StrContext::Label("non-terminal"))
        .parse_next(input)
}

fn terminal(input: &mut &str) -> ModalResult<Terminal> {
    alt((
        delimited('\'', take_till(1.., '\''), '\''),
        delimited('"', take_till(1.., '"'), '"'),
    ))
    .map(|token: &str| Terminal::new(token))
    .context(StrContext::Label("terminal"))
    .parse_next(input)
}

fn production_symbol(input: &mut &str) -> ModalResult<ProductionSymbol> {
    alt((
        terminal.map(ProductionSymbol::Terminal),
        non_terminal.map(ProductionSymbol::NonTerminal),
    ))
    .parse_next(input)
}

fn alternative(input: &mut &str) -> ModalResult<Word<ProductionSymbol>> {
    repeat(0.., terminated(production_symbol, space0))
        .map(|symbols: Vec<ProductionSymbol>| Word(symbols))
        .parse_next(input)
}

fn production(input: &mut &str) -> ModalResult<(NonTerminal, Vec<Word<ProductionSymbol>>)> {
    terminated(
        (
            delimited(space0, non_terminal, space0),
            preceded(
                ("->", space0).context(StrContext::Expected(StrContextValue::StringLiteral("->"))),
                separated(1.., alternative, ('|', space0)),
            ),
        ),
        eof.context(StrContext::Expected(StrContextValue::Description(
            "terminal, non-terminal or `|`",
        ))),
    )
    .parse_next(input)
}

fn start_directive(input: &mut &str) -> ModalResult<NonTerminal> {
    delimited(
        (space0, '%', space0, "start", space1)
            .context(StrContext::Expected(StrContextValue::StringLiteral("% start"))),
        non_terminal,
        (space0, eof).context(StrContext::Expected(StrContextValue::Description(
            "end of line",
        ))),
    )
    .parse_next(input)
}

fn syntax_error(line: usize, error: ParseError<&str, ContextError>) -> GrammarError {
    let consumed = error.input().get(..error.offset()).unwrap_or_default();
    let message = error.inner().to_string();

    GrammarError::Syntax {
        line,
        column: consumed.chars().count() + 1,
        message: if message.trim().is_empty() {
            "unexpected input".to_string()
        } else {
            message
        },
    }
}

/// Joins `\`-continued lines, keeping the number of the first physical line.
fn logical_lines(source: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, line) in source.lines().enumerate() {
        let (number, mut text) = pending.take().unwrap_or((idx + 1, String::new()));
        match line.trim_end().strip_suffix('\\') {
            Some(head) => {
                text.push_str(head);
                text.push(' ');
                pending = Some((number, text));
            }
            None => {
                text.push_str(line);
                lines.push((number, text));
            }
        }
    }

    lines.extend(pending);
    lines
}

/// Parses one rule line into its left-hand side and its `|`-separated
/// alternatives. `line_number` is only used for error reporting.
pub fn parse_production(
    line: &str,
    line_number: usize,
) -> Result<(NonTerminal, Vec<Word<ProductionSymbol>>), GrammarError> {
    production
        .parse(line)
        .map_err(|error| syntax_error(line_number, error))
}

pub fn parse_grammar(source: &str) -> Result<ContextFreeGrammar, GrammarError> {
    let mut start_symbol = None;
    let mut rules = Vec::new();

    for (number, line) in logical_lines(source) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if trimmed.starts_with('%') {
            let directive = start_directive
                .parse(line.as_str())
                .map_err(|error| syntax_error(number, error))?;
            start_symbol = Some(directive);
        } else {
            rules.push(parse_production(&line, number)?);
        }
    }

    let start_symbol = start_symbol
        .or_else(|| rules.first().map(|(lhs, _)| lhs.clone()))
        .ok_or(GrammarError::Empty)?;
    if rules.is_empty() {
        return Err(GrammarError::Empty);
    }

    let mut grammar = ContextFreeGrammar::new(start_symbol);
    for (lhs, alternatives) in rules {
        for rhs in alternatives {
            grammar.insert_production(lhs.clone(), rhs);
        }
    }

    tracing::debug!(
        start = %grammar.start_symbol(),
        productions = grammar.production_count(),
        "loaded grammar"
    );

    Ok(grammar)
}

impl FromStr for ContextFreeGrammar {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_grammar(s)
    }
}
