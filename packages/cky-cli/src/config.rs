use std::path::PathBuf;

use cky::{NonTerminal, ParserOptions};

use crate::error::CliError;

pub const USAGE: &str = "\
usage: cky [OPTIONS] <GRAMMAR> <SENTENCES> <OUTPUT>

Parses every line of SENTENCES with the CNF grammar in GRAMMAR and writes
each sentence, its parse trees and the number of parses to OUTPUT (`-` for
standard output).

options:
  --start <SYMBOL>   root symbol of the parses (default: the grammar's start)
  --max-trees <N>    write at most N trees per sentence
  --threads <N>      parse sentences on N worker threads (default: 1)
  --chart            also write the CKY chart of every sentence
  --definition       write the grammar definition before the parses
  -h, --help         print this message

Log output is controlled with RUST_LOG, e.g. RUST_LOG=cky=debug.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub grammar: PathBuf,
    pub sentences: PathBuf,
    pub output: Output,
    pub start: Option<String>,
    pub max_trees: Option<usize>,
    pub threads: usize,
    pub show_chart: bool,
    pub show_definition: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Run(Config),
    Help,
}

fn number(flag: &str, value: Option<String>) -> Result<usize, CliError> {
    let value = value.ok_or_else(|| CliError::Usage(format!("{flag} expects a value")))?;
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CliError::Usage(format!(
            "{flag} expects a positive integer, got `{value}`"
        ))),
    }
}

impl Config {
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Command, CliError> {
        let mut args = args.into_iter();
        let mut positional = Vec::new();
        let mut start = None;
        let mut max_trees = None;
        let mut threads = 1;
        let mut show_chart = false;
        let mut show_definition = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "--start" => {
                    start = Some(args.next().ok_or_else(|| {
                        CliError::Usage("--start expects a symbol".to_string())
                    })?);
                }
                "--max-trees" => max_trees = Some(number("--max-trees", args.next())?),
                "--threads" => threads = number("--threads", args.next())?,
                "--chart" => show_chart = true,
                "--definition" => show_definition = true,
                flag if flag.starts_with("--") => {
                    return Err(CliError::Usage(format!("unknown option `{flag}`")));
                }
                _ => positional.push(arg),
            }
        }

        let [grammar, sentences, output]: [String; 3] = positional.try_into().map_err(
            |positional: Vec<String>| {
                CliError::Usage(format!(
                    "expected GRAMMAR, SENTENCES and OUTPUT, got {} argument(s)",
                    positional.len()
                ))
            },
        )?;

        Ok(Command::Run(Config {
            grammar: grammar.into(),
            sentences: sentences.into(),
            output: if output == "-" {
                Output::Stdout
            } else {
                Output::File(output.into())
            },
            start,
            max_trees,
            threads,
            show_chart,
            show_definition,
        }))
    }

    pub fn parser_options(&self) -> ParserOptions {
        let mut options = ParserOptions::default().threads(self.threads);
        if let Some(start) = &self.start {
            options = options.start_symbol(NonTerminal::new(start));
        }
        if let Some(max_trees) = self.max_trees {
            options = options.max_trees(max_trees);
        }
        options
    }
}
