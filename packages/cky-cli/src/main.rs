use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
};

use cky::{ContextFreeGrammar, Grammar, Parser};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Command, Config, Output, USAGE},
    error::CliError,
    report::write_parse,
};

mod config;
mod error;
mod report;

fn run(config: Config) -> Result<(), CliError> {
    let source = fs::read_to_string(&config.grammar).map_err(CliError::io(&config.grammar))?;
    let grammar: ContextFreeGrammar = source.parse()?;
    let parser = Parser::from_grammar(&grammar)?.with_options(config.parser_options())?;

    let text = fs::read_to_string(&config.sentences).map_err(CliError::io(&config.sentences))?;
    let sentences = text.lines().map(str::trim).collect::<Vec<_>>();

    tracing::info!(
        grammar = %config.grammar.display(),
        productions = parser.index().len(),
        sentences = sentences.len(),
        "parsing"
    );

    let parses = parser.parse_batch(&sentences);

    let (mut out, out_path): (Box<dyn Write>, PathBuf) = match &config.output {
        Output::Stdout => (Box::new(io::stdout().lock()), PathBuf::from("-")),
        Output::File(path) => (
            Box::new(BufWriter::new(
                File::create(path).map_err(CliError::io(path))?,
            )),
            path.clone(),
        ),
    };

    let mut write = || -> io::Result<()> {
        if config.show_definition {
            writeln!(out, "{}", parser.grammar().definition())?;
        }
        for (sentence, parse) in sentences.iter().zip(&parses) {
            write_parse(
                &mut out,
                sentence,
                parse,
                parser.start_symbol(),
                config.show_chart,
            )?;
        }
        out.flush()
    };
    write().map_err(CliError::io(out_path))?;

    let parsed = parses.iter().filter(|parse| parse.is_parsed()).count();
    tracing::info!(
        parsed,
        unparsed = parses.len() - parsed,
        "done"
    );

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let result = Config::from_args(std::env::args().skip(1)).and_then(|command| match command {
        Command::Run(config) => run(config),
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ CliError::Usage(_)) => {
            eprintln!("error: {err}\n\n{USAGE}");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
