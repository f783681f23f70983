//! Command-line interface for gramrt-calc.
//!
//! Reads formulas from a file or standard input, one per line, evaluates
//! each with the selected priority parser and prints the result.
//!
//! ```text
//! $ echo 'x=2^3^2' | gramrt-calc --verbose
//!  Postfix: 2 3 2 ^ ^
//!  Infix:  (2^ (3^2) )
//! Assignment x = 512
//! ```

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use gramrt::Outcome;
use gramrt_calc::{Calculator, Evaluation, Mode, ReaderLines, Statement};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input file with one formula per line (standard input if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Priority mode of the parser
    #[arg(short, long, value_enum, default_value_t = Mode::Dynamic)]
    mode: Mode,

    /// Print postfix and infix notation of each formula
    #[arg(short, long)]
    verbose: bool,
}

fn report(evaluation: &Evaluation, verbose: bool) {
    for message in &evaluation.diagnostics {
        println!("{message}");
    }
    if let Outcome::Complete(statement) = &evaluation.outcome {
        if verbose {
            println!(" Postfix:{}", statement.postfix());
            println!(" Infix: {}", statement.infix());
        }
        match statement {
            Statement::Expression { value, .. } => println!(" Result: {value}"),
            Statement::Assignment {
                name,
                value,
                reassigned,
                ..
            } => {
                let kind = if *reassigned { "Reassignment" } else { "Assignment" };
                println!("{kind} {name} = {value}");
            }
        }
    }
    if let Some(rest) = &evaluation.ignored {
        println!("Remaining characters ignored: '{rest}'");
    }
}

fn run<R: BufRead>(reader: R, args: &Args) -> Result<()> {
    let mut calc = Calculator::new(ReaderLines::new(reader), args.mode);
    for evaluation in &mut calc {
        report(&evaluation?, args.verbose);
    }
    log::debug!(
        "parser: {:?}, lexer: {:?}, {} names defined",
        calc.parser_stats(),
        calc.lexer_stats(),
        calc.names().len()
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    match &args.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("can't open {}", path.display()))?;
            run(BufReader::new(file), &args)
        }
        None => run(io::stdin().lock(), &args),
    }
}
