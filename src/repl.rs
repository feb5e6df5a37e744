use crate::ast::{Program, Stmt};
use crate::evaluator::{Evaluator, EvaluatorConfig};
use crate::runner;
use crate::value::Value;
use std::io::{self, BufRead, Write};

/// Interactive loop over stdin. Bindings persist between lines.
pub fn start(config: EvaluatorConfig) -> io::Result<()> {
    println!("meow interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    let mut evaluator = Evaluator::with_config(io::stdout(), config);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                println!();
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            println!("Goodbye!");
            break;
        }

        run_line(line, &mut evaluator)?;
    }

    Ok(())
}

fn run_line<W: Write>(source: &str, evaluator: &mut Evaluator<W>) -> io::Result<()> {
    let report = runner::run(source, evaluator);
    report.report(source, None)?;

    if should_echo(&report.program) && report.value != Value::Null {
        println!("{}", report.value);
    }
    Ok(())
}

/// Bindings and prints already show up on their own; everything else echoes
/// its value.
fn should_echo(program: &Program) -> bool {
    !matches!(
        program.statements.last(),
        None | Some(Stmt::Assign { .. } | Stmt::Function { .. } | Stmt::Print { .. })
    )
}
