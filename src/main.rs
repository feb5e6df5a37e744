use clap::{value_parser, Arg, ArgAction, Command};
use meow::{repl, runner, Evaluator, EvaluatorConfig};
use std::fs;
use std::io;
use std::path::Path;
use std::process::ExitCode;

/// Exit status for programs rejected by `--strict` (EX_DATAERR).
const EXIT_DATA_ERROR: u8 = 65;

fn main() -> ExitCode {
    init_tracing();

    let matches = Command::new("meow")
        .about("A tree-walking interpreter for MeowLang")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("file")
                .help("The script file to execute; starts a REPL when omitted")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Stop at the first runtime error and refuse programs with parse errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-call-depth")
                .long("max-call-depth")
                .value_name("N")
                .help("Deepest allowed nesting of function calls")
                .value_parser(value_parser!(usize))
                .default_value("10000"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Do not print diagnostics to stderr")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config = EvaluatorConfig {
        strict: matches.get_flag("strict"),
        max_call_depth: matches
            .get_one::<usize>("max-call-depth")
            .copied()
            .unwrap_or(EvaluatorConfig::default().max_call_depth),
    };

    match matches.get_one::<String>("file") {
        Some(path) => run_file(Path::new(path), config, !matches.get_flag("quiet")),
        None => match repl::start(config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn run_file(path: &Path, config: EvaluatorConfig, show_diagnostics: bool) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut evaluator = Evaluator::with_config(io::stdout().lock(), config);
    let report = runner::run(&source, &mut evaluator);

    if show_diagnostics {
        let filename = path.display().to_string();
        if let Err(e) = report.report(&source, Some(&filename)) {
            tracing::warn!(error = %e, "failed to render diagnostics");
        }
    }

    if config.strict && report.has_errors() {
        ExitCode::from(EXIT_DATA_ERROR)
    } else {
        ExitCode::SUCCESS
    }
}

/// Installs a stderr subscriber when `MEOW_LOG` (or `RUST_LOG`) is set,
/// e.g. `MEOW_LOG=meow=trace`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("MEOW_LOG").or_else(|_| EnvFilter::try_from_default_env());
    if let Ok(filter) = filter {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(filter)
            .init();
    }
}
