use crate::ast::Program;
use crate::error::MeowError;
use crate::evaluator::{Evaluator, EvaluatorConfig, RuntimeError};
use crate::lexer::tokenize;
use crate::parser::Parser;
use crate::value::Value;
use std::io::{self, Write};

/// Outcome of one pass through the pipeline.
#[derive(Debug)]
pub struct RunReport {
    /// The parsed program, including any statements a strict run skipped.
    pub program: Program,
    pub value: Value,
    /// Lex and parse diagnostics, in source order of discovery.
    pub diagnostics: Vec<MeowError>,
    pub runtime_errors: Vec<RuntimeError>,
    /// False when a strict run refused to evaluate a program with diagnostics.
    pub evaluated: bool,
}

impl RunReport {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty() || !self.runtime_errors.is_empty()
    }

    /// Renders every diagnostic and runtime error to stderr.
    pub fn report(&self, source: &str, filename: Option<&str>) -> io::Result<()> {
        for diagnostic in &self.diagnostics {
            diagnostic.report(source, filename)?;
        }
        for error in &self.runtime_errors {
            error.to_diagnostic().report(source, filename)?;
        }
        Ok(())
    }
}

/// Lexes, parses and evaluates `source` with `evaluator`, whose scope
/// persists across calls.
///
/// Parse diagnostics never stop a lenient run: whatever statements parsed are
/// still evaluated. A strict run with diagnostics is not evaluated at all.
pub fn run<W: Write>(source: &str, evaluator: &mut Evaluator<W>) -> RunReport {
    let tokens = tokenize(source);
    let mut diagnostics: Vec<MeowError> = tokens.iter().filter_map(|t| t.diagnostic()).collect();

    let mut parser = Parser::new(tokens);
    let program = parser.parse();
    diagnostics.extend(parser.into_errors());

    tracing::debug!(
        statements = program.statements.len(),
        diagnostics = diagnostics.len(),
        "parsed program"
    );

    if evaluator.config().strict && !diagnostics.is_empty() {
        return RunReport {
            program,
            value: Value::Null,
            diagnostics,
            runtime_errors: Vec::new(),
            evaluated: false,
        };
    }

    let value = evaluator.evaluate_program(&program);
    RunReport {
        program,
        value,
        diagnostics,
        runtime_errors: evaluator.take_errors(),
        evaluated: true,
    }
}

/// Runs `source` in a fresh evaluator and returns everything it printed.
pub fn run_to_string(source: &str, config: EvaluatorConfig) -> (String, RunReport) {
    let mut evaluator = Evaluator::with_config(Vec::new(), config);
    let report = run(source, &mut evaluator);
    let output = String::from_utf8_lossy(&evaluator.into_output()).into_owned();
    (output, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn illegal_tokens_become_lex_diagnostics() {
        let (output, report) = run_to_string("purr 1 @ purr 2", EvaluatorConfig::default());
        assert_eq!(output, "1\n2\n");
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, ErrorKind::LexError);
        assert_eq!(report.diagnostics[0].message, "Unexpected character: '@'");
    }

    #[test]
    fn lenient_run_evaluates_partial_program() {
        let (output, report) = run_to_string("lick = 3 purr 4", EvaluatorConfig::default());
        assert_eq!(output, "4\n");
        assert!(report.evaluated);
        assert_eq!(report.diagnostics[0].kind, ErrorKind::ParseError);
    }

    #[test]
    fn strict_run_refuses_programs_with_diagnostics() {
        let config = EvaluatorConfig {
            strict: true,
            ..EvaluatorConfig::default()
        };
        let (output, report) = run_to_string("lick = 3 purr 4", config);
        assert_eq!(output, "");
        assert!(!report.evaluated);
        assert!(report.has_errors());
    }

    #[test]
    fn runtime_errors_are_collected() {
        let (output, report) = run_to_string("purr 1 / 0", EvaluatorConfig::default());
        assert_eq!(output, "null\n");
        assert!(report.diagnostics.is_empty());
        assert!(matches!(
            report.runtime_errors.as_slice(),
            [RuntimeError::DivisionByZero { .. }]
        ));
    }
}
