use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Stmt};
use crate::environment::{Environment, SharedEnv};
use crate::error::{MeowError, Span};
use crate::stack::ensure_sufficient_stack;
use crate::value::{Function, Value};
use std::io::Write;
use std::rc::Rc;

/// Every condition under which evaluation falls back to `null`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String, span: Span },
    #[error("value of type {type_name} is not a function")]
    NotCallable { type_name: &'static str, span: Span },
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: &'static str,
        operator: &'static str,
        right: &'static str,
        span: Span,
    },
    #[error("unknown operator: {description}")]
    UnknownOperator { description: String, span: Span },
    #[error("division by zero")]
    DivisionByZero { span: Span },
    #[error("integer overflow")]
    IntegerOverflow { span: Span },
    #[error("function '{name}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },
    #[error("maximum call depth of {limit} exceeded")]
    RecursionLimit { limit: usize, span: Span },
    #[error("failed to write output: {message}")]
    Output { message: String, span: Span },
}

impl RuntimeError {
    pub fn span(&self) -> Span {
        match self {
            RuntimeError::UndefinedVariable { span, .. }
            | RuntimeError::NotCallable { span, .. }
            | RuntimeError::TypeMismatch { span, .. }
            | RuntimeError::UnknownOperator { span, .. }
            | RuntimeError::DivisionByZero { span }
            | RuntimeError::IntegerOverflow { span }
            | RuntimeError::ArityMismatch { span, .. }
            | RuntimeError::RecursionLimit { span, .. }
            | RuntimeError::Output { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> MeowError {
        let help = match self {
            RuntimeError::UndefinedVariable { name, .. } => Some(format!(
                "Bind it first with 'lick {} = ...' or declare it with 'meow'.",
                name
            )),
            RuntimeError::NotCallable { .. } => {
                Some("Only functions declared with 'meow' can be called.".to_string())
            }
            RuntimeError::TypeMismatch { .. } => Some(
                "Arithmetic needs two integers; '+' also joins two strings.".to_string(),
            ),
            RuntimeError::ArityMismatch { .. } => Some(
                "Missing arguments are bound to null and extra arguments are ignored.".to_string(),
            ),
            _ => None,
        };

        match help {
            Some(help) => MeowError::runtime_error_with_help(self.span(), self.to_string(), help),
            None => MeowError::runtime_error(self.span(), self.to_string()),
        }
    }
}

pub type EvalResult = Result<Value, RuntimeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Abort on the first runtime error instead of evaluating it to `null`.
    pub strict: bool,
    /// Deepest allowed nesting of user function calls.
    pub max_call_depth: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_call_depth: 10_000,
        }
    }
}

/// Tree-walking evaluator. Print output goes to `out`, one line per `purr`.
pub struct Evaluator<W: Write> {
    env: SharedEnv,
    out: W,
    config: EvaluatorConfig,
    errors: Vec<RuntimeError>,
    call_depth: usize,
}

impl<W: Write> Evaluator<W> {
    pub fn new(out: W) -> Self {
        Self::with_config(out, EvaluatorConfig::default())
    }

    pub fn with_config(out: W, config: EvaluatorConfig) -> Self {
        Self {
            env: Environment::new(),
            out,
            config,
            errors: Vec::new(),
            call_depth: 0,
        }
    }

    /// The root scope of this run.
    pub fn environment(&self) -> &SharedEnv {
        &self.env
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Every runtime error hit so far, including the ones that were turned
    /// into `null`.
    pub fn errors(&self) -> &[RuntimeError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<RuntimeError> {
        std::mem::take(&mut self.errors)
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs `program` in the root scope and returns the value of its last
    /// statement. Never fails: an aborted strict run yields `null`, and the
    /// cause is available from [`Evaluator::errors`].
    pub fn evaluate_program(&mut self, program: &Program) -> Value {
        self.try_evaluate_program(program).unwrap_or(Value::Null)
    }

    pub fn try_evaluate_program(&mut self, program: &Program) -> EvalResult {
        let env = Rc::clone(&self.env);
        let result = self.eval_statements(&program.statements, &env);
        let Err(e) = self.out.flush() else {
            return result;
        };

        let span = program
            .statements
            .last()
            .map(|stmt| stmt.span())
            .unwrap_or_default();
        let flushed = self.fail(RuntimeError::Output {
            message: e.to_string(),
            span,
        });
        match (result, flushed) {
            (Ok(_), Err(error)) => Err(error),
            (result, _) => result,
        }
    }

    pub fn evaluate_statement(&mut self, stmt: &Stmt, env: &SharedEnv) -> EvalResult {
        match stmt {
            Stmt::Assign { name, value, .. } => {
                let value = self.evaluate_expression(value, env)?;
                Ok(env.borrow_mut().set(&name.name, value))
            }
            Stmt::Function {
                name,
                parameters,
                body,
                ..
            } => {
                let function = Value::Function(Rc::new(Function {
                    name: name.name.clone(),
                    parameters: parameters.clone(),
                    body: Rc::clone(body),
                    env: Rc::clone(env),
                }));
                Ok(env.borrow_mut().set(&name.name, function))
            }
            // Not a control-flow signal: later statements in the block still run.
            Stmt::Return { value, .. } => match value {
                Some(value) => self.evaluate_expression(value, env),
                None => Ok(Value::Null),
            },
            Stmt::Print { value, .. } => {
                let value = self.evaluate_expression(value, env)?;
                if let Err(e) = writeln!(self.out, "{}", value) {
                    return self.fail(RuntimeError::Output {
                        message: e.to_string(),
                        span: stmt.span(),
                    });
                }
                Ok(Value::Null)
            }
            Stmt::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                if self.evaluate_expression(condition, env)?.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Ok(Value::Null)
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                let mut result = Value::Null;
                while self.evaluate_expression(condition, env)?.is_truthy() {
                    result = self.eval_block(body, env)?;
                }
                Ok(result)
            }
        }
    }

    pub fn evaluate_expression(&mut self, expr: &Expr, env: &SharedEnv) -> EvalResult {
        ensure_sufficient_stack(|| match expr {
            Expr::Identifier(ident) => {
                let found = env.borrow().get(&ident.name);
                match found {
                    Some(value) => Ok(value),
                    None => self.fail(RuntimeError::UndefinedVariable {
                        name: ident.name.clone(),
                        span: ident.token.span,
                    }),
                }
            }
            Expr::Integer { value, .. } => Ok(Value::Integer(*value)),
            Expr::Str { value, .. } => Ok(Value::String(value.clone())),
            Expr::Prefix {
                operator, operand, ..
            } => {
                let operand = self.evaluate_expression(operand, env)?;
                self.eval_prefix(*operator, operand, expr.span())
            }
            Expr::Infix {
                left,
                operator,
                right,
                ..
            } => {
                let left = self.evaluate_expression(left, env)?;
                let right = self.evaluate_expression(right, env)?;
                self.eval_infix(*operator, left, right, expr.span())
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                let callee = self.evaluate_expression(callee, env)?;
                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate_expression(argument, env)?);
                }
                match callee {
                    Value::Function(function) => self.call_function(function, args, expr.span()),
                    other => self.fail(RuntimeError::NotCallable {
                        type_name: other.type_name(),
                        span: expr.span(),
                    }),
                }
            }
        })
    }

    fn eval_statements(&mut self, statements: &[Stmt], env: &SharedEnv) -> EvalResult {
        let mut result = Value::Null;
        for stmt in statements {
            result = self.evaluate_statement(stmt, env)?;
        }
        Ok(result)
    }

    fn eval_block(&mut self, block: &Block, env: &SharedEnv) -> EvalResult {
        self.eval_statements(&block.statements, env)
    }

    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(function = %function.name, depth = self.call_depth)
    )]
    fn call_function(&mut self, function: Rc<Function>, args: Vec<Value>, span: Span) -> EvalResult {
        if self.call_depth >= self.config.max_call_depth {
            return self.fail(RuntimeError::RecursionLimit {
                limit: self.config.max_call_depth,
                span,
            });
        }

        if function.parameters.len() != args.len() {
            self.fail(RuntimeError::ArityMismatch {
                name: function.name.clone(),
                expected: function.parameters.len(),
                found: args.len(),
                span,
            })?;
        }

        // Parameters live in a fresh scope over the *defining* scope.
        let call_env = Environment::new_enclosed(Rc::clone(&function.env));
        {
            let mut scope = call_env.borrow_mut();
            let mut args = args.into_iter();
            for parameter in &function.parameters {
                scope.set(&parameter.name, args.next().unwrap_or(Value::Null));
            }
        }

        tracing::trace!(scopes = call_env.borrow().depth(), "entering call");
        self.call_depth += 1;
        let result = self.eval_block(&function.body, &call_env);
        self.call_depth -= 1;

        tracing::trace!(result = ?result, "call returned");
        result
    }

    fn eval_prefix(&mut self, operator: PrefixOp, operand: Value, span: Span) -> EvalResult {
        match (operator, operand) {
            (PrefixOp::Not, operand) => Ok(Value::from_bool(!operand.is_truthy())),
            (PrefixOp::Negate, Value::Integer(n)) => match n.checked_neg() {
                Some(n) => Ok(Value::Integer(n)),
                None => self.fail(RuntimeError::IntegerOverflow { span }),
            },
            (PrefixOp::Negate, operand) => self.fail(RuntimeError::UnknownOperator {
                description: format!("-{}", operand.type_name()),
                span,
            }),
        }
    }

    fn eval_infix(&mut self, operator: InfixOp, left: Value, right: Value, span: Span) -> EvalResult {
        match (left, right) {
            (Value::Integer(l), Value::Integer(r)) => self.eval_integer_infix(operator, l, r, span),
            (Value::String(l), Value::String(r)) => self.eval_string_infix(operator, l, r, span),
            (l, r) if l.type_name() == r.type_name() => self.fail(RuntimeError::UnknownOperator {
                description: format!("{} {} {}", l.type_name(), operator.symbol(), r.type_name()),
                span,
            }),
            (l, r) => self.fail(RuntimeError::TypeMismatch {
                left: l.type_name(),
                operator: operator.symbol(),
                right: r.type_name(),
                span,
            }),
        }
    }

    fn eval_integer_infix(&mut self, operator: InfixOp, l: i64, r: i64, span: Span) -> EvalResult {
        let result = match operator {
            InfixOp::Add => l.checked_add(r),
            InfixOp::Subtract => l.checked_sub(r),
            InfixOp::Multiply => l.checked_mul(r),
            InfixOp::Divide => {
                if r == 0 {
                    return self.fail(RuntimeError::DivisionByZero { span });
                }
                l.checked_div(r)
            }
            InfixOp::Equal => return Ok(Value::from_bool(l == r)),
            InfixOp::NotEqual => return Ok(Value::from_bool(l != r)),
            InfixOp::Less => return Ok(Value::from_bool(l < r)),
            InfixOp::Greater => return Ok(Value::from_bool(l > r)),
        };

        match result {
            Some(n) => Ok(Value::Integer(n)),
            None => self.fail(RuntimeError::IntegerOverflow { span }),
        }
    }

    fn eval_string_infix(&mut self, operator: InfixOp, l: String, r: String, span: Span) -> EvalResult {
        match operator {
            InfixOp::Add => Ok(Value::String(l + &r)),
            InfixOp::Equal => Ok(Value::from_bool(l == r)),
            InfixOp::NotEqual => Ok(Value::from_bool(l != r)),
            _ => self.fail(RuntimeError::UnknownOperator {
                description: format!("string {} string", operator.symbol()),
                span,
            }),
        }
    }

    /// Records `error`. Lenient runs carry on with `null` in place of the
    /// failed node; strict runs stop here.
    fn fail(&mut self, error: RuntimeError) -> EvalResult {
        tracing::warn!(error = %error, start = error.span().start, "runtime error");
        self.errors.push(error.clone());
        if self.config.strict {
            Err(error)
        } else {
            Ok(Value::Null)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;
    use pretty_assertions::assert_eq;

    fn run_with(source: &str, config: EvaluatorConfig) -> (Value, String, Vec<RuntimeError>) {
        let (program, parse_errors) = parse_program(source);
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);
        let mut evaluator = Evaluator::with_config(Vec::new(), config);
        let value = evaluator.evaluate_program(&program);
        let errors = evaluator.take_errors();
        let output = String::from_utf8(evaluator.into_output()).expect("utf-8 output");
        (value, output, errors)
    }

    fn run(source: &str) -> (Value, String, Vec<RuntimeError>) {
        run_with(source, EvaluatorConfig::default())
    }

    fn output_of(source: &str) -> String {
        let (_, output, errors) = run(source);
        assert!(errors.is_empty(), "runtime errors: {:?}", errors);
        output
    }

    fn strict() -> EvaluatorConfig {
        EvaluatorConfig {
            strict: true,
            ..EvaluatorConfig::default()
        }
    }

    #[test]
    fn integer_arithmetic() {
        assert_eq!(output_of("purr 1 + 2"), "3\n");
        assert_eq!(output_of("purr 2 + 3 * 4 - 10 / 3"), "11\n");
        assert_eq!(output_of("purr (2 + 3) * 4"), "20\n");
        assert_eq!(output_of("purr -7 / 2"), "-3\n");
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(output_of("purr \"Hello\" + \" world\""), "Hello world\n");
    }

    #[test]
    fn variable_assignment() {
        assert_eq!(output_of("lick x = 42; purr x;"), "42\n");
        assert_eq!(output_of("lick x = 1 lick x = x + 1 purr x"), "2\n");
    }

    #[test]
    fn program_value_is_last_statement() {
        let (value, _, _) = run("lick x = 4 lick y = x * 2");
        assert_eq!(value, Value::Integer(8));
        let (value, _, _) = run("");
        assert_eq!(value, Value::Null);
        let (value, _, _) = run("purr 1");
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn function_definition_and_call() {
        let source = "
            meow double(a) {
                claw a * 2;
            }
            purr double(5);";
        assert_eq!(output_of(source), "10\n");

        let (value, _, errors) = run("meow double(a) { claw a * 2 } lick r = double(5)");
        assert!(errors.is_empty());
        assert_eq!(value, Value::Integer(10));
    }

    #[test]
    fn call_result_is_last_statement_even_after_return() {
        let source = "
            meow f() {
                claw 1
                purr \"still running\"
                claw 2
            }
            purr f()";
        assert_eq!(output_of(source), "still running\n2\n");
    }

    #[test]
    fn function_declaration_evaluates_to_the_function() {
        let (value, _, _) = run("meow id(x) { claw x }");
        assert!(matches!(value, Value::Function(_)));
        assert_eq!(output_of("meow id(x) { claw x } purr id"), "meow(x) {\nclaw x\n}\n");
    }

    #[test]
    fn calling_an_undeclared_name_is_null() {
        let (value, output, errors) = run("lick r = nothing(1) purr r");
        assert_eq!(value, Value::Null);
        assert_eq!(output, "null\n");
        assert!(matches!(
            errors.as_slice(),
            [
                RuntimeError::UndefinedVariable { .. },
                RuntimeError::NotCallable { type_name: "null", .. }
            ]
        ));
    }

    #[test]
    fn calling_a_non_function_is_null() {
        let (_, output, errors) = run("lick x = 3 purr x(1)");
        assert_eq!(output, "null\n");
        assert!(matches!(
            errors.as_slice(),
            [RuntimeError::NotCallable { type_name: "integer", .. }]
        ));
    }

    #[test]
    fn unresolved_identifier_is_null_but_classified() {
        let (_, output, errors) = run("purr missing");
        assert_eq!(output, "null\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "undefined variable 'missing'");
    }

    #[test]
    fn intentional_null_leaves_no_errors() {
        let (value, output, errors) = run("meow f() { claw } purr f()");
        assert_eq!(value, Value::Null);
        assert_eq!(output, "null\n");
        assert!(errors.is_empty());
    }

    #[test]
    fn mismatched_operands_are_null() {
        let (_, output, errors) = run("purr 1 + \"a\" purr \"a\" - \"b\" purr -\"a\"");
        assert_eq!(output, "null\nnull\nnull\n");
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "type mismatch: integer + string",
                "unknown operator: string - string",
                "unknown operator: -string",
            ]
        );
    }

    #[test]
    fn comparisons_produce_integers() {
        assert_eq!(
            output_of("purr 1 < 2 purr 1 > 2 purr 3 == 3 purr 3 != 3 purr \"a\" == \"a\" purr !0"),
            "1\n0\n1\n0\n1\n1\n"
        );
    }

    #[test]
    fn division_by_zero_is_classified() {
        let (_, output, errors) = run("purr 10 / 0");
        assert_eq!(output, "null\n");
        assert!(matches!(errors.as_slice(), [RuntimeError::DivisionByZero { .. }]));
    }

    #[test]
    fn overflow_is_classified() {
        let (_, output, errors) = run("purr 9223372036854775807 + 1");
        assert_eq!(output, "null\n");
        assert!(matches!(errors.as_slice(), [RuntimeError::IntegerOverflow { .. }]));
    }

    #[test]
    fn arity_mismatch_binds_missing_parameters_to_null() {
        let source = "
            meow pair(a, b) { claw b }
            purr pair(1)
            purr pair(1, 2, 3)";
        let (_, output, errors) = run(source);
        assert_eq!(output, "null\n2\n");
        assert!(matches!(
            errors.as_slice(),
            [
                RuntimeError::ArityMismatch { expected: 2, found: 1, .. },
                RuntimeError::ArityMismatch { expected: 2, found: 3, .. }
            ]
        ));
    }

    #[test]
    fn call_scope_does_not_leak() {
        let source = "
            lick x = 1
            meow f() {
                lick x = 2
                lick local = 3
                claw x
            }
            purr f()
            purr x
            purr local";
        let (_, output, errors) = run(source);
        assert_eq!(output, "2\n1\nnull\n");
        assert!(matches!(
            errors.as_slice(),
            [RuntimeError::UndefinedVariable { name, .. }] if name == "local"
        ));
    }

    #[test]
    fn closures_keep_their_defining_scope() {
        let source = "
            meow makeAdder(a) {
                meow add(b) { claw a + b }
                claw add
            }
            lick addTwo = makeAdder(2)
            lick addTen = makeAdder(10)
            purr addTwo(3)
            purr addTen(3)";
        assert_eq!(output_of(source), "5\n13\n");
    }

    #[test]
    fn arguments_are_evaluated_in_the_callers_scope() {
        let source = "
            lick a = 100
            meow show(a) { claw a }
            meow outer() {
                lick a = 7
                claw show(a + 1)
            }
            purr outer()";
        assert_eq!(output_of(source), "8\n");
    }

    #[test]
    fn functions_see_later_globals() {
        let source = "
            meow get() { claw late }
            lick late = \"bound later\"
            purr get()";
        assert_eq!(output_of(source), "bound later\n");
    }

    #[test]
    fn recursion_with_conditionals() {
        let source = "
            meow fact(n) {
                hiss n < 2 { claw 1 } growl { claw n * fact(n - 1) }
            }
            purr fact(10)";
        assert_eq!(output_of(source), "3628800\n");
    }

    #[test]
    fn while_loop_runs_until_condition_fails() {
        let source = "
            lick i = 0
            lick total = 0
            scratch i < 5 {
                lick i = i + 1
                lick total = total + i
            }
            purr total";
        assert_eq!(output_of(source), "15\n");
    }

    #[test]
    fn conditional_without_branch_is_null() {
        let (value, output, errors) = run("hiss 0 { purr \"no\" }");
        assert_eq!(value, Value::Null);
        assert_eq!(output, "");
        assert!(errors.is_empty());
    }

    #[test]
    fn recursion_limit_is_a_runtime_error() {
        let config = EvaluatorConfig {
            strict: true,
            max_call_depth: 50,
        };
        let (_, _, errors) = run_with("meow down(n) { claw down(n + 1) } purr down(0)", config);
        assert!(matches!(
            errors.as_slice(),
            [RuntimeError::RecursionLimit { limit: 50, .. }]
        ));
    }

    #[test]
    fn deep_recursion_within_the_limit_succeeds() {
        let source = "
            meow count(n) {
                hiss n == 0 { claw 0 } growl { claw 1 + count(n - 1) }
            }
            purr count(5000)";
        assert_eq!(output_of(source), "5000\n");
    }

    #[test]
    fn strict_mode_stops_at_the_first_error() {
        let (program, _) = parse_program("purr 1 purr 1 / 0 purr 2");
        let mut evaluator = Evaluator::with_config(Vec::new(), strict());
        let result = evaluator.try_evaluate_program(&program);
        assert!(matches!(result, Err(RuntimeError::DivisionByZero { .. })));
        assert_eq!(evaluator.errors().len(), 1);
        assert_eq!(String::from_utf8_lossy(evaluator.output()), "1\n");
    }

    #[test]
    fn lenient_mode_keeps_going() {
        let (_, output, errors) = run("purr 1 purr 1 / 0 purr 2");
        assert_eq!(output, "1\nnull\n2\n");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn state_persists_across_programs() {
        let mut evaluator = Evaluator::new(Vec::new());
        let (first, _) = parse_program("lick x = 20");
        let (second, _) = parse_program("purr x + 1");
        evaluator.evaluate_program(&first);
        evaluator.evaluate_program(&second);
        assert_eq!(String::from_utf8_lossy(evaluator.output()), "21\n");
        assert_eq!(
            evaluator.environment().borrow().get("x"),
            Some(Value::Integer(20))
        );
    }

    #[test]
    fn error_spans_point_at_the_failing_expression() {
        let (_, _, errors) = run("purr 1 + nope");
        assert_eq!(errors[0].span(), Span::new(9, 13));
        let diagnostic = errors[0].to_diagnostic();
        assert_eq!(diagnostic.message, "undefined variable 'nope'");
        assert!(diagnostic.help.is_some());
    }

    #[test]
    fn infix_span_covers_both_operands() {
        let (_, _, errors) = run("purr 10 / (4 - 4)");
        assert_eq!(errors, vec![RuntimeError::DivisionByZero { span: Span::new(5, 16) }]);
    }

    #[test]
    fn long_operator_chains_evaluate() {
        let source = format!("purr 1{}", " + 1".repeat(19_999));
        assert_eq!(output_of(&source), "20000\n");

        let source = format!("purr 0{}", " - -1".repeat(20_000));
        assert_eq!(output_of(&source), "20000\n");
    }

    /// Accepts every write but refuses to flush.
    struct UnflushableSink(Vec<u8>);

    impl Write for UnflushableSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn flush_failure_is_a_runtime_error() {
        let (program, _) = parse_program("purr 1 lick x = 2");

        let mut lenient = Evaluator::new(UnflushableSink(Vec::new()));
        assert_eq!(lenient.evaluate_program(&program), Value::Integer(2));
        assert!(matches!(
            lenient.errors(),
            [RuntimeError::Output { message, .. }] if message == "disk full"
        ));

        let mut strict = Evaluator::with_config(UnflushableSink(Vec::new()), strict());
        assert!(matches!(
            strict.try_evaluate_program(&program),
            Err(RuntimeError::Output { .. })
        ));
        assert_eq!(strict.into_output().0, b"1\n".to_vec());
    }
}
