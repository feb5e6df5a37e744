use crate::ast::{Block, Expr, Identifier, InfixOp, PrefixOp, Program, Stmt};
use crate::error::{MeowError, Span};
use crate::lexer::{tokenize, Token, TokenType};
use crate::stack::ensure_sufficient_stack;
use std::rc::Rc;

/// Binding power of an operator, lowest first. A nested expression only
/// absorbs operators that bind tighter than the level it was started at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

impl Precedence {
    pub fn of(token_type: TokenType) -> Self {
        match token_type {
            TokenType::EqualEqual | TokenType::BangEqual => Precedence::Equals,
            TokenType::Less | TokenType::Greater => Precedence::LessGreater,
            TokenType::Plus | TokenType::Minus => Precedence::Sum,
            TokenType::Star | TokenType::Slash => Precedence::Product,
            TokenType::LeftParen => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

/// Lexes and parses `source`, returning the tree together with every parse
/// diagnostic that was recorded while building it.
pub fn parse_program(source: &str) -> (Program, Vec<MeowError>) {
    let mut parser = Parser::new(tokenize(source));
    let program = parser.parse();
    (program, parser.into_errors())
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<MeowError>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.token_type) != Some(TokenType::Eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Token::new(TokenType::Eof, String::new(), Span::single(end)));
        }

        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    /// Parses every top-level statement. Malformed statements are dropped and
    /// reported through [`Parser::errors`]; parsing always runs to the end.
    pub fn parse(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            match self.statement() {
                Some(stmt) => statements.push(stmt),
                None => self.skip(),
            }
        }

        Program { statements }
    }

    pub fn errors(&self) -> &[MeowError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<MeowError> {
        self.errors
    }

    fn statement(&mut self) -> Option<Stmt> {
        let stmt = match self.peek().token_type {
            TokenType::Lick => self.assign_statement(),
            TokenType::Meow => self.function_statement(),
            TokenType::Claw => self.return_statement(),
            TokenType::Purr => self.print_statement(),
            TokenType::Hiss => self.if_statement(),
            TokenType::Scratch => self.while_statement(),
            _ => None,
        }?;

        // Terminators are optional.
        if self.check(TokenType::Semicolon) {
            self.advance();
        }

        Some(stmt)
    }

    fn assign_statement(&mut self) -> Option<Stmt> {
        let token = self.advance();
        let name = Identifier::new(self.expect(TokenType::Identifier)?);
        self.expect(TokenType::Assign)?;
        let value = self.expression(Precedence::Lowest)?;

        Some(Stmt::Assign { token, name, value })
    }

    fn function_statement(&mut self) -> Option<Stmt> {
        let token = self.advance();
        let name = Identifier::new(self.expect(TokenType::Identifier)?);
        self.expect(TokenType::LeftParen)?;
        let parameters = self.parameters()?;
        let open = self.expect_with_help(
            TokenType::LeftBrace,
            "Function bodies are wrapped in braces: meow name(a, b) { ... }",
        )?;
        let body = self.block(open);

        Some(Stmt::Function {
            token,
            name,
            parameters,
            body: Rc::new(body),
        })
    }

    fn parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();

        if self.check(TokenType::RightParen) {
            self.advance();
            return Some(parameters);
        }

        loop {
            parameters.push(Identifier::new(self.expect(TokenType::Identifier)?));
            if !self.check(TokenType::Comma) {
                break;
            }
            self.advance();
        }

        self.expect_with_help(
            TokenType::RightParen,
            "Parameter lists are comma-separated names closed with ')'.",
        )?;
        Some(parameters)
    }

    /// Parses statements after an already consumed `{` up to the matching `}`.
    /// Running out of input is reported but still ends the block.
    fn block(&mut self, open: Token) -> Block {
        let mut statements = Vec::new();

        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            match self.statement() {
                Some(stmt) => statements.push(stmt),
                None if self.check(TokenType::RightBrace) => {}
                None => self.skip(),
            }
        }

        let _ = self.expect_with_help(
            TokenType::RightBrace,
            "Blocks must be closed with '}' after the opening '{'.",
        );

        Block {
            token: open,
            statements,
        }
    }

    fn return_statement(&mut self) -> Option<Stmt> {
        let token = self.advance();

        let next = self.peek().token_type;
        let omitted = next.starts_statement()
            || matches!(
                next,
                TokenType::Semicolon | TokenType::RightBrace | TokenType::Growl | TokenType::Eof
            );
        let value = if omitted {
            None
        } else {
            Some(self.expression(Precedence::Lowest)?)
        };

        Some(Stmt::Return { token, value })
    }

    fn print_statement(&mut self) -> Option<Stmt> {
        let token = self.advance();
        let value = self.expression(Precedence::Lowest)?;

        Some(Stmt::Print { token, value })
    }

    fn if_statement(&mut self) -> Option<Stmt> {
        let token = self.advance();
        let condition = self.expression(Precedence::Lowest)?;
        let open = self.expect_with_help(
            TokenType::LeftBrace,
            "Conditionals need a braced body: hiss (condition) { ... }",
        )?;
        let consequence = self.block(open);

        let alternative = if self.check(TokenType::Growl) {
            self.advance();
            let open = self.expect_with_help(
                TokenType::LeftBrace,
                "'growl' must be followed by a braced block: growl { ... }",
            )?;
            Some(self.block(open))
        } else {
            None
        };

        Some(Stmt::If {
            token,
            condition,
            consequence,
            alternative,
        })
    }

    fn while_statement(&mut self) -> Option<Stmt> {
        let token = self.advance();
        let condition = self.expression(Precedence::Lowest)?;
        let open = self.expect_with_help(
            TokenType::LeftBrace,
            "Loops need a braced body: scratch (condition) { ... }",
        )?;
        let body = self.block(open);

        Some(Stmt::While {
            token,
            condition,
            body,
        })
    }

    fn expression(&mut self, precedence: Precedence) -> Option<Expr> {
        ensure_sufficient_stack(|| {
            let mut left = self.prefix()?;

            while !self.check(TokenType::Semicolon) && precedence < self.peek_precedence() {
                left = if self.check(TokenType::LeftParen) {
                    self.call(left)?
                } else {
                    self.infix(left)?
                };
            }

            Some(left)
        })
    }

    fn prefix(&mut self) -> Option<Expr> {
        let token = self.peek().clone();

        match token.token_type {
            TokenType::Integer => {
                self.advance();
                match token.lexeme.parse::<i64>() {
                    Ok(value) => Some(Expr::Integer { token, value }),
                    Err(_) => {
                        self.error(MeowError::parse_error_with_help(
                            token.span,
                            format!("could not parse {} as integer", token.lexeme),
                            format!("Integers must fit in 64 bits (at most {}).", i64::MAX),
                        ));
                        None
                    }
                }
            }
            TokenType::String => {
                self.advance();
                let value = token
                    .lexeme
                    .strip_prefix('"')
                    .and_then(|rest| rest.strip_suffix('"'))
                    .unwrap_or(&token.lexeme)
                    .to_string();
                Some(Expr::Str { token, value })
            }
            TokenType::Identifier => {
                self.advance();
                Some(Expr::Identifier(Identifier::new(token)))
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.expression(Precedence::Lowest)?;
                self.expect_with_help(
                    TokenType::RightParen,
                    "Every opening parenthesis '(' must have a matching closing parenthesis ')'.",
                )?;
                Some(expr)
            }
            TokenType::Minus | TokenType::Bang => {
                self.advance();
                let operator = PrefixOp::from_token(token.token_type)?;
                let operand = self.expression(Precedence::Prefix)?;
                let span = token.span.to(operand.span());
                Some(Expr::Prefix {
                    token,
                    operator,
                    operand: Box::new(operand),
                    span,
                })
            }
            other => {
                let span = self.error_span();
                self.error(MeowError::parse_error(
                    span,
                    format!("no prefix parse function for {} found", other),
                ));
                None
            }
        }
    }

    fn infix(&mut self, left: Expr) -> Option<Expr> {
        let token = self.advance();
        let operator = InfixOp::from_token(token.token_type)?;
        let right = self.expression(Precedence::of(token.token_type))?;
        let span = left.span().to(right.span());

        Some(Expr::Infix {
            token,
            left: Box::new(left),
            operator,
            right: Box::new(right),
            span,
        })
    }

    fn call(&mut self, callee: Expr) -> Option<Expr> {
        let token = self.advance();
        let mut arguments = Vec::new();

        let close = if self.check(TokenType::RightParen) {
            self.advance()
        } else {
            loop {
                arguments.push(self.expression(Precedence::Lowest)?);
                if !self.check(TokenType::Comma) {
                    break;
                }
                self.advance();
            }
            self.expect_with_help(
                TokenType::RightParen,
                "Function calls must be closed with ')' after the arguments. Example: add(1, 2)",
            )?
        };

        let span = callee.span().to(close.span);
        Some(Expr::Call {
            token,
            callee: Box::new(callee),
            arguments,
            span,
        })
    }

    fn expect(&mut self, token_type: TokenType) -> Option<Token> {
        if self.check(token_type) {
            return Some(self.advance());
        }
        let message = self.expected_message(token_type);
        let span = self.error_span();
        self.error(MeowError::parse_error(span, message));
        None
    }

    fn expect_with_help(&mut self, token_type: TokenType, help: &str) -> Option<Token> {
        if self.check(token_type) {
            return Some(self.advance());
        }
        let message = self.expected_message(token_type);
        let span = self.error_span();
        self.error(MeowError::parse_error_with_help(span, message, help.to_string()));
        None
    }

    fn expected_message(&self, token_type: TokenType) -> String {
        format!(
            "expected next token to be {}, got {} instead",
            token_type,
            self.peek().token_type
        )
    }

    /// Points at the offending token, or just past the last real token when
    /// the input ran out.
    fn error_span(&self) -> Span {
        if self.is_at_end() && self.current > 0 {
            Span::single(self.tokens[self.current - 1].span.end)
        } else {
            self.peek().span
        }
    }

    fn error(&mut self, error: MeowError) {
        tracing::debug!(message = %error.message, start = error.span.start, "parse error");
        self.errors.push(error);
    }

    fn skip(&mut self) {
        let skipped = self.advance();
        tracing::debug!(
            token = %skipped.lexeme,
            kind = %skipped.token_type,
            "skipping token outside of a statement"
        );
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.peek().token_type == token_type
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek().token_type)
    }

    /// Consumes the current token. The trailing `Eof` is never consumed.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }
}
