use crate::error::Span;
use crate::lexer::{Token, TokenType};
use crate::stack::ensure_sufficient_stack;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// Every node keeps the token it was parsed from, so diagnostics can point at
/// source and `Display` can rebuild a canonical form of the program.

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub name: String,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        let name = token.lexeme.clone();
        Self { token, name }
    }
}

/// A brace-delimited statement sequence. `token` is the opening `{`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub token: Token,
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign {
        token: Token,
        name: Identifier,
        value: Expr,
    },
    Function {
        token: Token,
        name: Identifier,
        parameters: Vec<Identifier>,
        /// Shared with every function value created from this declaration.
        body: Rc<Block>,
    },
    Return {
        token: Token,
        value: Option<Expr>,
    },
    Print {
        token: Token,
        value: Expr,
    },
    If {
        token: Token,
        condition: Expr,
        consequence: Block,
        alternative: Option<Block>,
    },
    While {
        token: Token,
        condition: Expr,
        body: Block,
    },
}

impl Stmt {
    pub fn token(&self) -> &Token {
        match self {
            Stmt::Assign { token, .. } => token,
            Stmt::Function { token, .. } => token,
            Stmt::Return { token, .. } => token,
            Stmt::Print { token, .. } => token,
            Stmt::If { token, .. } => token,
            Stmt::While { token, .. } => token,
        }
    }

    pub fn token_literal(&self) -> &str {
        &self.token().lexeme
    }

    pub fn span(&self) -> Span {
        let start = self.token().span;
        match self {
            Stmt::Assign { value, .. } => start.to(value.span()),
            Stmt::Function { body, .. } => start.to(body.token.span),
            Stmt::Return { value, .. } => match value {
                Some(value) => start.to(value.span()),
                None => start,
            },
            Stmt::Print { value, .. } => start.to(value.span()),
            Stmt::If { condition, .. } => start.to(condition.span()),
            Stmt::While { condition, .. } => start.to(condition.span()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Negate,
    Not,
}

impl PrefixOp {
    pub fn from_token(token_type: TokenType) -> Option<Self> {
        match token_type {
            TokenType::Minus => Some(PrefixOp::Negate),
            TokenType::Bang => Some(PrefixOp::Not),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            PrefixOp::Negate => "-",
            PrefixOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    Greater,
}

impl InfixOp {
    pub fn from_token(token_type: TokenType) -> Option<Self> {
        match token_type {
            TokenType::Plus => Some(InfixOp::Add),
            TokenType::Minus => Some(InfixOp::Subtract),
            TokenType::Star => Some(InfixOp::Multiply),
            TokenType::Slash => Some(InfixOp::Divide),
            TokenType::EqualEqual => Some(InfixOp::Equal),
            TokenType::BangEqual => Some(InfixOp::NotEqual),
            TokenType::Less => Some(InfixOp::Less),
            TokenType::Greater => Some(InfixOp::Greater),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Subtract => "-",
            InfixOp::Multiply => "*",
            InfixOp::Divide => "/",
            InfixOp::Equal => "==",
            InfixOp::NotEqual => "!=",
            InfixOp::Less => "<",
            InfixOp::Greater => ">",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(Identifier),
    Integer {
        token: Token,
        value: i64,
    },
    Str {
        token: Token,
        value: String,
    },
    Prefix {
        token: Token,
        operator: PrefixOp,
        operand: Box<Expr>,
        span: Span,
    },
    Infix {
        token: Token,
        left: Box<Expr>,
        operator: InfixOp,
        right: Box<Expr>,
        span: Span,
    },
    Call {
        /// The opening `(`.
        token: Token,
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn token(&self) -> &Token {
        match self {
            Expr::Identifier(ident) => &ident.token,
            Expr::Integer { token, .. } => token,
            Expr::Str { token, .. } => token,
            Expr::Prefix { token, .. } => token,
            Expr::Infix { token, .. } => token,
            Expr::Call { token, .. } => token,
        }
    }

    pub fn token_literal(&self) -> &str {
        &self.token().lexeme
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier(ident) => ident.token.span,
            Expr::Integer { token, .. } => token.span,
            Expr::Str { token, .. } => token.span,
            Expr::Prefix { span, .. } | Expr::Infix { span, .. } | Expr::Call { span, .. } => {
                *span
            }
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(
            self,
            Expr::Identifier(_) | Expr::Integer { .. } | Expr::Str { .. }
        )
    }

    /// Moves every compound child expression onto `out`, leaving a cheap leaf
    /// in its place.
    fn take_children(&mut self, out: &mut Vec<Expr>) {
        fn take(child: &mut Expr, out: &mut Vec<Expr>) {
            if !child.is_leaf() {
                out.push(mem::replace(child, Expr::hollow()));
            }
        }

        match self {
            Expr::Identifier(_) | Expr::Integer { .. } | Expr::Str { .. } => {}
            Expr::Prefix { operand, .. } => take(operand, out),
            Expr::Infix { left, right, .. } => {
                take(left, out);
                take(right, out);
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                take(callee, out);
                out.append(arguments);
            }
        }
    }

    fn hollow() -> Expr {
        Expr::Integer {
            token: Token::new(TokenType::Integer, String::new(), Span::default()),
            value: 0,
        }
    }
}

// Long operator chains nest thousands of boxes deep; tear them down with an
// explicit worklist instead of recursive drop glue.
impl Drop for Expr {
    fn drop(&mut self) {
        if self.is_leaf() {
            return;
        }
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.take_children(&mut pending);
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for stmt in &self.statements {
            writeln!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{{")?;
        for stmt in &self.statements {
            writeln!(f, "{}", stmt)?;
        }
        write!(f, "}}")
    }
}

/// Writes `items` separated by `", "`.
pub(crate) fn write_list<T: fmt::Display>(f: &mut fmt::Formatter, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stmt::Assign { token, name, value } => {
                write!(f, "{} {} = {}", token.lexeme, name, value)
            }
            Stmt::Function {
                token,
                name,
                parameters,
                body,
            } => {
                write!(f, "{} {}(", token.lexeme, name)?;
                write_list(f, parameters)?;
                write!(f, ") {}", body)
            }
            Stmt::Return { token, value } => match value {
                Some(value) => write!(f, "{} {}", token.lexeme, value),
                None => f.write_str(&token.lexeme),
            },
            Stmt::Print { token, value } => write!(f, "{} {}", token.lexeme, value),
            Stmt::If {
                token,
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "{} {} {}", token.lexeme, condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " growl {}", alternative)?;
                }
                Ok(())
            }
            Stmt::While {
                token,
                condition,
                body,
            } => write!(f, "{} {} {}", token.lexeme, condition, body),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        ensure_sufficient_stack(|| match self {
            Expr::Identifier(ident) => write!(f, "{}", ident),
            Expr::Integer { value, .. } => write!(f, "{}", value),
            Expr::Str { token, .. } => f.write_str(&token.lexeme),
            Expr::Prefix {
                operator, operand, ..
            } => write!(f, "({}{})", operator.symbol(), operand),
            Expr::Infix {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator.symbol(), right),
            Expr::Call {
                callee, arguments, ..
            } => {
                write!(f, "{}(", callee)?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
        })
    }
}
