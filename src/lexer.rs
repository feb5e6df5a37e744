use crate::error::{MeowError, Span};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Star,
    Slash,
    Less,
    Greater,
    EqualEqual,
    BangEqual,

    // Delimiters
    Comma,
    Semicolon,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,

    // Literals
    Identifier,
    Integer,
    String,

    // Keywords
    Lick,
    Meow,
    Claw,
    Purr,
    Hiss,
    Growl,
    Scratch,

    // Special
    Illegal,
    Eof,
}

impl TokenType {
    /// True for the keywords that open a statement.
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenType::Lick
                | TokenType::Meow
                | TokenType::Claw
                | TokenType::Purr
                | TokenType::Hiss
                | TokenType::Scratch
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenType::Assign => "=",
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Bang => "!",
            TokenType::Star => "*",
            TokenType::Slash => "/",
            TokenType::Less => "<",
            TokenType::Greater => ">",
            TokenType::EqualEqual => "==",
            TokenType::BangEqual => "!=",
            TokenType::Comma => ",",
            TokenType::Semicolon => ";",
            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::LeftBrace => "{",
            TokenType::RightBrace => "}",
            TokenType::Identifier => "IDENT",
            TokenType::Integer => "INT",
            TokenType::String => "STRING",
            TokenType::Lick => "LICK",
            TokenType::Meow => "MEOW",
            TokenType::Claw => "CLAW",
            TokenType::Purr => "PURR",
            TokenType::Hiss => "HISS",
            TokenType::Growl => "GROWL",
            TokenType::Scratch => "SCRATCH",
            TokenType::Illegal => "ILLEGAL",
            TokenType::Eof => "EOF",
        };
        f.write_str(name)
    }
}

/// A classified slice of source text. `lexeme` is the exact text it was
/// scanned from, quotes included for strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, span: Span) -> Self {
        Self {
            token_type,
            lexeme,
            span,
        }
    }

    /// Lex-level diagnostic for an illegal token, `None` for anything else.
    pub fn diagnostic(&self) -> Option<MeowError> {
        if self.token_type != TokenType::Illegal {
            return None;
        }
        let message = if self.lexeme.starts_with('"') {
            "Unterminated string".to_string()
        } else {
            format!("Unexpected character: '{}'", self.lexeme)
        };
        Some(MeowError::lex_error(self.span, message))
    }
}

/// Scans `source` into tokens. Never fails; the last token is always `Eof`.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).scan_tokens()
}

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    keywords: HashMap<&'static str, TokenType>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let mut keywords = HashMap::new();
        keywords.insert("claw", TokenType::Claw);
        keywords.insert("growl", TokenType::Growl);
        keywords.insert("hiss", TokenType::Hiss);
        keywords.insert("lick", TokenType::Lick);
        keywords.insert("meow", TokenType::Meow);
        keywords.insert("purr", TokenType::Purr);
        keywords.insert("scratch", TokenType::Scratch);

        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            keywords,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token::new(
            TokenType::Eof,
            String::new(),
            Span::single(self.current),
        ));

        self.tokens
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            ',' => self.add_token(TokenType::Comma),
            ';' => self.add_token(TokenType::Semicolon),
            '+' => self.add_token(TokenType::Plus),
            '-' => self.add_token(TokenType::Minus),
            '*' => self.add_token(TokenType::Star),
            '<' => self.add_token(TokenType::Less),
            '>' => self.add_token(TokenType::Greater),
            '!' => {
                let token_type = if self.match_char('=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.add_token(token_type);
            }
            '=' => {
                let token_type = if self.match_char('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Assign
                };
                self.add_token(token_type);
            }
            '/' => {
                if self.match_char('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.match_char('*') {
                    self.block_comment();
                } else {
                    self.add_token(TokenType::Slash);
                }
            }
            '"' => self.string(),
            c if c.is_whitespace() => {}
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),
            _ => self.add_token(TokenType::Illegal),
        }
    }

    fn advance(&mut self) -> char {
        match self.source.get(self.current) {
            Some(&c) => {
                self.current += 1;
                c
            }
            None => '\0',
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.current += 1;
            true
        }
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    /// Skips to the first `*/`; runs to end of input when there is none.
    fn block_comment(&mut self) {
        while !self.is_at_end() {
            if self.peek() == '*' && self.peek_next() == '/' {
                self.current += 2;
                return;
            }
            self.advance();
        }
    }

    fn string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            self.advance();
        }

        if self.is_at_end() {
            self.add_token(TokenType::Illegal);
            return;
        }

        // closing quote
        self.advance();
        self.add_token(TokenType::String);
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        self.add_token(TokenType::Integer);
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let token_type = self
            .keywords
            .get(text.as_str())
            .copied()
            .unwrap_or(TokenType::Identifier);

        self.tokens
            .push(Token::new(token_type, text, Span::new(self.start, self.current)));
    }

    fn add_token(&mut self, token_type: TokenType) {
        let text: String = self.source[self.start..self.current].iter().collect();
        self.tokens
            .push(Token::new(token_type, text, Span::new(self.start, self.current)));
    }
}
