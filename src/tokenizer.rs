//=====================================================
// File: tokenizer.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: FluxScript lexical analysis
// Objective: Convert raw source text into a finite token stream terminated
//            by an end marker, tracking line/column positions
//=====================================================

use std::fmt;

use thiserror::Error;

use crate::ast::{Number, Type};

/// Represents the position of a token in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Function,
    End,
    For,
    While,
    If,
    Return,
    Print,
    Input,
    In,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "function" => Some(Keyword::Function),
            "end" => Some(Keyword::End),
            "for" => Some(Keyword::For),
            "while" => Some(Keyword::While),
            "if" => Some(Keyword::If),
            "return" => Some(Keyword::Return),
            "print" => Some(Keyword::Print),
            "input" => Some(Keyword::Input),
            "in" => Some(Keyword::In),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Function => "function",
            Keyword::End => "end",
            Keyword::For => "for",
            Keyword::While => "while",
            Keyword::If => "if",
            Keyword::Return => "return",
            Keyword::Print => "print",
            Keyword::Input => "input",
            Keyword::In => "in",
        }
    }
}

/// All possible token types in FluxScript
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(Number),
    String(String),
    Boolean(bool),

    Identifier(String),
    Keyword(Keyword),
    Type(Type),

    // Two-character operators
    ShiftLeft,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,

    // Single-character operators and delimiters
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    Less,
    Greater,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,

    Newline,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::String(s) => write!(f, "string \"{}\"", s),
            TokenKind::Boolean(b) => write!(f, "boolean {}", b),
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::Keyword(keyword) => write!(f, "keyword '{}'", keyword.as_str()),
            TokenKind::Type(ty) => write!(f, "type '{}'", ty),
            TokenKind::ShiftLeft => f.write_str("'<<'"),
            TokenKind::PlusEqual => f.write_str("'+='"),
            TokenKind::MinusEqual => f.write_str("'-='"),
            TokenKind::StarEqual => f.write_str("'*='"),
            TokenKind::SlashEqual => f.write_str("'/='"),
            TokenKind::Plus => f.write_str("'+'"),
            TokenKind::Minus => f.write_str("'-'"),
            TokenKind::Star => f.write_str("'*'"),
            TokenKind::Slash => f.write_str("'/'"),
            TokenKind::Equal => f.write_str("'='"),
            TokenKind::Less => f.write_str("'<'"),
            TokenKind::Greater => f.write_str("'>'"),
            TokenKind::LeftParen => f.write_str("'('"),
            TokenKind::RightParen => f.write_str("')'"),
            TokenKind::LeftBracket => f.write_str("'['"),
            TokenKind::RightBracket => f.write_str("']'"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

/// A token with its kind and position information
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Self { kind, position }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{character}' at {position}")]
    UnexpectedCharacter { character: char, position: Position },
    #[error("unterminated string literal starting at {position}")]
    UnterminatedString { position: Position },
    #[error("malformed number '{literal}' at {position}: more than one decimal point")]
    MalformedNumber { literal: String, position: Position },
    #[error("integer literal '{literal}' at {position} is out of range")]
    IntegerOutOfRange { literal: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedCharacter { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::MalformedNumber { position, .. }
            | LexError::IntegerOutOfRange { position, .. } => *position,
        }
    }
}

/// Tokenizer for FluxScript
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Scan the whole input once. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        while !self.is_at_end() {
            let ch = self.current_char();

            if ch == '\n' {
                let start = self.current_position();
                self.advance();
                self.tokens.push(Token::new(TokenKind::Newline, start));
                continue;
            }

            if ch.is_whitespace() {
                self.advance();
                continue;
            }

            if let Some(kind) = self.two_char_operator() {
                let start = self.current_position();
                self.advance();
                self.advance();
                self.tokens.push(Token::new(kind, start));
                continue;
            }

            if ch.is_ascii_digit() {
                self.handle_number()?;
                continue;
            }

            if ch.is_alphabetic() || ch == '_' {
                self.handle_identifier();
                continue;
            }

            if ch == '"' {
                self.handle_string()?;
                continue;
            }

            self.handle_operator_or_delimiter()?;
        }

        let end = self.current_position();
        self.tokens.push(Token::new(TokenKind::Eof, end));
        Ok(std::mem::take(&mut self.tokens))
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_char(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.input[self.position]
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.current_char();
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        ch
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column, self.position)
    }

    fn two_char_operator(&self) -> Option<TokenKind> {
        let kind = match (self.current_char(), self.peek_char()?) {
            ('<', '<') => TokenKind::ShiftLeft,
            ('+', '=') => TokenKind::PlusEqual,
            ('-', '=') => TokenKind::MinusEqual,
            ('*', '=') => TokenKind::StarEqual,
            ('/', '=') => TokenKind::SlashEqual,
            _ => return None,
        };
        Some(kind)
    }

    fn handle_number(&mut self) -> Result<(), LexError> {
        let start = self.current_position();
        let mut literal = String::new();
        let mut is_float = false;
        let mut malformed = false;

        while !self.is_at_end()
            && (self.current_char().is_ascii_digit() || self.current_char() == '.')
        {
            if self.current_char() == '.' {
                if is_float {
                    malformed = true;
                }
                is_float = true;
            }
            literal.push(self.advance());
        }

        if malformed {
            return Err(LexError::MalformedNumber {
                literal,
                position: start,
            });
        }

        let number = if is_float {
            // A run of digits with a single dot always parses, "5." included.
            match literal.parse::<f64>() {
                Ok(value) => Number::Float(value),
                Err(_) => {
                    return Err(LexError::MalformedNumber {
                        literal,
                        position: start,
                    });
                }
            }
        } else {
            match literal.parse::<i64>() {
                Ok(value) => Number::Integer(value),
                Err(_) => {
                    return Err(LexError::IntegerOutOfRange {
                        literal,
                        position: start,
                    });
                }
            }
        };

        self.tokens.push(Token::new(TokenKind::Number(number), start));
        Ok(())
    }

    fn handle_identifier(&mut self) {
        let start = self.current_position();
        let mut word = String::new();
        while !self.is_at_end()
            && (self.current_char().is_alphanumeric() || self.current_char() == '_')
        {
            word.push(self.advance());
        }

        // Keywords win over type names, type names over boolean literals.
        let kind = if let Some(keyword) = Keyword::from_word(&word) {
            TokenKind::Keyword(keyword)
        } else if let Some(ty) = Type::from_keyword(&word) {
            TokenKind::Type(ty)
        } else if word == "true" || word == "false" {
            TokenKind::Boolean(word == "true")
        } else {
            TokenKind::Identifier(word)
        };
        self.tokens.push(Token::new(kind, start));
    }

    fn handle_string(&mut self) -> Result<(), LexError> {
        let start = self.current_position();
        self.advance(); // consume opening quote

        let mut value = String::new();
        while !self.is_at_end() && self.current_char() != '"' {
            if self.current_char() == '\\' {
                match self.peek_char() {
                    Some('n') => {
                        value.push('\n');
                        self.advance();
                        self.advance();
                        continue;
                    }
                    Some('"') => {
                        value.push('"');
                        self.advance();
                        self.advance();
                        continue;
                    }
                    // Any other backslash is kept as written.
                    _ => {}
                }
            }
            value.push(self.advance());
        }

        if self.is_at_end() {
            return Err(LexError::UnterminatedString { position: start });
        }

        self.advance(); // consume closing quote
        self.tokens.push(Token::new(TokenKind::String(value), start));
        Ok(())
    }

    fn handle_operator_or_delimiter(&mut self) -> Result<(), LexError> {
        let start = self.current_position();
        let ch = self.advance();

        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => TokenKind::Equal,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            _ => {
                return Err(LexError::UnexpectedCharacter {
                    character: ch,
                    position: start,
                });
            }
        };

        self.tokens.push(Token::new(kind, start));
        Ok(())
    }
}


//=====================================================
// End of file
//=====================================================
