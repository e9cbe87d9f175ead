//=============================================
// fluxscript/parser.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: FluxScript recursive descent parser implementation
// Objective: Transform token streams into AST nodes consumed by interpreter
// Formatting: Zobie.format (.solvraformat)
//=============================================

//=============================================
//            Section 1: Imports
//=============================================

use std::rc::Rc;

use thiserror::Error;

use crate::ast::{
    AssignOp, BinaryOp, CallExpr, CompareOp, Expr, FunctionDef, Parameter, Program, Stmt, Type,
};
use crate::tokenizer::{Keyword, Position, Token, TokenKind};

//=============================================
//            Section 2: Parse Errors
//=============================================

/// Parser error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Expected {expected} but found {found} at {position}")]
    UnexpectedToken {
        expected: String,
        found: TokenKind,
        position: Position,
    },
    #[error("Unexpected end of input, expected {expected} at {position}")]
    UnexpectedEndOfInput { expected: String, position: Position },
    #[error("Invalid syntax: {message} at {position}")]
    InvalidSyntax { message: String, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEndOfInput { position, .. }
            | ParseError::InvalidSyntax { position, .. } => *position,
        }
    }
}

//=============================================
//            Section 3: Parser State
//=============================================

/// Recursive descent parser for FluxScript
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    //Function: new
    //Purpose: Initialize parser with token stream and reset cursor
    //Inputs: tokens: Vec<Token>
    //Returns: Self
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let position = tokens.last().map(|t| t.position).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, position));
        }
        Self { tokens, current: 0 }
    }

    //=============================================
    //            Section 4: Program & Blocks
    //=============================================

    /// Parse a complete FluxScript program
    //Function: parse
    //Purpose: Consume tokens and produce a FluxScript program AST
    //Inputs: &mut self
    //Returns: Result<Program, ParseError>
    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if self.check(&TokenKind::Newline) {
                self.advance();
                continue;
            }
            if self.check_keyword(Keyword::Function) {
                statements.push(self.parse_function_definition()?);
            } else {
                statements.push(self.parse_statement()?);
            }
        }

        tracing::debug!(statements = statements.len(), "parsed program");
        Ok(Program::new(statements))
    }

    /// Parse a single expression and ensure the stream is fully consumed.
    pub fn parse_expression_only(&mut self) -> Result<Expr, ParseError> {
        let expression = self.parse_expression()?;
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
        if !self.is_at_end() {
            return Err(self.unexpected("end of expression"));
        }
        Ok(expression)
    }

    /// `function name(type a, type b) ... end function`
    fn parse_function_definition(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Function)?;
        let name = self.expect_identifier("function name")?;
        self.expect(&TokenKind::LeftParen, "'('")?;

        let mut params = Vec::new();
        if matches!(self.peek().kind, TokenKind::Type(_)) {
            loop {
                let param_type = self.expect_type()?;
                let param_name = self.expect_identifier("parameter name")?;
                params.push(Parameter {
                    param_type,
                    name: param_name,
                });
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightParen, "')'")?;
        self.skip_newline();

        let body = self.parse_block(Keyword::Function)?;
        Ok(Stmt::FunctionDef(Rc::new(FunctionDef { name, params, body })))
    }

    /// Statements up to and including `end <closing>`.
    fn parse_block(&mut self, closing: Keyword) -> Result<Vec<Stmt>, ParseError> {
        let mut body = Vec::new();
        loop {
            match &self.peek().kind {
                TokenKind::Keyword(Keyword::End) => break,
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Eof => {
                    return Err(ParseError::UnexpectedEndOfInput {
                        expected: format!("'end {}'", closing.as_str()),
                        position: self.current_position(),
                    });
                }
                _ => body.push(self.parse_statement()?),
            }
        }
        self.expect_keyword(Keyword::End)?;
        self.expect_keyword(closing)?;
        self.skip_newline();
        Ok(body)
    }

    //=============================================
    //            Section 5: Statement Parsing
    //=============================================

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Type(_) => self.parse_variable_declaration(),
            TokenKind::Keyword(Keyword::Print) => self.parse_print_statement(),
            TokenKind::Keyword(Keyword::If) => self.parse_if_statement(),
            TokenKind::Keyword(Keyword::While) => self.parse_while_statement(),
            TokenKind::Keyword(Keyword::For) => self.parse_for_statement(),
            TokenKind::Keyword(Keyword::Return) => self.parse_return_statement(),
            TokenKind::Identifier(_) => match self.peek_next().kind {
                TokenKind::Equal
                | TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::SlashEqual => self.parse_assignment(),
                TokenKind::LeftParen => self.parse_call_statement(),
                _ => Err(self.unknown_statement(&token)),
            },
            _ => Err(self.unknown_statement(&token)),
        }
    }

    /// `type name = expr`
    fn parse_variable_declaration(&mut self) -> Result<Stmt, ParseError> {
        let var_type = self.expect_type()?;
        let name = self.expect_identifier("variable name")?;
        self.expect(&TokenKind::Equal, "'='")?;
        let initializer = self.parse_expression()?;
        self.skip_newline();
        Ok(Stmt::VarDecl {
            var_type,
            name,
            initializer,
        })
    }

    fn parse_assignment(&mut self) -> Result<Stmt, ParseError> {
        let name = self.expect_identifier("assignment target")?;
        let op = match self.advance().kind {
            TokenKind::Equal => AssignOp::Assign,
            TokenKind::PlusEqual => AssignOp::AddAssign,
            TokenKind::MinusEqual => AssignOp::SubtractAssign,
            TokenKind::StarEqual => AssignOp::MultiplyAssign,
            TokenKind::SlashEqual => AssignOp::DivideAssign,
            _ => {
                return Err(ParseError::InvalidSyntax {
                    message: "expected an assignment operator".to_string(),
                    position: self.previous().position,
                });
            }
        };
        let value = self.parse_expression()?;
        self.skip_newline();
        Ok(Stmt::Assign { name, op, value })
    }

    fn parse_call_statement(&mut self) -> Result<Stmt, ParseError> {
        let position = self.current_position();
        match self.parse_primary()? {
            Expr::Call(call) => {
                self.skip_newline();
                Ok(Stmt::Call(call))
            }
            _ => Err(ParseError::InvalidSyntax {
                message: "expected function call".to_string(),
                position,
            }),
        }
    }

    /// `print << a << b`
    fn parse_print_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Print)?;
        let mut parts = Vec::new();
        while self.check(&TokenKind::ShiftLeft) {
            self.advance();
            parts.push(self.parse_expression()?);
        }
        self.skip_newline();
        Ok(Stmt::Print { parts })
    }

    fn parse_if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::If)?;
        let condition = self.parse_expression()?;
        self.skip_newline();
        let body = self.parse_block(Keyword::If)?;
        Ok(Stmt::If { condition, body })
    }

    /// `while cond` or `while (cond)`
    fn parse_while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::While)?;
        // Parenthesized conditions fall out of the primary rule.
        let condition = self.parse_expression()?;
        self.skip_newline();
        let body = self.parse_block(Keyword::While)?;
        Ok(Stmt::While { condition, body })
    }

    /// `for name = start in end`
    fn parse_for_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::For)?;
        let variable = self.expect_identifier("loop variable")?;
        self.expect(&TokenKind::Equal, "'='")?;
        let start = self.parse_expression()?;
        self.expect_keyword(Keyword::In)?;
        let end = self.parse_expression()?;
        self.skip_newline();
        let body = self.parse_block(Keyword::For)?;
        Ok(Stmt::For {
            variable,
            start,
            end,
            body,
        })
    }

    fn parse_return_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Return)?;
        let value = self.parse_expression()?;
        self.skip_newline();
        Ok(Stmt::Return { value })
    }

    //=============================================
    //            Section 6: Expression Parsing
    //=============================================

    /// additive [ ('<' | '>') term ]
    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;

        let op = match self.peek().kind {
            TokenKind::Less => CompareOp::Less,
            TokenKind::Greater => CompareOp::Greater,
            _ => return Ok(left),
        };
        self.advance();
        // Only a term may follow the operator; `a < b + 1` leaves `+ 1` unparsed.
        let right = self.parse_multiplicative()?;

        if matches!(self.peek().kind, TokenKind::Less | TokenKind::Greater) {
            return Err(ParseError::InvalidSyntax {
                message: "comparison operators cannot be chained".to_string(),
                position: self.current_position(),
            });
        }

        Ok(Expr::comparison(op, left, right))
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            expr = Expr::binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            expr = Expr::binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().kind {
            TokenKind::Plus => {
                self.advance();
                self.parse_unary()
            }
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::UnaryMinus(Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number(number) => {
                self.advance();
                Ok(Expr::Number(number))
            }
            TokenKind::String(value) => {
                self.advance();
                Ok(Expr::String(value))
            }
            TokenKind::Boolean(value) => {
                self.advance();
                Ok(Expr::Bool(value))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                match self.peek().kind {
                    TokenKind::LeftBracket => self.parse_slice(name),
                    TokenKind::LeftParen => self.parse_call_arguments(name),
                    _ => Ok(Expr::Variable(name)),
                }
            }
            TokenKind::Keyword(Keyword::Input) => {
                self.advance();
                self.expect(&TokenKind::ShiftLeft, "'<<' after 'input'")?;
                let prompt = self.parse_expression()?;
                Ok(Expr::Input(Box::new(prompt)))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::RightParen, "')'")?;
                Ok(expr)
            }
            TokenKind::Eof => Err(ParseError::UnexpectedEndOfInput {
                expected: "expression".to_string(),
                position: token.position,
            }),
            _ => Err(ParseError::UnexpectedToken {
                expected: "expression".to_string(),
                found: token.kind,
                position: token.position,
            }),
        }
    }

    /// `name[start:end]` with the name already consumed.
    fn parse_slice(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftBracket, "'['")?;
        let start = if self.check(&TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(&TokenKind::Colon, "':' in slice")?;
        let end = if self.check(&TokenKind::RightBracket) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(&TokenKind::RightBracket, "']'")?;
        Ok(Expr::Slice { name, start, end })
    }

    /// `name(arg, ...)` with the name already consumed.
    fn parse_call_arguments(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightParen, "')'")?;
        Ok(Expr::Call(CallExpr { name, args }))
    }

    //=============================================
    //            Section 7: Token Navigation
    //=============================================

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        let index = self.current.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn peek_next(&self) -> &Token {
        let index = (self.current + 1).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn current_position(&self) -> Position {
        self.peek().position
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek().kind, TokenKind::Keyword(k) if k == keyword)
    }

    /// Statements may be followed by at most one newline; blank lines are
    /// skipped by the enclosing block or program loop.
    fn skip_newline(&mut self) {
        if self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<Token, ParseError> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("keyword '{}'", keyword.as_str())))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String, ParseError> {
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn expect_type(&mut self) -> Result<Type, ParseError> {
        match self.peek().kind {
            TokenKind::Type(ty) => {
                self.advance();
                Ok(ty)
            }
            _ => Err(self.unexpected("type name")),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        if matches!(token.kind, TokenKind::Eof) {
            ParseError::UnexpectedEndOfInput {
                expected: expected.to_string(),
                position: token.position,
            }
        } else {
            ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.kind.clone(),
                position: token.position,
            }
        }
    }

    fn unknown_statement(&self, token: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            expected: "statement".to_string(),
            found: token.kind.clone(),
            position: token.position,
        }
    }
}

//=============================================
//            Section 8: Tests
//=============================================


//=============================================
// End of file
//=============================================
