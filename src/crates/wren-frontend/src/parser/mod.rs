// src/parser/mod.rs

use crate::errors::ParserError;
use crate::{Span, Token, TokenType, ast::*};

pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    /// Errors that did not abort the current declaration
    pub(super) errors: Vec<ParseError>,
}

/// A parse error wrapping a miette-enabled ParserError
#[derive(Debug, Clone)]
pub struct ParseError {
    pub error: ParserError,
    pub span: Span,
}

impl ParseError {
    pub fn new(error: ParserError, span: Span) -> Self {
        Self { error, span }
    }
}

impl Parser {
    /// Build a parser over a token stream produced by [`crate::Lexer::tokenize`].
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.ty != TokenType::Eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Token::new(TokenType::Eof, "", Span::new(end, end, 0, 0)));
        }
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Parse every top-level declaration. Parsing recovers at the next
    /// declaration after an error, so all errors in the file are reported.
    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let mut declarations = Vec::new();
        self.skip_newlines();

        while !self.check(TokenType::Eof) {
            let decl_start = self.pos;
            match self.declaration() {
                Ok(decl) => declarations.push(decl),
                Err(err) => {
                    tracing::debug!(error = %err.error, line = err.span.line, "parse error, recovering");
                    self.errors.push(err);
                    self.synchronize(decl_start);
                }
            }
            self.skip_newlines();
        }

        if self.errors.is_empty() {
            Ok(Program { declarations })
        } else {
            let mut errors = std::mem::take(&mut self.errors);
            errors.sort_by_key(|e| e.span.start);
            Err(errors)
        }
    }

    /// Skip tokens until the next top-level declaration. Braces opened since
    /// `decl_start` are still open, so anything nested inside them is skipped.
    fn synchronize(&mut self, decl_start: usize) {
        let mut depth = self.tokens[decl_start..self.pos]
            .iter()
            .fold(0usize, |depth, t| match t.ty {
                TokenType::LBrace => depth + 1,
                TokenType::RBrace => depth.saturating_sub(1),
                _ => depth,
            });
        if !self.check(TokenType::Eof) {
            if self.check(TokenType::RBrace) {
                depth = depth.saturating_sub(1);
            } else if self.check(TokenType::LBrace) {
                depth += 1;
            }
            self.advance();
        }
        while !self.check(TokenType::Eof) {
            match self.current().ty {
                TokenType::LBrace => depth += 1,
                TokenType::RBrace => depth = depth.saturating_sub(1),
                _ if depth == 0 && self.at_declaration_start() => return,
                _ => {}
            }
            self.advance();
        }
    }

    /// A token that can only begin a top-level declaration
    pub(super) fn at_declaration_start(&self) -> bool {
        match self.current().ty {
            TokenType::KwPub => matches!(
                self.peek_ty(1),
                TokenType::KwStruct
                    | TokenType::KwTrait
                    | TokenType::KwFn
                    | TokenType::KwType
                    | TokenType::KwCpp
            ),
            ty => ty.starts_declaration(),
        }
    }

    pub(super) fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub(super) fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    /// Type of the token `offset` positions ahead (Eof past the end)
    pub(super) fn peek_ty(&self, offset: usize) -> TokenType {
        self.tokens
            .get(self.pos + offset)
            .map_or(TokenType::Eof, |t| t.ty)
    }

    pub(super) fn skip_newlines(&mut self) {
        while self.check(TokenType::Newline) {
            self.advance();
        }
    }

    /// Advance to the next token
    pub(super) fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Check if the current token matches the given type
    pub(super) fn check(&self, ty: TokenType) -> bool {
        self.current().ty == ty
    }

    /// Consume the current token if it matches, otherwise return false
    pub(super) fn match_token(&mut self, ty: TokenType) -> bool {
        if self.check(ty) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Require a token of the given type, or return an error
    pub(super) fn consume(&mut self, ty: TokenType, msg: &str) -> Result<(), ParseError> {
        if self.check(ty) {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(msg))
        }
    }

    pub(super) fn consume_ident(&mut self, msg: &str) -> Result<Ident, ParseError> {
        if self.check(TokenType::Identifier) {
            let token = self.current();
            let ident = Ident::new(token.lexeme.clone(), token.span);
            self.advance();
            Ok(ident)
        } else {
            Err(self.expected(msg))
        }
    }

    /// How the current token is shown in diagnostics
    pub(super) fn found(&self) -> String {
        let token = self.current();
        match token.ty {
            TokenType::Identifier
            | TokenType::IntLiteral
            | TokenType::FloatLiteral
            | TokenType::StringLiteral
            | TokenType::CharLiteral => token.lexeme.clone(),
            ty => ty.as_str().to_string(),
        }
    }

    pub(super) fn expected(&self, msg: &str) -> ParseError {
        let span = self.current().span;
        ParseError::new(
            ParserError::ExpectedToken {
                expected: msg.to_string(),
                found: self.found(),
                span: span.into(),
            },
            span,
        )
    }

    /// Record an error without aborting the declaration being parsed
    pub(super) fn report(&mut self, error: ParserError, span: Span) {
        self.errors.push(ParseError::new(error, span));
    }
}
