// src/parse_generic.rs
//
// Bracketed generic lists: parameters on declarations (`struct Pair[T, U]`)
// and arguments on type references (`Pair[int, str]`).

use crate::ast::{TypeExpr, TypeParam};
use crate::errors::ParserError;
use crate::parser::{ParseError, Parser};
use crate::token::TokenType;

impl Parser {
    /// Parse optional type parameters: `[T, U]`. Returns empty Vec if absent.
    pub(super) fn parse_type_params(&mut self) -> Result<Vec<TypeParam>, ParseError> {
        if !self.check(TokenType::LBracket) {
            return Ok(Vec::new());
        }
        let open = self.current().span;
        self.advance(); // consume '['
        self.skip_newlines();

        let mut params = Vec::new();
        while !self.check(TokenType::RBracket) {
            let name = self.consume_ident("type parameter name")?;
            params.push(TypeParam {
                name: name.name,
                span: name.span,
            });
            self.skip_newlines();
            if !self.match_token(TokenType::Comma) {
                break;
            }
            self.skip_newlines();
        }

        self.consume(TokenType::RBracket, "']' after type parameters")?;
        if params.is_empty() {
            let span = open.merge(self.previous().span);
            return Err(ParseError::new(
                ParserError::EmptyTypeArgs { span: span.into() },
                span,
            ));
        }
        Ok(params)
    }

    /// Parse optional type arguments after a type name: `[A, B]`.
    pub(super) fn parse_type_args(&mut self) -> Result<Vec<TypeExpr>, ParseError> {
        if !self.check(TokenType::LBracket) {
            return Ok(Vec::new());
        }
        let open = self.current().span;
        self.advance(); // consume '['
        self.skip_newlines();

        let mut args = Vec::new();
        while !self.check(TokenType::RBracket) {
            args.push(self.parse_type()?);
            self.skip_newlines();
            if !self.match_token(TokenType::Comma) {
                break;
            }
            self.skip_newlines();
        }

        self.consume(TokenType::RBracket, "']' after type arguments")?;
        if args.is_empty() {
            let span = open.merge(self.previous().span);
            return Err(ParseError::new(
                ParserError::EmptyTypeArgs { span: span.into() },
                span,
            ));
        }
        Ok(args)
    }
}
