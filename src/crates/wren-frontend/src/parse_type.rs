// src/parse_type.rs
//
// Type expression parsing: `Name`, `Name[A, B]`, `*T`, `&T`, `[]T`, `Self`.

use crate::ast::{Ident, TypeExpr, TypeExprKind};
use crate::errors::ParserError;
use crate::parser::{ParseError, Parser};
use crate::token::TokenType;

impl Parser {
    pub(super) fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.current().span;
        match self.current().ty {
            TokenType::Star => {
                self.advance();
                let inner = self.parse_type()?;
                let span = start.merge(inner.span);
                Ok(TypeExpr::new(TypeExprKind::Pointer(Box::new(inner)), span))
            }
            TokenType::Ampersand => {
                self.advance();
                let inner = self.parse_type()?;
                let span = start.merge(inner.span);
                Ok(TypeExpr::new(TypeExprKind::Reference(Box::new(inner)), span))
            }
            TokenType::LBracket => {
                self.advance();
                self.consume(TokenType::RBracket, "']' in slice type")?;
                let inner = self.parse_type()?;
                let span = start.merge(inner.span);
                Ok(TypeExpr::new(TypeExprKind::Slice(Box::new(inner)), span))
            }
            TokenType::KwSelfType => {
                self.advance();
                Ok(TypeExpr::new(TypeExprKind::SelfType, start))
            }
            TokenType::Identifier => {
                let name = Ident::new(self.current().lexeme.clone(), start);
                self.advance();
                let args = self.parse_type_args()?;
                let span = start.merge(self.previous().span);
                Ok(TypeExpr::new(TypeExprKind::Named { name, args }, span))
            }
            _ => Err(ParseError::new(
                ParserError::ExpectedType {
                    found: self.found(),
                    span: start.into(),
                },
                start,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::TypeExprKind;
    use crate::errors::ParserError;
    use crate::{Lexer, Parser};

    fn parse(source: &str) -> Result<crate::ast::TypeExpr, crate::ParseError> {
        let (tokens, errors) = Lexer::new(source).tokenize();
        assert!(errors.is_empty());
        Parser::new(tokens).parse_type()
    }

    #[test]
    fn parse_nested_generic_type() {
        let ty = parse("Pair[Box[int], str]").unwrap();
        assert_eq!(ty.to_string(), "Pair[Box[int],str]");
        assert_eq!(ty.span.start, 0);
        assert_eq!(ty.span.end, 19);
    }

    #[test]
    fn parse_indirections() {
        let ty = parse("*&[]Node[T]").unwrap();
        assert_eq!(ty.to_string(), "*&[]Node[T]");
        let TypeExprKind::Pointer(inner) = &ty.kind else {
            panic!("expected pointer, got {:?}", ty.kind);
        };
        assert!(matches!(inner.kind, TypeExprKind::Reference(_)));
    }

    #[test]
    fn parse_self_type() {
        let ty = parse("*Self").unwrap();
        assert_eq!(ty.to_string(), "*Self");
    }

    #[test]
    fn empty_type_args_are_rejected() {
        let err = parse("Box[]").unwrap_err();
        assert!(matches!(err.error, ParserError::EmptyTypeArgs { .. }));
    }

    #[test]
    fn missing_type_is_reported() {
        let err = parse("{").unwrap_err();
        assert!(matches!(err.error, ParserError::ExpectedType { .. }));
    }
}
