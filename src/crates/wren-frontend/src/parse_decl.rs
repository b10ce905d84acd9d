// src/parse_decl.rs
//
// Declaration parsing: structs, traits, impl blocks, type aliases, functions

use crate::ast::*;
use crate::errors::ParserError;
use crate::parser::{ParseError, Parser};
use crate::token::{Span, TokenType};

/// Doc comments and directives that precede a declaration
#[derive(Default)]
struct Preamble {
    doc: String,
    directives: Vec<Directive>,
}

/// Where a function declaration appears
#[derive(Clone, Copy, PartialEq, Eq)]
enum FnContext {
    TopLevel,
    Trait,
    Impl,
}

impl Parser {
    pub(super) fn declaration(&mut self) -> Result<Decl, ParseError> {
        let preamble = self.preamble();
        let start_span = self.current().span;
        let public = self.match_token(TokenType::KwPub);

        if self.check(TokenType::KwCpp) {
            let cpp_span = self.current().span;
            self.advance();
            if !self.check(TokenType::KwStruct) {
                return Err(ParseError::new(
                    ParserError::NativeNonStruct {
                        span: cpp_span.into(),
                    },
                    cpp_span,
                ));
            }
            return self.struct_decl(start_span, public, true, preamble);
        }

        if !preamble.directives.is_empty() && !self.check(TokenType::KwStruct) {
            for directive in &preamble.directives {
                self.report(
                    ParserError::MisplacedDirective {
                        span: directive.span.into(),
                    },
                    directive.span,
                );
            }
        }

        match self.current().ty {
            TokenType::KwStruct => self.struct_decl(start_span, public, false, preamble),
            TokenType::KwTrait => self.trait_decl(start_span, public, preamble.doc),
            TokenType::KwType => self.alias_decl(start_span, public, preamble.doc),
            TokenType::KwFn => {
                let func = self.function_decl(start_span, public, preamble.doc, FnContext::TopLevel)?;
                Ok(Decl::Function(func))
            }
            TokenType::KwImpl if !public => self.impl_block(start_span),
            _ => {
                let span = self.current().span;
                Err(ParseError::new(
                    ParserError::ExpectedDeclaration {
                        found: self.found(),
                        span: span.into(),
                    },
                    span,
                ))
            }
        }
    }

    /// Collect `///` lines and `#directive` lines ahead of a declaration.
    fn preamble(&mut self) -> Preamble {
        let mut preamble = Preamble::default();
        loop {
            match self.current().ty {
                TokenType::DocComment => {
                    if !preamble.doc.is_empty() {
                        preamble.doc.push('\n');
                    }
                    preamble.doc.push_str(&self.current().lexeme);
                    self.advance();
                }
                TokenType::Hash => preamble.directives.push(self.directive()),
                TokenType::Newline => self.advance(),
                _ => return preamble,
            }
        }
    }

    /// `#tag arg…` up to the end of the line. Arguments are kept as written.
    fn directive(&mut self) -> Directive {
        let hash_span = self.current().span;
        self.advance(); // consume '#'

        let mut tag = String::new();
        let mut args = Vec::new();
        let mut span = hash_span;
        while !self.check(TokenType::Newline) && !self.check(TokenType::Eof) {
            let token = self.current();
            if tag.is_empty() {
                tag = token.lexeme.clone();
            } else {
                args.push(token.lexeme.clone());
            }
            span = span.merge(token.span);
            self.advance();
        }

        Directive { tag, args, span }
    }

    fn struct_decl(
        &mut self,
        start_span: Span,
        public: bool,
        native: bool,
        preamble: Preamble,
    ) -> Result<Decl, ParseError> {
        self.advance(); // consume 'struct'

        let name = self.consume_ident("struct name")?;
        let type_params = self.parse_type_params()?;

        self.consume(TokenType::LBrace, "'{' after struct name")?;
        self.skip_newlines();

        let mut fields = Vec::new();
        while !self.check(TokenType::RBrace) && !self.check(TokenType::Eof) {
            fields.push(self.parse_field_def()?);
            self.member_separator("field")?;
        }

        self.consume(TokenType::RBrace, "'}' to close struct")?;
        let span = start_span.merge(self.previous().span);

        Ok(Decl::Struct(StructDecl {
            name,
            type_params,
            fields,
            public,
            native,
            directives: preamble.directives,
            doc: preamble.doc,
            span,
        }))
    }

    /// `[pub] [mut] name: Type`
    fn parse_field_def(&mut self) -> Result<FieldDecl, ParseError> {
        let doc = self.member_doc();
        let field_span = self.current().span;
        let public = self.match_token(TokenType::KwPub);
        let mutable = self.match_token(TokenType::KwMut);

        let name = self.consume_ident("field name")?;
        self.consume(TokenType::Colon, "':' after field name")?;
        let ty = self.parse_type()?;

        Ok(FieldDecl {
            name,
            ty,
            public,
            mutable,
            doc,
            span: field_span.merge(self.previous().span),
        })
    }

    /// Doc comments inside a struct, trait or impl body
    fn member_doc(&mut self) -> String {
        let mut doc = String::new();
        while self.check(TokenType::DocComment) {
            if !doc.is_empty() {
                doc.push('\n');
            }
            doc.push_str(&self.current().lexeme);
            self.advance();
            self.skip_newlines();
        }
        doc
    }

    /// Members are separated by a comma, a semicolon or a line break. The
    /// closing brace also ends the last member.
    fn member_separator(&mut self, what: &str) -> Result<(), ParseError> {
        if self.match_token(TokenType::Comma)
            || self.match_token(TokenType::Semicolon)
            || self.check(TokenType::Newline)
        {
            self.skip_newlines();
            Ok(())
        } else if self.check(TokenType::RBrace) {
            Ok(())
        } else {
            Err(self.expected(&format!("',' or newline after {what}")))
        }
    }

    fn trait_decl(&mut self, start_span: Span, public: bool, doc: String) -> Result<Decl, ParseError> {
        self.advance(); // consume 'trait'

        let name = self.consume_ident("trait name")?;
        self.consume(TokenType::LBrace, "'{' after trait name")?;
        self.skip_newlines();

        let methods = self.method_list(FnContext::Trait)?;

        self.consume(TokenType::RBrace, "'}' to close trait")?;
        let span = start_span.merge(self.previous().span);

        Ok(Decl::Trait(TraitDecl {
            name,
            public,
            methods,
            doc,
            span,
        }))
    }

    /// `impl Target { … }` or `impl Trait for Target { … }`
    fn impl_block(&mut self, start_span: Span) -> Result<Decl, ParseError> {
        self.advance(); // consume 'impl'

        let first = self.consume_ident("trait or type name after 'impl'")?;
        let (trait_name, target) = if self.match_token(TokenType::KwFor) {
            let target = self.consume_ident("type name after 'for'")?;
            (Some(first), target)
        } else {
            (None, first)
        };

        self.consume(TokenType::LBrace, "'{' to open impl block")?;
        self.skip_newlines();

        let methods = self.method_list(FnContext::Impl)?;

        self.consume(TokenType::RBrace, "'}' to close impl block")?;
        let span = start_span.merge(self.previous().span);

        Ok(Decl::Impl(ImplBlock {
            trait_name,
            target,
            methods,
            span,
        }))
    }

    fn method_list(&mut self, context: FnContext) -> Result<Vec<FuncDecl>, ParseError> {
        let mut methods = Vec::new();
        while !self.check(TokenType::RBrace) && !self.check(TokenType::Eof) {
            let doc = self.member_doc();
            let start_span = self.current().span;
            let public = self.match_token(TokenType::KwPub);
            if !self.check(TokenType::KwFn) {
                return Err(self.expected("'fn'"));
            }
            methods.push(self.function_decl(start_span, public, doc, context)?);
            self.member_separator("method")?;
        }
        Ok(methods)
    }

    /// `type Name: Type`
    fn alias_decl(&mut self, start_span: Span, public: bool, doc: String) -> Result<Decl, ParseError> {
        self.advance(); // consume 'type'

        let name = self.consume_ident("alias name")?;
        self.consume(TokenType::Colon, "':' after alias name")?;
        let target = self.parse_type()?;
        let span = start_span.merge(self.previous().span);

        Ok(Decl::Alias(AliasDecl {
            name,
            target,
            public,
            doc,
            span,
        }))
    }

    fn function_decl(
        &mut self,
        start_span: Span,
        public: bool,
        doc: String,
        context: FnContext,
    ) -> Result<FuncDecl, ParseError> {
        self.advance(); // consume 'fn'

        let name = self.consume_ident("function name")?;
        self.consume(TokenType::LParen, "'(' after function name")?;
        let (receiver, params) = self.parse_params()?;
        self.consume(TokenType::RParen, "')' after parameters")?;

        let return_type = if self.match_token(TokenType::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = if self.check(TokenType::LBrace) {
            let body = self.skip_body()?;
            if context == FnContext::Trait {
                self.report(
                    ParserError::TraitMethodWithBody {
                        name: name.name.clone(),
                        span: body.into(),
                    },
                    body,
                );
            }
            Some(body)
        } else {
            if context != FnContext::Trait {
                let span = self.current().span;
                return Err(ParseError::new(
                    ParserError::MissingBody {
                        name: name.name.clone(),
                        span: span.into(),
                    },
                    span,
                ));
            }
            None
        };

        let span = start_span.merge(self.previous().span);
        Ok(FuncDecl {
            name,
            public,
            receiver,
            params,
            return_type,
            body,
            doc,
            span,
        })
    }

    /// Parameter list between the parentheses. A receiver may only appear
    /// first.
    fn parse_params(&mut self) -> Result<(Option<Receiver>, Vec<Param>), ParseError> {
        let mut receiver = None;
        let mut params = Vec::new();
        self.skip_newlines();

        while !self.check(TokenType::RParen) && !self.check(TokenType::Eof) {
            let start = self.current().span;
            if let Some(recv) = self.parse_receiver() {
                let span = start.merge(self.previous().span);
                if receiver.is_some() || !params.is_empty() {
                    self.report(ParserError::MisplacedReceiver { span: span.into() }, span);
                } else {
                    receiver = Some(recv);
                }
            } else {
                let name = self.consume_ident("parameter name")?;
                self.consume(TokenType::Colon, "':' after parameter name")?;
                let ty = self.parse_type()?;
                params.push(Param {
                    name,
                    ty,
                    span: start.merge(self.previous().span),
                });
            }

            if !self.match_token(TokenType::Comma) && !self.check(TokenType::Newline) {
                break;
            }
            self.skip_newlines();
        }

        Ok((receiver, params))
    }

    /// `self`, `mut self` or `&self`
    fn parse_receiver(&mut self) -> Option<Receiver> {
        let receiver = match (self.current().ty, self.peek_ty(1)) {
            (TokenType::KwSelfValue, _) => Receiver::Value,
            (TokenType::KwMut, TokenType::KwSelfValue) => Receiver::MutValue,
            (TokenType::Ampersand, TokenType::KwSelfValue) => Receiver::Ref,
            _ => return None,
        };
        if receiver != Receiver::Value {
            self.advance();
        }
        self.advance(); // consume 'self'
        Some(receiver)
    }

    /// Skip a `{ … }` body by brace matching and return its span.
    fn skip_body(&mut self) -> Result<Span, ParseError> {
        let open = self.current().span;
        self.advance(); // consume '{'

        let mut depth = 1usize;
        loop {
            match self.current().ty {
                TokenType::LBrace => depth += 1,
                TokenType::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        let span = open.merge(self.current().span);
                        self.advance();
                        return Ok(span);
                    }
                }
                TokenType::Eof => {
                    return Err(ParseError::new(
                        ParserError::UnterminatedBody { span: open.into() },
                        open,
                    ));
                }
                _ => {}
            }
            self.advance();
        }
    }
}
