// src/lexer/mod.rs

mod literals;

use crate::errors::LexerError;
use crate::{Span, Token, TokenType};

/// Smallest byte value that starts a multi-byte UTF-8 sequence (non-ASCII).
const UTF8_MULTIBYTE: u8 = 0x80;

#[derive(Clone)]
pub struct Lexer<'src> {
    pub(crate) source: &'src str,
    pub(crate) bytes: &'src [u8],
    pub(crate) current: usize,
    pub(crate) start: usize,
    pub(crate) line: u32,
    pub(crate) column: u32,
    pub(crate) start_column: u32,
    pub(crate) start_line: u32,
    pub(crate) errors: Vec<LexerError>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_column: 1,
            start_line: 1,
            errors: Vec::new(),
        }
    }

    /// Lex the whole source. The token list always ends with `Eof`.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<LexerError>) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.ty == TokenType::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tracing::trace!(
            tokens = tokens.len(),
            errors = self.errors.len(),
            "tokenized source"
        );
        (tokens, self.errors)
    }

    /// Take all collected errors, leaving the internal list empty.
    pub fn take_errors(&mut self) -> Vec<LexerError> {
        std::mem::take(&mut self.errors)
    }

    /// Check if any errors have been collected.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        self.start = self.current;
        self.start_column = self.column;
        self.start_line = self.line;

        let Some(c) = self.advance() else {
            return self.make_token(TokenType::Eof);
        };

        match c {
            '(' => self.make_token(TokenType::LParen),
            ')' => self.make_token(TokenType::RParen),
            '{' => self.make_token(TokenType::LBrace),
            '}' => self.make_token(TokenType::RBrace),
            '[' => self.make_token(TokenType::LBracket),
            ']' => self.make_token(TokenType::RBracket),
            ',' => self.make_token(TokenType::Comma),
            ';' => self.make_token(TokenType::Semicolon),
            '.' => self.make_token(TokenType::Dot),
            '#' => self.make_token(TokenType::Hash),
            '+' => self.make_token(TokenType::Plus),
            '-' => self.make_token(TokenType::Minus),
            '*' => self.make_token(TokenType::Star),
            '%' => self.make_token(TokenType::Percent),
            '^' => self.make_token(TokenType::Caret),
            '~' => self.make_token(TokenType::Tilde),
            '?' => self.make_token(TokenType::Question),
            ':' => {
                if self.match_byte(b':') {
                    self.make_token(TokenType::ColonColon)
                } else {
                    self.make_token(TokenType::Colon)
                }
            }
            '=' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenType::EqEq)
                } else {
                    self.make_token(TokenType::Eq)
                }
            }
            '!' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenType::BangEq)
                } else {
                    self.make_token(TokenType::Bang)
                }
            }
            '<' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenType::LtEq)
                } else {
                    self.make_token(TokenType::Lt)
                }
            }
            '>' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenType::GtEq)
                } else {
                    self.make_token(TokenType::Gt)
                }
            }
            '&' => {
                if self.match_byte(b'&') {
                    self.make_token(TokenType::AmpAmp)
                } else {
                    self.make_token(TokenType::Ampersand)
                }
            }
            '|' => {
                if self.match_byte(b'|') {
                    self.make_token(TokenType::PipePipe)
                } else {
                    self.make_token(TokenType::Pipe)
                }
            }

            // Slash, doc comment or comment
            '/' => {
                if self.match_byte(b'/') {
                    if self.match_byte(b'/') {
                        return self.doc_comment();
                    }
                    self.skip_line_comment();
                    // Don't consume the newline, let next_token handle it
                    self.next_token()
                } else if self.match_byte(b'*') {
                    match self.skip_block_comment() {
                        Some(token) => token,
                        None => self.next_token(),
                    }
                } else {
                    self.make_token(TokenType::Slash)
                }
            }

            '\n' => {
                let token = self.make_token(TokenType::Newline);
                self.line += 1;
                self.column = 1;
                token
            }

            '"' => self.string(),
            '\'' => self.char_literal(),

            c if c.is_ascii_digit() => self.number(),

            // Identifier or keyword (supports Unicode XID, bans invisible chars)
            c if c == '_' || (unicode_ident::is_xid_start(c) && !Self::is_banned_unicode(c)) => {
                self.identifier()
            }

            _ => self.error_unexpected_char(c),
        }
    }

    /// Skip whitespace (spaces, tabs, carriage returns) using direct byte access
    #[inline]
    fn skip_whitespace(&mut self) {
        while self.current < self.bytes.len() {
            match self.bytes[self.current] {
                b' ' | b'\t' | b'\r' => {
                    self.current += 1;
                    self.column += 1;
                }
                _ => break,
            }
        }
    }

    /// Advance to the next character and return it.
    #[inline]
    pub(crate) fn advance(&mut self) -> Option<char> {
        let b = *self.bytes.get(self.current)?;
        if b < UTF8_MULTIBYTE {
            self.current += 1;
            self.column += 1;
            Some(b as char)
        } else {
            let c = self.source[self.current..].chars().next()?;
            self.current += c.len_utf8();
            self.column += 1;
            Some(c)
        }
    }

    #[inline]
    pub(crate) fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.current).copied()
    }

    #[inline]
    pub(crate) fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.current + offset).copied()
    }

    /// Consume the next character if it matches the expected byte.
    #[inline]
    fn match_byte(&mut self, expected: u8) -> bool {
        debug_assert!(expected < UTF8_MULTIBYTE, "match_byte only works for ASCII");
        if self.peek_byte() == Some(expected) {
            self.current += 1;
            self.column += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        Span::new(self.start, self.current, self.start_line, self.start_column)
    }

    /// Create a token from start to current position
    pub(crate) fn make_token(&self, ty: TokenType) -> Token {
        let lexeme = &self.source[self.start..self.current];
        Token::new(ty, lexeme, self.current_span())
    }

    /// Record `error` and return an error token covering the current lexeme.
    pub(crate) fn error_token(&mut self, error: LexerError) -> Token {
        tracing::debug!(
            line = self.start_line,
            col = self.start_column,
            %error,
            "lexer error"
        );
        let message = error.to_string();
        self.errors.push(error);
        Token::new(TokenType::Error, message, self.current_span())
    }

    fn error_unexpected_char(&mut self, c: char) -> Token {
        let span = self.current_span();
        self.error_token(LexerError::UnexpectedCharacter {
            ch: c,
            span: span.into(),
        })
    }

    /// Scan an identifier or keyword (supports Unicode XID).
    fn identifier(&mut self) -> Token {
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.current += 1;
                self.column += 1;
            } else if b >= UTF8_MULTIBYTE {
                let Some(c) = self.source[self.current..].chars().next() else {
                    break;
                };
                if unicode_ident::is_xid_continue(c) && !Self::is_banned_unicode(c) {
                    self.current += c.len_utf8();
                    self.column += 1;
                } else {
                    break;
                }
            } else {
                break;
            }
        }

        let text = &self.source[self.start..self.current];
        let ty = TokenType::keyword_type(text).unwrap_or(TokenType::Identifier);
        self.make_token(ty)
    }

    /// `///` has been consumed. The lexeme is the comment text with one
    /// leading space and any trailing whitespace removed.
    fn doc_comment(&mut self) -> Token {
        let text_start = self.current;
        self.skip_line_comment();
        let text = &self.source[text_start..self.current];
        let text = text.strip_prefix(' ').unwrap_or(text).trim_end();
        Token::new(TokenType::DocComment, text, self.current_span())
    }

    /// Skip a line comment (everything until newline or EOF) using byte scanning.
    #[inline]
    fn skip_line_comment(&mut self) {
        while self.current < self.bytes.len() && self.bytes[self.current] != b'\n' {
            self.current += 1;
            self.column += 1;
        }
    }

    /// `/*` has been consumed. Block comments nest. Returns an error token if
    /// the comment never closes.
    fn skip_block_comment(&mut self) -> Option<Token> {
        let mut depth = 1u32;
        while depth > 0 {
            match (self.peek_byte(), self.peek_byte_at(1)) {
                (None, _) => {
                    let span = Span::new(self.start, self.start + 2, self.start_line, self.start_column);
                    return Some(self.error_token(LexerError::UnterminatedComment {
                        span: span.into(),
                    }));
                }
                (Some(b'*'), Some(b'/')) => {
                    self.current += 2;
                    self.column += 2;
                    depth -= 1;
                }
                (Some(b'/'), Some(b'*')) => {
                    self.current += 2;
                    self.column += 2;
                    depth += 1;
                }
                (Some(b'\n'), _) => {
                    self.current += 1;
                    self.line += 1;
                    self.column = 1;
                }
                _ => {
                    self.advance();
                }
            }
        }
        None
    }

    /// Check if a Unicode character is banned from identifiers
    /// (invisible, zero-width, or potentially confusing)
    fn is_banned_unicode(c: char) -> bool {
        matches!(
            c,
            // Zero-width characters
            '\u{200B}'
            | '\u{200C}'
            | '\u{200D}'
            | '\u{FEFF}'
            // Invisible formatting
            | '\u{00AD}'
            | '\u{034F}'
            | '\u{061C}'
            | '\u{115F}'..='\u{1160}'
            | '\u{17B4}'..='\u{17B5}'
            | '\u{180B}'..='\u{180E}'
            | '\u{2060}'..='\u{206F}'
            | '\u{3164}'
            | '\u{FFA0}'
            // Bidirectional overrides
            | '\u{202A}'..='\u{202E}'
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(source: &str) -> Vec<TokenType> {
        let (tokens, errors) = Lexer::new(source).tokenize();
        assert!(errors.is_empty(), "unexpected lexer errors: {errors:?}");
        tokens.into_iter().map(|t| t.ty).collect()
    }

    #[test]
    fn lex_struct_header() {
        assert_eq!(
            types("pub struct Pair[T, U] {"),
            vec![
                TokenType::KwPub,
                TokenType::KwStruct,
                TokenType::Identifier,
                TokenType::LBracket,
                TokenType::Identifier,
                TokenType::Comma,
                TokenType::Identifier,
                TokenType::RBracket,
                TokenType::LBrace,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn lex_receiver_and_return_type() {
        assert_eq!(
            types("fn show(&self): str"),
            vec![
                TokenType::KwFn,
                TokenType::Identifier,
                TokenType::LParen,
                TokenType::Ampersand,
                TokenType::KwSelfValue,
                TokenType::RParen,
                TokenType::Colon,
                TokenType::Identifier,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn lex_comments() {
        assert_eq!(
            types("a // trailing\nb"),
            vec![
                TokenType::Identifier,
                TokenType::Newline,
                TokenType::Identifier,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn lex_doc_comment_text() {
        let (tokens, _) = Lexer::new("/// A pair of values.  \nstruct").tokenize();
        assert_eq!(tokens[0].ty, TokenType::DocComment);
        assert_eq!(tokens[0].lexeme, "A pair of values.");
        assert_eq!(tokens[1].ty, TokenType::Newline);
        assert_eq!(tokens[2].ty, TokenType::KwStruct);
    }

    #[test]
    fn lex_nested_block_comment_tracks_lines() {
        let (tokens, errors) = Lexer::new("/* a /* b */\n c */ x").tokenize();
        assert!(errors.is_empty());
        assert_eq!(tokens[0].ty, TokenType::Identifier);
        assert_eq!(tokens[0].span.line, 2);
    }

    #[test]
    fn lex_unterminated_block_comment() {
        let (tokens, errors) = Lexer::new("/* open").tokenize();
        assert_eq!(tokens[0].ty, TokenType::Error);
        assert!(matches!(
            &errors[0],
            LexerError::UnterminatedComment { .. }
        ));
    }

    #[test]
    fn lexer_sets_span_positions() {
        let (tokens, _) = Lexer::new("struct\n  Point").tokenize();
        let point = &tokens[2];
        assert_eq!(point.lexeme, "Point");
        assert_eq!(point.span.start, 9);
        assert_eq!(point.span.end, 14);
        assert_eq!(point.span.line, 2);
        assert_eq!(point.span.column, 3);
    }

    #[test]
    fn lexer_collects_unexpected_char_error() {
        let mut lexer = Lexer::new("@");
        let token = lexer.next_token();

        assert_eq!(token.ty, TokenType::Error);
        assert!(lexer.has_errors());

        let errors = lexer.take_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            LexerError::UnexpectedCharacter { ch: '@', .. }
        ));
        assert!(!lexer.has_errors());
    }

    #[test]
    fn lexer_continues_after_errors() {
        let (tokens, errors) = Lexer::new("struct @ Point $").tokenize();
        let tys: Vec<_> = tokens.iter().map(|t| t.ty).collect();
        assert_eq!(
            tys,
            vec![
                TokenType::KwStruct,
                TokenType::Error,
                TokenType::Identifier,
                TokenType::Error,
                TokenType::Eof,
            ]
        );
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn lex_unicode_identifier() {
        let (tokens, errors) = Lexer::new("struct Größe").tokenize();
        assert!(errors.is_empty());
        assert_eq!(tokens[1].ty, TokenType::Identifier);
        assert_eq!(tokens[1].lexeme, "Größe");
    }

    #[test]
    fn lex_zero_width_space_is_rejected() {
        let (_, errors) = Lexer::new("a\u{200B}b").tokenize();
        assert_eq!(errors.len(), 1);
    }
}
