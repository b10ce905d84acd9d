// src/lexer/literals.rs
//
// Number, string and char literal lexing. Literals only appear inside skipped
// bodies and directive arguments, so the lexer validates their shape and
// leaves the value uninterpreted.

use crate::errors::LexerError;
use crate::{Token, TokenType};

use super::Lexer;

impl Lexer<'_> {
    /// Scan a number literal (integer or float).
    ///
    /// Supports `42`, `1_000`, `0xFF`, `0b1010`, `3.14`, `1e10`, `2.5E-3`.
    pub(super) fn number(&mut self) -> Token {
        let first = self.bytes[self.start];
        if first == b'0' {
            match self.peek_byte() {
                Some(b'x' | b'X') => return self.radix_literal(|b| b.is_ascii_hexdigit()),
                Some(b'b' | b'B') => return self.radix_literal(|b| b == b'0' || b == b'1'),
                _ => {}
            }
        }

        self.digits();
        let mut ty = TokenType::IntLiteral;

        if self.peek_byte() == Some(b'.') && self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit())
        {
            self.current += 1;
            self.column += 1;
            self.digits();
            ty = TokenType::FloatLiteral;
        }

        if matches!(self.peek_byte(), Some(b'e' | b'E')) {
            self.current += 1;
            self.column += 1;
            if matches!(self.peek_byte(), Some(b'+' | b'-')) {
                self.current += 1;
                self.column += 1;
            }
            if !self.peek_byte().is_some_and(|b| b.is_ascii_digit()) {
                return self.invalid_number();
            }
            self.digits();
            ty = TokenType::FloatLiteral;
        }

        if self.peek_byte().is_some_and(|b| b.is_ascii_alphabetic()) {
            return self.invalid_number();
        }

        self.make_token(ty)
    }

    /// `0` has been consumed and the radix marker is next.
    fn radix_literal(&mut self, is_digit: impl Fn(u8) -> bool) -> Token {
        self.current += 1;
        self.column += 1;
        let mut seen_digit = false;
        while let Some(b) = self.peek_byte() {
            if is_digit(b) {
                seen_digit = true;
            } else if b != b'_' {
                break;
            }
            self.current += 1;
            self.column += 1;
        }
        if !seen_digit || self.peek_byte().is_some_and(|b| b.is_ascii_alphanumeric()) {
            return self.invalid_number();
        }
        self.make_token(TokenType::IntLiteral)
    }

    fn digits(&mut self) {
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_digit() || b == b'_' {
                self.current += 1;
                self.column += 1;
            } else {
                break;
            }
        }
    }

    fn invalid_number(&mut self) -> Token {
        // Swallow the rest of the malformed literal so lexing resumes cleanly
        while self.peek_byte().is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_') {
            self.current += 1;
            self.column += 1;
        }
        let span = self.current_span();
        self.error_token(LexerError::InvalidNumber { span: span.into() })
    }

    /// Scan a string literal. Strings end at the closing quote and may not
    /// span lines.
    pub(super) fn string(&mut self) -> Token {
        loop {
            match self.peek_byte() {
                None | Some(b'\n') => {
                    let span = self.current_span();
                    return self.error_token(LexerError::UnterminatedString { span: span.into() });
                }
                Some(b'"') => {
                    self.advance();
                    return self.make_token(TokenType::StringLiteral);
                }
                Some(b'\\') => {
                    self.advance();
                    if self.peek_byte().is_some_and(|b| b != b'\n') {
                        self.advance();
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Scan a char literal such as `'a'` or `'\n'`.
    pub(super) fn char_literal(&mut self) -> Token {
        match self.peek_byte() {
            None | Some(b'\n') | Some(b'\'') => return self.unterminated_char(),
            Some(b'\\') => {
                self.advance();
                if self.peek_byte().is_none_or(|b| b == b'\n') {
                    return self.unterminated_char();
                }
                self.advance();
            }
            Some(_) => {
                self.advance();
            }
        }
        if self.peek_byte() == Some(b'\'') {
            self.advance();
            self.make_token(TokenType::CharLiteral)
        } else {
            self.unterminated_char()
        }
    }

    fn unterminated_char(&mut self) -> Token {
        let span = self.current_span();
        self.error_token(LexerError::UnterminatedChar { span: span.into() })
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::LexerError;
    use crate::{Lexer, TokenType};

    fn single(source: &str) -> (TokenType, String, Vec<LexerError>) {
        let (tokens, errors) = Lexer::new(source).tokenize();
        (tokens[0].ty, tokens[0].lexeme.clone(), errors)
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(single("42").0, TokenType::IntLiteral);
        assert_eq!(single("1_000_000").0, TokenType::IntLiteral);
        assert_eq!(single("0xDEAD_BEEF").0, TokenType::IntLiteral);
        assert_eq!(single("0b1010").0, TokenType::IntLiteral);
        assert_eq!(single("3.14").0, TokenType::FloatLiteral);
        assert_eq!(single("1.5e-3").0, TokenType::FloatLiteral);
        assert_eq!(single("2E+6").0, TokenType::FloatLiteral);
    }

    #[test]
    fn member_access_on_integer_is_not_a_float() {
        let (tokens, _) = Lexer::new("1.len").tokenize();
        assert_eq!(tokens[0].ty, TokenType::IntLiteral);
        assert_eq!(tokens[1].ty, TokenType::Dot);
    }

    #[test]
    fn lex_invalid_numbers() {
        for source in ["0x", "0b", "0b102", "12abc", "1e"] {
            let (ty, _, errors) = single(source);
            assert_eq!(ty, TokenType::Error, "{source}");
            assert!(
                matches!(&errors[..], [LexerError::InvalidNumber { .. }]),
                "{source}: {errors:?}"
            );
        }
    }

    #[test]
    fn lex_string_with_escapes() {
        let (ty, lexeme, errors) = single(r#""say \"hi\"""#);
        assert_eq!(ty, TokenType::StringLiteral);
        assert_eq!(lexeme, r#""say \"hi\"""#);
        assert!(errors.is_empty());
    }

    #[test]
    fn newline_terminates_string() {
        let (tokens, errors) = Lexer::new("\"open\nstruct").tokenize();
        assert_eq!(tokens[0].ty, TokenType::Error);
        assert_eq!(tokens[1].ty, TokenType::Newline);
        assert_eq!(tokens[2].ty, TokenType::KwStruct);
        assert!(matches!(&errors[..], [LexerError::UnterminatedString { .. }]));
    }

    #[test]
    fn lex_chars() {
        assert_eq!(single("'a'").0, TokenType::CharLiteral);
        assert_eq!(single(r"'\n'").0, TokenType::CharLiteral);
        let (ty, _, errors) = single("'ab'");
        assert_eq!(ty, TokenType::Error);
        assert!(matches!(&errors[0], LexerError::UnterminatedChar { .. }));
    }
}
