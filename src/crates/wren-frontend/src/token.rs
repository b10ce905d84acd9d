// src/token.rs

/// Single source of truth for keyword-to-token mapping.
///
/// Each entry `"text" => Variant` generates:
/// - A match arm in `TokenType::keyword_type`: `"text" => Some(TokenType::Variant)`
/// - A match arm in `TokenType::as_str`:       `Self::Variant => "text"`
macro_rules! define_keywords {
    ( $( $text:literal => $variant:ident ),+ $(,)? ) => {
        impl TokenType {
            /// Check if a string is a keyword and return its token type.
            pub fn keyword_type(text: &str) -> Option<TokenType> {
                match text {
                    $( $text => Some(TokenType::$variant), )+
                    _ => None,
                }
            }

            /// String representation for keyword tokens (used by `as_str`).
            fn keyword_as_str(&self) -> Option<&'static str> {
                match self {
                    $( Self::$variant => Some($text), )+
                    _ => None,
                }
            }
        }
    };
}

define_keywords! {
    "struct" => KwStruct,
    "trait"  => KwTrait,
    "impl"   => KwImpl,
    "for"    => KwFor,
    "fn"     => KwFn,
    "pub"    => KwPub,
    "mut"    => KwMut,
    "cpp"    => KwCpp,
    "type"   => KwType,
    "self"   => KwSelfValue,
    "Self"   => KwSelfType,
}

/// All token types of the wren surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // Literals
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    CharLiteral,
    Identifier,

    // Keywords
    KwStruct,
    KwTrait,
    KwImpl,
    KwFor,
    KwFn,
    KwPub,
    KwMut,
    KwCpp,       // native linkage marker
    KwType,      // type alias
    KwSelfValue, // self receiver
    KwSelfType,  // Self in trait and impl signatures

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    ColonColon,
    Dot,
    Hash,

    // Operators (only meaningful inside skipped bodies)
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    Bang,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Ampersand,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    Tilde,
    Question,

    // Trivia that the parser cares about
    DocComment,
    Newline,

    // Special
    Error,
    Eof,
}

impl TokenType {
    /// Human-readable spelling used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        if let Some(kw) = self.keyword_as_str() {
            return kw;
        }
        match self {
            Self::IntLiteral => "integer literal",
            Self::FloatLiteral => "float literal",
            Self::StringLiteral => "string literal",
            Self::CharLiteral => "char literal",
            Self::Identifier => "identifier",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::ColonColon => "::",
            Self::Dot => ".",
            Self::Hash => "#",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Eq => "=",
            Self::EqEq => "==",
            Self::Bang => "!",
            Self::BangEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Ampersand => "&",
            Self::AmpAmp => "&&",
            Self::Pipe => "|",
            Self::PipePipe => "||",
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::Question => "?",
            Self::DocComment => "doc comment",
            Self::Newline => "newline",
            Self::Error => "error",
            Self::Eof => "end of file",
            _ => "keyword",
        }
    }

    /// Tokens that start a top-level declaration (used for error recovery).
    pub fn starts_declaration(&self) -> bool {
        matches!(
            self,
            Self::KwStruct
                | Self::KwTrait
                | Self::KwImpl
                | Self::KwFn
                | Self::KwPub
                | Self::KwCpp
                | Self::KwType
                | Self::Hash
                | Self::DocComment
        )
    }
}

// Re-export Span from wren-identity (canonical definition)
pub use wren_identity::Span;

/// A token with its location in source code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub ty: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(ty: TokenType, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            ty,
            lexeme: lexeme.into(),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip() {
        for text in ["struct", "trait", "impl", "for", "fn", "pub", "mut", "cpp", "type"] {
            let ty = TokenType::keyword_type(text).unwrap();
            assert_eq!(ty.as_str(), text);
        }
    }

    #[test]
    fn self_value_and_self_type_are_distinct() {
        assert_eq!(TokenType::keyword_type("self"), Some(TokenType::KwSelfValue));
        assert_eq!(TokenType::keyword_type("Self"), Some(TokenType::KwSelfType));
    }

    #[test]
    fn primitives_are_not_keywords() {
        assert_eq!(TokenType::keyword_type("int"), None);
        assert_eq!(TokenType::keyword_type("str"), None);
    }
}
