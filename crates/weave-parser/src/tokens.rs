//! Token types produced by the [`lexer`](super::lexer).

use std::fmt;

use winnow::stream::Location;

use crate::span::Span;

/// Token types for the Weave schema language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Keywords
    Schema,
    Type,
    Enum,
    Union,
    Function,

    // Literals
    StringLiteral(String),
    NumberLiteral(f64),
    Identifier(&'src str),

    // Punctuation
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    LeftParen,    // (
    RightParen,   // )
    Bang,         // !
    Comma,        // ,
    Colon,        // :
    Equals,       // =
    Bar,          // |
    At,           // @
    Dollar,       // $

    // Comments
    LineComment(&'src str), // # comment

    // Whitespace
    Whitespace,
    Newline,

    /// End of input. Always the last token of a successful tokenization.
    Eof,
}

impl Token<'_> {
    /// Whitespace, newlines and comments: insignificant between any two tokens.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Newline | Token::LineComment(_)
        )
    }

    /// Keyword text, for keywords accepted in name positions.
    pub fn keyword_text(&self) -> Option<&'static str> {
        match self {
            Token::Schema => Some("schema"),
            Token::Type => Some("type"),
            Token::Enum => Some("enum"),
            Token::Union => Some("union"),
            Token::Function => Some("function"),
            _ => None,
        }
    }
}

/// A token with position information for winnow integration
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl Location for PositionedToken<'_> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Schema => write!(f, "schema"),
            Token::Type => write!(f, "type"),
            Token::Enum => write!(f, "enum"),
            Token::Union => write!(f, "union"),
            Token::Function => write!(f, "function"),

            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::NumberLiteral(n) => write!(f, "{n}"),
            Token::Identifier(name) => write!(f, "{name}"),

            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Bang => write!(f, "!"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Equals => write!(f, "="),
            Token::Bar => write!(f, "|"),
            Token::At => write!(f, "@"),
            Token::Dollar => write!(f, "$"),

            Token::LineComment(comment) => write!(f, "#{comment}"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => write!(f, "\\n"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}
