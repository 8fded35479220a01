//! Lexical analyzer for Weave source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for the
//! [`grammar`](super::grammar). Whitespace and `#` comments are kept as
//! trivia tokens; the grammar skips them before every terminal. A successful
//! tokenization always ends with a single [`Token::Eof`].
//!
//! The entry point is [`tokenize`], which recovers from errors and reports
//! every lexical problem in one pass.

use winnow::{
    Parser as _,
    ascii::{digit1, multispace1},
    combinator::{alt, cut_err, delimited, not, opt, peek, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, none_of, one_of, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Diagnostic details attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse `u{XXXX}` after a backslash: 1-6 hex digits naming a valid codepoint.
fn string_escape_unicode(input: &mut Input<'_>, escape_start: usize) -> IResult<char> {
    preceded(
        'u',
        cut_err(
            delimited(
                '{',
                take_while(1..=6, |c: char| c.is_ascii_hexdigit()).context(LexerDiagnostic {
                    code: ErrorCode::E006,
                    message: "empty unicode escape",
                    help: Some("provide 1-6 hex digits: `\\u{1F602}`"),
                    start: escape_start,
                }),
                '}',
            )
            .context(LexerDiagnostic {
                code: ErrorCode::E004,
                message: "invalid unicode escape",
                help: Some("use format `\\u{XXXX}` with 1-6 hex digits"),
                start: escape_start,
            })
            .verify_map(|hex: &str| u32::from_str_radix(hex, 16).ok().and_then(char::from_u32))
            .context(LexerDiagnostic {
                code: ErrorCode::E005,
                message: "invalid unicode codepoint",
                help: Some("valid range: `0x0000`-`0xD7FF` or `0xE000`-`0x10FFFF`"),
                start: escape_start,
            }),
        ),
    )
    .parse_next(input)
}

fn string_escape_char(input: &mut Input<'_>) -> IResult<char> {
    one_of(['n', 'r', 't', 'b', 'f', '\\', '/', '\'', '"', '0'])
        .map(|c| match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            '0' => '\0',
            other => other,
        })
        .parse_next(input)
}

/// Backslash followed by whitespace joins lines; yields a placeholder that
/// [`string_literal`] drops.
fn string_escape_whitespace(input: &mut Input<'_>) -> IResult<char> {
    multispace1.value('\u{E000}').parse_next(input)
}

fn string_escape(input: &mut Input<'_>) -> IResult<char> {
    let escape_start = input.current_token_start();

    '\\'.parse_next(input)?;

    match string_escape_unicode(input, escape_start) {
        Ok(ch) => return Ok(ch),
        Err(ErrMode::Backtrack(_)) => {}
        Err(e) => return Err(e),
    }

    if let Ok(ch) = string_escape_char(input) {
        return Ok(ch);
    }

    if let Ok(ch) = string_escape_whitespace(input) {
        return Ok(ch);
    }

    Err(ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        LexerDiagnostic {
            code: ErrorCode::E003,
            message: "invalid escape sequence",
            help: Some(
                "valid escapes: `\\n`, `\\r`, `\\t`, `\\b`, `\\f`, `\\\\`, `\\/`, `\\'`, `\\\"`, `\\0`, `\\u{}`",
            ),
            start: escape_start,
        },
    )))
}

/// Parse a double-quoted string literal on a single line.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let string_char = none_of(['"', '\\', '\n', '\r']);
    let string_content =
        repeat(0.., alt((string_escape, string_char))).fold(String::new, |mut acc, ch| {
            if ch != '\u{E000}' {
                acc.push(ch);
            }
            acc
        });

    let start_pos = input.current_token_start();

    '"'.parse_next(input)?;

    cut_err(terminated(string_content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"` before the end of the line"),
            start: start_pos,
        })
        .parse_next(input)
        .map(Token::StringLiteral)
}

/// Parse `[0-9]+(\.[0-9]+)?`, not followed by an identifier character.
fn number_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    terminated(
        (digit1, opt(('.', digit1))).take(),
        peek(not(one_of(is_ident_continue))),
    )
    .verify_map(|text: &str| text.parse::<f64>().ok())
    .map(Token::NumberLiteral)
    .parse_next(input)
}

fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded('#', take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

fn keyword<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    terminated(
        alt((
            literal("schema").value(Token::Schema),
            literal("type").value(Token::Type),
            literal("enum").value(Token::Enum),
            literal("union").value(Token::Union),
            literal("function").value(Token::Function),
        )),
        peek(not(one_of(is_ident_continue))),
    )
    .parse_next(input)
}

fn identifier<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_ident_continue),
    )
        .take()
        .map(Token::Identifier)
        .parse_next(input)
}

fn punctuation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        '!'.value(Token::Bang),
        ','.value(Token::Comma),
        ':'.value(Token::Colon),
        '='.value(Token::Equals),
        '|'.value(Token::Bar),
        '@'.value(Token::At),
        '$'.value(Token::Dollar),
    ))
    .parse_next(input)
}

/// Whitespace other than `\n`.
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        line_comment,
        string_literal,
        keyword,        // Must come before identifier
        number_literal, // Must come before identifier
        identifier,
        punctuation,
        newline, // Must come before whitespace
        whitespace,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();

    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            let checkpoint = input.checkpoint();
            match positioned_token(&mut input) {
                Ok(token) => self.tokens.push(token),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    self.diagnostics.emit(Self::convert_err_mode(e, error_pos));
                    input.reset(&checkpoint);
                    Self::recover(&mut input);
                }
            }
        }
    }

    /// Skip past the offending input. A broken string literal is abandoned up
    /// to the end of its line so its closing quote does not open a new one.
    fn recover(input: &mut Input<'a>) {
        let broken_string = input.starts_with('"');
        input.next_token();
        if broken_string {
            let rest = input.find('\n').unwrap_or(input.len());
            input.next_slice(rest);
        }
    }

    fn finish(mut self, end: usize) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.tokens
            .push(PositionedToken::new(Token::Eof, Span::empty_at(end)));
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Build a diagnostic from the first [`LexerDiagnostic`] context, falling
    /// back to E002 (unexpected character).
    fn convert_err_mode(err: ErrMode<ContextError<LexerDiagnostic>>, error_pos: usize) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos);
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Tokenize `input`, collecting every lexical error before failing.
///
/// # Returns
///
/// - `Ok(tokens)` - all tokens, trivia included, terminated by [`Token::Eof`]
/// - `Err(ParseError)` - one diagnostic per lexical error, in source order
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    let tokens = lexer.finish(input.len())?;
    log::trace!(tokens = tokens.len(); "Tokenized source");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_single_token(input: &str, expected: Token<'_>) {
        let mut located_input = LocatingSlice::new(input);
        let result = positioned_token(&mut located_input);
        assert!(result.is_ok(), "Failed to parse: {input}");
        assert_eq!(result.unwrap().token, expected);
    }

    fn significant(input: &str) -> Vec<Token<'_>> {
        tokenize(input)
            .expect("tokenize")
            .into_iter()
            .map(|t| t.token)
            .filter(|t| !t.is_trivia())
            .collect()
    }

    #[test]
    fn test_keywords() {
        test_single_token("schema", Token::Schema);
        test_single_token("type", Token::Type);
        test_single_token("enum", Token::Enum);
        test_single_token("union", Token::Union);
        test_single_token("function", Token::Function);
    }

    #[test]
    fn test_keyword_word_boundaries() {
        test_single_token("types", Token::Identifier("types"));
        test_single_token("enum_value", Token::Identifier("enum_value"));
        test_single_token("functional", Token::Identifier("functional"));
        test_single_token("union2", Token::Identifier("union2"));
        test_single_token("type{", Token::Type);
    }

    #[test]
    fn test_identifiers() {
        test_single_token("Position", Token::Identifier("Position"));
        test_single_token("_private", Token::Identifier("_private"));
        test_single_token("list1", Token::Identifier("list1"));
        test_single_token("ID", Token::Identifier("ID"));
    }

    #[test]
    fn test_punctuation() {
        test_single_token("{", Token::LeftBrace);
        test_single_token("}", Token::RightBrace);
        test_single_token("[", Token::LeftBracket);
        test_single_token("]", Token::RightBracket);
        test_single_token("(", Token::LeftParen);
        test_single_token(")", Token::RightParen);
        test_single_token("!", Token::Bang);
        test_single_token(",", Token::Comma);
        test_single_token(":", Token::Colon);
        test_single_token("=", Token::Equals);
        test_single_token("|", Token::Bar);
        test_single_token("@", Token::At);
        test_single_token("$", Token::Dollar);
    }

    #[test]
    fn test_number_literals() {
        test_single_token("66", Token::NumberLiteral(66.0));
        test_single_token("0", Token::NumberLiteral(0.0));
        test_single_token("2.5", Token::NumberLiteral(2.5));
        test_single_token("10.125", Token::NumberLiteral(10.125));
    }

    #[test]
    fn test_number_without_fraction_digits_stops_at_dot() {
        let result = tokenize("5.");
        assert!(result.is_err(), "a bare `.` is not a token");
    }

    #[test]
    fn test_number_followed_by_letters_is_rejected() {
        let err = tokenize("4abc").unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E002));
    }

    #[test]
    fn test_string_literals() {
        test_single_token("\"henry!\"", Token::StringLiteral("henry!".to_string()));
        test_single_token("\"test%4\"", Token::StringLiteral("test%4".to_string()));
        test_single_token("\"\"", Token::StringLiteral(String::new()));
    }

    #[test]
    fn test_string_escape_sequences() {
        test_single_token(
            "\"quote: \\\"x\\\"\"",
            Token::StringLiteral("quote: \"x\"".to_string()),
        );
        test_single_token("\"a\\tb\"", Token::StringLiteral("a\tb".to_string()));
        test_single_token("\"\\u{41}\"", Token::StringLiteral("A".to_string()));
        test_single_token(
            "\"before\\  \n  after\"",
            Token::StringLiteral("beforeafter".to_string()),
        );
    }

    #[test]
    fn test_comments() {
        test_single_token("# A test schema", Token::LineComment(" A test schema"));
        test_single_token("#", Token::LineComment(""));
    }

    #[test]
    fn test_whitespace() {
        test_single_token(" ", Token::Whitespace);
        test_single_token("\t  ", Token::Whitespace);
        test_single_token("\r", Token::Whitespace);
        test_single_token("\n", Token::Newline);
    }

    #[test]
    fn test_full_lexing() {
        assert_eq!(
            significant("type Position { id: ID! }"),
            vec![
                Token::Type,
                Token::Identifier("Position"),
                Token::LeftBrace,
                Token::Identifier("id"),
                Token::Colon,
                Token::Identifier("ID"),
                Token::Bang,
                Token::RightBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_declaration_tokens() {
        assert_eq!(
            significant("@derived(b: $passed_in)"),
            vec![
                Token::At,
                Token::Identifier("derived"),
                Token::LeftParen,
                Token::Identifier("b"),
                Token::Colon,
                Token::Dollar,
                Token::Identifier("passed_in"),
                Token::RightParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        assert_eq!(
            significant("a # b c\nd"),
            vec![Token::Identifier("a"), Token::Identifier("d"), Token::Eof]
        );
    }

    #[test]
    fn test_span_tracking() {
        let tokens = tokenize("hello world").unwrap();

        assert_eq!(tokens.len(), 4); // "hello", " ", "world", eof
        assert_eq!(tokens[0].span, Span::new(0..5));
        assert_eq!(tokens[1].span, Span::new(5..6));
        assert_eq!(tokens[2].span, Span::new(6..11));
        assert_eq!(tokens[3].span, Span::empty_at(11));
    }

    #[test]
    fn test_empty_input_is_only_eof() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token, Token::Eof);
    }

    mod lexer_error_tests {
        use super::*;

        fn assert_error_codes(input: &str, expected_codes: &[ErrorCode]) {
            let result = tokenize(input);
            assert!(result.is_err(), "Expected lexer to fail on input: '{input}'");
            let parse_error = result.unwrap_err();
            let codes: Vec<_> = parse_error
                .diagnostics()
                .iter()
                .map(|d| d.code())
                .collect();
            let expected: Vec<_> = expected_codes.iter().copied().map(Some).collect();
            assert_eq!(codes, expected, "input: '{input}'");
        }

        #[test]
        fn test_unterminated_string() {
            assert_error_codes("\"unterminated", &[ErrorCode::E001]);
            assert_error_codes("\"", &[ErrorCode::E001]);
        }

        #[test]
        fn test_string_may_not_span_lines() {
            assert_error_codes("\"hello\nworld\"", &[ErrorCode::E001, ErrorCode::E001]);
        }

        #[test]
        fn test_broken_string_does_not_cascade() {
            assert_error_codes("\"test\\x\"", &[ErrorCode::E003]);
            assert_error_codes("\"test\\u{110000}\"", &[ErrorCode::E005]);
            assert_error_codes("\"test\\u{D800}\"", &[ErrorCode::E005]);
            assert_error_codes("\"test\\u{}\"", &[ErrorCode::E006]);
            assert_error_codes("\"test\\u1F602\"", &[ErrorCode::E004]);
        }

        #[test]
        fn test_recovery_resumes_on_next_line() {
            assert_error_codes(
                "\"first\n\"second\n\"third",
                &[ErrorCode::E001, ErrorCode::E001, ErrorCode::E001],
            );
        }

        #[test]
        fn test_unexpected_characters() {
            assert_error_codes(">", &[ErrorCode::E002]);
            assert_error_codes(
                "valid > identifier ; another",
                &[ErrorCode::E002, ErrorCode::E002],
            );
            assert_error_codes("'single'", &[ErrorCode::E002, ErrorCode::E002]);
        }

        #[test]
        fn test_unterminated_string_span() {
            let input = "foo \"hello world\nbar";
            let parse_error = tokenize(input).unwrap_err();
            let span = parse_error.diagnostics()[0].labels()[0].span();

            assert_eq!(span.start(), 4, "span starts at the opening quote");
            assert_eq!(span.end(), 16, "span ends at the newline");
        }

        #[test]
        fn test_unexpected_character_span() {
            let parse_error = tokenize("a ; b").unwrap_err();
            assert_eq!(parse_error.span(), Some(Span::new(2..3)));
        }
    }
}
