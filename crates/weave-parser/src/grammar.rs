//! PEG grammar for Weave schemas and queries.
//!
//! Transforms the token stream from the [`lexer`](super::lexer) into a
//! [`ParseNode`] tree. Alternations are ordered choices: the first
//! alternative that matches wins, even when a later one would match more.
//! Trivia are skipped before every terminal. Entry points are
//! [`parse_schema_tree`] and [`parse_query_tree`]; both require the whole
//! input to match.
//!
//! ```text
//! schema          := ('schema' '{' def* '}' | def*) EOF
//! def             := type_def / enum_def / union_def / function_def
//! type_def        := 'type' type_name '{' field_def+ '}'
//! enum_def        := 'enum' type_name '{' field_name+ '}'
//! union_def       := 'union' type_name '=' (type_name '|')* type_name
//! function_def    := 'function' field_name '(' arg_list? ')' ':' type_spec
//! field_def       := field_name ('(' arg_list ')')? ':' type_spec declaration?
//! arg_list        := (field_def_arg ',')* field_def_arg
//! field_def_arg   := arg_name ':' type_spec ('=' constant)?
//! type_spec       := array_type / scalar_type
//! array_type      := '[' type_name '!'? ']' '!'?
//! scalar_type     := type_name '!'?
//! declaration     := '@' identifier '(' param_list? ')'
//! param_list      := (param ',')* param
//! param           := identifier ':' expr
//! expr            := query / identifier / literal_number / literal_string / var_name
//! query           := '{' field_sel+ '}'
//! field_sel       := field_name ('(' sel_arg_list ')')? query?
//! sel_arg_list    := (field_sel_arg ',')* field_sel_arg
//! field_sel_arg   := arg_name ':' (constant / var_name / identifier)
//! var_name        := '$' arg_name
//! constant        := literal_string / literal_number
//! ```
//!
//! Names accept keywords, so `type: String` declares a field called `type`.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, opt, repeat, terminated},
    error::{AddContext, ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    error::{Diagnostic, ErrorCode},
    parse_tree::{ParseNode, Rule},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Context attached to grammar errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// What the failing terminal or alternation expected.
    Expected(&'static str),
    /// The production that committed before failing.
    Production(&'static str),
    /// Span of the first significant token that did not match.
    Found(Span),
}

type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;
type IResult<O> = Result<O, ErrMode<ContextError<Context>>>;

fn ws_comment(input: &mut Input<'_>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| token.token.is_trivia())
        .void()
        .parse_next(input)
}

fn ws_comments0(input: &mut Input<'_>) -> IResult<()> {
    repeat(0.., ws_comment).parse_next(input)
}

/// Span of the next significant token. The trailing `Eof` guarantees one exists.
fn peek_span(input: &Input<'_>) -> Span {
    input
        .iter_offsets()
        .map(|(_, token)| token)
        .find(|token| !token.token.is_trivia())
        .map_or_else(Span::default, |token| token.span)
}

fn expected_error(input: &Input<'_>, label: &'static str) -> ContextError<Context> {
    let checkpoint = input.checkpoint();
    ContextError::new()
        .add_context(input, &checkpoint, Context::Found(peek_span(input)))
        .add_context(input, &checkpoint, Context::Expected(label))
}

/// Run `f` after skipping trivia; a backtrack is reported as "expected `label`"
/// at the next significant token.
fn expect<'src, O>(
    input: &mut Input<'src>,
    label: &'static str,
    mut f: impl FnMut(&mut Input<'src>) -> IResult<O>,
) -> IResult<O> {
    ws_comments0(input)?;
    let start = input.checkpoint();
    match f(input) {
        Err(ErrMode::Backtrack(_)) => {
            input.reset(&start);
            Err(ErrMode::Backtrack(expected_error(input, label)))
        }
        result => result,
    }
}

/// Match one significant token; `accept` maps it to the token stored in the leaf.
fn terminal<'src>(
    input: &mut Input<'src>,
    rule: Rule,
    label: &'static str,
    accept: impl Fn(&Token<'src>) -> Option<Token<'src>>,
) -> IResult<ParseNode<'src>> {
    expect(input, label, |input| {
        any.verify_map(|token: &PositionedToken<'src>| {
            accept(&token.token).map(|matched| ParseNode::leaf(rule, matched, token.span))
        })
        .parse_next(input)
    })
}

fn punct<'src>(
    input: &mut Input<'src>,
    expected: Token<'static>,
    label: &'static str,
) -> IResult<ParseNode<'src>> {
    terminal(input, Rule::Punct, label, |token| {
        (*token == expected).then(|| token.clone())
    })
}

fn keyword<'src>(
    input: &mut Input<'src>,
    expected: Token<'static>,
    label: &'static str,
) -> IResult<ParseNode<'src>> {
    terminal(input, Rule::Keyword, label, |token| {
        (*token == expected).then(|| token.clone())
    })
}

/// A name in any position. Keywords are accepted and stored as identifiers.
fn name<'src>(input: &mut Input<'src>, rule: Rule, label: &'static str) -> IResult<ParseNode<'src>> {
    terminal(input, rule, label, |token| match token {
        Token::Identifier(text) => Some(Token::Identifier(*text)),
        other => other.keyword_text().map(Token::Identifier),
    })
}

fn type_name<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    name(input, Rule::TypeName, "type name")
}

fn field_name<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    name(input, Rule::FieldName, "field name")
}

fn arg_name<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    name(input, Rule::ArgName, "argument name")
}

fn identifier<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    name(input, Rule::Identifier, "identifier")
}

fn literal_number<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    terminal(input, Rule::LiteralNumber, "number", |token| {
        matches!(token, Token::NumberLiteral(_)).then(|| token.clone())
    })
}

fn literal_string<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    terminal(input, Rule::LiteralString, "string", |token| {
        matches!(token, Token::StringLiteral(_)).then(|| token.clone())
    })
}

fn bang<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    punct(input, Token::Bang, "`!`")
}

fn end_of_input<'src>(input: &mut Input<'src>, label: &'static str) -> IResult<ParseNode<'src>> {
    terminal(input, Rule::Eof, label, |token| {
        matches!(token, Token::Eof).then_some(Token::Eof)
    })
}

/// `x?`: an [`Rule::Optional`] node with zero or one child.
fn optional<'src>(
    input: &mut Input<'src>,
    f: impl FnMut(&mut Input<'src>) -> IResult<ParseNode<'src>>,
) -> IResult<ParseNode<'src>> {
    let fallback = Span::empty_at(peek_span(input).start());
    let child = opt(f).parse_next(input)?;
    Ok(ParseNode::branch(
        Rule::Optional,
        child.into_iter().collect(),
        fallback,
    ))
}

/// `x*` (`min == 0`) or `x+` (`min == 1`): a [`Rule::Repeat`] node.
fn repeated<'src>(
    input: &mut Input<'src>,
    min: usize,
    f: impl FnMut(&mut Input<'src>) -> IResult<ParseNode<'src>>,
) -> IResult<ParseNode<'src>> {
    let fallback = Span::empty_at(peek_span(input).start());
    let children: Vec<ParseNode<'src>> = repeat(min.., f).parse_next(input)?;
    Ok(ParseNode::branch(Rule::Repeat, children, fallback))
}

fn group(children: Vec<ParseNode<'_>>) -> ParseNode<'_> {
    ParseNode::branch(Rule::Group, children, Span::default())
}

/// `(item sep)* item` as `rule[Repeat[Group[item, sep]...], item]`.
///
/// An item is required after a separator.
fn separated_list<'src>(
    input: &mut Input<'src>,
    rule: Rule,
    item: fn(&mut Input<'src>) -> IResult<ParseNode<'src>>,
    sep: Token<'static>,
    sep_label: &'static str,
) -> IResult<ParseNode<'src>> {
    let prefix = repeated(input, 0, |input: &mut Input<'src>| {
        let node = item(input)?;
        let sep = punct(input, sep.clone(), sep_label)?;
        Ok(group(vec![node, sep]))
    })?;
    let last = if prefix.children().is_empty() {
        item(input)?
    } else {
        cut_err(item).parse_next(input)?
    };
    Ok(ParseNode::branch(rule, vec![prefix, last], Span::default()))
}

/// Everything after a commit point. Backtracks become hard errors tagged with
/// the production name.
fn committed<'src, const N: usize>(
    input: &mut Input<'src>,
    production: &'static str,
    f: impl FnMut(&mut Input<'src>) -> IResult<[ParseNode<'src>; N]>,
) -> IResult<[ParseNode<'src>; N]> {
    cut_err(f)
        .context(Context::Production(production))
        .parse_next(input)
}

fn node<'src, const N: usize>(
    rule: Rule,
    first: ParseNode<'src>,
    rest: [ParseNode<'src>; N],
) -> ParseNode<'src> {
    let mut children = Vec::with_capacity(N + 1);
    children.push(first);
    children.extend(rest);
    ParseNode::branch(rule, children, Span::default())
}

// ---------------------------------------------------------------------------
// Schema language
// ---------------------------------------------------------------------------

/// `schema[Optional[Group['schema', '{']], Repeat[def*], Optional['}']]`
fn schema<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let envelope = optional(input, |input: &mut Input<'src>| {
        let kw = keyword(input, Token::Schema, "`schema`")?;
        let [open] = committed(input, "schema block", |input: &mut Input<'src>| {
            Ok([punct(input, Token::LeftBrace, "`{`")?])
        })?;
        Ok(group(vec![kw, open]))
    })?;

    let definitions = repeated(input, 0, definition)?;

    let close = if envelope.children().is_empty() {
        ParseNode::branch(
            Rule::Optional,
            Vec::new(),
            Span::empty_at(peek_span(input).start()),
        )
    } else {
        let close = punct(input, Token::RightBrace, "definition or `}`")?;
        ParseNode::branch(Rule::Optional, vec![close], Span::default())
    };

    Ok(ParseNode::branch(
        Rule::Schema,
        vec![envelope, definitions, close],
        Span::default(),
    ))
}

/// `def[type_def | enum_def | union_def | function_def]`
fn definition<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let def = expect(input, "definition", |input| {
        alt((type_def, enum_def, union_def, function_def)).parse_next(input)
    })?;
    Ok(ParseNode::branch(Rule::Definition, vec![def], Span::default()))
}

/// `type_def['type', type_name, '{', Repeat[field_def+], '}']`
fn type_def<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let kw = keyword(input, Token::Type, "`type`")?;
    let rest = committed(input, "type definition", |input: &mut Input<'src>| {
        Ok([
            type_name(input)?,
            punct(input, Token::LeftBrace, "`{`")?,
            repeated(input, 1, field_def)?,
            punct(input, Token::RightBrace, "field or `}`")?,
        ])
    })?;
    Ok(node(Rule::TypeDef, kw, rest))
}

/// `enum_def['enum', type_name, '{', Repeat[field_name+], '}']`
fn enum_def<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let kw = keyword(input, Token::Enum, "`enum`")?;
    let rest = committed(input, "enum definition", |input: &mut Input<'src>| {
        Ok([
            type_name(input)?,
            punct(input, Token::LeftBrace, "`{`")?,
            repeated(input, 1, |input: &mut Input<'src>| {
                name(input, Rule::FieldName, "enum value")
            })?,
            punct(input, Token::RightBrace, "enum value or `}`")?,
        ])
    })?;
    Ok(node(Rule::EnumDef, kw, rest))
}

/// `union_def['union', type_name, '=', union_type_list]`
fn union_def<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let kw = keyword(input, Token::Union, "`union`")?;
    let rest = committed(input, "union definition", |input: &mut Input<'src>| {
        Ok([
            type_name(input)?,
            punct(input, Token::Equals, "`=`")?,
            separated_list(input, Rule::UnionTypeList, type_name, Token::Bar, "`|`")?,
        ])
    })?;
    Ok(node(Rule::UnionDef, kw, rest))
}

/// `function_def['function', field_name, '(', Optional[arg_list], ')', ':', type_spec]`
fn function_def<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let kw = keyword(input, Token::Function, "`function`")?;
    let rest = committed(input, "function definition", |input: &mut Input<'src>| {
        Ok([
            field_name(input)?,
            punct(input, Token::LeftParen, "`(`")?,
            optional(input, |input: &mut Input<'src>| {
                separated_list(
                    input,
                    Rule::FunctionDefArgList,
                    field_def_arg,
                    Token::Comma,
                    "`,`",
                )
            })?,
            punct(input, Token::RightParen, "`,` or `)`")?,
            punct(input, Token::Colon, "`:`")?,
            type_spec(input)?,
        ])
    })?;
    Ok(node(Rule::FunctionDef, kw, rest))
}

/// `field_def[field_name, Optional[Group['(', arg_list, ')']], ':', type_spec, Optional[declaration]]`
fn field_def<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let name = field_name(input)?;
    let rest = committed(input, "field definition", |input: &mut Input<'src>| {
        Ok([
            optional(input, field_def_args)?,
            punct(input, Token::Colon, "`:`")?,
            type_spec(input)?,
            optional(input, declaration)?,
        ])
    })?;
    Ok(node(Rule::FieldDef, name, rest))
}

fn field_def_args<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let open = punct(input, Token::LeftParen, "`(`")?;
    let [list, close] = committed(input, "field arguments", |input: &mut Input<'src>| {
        Ok([
            separated_list(input, Rule::FieldDefArgList, field_def_arg, Token::Comma, "`,`")?,
            punct(input, Token::RightParen, "`,` or `)`")?,
        ])
    })?;
    Ok(group(vec![open, list, close]))
}

/// `field_def_arg[arg_name, ':', type_spec, Optional[Group['=', constant]]]`
fn field_def_arg<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let name = arg_name(input)?;
    let rest = committed(input, "argument definition", |input: &mut Input<'src>| {
        Ok([
            punct(input, Token::Colon, "`:`")?,
            type_spec(input)?,
            optional(input, default_value)?,
        ])
    })?;
    Ok(node(Rule::FieldDefArg, name, rest))
}

fn default_value<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let equals = punct(input, Token::Equals, "`=`")?;
    let [value] = committed(input, "default value", |input: &mut Input<'src>| {
        Ok([constant(input)?])
    })?;
    Ok(group(vec![equals, value]))
}

/// `type_spec[array_type | scalar_type]`
fn type_spec<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let spec = expect(input, "type", |input| {
        alt((array_type, scalar_type)).parse_next(input)
    })?;
    Ok(ParseNode::branch(Rule::TypeSpec, vec![spec], Span::default()))
}

/// `array_type['[', type_name, Optional['!'], ']', Optional['!']]`
fn array_type<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let open = punct(input, Token::LeftBracket, "`[`")?;
    let rest = committed(input, "array type", |input: &mut Input<'src>| {
        Ok([
            type_name(input)?,
            optional(input, bang)?,
            punct(input, Token::RightBracket, "`]`")?,
            optional(input, bang)?,
        ])
    })?;
    Ok(node(Rule::ArrayType, open, rest))
}

/// `scalar_type[type_name, Optional['!']]`
fn scalar_type<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let name = type_name(input)?;
    let bang = optional(input, bang)?;
    Ok(ParseNode::branch(
        Rule::ScalarType,
        vec![name, bang],
        Span::default(),
    ))
}

/// `declaration['@', identifier, '(', Optional[param_list], ')']`
fn declaration<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let at = punct(input, Token::At, "`@`")?;
    let rest = committed(input, "declaration", |input: &mut Input<'src>| {
        Ok([
            identifier(input)?,
            punct(input, Token::LeftParen, "`(`")?,
            optional(input, |input: &mut Input<'src>| {
                separated_list(input, Rule::ParamList, param, Token::Comma, "`,`")
            })?,
            punct(input, Token::RightParen, "`,` or `)`")?,
        ])
    })?;
    Ok(node(Rule::Declaration, at, rest))
}

/// `param[identifier, ':', expr]`
fn param<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let name = identifier(input)?;
    let rest = committed(input, "declaration parameter", |input: &mut Input<'src>| {
        Ok([punct(input, Token::Colon, "`:`")?, expr(input)?])
    })?;
    Ok(node(Rule::Param, name, rest))
}

/// `expr[query | identifier | literal_number | literal_string | var_name]`
fn expr<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let value = expect(input, "parameter value", |input| {
        alt((query, identifier, literal_number, literal_string, var_name)).parse_next(input)
    })?;
    Ok(ParseNode::branch(Rule::Expr, vec![value], Span::default()))
}

/// `constant[literal_string | literal_number]`
fn constant<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let value = expect(input, "string or number", |input| {
        alt((literal_string, literal_number)).parse_next(input)
    })?;
    Ok(ParseNode::branch(Rule::Constant, vec![value], Span::default()))
}

/// `var_name['$', arg_name]`
fn var_name<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let dollar = punct(input, Token::Dollar, "`$`")?;
    let rest = committed(input, "variable", |input: &mut Input<'src>| {
        Ok([arg_name(input)?])
    })?;
    Ok(node(Rule::VarName, dollar, rest))
}

// ---------------------------------------------------------------------------
// Query language
// ---------------------------------------------------------------------------

/// A `{` whose selections are still being read.
struct OpenQuery<'src> {
    open: ParseNode<'src>,
    fallback: Span,
    selections: Vec<ParseNode<'src>>,
}

impl<'src> OpenQuery<'src> {
    fn new(input: &Input<'src>, open: ParseNode<'src>) -> Self {
        Self {
            open,
            fallback: Span::empty_at(peek_span(input).start()),
            selections: Vec::new(),
        }
    }

    fn close(self, close: ParseNode<'src>) -> ParseNode<'src> {
        let selections = ParseNode::branch(Rule::Repeat, self.selections, self.fallback);
        node(Rule::Query, self.open, [selections, close])
    }
}

/// `query['{', Repeat[field_sel+], '}']`
fn query<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let open = punct(input, Token::LeftBrace, "`{`")?;
    cut_err(|input: &mut Input<'src>| query_body(input, open.clone()))
        .context(Context::Production("query"))
        .parse_next(input)
}

/// Selections up to the matching `}`. Nested queries are kept on an explicit
/// stack of open braces, so nesting depth does not grow the call stack.
fn query_body<'src>(input: &mut Input<'src>, open: ParseNode<'src>) -> IResult<ParseNode<'src>> {
    let mut current = OpenQuery::new(input, open);
    // Enclosing queries, each with the field name and arguments that opened
    // the query above it.
    let mut parents: Vec<(OpenQuery<'src>, ParseNode<'src>, ParseNode<'src>)> = Vec::new();

    loop {
        match field_name(input) {
            Ok(name) => {
                let args = optional(input, field_sel_args)?;
                let fallback = Span::empty_at(peek_span(input).start());
                let brace = opt(|input: &mut Input<'src>| punct(input, Token::LeftBrace, "`{`"))
                    .parse_next(input)?;
                match brace {
                    Some(open) => {
                        let nested = OpenQuery::new(input, open);
                        parents.push((std::mem::replace(&mut current, nested), name, args));
                    }
                    None => {
                        let absent = ParseNode::branch(Rule::Optional, Vec::new(), fallback);
                        current.selections.push(field_sel(name, args, absent));
                    }
                }
            }
            Err(ErrMode::Backtrack(err)) if current.selections.is_empty() => {
                return Err(ErrMode::Backtrack(err));
            }
            Err(ErrMode::Backtrack(_)) => {
                let close = punct(input, Token::RightBrace, "field or `}`")?;
                let query = current.close(close);
                match parents.pop() {
                    Some((parent, name, args)) => {
                        current = parent;
                        let selection =
                            ParseNode::branch(Rule::Optional, vec![query], Span::default());
                        current.selections.push(field_sel(name, args, selection));
                    }
                    None => return Ok(query),
                }
            }
            Err(err) => return Err(err),
        }
    }
}

/// `field_sel[field_name, Optional[Group['(', sel_arg_list, ')']], Optional[query]]`
fn field_sel<'src>(
    name: ParseNode<'src>,
    args: ParseNode<'src>,
    selection: ParseNode<'src>,
) -> ParseNode<'src> {
    ParseNode::branch(Rule::FieldSel, vec![name, args, selection], Span::default())
}

fn field_sel_args<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let open = punct(input, Token::LeftParen, "`(`")?;
    let [list, close] = committed(input, "field arguments", |input: &mut Input<'src>| {
        Ok([
            separated_list(input, Rule::FieldSelArgList, field_sel_arg, Token::Comma, "`,`")?,
            punct(input, Token::RightParen, "`,` or `)`")?,
        ])
    })?;
    Ok(group(vec![open, list, close]))
}

/// `field_sel_arg[arg_name, ':', expr[constant | var_name | identifier]]`
fn field_sel_arg<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let name = arg_name(input)?;
    let rest = committed(input, "argument", |input: &mut Input<'src>| {
        Ok([punct(input, Token::Colon, "`:`")?, argument_value(input)?])
    })?;
    Ok(node(Rule::FieldSelArg, name, rest))
}

fn argument_value<'src>(input: &mut Input<'src>) -> IResult<ParseNode<'src>> {
    let value = expect(input, "argument value", |input| {
        alt((constant, var_name, identifier)).parse_next(input)
    })?;
    Ok(ParseNode::branch(Rule::Expr, vec![value], Span::default()))
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Turn a grammar failure into a diagnostic located at the first token that
/// did not match.
fn convert_error(error: ErrMode<ContextError<Context>>, tokens: &[PositionedToken<'_>]) -> Diagnostic {
    let context = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    let expected = context.context().find_map(|ctx| match ctx {
        Context::Expected(label) => Some(*label),
        _ => None,
    });
    let production = context.context().find_map(|ctx| match ctx {
        Context::Production(name) => Some(*name),
        _ => None,
    });
    let found_span = context
        .context()
        .find_map(|ctx| match ctx {
            Context::Found(span) => Some(*span),
            _ => None,
        })
        .or_else(|| tokens.last().map(|token| token.span))
        .unwrap_or_default();
    let found = tokens
        .iter()
        .find(|token| token.span == found_span && !token.token.is_trivia())
        .map(|token| &token.token);

    let expected = expected.unwrap_or("valid syntax");
    let diagnostic = match found {
        Some(Token::Eof) | None => Diagnostic::error(format!(
            "incomplete input: expected {expected}"
        ))
        .with_code(ErrorCode::E101)
        .with_label(found_span, "input ends here"),
        Some(token) => Diagnostic::error(format!("expected {expected}, found `{token}`"))
            .with_code(ErrorCode::E100)
            .with_label(found_span, "unexpected token"),
    };

    match production {
        Some(production) => diagnostic.with_help(format!("while parsing {production}")),
        None => diagnostic,
    }
}

fn parse_all<'src>(
    tokens: &'src [PositionedToken<'src>],
    root: fn(&mut Input<'src>) -> IResult<ParseNode<'src>>,
    eof_label: &'static str,
) -> Result<ParseNode<'src>, Diagnostic> {
    let mut input = TokenSlice::new(tokens);
    terminated(root, |input: &mut Input<'src>| end_of_input(input, eof_label))
        .parse_next(&mut input)
        .map_err(|error| convert_error(error, tokens))
}

/// Parse a complete schema document.
pub fn parse_schema_tree<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<ParseNode<'src>, Diagnostic> {
    parse_all(tokens, schema, "definition or end of input")
}

/// Parse a complete query document: a single `{ ... }` selection.
pub fn parse_query_tree<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<ParseNode<'src>, Diagnostic> {
    parse_all(tokens, query, "end of input")
}
