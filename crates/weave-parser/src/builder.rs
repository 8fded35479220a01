//! Parse tree to AST transformation.
//!
//! A post-order walk: every node's children are visited first, then the node
//! is turned into a [`Visited`] value by one arm of an exhaustive match on its
//! [`Rule`]. Terminals that carry no meaning become [`Visited::Discard`];
//! generic shapes (`Repeat`, `Group`) pass their children through as
//! [`Visited::List`].
//!
//! Optional clauses surface as `Discard` when absent and as a one-element
//! `List` when present. Every production that owns an optional clause checks
//! that shape explicitly.
//!
//! The grammar guarantees the shape of every node it emits, so a mismatch is
//! a bug in this module or in the grammar and panics immediately.

use weave_core::identifier::Id;

use crate::{
    ast::{
        Argument, Declaration, Definition, EnumDef, FieldDef, FieldDefArg, FieldSelection,
        FunctionDef, Literal, Param, Query, Schema, TypeDef, TypeSpec, UnionDef, Value,
    },
    parse_tree::{ParseNode, Rule},
    span::{Span, Spanned},
    tokens::Token,
};

/// The result of visiting one parse node.
#[derive(Debug)]
enum Visited {
    /// Punctuation, keywords and absent optional clauses.
    Discard,
    List(Vec<Visited>),
    Name(Spanned<Id>),
    Literal(Spanned<Literal>),
    Value(Spanned<Value>),
    TypeSpec(TypeSpec),
    FieldDefArg(FieldDefArg),
    FieldDef(FieldDef),
    Declaration(Declaration),
    Param(Param),
    Definition(Definition),
    Query(Query),
    FieldSelection(FieldSelection),
    Argument(Argument),
    Schema(Schema),
}

#[track_caller]
fn contract_violation(rule: Rule, detail: &str) -> ! {
    panic!("builder contract violation in `{rule}`: {detail}")
}

macro_rules! into_variant {
    ($fn_name:ident, $variant:ident, $ty:ty) => {
        #[track_caller]
        fn $fn_name(self, rule: Rule) -> $ty {
            match self {
                Visited::$variant(value) => value,
                other => contract_violation(
                    rule,
                    &format!("expected {}, found {other:?}", stringify!($variant)),
                ),
            }
        }
    };
}

impl Visited {
    into_variant!(into_list, List, Vec<Visited>);
    into_variant!(into_name, Name, Spanned<Id>);
    into_variant!(into_type_spec, TypeSpec, TypeSpec);
    into_variant!(into_field_def_arg, FieldDefArg, FieldDefArg);
    into_variant!(into_field_def, FieldDef, FieldDef);
    into_variant!(into_declaration, Declaration, Declaration);
    into_variant!(into_param, Param, Param);
    into_variant!(into_definition, Definition, Definition);
    into_variant!(into_query, Query, Query);
    into_variant!(into_field_selection, FieldSelection, FieldSelection);
    into_variant!(into_argument, Argument, Argument);
    into_variant!(into_schema, Schema, Schema);
    into_variant!(into_value, Value, Spanned<Value>);

    /// `Discard` means absent; a one-element `List` means present.
    #[track_caller]
    fn into_optional(self, rule: Rule) -> Option<Visited> {
        match self {
            Visited::Discard => None,
            Visited::List(items) => {
                let [item] = take(rule, items);
                Some(item)
            }
            other => contract_violation(rule, &format!("expected optional, found {other:?}")),
        }
    }

    #[track_caller]
    fn is_present(self, rule: Rule) -> bool {
        self.into_optional(rule).is_some()
    }

    /// A parenthesized list `Group['(', List, ')']` behind an optional clause.
    /// Absent clauses yield an empty list.
    #[track_caller]
    fn into_optional_parenthesized(self, rule: Rule) -> Vec<Visited> {
        match self.into_optional(rule) {
            Some(group) => {
                let [_, list, _] = take(rule, group.into_list(rule));
                list.into_list(rule)
            }
            None => Vec::new(),
        }
    }
}

#[track_caller]
fn take<const N: usize>(rule: Rule, children: Vec<Visited>) -> [Visited; N] {
    let found = children.len();
    children.try_into().unwrap_or_else(|_| {
        contract_violation(rule, &format!("expected {N} children, found {found}"))
    })
}

#[track_caller]
fn leaf_token(rule: Rule, token: Option<Token<'_>>) -> Token<'_> {
    token.unwrap_or_else(|| contract_violation(rule, "terminal without a token"))
}

/// Flatten `rule[Repeat[Group[item, sep]...], item]` into `[item...]`.
fn flatten_separated(rule: Rule, children: Vec<Visited>) -> Vec<Visited> {
    let [prefix, last] = take(rule, children);
    let mut items: Vec<Visited> = prefix
        .into_list(rule)
        .into_iter()
        .map(|group| {
            let [item, _separator] = take(rule, group.into_list(rule));
            item
        })
        .collect();
    items.push(last);
    items
}

/// A node whose children are still being visited.
struct Frame<'src> {
    rule: Rule,
    span: Span,
    token: Option<Token<'src>>,
    pending: std::vec::IntoIter<ParseNode<'src>>,
    visited: Vec<Visited>,
}

impl<'src> Frame<'src> {
    fn new(node: ParseNode<'src>) -> Self {
        let (rule, span, token, children) = node.into_parts();
        Self {
            rule,
            span,
            token,
            visited: Vec::with_capacity(children.len()),
            pending: children.into_iter(),
        }
    }
}

/// Post-order walk over an explicit stack, so nesting depth is bounded by
/// the heap rather than the thread's stack.
fn visit(node: ParseNode<'_>) -> Visited {
    let mut stack = vec![Frame::new(node)];
    while let Some(frame) = stack.last_mut() {
        if let Some(child) = frame.pending.next() {
            stack.push(Frame::new(child));
            continue;
        }
        let Some(Frame {
            rule,
            span,
            token,
            visited,
            ..
        }) = stack.pop()
        else {
            break;
        };
        let value = reduce(rule, span, token, visited);
        match stack.last_mut() {
            Some(parent) => parent.visited.push(value),
            None => return value,
        }
    }
    unreachable!("the walk returns when the root frame is reduced")
}

/// Turn one node into a [`Visited`] value once all its children are done.
fn reduce(rule: Rule, span: Span, token: Option<Token<'_>>, children: Vec<Visited>) -> Visited {
    match rule {
        Rule::Keyword | Rule::Punct | Rule::Eof => Visited::Discard,

        Rule::Optional => {
            if children.is_empty() {
                Visited::Discard
            } else {
                Visited::List(children)
            }
        }
        Rule::Repeat | Rule::Group => Visited::List(children),

        Rule::TypeName | Rule::FieldName | Rule::ArgName | Rule::Identifier => {
            match leaf_token(rule, token) {
                Token::Identifier(text) => Visited::Name(Spanned::new(Id::new(text), span)),
                other => contract_violation(rule, &format!("expected identifier, found {other}")),
            }
        }
        Rule::LiteralNumber => match leaf_token(rule, token) {
            Token::NumberLiteral(n) => Visited::Literal(Spanned::new(Literal::Number(n), span)),
            other => contract_violation(rule, &format!("expected number, found {other}")),
        },
        Rule::LiteralString => match leaf_token(rule, token) {
            Token::StringLiteral(s) => Visited::Literal(Spanned::new(Literal::String(s), span)),
            other => contract_violation(rule, &format!("expected string, found {other}")),
        },

        // Single-child pass-through.
        Rule::Constant | Rule::TypeSpec | Rule::Definition => {
            let [child] = take(rule, children);
            child
        }

        Rule::VarName => {
            let [_, name] = take(rule, children);
            let name = name.into_name(rule);
            Visited::Value(Spanned::new(Value::Variable(*name.inner()), span))
        }
        Rule::Expr => {
            let [child] = take(rule, children);
            let value = match child {
                Visited::Literal(literal) => literal.into_inner().into(),
                Visited::Name(name) => Value::Identifier(name.into_inner()),
                Visited::Value(value) => return Visited::Value(value),
                Visited::Query(query) => Value::Query(query),
                other => contract_violation(rule, &format!("expected value, found {other:?}")),
            };
            Visited::Value(Spanned::new(value, span))
        }

        Rule::ScalarType => {
            let [name, bang] = take(rule, children);
            Visited::TypeSpec(TypeSpec {
                name: name.into_name(rule),
                is_vector: false,
                is_required: bang.is_present(rule),
                is_item_required: false,
                span,
            })
        }
        Rule::ArrayType => {
            let [_, name, item_bang, _, bang] = take(rule, children);
            Visited::TypeSpec(TypeSpec {
                name: name.into_name(rule),
                is_vector: true,
                is_required: bang.is_present(rule),
                is_item_required: item_bang.is_present(rule),
                span,
            })
        }

        Rule::UnionTypeList
        | Rule::FunctionDefArgList
        | Rule::FieldDefArgList
        | Rule::ParamList
        | Rule::FieldSelArgList => Visited::List(flatten_separated(rule, children)),

        Rule::FieldDefArg => {
            let [name, _, type_spec, default] = take(rule, children);
            let default = default.into_optional(rule).map(|group| {
                let [_, literal] = take(rule, group.into_list(rule));
                match literal {
                    Visited::Literal(literal) => literal,
                    other => contract_violation(rule, &format!("expected literal, found {other:?}")),
                }
            });
            Visited::FieldDefArg(FieldDefArg {
                name: name.into_name(rule),
                type_spec: type_spec.into_type_spec(rule),
                default,
            })
        }
        Rule::FieldDef => {
            let [name, args, _, type_spec, declaration] = take(rule, children);
            Visited::FieldDef(FieldDef {
                name: name.into_name(rule),
                args: args
                    .into_optional_parenthesized(rule)
                    .into_iter()
                    .map(|arg| arg.into_field_def_arg(rule))
                    .collect(),
                type_spec: type_spec.into_type_spec(rule),
                declaration: declaration
                    .into_optional(rule)
                    .map(|declaration| declaration.into_declaration(rule)),
            })
        }

        Rule::TypeDef => {
            let [_, name, _, fields, _] = take(rule, children);
            Visited::Definition(Definition::Type(TypeDef {
                name: name.into_name(rule),
                fields: fields
                    .into_list(rule)
                    .into_iter()
                    .map(|field| field.into_field_def(rule))
                    .collect(),
            }))
        }
        Rule::EnumDef => {
            let [_, name, _, values, _] = take(rule, children);
            Visited::Definition(Definition::Enum(EnumDef {
                name: name.into_name(rule),
                values: names(rule, values),
            }))
        }
        Rule::UnionDef => {
            let [_, name, _, members] = take(rule, children);
            Visited::Definition(Definition::Union(UnionDef {
                name: name.into_name(rule),
                members: names(rule, members),
            }))
        }
        Rule::FunctionDef => {
            let [_, name, _, args, _, _, return_type] = take(rule, children);
            // `function f()` and a missing list both mean no parameters.
            let args = match args.into_optional(rule) {
                Some(list) => list
                    .into_list(rule)
                    .into_iter()
                    .map(|arg| arg.into_field_def_arg(rule))
                    .collect(),
                None => Vec::new(),
            };
            Visited::Definition(Definition::Function(FunctionDef {
                name: name.into_name(rule),
                return_type: return_type.into_type_spec(rule),
                args,
            }))
        }

        Rule::Declaration => {
            let [_, name, _, params, _] = take(rule, children);
            let params = match params.into_optional(rule) {
                Some(list) => list
                    .into_list(rule)
                    .into_iter()
                    .map(|param| param.into_param(rule))
                    .collect(),
                None => Vec::new(),
            };
            Visited::Declaration(Declaration {
                name: name.into_name(rule),
                params,
            })
        }
        Rule::Param => {
            let [name, _, value] = take(rule, children);
            Visited::Param(Param {
                name: name.into_name(rule),
                value: value.into_value(rule),
            })
        }

        Rule::Query => {
            let [_, selections, _] = take(rule, children);
            Visited::Query(Query {
                selections: selections
                    .into_list(rule)
                    .into_iter()
                    .map(|selection| selection.into_field_selection(rule))
                    .collect(),
                span,
            })
        }
        Rule::FieldSel => {
            let [name, args, selection] = take(rule, children);
            Visited::FieldSelection(FieldSelection {
                name: name.into_name(rule),
                args: args
                    .into_optional_parenthesized(rule)
                    .into_iter()
                    .map(|arg| arg.into_argument(rule))
                    .collect(),
                selection: selection
                    .into_optional(rule)
                    .map(|query| query.into_query(rule)),
            })
        }
        Rule::FieldSelArg => {
            let [name, _, value] = take(rule, children);
            Visited::Argument(Argument {
                name: name.into_name(rule),
                value: value.into_value(rule),
            })
        }

        Rule::Schema => {
            let [_, definitions, _] = take(rule, children);
            Visited::Schema(Schema {
                definitions: definitions
                    .into_list(rule)
                    .into_iter()
                    .map(|def| def.into_definition(rule))
                    .collect(),
            })
        }
    }
}

fn names(rule: Rule, list: Visited) -> Vec<Spanned<Id>> {
    list.into_list(rule)
        .into_iter()
        .map(|name| name.into_name(rule))
        .collect()
}

/// Build a [`Schema`] from a tree produced by
/// [`parse_schema_tree`](crate::grammar::parse_schema_tree).
///
/// # Panics
///
/// Panics if the tree does not have the shape the grammar produces.
pub fn build_schema(tree: ParseNode<'_>) -> Schema {
    visit(tree).into_schema(Rule::Schema)
}

/// Build a [`Query`] from a tree produced by
/// [`parse_query_tree`](crate::grammar::parse_query_tree).
///
/// # Panics
///
/// Panics if the tree does not have the shape the grammar produces.
pub fn build_query(tree: ParseNode<'_>) -> Query {
    visit(tree).into_query(Rule::Query)
}
