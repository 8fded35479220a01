//! Concrete parse tree produced by the [`grammar`](super::grammar).
//!
//! Every node is tagged with the [`Rule`] that matched it and keeps its
//! children in source order. Trivia never appear in the tree. Terminals
//! carry the token they matched; absent optional clauses are kept as empty
//! [`Rule::Optional`] nodes so the builder can tell "absent" from "empty".

use std::fmt;

use crate::{span::Span, tokens::Token};

/// Production tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Schema,
    Definition,
    TypeDef,
    EnumDef,
    UnionDef,
    UnionTypeList,
    FunctionDef,
    FunctionDefArgList,
    FieldDef,
    FieldDefArgList,
    FieldDefArg,
    TypeSpec,
    ScalarType,
    ArrayType,
    Declaration,
    ParamList,
    Param,
    Expr,
    Query,
    FieldSel,
    FieldSelArgList,
    FieldSelArg,
    TypeName,
    FieldName,
    ArgName,
    Identifier,
    VarName,
    Constant,
    LiteralNumber,
    LiteralString,

    /// A keyword terminal.
    Keyword,
    /// A punctuation terminal.
    Punct,
    /// `x?`: no children when absent, one when present.
    Optional,
    /// `x*` / `x+`: one child per repetition.
    Repeat,
    /// An anonymous sequence inside a repetition, e.g. `(item ',')`.
    Group,
    /// End of input.
    Eof,
}

impl Rule {
    /// Snake-case production name, as printed in tree dumps.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Schema => "schema",
            Rule::Definition => "def",
            Rule::TypeDef => "type_def",
            Rule::EnumDef => "enum_def",
            Rule::UnionDef => "union_def",
            Rule::UnionTypeList => "union_type_list",
            Rule::FunctionDef => "function_def",
            Rule::FunctionDefArgList => "function_def_arg_list",
            Rule::FieldDef => "field_def",
            Rule::FieldDefArgList => "field_def_arg_list",
            Rule::FieldDefArg => "field_def_arg",
            Rule::TypeSpec => "type_spec",
            Rule::ScalarType => "scalar_type",
            Rule::ArrayType => "array_type",
            Rule::Declaration => "declaration",
            Rule::ParamList => "param_list",
            Rule::Param => "param",
            Rule::Expr => "expr",
            Rule::Query => "query",
            Rule::FieldSel => "field_sel",
            Rule::FieldSelArgList => "field_sel_arg_list",
            Rule::FieldSelArg => "field_sel_arg",
            Rule::TypeName => "type_name",
            Rule::FieldName => "field_name",
            Rule::ArgName => "arg_name",
            Rule::Identifier => "identifier",
            Rule::VarName => "var_name",
            Rule::Constant => "constant",
            Rule::LiteralNumber => "literal_number",
            Rule::LiteralString => "literal_string",
            Rule::Keyword => "keyword",
            Rule::Punct => "punct",
            Rule::Optional => "optional",
            Rule::Repeat => "repeat",
            Rule::Group => "group",
            Rule::Eof => "eof",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of the parse tree. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNode<'src> {
    rule: Rule,
    span: Span,
    token: Option<Token<'src>>,
    children: Vec<ParseNode<'src>>,
}

impl<'src> ParseNode<'src> {
    /// A terminal node for a single matched token.
    pub(crate) fn leaf(rule: Rule, token: Token<'src>, span: Span) -> Self {
        Self {
            rule,
            span,
            token: Some(token),
            children: Vec::new(),
        }
    }

    /// An inner node spanning its non-empty children.
    ///
    /// Nodes that matched no text get the zero-width `fallback` span.
    pub(crate) fn branch(rule: Rule, children: Vec<ParseNode<'src>>, fallback: Span) -> Self {
        let span = children
            .iter()
            .map(ParseNode::span)
            .filter(|span| !span.is_empty())
            .reduce(|acc, span| acc.union(span))
            .unwrap_or(fallback);
        Self {
            rule,
            span,
            token: None,
            children,
        }
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// The matched token, for terminals.
    pub fn token(&self) -> Option<&Token<'src>> {
        self.token.as_ref()
    }

    pub fn children(&self) -> &[ParseNode<'src>] {
        &self.children
    }

    pub(crate) fn into_parts(self) -> (Rule, Span, Option<Token<'src>>, Vec<ParseNode<'src>>) {
        (self.rule, self.span, self.token, self.children)
    }

    /// The source text this node matched.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.slice(source)
    }

    /// Depth-first search for the first node tagged `rule`, including `self`.
    pub fn find(&self, rule: Rule) -> Option<&ParseNode<'src>> {
        if self.rule == rule {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(rule))
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}<{} {}", "", self.rule, self.span, indent = depth * 2)?;
        match &self.token {
            Some(token) => writeln!(f, " `{token}`>")?,
            None => writeln!(f, ">")?,
        }
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Indented dump, one node per line: `<rule start..end `token`>`.
impl fmt::Display for ParseNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
