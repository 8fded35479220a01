//! Abstract syntax tree for Weave schemas and queries.
//!
//! Produced by the [`builder`](super::builder) from a successful parse.
//! Names are interned [`Id`]s wrapped in [`Spanned`] so later phases can
//! point back at the source. `Display` renders the compact debugging form,
//! e.g. `(type name:ID, is_vector:false, is_required:true)`.

use std::fmt;

use weave_core::identifier::Id;

use crate::span::{Span, Spanned};

/// Writes `['a', 'b']`.
fn write_quoted_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "'{item}'")?;
    }
    write!(f, "]")
}

/// Writes `a, b, c`.
fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// A parsed schema document: top-level definitions in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub definitions: Vec<Definition>,
}

impl Schema {
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Type(type_def) => Some(type_def),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Function(function) => Some(function),
            _ => None,
        })
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema: ")?;
        write_quoted_list(f, &self.definitions)
    }
}

/// A top-level definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Type(TypeDef),
    Enum(EnumDef),
    Union(UnionDef),
    Function(FunctionDef),
}

impl Definition {
    pub fn name(&self) -> &Spanned<Id> {
        match self {
            Definition::Type(def) => &def.name,
            Definition::Enum(def) => &def.name,
            Definition::Union(def) => &def.name,
            Definition::Function(def) => &def.name,
        }
    }

    /// The defining keyword.
    pub fn kind(&self) -> &'static str {
        match self {
            Definition::Type(_) => "type",
            Definition::Enum(_) => "enum",
            Definition::Union(_) => "union",
            Definition::Function(_) => "function",
        }
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Type(def) => def.fmt(f),
            Definition::Enum(def) => def.fmt(f),
            Definition::Union(def) => def.fmt(f),
            Definition::Function(def) => def.fmt(f),
        }
    }
}

/// `type Name { field: Type ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: Spanned<Id>,
    pub fields: Vec<FieldDef>,
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(TypeDef name:{}, fields:", self.name)?;
        write_quoted_list(f, &self.fields)?;
        write!(f, ")")
    }
}

/// `enum Name { VALUE ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: Spanned<Id>,
    pub values: Vec<Spanned<Id>>,
}

impl fmt::Display for EnumDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(EnumDef name:{}, values:[", self.name)?;
        write_joined(f, &self.values)?;
        write!(f, "])")
    }
}

/// `union Name = A | B`
#[derive(Debug, Clone, PartialEq)]
pub struct UnionDef {
    pub name: Spanned<Id>,
    pub members: Vec<Spanned<Id>>,
}

impl fmt::Display for UnionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(UnionDef name:{}, members:[", self.name)?;
        write_joined(f, &self.members)?;
        write!(f, "])")
    }
}

/// `function name(arg: Type, ...): ReturnType`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Spanned<Id>,
    pub return_type: TypeSpec,
    pub args: Vec<FieldDefArg>,
}

impl fmt::Display for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(FunctionDef name:{}, return_type:{}, arg_list:",
            self.name, self.return_type
        )?;
        write_quoted_list(f, &self.args)?;
        write!(f, ")")
    }
}

/// A field of a composite type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: Spanned<Id>,
    /// Empty when the field has no argument clause.
    pub args: Vec<FieldDefArg>,
    pub type_spec: TypeSpec,
    pub declaration: Option<Declaration>,
}

impl fmt::Display for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(FieldDef name:{}, type:{}", self.name, self.type_spec)?;
        if !self.args.is_empty() {
            write!(f, ", arg_list:")?;
            write_quoted_list(f, &self.args)?;
        }
        if let Some(declaration) = &self.declaration {
            write!(f, ", declaration:{declaration}")?;
        }
        write!(f, ")")
    }
}

/// A field argument or function parameter: `name: Type = default`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefArg {
    pub name: Spanned<Id>,
    pub type_spec: TypeSpec,
    pub default: Option<Spanned<Literal>>,
}

impl fmt::Display for FieldDefArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(FieldDefArg name:{}, type:{}", self.name, self.type_spec)?;
        if let Some(default) = &self.default {
            write!(f, ", default:{default}")?;
        }
        write!(f, ")")
    }
}

/// A reference to a type, with nullability markers.
///
/// For `[Float!]!` the list itself is required (`is_required`) and so are its
/// items (`is_item_required`). The two flags are independent.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: Spanned<Id>,
    pub is_vector: bool,
    pub is_required: bool,
    /// Always `false` for scalar specs.
    pub is_item_required: bool,
    pub span: Span,
}

impl TypeSpec {
    pub fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(type name:{}, is_vector:{}, is_required:{}",
            self.name, self.is_vector, self.is_required
        )?;
        if self.is_vector {
            write!(f, ", is_item_required:{}", self.is_item_required)?;
        }
        write!(f, ")")
    }
}

/// `@name(param: value, ...)` attached to a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: Spanned<Id>,
    pub params: Vec<Param>,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}(", self.name)?;
        write_joined(f, &self.params)?;
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Spanned<Id>,
    pub value: Spanned<Value>,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// A constant used as an argument default.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "\"{s}\""),
            Literal::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A declaration parameter or query argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    /// `$name`
    Variable(Id),
    /// A bare name such as an enum symbol.
    Identifier(Id),
    /// An embedded query document.
    Query(Query),
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::String(s) => Value::String(s),
            Literal::Number(n) => Value::Number(n),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Number(n) => write!(f, "{n}"),
            Value::Variable(name) => write!(f, "${name}"),
            Value::Identifier(name) => write!(f, "{name}"),
            Value::Query(query) => write!(f, "{query}"),
        }
    }
}

/// `{ field field(arg: value) { nested } ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub selections: Vec<FieldSelection>,
    pub span: Span,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for selection in &self.selections {
            write!(f, " {selection}")?;
        }
        write!(f, " }}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelection {
    pub name: Spanned<Id>,
    pub args: Vec<Argument>,
    pub selection: Option<Query>,
}

impl fmt::Display for FieldSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "(")?;
            write_joined(f, &self.args)?;
            write!(f, ")")?;
        }
        if let Some(selection) = &self.selection {
            write!(f, " {selection}")?;
        }
        Ok(())
    }
}

/// `name: value` inside a field selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Spanned<Id>,
    pub value: Spanned<Value>,
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}
