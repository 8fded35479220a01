//! Human-readable renderings of parsed documents and registries.

use std::fmt;

use weave::{
    ast::{Definition, FieldDefArg, FieldSelection, Query, Schema},
    load::field_type,
    registry::Registry,
    types::TypeKind,
};

const INDENT: &str = "  ";

fn write_args(f: &mut fmt::Formatter<'_>, args: &[FieldDefArg]) -> fmt::Result {
    write!(f, "(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: {}", arg.name, field_type(&arg.type_spec))?;
        if let Some(default) = &arg.default {
            write!(f, " = {default}")?;
        }
    }
    write!(f, ")")
}

/// A schema laid out one definition per block, one field per line.
///
/// ```text
/// type Instrument {
///   id: ID!
///   positions(first: Float = 10): [Position!]!
/// }
/// ```
pub struct SchemaTree<'a>(pub &'a Schema);

impl fmt::Display for SchemaTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for definition in &self.0.definitions {
            match definition {
                Definition::Type(def) => {
                    writeln!(f, "type {} {{", def.name)?;
                    for field in &def.fields {
                        write!(f, "{INDENT}{}", field.name)?;
                        if !field.args.is_empty() {
                            write_args(f, &field.args)?;
                        }
                        write!(f, ": {}", field_type(&field.type_spec))?;
                        if let Some(declaration) = &field.declaration {
                            write!(f, " {declaration}")?;
                        }
                        writeln!(f)?;
                    }
                    writeln!(f, "}}")?;
                }
                Definition::Enum(def) => {
                    writeln!(f, "enum {} {{", def.name)?;
                    for value in &def.values {
                        writeln!(f, "{INDENT}{value}")?;
                    }
                    writeln!(f, "}}")?;
                }
                Definition::Union(def) => {
                    write!(f, "union {} =", def.name)?;
                    for (i, member) in def.members.iter().enumerate() {
                        let separator = if i == 0 { "" } else { " |" };
                        write!(f, "{separator} {member}")?;
                    }
                    writeln!(f)?;
                }
                Definition::Function(def) => {
                    write!(f, "function {}", def.name)?;
                    write_args(f, &def.args)?;
                    writeln!(f, ": {}", field_type(&def.return_type))?;
                }
            }
        }
        Ok(())
    }
}

/// A query with one selection per line, nested selections indented.
pub struct QueryTree<'a>(pub &'a Query);

impl QueryTree<'_> {
    fn write_selections(
        f: &mut fmt::Formatter<'_>,
        selections: &[FieldSelection],
        depth: usize,
    ) -> fmt::Result {
        for selection in selections {
            write!(f, "{}{}", INDENT.repeat(depth), selection.name)?;
            if !selection.args.is_empty() {
                write!(f, "(")?;
                for (i, arg) in selection.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")?;
            }
            match &selection.selection {
                Some(nested) => {
                    writeln!(f, " {{")?;
                    Self::write_selections(f, &nested.selections, depth + 1)?;
                    writeln!(f, "{}}}", INDENT.repeat(depth))?;
                }
                None => writeln!(f)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for QueryTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        Self::write_selections(f, &self.0.selections, 1)?;
        writeln!(f, "}}")
    }
}

/// Every registered type with its kind, and the fields of composites.
pub struct RegistrySummary<'a>(pub &'a Registry);

impl fmt::Display for RegistrySummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Registered types ({}):", self.0.len())?;
        for wtype in self.0.types() {
            match wtype.kind() {
                TypeKind::Composite(composite) => {
                    writeln!(f, "{INDENT}{wtype} (composite)")?;
                    for (name, field) in composite.fields() {
                        writeln!(f, "{INDENT}{INDENT}{name}: {field}")?;
                    }
                }
                TypeKind::Enum { values } => {
                    let values: Vec<String> = values.iter().map(ToString::to_string).collect();
                    writeln!(f, "{INDENT}{wtype} (enum: {})", values.join(", "))?;
                }
                TypeKind::Union { members } => {
                    let members: Vec<String> = members.iter().map(ToString::to_string).collect();
                    writeln!(f, "{INDENT}{wtype} (union: {})", members.join(" | "))?;
                }
                kind => writeln!(f, "{INDENT}{wtype} ({})", kind.name())?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use weave::load::load_schema;

    use super::*;

    #[test]
    fn test_schema_tree() {
        let schema = weave_parser::parse_schema(
            "type Instrument { id: ID! positions(first: Float = 10): [Position!]! }
             enum Scales { BASE TREBLE }
             union Asset = Instrument | Position
             function price(id: ID!): Float",
        )
        .unwrap();

        assert_eq!(
            SchemaTree(&schema).to_string(),
            "type Instrument {\n  id: ID!\n  positions(first: Float = 10): [Position!]!\n}\n\
             enum Scales {\n  BASE\n  TREBLE\n}\n\
             union Asset = Instrument | Position\n\
             function price(id: ID!): Float\n"
        );
    }

    #[test]
    fn test_query_tree() {
        let query = weave_parser::parse_query("{ positions(first: 2) { id } name }").unwrap();

        assert_eq!(
            QueryTree(&query).to_string(),
            "{\n  positions(first: 2) {\n    id\n  }\n  name\n}\n"
        );
    }

    #[test]
    fn test_registry_summary() {
        let schema = weave_parser::parse_schema(
            "type Department { name: String! } enum Scales { BASE TREBLE }",
        )
        .unwrap();
        let mut registry = Registry::new();
        load_schema(&schema, &mut registry).unwrap();

        assert_eq!(
            RegistrySummary(&registry).to_string(),
            "Registered types (4):\n  String (scalar)\n  Float (scalar)\n  \
             Department (composite)\n    name: String!\n  Scales (enum: BASE, TREBLE)\n"
        );
    }
}
