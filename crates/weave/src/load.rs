//! Populating a [`Registry`] from a parsed [`Schema`].

use std::{collections::HashSet, fmt};

use log::{debug, info};

use weave_core::identifier::Id;
use weave_parser::ast::{Definition, EnumDef, Schema, TypeDef, TypeSpec};

use crate::{
    error::ModelError,
    registry::Registry,
    types::{CompositeType, FieldType, TypeKind, WType},
};

/// What [`load_schema`] registered.
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Registered types in definition order.
    pub types: Vec<WType>,
    /// Declared functions. They are not registered.
    pub functions: Vec<Id>,
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} type(s), {} function(s)",
            self.types.len(),
            self.functions.len()
        )
    }
}

/// The field declaration a type spec describes.
pub fn field_type(spec: &TypeSpec) -> FieldType {
    let mut field = if spec.is_vector {
        FieldType::array_of(*spec.name.inner())
    } else {
        FieldType::new(*spec.name.inner())
    };
    if spec.is_required {
        field = field.required();
    }
    if spec.is_item_required {
        field = field.with_required_items();
    }
    field
}

fn check_unique<'a>(names: impl IntoIterator<Item = (Id, &'a str)>) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for (name, qualified) in names {
        if !seen.insert(name) {
            return Err(ModelError::DuplicateDefinition(qualified.to_string()));
        }
    }
    Ok(())
}

fn composite(def: &TypeDef) -> Result<CompositeType, ModelError> {
    let mut composite = CompositeType::new();
    for field in &def.fields {
        let name = *field.name.inner();
        if composite.field(name).is_some() {
            return Err(ModelError::DuplicateDefinition(format!("{}.{}", def.name, name)));
        }
        if !field.args.is_empty() || field.declaration.is_some() {
            debug!(
                type_name = def.name.to_string(),
                field = name.to_string();
                "Field arguments and declarations are not registered"
            );
        }
        composite.add_field(name, field_type(&field.type_spec));
    }
    Ok(composite)
}

fn enumeration(def: &EnumDef) -> Result<TypeKind, ModelError> {
    let mut values = Vec::with_capacity(def.values.len());
    for value in &def.values {
        let value = *value.inner();
        if values.contains(&value) {
            return Err(ModelError::DuplicateDefinition(format!("{}.{}", def.name, value)));
        }
        values.push(value);
    }
    Ok(TypeKind::Enum { values })
}

/// Register every type, enum and union defined in `schema`.
///
/// The document is validated before anything is registered, so a failing
/// load leaves `registry` untouched. Definitions replace registered types
/// of the same name.
///
/// # Errors
///
/// [`ModelError::DuplicateDefinition`] if a name is defined twice in the
/// document, or a type declares a field or value twice.
pub fn load_schema(schema: &Schema, registry: &mut Registry) -> Result<LoadSummary, ModelError> {
    let type_names: Vec<(Id, String)> = schema
        .definitions
        .iter()
        .filter(|def| !matches!(def, Definition::Function(_)))
        .map(|def| (*def.name().inner(), def.name().to_string()))
        .collect();
    check_unique(type_names.iter().map(|(id, name)| (*id, name.as_str())))?;

    let function_names: Vec<(Id, String)> = schema
        .functions()
        .map(|def| (*def.name.inner(), def.name.to_string()))
        .collect();
    check_unique(function_names.iter().map(|(id, name)| (*id, name.as_str())))?;

    let mut kinds = Vec::with_capacity(type_names.len());
    for def in &schema.definitions {
        let kind = match def {
            Definition::Type(def) => TypeKind::Composite(composite(def)?),
            Definition::Enum(def) => enumeration(def)?,
            Definition::Union(def) => TypeKind::Union {
                members: def.members.iter().map(|member| *member.inner()).collect(),
            },
            Definition::Function(_) => continue,
        };
        kinds.push((*def.name().inner(), kind));
    }

    let types = kinds
        .into_iter()
        .map(|(name, kind)| registry.register(name, kind))
        .collect();
    let summary = LoadSummary {
        types,
        functions: function_names.into_iter().map(|(id, _)| id).collect(),
    };
    info!(
        types = summary.types.len(),
        functions = summary.functions.len();
        "Loaded schema"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use weave_parser::parse_schema;

    use super::*;

    fn load(source: &str) -> (Registry, Result<LoadSummary, ModelError>) {
        let schema = parse_schema(source).expect("Failed to parse");
        let mut registry = Registry::new();
        let result = load_schema(&schema, &mut registry);
        (registry, result)
    }

    #[test]
    fn test_field_type_from_spec() {
        let schema = parse_schema("type A { a: ID! b: [Float!] c: [Float]! }").unwrap();
        let Definition::Type(def) = &schema.definitions[0] else {
            panic!("Expected type definition");
        };

        let rendered: Vec<String> = def
            .fields
            .iter()
            .map(|field| field_type(&field.type_spec).to_string())
            .collect();
        assert_eq!(rendered, ["ID!", "[Float!]", "[Float]!"]);
    }

    #[test]
    fn test_load_registers_definitions() {
        let (registry, result) = load(
            "enum Scales { BASE TREBLE }\n\
             union MultiType = Instrument | Position\n\
             type Position { id: ID! }\n\
             function price(env: MarketEnv): Float",
        );
        let summary = result.unwrap();

        let names: Vec<String> = summary.types.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["Scales", "MultiType", "Position"]);
        assert_eq!(summary.functions, [Id::new("price")]);
        assert_eq!(summary.to_string(), "3 type(s), 1 function(s)");

        assert!(matches!(
            registry.lookup("Scales").unwrap().kind(),
            TypeKind::Enum { values } if values.len() == 2
        ));
        assert!(matches!(
            registry.lookup("MultiType").unwrap().kind(),
            TypeKind::Union { .. }
        ));
        assert!(!registry.contains("price"));
    }

    #[test]
    fn test_duplicate_definition_registers_nothing() {
        let (registry, result) = load("type A { x: String }\nenum A { ONE }");

        assert_eq!(
            result.unwrap_err(),
            ModelError::DuplicateDefinition("A".to_string())
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_field() {
        let (registry, result) = load("type B { x: String }\ntype A { x: String x: Float }");

        assert_eq!(
            result.unwrap_err(),
            ModelError::DuplicateDefinition("A.x".to_string())
        );
        assert!(!registry.contains("B"));
    }

    #[test]
    fn test_duplicate_enum_value() {
        let (_, result) = load("enum Scales { BASE BASE }");
        assert_eq!(
            result.unwrap_err(),
            ModelError::DuplicateDefinition("Scales.BASE".to_string())
        );
    }

    #[test]
    fn test_function_may_share_a_type_name() {
        let (_, result) = load("type price { x: Float }\nfunction price(): Float");
        assert!(result.is_ok());
    }
}
