//! The type registry.
//!
//! A [`Registry`] maps type names to [`WType`] handles. It starts with the
//! built-in scalars `String` and `Float`, grows through [`Registry::register`]
//! and derives array types on demand. Nothing is ever removed; registering a
//! name again replaces the previous type.

use std::{cell::RefCell, collections::HashMap, fmt};

use indexmap::IndexMap;
use log::{debug, trace};

use weave_core::identifier::Id;

use crate::{
    error::ModelError,
    object::{ArrayObject, CompositeObject, ScalarObject, WObject},
    types::{TypeKind, WType},
};

/// Name of the built-in string scalar.
pub const STRING: &str = "String";

/// Name of the built-in floating point scalar.
pub const FLOAT: &str = "Float";

/// A composite field whose type is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub type_name: Id,
    pub field: Id,
    pub target: Id,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field `{}.{}` refers to unknown type `{}`",
            self.type_name, self.field, self.target
        )
    }
}

/// Table of known types, keyed by name.
///
/// Array types are memoized per element name behind interior mutability so
/// lookups and object creation only need a shared borrow.
///
/// # Examples
///
/// ```
/// use weave::registry::Registry;
///
/// let registry = Registry::new();
/// let a = registry.array_of("Float").unwrap();
/// let b = registry.array_of("Float").unwrap();
///
/// assert!(a.same(&b));
/// assert_eq!(a.to_string(), "array of Float");
/// ```
#[derive(Debug)]
pub struct Registry {
    types: IndexMap<Id, WType>,
    arrays: RefCell<HashMap<Id, WType>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry holding the built-in scalars.
    pub fn new() -> Self {
        let mut registry = Self {
            types: IndexMap::new(),
            arrays: RefCell::new(HashMap::new()),
        };
        registry.register(STRING, TypeKind::Scalar);
        registry.register(FLOAT, TypeKind::Scalar);
        registry
    }

    /// A registry holding the built-in scalars plus `scalars`.
    pub fn with_scalars<I, S>(scalars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in scalars {
            registry.register(name.as_ref(), TypeKind::Scalar);
        }
        registry
    }

    /// Register a type under `name` and return its handle.
    ///
    /// Registering an identical type again returns the existing handle.
    /// A different type replaces the old one; handles to the old type stay
    /// valid but no longer match anything looked up by name.
    pub fn register(&mut self, name: impl Into<Id>, kind: TypeKind) -> WType {
        let name = name.into();
        if let Some(existing) = self.types.get(&name) {
            if *existing.kind() == kind {
                trace!(name = name.to_string(); "Type already registered");
                return existing.clone();
            }
            debug!(name = name.to_string(); "Replacing registered type");
            self.arrays.get_mut().remove(&name);
        }

        let wtype = WType::new(name, kind);
        debug!(
            name = name.to_string(),
            kind = wtype.kind().name(),
            id = wtype.id().to_string();
            "Registered type"
        );
        self.types.insert(name, wtype.clone());
        wtype
    }

    /// Find a registered type.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownType`] if nothing is registered under `name`.
    pub fn lookup(&self, name: impl Into<Id>) -> Result<WType, ModelError> {
        let name = name.into();
        self.types
            .get(&name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: impl Into<Id>) -> bool {
        self.types.contains_key(&name.into())
    }

    /// The array type whose items are `name`, created on first request.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownType`] if the element type is not registered.
    pub fn array_of(&self, name: impl Into<Id>) -> Result<WType, ModelError> {
        let name = name.into();
        let items = self.lookup(name)?;

        if let Some(array) = self.arrays.borrow().get(&name) {
            return Ok(array.clone());
        }

        let array_name = Id::new(&format!("array of {name}"));
        let array = WType::new(array_name, TypeKind::Array { items });
        debug!(items = name.to_string(), id = array.id().to_string(); "Derived array type");
        self.arrays.borrow_mut().insert(name, array.clone());
        Ok(array)
    }

    /// Registered types in registration order. Derived array types are not listed.
    pub fn types(&self) -> impl Iterator<Item = &WType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Composite fields that name a type nobody registered.
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        let mut unresolved = Vec::new();
        for wtype in self.types.values() {
            let Some(composite) = wtype.as_composite() else {
                continue;
            };
            for (field, field_type) in composite.fields() {
                if !self.types.contains_key(&field_type.type_name()) {
                    unresolved.push(UnresolvedReference {
                        type_name: wtype.name(),
                        field,
                        target: field_type.type_name(),
                    });
                }
            }
        }
        unresolved
    }

    /// Create an object of the named type.
    ///
    /// Scalars produce a [`ScalarObject`] without a value and composites a
    /// [`CompositeObject`] with no fields set.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownType`] for an unregistered name and
    /// [`ModelError::UnsupportedType`] for any other kind of type.
    pub fn create(&self, name: impl Into<Id>) -> Result<WObject, ModelError> {
        let wtype = self.lookup(name)?;
        let object = match wtype.kind() {
            TypeKind::Scalar => WObject::Scalar(ScalarObject::new(wtype)),
            TypeKind::Composite(_) => WObject::Composite(CompositeObject::new(wtype)),
            _ => return Err(ModelError::UnsupportedType(wtype.name().to_string())),
        };
        trace!(type_name = object.wtype().name().to_string(); "Created object");
        Ok(object)
    }

    /// Create an empty array whose items are the named type.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownType`] if the element type is not registered.
    pub fn create_array(&self, name: impl Into<Id>) -> Result<WObject, ModelError> {
        let array_type = self.array_of(name)?;
        Ok(WObject::Array(ArrayObject::new(array_type)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompositeType, FieldType};

    #[test]
    fn test_builtin_scalars() {
        let registry = Registry::new();

        assert_eq!(registry.len(), 2);
        assert!(matches!(registry.lookup(STRING).unwrap().kind(), TypeKind::Scalar));
        assert!(matches!(registry.lookup(FLOAT).unwrap().kind(), TypeKind::Scalar));
    }

    #[test]
    fn test_with_scalars() {
        let registry = Registry::with_scalars(["ID", "Int"]);

        assert_eq!(registry.len(), 4);
        assert!(registry.contains("ID"));
        assert!(registry.contains("Int"));
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = Registry::new();

        assert_eq!(
            registry.lookup("DoesNotExist"),
            Err(ModelError::UnknownType("DoesNotExist".to_string()))
        );
        assert_eq!(
            registry.array_of("DoesNotExist"),
            Err(ModelError::UnknownType("DoesNotExist".to_string()))
        );
        assert_eq!(registry.len(), 2);
        assert!(registry.arrays.borrow().is_empty());
    }

    #[test]
    fn test_identical_registration_is_idempotent() {
        let mut registry = Registry::new();
        let composite = CompositeType::new().with_field("name", FieldType::new(STRING));

        let first = registry.register("Department", TypeKind::Composite(composite.clone()));
        let second = registry.register("Department", TypeKind::Composite(composite));

        assert!(first.same(&second));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_overwrite_replaces_type_and_array() {
        let mut registry = Registry::new();
        let first = registry.register("Person", TypeKind::Composite(CompositeType::new()));
        let first_array = registry.array_of("Person").unwrap();

        let composite = CompositeType::new().with_field("age", FieldType::new(FLOAT));
        let second = registry.register("Person", TypeKind::Composite(composite));
        let second_array = registry.array_of("Person").unwrap();

        assert!(!first.same(&second));
        assert!(registry.lookup("Person").unwrap().same(&second));
        assert!(!first_array.same(&second_array));
        assert!(second_array.items().unwrap().same(&second));
    }

    #[test]
    fn test_array_memoization() {
        let mut registry = Registry::new();
        registry.register("Person", TypeKind::Composite(CompositeType::new()));

        let a = registry.array_of("Person").unwrap();
        let b = registry.array_of("Person").unwrap();

        assert!(a.same(&b));
        assert_eq!(a.name(), "array of Person");
        assert!(!registry.contains("array of Person"));
    }

    #[test]
    fn test_unresolved_references() {
        let mut registry = Registry::new();
        let composite = CompositeType::new()
            .with_field("id", FieldType::new("ID").required())
            .with_field("name", FieldType::new(STRING))
            .with_field("positions", FieldType::array_of("Position"));
        registry.register("Instrument", TypeKind::Composite(composite));

        let unresolved = registry.unresolved_references();
        let targets: Vec<String> = unresolved.iter().map(|r| r.target.to_string()).collect();
        assert_eq!(targets, ["ID", "Position"]);
        assert_eq!(
            unresolved[0].to_string(),
            "field `Instrument.id` refers to unknown type `ID`"
        );

        registry.register("ID", TypeKind::Scalar);
        assert_eq!(registry.unresolved_references().len(), 1);
    }

    #[test]
    fn test_create_dispatches_on_kind() {
        let mut registry = Registry::new();
        registry.register("Person", TypeKind::Composite(CompositeType::new()));
        registry.register(
            "Scales",
            TypeKind::Enum {
                values: vec![Id::new("BASE"), Id::new("TREBLE")],
            },
        );

        assert!(matches!(registry.create(STRING), Ok(WObject::Scalar(_))));
        assert!(matches!(registry.create("Person"), Ok(WObject::Composite(_))));
        assert!(matches!(registry.create_array("Person"), Ok(WObject::Array(_))));
        assert_eq!(
            registry.create("Scales").unwrap_err(),
            ModelError::UnsupportedType("Scales".to_string())
        );
        assert_eq!(
            registry.create("Nope").unwrap_err(),
            ModelError::UnknownType("Nope".to_string())
        );
    }
}
