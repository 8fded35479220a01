//! Type descriptors.
//!
//! A [`WType`] is a shared handle to a registered type. Handles compare by
//! identity: two types are the same only if they came from the same
//! registration, even when their names and shapes agree.

use std::{
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU32, Ordering},
};

use indexmap::IndexMap;

use weave_core::identifier::Id;

static NEXT_TYPE_ID: AtomicU32 = AtomicU32::new(0);

/// Identity of a registered type, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    fn next() -> Self {
        Self(NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a composite field refers to its type.
///
/// The type is named rather than held, so a composite may declare fields of
/// types registered after it. Names resolve through the registry when a
/// field is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldType {
    type_name: Id,
    is_vector: bool,
    is_required: bool,
    is_item_required: bool,
}

impl FieldType {
    /// A field holding a single value of `type_name`.
    pub fn new(type_name: impl Into<Id>) -> Self {
        Self {
            type_name: type_name.into(),
            is_vector: false,
            is_required: false,
            is_item_required: false,
        }
    }

    /// A field holding an array of `type_name`.
    pub fn array_of(type_name: impl Into<Id>) -> Self {
        Self {
            is_vector: true,
            ..Self::new(type_name)
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Mark the array items as required. Only meaningful for array fields.
    pub fn with_required_items(mut self) -> Self {
        self.is_item_required = true;
        self
    }

    /// The element type name for arrays, otherwise the field's type name.
    pub fn type_name(&self) -> Id {
        self.type_name
    }

    pub fn is_vector(&self) -> bool {
        self.is_vector
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    pub fn is_item_required(&self) -> bool {
        self.is_item_required
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_vector {
            write!(f, "[{}", self.type_name)?;
            if self.is_item_required {
                write!(f, "!")?;
            }
            write!(f, "]")?;
        } else {
            write!(f, "{}", self.type_name)?;
        }
        if self.is_required {
            write!(f, "!")?;
        }
        Ok(())
    }
}

/// A named aggregate of typed fields. Field order is declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeType {
    fields: IndexMap<Id, FieldType>,
}

impl CompositeType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_field`](Self::add_field).
    pub fn with_field(mut self, name: impl Into<Id>, field_type: FieldType) -> Self {
        self.add_field(name, field_type);
        self
    }

    /// Declare a field, replacing any previous declaration with the same name.
    pub fn add_field(&mut self, name: impl Into<Id>, field_type: FieldType) {
        self.fields.insert(name.into(), field_type);
    }

    pub fn field(&self, name: Id) -> Option<&FieldType> {
        self.fields.get(&name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (Id, &FieldType)> {
        self.fields.iter().map(|(name, field)| (*name, field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The shape of a registered type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// A single value such as `String` or `Float`.
    Scalar,
    Composite(CompositeType),
    /// Derived on demand by [`Registry::array_of`](crate::registry::Registry::array_of).
    Array { items: WType },
    Enum { values: Vec<Id> },
    Union { members: Vec<Id> },
}

impl TypeKind {
    /// Lowercase name of the kind, e.g. `composite`.
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Composite(_) => "composite",
            TypeKind::Array { .. } => "array",
            TypeKind::Enum { .. } => "enum",
            TypeKind::Union { .. } => "union",
        }
    }
}

#[derive(Debug)]
struct TypeData {
    id: TypeId,
    name: Id,
    kind: TypeKind,
}

/// A registered type.
///
/// Cloning is cheap and keeps the identity. Equality is identity.
#[derive(Debug, Clone)]
pub struct WType(Rc<TypeData>);

impl WType {
    pub(crate) fn new(name: Id, kind: TypeKind) -> Self {
        Self(Rc::new(TypeData {
            id: TypeId::next(),
            name,
            kind,
        }))
    }

    pub fn id(&self) -> TypeId {
        self.0.id
    }

    pub fn name(&self) -> Id {
        self.0.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.0.kind
    }

    /// Whether both handles refer to the same registration.
    pub fn same(&self, other: &WType) -> bool {
        self.0.id == other.0.id
    }

    pub fn as_composite(&self) -> Option<&CompositeType> {
        match &self.0.kind {
            TypeKind::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    /// Element type of an array type.
    pub fn items(&self) -> Option<&WType> {
        match &self.0.kind {
            TypeKind::Array { items } => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for WType {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for WType {}

impl fmt::Display for WType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}
