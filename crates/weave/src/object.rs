//! Typed runtime objects.
//!
//! Objects are created through [`Registry::create`] and
//! [`Registry::create_array`] and are shared handles: cloning a [`WObject`]
//! does not copy the object. Every assignment is checked against the declared
//! type by identity.
//!
//! Scalar assignment and array append record a change on the object's
//! [`Observable`], and its observers receive the object as a [`WObject`].
//! Setting a composite field does not.
//!
//! [`Registry::create`]: crate::registry::Registry::create
//! [`Registry::create_array`]: crate::registry::Registry::create_array

use std::{
    cell::{Ref, RefCell},
    fmt,
    rc::Rc,
};

use indexmap::IndexMap;
use log::trace;

use weave_core::{identifier::Id, value::ScalarValue};

use crate::{
    error::ModelError,
    observe::{ChangeTracker, Observable},
    registry::Registry,
    types::{CompositeType, WType},
};

/// Any object.
#[derive(Debug, Clone)]
pub enum WObject {
    Scalar(ScalarObject),
    Composite(CompositeObject),
    Array(ArrayObject),
}

impl WObject {
    /// The declared type.
    pub fn wtype(&self) -> &WType {
        match self {
            WObject::Scalar(object) => object.wtype(),
            WObject::Composite(object) => object.wtype(),
            WObject::Array(object) => object.wtype(),
        }
    }

    pub fn observable(&self) -> &Observable {
        match self {
            WObject::Scalar(object) => object.observable(),
            WObject::Composite(object) => object.observable(),
            WObject::Array(object) => object.observable(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, WObject::Array(_))
    }

    pub fn as_scalar(&self) -> Option<&ScalarObject> {
        match self {
            WObject::Scalar(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeObject> {
        match self {
            WObject::Composite(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayObject> {
        match self {
            WObject::Array(object) => Some(object),
            _ => None,
        }
    }

    /// Whether both handles refer to the same object.
    pub fn ptr_eq(&self, other: &WObject) -> bool {
        self.observable().ptr_eq(other.observable())
    }
}

impl From<ScalarObject> for WObject {
    fn from(object: ScalarObject) -> Self {
        WObject::Scalar(object)
    }
}

impl From<CompositeObject> for WObject {
    fn from(object: CompositeObject) -> Self {
        WObject::Composite(object)
    }
}

impl From<ArrayObject> for WObject {
    fn from(object: ArrayObject) -> Self {
        WObject::Array(object)
    }
}

fn mismatch(expected: &WType, found: &WType) -> ModelError {
    ModelError::TypeMismatch {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

#[derive(Debug)]
struct ScalarData {
    wtype: WType,
    value: RefCell<Option<ScalarValue>>,
    observable: Observable,
}

/// An object holding a single value.
#[derive(Debug, Clone)]
pub struct ScalarObject(Rc<ScalarData>);

impl ScalarObject {
    pub(crate) fn new(wtype: WType) -> Self {
        Self(Rc::new(ScalarData {
            wtype,
            value: RefCell::new(None),
            observable: Observable::new(),
        }))
    }

    pub fn wtype(&self) -> &WType {
        &self.0.wtype
    }

    pub fn observable(&self) -> &Observable {
        &self.0.observable
    }

    /// The current value, or `None` before the first assignment.
    pub fn value(&self) -> Option<ScalarValue> {
        self.0.value.borrow().clone()
    }

    /// Replace the value and record a change. Any value is accepted.
    pub fn set_value(&self, tracker: &ChangeTracker, value: impl Into<ScalarValue>) {
        let value = value.into();
        trace!(
            type_name = self.0.wtype.name().to_string(),
            value = value.to_string();
            "Set scalar value"
        );
        self.0.value.replace(Some(value));
        self.0
            .observable
            .record_change(tracker, WObject::Scalar(self.clone()));
    }
}

#[derive(Debug)]
struct CompositeData {
    wtype: WType,
    fields: RefCell<IndexMap<Id, WObject>>,
    observable: Observable,
}

/// An object with named, typed fields.
#[derive(Debug, Clone)]
pub struct CompositeObject(Rc<CompositeData>);

impl CompositeObject {
    pub(crate) fn new(wtype: WType) -> Self {
        Self(Rc::new(CompositeData {
            wtype,
            fields: RefCell::new(IndexMap::new()),
            observable: Observable::new(),
        }))
    }

    pub fn wtype(&self) -> &WType {
        &self.0.wtype
    }

    pub fn observable(&self) -> &Observable {
        &self.0.observable
    }

    fn composite_type(&self) -> &CompositeType {
        self.0
            .wtype
            .as_composite()
            .expect("composite objects are only created for composite types")
    }

    fn unknown_field(&self, field: Id) -> ModelError {
        ModelError::UnknownField {
            type_name: self.0.wtype.to_string(),
            field: field.to_string(),
        }
    }

    /// Assign a field.
    ///
    /// The object's type must be exactly the type the field declares, as
    /// resolved through `registry`. Array fields resolve to the registry's
    /// array type for the element name.
    ///
    /// # Errors
    ///
    /// - [`ModelError::UnknownField`] if the field is not declared.
    /// - [`ModelError::UnknownType`] if the declared type is not registered.
    /// - [`ModelError::TypeMismatch`] if `object` has any other type.
    pub fn set(
        &self,
        registry: &Registry,
        field: impl Into<Id>,
        object: impl Into<WObject>,
    ) -> Result<(), ModelError> {
        let field = field.into();
        let object = object.into();
        let field_type = self
            .composite_type()
            .field(field)
            .ok_or_else(|| self.unknown_field(field))?;

        let expected = if field_type.is_vector() {
            registry.array_of(field_type.type_name())?
        } else {
            registry.lookup(field_type.type_name())?
        };
        if !object.wtype().same(&expected) {
            return Err(mismatch(&expected, object.wtype()));
        }

        trace!(
            type_name = self.0.wtype.name().to_string(),
            field = field.to_string();
            "Set composite field"
        );
        self.0.fields.borrow_mut().insert(field, object);
        Ok(())
    }

    /// The object assigned to `field`.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownField`] if the field was never set.
    pub fn get(&self, field: impl Into<Id>) -> Result<WObject, ModelError> {
        let field = field.into();
        self.0
            .fields
            .borrow()
            .get(&field)
            .cloned()
            .ok_or_else(|| self.unknown_field(field))
    }

    pub fn is_set(&self, field: impl Into<Id>) -> bool {
        self.0.fields.borrow().contains_key(&field.into())
    }

    /// Required fields that have not been set, in declaration order.
    pub fn missing_required(&self) -> Vec<Id> {
        let fields = self.0.fields.borrow();
        self.composite_type()
            .fields()
            .filter(|(name, field_type)| field_type.is_required() && !fields.contains_key(name))
            .map(|(name, _)| name)
            .collect()
    }
}

#[derive(Debug)]
struct ArrayData {
    wtype: WType,
    items: RefCell<Vec<WObject>>,
    observable: Observable,
}

/// An ordered list of objects of one type.
#[derive(Debug, Clone)]
pub struct ArrayObject(Rc<ArrayData>);

impl ArrayObject {
    pub(crate) fn new(wtype: WType) -> Self {
        Self(Rc::new(ArrayData {
            wtype,
            items: RefCell::new(Vec::new()),
            observable: Observable::new(),
        }))
    }

    /// The array type, e.g. `array of Person`.
    pub fn wtype(&self) -> &WType {
        &self.0.wtype
    }

    pub fn observable(&self) -> &Observable {
        &self.0.observable
    }

    fn items_type(&self) -> &WType {
        self.0
            .wtype
            .items()
            .expect("array objects are only created for array types")
    }

    /// Append an object and record a change.
    ///
    /// # Errors
    ///
    /// [`ModelError::TypeMismatch`] unless `object` has exactly the element type.
    pub fn add(
        &self,
        tracker: &ChangeTracker,
        object: impl Into<WObject>,
    ) -> Result<(), ModelError> {
        let object = object.into();
        let items_type = self.items_type();
        if !object.wtype().same(items_type) {
            return Err(mismatch(items_type, object.wtype()));
        }

        self.0.items.borrow_mut().push(object);
        trace!(type_name = self.0.wtype.name().to_string(), len = self.len(); "Appended array item");
        self.0
            .observable
            .record_change(tracker, WObject::Array(self.clone()));
        Ok(())
    }

    /// The item at `index`.
    ///
    /// # Errors
    ///
    /// [`ModelError::IndexOutOfRange`] past the end.
    pub fn get(&self, index: usize) -> Result<WObject, ModelError> {
        let items = self.0.items.borrow();
        items
            .get(index)
            .cloned()
            .ok_or(ModelError::IndexOutOfRange {
                index,
                len: items.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.items.borrow().is_empty()
    }

    /// Borrow the items.
    ///
    /// # Panics
    ///
    /// Appending to this array while the borrow is alive panics.
    pub fn items(&self) -> Ref<'_, [WObject]> {
        Ref::map(self.0.items.borrow(), Vec::as_slice)
    }

    /// Iterate over a snapshot of the items.
    pub fn iter(&self) -> impl Iterator<Item = WObject> + use<> {
        self.0.items.borrow().clone().into_iter()
    }
}

impl fmt::Display for WObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WObject::Scalar(object) => match object.value() {
                Some(value) => write!(f, "{value}"),
                None => write!(f, "<unset {}>", object.wtype()),
            },
            WObject::Composite(object) => {
                write!(f, "{} {{", object.wtype())?;
                for (i, (name, value)) in object.0.fields.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {name}: {value}")?;
                }
                write!(f, " }}")
            }
            WObject::Array(object) => {
                write!(f, "[")?;
                for (i, item) in object.items().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}
