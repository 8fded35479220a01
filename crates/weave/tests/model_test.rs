use std::{cell::Cell, rc::Rc};

use weave::{
    ModelError, SchemaLoader, WeaveError,
    config::AppConfig,
    object::{CompositeObject, WObject},
    observe::{ChangeTracker, Observer},
    registry::{FLOAT, Registry, STRING},
    types::{CompositeType, FieldType, TypeKind},
    value::ScalarValue,
};

fn person_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(
        "Department",
        TypeKind::Composite(
            CompositeType::new().with_field("name", FieldType::new(STRING).required()),
        ),
    );
    registry.register(
        "Person",
        TypeKind::Composite(
            CompositeType::new()
                .with_field("name", FieldType::new(STRING).required())
                .with_field("age", FieldType::new(FLOAT).required())
                .with_field("department", FieldType::new("Department").required())
                .with_field("team", FieldType::array_of("Person").required()),
        ),
    );
    registry
}

fn string(registry: &Registry, tracker: &ChangeTracker, value: &str) -> WObject {
    let object = registry.create(STRING).expect("String is built in");
    object
        .as_scalar()
        .expect("String is a scalar")
        .set_value(tracker, value);
    object
}

fn composite(registry: &Registry, name: &str) -> CompositeObject {
    registry
        .create(name)
        .expect("type is registered")
        .as_composite()
        .expect("type is a composite")
        .clone()
}

fn text(object: &WObject) -> Option<String> {
    object
        .as_scalar()?
        .value()?
        .as_str()
        .map(str::to_string)
}

#[test]
fn test_people_and_departments() {
    let registry = person_registry();
    let tracker = ChangeTracker::new();
    let notifications = Rc::new(Cell::new(0));
    let counter = Rc::clone(&notifications);
    let controller: Rc<dyn Observer> =
        Rc::new(move |_: &WObject| counter.set(counter.get() + 1));

    let dept = composite(&registry, "Department");
    dept.set(&registry, "name", string(&registry, &tracker, "Rescue"))
        .unwrap();
    assert_eq!(text(&dept.get("name").unwrap()).as_deref(), Some("Rescue"));

    let person_1 = composite(&registry, "Person");
    person_1
        .set(&registry, "name", string(&registry, &tracker, "Bruce"))
        .unwrap();
    person_1
        .set(&registry, "department", dept.clone())
        .unwrap();
    let department = person_1.get("department").unwrap();
    let department_name = department.as_composite().unwrap().get("name").unwrap();
    assert_eq!(text(&department_name).as_deref(), Some("Rescue"));

    let person_2 = composite(&registry, "Person");
    person_2
        .set(&registry, "name", string(&registry, &tracker, "Henry"))
        .unwrap();
    person_2
        .set(&registry, "department", dept.clone())
        .unwrap();

    let team = registry.create_array("Person").unwrap();
    assert_eq!(team.wtype().to_string(), "array of Person");
    person_1.set(&registry, "team", team).unwrap();

    let team = person_1.get("team").unwrap();
    let team = team.as_array().unwrap();
    assert_eq!(team.len(), 0);
    team.add(&tracker, person_2.clone()).unwrap();
    assert_eq!(team.len(), 1);
    let first = team.get(0).unwrap();
    let first_name = first.as_composite().unwrap().get("name").unwrap();
    assert_eq!(text(&first_name).as_deref(), Some("Henry"));

    assert!(matches!(
        team.add(&tracker, dept.clone()),
        Err(ModelError::TypeMismatch { .. })
    ));
    assert!(matches!(
        person_1.set(&registry, "age", dept.clone()),
        Err(ModelError::TypeMismatch { .. })
    ));

    let name = person_1.get("name").unwrap();
    name.observable().attach(Rc::clone(&controller));
    team.observable().attach(Rc::clone(&controller));

    name.as_scalar()
        .unwrap()
        .set_value(&tracker, "Laura");

    let person_3 = composite(&registry, "Person");
    person_3
        .set(&registry, "name", string(&registry, &tracker, "Izzy"))
        .unwrap();
    person_3.set(&registry, "department", dept).unwrap();
    team.add(&tracker, person_3.clone()).unwrap();

    tracker.drain_pending();
    assert_eq!(notifications.get(), 2);

    let people = registry.create_array("Person").unwrap();
    let people = people.as_array().unwrap();
    people.observable().attach(Rc::clone(&controller));
    people.add(&tracker, person_1).unwrap();
    people.add(&tracker, person_2).unwrap();
    people.add(&tracker, person_3).unwrap();
    assert_eq!(people.len(), 3);

    tracker.drain_pending();
    assert_eq!(notifications.get(), 3);
}

#[test]
fn test_field_accepts_only_the_registered_float() {
    let registry = person_registry();
    let tracker = ChangeTracker::new();
    let person = composite(&registry, "Person");

    let mut other = Registry::new();
    other.register("Person", TypeKind::Composite(CompositeType::new()));
    let foreign_float = other.create(FLOAT).unwrap();
    foreign_float
        .as_scalar()
        .unwrap()
        .set_value(&tracker, 42.0);

    assert_eq!(
        person.set(&registry, "age", foreign_float),
        Err(ModelError::TypeMismatch {
            expected: "Float".to_string(),
            found: "Float".to_string(),
        })
    );

    let mut custom = Registry::new();
    custom.register("Age", TypeKind::Scalar);
    let age = custom.create("Age").unwrap();
    assert!(matches!(
        person.set(&registry, "age", age),
        Err(ModelError::TypeMismatch { .. })
    ));

    let float = registry.create(FLOAT).unwrap();
    float.as_scalar().unwrap().set_value(&tracker, 42.0);
    person.set(&registry, "age", float).unwrap();
    assert_eq!(
        person.get("age").unwrap().as_scalar().unwrap().value(),
        Some(ScalarValue::Float(42.0))
    );
}

#[test]
fn test_array_rejects_structurally_identical_composite() {
    let mut registry = person_registry();
    registry.register(
        "Employee",
        TypeKind::Composite(
            CompositeType::new()
                .with_field("name", FieldType::new(STRING).required())
                .with_field("age", FieldType::new(FLOAT).required())
                .with_field("department", FieldType::new("Department").required())
                .with_field("team", FieldType::array_of("Person").required()),
        ),
    );
    let tracker = ChangeTracker::new();
    let people = registry.create_array("Person").unwrap();
    let people = people.as_array().unwrap();

    people.add(&tracker, composite(&registry, "Person")).unwrap();
    assert!(matches!(
        people.add(&tracker, composite(&registry, "Employee")),
        Err(ModelError::TypeMismatch { .. })
    ));
    assert_eq!(people.len(), 1);
}

#[test]
fn test_array_type_is_memoized() {
    let registry = person_registry();

    let first = registry.array_of("Person").unwrap();
    let second = registry.array_of("Person").unwrap();

    assert!(first.same(&second));
    assert_eq!(first.to_string(), "array of Person");
}

#[test]
fn test_unknown_type_has_no_side_effect() {
    let registry = person_registry();
    let before = registry.len();

    assert_eq!(
        registry.lookup("DoesNotExist").unwrap_err(),
        ModelError::UnknownType("DoesNotExist".to_string())
    );
    assert_eq!(
        registry.array_of("DoesNotExist").unwrap_err(),
        ModelError::UnknownType("DoesNotExist".to_string())
    );
    assert_eq!(
        registry.create_array("DoesNotExist").unwrap_err(),
        ModelError::UnknownType("DoesNotExist".to_string())
    );
    assert_eq!(registry.len(), before);
    assert!(registry.array_of("Person").is_ok());
}

#[test]
fn test_failed_set_leaves_fields_unchanged() {
    let registry = person_registry();
    let tracker = ChangeTracker::new();
    let person = composite(&registry, "Person");
    person
        .set(&registry, "name", string(&registry, &tracker, "Bruce"))
        .unwrap();

    let float = registry.create(FLOAT).unwrap();
    assert!(person.set(&registry, "name", float).is_err());

    assert_eq!(text(&person.get("name").unwrap()).as_deref(), Some("Bruce"));
}

#[test]
fn test_composite_set_records_no_change() {
    let registry = person_registry();
    let tracker = ChangeTracker::new();
    let dept = composite(&registry, "Department");
    let name = string(&registry, &tracker, "Rescue");
    tracker.drain_pending();

    dept.set(&registry, "name", name).unwrap();

    assert!(!dept.observable().is_dirty());
    assert_eq!(tracker.pending_len(), 0);
}

#[test]
fn test_observer_reads_changed_objects() {
    let registry = person_registry();
    let tracker = ChangeTracker::new();
    let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let captured = Rc::clone(&seen);
    let controller: Rc<dyn Observer> = Rc::new(move |changed: &WObject| {
        let entry = match changed {
            WObject::Array(team) => format!("{} with {} item(s)", changed.wtype(), team.len()),
            _ => text(changed).unwrap_or_default(),
        };
        captured.borrow_mut().push(entry);
    });

    let person = composite(&registry, "Person");
    person
        .set(&registry, "name", string(&registry, &tracker, "Bruce"))
        .unwrap();
    person
        .set(&registry, "team", registry.create_array("Person").unwrap())
        .unwrap();
    tracker.drain_pending();

    let name = person.get("name").unwrap();
    let team = person.get("team").unwrap();
    name.observable().attach(Rc::clone(&controller));
    team.observable().attach(Rc::clone(&controller));

    name.as_scalar().unwrap().set_value(&tracker, "Laura");
    team.as_array()
        .unwrap()
        .add(&tracker, composite(&registry, "Person"))
        .unwrap();
    name.as_scalar().unwrap().set_value(&tracker, "Izzy");

    assert_eq!(tracker.drain_pending(), 2);
    assert_eq!(*seen.borrow(), ["Izzy", "array of Person with 1 item(s)"]);
}

#[test]
fn test_loader_returns_document_and_registers_types() {
    let loader = SchemaLoader::new(AppConfig::default());
    let mut registry = loader.registry().expect("default config is valid");

    let (schema, summary) = loader
        .load(
            "type Department { name: String! }\nfunction price(at: Float): Float",
            &mut registry,
        )
        .expect("Failed to load");

    assert_eq!(schema.definitions.len(), 2);
    assert_eq!(summary.types.len(), 1);
    assert_eq!(summary.functions.len(), 1);
    assert!(registry.contains("Department"));
    assert!(!registry.contains("price"));
}

#[test]
fn test_loader_rejects_duplicates_without_registering() {
    let loader = SchemaLoader::new(AppConfig::default());
    let mut registry = loader.registry().expect("default config is valid");
    let before = registry.len();

    let err = loader
        .load("type A { a: String }\ntype A { b: Float }", &mut registry)
        .expect_err("duplicate definitions are rejected");

    assert!(matches!(
        err,
        WeaveError::Model(ModelError::DuplicateDefinition(_))
    ));
    assert_eq!(registry.len(), before);
}
