/// Schema loading and descriptor lookup tests.
mod common;

use jsonscope_reflect::{
    Cardinality, DescriptorPool, DynamicMessage, FieldDef, FieldKind, FieldValue, MessageDef,
    Reflect, SchemaDef, SchemaError, ValueRef,
};

#[test]
fn fields_keep_declaration_order() {
    let person = common::message_type("Person");
    let names: Vec<String> = person.fields().map(|f| f.name().to_string()).collect();
    assert_eq!(
        names,
        [
            "name", "id", "big", "count", "score", "ratio", "active", "tags", "lucky", "home",
            "previous", "mood", "moods"
        ]
    );
    assert_eq!(person.field_count(), 13);
    assert_eq!(person.field(3).unwrap().name(), "count");
    assert!(person.field(13).is_none());
}

#[test]
fn field_kinds_and_cardinality() {
    let person = common::message_type("Person");
    let kind = |name: &str| person.field_by_name(name).unwrap().kind();
    assert_eq!(kind("name"), FieldKind::String);
    assert_eq!(kind("id"), FieldKind::Int32);
    assert_eq!(kind("big"), FieldKind::Int64);
    assert_eq!(kind("count"), FieldKind::UInt64);
    assert_eq!(kind("score"), FieldKind::Double);
    assert_eq!(kind("ratio"), FieldKind::Float);
    assert_eq!(kind("active"), FieldKind::Bool);
    assert_eq!(kind("home"), FieldKind::Message);
    assert_eq!(kind("mood"), FieldKind::Enum);

    let name = person.field_by_name("name").unwrap();
    assert!(name.is_required());
    assert_eq!(name.cardinality(), Cardinality::Required);
    let tags = person.field_by_name("tags").unwrap();
    assert!(tags.is_repeated());
    assert_eq!(person.field_by_name("id").unwrap().cardinality(), Cardinality::Optional);
}

#[test]
fn field_lookup_is_case_sensitive() {
    let person = common::message_type("Person");
    assert!(person.field_by_name("name").is_some());
    assert!(person.field_by_name("Name").is_none());
    assert!(person.field_by_name("").is_none());
}

#[test]
fn message_fields_resolve_including_self_reference() {
    let pool = common::pool();
    let node = pool.message("Node").unwrap();
    let children = node.field_by_name("children").unwrap();
    assert_eq!(children.message_type().unwrap(), node);
    assert_eq!(children.containing_type(), &node);

    let home = pool.message("Person").unwrap().field_by_name("home").unwrap();
    assert_eq!(home.message_type().unwrap().name(), "Address");
    assert!(pool.message("Person").unwrap().field_by_name("id").unwrap().message_type().is_none());
}

#[test]
fn pool_lists_messages_in_document_order() {
    let pool = common::pool();
    let names: Vec<String> = pool.messages().map(|m| m.name().to_string()).collect();
    assert_eq!(names, ["Address", "Person", "Node"]);
    assert!(pool.message("Missing").is_none());
}

#[test]
fn pool_from_def_values() {
    let def = SchemaDef {
        messages: vec![MessageDef {
            name: "Flag".to_string(),
            fields: vec![FieldDef {
                name: "on".to_string(),
                type_name: "bool".to_string(),
                label: Cardinality::Optional,
            }],
        }],
    };
    let pool = DescriptorPool::from_def(&def).unwrap();
    let mut flag = DynamicMessage::new(pool.message("Flag").unwrap());
    assert!(flag.set_named("on", true));
    assert!(matches!(flag.get_named("on"), Some(ValueRef::Bool(true))));
}

#[test]
fn schema_document_round_trips_through_serde() {
    let def: SchemaDef = serde_json::from_str(common::SCHEMA).unwrap();
    let text = serde_json::to_string(&def).unwrap();
    let back: SchemaDef = serde_json::from_str(&text).unwrap();
    assert_eq!(back, def);
    assert_eq!(def.messages[1].fields[7].label, Cardinality::Repeated);
}

#[test]
fn duplicate_message_is_rejected() {
    let err = DescriptorPool::from_json(r#"{"messages":[{"name":"A"},{"name":"A"}]}"#).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateMessage(name) if name == "A"));
}

#[test]
fn duplicate_field_is_rejected() {
    let err = DescriptorPool::from_json(
        r#"{"messages":[{"name":"A","fields":[{"name":"x","type":"bool"},{"name":"x","type":"int32"}]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateField { .. }));
}

#[test]
fn unknown_type_is_rejected() {
    let err = DescriptorPool::from_json(
        r#"{"messages":[{"name":"A","fields":[{"name":"x","type":"Missing"}]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::UnknownType { ref type_name, .. } if type_name == "Missing"
    ));
    assert!(err.to_string().contains("A.x"));
}

#[test]
fn invalid_document_is_rejected() {
    assert!(matches!(
        DescriptorPool::from_json(r#"{"messages": 3}"#),
        Err(SchemaError::Json(_))
    ));
    assert!(matches!(
        DescriptorPool::from_json(r#"{"messages":[{"name":"A","fields":[{"name":"x","type":"int32","label":"sometimes"}]}]}"#),
        Err(SchemaError::Json(_))
    ));
}

// ============================================================================
// DynamicMessage through the Reflect interface
// ============================================================================

#[test]
fn set_rejects_wrong_kind_and_foreign_fields() {
    let mut person = common::person();
    let id = common::field(&person, "id");
    assert!(person.set(&id, FieldValue::Int32(4)));
    assert!(!person.set(&id, FieldValue::Int64(4)));
    assert!(!person.add(&id, FieldValue::Int32(4)));

    let other = common::message_type("Address");
    let street = other.field_by_name("street").unwrap();
    assert!(!person.set(&street, FieldValue::from("x")));
    assert!(!person.has_field(&street));
}

#[test]
fn repeated_fields_append_and_clear() {
    let mut person = common::person();
    assert!(person.add_named("tags", "a"));
    assert!(person.add_named("tags", "b"));
    assert!(!person.set_named("tags", "c"));
    assert_eq!(common::strings_of(&person, "tags"), ["a", "b"]);

    let tags = common::field(&person, "tags");
    assert_eq!(person.field_len(&tags), 2);
    person.clear_field(&tags);
    assert!(!person.has_field(&tags));
}

#[test]
fn sub_messages_are_created_on_demand() {
    let mut person = common::person();
    let home = common::field(&person, "home");
    assert!(!person.has_field(&home));
    person
        .message_named_mut("home")
        .unwrap()
        .set_named("street", "Main");
    assert!(person.has_field(&home));
    assert!(matches!(person.get(&home), Some(ValueRef::Message(_))));

    let previous = common::field(&person, "previous");
    person.push_message_named("previous").unwrap();
    person.push_message_named("previous").unwrap();
    assert_eq!(person.field_len(&previous), 2);
    assert!(person.message_named_mut("previous").is_none());
    assert!(person.push_message_named("home").is_none());
}

#[test]
fn initialization_checks_required_fields_recursively() {
    let mut person = common::person();
    assert!(!person.is_initialized());
    person.set_named("name", "Ada");
    assert!(person.is_initialized());

    person.push_message_named("previous").unwrap();
    assert!(!person.is_initialized());
    let previous = common::field(&person, "previous");
    person.clear_field(&previous);
    assert!(person.is_initialized());

    person.clear();
    assert!(!person.is_initialized());
}
