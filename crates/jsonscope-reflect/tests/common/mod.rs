//! Shared schema fixture for the reflect integration tests.
#![allow(dead_code)]

use jsonscope_reflect::{
    DescriptorPool, DynamicMessage, FieldDescriptor, MessageDescriptor, Reflect, ValueRef,
};

pub const SCHEMA: &str = r#"{
    "messages": [
        {"name": "Address", "fields": [
            {"name": "street", "type": "string", "label": "required"},
            {"name": "zip", "type": "uint32"}
        ]},
        {"name": "Person", "fields": [
            {"name": "name", "type": "string", "label": "required"},
            {"name": "id", "type": "int32"},
            {"name": "big", "type": "int64"},
            {"name": "count", "type": "uint64"},
            {"name": "score", "type": "double"},
            {"name": "ratio", "type": "float"},
            {"name": "active", "type": "bool"},
            {"name": "tags", "type": "string", "label": "repeated"},
            {"name": "lucky", "type": "int32", "label": "repeated"},
            {"name": "home", "type": "Address"},
            {"name": "previous", "type": "Address", "label": "repeated"},
            {"name": "mood", "type": "enum"},
            {"name": "moods", "type": "enum", "label": "repeated"}
        ]},
        {"name": "Node", "fields": [
            {"name": "value", "type": "int32"},
            {"name": "children", "type": "Node", "label": "repeated"}
        ]}
    ]
}"#;

pub fn pool() -> DescriptorPool {
    DescriptorPool::from_json(SCHEMA).unwrap()
}

pub fn message_type(name: &str) -> MessageDescriptor {
    pool().message(name).unwrap()
}

pub fn person() -> DynamicMessage {
    DynamicMessage::new(message_type("Person"))
}

pub fn field(msg: &DynamicMessage, name: &str) -> FieldDescriptor {
    msg.message_type().field_by_name(name).unwrap()
}

pub fn string_of(msg: &DynamicMessage, name: &str) -> Option<String> {
    match msg.get_named(name) {
        Some(ValueRef::String(s)) => Some(s.to_string()),
        _ => None,
    }
}

pub fn strings_of(msg: &DynamicMessage, name: &str) -> Vec<String> {
    let field = field(msg, name);
    (0..msg.field_len(&field))
        .filter_map(|i| match msg.get_repeated(&field, i) {
            Some(ValueRef::String(s)) => Some(s.to_string()),
            _ => None,
        })
        .collect()
}

/// A message that exposes no schema at all.
pub struct Schemaless;

impl Reflect for Schemaless {
    fn descriptor(&self) -> Option<MessageDescriptor> {
        None
    }

    fn has_field(&self, _field: &FieldDescriptor) -> bool {
        false
    }

    fn field_len(&self, _field: &FieldDescriptor) -> usize {
        0
    }

    fn get(&self, _field: &FieldDescriptor) -> Option<ValueRef<'_>> {
        None
    }

    fn get_repeated(&self, _field: &FieldDescriptor, _index: usize) -> Option<ValueRef<'_>> {
        None
    }

    fn set(&mut self, _field: &FieldDescriptor, _value: jsonscope_reflect::FieldValue) -> bool {
        false
    }

    fn add(&mut self, _field: &FieldDescriptor, _value: jsonscope_reflect::FieldValue) -> bool {
        false
    }

    fn clear_field(&mut self, _field: &FieldDescriptor) {}

    fn clear(&mut self) {}

    fn mutable_message(&mut self, _field: &FieldDescriptor) -> Option<&mut dyn Reflect> {
        None
    }

    fn add_message(&mut self, _field: &FieldDescriptor) -> Option<&mut dyn Reflect> {
        None
    }

    fn is_initialized(&self) -> bool {
        true
    }
}
