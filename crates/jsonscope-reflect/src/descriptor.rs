//! Runtime message schemas.
//!
//! A [`DescriptorPool`] holds a set of message types, each an ordered list of
//! typed fields. Descriptors are cheap handles into a shared pool, so message
//! types may refer to each other (and to themselves) freely.
//!
//! Pools are usually loaded from a JSON schema document:
//!
//! ```
//! use jsonscope_reflect::{DescriptorPool, FieldKind};
//!
//! let pool = DescriptorPool::from_json(r#"{
//!     "messages": [
//!         {"name": "Point", "fields": [
//!             {"name": "x", "type": "int32", "label": "required"},
//!             {"name": "y", "type": "int32"}
//!         ]},
//!         {"name": "Path", "fields": [
//!             {"name": "points", "type": "Point", "label": "repeated"}
//!         ]}
//!     ]
//! }"#).unwrap();
//!
//! let path = pool.message("Path").unwrap();
//! let points = path.field_by_name("points").unwrap();
//! assert_eq!(points.kind(), FieldKind::Message);
//! assert!(points.is_repeated());
//! assert_eq!(points.message_type().unwrap().name(), "Point");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};

/// Value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Double,
    Float,
    Bool,
    Message,
    /// Enumerated scalars. Declarable, but not supported by Merge.
    Enum,
}

impl FieldKind {
    /// Parses a scalar type name as used in schema documents.
    pub fn from_scalar_name(name: &str) -> Option<Self> {
        let kind = match name {
            "string" => FieldKind::String,
            "int32" => FieldKind::Int32,
            "int64" => FieldKind::Int64,
            "uint32" => FieldKind::UInt32,
            "uint64" => FieldKind::UInt64,
            "double" => FieldKind::Double,
            "float" => FieldKind::Float,
            "bool" => FieldKind::Bool,
            "enum" => FieldKind::Enum,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::UInt32 => "uint32",
            FieldKind::UInt64 => "uint64",
            FieldKind::Double => "double",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
            FieldKind::Message => "message",
            FieldKind::Enum => "enum",
        };
        f.write_str(name)
    }
}

/// Whether a field holds zero-or-one, exactly one, or any number of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    Optional,
    Required,
    Repeated,
}

// ============================================================================
// Schema documents
// ============================================================================

/// Serialized form of a pool: `{"messages": [...]}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaDef {
    pub messages: Vec<MessageDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// One field. `type` is a scalar name (`string`, `int32`, `int64`, `uint32`,
/// `uint64`, `double`, `float`, `bool`, `enum`) or the name of a message in
/// the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub label: Cardinality,
}

// ============================================================================
// Pool
// ============================================================================

#[derive(Debug)]
struct FieldInfo {
    name: String,
    kind: FieldKind,
    cardinality: Cardinality,
    message: Option<usize>,
}

#[derive(Debug)]
struct MessageInfo {
    name: String,
    fields: Vec<FieldInfo>,
    by_name: HashMap<String, usize>,
}

#[derive(Debug)]
struct PoolInner {
    messages: Vec<MessageInfo>,
    by_name: HashMap<String, usize>,
}

/// A shared set of message types.
#[derive(Debug, Clone)]
pub struct DescriptorPool {
    inner: Arc<PoolInner>,
}

impl DescriptorPool {
    /// Loads a pool from a JSON schema document.
    pub fn from_json(text: &str) -> SchemaResult<Self> {
        let def: SchemaDef = serde_json::from_str(text)?;
        Self::from_def(&def)
    }

    /// Builds a pool, resolving message-typed fields by name.
    pub fn from_def(def: &SchemaDef) -> SchemaResult<Self> {
        let mut by_name = HashMap::with_capacity(def.messages.len());
        for (index, message) in def.messages.iter().enumerate() {
            if by_name.insert(message.name.clone(), index).is_some() {
                return Err(SchemaError::DuplicateMessage(message.name.clone()));
            }
        }

        let mut messages = Vec::with_capacity(def.messages.len());
        for message in &def.messages {
            let mut fields = Vec::with_capacity(message.fields.len());
            let mut field_names = HashMap::with_capacity(message.fields.len());
            for (index, field) in message.fields.iter().enumerate() {
                if field_names.insert(field.name.clone(), index).is_some() {
                    return Err(SchemaError::DuplicateField {
                        message: message.name.clone(),
                        field: field.name.clone(),
                    });
                }
                let (kind, target) = match FieldKind::from_scalar_name(&field.type_name) {
                    Some(kind) => (kind, None),
                    None => match by_name.get(&field.type_name) {
                        Some(&target) => (FieldKind::Message, Some(target)),
                        None => {
                            return Err(SchemaError::UnknownType {
                                message: message.name.clone(),
                                field: field.name.clone(),
                                type_name: field.type_name.clone(),
                            })
                        }
                    },
                };
                fields.push(FieldInfo {
                    name: field.name.clone(),
                    kind,
                    cardinality: field.label,
                    message: target,
                });
            }
            messages.push(MessageInfo {
                name: message.name.clone(),
                fields,
                by_name: field_names,
            });
        }

        log::debug!("loaded descriptor pool with {} message types", messages.len());
        Ok(Self {
            inner: Arc::new(PoolInner { messages, by_name }),
        })
    }

    /// Looks up a message type by its exact name.
    pub fn message(&self, name: &str) -> Option<MessageDescriptor> {
        self.inner
            .by_name
            .get(name)
            .map(|&index| MessageDescriptor::new(&self.inner, index))
    }

    /// All message types, in document order.
    pub fn messages(&self) -> impl Iterator<Item = MessageDescriptor> + '_ {
        (0..self.inner.messages.len()).map(|index| MessageDescriptor::new(&self.inner, index))
    }
}

/// Handle to one message type of a [`DescriptorPool`].
#[derive(Clone)]
pub struct MessageDescriptor {
    pool: Arc<PoolInner>,
    index: usize,
}

impl MessageDescriptor {
    fn new(pool: &Arc<PoolInner>, index: usize) -> Self {
        Self {
            pool: Arc::clone(pool),
            index,
        }
    }

    fn info(&self) -> &MessageInfo {
        &self.pool.messages[self.index]
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn field_count(&self) -> usize {
        self.info().fields.len()
    }

    /// The `index`-th field in declaration order.
    pub fn field(&self, index: usize) -> Option<FieldDescriptor> {
        (index < self.field_count()).then(|| FieldDescriptor {
            message: self.clone(),
            index,
        })
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        (0..self.field_count()).map(move |index| FieldDescriptor {
            message: self.clone(),
            index,
        })
    }

    /// Exact, case-sensitive lookup.
    pub fn field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        let index = *self.info().by_name.get(name)?;
        self.field(index)
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pool, &other.pool) && self.index == other.index
    }
}

impl Eq for MessageDescriptor {}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageDescriptor")
            .field(&self.name())
            .finish()
    }
}

/// Handle to one field of a message type.
#[derive(Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    message: MessageDescriptor,
    index: usize,
}

impl FieldDescriptor {
    fn info(&self) -> &FieldInfo {
        &self.message.info().fields[self.index]
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn kind(&self) -> FieldKind {
        self.info().kind
    }

    pub fn cardinality(&self) -> Cardinality {
        self.info().cardinality
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality() == Cardinality::Repeated
    }

    pub fn is_required(&self) -> bool {
        self.cardinality() == Cardinality::Required
    }

    /// Position in the containing message's declaration order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The message this field belongs to.
    pub fn containing_type(&self) -> &MessageDescriptor {
        &self.message
    }

    /// Type of a message-typed field.
    pub fn message_type(&self) -> Option<MessageDescriptor> {
        self.info()
            .message
            .map(|index| MessageDescriptor::new(&self.message.pool, index))
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldDescriptor({}.{}: {})", self.message.name(), self.name(), self.kind())
    }
}
