//! A schema-driven message whose layout is only known at runtime.

use crate::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor};
use crate::reflect::{FieldValue, Reflect, ValueRef};

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Scalar(FieldValue),
    Message(DynamicMessage),
}

impl Item {
    fn as_value_ref(&self) -> ValueRef<'_> {
        match self {
            Item::Scalar(value) => value.as_value_ref(),
            Item::Message(message) => ValueRef::Message(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Empty,
    Single(Item),
    List(Vec<Item>),
}

impl Slot {
    fn empty(field: &FieldDescriptor) -> Self {
        if field.is_repeated() {
            Slot::List(Vec::new())
        } else {
            Slot::Empty
        }
    }
}

/// A message with one typed slot per field of its [`MessageDescriptor`].
///
/// ```
/// use jsonscope_reflect::{DescriptorPool, DynamicMessage, Reflect};
///
/// let pool = DescriptorPool::from_json(
///     r#"{"messages":[{"name":"Tag","fields":[{"name":"label","type":"string","label":"required"}]}]}"#,
/// ).unwrap();
/// let mut tag = DynamicMessage::new(pool.message("Tag").unwrap());
/// assert!(!tag.is_initialized());
/// assert!(tag.set_named("label", "urgent"));
/// assert!(tag.is_initialized());
/// assert!(!tag.set_named("label", 7));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicMessage {
    descriptor: MessageDescriptor,
    slots: Vec<Slot>,
}

impl DynamicMessage {
    /// An empty message of the given type.
    pub fn new(descriptor: MessageDescriptor) -> Self {
        let slots = descriptor.fields().map(|field| Slot::empty(&field)).collect();
        Self { descriptor, slots }
    }

    pub fn message_type(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    /// Slot of `field`, if it belongs to this message's type.
    fn slot_index(&self, field: &FieldDescriptor) -> Option<usize> {
        (field.containing_type() == &self.descriptor).then(|| field.index())
    }

    /// The sub-message of a singular message field, created if unset.
    pub fn message_mut(&mut self, field: &FieldDescriptor) -> Option<&mut DynamicMessage> {
        let index = self.slot_index(field)?;
        if field.kind() != FieldKind::Message || field.is_repeated() {
            return None;
        }
        let target = field.message_type()?;
        let slot = &mut self.slots[index];
        if !matches!(slot, Slot::Single(Item::Message(_))) {
            *slot = Slot::Single(Item::Message(DynamicMessage::new(target)));
        }
        match slot {
            Slot::Single(Item::Message(message)) => Some(message),
            _ => None,
        }
    }

    /// Appends an empty sub-message to a repeated message field.
    pub fn push_message(&mut self, field: &FieldDescriptor) -> Option<&mut DynamicMessage> {
        let index = self.slot_index(field)?;
        if field.kind() != FieldKind::Message || !field.is_repeated() {
            return None;
        }
        let target = field.message_type()?;
        let Slot::List(items) = &mut self.slots[index] else {
            return None;
        };
        items.push(Item::Message(DynamicMessage::new(target)));
        match items.last_mut() {
            Some(Item::Message(message)) => Some(message),
            _ => None,
        }
    }

    /// [`Reflect::set`] by field name.
    pub fn set_named(&mut self, name: &str, value: impl Into<FieldValue>) -> bool {
        match self.descriptor.field_by_name(name) {
            Some(field) => self.set(&field, value.into()),
            None => false,
        }
    }

    /// [`Reflect::add`] by field name.
    pub fn add_named(&mut self, name: &str, value: impl Into<FieldValue>) -> bool {
        match self.descriptor.field_by_name(name) {
            Some(field) => self.add(&field, value.into()),
            None => false,
        }
    }

    /// [`Reflect::get`] by field name.
    pub fn get_named(&self, name: &str) -> Option<ValueRef<'_>> {
        let field = self.descriptor.field_by_name(name)?;
        self.get(&field)
    }

    /// [`message_mut`](Self::message_mut) by field name.
    pub fn message_named_mut(&mut self, name: &str) -> Option<&mut DynamicMessage> {
        let field = self.descriptor.field_by_name(name)?;
        self.message_mut(&field)
    }

    /// [`push_message`](Self::push_message) by field name.
    pub fn push_message_named(&mut self, name: &str) -> Option<&mut DynamicMessage> {
        let field = self.descriptor.field_by_name(name)?;
        self.push_message(&field)
    }
}

impl Reflect for DynamicMessage {
    fn descriptor(&self) -> Option<MessageDescriptor> {
        Some(self.descriptor.clone())
    }

    fn has_field(&self, field: &FieldDescriptor) -> bool {
        self.field_len(field) > 0
    }

    fn field_len(&self, field: &FieldDescriptor) -> usize {
        match self.slot_index(field).map(|index| &self.slots[index]) {
            Some(Slot::Single(_)) => 1,
            Some(Slot::List(items)) => items.len(),
            Some(Slot::Empty) | None => 0,
        }
    }

    fn get(&self, field: &FieldDescriptor) -> Option<ValueRef<'_>> {
        match &self.slots[self.slot_index(field)?] {
            Slot::Single(item) => Some(item.as_value_ref()),
            _ => None,
        }
    }

    fn get_repeated(&self, field: &FieldDescriptor, index: usize) -> Option<ValueRef<'_>> {
        match &self.slots[self.slot_index(field)?] {
            Slot::List(items) => items.get(index).map(Item::as_value_ref),
            _ => None,
        }
    }

    fn set(&mut self, field: &FieldDescriptor, value: FieldValue) -> bool {
        let Some(index) = self.slot_index(field) else {
            return false;
        };
        if field.is_repeated() || field.kind() != value.kind() {
            return false;
        }
        self.slots[index] = Slot::Single(Item::Scalar(value));
        true
    }

    fn add(&mut self, field: &FieldDescriptor, value: FieldValue) -> bool {
        let Some(index) = self.slot_index(field) else {
            return false;
        };
        if field.kind() != value.kind() {
            return false;
        }
        match &mut self.slots[index] {
            Slot::List(items) => {
                items.push(Item::Scalar(value));
                true
            }
            _ => false,
        }
    }

    fn clear_field(&mut self, field: &FieldDescriptor) {
        if let Some(index) = self.slot_index(field) {
            self.slots[index] = Slot::empty(field);
        }
    }

    fn clear(&mut self) {
        for (slot, field) in self.slots.iter_mut().zip(self.descriptor.fields()) {
            *slot = Slot::empty(&field);
        }
    }

    fn mutable_message(&mut self, field: &FieldDescriptor) -> Option<&mut dyn Reflect> {
        self.message_mut(field).map(|message| message as &mut dyn Reflect)
    }

    fn add_message(&mut self, field: &FieldDescriptor) -> Option<&mut dyn Reflect> {
        self.push_message(field).map(|message| message as &mut dyn Reflect)
    }

    fn is_initialized(&self) -> bool {
        self.descriptor.fields().zip(&self.slots).all(|(field, slot)| match slot {
            Slot::Empty => !field.is_required(),
            Slot::Single(item) => item_initialized(item),
            Slot::List(items) => items.iter().all(item_initialized),
        })
    }
}

fn item_initialized(item: &Item) -> bool {
    match item {
        Item::Scalar(_) => true,
        Item::Message(message) => message.is_initialized(),
    }
}
