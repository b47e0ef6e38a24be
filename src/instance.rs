use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::core::Value;

/// Reconstructed entity record: scalar fields plus populated relations.
///
/// Instances are dynamic because the mapping decides at runtime which
/// entities and relations a row carries. Identity lives in the handle, not
/// in the data: two rows describing the same record share one instance
/// through [`EntityRef`].
pub struct EntityInstance {
    entity: String,
    fields: HashMap<String, Value>,
    relations: HashMap<String, RelationValue>,
}

impl EntityInstance {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            fields: HashMap::new(),
            relations: HashMap::new(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Returns `None` for a field no processed row ever carried. A field
    /// that arrived as SQL NULL is `Some(&Value::Null)`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn relation(&self, property: &str) -> Option<&RelationValue> {
        self.relations.get(property)
    }

    /// Single-valued relation target, if the property was mapped and the
    /// rows produced a child.
    pub fn relation_one(&self, property: &str) -> Option<EntityRef> {
        match self.relations.get(property) {
            Some(RelationValue::One(target)) => target.clone(),
            _ => None,
        }
    }

    /// Collection relation contents; empty slice when the property was
    /// mapped but no row produced a child, `None` when never mapped.
    pub fn relation_many(&self, property: &str) -> Option<&[EntityRef]> {
        match self.relations.get(property) {
            Some(RelationValue::Many(children)) => Some(children),
            _ => None,
        }
    }

    pub fn relations(&self) -> impl Iterator<Item = (&str, &RelationValue)> {
        self.relations.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn set_relation_one(&mut self, property: impl Into<String>, target: Option<EntityRef>) {
        self.relations
            .insert(property.into(), RelationValue::One(target));
    }

    /// Initializes the collection on first touch and hands it back for
    /// appending.
    pub fn relation_many_mut(&mut self, property: impl Into<String>) -> &mut Vec<EntityRef> {
        match self
            .relations
            .entry(property.into())
            .or_insert_with(|| RelationValue::Many(Vec::new()))
        {
            RelationValue::Many(children) => children,
            // A property cannot be both cardinalities; the mapping drives
            // every write through one declared relation descriptor.
            RelationValue::One(_) => unreachable!("relation cardinality changed between rows"),
        }
    }
}

impl fmt::Debug for EntityInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityInstance")
            .field("entity", &self.entity)
            .field("fields", &self.fields)
            .field("relations", &self.relations)
            .finish()
    }
}

/// Value of one relation property on an instance.
pub enum RelationValue {
    One(Option<EntityRef>),
    Many(Vec<EntityRef>),
}

impl fmt::Debug for RelationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(None) => write!(f, "One(None)"),
            Self::One(Some(target)) => write!(f, "One({})", target.describe()),
            Self::Many(children) => {
                let names: Vec<String> = children.iter().map(EntityRef::describe).collect();
                write!(f, "Many({:?})", names)
            }
        }
    }
}

/// Shared handle to a reconstructed instance.
///
/// Cloning shares the underlying instance; [`ptr_eq`](Self::ptr_eq) is the
/// identity test the deduplication guarantees are stated in.
#[derive(Clone)]
pub struct EntityRef(Rc<RefCell<EntityInstance>>);

impl EntityRef {
    pub fn new(instance: EntityInstance) -> Self {
        Self(Rc::new(RefCell::new(instance)))
    }

    pub fn borrow(&self) -> Ref<'_, EntityInstance> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, EntityInstance> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Entity name plus handle address, safe to render even while the
    /// instance is mutably borrowed (relation graphs may contain cycles).
    fn describe(&self) -> String {
        match self.0.try_borrow() {
            Ok(instance) => format!("{}@{:p}", instance.entity(), Rc::as_ptr(&self.0)),
            Err(_) => format!("<borrowed>@{:p}", Rc::as_ptr(&self.0)),
        }
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityRef({})", self.describe())
    }
}

/// Equality is handle identity, not structural comparison.
impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for EntityRef {}
