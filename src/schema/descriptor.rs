use std::fmt;
use std::sync::Arc;

use crate::core::DataType;
use crate::instance::EntityInstance;

/// Callback invoked once per reconstructed instance after the full row pass.
pub type CompletionHook = Arc<dyn Fn(&mut EntityInstance) + Send + Sync>;

/// Scalar column of an entity.
///
/// Computed columns exist only on the hydrated instance (derived values,
/// expression selects) and never appear in source rows, so deserialization
/// skips them.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: DataType,
    pub computed: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            computed: false,
        }
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }
}

/// Declared relation cardinality, deciding whether hydration writes a single
/// reference or appends to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// Relation property of an entity, pointing at a target entity by name.
#[derive(Debug, Clone)]
pub struct RelationDescriptor {
    pub property: String,
    pub target: String,
    pub cardinality: Cardinality,
}

/// Per-entity metadata the deserializer works against: identity columns,
/// scalar columns, relations and completion hooks.
///
/// Built once through the chaining methods and treated as immutable
/// afterwards:
///
/// ```
/// use rowgraph::{DataType, EntityDescriptor};
///
/// let person = EntityDescriptor::new("Person")
///     .table("person")
///     .primary_key("id", DataType::Uuid)
///     .column("name", DataType::Text)
///     .relation_one("livesInTown", "Town")
///     .relation_many("favoriteFood", "Food");
///
/// assert_eq!(person.primary_columns(), ["id"]);
/// assert_eq!(person.relations().len(), 2);
/// ```
#[derive(Clone)]
pub struct EntityDescriptor {
    name: String,
    table: String,
    primary_columns: Vec<String>,
    columns: Vec<ColumnDescriptor>,
    relations: Vec<RelationDescriptor>,
    hooks: Vec<CompletionHook>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let table = name.to_lowercase();
        Self {
            name,
            table,
            primary_columns: Vec::new(),
            columns: Vec::new(),
            relations: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Overrides the canonical table name (defaults to the lower-cased
    /// entity name). Used as the root alias when no mapping names one.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Declares a column and marks it part of the identity key.
    /// Declaration order is the key's component order.
    pub fn primary_key(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        self.primary_columns.push(name.clone());
        self.columns.push(ColumnDescriptor::new(name, data_type));
        self
    }

    pub fn column(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns.push(ColumnDescriptor::new(name, data_type));
        self
    }

    pub fn computed_column(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns
            .push(ColumnDescriptor::new(name, data_type).computed());
        self
    }

    pub fn relation_one(mut self, property: impl Into<String>, target: impl Into<String>) -> Self {
        self.relations.push(RelationDescriptor {
            property: property.into(),
            target: target.into(),
            cardinality: Cardinality::One,
        });
        self
    }

    pub fn relation_many(mut self, property: impl Into<String>, target: impl Into<String>) -> Self {
        self.relations.push(RelationDescriptor {
            property: property.into(),
            target: target.into(),
            cardinality: Cardinality::Many,
        });
        self
    }

    /// Registers a completion hook. Hooks run in registration order, once
    /// per distinct instance, after all rows are processed.
    pub fn after_load(
        mut self,
        hook: impl Fn(&mut EntityInstance) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn primary_columns(&self) -> &[String] {
        &self.primary_columns
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn relations(&self) -> &[RelationDescriptor] {
        &self.relations
    }

    pub fn relation(&self, property: &str) -> Option<&RelationDescriptor> {
        self.relations.iter().find(|rel| rel.property == property)
    }

    pub fn hooks(&self) -> &[CompletionHook] {
        &self.hooks
    }
}

impl fmt::Debug for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("primary_columns", &self.primary_columns)
            .field("columns", &self.columns)
            .field("relations", &self.relations)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
