// ============================================================================
// rowgraph Library
// ============================================================================
//
// Deserializes the flat rows of a joined SQL query into a deduplicated,
// identity-correct graph of entity instances.

pub mod adapter;
pub mod alias;
pub mod core;
pub mod deserializer;
pub mod instance;
pub mod mapping;
pub mod schema;

// Re-export main types for convenience
pub use adapter::{StandardAdapter, ValueAdapter};
pub use alias::AliasResolver;
pub use core::{DataType, HydrationError, JoinedRow, Result, Value};
pub use deserializer::{GraphDeserializer, deserialize_entities, deserialize_entity};
pub use instance::{EntityInstance, EntityRef, RelationValue};
pub use mapping::RelationMapping;
pub use schema::{
    Cardinality, ColumnDescriptor, CompletionHook, EntityDescriptor, MetadataProvider,
    RelationDescriptor, SchemaRegistry,
};
