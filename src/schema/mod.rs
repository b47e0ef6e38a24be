pub mod descriptor;
pub mod registry;

pub use descriptor::{
    Cardinality, ColumnDescriptor, CompletionHook, EntityDescriptor, RelationDescriptor,
};
pub use registry::{MetadataProvider, SchemaRegistry};
