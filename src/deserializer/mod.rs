mod cache;
mod processor;

use log::debug;

use crate::adapter::{StandardAdapter, ValueAdapter};
use crate::alias::AliasResolver;
use crate::core::{JoinedRow, Result};
use crate::instance::{EntityInstance, EntityRef};
use crate::mapping::RelationMapping;
use crate::schema::MetadataProvider;

use cache::EntityCache;
use processor::RowProcessor;

/// Facade over metadata provider, value adapter and alias resolver.
///
/// Reconstructs deduplicated entity graphs from flat joined rows. Each
/// [`deserialize_many`](Self::deserialize_many) call runs an independent
/// identity cache, so one deserializer can serve many result sets.
///
/// # Examples
///
/// ```
/// use rowgraph::{
///     DataType, EntityDescriptor, GraphDeserializer, JoinedRow, RelationMapping,
///     SchemaRegistry,
/// };
///
/// # fn main() -> rowgraph::Result<()> {
/// let registry = SchemaRegistry::new()
///     .with_entity(
///         EntityDescriptor::new("Person")
///             .primary_key("id", DataType::Integer)
///             .column("name", DataType::Text)
///             .relation_one("livesInTown", "Town"),
///     )?
///     .with_entity(
///         EntityDescriptor::new("Town")
///             .primary_key("id", DataType::Integer)
///             .column("name", DataType::Text),
///     )?;
///
/// let rows = vec![
///     JoinedRow::new()
///         .with("person_id", 1i64)
///         .with("person_name", "Eva")
///         .with("town_id", 10i64)
///         .with("town_name", "Berlin"),
///     JoinedRow::new()
///         .with("person_id", 2i64)
///         .with("person_name", "Peter")
///         .with("town_id", 10i64)
///         .with("town_name", "Berlin"),
/// ];
///
/// let mapping = RelationMapping::new("person").relation("livesInTown", "town");
///
/// let deserializer = GraphDeserializer::new(&registry);
/// let people = deserializer.deserialize_many("Person", &rows, Some(&mapping))?;
/// assert_eq!(people.len(), 2);
///
/// // Both rows named the same town, so both people share one instance.
/// let eva_town = people[0].borrow().relation_one("livesInTown").unwrap();
/// let peter_town = people[1].borrow().relation_one("livesInTown").unwrap();
/// assert!(eva_town.ptr_eq(&peter_town));
/// # Ok(())
/// # }
/// ```
pub struct GraphDeserializer<'a> {
    provider: &'a dyn MetadataProvider,
    adapter: Box<dyn ValueAdapter>,
    aliases: AliasResolver,
}

impl<'a> GraphDeserializer<'a> {
    pub fn new(provider: &'a dyn MetadataProvider) -> Self {
        Self {
            provider,
            adapter: Box::new(StandardAdapter),
            aliases: AliasResolver::default(),
        }
    }

    /// Replaces the [`StandardAdapter`] with a custom value adapter.
    pub fn with_adapter(mut self, adapter: impl ValueAdapter + 'static) -> Self {
        self.adapter = Box::new(adapter);
        self
    }

    /// Replaces the default underscore alias convention.
    pub fn with_alias_resolver(mut self, aliases: AliasResolver) -> Self {
        self.aliases = aliases;
        self
    }

    /// Reconstructs the scalar fields of a single entity from one row.
    /// Relations are not followed and completion hooks do not fire. The
    /// alias defaults to the entity's canonical table name.
    pub fn deserialize_one(
        &self,
        entity: &str,
        row: &JoinedRow,
        table_alias: Option<&str>,
    ) -> Result<EntityInstance> {
        let descriptor = self.provider.require(entity)?;
        let alias = table_alias.unwrap_or_else(|| descriptor.table_name());

        let processor = RowProcessor::new(self.provider, self.adapter.as_ref(), &self.aliases);
        processor.deserialize_scalars(row, descriptor, alias)
    }

    /// Reconstructs the full graph a joined row set carries.
    ///
    /// Rows are processed in order against one shared identity cache;
    /// distinct roots come back in first-seen order. The mapping defaults
    /// to a bare leaf of the root entity's canonical table name. After the
    /// row pass every distinct reconstructed instance runs its entity's
    /// completion hooks exactly once.
    pub fn deserialize_many(
        &self,
        entity: &str,
        rows: &[JoinedRow],
        mapping: Option<&RelationMapping>,
    ) -> Result<Vec<EntityRef>> {
        let descriptor = self.provider.require(entity)?;

        let default_mapping;
        let mapping = match mapping {
            Some(mapping) => mapping,
            None => {
                default_mapping = RelationMapping::new(descriptor.table_name());
                &default_mapping
            }
        };

        let processor = RowProcessor::new(self.provider, self.adapter.as_ref(), &self.aliases);
        let mut cache = EntityCache::new();
        let mut roots = Vec::new();

        for row in rows {
            if let (Some(root), true) = processor.process(row, entity, mapping, &mut cache)? {
                roots.push(root);
            }
        }

        self.run_completion_hooks(&cache)?;

        debug!(
            "Hydrated {} distinct {} root(s) from {} row(s), {} cached instance(s)",
            roots.len(),
            entity,
            rows.len(),
            cache.len()
        );

        Ok(roots)
    }

    /// Finalize pass: every distinct cached instance runs its entity's
    /// hooks in declared order. Instance visiting order is unspecified.
    fn run_completion_hooks(&self, cache: &EntityCache) -> Result<()> {
        for instance in cache.instances() {
            let entity = instance.borrow().entity().to_string();
            let descriptor = self.provider.require(&entity)?;

            if descriptor.hooks().is_empty() {
                continue;
            }

            let mut borrowed = instance.borrow_mut();
            for hook in descriptor.hooks() {
                hook(&mut borrowed);
            }
        }
        Ok(())
    }
}

/// One-shot form of [`GraphDeserializer::deserialize_one`] with default
/// adapter and alias convention.
pub fn deserialize_entity(
    provider: &dyn MetadataProvider,
    entity: &str,
    row: &JoinedRow,
    table_alias: Option<&str>,
) -> Result<EntityInstance> {
    GraphDeserializer::new(provider).deserialize_one(entity, row, table_alias)
}

/// One-shot form of [`GraphDeserializer::deserialize_many`] with default
/// adapter and alias convention.
pub fn deserialize_entities(
    provider: &dyn MetadataProvider,
    entity: &str,
    rows: &[JoinedRow],
    mapping: Option<&RelationMapping>,
) -> Result<Vec<EntityRef>> {
    GraphDeserializer::new(provider).deserialize_many(entity, rows, mapping)
}
