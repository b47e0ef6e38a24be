use log::trace;

use crate::adapter::ValueAdapter;
use crate::alias::AliasResolver;
use crate::core::{HydrationError, JoinedRow, Result, Value};
use crate::instance::{EntityInstance, EntityRef};
use crate::mapping::RelationMapping;
use crate::schema::{Cardinality, EntityDescriptor, MetadataProvider};

use super::cache::{EntityCache, IdentityKey};

/// Recursive per-row reconstruction following the mapping tree.
pub struct RowProcessor<'a> {
    provider: &'a dyn MetadataProvider,
    adapter: &'a dyn ValueAdapter,
    aliases: &'a AliasResolver,
}

impl<'a> RowProcessor<'a> {
    pub fn new(
        provider: &'a dyn MetadataProvider,
        adapter: &'a dyn ValueAdapter,
        aliases: &'a AliasResolver,
    ) -> Self {
        Self {
            provider,
            adapter,
            aliases,
        }
    }

    /// Reconstructs the entity occurrence this row carries under the
    /// mapping's alias, then follows the mapped relations with the same row.
    /// Returns the shared handle (`None` when the row holds no record for
    /// the alias) and whether this call created it.
    pub fn process(
        &self,
        row: &JoinedRow,
        entity: &str,
        mapping: &RelationMapping,
        cache: &mut EntityCache,
    ) -> Result<(Option<EntityRef>, bool)> {
        let descriptor = self.provider.require(entity)?;
        let alias = mapping.alias();

        let key = self.identity_key(row, descriptor, alias);
        let Some((instance, is_new)) = cache.get_or_create(alias, key, || {
            self.deserialize_scalars(row, descriptor, alias)
                .map(EntityRef::new)
        })?
        else {
            return Ok((None, false));
        };

        for (property, child_mapping) in mapping.relations() {
            let relation =
                descriptor
                    .relation(property)
                    .ok_or_else(|| HydrationError::UnknownRelation {
                        entity: descriptor.name().to_string(),
                        relation: property.to_string(),
                    })?;

            let (child, child_is_new) = self.process(row, &relation.target, child_mapping, cache)?;

            match relation.cardinality {
                Cardinality::One => {
                    // Last row wins, including a null child reverting an
                    // earlier assignment.
                    instance.borrow_mut().set_relation_one(property, child);
                }
                Cardinality::Many => {
                    let mut owner = instance.borrow_mut();
                    let children = owner.relation_many_mut(property);
                    if let Some(child) = child {
                        if child_is_new || !children.contains(&child) {
                            children.push(child);
                        }
                    }
                }
            }
        }

        Ok((Some(instance), is_new))
    }

    /// Raw primary-key values under the alias, in declared order. Absent
    /// columns read as null. No adapter conversion; identity works on the
    /// driver representation.
    fn identity_key(
        &self,
        row: &JoinedRow,
        descriptor: &EntityDescriptor,
        alias: &str,
    ) -> IdentityKey {
        let components = descriptor
            .primary_columns()
            .iter()
            .map(|column| {
                row.get(&self.aliases.resolve(alias, column))
                    .cloned()
                    .unwrap_or(Value::Null)
            })
            .collect();
        IdentityKey::new(components)
    }

    /// Builds a fresh instance carrying every non-computed column the row
    /// has a value for. Absent columns leave the field unset; a present
    /// null is assigned as null.
    pub fn deserialize_scalars(
        &self,
        row: &JoinedRow,
        descriptor: &EntityDescriptor,
        alias: &str,
    ) -> Result<EntityInstance> {
        let mut instance = EntityInstance::new(descriptor.name());

        for column in descriptor.columns() {
            if column.computed {
                continue;
            }
            if let Some(raw) = row.get(&self.aliases.resolve(alias, &column.name)) {
                let value = self.adapter.convert(raw, column)?;
                self.adapter.assign(&mut instance, column, value);
            }
        }

        trace!(
            "Hydrated {} occurrence under alias '{}'",
            descriptor.name(),
            alias
        );
        Ok(instance)
    }
}
