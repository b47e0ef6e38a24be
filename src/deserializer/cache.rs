use std::collections::HashMap;

use crate::core::{Result, Value};
use crate::instance::EntityRef;

/// Composite identity of one entity occurrence: the raw primary-key values
/// found under its alias, in declared key order.
///
/// Components stay structural. Joining them into one delimited string would
/// let distinct keys collide (`["a_b", "c"]` vs `["a", "b_c"]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(Vec<Value>);

impl IdentityKey {
    pub fn new(components: Vec<Value>) -> Self {
        Self(components)
    }

    /// An all-null key means the row's join produced no record for this
    /// alias. An empty key (no declared primary columns) is vacuously
    /// absent.
    pub fn is_absent(&self) -> bool {
        self.0.iter().all(Value::is_null)
    }
}

/// Per-run instance cache: alias → identity key → shared instance.
///
/// Scoped to a single graph reconstruction; every row of the run consults
/// the same cache so repeated occurrences of a record collapse into one
/// handle.
#[derive(Debug, Default)]
pub struct EntityCache {
    entries: HashMap<String, HashMap<IdentityKey, EntityRef>>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Looks up the instance for `(alias, key)`, running `factory` on first
    /// sight. Returns `Ok(None)` for an absent key without touching the
    /// cache or the factory; otherwise the handle plus a flag that is true
    /// when the factory ran. A factory error propagates and leaves no cache
    /// entry behind.
    pub fn get_or_create<F>(
        &mut self,
        alias: &str,
        key: IdentityKey,
        factory: F,
    ) -> Result<Option<(EntityRef, bool)>>
    where
        F: FnOnce() -> Result<EntityRef>,
    {
        if key.is_absent() {
            return Ok(None);
        }

        let per_alias = self.entries.entry(alias.to_string()).or_default();
        if let Some(existing) = per_alias.get(&key) {
            return Ok(Some((existing.clone(), false)));
        }

        let created = factory()?;
        per_alias.insert(key, created.clone());
        Ok(Some((created, true)))
    }

    /// Every cached instance across all aliases. Each instance appears
    /// exactly once because creation registers it under exactly one
    /// `(alias, key)` slot.
    pub fn instances(&self) -> impl Iterator<Item = &EntityRef> {
        self.entries
            .values()
            .flat_map(|per_alias| per_alias.values())
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::EntityInstance;

    fn person() -> Result<EntityRef> {
        Ok(EntityRef::new(EntityInstance::new("Person")))
    }

    #[test]
    fn test_absent_key_skips_factory() {
        let mut cache = EntityCache::new();
        let mut invoked = false;

        let result = cache
            .get_or_create("person", IdentityKey::new(vec![Value::Null, Value::Null]), || {
                invoked = true;
                person()
            })
            .unwrap();

        assert!(result.is_none());
        assert!(!invoked);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_empty_key_is_absent() {
        assert!(IdentityKey::new(Vec::new()).is_absent());
    }

    #[test]
    fn test_partially_null_key_is_present() {
        let mut cache = EntityCache::new();
        let key = IdentityKey::new(vec![Value::Null, Value::Integer(3)]);

        let (_, is_new) = cache.get_or_create("person", key, person).unwrap().unwrap();
        assert!(is_new);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_hit_returns_the_same_handle() {
        let mut cache = EntityCache::new();
        let key = || IdentityKey::new(vec![Value::Integer(1)]);

        let (first, first_new) = cache.get_or_create("person", key(), person).unwrap().unwrap();
        let (second, second_new) = cache
            .get_or_create("person", key(), || {
                panic!("factory must not run on a cache hit")
            })
            .unwrap()
            .unwrap();

        assert!(first_new);
        assert!(!second_new);
        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn test_aliases_are_independent_namespaces() {
        let mut cache = EntityCache::new();
        let key = || IdentityKey::new(vec![Value::Integer(1)]);

        let (a, _) = cache.get_or_create("person", key(), person).unwrap().unwrap();
        let (b, _) = cache.get_or_create("friend", key(), person).unwrap().unwrap();

        assert!(!a.ptr_eq(&b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_structural_keys_do_not_collide() {
        let mut cache = EntityCache::new();

        let left = IdentityKey::new(vec![Value::Text("a_b".into()), Value::Text("c".into())]);
        let right = IdentityKey::new(vec![Value::Text("a".into()), Value::Text("b_c".into())]);
        assert_ne!(left, right);

        let (a, _) = cache.get_or_create("order", left, person).unwrap().unwrap();
        let (b, _) = cache.get_or_create("order", right, person).unwrap().unwrap();
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_factory_error_leaves_no_entry() {
        use crate::core::HydrationError;

        let mut cache = EntityCache::new();
        let key = || IdentityKey::new(vec![Value::Integer(1)]);

        let err = cache
            .get_or_create("person", key(), || {
                Err(HydrationError::TypeMismatch("bad column".into()))
            })
            .unwrap_err();
        assert!(matches!(err, HydrationError::TypeMismatch(_)));
        assert_eq!(cache.len(), 0);

        // The next attempt runs the factory again.
        let (_, is_new) = cache.get_or_create("person", key(), person).unwrap().unwrap();
        assert!(is_new);
    }
}
