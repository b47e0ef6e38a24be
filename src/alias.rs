/// Builds the flat column keys a driver emits for aliased selections, e.g.
/// table alias `person` + column `id` → `person_id`.
///
/// This is the single seam for driver naming conventions; swap the separator
/// to follow drivers that join with something other than an underscore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasResolver {
    separator: char,
}

impl AliasResolver {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    pub fn resolve(&self, table_alias: &str, column: &str) -> String {
        let mut key = String::with_capacity(table_alias.len() + column.len() + 1);
        key.push_str(table_alias);
        key.push(self.separator);
        key.push_str(column);
        key
    }
}

impl Default for AliasResolver {
    fn default() -> Self {
        Self::new('_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_separator_is_underscore() {
        let resolver = AliasResolver::default();
        assert_eq!(resolver.resolve("person", "id"), "person_id");
        assert_eq!(resolver.resolve("town", "name"), "town_name");
    }

    #[test]
    fn test_custom_separator() {
        let resolver = AliasResolver::new('.');
        assert_eq!(resolver.resolve("person", "id"), "person.id");
    }
}
