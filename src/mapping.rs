use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Declarative description of which relation paths a joined row set carries
/// and under which table alias each entity's columns were selected.
///
/// A bare alias string maps an entity with no nested relations; a node maps
/// an alias plus the relation properties to follow from it. The JSON shape
/// mirrors the builder:
///
/// ```
/// use rowgraph::RelationMapping;
///
/// let mapping: RelationMapping = serde_json::from_str(
///     r#"{
///         "alias": "person",
///         "relations": {
///             "livesInTown": { "alias": "town", "relations": { "country": "country" } },
///             "favoriteFood": "food"
///         }
///     }"#,
/// ).unwrap();
///
/// assert_eq!(mapping.alias(), "person");
/// assert_eq!(mapping.relations().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationMapping {
    /// Entity mapped under an alias, relations not followed.
    Leaf(String),
    /// Entity mapped under an alias with nested relation mappings, keyed by
    /// relation property name.
    Node {
        alias: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        relations: BTreeMap<String, RelationMapping>,
    },
}

impl RelationMapping {
    pub fn new(alias: impl Into<String>) -> Self {
        Self::Leaf(alias.into())
    }

    /// Adds a nested relation, promoting a leaf into a node.
    pub fn relation(self, property: impl Into<String>, child: impl Into<Self>) -> Self {
        let (alias, mut relations) = match self {
            Self::Leaf(alias) => (alias, BTreeMap::new()),
            Self::Node { alias, relations } => (alias, relations),
        };
        relations.insert(property.into(), child.into());
        Self::Node { alias, relations }
    }

    pub fn alias(&self) -> &str {
        match self {
            Self::Leaf(alias) => alias,
            Self::Node { alias, .. } => alias,
        }
    }

    /// Mapped relation properties in deterministic (name) order; empty for
    /// a leaf.
    pub fn relations(&self) -> impl Iterator<Item = (&str, &RelationMapping)> {
        let entries = match self {
            Self::Leaf(_) => None,
            Self::Node { relations, .. } => Some(relations),
        };
        entries
            .into_iter()
            .flat_map(|relations| relations.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

impl From<&str> for RelationMapping {
    fn from(alias: &str) -> Self {
        Self::Leaf(alias.to_string())
    }
}

impl From<String> for RelationMapping {
    fn from(alias: String) -> Self {
        Self::Leaf(alias)
    }
}
