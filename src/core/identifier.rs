//! Composite key scoping persisted state and entity lookups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one entity governed by one machine.
///
/// The pair `(entity_id, machine)` is the key for everything a persistence
/// adapter stores and for the entity an [`EntityBuilder`](crate::context::EntityBuilder)
/// constructs. Fields are private so an identifier cannot change once created.
///
/// # Example
///
/// ```rust
/// use switchyard::core::Identifier;
///
/// let id = Identifier::new("order-17", "checkout");
/// assert_eq!(id.entity_id(), "order-17");
/// assert_eq!(id.machine(), "checkout");
/// assert_eq!(id.to_string(), "checkout:order-17");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    entity_id: String,
    machine: String,
}

impl Identifier {
    pub fn new(entity_id: impl Into<String>, machine: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            machine: machine.into(),
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn machine(&self) -> &str {
        &self.machine
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.machine, self.entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identifiers_compare_by_both_parts() {
        let a = Identifier::new("1", "light");
        let b = Identifier::new("1", "light");
        let c = Identifier::new("1", "order");
        let d = Identifier::new("2", "light");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn identifier_works_as_map_key() {
        let mut set = HashSet::new();
        set.insert(Identifier::new("1", "light"));
        set.insert(Identifier::new("1", "light"));
        set.insert(Identifier::new("1", "order"));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn identifier_serializes_correctly() {
        let id = Identifier::new("42", "traffic-light");
        let json = serde_json::to_string(&id).unwrap();
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
