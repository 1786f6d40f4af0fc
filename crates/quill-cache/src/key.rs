//! Composite resource keys.

use std::fmt;

/// Identifies a resource by its owner and its id within that owner.
///
/// Compared and hashed by value, so a key built fresh for every call still
/// finds the entry created by an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub owner_id: i64,
    pub resource_id: i64,
}

impl ResourceKey {
    pub const fn new(owner_id: i64, resource_id: i64) -> Self {
        Self {
            owner_id,
            resource_id,
        }
    }
}

impl From<(i64, i64)> for ResourceKey {
    fn from((owner_id, resource_id): (i64, i64)) -> Self {
        Self::new(owner_id, resource_id)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner_id, self.resource_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_value_equality_for_lookups() {
        let mut map = HashMap::new();
        map.insert(ResourceKey::new(0, 1), "post");
        assert_eq!(map.get(&ResourceKey::from((0, 1))), Some(&"post"));
        assert_eq!(map.get(&ResourceKey::new(1, 0)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ResourceKey::new(0, 12).to_string(), "0/12");
    }
}
