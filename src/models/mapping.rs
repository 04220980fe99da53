use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use super::{ObjectId, TargetId};

/// Routes one data object to one target system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub object_id: ObjectId,
    pub target_id: TargetId,
    pub active: bool,
}

impl Mapping {
    pub fn active(object_id: impl Into<ObjectId>, target_id: impl Into<TargetId>) -> Self {
        Self {
            object_id: object_id.into(),
            target_id: target_id.into(),
            active: true,
        }
    }

    pub fn inactive(object_id: impl Into<ObjectId>, target_id: impl Into<TargetId>) -> Self {
        Self {
            active: false,
            ..Self::active(object_id, target_id)
        }
    }
}

/// Activity lookup over a mapping list; the first mapping for a pair decides
#[derive(Debug, Clone, Default)]
pub struct MappingIndex<'a> {
    active: HashMap<(&'a str, &'a str), bool>,
}

impl<'a> MappingIndex<'a> {
    pub fn new(mappings: &'a [Mapping]) -> Self {
        let mut active = HashMap::with_capacity(mappings.len());
        for mapping in mappings {
            active
                .entry((mapping.object_id.as_str(), mapping.target_id.as_str()))
                .or_insert(mapping.active);
        }
        Self { active }
    }

    /// Missing pairs are inactive
    pub fn is_active(&self, object_id: &str, target_id: &str) -> bool {
        self.active
            .get(&(object_id, target_id))
            .copied()
            .unwrap_or(false)
    }
}
