//! Responses of commit and lookup.

use crate::entity::EntityResult;
use crate::error::{ModelError, ModelResult};
use crate::key::Key;
use crate::wire;
use serde_json::{Map, Value as Json};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationResult {
    /// Set only when the mutation allocated a key.
    pub key: Option<Key>,
    pub version: String,
    pub conflict_detected: bool,
}

impl MutationResult {
    pub fn from_wire(value: &Json) -> ModelResult<Self> {
        let key = match value.get("key") {
            None | Some(Json::Null) => None,
            Some(key) => Some(Key::from_wire(key)?),
        };
        let version = wire::optional_int_string(value, "version")?
            .ok_or_else(|| ModelError::decode("missing field 'version'"))?;
        let conflict_detected = value
            .get("conflictDetected")
            .and_then(Json::as_bool)
            .unwrap_or(false);

        Ok(Self {
            key,
            version,
            conflict_detected,
        })
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        if let Some(key) = &self.key {
            data.insert("key".into(), key.to_wire());
        }
        data.insert("version".into(), Json::from(self.version.as_str()));
        data.insert("conflictDetected".into(), Json::Bool(self.conflict_detected));
        Json::Object(data)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitResult {
    pub mutation_results: Vec<MutationResult>,
    pub index_updates: i64,
}

impl CommitResult {
    pub fn from_wire(value: &Json) -> ModelResult<Self> {
        wire::object(value, "commit response")?;
        Ok(Self {
            mutation_results: wire::optional_array(value, "mutationResults")?
                .iter()
                .map(MutationResult::from_wire)
                .collect::<ModelResult<Vec<_>>>()?,
            index_updates: wire::optional_i64(value, "indexUpdates")?.unwrap_or(0),
        })
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        data.insert(
            "mutationResults".into(),
            Json::Array(
                self.mutation_results
                    .iter()
                    .map(MutationResult::to_wire)
                    .collect(),
            ),
        );
        data.insert("indexUpdates".into(), Json::from(self.index_updates));
        Json::Object(data)
    }
}

/// `missing` entries carry the requested key with no properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LookupResult {
    pub found: Vec<EntityResult>,
    pub missing: Vec<EntityResult>,
    pub deferred: Vec<Key>,
}

impl LookupResult {
    pub fn from_wire(value: &Json) -> ModelResult<Self> {
        wire::object(value, "lookup response")?;
        let entity_results = |field: &str| {
            wire::optional_array(value, field)?
                .iter()
                .map(EntityResult::from_wire)
                .collect::<ModelResult<Vec<_>>>()
        };

        Ok(Self {
            found: entity_results("found")?,
            missing: entity_results("missing")?,
            deferred: wire::optional_array(value, "deferred")?
                .iter()
                .map(Key::from_wire)
                .collect::<ModelResult<Vec<_>>>()?,
        })
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        data.insert(
            "found".into(),
            Json::Array(self.found.iter().map(EntityResult::to_wire).collect()),
        );
        data.insert(
            "missing".into(),
            Json::Array(self.missing.iter().map(EntityResult::to_wire).collect()),
        );
        data.insert(
            "deferred".into(),
            Json::Array(self.deferred.iter().map(Key::to_wire).collect()),
        );
        Json::Object(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::key::{PartitionId, PathElement};
    use serde_json::json;

    #[test]
    fn commit_result_defaults_key_and_conflict() {
        let result = CommitResult::from_wire(&json!({
            "mutationResults": [{"version": "1"}],
            "indexUpdates": 2,
        }))
        .unwrap();

        assert_eq!(result.index_updates, 2);
        assert_eq!(
            result.mutation_results,
            vec![MutationResult {
                key: None,
                version: "1".to_string(),
                conflict_detected: false,
            }]
        );
    }

    #[test]
    fn commit_result_tolerates_empty_body() {
        assert_eq!(
            CommitResult::from_wire(&json!({})).unwrap(),
            CommitResult::default()
        );
    }

    #[test]
    fn mutation_result_requires_version() {
        assert!(MutationResult::from_wire(&json!({"conflictDetected": true})).is_err());
    }

    #[test]
    fn lookup_result_splits_found_missing_deferred() {
        let key = Key::new(
            PartitionId::new("p1"),
            vec![PathElement::with_numeric_id("Task", 7)],
        )
        .unwrap();
        let result = LookupResult::from_wire(&json!({
            "missing": [{"entity": {"key": key.to_wire()}, "version": "3"}],
            "deferred": [key.to_wire()],
        }))
        .unwrap();

        assert!(result.found.is_empty());
        assert_eq!(result.missing.len(), 1);
        assert_eq!(result.missing[0].entity, Entity::new(key.clone()));
        assert_eq!(result.missing[0].version, "3");
        assert_eq!(result.deferred, vec![key]);
    }
}
