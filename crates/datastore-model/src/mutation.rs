use crate::constants::Operation;
use crate::entity::Entity;
use crate::key::Key;
use serde_json::{Map, Value as Json};

#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    Insert(Entity),
    Update(Entity),
    Upsert(Entity),
    Delete(Key),
}

impl Mutation {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Insert(_) => Operation::Insert,
            Self::Update(_) => Operation::Update,
            Self::Upsert(_) => Operation::Upsert,
            Self::Delete(_) => Operation::Delete,
        }
    }

    /// `{"<operation>": entity}` or `{"delete": key}`.
    pub fn to_wire(&self) -> Json {
        let body = match self {
            Self::Insert(entity) | Self::Update(entity) | Self::Upsert(entity) => entity.to_wire(),
            Self::Delete(key) => key.to_wire(),
        };
        let mut data = Map::new();
        data.insert(self.operation().as_str().into(), body);
        Json::Object(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{PartitionId, PathElement};
    use crate::value::Value;
    use serde_json::json;

    fn key() -> Key {
        Key::new(
            PartitionId::new("p1"),
            vec![PathElement::with_name("Task", "t1")],
        )
        .unwrap()
    }

    #[test]
    fn entity_mutations_are_keyed_by_operation() {
        let entity = Entity::new(key()).with_property("done", Value::boolean(true));
        for (mutation, op) in [
            (Mutation::Insert(entity.clone()), "insert"),
            (Mutation::Update(entity.clone()), "update"),
            (Mutation::Upsert(entity.clone()), "upsert"),
        ] {
            assert_eq!(mutation.operation().as_str(), op);
            let encoded = mutation.to_wire();
            assert_eq!(encoded.as_object().unwrap().len(), 1);
            assert_eq!(encoded[op], entity.to_wire());
        }
    }

    #[test]
    fn delete_carries_only_the_key() {
        let mutation = Mutation::Delete(key());
        assert_eq!(mutation.operation(), Operation::Delete);
        assert_eq!(mutation.to_wire(), json!({"delete": key().to_wire()}));
    }
}
