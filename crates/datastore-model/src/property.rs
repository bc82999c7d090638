use crate::constants::Direction;
use crate::error::ModelResult;
use crate::wire;
use serde_json::{Map, Value as Json};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyReference {
    pub name: String,
}

impl PropertyReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn from_wire(value: &Json) -> ModelResult<Self> {
        Ok(Self::new(wire::required_str(value, "name")?))
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        data.insert("name".into(), Json::from(self.name.as_str()));
        Json::Object(data)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyOrder {
    pub property: PropertyReference,
    pub direction: Direction,
}

impl PropertyOrder {
    pub fn ascending(name: impl Into<String>) -> Self {
        Self {
            property: PropertyReference::new(name),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(name: impl Into<String>) -> Self {
        Self {
            property: PropertyReference::new(name),
            direction: Direction::Descending,
        }
    }

    pub fn from_wire(value: &Json) -> ModelResult<Self> {
        Ok(Self {
            property: PropertyReference::from_wire(wire::required(value, "property")?)?,
            direction: Direction::from_wire(wire::required_str(value, "direction")?)?,
        })
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        data.insert("property".into(), self.property.to_wire());
        data.insert("direction".into(), Json::from(self.direction.as_str()));
        Json::Object(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_round_trips_through_wire() {
        let order = PropertyOrder::descending("created");
        let encoded = order.to_wire();
        assert_eq!(
            encoded,
            json!({"property": {"name": "created"}, "direction": "DESCENDING"})
        );
        assert_eq!(PropertyOrder::from_wire(&encoded).unwrap(), order);
    }

    #[test]
    fn order_rejects_unknown_direction() {
        let result = PropertyOrder::from_wire(
            &json!({"property": {"name": "created"}, "direction": "SIDEWAYS"}),
        );
        assert!(result.is_err());
    }
}
