use crate::error::ModelResult;
use crate::key::Key;
use crate::value::Value;
use crate::wire;
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;

/// A keyless entity is a template waiting for id allocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entity {
    pub key: Option<Key>,
    pub properties: BTreeMap<String, Value>,
}

impl Entity {
    pub fn new(key: Key) -> Self {
        Self {
            key: Some(key),
            properties: BTreeMap::new(),
        }
    }

    pub fn keyless() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Fails as a whole when any property has an unrecognized kind.
    pub fn from_wire(value: &Json) -> ModelResult<Self> {
        wire::object(value, "entity")?;
        let key = match value.get("key") {
            None | Some(Json::Null) => None,
            Some(key) => Some(Key::from_wire(key)?),
        };

        let mut properties = BTreeMap::new();
        if let Some(raw_properties) = value.get("properties").filter(|raw| !raw.is_null()) {
            for (name, envelope) in wire::object(raw_properties, "entity.properties")? {
                properties.insert(name.clone(), Value::from_wire(name, envelope)?);
            }
        }

        Ok(Self { key, properties })
    }

    pub fn to_wire(&self) -> Json {
        let properties: Map<String, Json> = self
            .properties
            .iter()
            .map(|(name, value)| (name.clone(), value.to_wire()))
            .collect();

        let mut data = Map::new();
        data.insert(
            "key".into(),
            self.key.as_ref().map_or(Json::Null, Key::to_wire),
        );
        data.insert("properties".into(), Json::Object(properties));
        Json::Object(data)
    }
}

/// An entity as returned by lookup or query, with its version and cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityResult {
    pub entity: Entity,
    pub version: String,
    pub cursor: String,
}

impl EntityResult {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            version: String::new(),
            cursor: String::new(),
        }
    }

    pub fn from_wire(value: &Json) -> ModelResult<Self> {
        Ok(Self {
            entity: Entity::from_wire(wire::required(value, "entity")?)?,
            version: wire::optional_int_string(value, "version")?.unwrap_or_default(),
            cursor: wire::optional_str(value, "cursor")?
                .unwrap_or_default()
                .to_string(),
        })
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        data.insert("entity".into(), self.entity.to_wire());
        data.insert("version".into(), Json::from(self.version.as_str()));
        data.insert("cursor".into(), Json::from(self.cursor.as_str()));
        Json::Object(data)
    }
}
