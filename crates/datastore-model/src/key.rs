//! Entity identity: partition plus ancestor path.
//!
//! Application-built keys are validated on construction. Keys parsed with
//! `from_wire` come from the service and are accepted as-is.

use crate::error::{ModelError, ModelResult};
use crate::wire;
use serde_json::{Map, Value as Json};

pub const MAX_KEY_PATH_LEN: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PartitionId {
    pub project_id: String,
    pub namespace_id: Option<String>,
}

impl PartitionId {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            namespace_id: None,
        }
    }

    pub fn with_namespace(mut self, namespace_id: impl Into<String>) -> Self {
        self.namespace_id = Some(namespace_id.into());
        self
    }

    pub fn from_wire(value: &Json) -> ModelResult<Self> {
        wire::object(value, "partitionId")?;
        Ok(Self {
            project_id: wire::required_str(value, "projectId")?.to_string(),
            namespace_id: wire::optional_str(value, "namespaceId")?.map(str::to_string),
        })
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        data.insert("projectId".into(), Json::from(self.project_id.as_str()));
        if let Some(namespace_id) = &self.namespace_id {
            data.insert("namespaceId".into(), Json::from(namespace_id.as_str()));
        }
        Json::Object(data)
    }
}

/// One `(kind, identifier)` segment. At most one of `id`/`name` is set; neither
/// means the element is incomplete and awaits id allocation. A wire element
/// carrying both keeps only `id`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathElement {
    kind: String,
    id: Option<String>,
    name: Option<String>,
}

impl PathElement {
    pub fn incomplete(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            name: None,
        }
    }

    pub fn with_id(kind: impl Into<String>, id: impl Into<String>) -> ModelResult<Self> {
        let id = id.into();
        if id.parse::<i64>().is_err() {
            return Err(ModelError::InvalidPathElementId(id));
        }
        Ok(Self {
            kind: kind.into(),
            id: Some(id),
            name: None,
        })
    }

    pub fn with_numeric_id(kind: impl Into<String>, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id: Some(id.to_string()),
            name: None,
        }
    }

    pub fn with_name(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            name: Some(name.into()),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// `None` when the element has no id or the wire id is not an int64.
    pub fn numeric_id(&self) -> Option<i64> {
        self.id.as_deref().and_then(|id| id.parse().ok())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.id.is_some() || self.name.is_some()
    }

    pub fn from_wire(value: &Json) -> ModelResult<Self> {
        wire::object(value, "path element")?;
        let id = wire::optional_int_string(value, "id")?;
        let name = match id {
            Some(_) => None,
            None => wire::optional_str(value, "name")?.map(str::to_string),
        };
        Ok(Self {
            kind: wire::required_str(value, "kind")?.to_string(),
            id,
            name,
        })
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        data.insert("kind".into(), Json::from(self.kind.as_str()));
        if let Some(id) = &self.id {
            data.insert("id".into(), Json::from(id.as_str()));
        } else if let Some(name) = &self.name {
            data.insert("name".into(), Json::from(name.as_str()));
        }
        Json::Object(data)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    partition_id: PartitionId,
    path: Vec<PathElement>,
}

impl Key {
    pub fn new(partition_id: PartitionId, path: Vec<PathElement>) -> ModelResult<Self> {
        if path.is_empty() {
            return Err(ModelError::EmptyKeyPath);
        }
        if path.len() > MAX_KEY_PATH_LEN {
            return Err(ModelError::KeyPathTooLong {
                len: path.len(),
                max: MAX_KEY_PATH_LEN,
            });
        }
        Ok(Self { partition_id, path })
    }

    pub fn partition_id(&self) -> &PartitionId {
        &self.partition_id
    }

    pub fn path(&self) -> &[PathElement] {
        &self.path
    }

    /// The element naming the entity itself.
    pub fn leaf(&self) -> Option<&PathElement> {
        self.path.last()
    }

    pub fn is_complete(&self) -> bool {
        self.leaf().is_some_and(PathElement::is_complete)
    }

    pub fn from_wire(value: &Json) -> ModelResult<Self> {
        wire::object(value, "key")?;
        let partition_id = PartitionId::from_wire(wire::required(value, "partitionId")?)?;
        let path = wire::optional_array(value, "path")?
            .iter()
            .map(PathElement::from_wire)
            .collect::<ModelResult<Vec<_>>>()?;
        Ok(Self { partition_id, path })
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        data.insert("partitionId".into(), self.partition_id.to_wire());
        data.insert(
            "path".into(),
            Json::Array(self.path.iter().map(PathElement::to_wire).collect()),
        );
        Json::Object(data)
    }
}
