use crate::constants::{CompositeFilterOperator, PropertyFilterOperator};
use crate::property::PropertyReference;
use crate::value::Value;
use serde_json::{Map, Value as Json};

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyFilter {
    pub property: PropertyReference,
    pub op: PropertyFilterOperator,
    pub value: Value,
}

impl PropertyFilter {
    pub fn new(name: impl Into<String>, op: PropertyFilterOperator, value: impl Into<Value>) -> Self {
        Self {
            property: PropertyReference::new(name),
            op,
            value: value.into(),
        }
    }

    pub fn to_wire(&self) -> Json {
        let mut inner = Map::new();
        inner.insert("property".into(), self.property.to_wire());
        inner.insert("op".into(), Json::from(self.op.as_str()));
        inner.insert("value".into(), self.value.to_wire());

        let mut data = Map::new();
        data.insert("propertyFilter".into(), Json::Object(inner));
        Json::Object(data)
    }
}

/// Children are serialized in order; nesting depth is not limited.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeFilter {
    pub op: CompositeFilterOperator,
    pub filters: Vec<Filter>,
}

impl CompositeFilter {
    pub fn new(op: CompositeFilterOperator, filters: Vec<Filter>) -> Self {
        Self { op, filters }
    }

    pub fn to_wire(&self) -> Json {
        let mut inner = Map::new();
        inner.insert("op".into(), Json::from(self.op.as_str()));
        inner.insert(
            "filters".into(),
            Json::Array(self.filters.iter().map(Filter::to_wire).collect()),
        );

        let mut data = Map::new();
        data.insert("compositeFilter".into(), Json::Object(inner));
        Json::Object(data)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Property(PropertyFilter),
    Composite(CompositeFilter),
}

impl Filter {
    pub fn property(
        name: impl Into<String>,
        op: PropertyFilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self::Property(PropertyFilter::new(name, op, value))
    }

    pub fn equal(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::property(name, PropertyFilterOperator::Equal, value)
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Self::Composite(CompositeFilter::new(CompositeFilterOperator::And, filters))
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Composite(CompositeFilter::new(CompositeFilterOperator::Or, filters))
    }

    pub fn to_wire(&self) -> Json {
        match self {
            Self::Property(filter) => filter.to_wire(),
            Self::Composite(filter) => filter.to_wire(),
        }
    }
}

impl From<PropertyFilter> for Filter {
    fn from(filter: PropertyFilter) -> Self {
        Self::Property(filter)
    }
}

impl From<CompositeFilter> for Filter {
    fn from(filter: CompositeFilter) -> Self {
        Self::Composite(filter)
    }
}
