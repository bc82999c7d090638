//! Structured and GQL queries plus the result batch they produce.

use crate::constants::{EntityResultType, MoreResultsType};
use crate::entity::EntityResult;
use crate::error::{ModelError, ModelResult};
use crate::filter::Filter;
use crate::property::{PropertyOrder, PropertyReference};
use crate::value::Value;
use crate::wire;
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Projection {
    pub property: PropertyReference,
}

impl Projection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            property: PropertyReference::new(name),
        }
    }

    pub fn from_wire(value: &Json) -> ModelResult<Self> {
        Ok(Self {
            property: PropertyReference::from_wire(wire::required(value, "property")?)?,
        })
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        data.insert("property".into(), self.property.to_wire());
        Json::Object(data)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KindExpression {
    pub name: String,
}

impl KindExpression {
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

/// Unset fields are left out of the wire body, except `kind`, which is always
/// sent as a (possibly empty) array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    pub projection: Option<Vec<Projection>>,
    pub kind: Option<KindExpression>,
    pub filter: Option<Filter>,
    pub order: Option<Vec<PropertyOrder>>,
    pub distinct_on: Option<Vec<PropertyReference>>,
    pub start_cursor: String,
    pub end_cursor: String,
    pub offset: Option<i32>,
    pub limit: Option<i32>,
}

impl Query {
    pub fn for_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(KindExpression::new(kind)),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_projection(mut self, projection: Vec<Projection>) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_order(mut self, order: Vec<PropertyOrder>) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_distinct_on(mut self, distinct_on: Vec<PropertyReference>) -> Self {
        self.distinct_on = Some(distinct_on);
        self
    }

    pub fn with_start_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.start_cursor = cursor.into();
        self
    }

    pub fn with_end_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.end_cursor = cursor.into();
        self
    }

    pub fn with_offset(mut self, offset: i32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        data.insert(
            "kind".into(),
            Json::Array(self.kind.iter().map(KindExpression::to_wire).collect()),
        );

        if let Some(projection) = self.projection.as_ref().filter(|items| !items.is_empty()) {
            data.insert(
                "projection".into(),
                Json::Array(projection.iter().map(Projection::to_wire).collect()),
            );
        }
        if let Some(filter) = &self.filter {
            data.insert("filter".into(), filter.to_wire());
        }
        if let Some(order) = self.order.as_ref().filter(|items| !items.is_empty()) {
            data.insert(
                "order".into(),
                Json::Array(order.iter().map(PropertyOrder::to_wire).collect()),
            );
        }
        if let Some(distinct_on) = self.distinct_on.as_ref().filter(|items| !items.is_empty()) {
            data.insert(
                "distinctOn".into(),
                Json::Array(distinct_on.iter().map(PropertyReference::to_wire).collect()),
            );
        }
        if !self.start_cursor.is_empty() {
            data.insert("startCursor".into(), Json::from(self.start_cursor.as_str()));
        }
        if !self.end_cursor.is_empty() {
            data.insert("endCursor".into(), Json::from(self.end_cursor.as_str()));
        }
        if let Some(offset) = self.offset {
            data.insert("offset".into(), Json::from(offset));
        }
        if let Some(limit) = self.limit {
            data.insert("limit".into(), Json::from(limit));
        }

        Json::Object(data)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Binding {
    Value(Value),
    Cursor(String),
}

/// A GQL binding: a literal value or a query cursor, never both.
#[derive(Clone, Debug, PartialEq)]
pub struct GqlQueryParameter {
    binding: Binding,
}

impl GqlQueryParameter {
    pub fn new(value: Option<Value>, cursor: Option<String>) -> ModelResult<Self> {
        let binding = match (value, cursor) {
            (Some(value), None) => Binding::Value(value),
            (None, Some(cursor)) => Binding::Cursor(cursor),
            (None, None) => return Err(ModelError::MissingBindingValue),
            (Some(_), Some(_)) => return Err(ModelError::AmbiguousBinding),
        };
        Ok(Self { binding })
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            binding: Binding::Value(value.into()),
        }
    }

    pub fn cursor(cursor: impl Into<String>) -> Self {
        Self {
            binding: Binding::Cursor(cursor.into()),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match &self.binding {
            Binding::Value(value) => Some(value),
            Binding::Cursor(_) => None,
        }
    }

    pub fn as_cursor(&self) -> Option<&str> {
        match &self.binding {
            Binding::Value(_) => None,
            Binding::Cursor(cursor) => Some(cursor),
        }
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        match &self.binding {
            Binding::Value(value) => data.insert("value".into(), value.to_wire()),
            Binding::Cursor(cursor) => data.insert("cursor".into(), Json::from(cursor.as_str())),
        };
        Json::Object(data)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GqlQuery {
    pub query_string: String,
    pub allow_literals: bool,
    pub named_bindings: BTreeMap<String, GqlQueryParameter>,
    pub positional_bindings: Vec<GqlQueryParameter>,
}

impl GqlQuery {
    pub fn new(query_string: impl Into<String>) -> Self {
        Self {
            query_string: query_string.into(),
            allow_literals: true,
            named_bindings: BTreeMap::new(),
            positional_bindings: Vec::new(),
        }
    }

    pub fn with_allow_literals(mut self, allow_literals: bool) -> Self {
        self.allow_literals = allow_literals;
        self
    }

    pub fn bind(mut self, name: impl Into<String>, parameter: GqlQueryParameter) -> Self {
        self.named_bindings.insert(name.into(), parameter);
        self
    }

    pub fn bind_positional(mut self, parameter: GqlQueryParameter) -> Self {
        self.positional_bindings.push(parameter);
        self
    }

    pub fn to_wire(&self) -> Json {
        let named: Map<String, Json> = self
            .named_bindings
            .iter()
            .map(|(name, parameter)| (name.clone(), parameter.to_wire()))
            .collect();

        let mut data = Map::new();
        data.insert("queryString".into(), Json::from(self.query_string.as_str()));
        data.insert("allowLiterals".into(), Json::Bool(self.allow_literals));
        data.insert("namedBindings".into(), Json::Object(named));
        data.insert(
            "positionalBindings".into(),
            Json::Array(
                self.positional_bindings
                    .iter()
                    .map(GqlQueryParameter::to_wire)
                    .collect(),
            ),
        );
        Json::Object(data)
    }
}

/// The two query forms run-query accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryKind {
    Structured(Query),
    Gql(GqlQuery),
}

impl QueryKind {
    /// Field name and body for the run-query request.
    pub fn to_wire_field(&self) -> (&'static str, Json) {
        match self {
            Self::Structured(query) => ("query", query.to_wire()),
            Self::Gql(query) => ("gqlQuery", query.to_wire()),
        }
    }
}

impl From<Query> for QueryKind {
    fn from(query: Query) -> Self {
        Self::Structured(query)
    }
}

impl From<GqlQuery> for QueryKind {
    fn from(query: GqlQuery) -> Self {
        Self::Gql(query)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryResultBatch {
    pub entity_results: Vec<EntityResult>,
    pub entity_result_type: EntityResultType,
    pub skipped_results: i64,
    pub skipped_cursor: Option<String>,
    pub end_cursor: String,
    pub more_results: MoreResultsType,
    pub snapshot_version: String,
}

impl QueryResultBatch {
    pub fn from_wire(value: &Json) -> ModelResult<Self> {
        wire::object(value, "batch")?;
        let entity_results = wire::optional_array(value, "entityResults")?
            .iter()
            .map(EntityResult::from_wire)
            .collect::<ModelResult<Vec<_>>>()?;

        Ok(Self {
            entity_results,
            entity_result_type: EntityResultType::from_wire(wire::required_str(
                value,
                "entityResultType",
            )?)?,
            skipped_results: wire::optional_i64(value, "skippedResults")?.unwrap_or(0),
            skipped_cursor: wire::optional_str(value, "skippedCursor")?.map(str::to_string),
            end_cursor: wire::required_str(value, "endCursor")?.to_string(),
            more_results: MoreResultsType::from_wire(wire::required_str(value, "moreResults")?)?,
            snapshot_version: wire::optional_int_string(value, "snapshotVersion")?
                .unwrap_or_default(),
        })
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        data.insert("endCursor".into(), Json::from(self.end_cursor.as_str()));
        data.insert(
            "entityResults".into(),
            Json::Array(self.entity_results.iter().map(EntityResult::to_wire).collect()),
        );
        data.insert(
            "entityResultType".into(),
            Json::from(self.entity_result_type.as_str()),
        );
        data.insert("moreResults".into(), Json::from(self.more_results.as_str()));
        data.insert(
            "snapshotVersion".into(),
            Json::from(self.snapshot_version.as_str()),
        );
        data.insert("skippedResults".into(), Json::from(self.skipped_results));
        if let Some(skipped_cursor) = &self.skipped_cursor {
            data.insert("skippedCursor".into(), Json::from(skipped_cursor.as_str()));
        }
        Json::Object(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PropertyFilterOperator;
    use serde_json::json;

    #[test]
    fn empty_query_only_sends_kind() {
        assert_eq!(Query::default().to_wire(), json!({"kind": []}));
    }

    #[test]
    fn zero_offset_counts_as_set() {
        let query = Query {
            offset: Some(0),
            ..Query::default()
        };
        assert_eq!(query.to_wire(), json!({"kind": [], "offset": 0}));
        assert_eq!(
            Query::default().with_limit(10).to_wire(),
            json!({"kind": [], "limit": 10})
        );
    }

    #[test]
    fn empty_lists_and_cursors_are_omitted() {
        let query = Query::for_kind("Task")
            .with_projection(vec![])
            .with_order(vec![])
            .with_distinct_on(vec![]);
        assert_eq!(query.to_wire(), json!({"kind": [{"name": "Task"}]}));
    }

    #[test]
    fn full_query_wire_shape() {
        let query = Query::for_kind("Task")
            .with_projection(vec![Projection::new("title")])
            .with_filter(Filter::property(
                "done",
                PropertyFilterOperator::Equal,
                Value::boolean(false),
            ))
            .with_order(vec![PropertyOrder::descending("created")])
            .with_distinct_on(vec![PropertyReference::new("title")])
            .with_start_cursor("c1")
            .with_end_cursor("c2")
            .with_offset(5)
            .with_limit(20);

        assert_eq!(
            query.to_wire(),
            json!({
                "kind": [{"name": "Task"}],
                "projection": [{"property": {"name": "title"}}],
                "filter": {"propertyFilter": {
                    "property": {"name": "done"},
                    "op": "EQUAL",
                    "value": {"booleanValue": false, "excludeFromIndexes": false},
                }},
                "order": [{"property": {"name": "created"}, "direction": "DESCENDING"}],
                "distinctOn": [{"name": "title"}],
                "startCursor": "c1",
                "endCursor": "c2",
                "offset": 5,
                "limit": 20,
            })
        );
    }

    #[test]
    fn gql_parameter_needs_exactly_one_binding() {
        assert!(matches!(
            GqlQueryParameter::new(None, None),
            Err(ModelError::MissingBindingValue)
        ));
        assert!(matches!(
            GqlQueryParameter::new(Some(Value::integer(1)), Some("c".to_string())),
            Err(ModelError::AmbiguousBinding)
        ));

        let cursor = GqlQueryParameter::new(None, Some("c1".to_string())).unwrap();
        assert_eq!(cursor.as_cursor(), Some("c1"));
        assert_eq!(cursor.to_wire(), json!({"cursor": "c1"}));
    }

    #[test]
    fn gql_query_always_sends_bindings() {
        let bare = GqlQuery::new("SELECT * FROM Task");
        assert_eq!(
            bare.to_wire(),
            json!({
                "queryString": "SELECT * FROM Task",
                "allowLiterals": true,
                "namedBindings": {},
                "positionalBindings": [],
            })
        );

        let bound = GqlQuery::new("SELECT * FROM Task WHERE owner = @owner AND n > @1")
            .with_allow_literals(false)
            .bind("owner", GqlQueryParameter::value(Value::string("ada")))
            .bind_positional(GqlQueryParameter::value(Value::integer(3)));
        let encoded = bound.to_wire();
        assert_eq!(encoded["allowLiterals"], json!(false));
        assert_eq!(
            encoded["namedBindings"]["owner"],
            json!({"value": {"stringValue": "ada", "excludeFromIndexes": false}})
        );
        assert_eq!(
            encoded["positionalBindings"][0],
            json!({"value": {"integerValue": "3", "excludeFromIndexes": false}})
        );
    }

    #[test]
    fn batch_parses_and_defaults_optional_fields() {
        let batch = QueryResultBatch::from_wire(&json!({
            "entityResultType": "FULL",
            "endCursor": "end",
            "moreResults": "NO_MORE_RESULTS",
        }))
        .unwrap();
        assert!(batch.entity_results.is_empty());
        assert_eq!(batch.entity_result_type, EntityResultType::Full);
        assert_eq!(batch.skipped_results, 0);
        assert_eq!(batch.skipped_cursor, None);
        assert_eq!(batch.more_results, MoreResultsType::NoMoreResults);
        assert_eq!(batch.snapshot_version, "");

        let reparsed = QueryResultBatch::from_wire(&batch.to_wire()).unwrap();
        assert_eq!(reparsed, batch);
    }

    #[test]
    fn batch_without_more_results_is_a_decode_error() {
        let error = QueryResultBatch::from_wire(&json!({
            "entityResultType": "FULL",
            "endCursor": "end",
        }))
        .unwrap_err();
        assert!(matches!(error, ModelError::Decode(message) if message.contains("moreResults")));
    }
}
