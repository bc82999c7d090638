//! In-memory stand-in for the remote service, speaking the same wire format.

use crate::error::{ClientError, ClientResult};
use crate::transport::DatastoreTransport;
use async_trait::async_trait;
use datastore_model::{
    CommitResult, Entity, EntityResult, EntityResultType, Key, LookupResult, MoreResultsType,
    MutationResult, Operation, PathElement, QueryResultBatch, Value as DatastoreValue,
};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub operation: String,
    pub bearer: Option<String>,
    pub body: Value,
}

#[derive(Clone, Debug, Default)]
pub struct MockDatastore {
    inner: Arc<Mutex<MockDatastoreState>>,
}

#[derive(Clone, Debug, Default)]
struct MockDatastoreState {
    next_id: i64,
    next_transaction: u64,
    next_version: i64,
    entities: Vec<StoredEntity>,
    open_transactions: BTreeSet<String>,
    reserved: Vec<Key>,
    requests: Vec<RecordedRequest>,
}

#[derive(Clone, Debug)]
struct StoredEntity {
    entity: Entity,
    version: i64,
}

fn rejected(status: u16, message: &str) -> ClientError {
    ClientError::Status {
        status,
        body: json!({"error": {"code": status, "message": message}}).to_string(),
    }
}

fn field<'a>(body: &'a Value, name: &str) -> ClientResult<&'a Value> {
    body.get(name)
        .ok_or_else(|| rejected(400, &format!("missing field '{name}'")))
}

fn parse_keys(body: &Value) -> ClientResult<Vec<Key>> {
    field(body, "keys")?
        .as_array()
        .ok_or_else(|| rejected(400, "keys must be an array"))?
        .iter()
        .map(|key| Key::from_wire(key).map_err(ClientError::from))
        .collect()
}

impl MockDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner
            .lock()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }

    /// Operation names in the order they were received.
    pub fn operations(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.operation)
            .collect()
    }

    pub fn entity_count(&self) -> usize {
        self.inner
            .lock()
            .map(|state| state.entities.len())
            .unwrap_or_default()
    }

    pub fn reserved_keys(&self) -> Vec<Key> {
        self.inner
            .lock()
            .map(|state| state.reserved.clone())
            .unwrap_or_default()
    }
}

impl MockDatastoreState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn allocate_version(&mut self) -> i64 {
        self.next_version += 1;
        self.next_version
    }

    fn complete_key(&mut self, key: &Key) -> ClientResult<Key> {
        if key.is_complete() {
            return Ok(key.clone());
        }
        let mut path = key.path().to_vec();
        let Some(leaf) = path.pop() else {
            return Err(rejected(400, "key path is empty"));
        };
        path.push(PathElement::with_numeric_id(leaf.kind(), self.allocate_id()));
        Ok(Key::new(key.partition_id().clone(), path)?)
    }

    fn position(&self, key: &Key) -> Option<usize> {
        self.entities
            .iter()
            .position(|stored| stored.entity.key.as_ref() == Some(key))
    }

    fn check_transaction(&self, transaction: &str) -> ClientResult<()> {
        if self.open_transactions.contains(transaction) {
            Ok(())
        } else {
            Err(rejected(400, "transaction is not open"))
        }
    }

    fn check_read_options(&self, body: &Value) -> ClientResult<()> {
        match body
            .get("readOptions")
            .and_then(|options| options.get("transaction"))
            .and_then(Value::as_str)
        {
            Some(transaction) => self.check_transaction(transaction),
            None => Ok(()),
        }
    }

    fn allocate_ids(&mut self, body: &Value) -> ClientResult<Value> {
        let mut allocated = Vec::new();
        for key in parse_keys(body)? {
            if key.is_complete() {
                return Err(rejected(400, "allocateIds requires incomplete keys"));
            }
            allocated.push(self.complete_key(&key)?.to_wire());
        }
        Ok(json!({ "keys": allocated }))
    }

    fn reserve_ids(&mut self, body: &Value) -> ClientResult<Value> {
        for key in parse_keys(body)? {
            if !key.is_complete() {
                return Err(rejected(400, "reserveIds requires complete keys"));
            }
            if let Some(id) = key.leaf().and_then(PathElement::numeric_id) {
                self.next_id = self.next_id.max(id);
            }
            self.reserved.push(key);
        }
        Ok(json!({}))
    }

    fn lookup(&self, body: &Value) -> ClientResult<Value> {
        self.check_read_options(body)?;
        let mut result = LookupResult::default();
        for key in parse_keys(body)? {
            match self.position(&key) {
                Some(index) => {
                    let stored = &self.entities[index];
                    let mut found = EntityResult::new(stored.entity.clone());
                    found.version = stored.version.to_string();
                    result.found.push(found);
                }
                None => {
                    let mut missing = EntityResult::new(Entity::new(key));
                    missing.version = self.next_version.to_string();
                    result.missing.push(missing);
                }
            }
        }
        Ok(result.to_wire())
    }

    fn begin_transaction(&mut self) -> Value {
        self.next_transaction += 1;
        let transaction = format!("tx-{}", self.next_transaction);
        self.open_transactions.insert(transaction.clone());
        json!({ "transaction": transaction })
    }

    fn rollback(&mut self, body: &Value) -> ClientResult<Value> {
        let transaction = field(body, "transaction")?
            .as_str()
            .ok_or_else(|| rejected(400, "transaction must be a string"))?;
        if !self.open_transactions.remove(transaction) {
            return Err(rejected(400, "transaction is not open"));
        }
        Ok(json!({}))
    }

    /// Applies all mutations or none.
    fn commit(&mut self, body: &Value) -> ClientResult<Value> {
        let mode = field(body, "mode")?.as_str().unwrap_or_default();
        let transaction = body.get("transaction").and_then(Value::as_str);
        match (mode, transaction) {
            ("TRANSACTIONAL", Some(transaction)) => self.check_transaction(transaction)?,
            ("TRANSACTIONAL", None) => {
                return Err(rejected(400, "transactional commit requires a transaction"));
            }
            ("NON_TRANSACTIONAL", _) => {}
            (other, _) => return Err(rejected(400, &format!("unknown commit mode '{other}'"))),
        }

        let mutations = field(body, "mutations")?
            .as_array()
            .ok_or_else(|| rejected(400, "mutations must be an array"))?;
        let mut staged = self.clone();
        let mut result = CommitResult::default();
        for mutation in mutations {
            result
                .mutation_results
                .push(staged.apply_mutation(mutation)?);
            result.index_updates += 1;
        }

        staged.requests = std::mem::take(&mut self.requests);
        *self = staged;
        if let Some(transaction) = transaction {
            self.open_transactions.remove(transaction);
        }
        Ok(result.to_wire())
    }

    fn apply_mutation(&mut self, mutation: &Value) -> ClientResult<MutationResult> {
        let (name, target) = mutation
            .as_object()
            .and_then(|fields| fields.iter().next())
            .ok_or_else(|| rejected(400, "mutation must name an operation"))?;
        let operation = Operation::from_wire(name)?;

        if operation == Operation::Delete {
            let key = Key::from_wire(target)?;
            if let Some(index) = self.position(&key) {
                self.entities.remove(index);
            }
            return Ok(MutationResult {
                key: None,
                version: self.allocate_version().to_string(),
                conflict_detected: false,
            });
        }

        let mut entity = Entity::from_wire(target)?;
        let key = entity
            .key
            .clone()
            .ok_or_else(|| rejected(400, "entity key is required"))?;
        let allocated = if key.is_complete() {
            None
        } else if operation == Operation::Update {
            return Err(rejected(400, "update requires a complete key"));
        } else {
            Some(self.complete_key(&key)?)
        };
        let key = allocated.clone().unwrap_or(key);
        entity.key = Some(key.clone());

        let existing = self.position(&key);
        match (operation, existing) {
            (Operation::Insert, Some(_)) => return Err(rejected(409, "entity already exists")),
            (Operation::Update, None) => return Err(rejected(404, "no entity to update")),
            _ => {}
        }
        let version = self.allocate_version();
        let stored = StoredEntity { entity, version };
        match existing {
            Some(index) => self.entities[index] = stored,
            None => self.entities.push(stored),
        }

        Ok(MutationResult {
            key: allocated,
            version: version.to_string(),
            conflict_detected: false,
        })
    }

    fn run_query(&self, body: &Value) -> ClientResult<Value> {
        self.check_read_options(body)?;
        if body.get("gqlQuery").is_some() {
            return Err(rejected(400, "gql queries are not supported by the mock"));
        }
        let query = field(body, "query")?;
        let namespace = body
            .get("partitionId")
            .and_then(|partition| partition.get("namespaceId"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let kind = query
            .get("kind")
            .and_then(|kinds| kinds.get(0))
            .and_then(|kind| kind.get("name"))
            .and_then(Value::as_str);
        let filters = equality_filters(query.get("filter"))?;
        let limit = query
            .get("limit")
            .and_then(Value::as_u64)
            .map(|limit| limit as usize);

        let matches = self.entities.iter().filter(|stored| {
            let Some(key) = stored.entity.key.as_ref() else {
                return false;
            };
            let key_namespace = key.partition_id().namespace_id.as_deref().unwrap_or_default();
            let kind_matches = match (kind, key.leaf()) {
                (Some(kind), Some(leaf)) => leaf.kind() == kind,
                (None, _) => true,
                (Some(_), None) => false,
            };
            key_namespace == namespace
                && kind_matches
                && filters
                    .iter()
                    .all(|(name, value)| stored.entity.property(name) == Some(value))
        });

        let mut entity_results = Vec::new();
        let mut truncated = false;
        for stored in matches {
            if limit.is_some_and(|limit| entity_results.len() >= limit) {
                truncated = true;
                break;
            }
            let mut result = EntityResult::new(stored.entity.clone());
            result.version = stored.version.to_string();
            entity_results.push(result);
        }

        let batch = QueryResultBatch {
            entity_results,
            entity_result_type: EntityResultType::Full,
            skipped_results: 0,
            skipped_cursor: None,
            end_cursor: String::new(),
            more_results: if truncated {
                MoreResultsType::MoreResultsAfterLimit
            } else {
                MoreResultsType::NoMoreResults
            },
            snapshot_version: self.next_version.to_string(),
        };
        Ok(json!({ "batch": batch.to_wire() }))
    }
}

/// Flattens a property filter or an AND of property filters into
/// `(property, value)` equality pairs.
fn equality_filters(filter: Option<&Value>) -> ClientResult<Vec<(String, DatastoreValue)>> {
    let Some(filter) = filter else {
        return Ok(Vec::new());
    };
    if let Some(property_filter) = filter.get("propertyFilter") {
        if property_filter.get("op").and_then(Value::as_str) != Some("EQUAL") {
            return Err(rejected(400, "mock only supports EQUAL filters"));
        }
        let name = property_filter
            .get("property")
            .and_then(|property| property.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| rejected(400, "property filter needs a property name"))?;
        let value = DatastoreValue::from_wire(name, field(property_filter, "value")?)?;
        return Ok(vec![(name.to_string(), value)]);
    }
    if let Some(composite) = filter.get("compositeFilter") {
        if composite.get("op").and_then(Value::as_str) != Some("AND") {
            return Err(rejected(400, "mock only supports AND composite filters"));
        }
        let mut pairs = Vec::new();
        for child in field(composite, "filters")?
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
        {
            pairs.extend(equality_filters(Some(child))?);
        }
        return Ok(pairs);
    }
    Err(rejected(400, "unknown filter shape"))
}

#[async_trait]
impl DatastoreTransport for MockDatastore {
    async fn post(&self, url: &str, bearer: Option<&str>, body: &Value) -> ClientResult<Value> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| ClientError::Transport("mock backend mutex poisoned".to_string()))?;

        let operation = url.rsplit_once(':').map(|(_, op)| op).unwrap_or_default();
        state.requests.push(RecordedRequest {
            url: url.to_string(),
            operation: operation.to_string(),
            bearer: bearer.map(str::to_string),
            body: body.clone(),
        });

        match operation {
            "allocateIds" => state.allocate_ids(body),
            "reserveIds" => state.reserve_ids(body),
            "lookup" => state.lookup(body),
            "beginTransaction" => Ok(state.begin_transaction()),
            "rollback" => state.rollback(body),
            "commit" => state.commit(body),
            "runQuery" => state.run_query(body),
            other => Err(rejected(404, &format!("unknown operation '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost:8081/v1/projects/p1";

    async fn post(mock: &MockDatastore, operation: &str, body: Value) -> ClientResult<Value> {
        mock.post(&format!("{URL}:{operation}"), None, &body).await
    }

    fn incomplete_key() -> Value {
        json!({"partitionId": {"projectId": "p1"}, "path": [{"kind": "Task"}]})
    }

    #[tokio::test(flavor = "current_thread")]
    async fn allocates_sequential_ids() {
        let mock = MockDatastore::new();
        let response = post(
            &mock,
            "allocateIds",
            json!({"keys": [incomplete_key(), incomplete_key()]}),
        )
        .await
        .unwrap();
        assert_eq!(response["keys"][0]["path"][0]["id"], json!("1"));
        assert_eq!(response["keys"][1]["path"][0]["id"], json!("2"));
        assert_eq!(mock.operations(), vec!["allocateIds".to_string()]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_commit_leaves_state_untouched() {
        let mock = MockDatastore::new();
        let key = json!({"partitionId": {"projectId": "p1"}, "path": [{"kind": "Task", "name": "a"}]});
        let entity = json!({"key": key, "properties": {}});
        post(
            &mock,
            "commit",
            json!({"mode": "NON_TRANSACTIONAL", "mutations": [{"insert": entity}]}),
        )
        .await
        .unwrap();

        let error = post(
            &mock,
            "commit",
            json!({"mode": "NON_TRANSACTIONAL", "mutations": [
                {"delete": key},
                {"update": {"key": {"partitionId": {"projectId": "p1"}, "path": [{"kind": "Task", "name": "b"}]}, "properties": {}}},
            ]}),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), Some(404));
        assert_eq!(mock.entity_count(), 1);
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unknown_operation_is_not_found() {
        let mock = MockDatastore::new();
        let error = post(&mock, "export", json!({})).await.unwrap_err();
        assert_eq!(error.status(), Some(404));
    }
}
