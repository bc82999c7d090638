use crate::auth::TokenProvider;
use crate::config::DatastoreConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::{DatastoreTransport, ReqwestTransport};
use datastore_model::{
    CommitMode, CommitResult, Entity, Key, LookupResult, Mutation, QueryKind, QueryResultBatch,
    ReadOptions, TransactionOptions,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

const LOG_TARGET: &str = "datastore::client";

const OP_ALLOCATE_IDS: &str = "allocateIds";
const OP_RESERVE_IDS: &str = "reserveIds";
const OP_LOOKUP: &str = "lookup";
const OP_BEGIN_TRANSACTION: &str = "beginTransaction";
const OP_ROLLBACK: &str = "rollback";
const OP_COMMIT: &str = "commit";
const OP_RUN_QUERY: &str = "runQuery";

/// Client facade. Each public operation is one POST to
/// `{base}/projects/{project_id}:{operation}`; there are no retries.
pub struct Datastore<T = ReqwestTransport> {
    config: DatastoreConfig,
    transport: T,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

impl Datastore<ReqwestTransport> {
    /// Opens an HTTP session. Cloud endpoints need a token provider; emulator
    /// endpoints ignore it.
    pub fn connect(
        config: DatastoreConfig,
        token_provider: Option<Arc<dyn TokenProvider>>,
    ) -> ClientResult<Self> {
        Self::with_transport(config, ReqwestTransport::new(), token_provider)
    }
}

impl<T> Datastore<T>
where
    T: DatastoreTransport,
{
    pub fn with_transport(
        config: DatastoreConfig,
        transport: T,
        token_provider: Option<Arc<dyn TokenProvider>>,
    ) -> ClientResult<Self> {
        if config.endpoint.requires_auth() && token_provider.is_none() {
            return Err(ClientError::Configuration(
                "cloud endpoint requires a token provider".to_string(),
            ));
        }
        debug!(
            target: LOG_TARGET,
            project_id = %config.project_id,
            base_url = %config.endpoint.base_url(),
            emulator = config.is_emulator(),
            "Datastore client opened"
        );
        Ok(Self {
            config,
            transport,
            token_provider,
        })
    }

    pub fn config(&self) -> &DatastoreConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Releases the HTTP session. Dropping the client has the same effect.
    pub fn close(self) {
        debug!(target: LOG_TARGET, project_id = %self.config.project_id, "Datastore client closed");
    }

    /// Fails with [`ClientError::Decode`] unless the response holds one key
    /// per requested key.
    pub async fn allocate_ids(&self, keys: &[Key]) -> ClientResult<Vec<Key>> {
        let requested = keys.len();
        let mut body = Map::new();
        body.insert("keys".into(), keys_to_wire(keys));

        let response = self.call(OP_ALLOCATE_IDS, Value::Object(body)).await?;
        let keys = match response.get("keys") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(keys)) => keys
                .iter()
                .map(Key::from_wire)
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(ClientError::Decode("field 'keys' must be an array".into())),
        };
        if keys.len() != requested {
            return Err(ClientError::Decode(format!(
                "allocateIds returned {} keys for {requested} requested",
                keys.len()
            )));
        }
        debug!(target: LOG_TARGET, keys = keys.len(), "Ids allocated");
        Ok(keys)
    }

    pub async fn reserve_ids(&self, keys: &[Key], database_id: &str) -> ClientResult<()> {
        let mut body = Map::new();
        body.insert("databaseId".into(), Value::from(database_id));
        body.insert("keys".into(), keys_to_wire(keys));

        self.call(OP_RESERVE_IDS, Value::Object(body)).await?;
        Ok(())
    }

    pub async fn lookup(&self, keys: &[Key], read_options: ReadOptions) -> ClientResult<LookupResult> {
        let mut body = Map::new();
        body.insert("readOptions".into(), read_options.to_wire());
        body.insert("keys".into(), keys_to_wire(keys));

        let response = self.call(OP_LOOKUP, Value::Object(body)).await?;
        let result = LookupResult::from_wire(&response)?;
        debug!(
            target: LOG_TARGET,
            found = result.found.len(),
            missing = result.missing.len(),
            deferred = result.deferred.len(),
            "Lookup completed"
        );
        Ok(result)
    }

    /// Returns the opaque transaction id.
    pub async fn begin_transaction(
        &self,
        options: Option<&TransactionOptions>,
    ) -> ClientResult<String> {
        let body = options
            .map(TransactionOptions::to_wire)
            .unwrap_or_else(|| Value::Object(Map::new()));

        let response = self.call(OP_BEGIN_TRANSACTION, body).await?;
        let transaction = response
            .get("transaction")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::Decode("missing field 'transaction'".to_string()))?;
        Ok(transaction.to_string())
    }

    pub async fn rollback(&self, transaction: &str) -> ClientResult<()> {
        let mut body = Map::new();
        body.insert("transaction".into(), Value::from(transaction));

        self.call(OP_ROLLBACK, Value::Object(body)).await?;
        Ok(())
    }

    /// In transactional mode without a transaction id, a new transaction is
    /// opened first. It is not rolled back if the commit fails. The response
    /// must carry one mutation result per mutation.
    pub async fn commit(
        &self,
        mutations: &[Mutation],
        transaction: Option<&str>,
        mode: CommitMode,
    ) -> ClientResult<CommitResult> {
        let mut body = Map::new();
        body.insert("mode".into(), Value::from(mode.as_str()));
        body.insert(
            "mutations".into(),
            Value::Array(mutations.iter().map(Mutation::to_wire).collect()),
        );

        match (mode, transaction) {
            (CommitMode::Transactional, Some(transaction)) => {
                body.insert("transaction".into(), Value::from(transaction));
            }
            (CommitMode::Transactional, None) => {
                let transaction = self.begin_transaction(None).await?;
                debug!(
                    target: LOG_TARGET,
                    transaction = %transaction,
                    "Opened implicit transaction for commit"
                );
                body.insert("transaction".into(), Value::from(transaction));
            }
            (CommitMode::NonTransactional, Some(_)) => {
                debug!(
                    target: LOG_TARGET,
                    "Transaction id ignored for non-transactional commit"
                );
            }
            (CommitMode::NonTransactional, None) => {}
        }

        let response = self.call(OP_COMMIT, Value::Object(body)).await?;
        let result = CommitResult::from_wire(&response)?;
        if result.mutation_results.len() != mutations.len() {
            return Err(ClientError::Decode(format!(
                "commit returned {} mutation results for {} mutations",
                result.mutation_results.len(),
                mutations.len()
            )));
        }
        debug!(
            target: LOG_TARGET,
            mutation_results = result.mutation_results.len(),
            index_updates = result.index_updates,
            "Commit completed"
        );
        Ok(result)
    }

    pub async fn insert(&self, entity: Entity) -> ClientResult<CommitResult> {
        self.commit_one(Mutation::Insert(entity)).await
    }

    pub async fn upsert(&self, entity: Entity) -> ClientResult<CommitResult> {
        self.commit_one(Mutation::Upsert(entity)).await
    }

    pub async fn update(&self, entity: Entity) -> ClientResult<CommitResult> {
        self.commit_one(Mutation::Update(entity)).await
    }

    pub async fn delete(&self, key: Key) -> ClientResult<CommitResult> {
        self.commit_one(Mutation::Delete(key)).await
    }

    pub async fn run_query(
        &self,
        query: impl Into<QueryKind>,
        read_options: ReadOptions,
    ) -> ClientResult<QueryResultBatch> {
        let (field, query) = query.into().to_wire_field();

        let mut partition_id = Map::new();
        partition_id.insert("projectId".into(), Value::from(self.config.project_id.as_str()));
        partition_id.insert("namespaceId".into(), Value::from(self.config.namespace.as_str()));

        let mut body = Map::new();
        body.insert("partitionId".into(), Value::Object(partition_id));
        body.insert("readOptions".into(), read_options.to_wire());
        body.insert(field.into(), query);

        let response = self.call(OP_RUN_QUERY, Value::Object(body)).await?;
        let batch = response
            .get("batch")
            .filter(|batch| !batch.is_null())
            .ok_or_else(|| ClientError::Decode("missing field 'batch'".to_string()))?;
        let batch = QueryResultBatch::from_wire(batch)?;
        debug!(
            target: LOG_TARGET,
            results = batch.entity_results.len(),
            more_results = batch.more_results.as_str(),
            "Query completed"
        );
        Ok(batch)
    }

    async fn commit_one(&self, mutation: Mutation) -> ClientResult<CommitResult> {
        self.commit(std::slice::from_ref(&mutation), None, CommitMode::Transactional)
            .await
    }

    async fn bearer(&self) -> ClientResult<Option<String>> {
        if !self.config.endpoint.requires_auth() {
            return Ok(None);
        }
        match &self.token_provider {
            Some(provider) => provider.token().await.map(Some),
            None => Err(ClientError::Auth("no token provider configured".to_string())),
        }
    }

    async fn call(&self, operation: &str, body: Value) -> ClientResult<Value> {
        let url = self.config.endpoint_url(operation);
        let bearer = self.bearer().await?;
        debug!(
            target: LOG_TARGET,
            operation,
            project_id = %self.config.project_id,
            authenticated = bearer.is_some(),
            "Sending request"
        );

        match self.transport.post(&url, bearer.as_deref(), &body).await {
            Ok(response) => Ok(response),
            Err(err) => {
                if let Some(status) = err.status() {
                    warn!(target: LOG_TARGET, operation, status, "Request rejected");
                } else {
                    warn!(target: LOG_TARGET, operation, error = %err, "Request failed");
                }
                Err(err)
            }
        }
    }
}

fn keys_to_wire(keys: &[Key]) -> Value {
    Value::Array(keys.iter().map(Key::to_wire).collect())
}

impl<T> std::fmt::Debug for Datastore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Datastore")
            .field("config", &self.config)
            .field("authenticated", &self.token_provider.is_some())
            .finish()
    }
}
