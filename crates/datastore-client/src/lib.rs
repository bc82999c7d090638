#![doc = r#"
Async client for the document-store HTTP/JSON API.

Operation mapping:

| Client method | Remote call | Request body |
| --- | --- | --- |
| `Datastore::allocate_ids` | `POST {base}/projects/{project}:allocateIds` | `{"keys"}` |
| `Datastore::reserve_ids` | `POST {base}/projects/{project}:reserveIds` | `{"databaseId", "keys"}` |
| `Datastore::lookup` | `POST {base}/projects/{project}:lookup` | `{"readOptions", "keys"}` |
| `Datastore::begin_transaction` | `POST {base}/projects/{project}:beginTransaction` | options or `{}` |
| `Datastore::rollback` | `POST {base}/projects/{project}:rollback` | `{"transaction"}` |
| `Datastore::commit` | `POST {base}/projects/{project}:commit` | `{"mode", "mutations", "transaction"?}` |
| `Datastore::run_query` | `POST {base}/projects/{project}:runQuery` | `{"partitionId", "readOptions", "query" \| "gqlQuery"}` |

Implementation notes:
- `commit` in transactional mode without a transaction id issues `beginTransaction` first.
- Emulator endpoints (`DATASTORE_EMULATOR_HOST`) use plain http and send no `Authorization` header.
- Non-2xx responses surface as `ClientError::Status` with the body untouched; nothing is retried.
"#]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod testing;
pub mod transport;

pub use auth::{StaticTokenProvider, TokenProvider};
pub use client::Datastore;
pub use config::{DEFAULT_BASE_URL, DatastoreConfig, Endpoint};
pub use error::{ClientError, ClientResult};
pub use testing::{MockDatastore, RecordedRequest};
pub use transport::{DatastoreTransport, ReqwestTransport};

pub use datastore_model as model;
