pub mod constants;
pub mod entity;
pub mod error;
pub mod filter;
pub mod key;
pub mod mutation;
pub mod property;
pub mod query;
pub mod result;
pub mod transaction;
pub mod value;

mod wire;

pub use constants::{
    CommitMode, CompositeFilterOperator, Direction, EntityResultType, MoreResultsType, Operation,
    PropertyFilterOperator, ReadConsistency,
};
pub use entity::{Entity, EntityResult};
pub use error::{ModelError, ModelResult};
pub use filter::{CompositeFilter, Filter, PropertyFilter};
pub use key::{Key, MAX_KEY_PATH_LEN, PartitionId, PathElement};
pub use mutation::Mutation;
pub use property::{PropertyOrder, PropertyReference};
pub use query::{
    GqlQuery, GqlQueryParameter, KindExpression, Projection, Query, QueryKind, QueryResultBatch,
};
pub use result::{CommitResult, LookupResult, MutationResult};
pub use transaction::{ReadOptions, TransactionOptions};
pub use value::{
    ArrayValue, BlobValue, BooleanValue, DoubleValue, GeoPointValue, IntegerValue, KeyValue,
    LatLng, NullValue, StringValue, TimestampValue, TypedValue, Value, WireKind,
    format_timestamp, parse_timestamp,
};
